pub mod client;
pub mod exercise;
pub mod measurement;
pub mod message;
pub mod notification;
pub mod progress_photo;
pub mod session;
pub mod workout;

pub use client::*;
pub use exercise::*;
pub use measurement::*;
pub use message::*;
pub use notification::*;
pub use progress_photo::*;
pub use session::*;
pub use workout::*;
