pub mod analytics;
pub mod auth;
pub mod clients;
pub mod exercises;
pub mod messaging;
pub mod push;
pub mod scheduler;
pub mod sessions;
