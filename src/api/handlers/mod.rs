pub mod analytics;
pub mod auth;
pub mod clients;
pub mod exercises;
pub mod measurements;
pub mod messages;
pub mod notifications;
pub mod progress_photos;
pub mod sessions;
pub mod templates;
pub mod workout_logs;

/// Extract a dotted file extension from an uploaded filename.
pub(crate) fn file_extension(filename: &str) -> String {
    filename
        .rfind('.')
        .map(|i| filename[i..].to_ascii_lowercase())
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::file_extension;

    #[test]
    fn extension_extraction() {
        assert_eq!(file_extension("photo.JPG"), ".jpg");
        assert_eq!(file_extension("clip.mov"), ".mov");
        assert_eq!(file_extension("noext"), "");
    }
}
