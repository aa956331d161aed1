//! Error types for the login layer.

/// Errors that can occur while logging in or handling stored credentials.
///
/// None of these reach the player directly. The character-list fetch folds
/// all of them into result code 2, and credential problems fall back to
/// an empty password.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// The HTTPS request for the character list failed: resolution,
    /// connection, TLS, timeout, or a non-success status.
    #[error("character list request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The character-list response could not be understood.
    #[error("character list document is invalid: {0}")]
    Document(String),

    /// Reading or writing the config file failed.
    #[error("config store I/O failed: {0}")]
    Io(#[from] std::io::Error),

    /// The config file is not valid JSON.
    #[error("config store is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The password fingerprint could not be produced or read back.
    #[error("password fingerprint failed: {0}")]
    Fingerprint(String),

    /// A login was attempted before a character was chosen.
    #[error("no character selected for login")]
    NoCharacter,
}
