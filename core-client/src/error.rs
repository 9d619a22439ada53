use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The server answered with `success: false`.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Failed to decode response: {0}")]
    Decode(String),

    #[error("Please enter a title for your lyrics.")]
    EmptyTitle,

    #[error("Editor is not open")]
    NotEditing,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// HTTP status of an API failure, if this is one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Api { status, .. } => Some(*status),
            ClientError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ClientError>;
