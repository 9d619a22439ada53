use thiserror::Error;

#[derive(Error, Debug)]
pub enum LibraryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Entity not found: {entity_type} with id {id}")]
    NotFound { entity_type: String, id: String },

    #[error("Invalid input: {field} - {message}")]
    InvalidInput { field: String, message: String },

    #[error("Quota exceeded: at most {limit} documents per owner")]
    QuotaExceeded { limit: u32 },

    #[error("Migration failed: {0}")]
    Migration(String),
}

impl LibraryError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        LibraryError::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }

    pub(crate) fn lyrics_not_found(id: &str) -> Self {
        LibraryError::NotFound {
            entity_type: "Lyrics".to_string(),
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LibraryError>;
