use bookshelf_db::StorageError;
use bookshelf_http::AppError;
use serde_json::json;

/// Failures of the book handlers, before they are mapped to a transport.
#[derive(Debug, thiserror::Error)]
pub enum BookError {
    /// Malformed identifier.
    #[error("invalid book id: {0:?}")]
    InvalidArgument(String),

    /// Neither an id nor a title was supplied to a search.
    #[error("provide either a book id or a title")]
    MissingArgument,

    #[error("{message}")]
    Validation {
        field: &'static str,
        message: &'static str,
    },

    #[error("book not found")]
    NotFound,

    #[error(transparent)]
    Storage(StorageError),
}

impl BookError {
    pub fn title_required() -> Self {
        Self::Validation {
            field: "title",
            message: "Title is required.",
        }
    }
}

impl From<StorageError> for BookError {
    fn from(err: StorageError) -> Self {
        if err.is_not_found() {
            Self::NotFound
        } else {
            Self::Storage(err)
        }
    }
}

impl From<BookError> for AppError {
    fn from(err: BookError) -> Self {
        match err {
            BookError::InvalidArgument(_) => {
                AppError::bad_request_with_code("invalid_argument", err.to_string())
            }
            BookError::MissingArgument => {
                AppError::bad_request_with_code("missing_argument", err.to_string())
            }
            BookError::Validation { field, message } => {
                AppError::validation(vec![json!({ "field": field, "error": "required" })], message)
            }
            BookError::NotFound => AppError::not_found("book not found"),
            BookError::Storage(e) => AppError::Internal(anyhow::Error::new(e)),
        }
    }
}
