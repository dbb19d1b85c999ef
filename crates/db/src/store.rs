use async_trait::async_trait;

use crate::error::StorageError;
use crate::model::{Book, BookDraft, User};

/// Predicate accepted by [`BookStore::find_where`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookFilter {
    /// Case-sensitive substring match on the title.
    TitleContains(String),
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        match self {
            BookFilter::TitleContains(needle) => book.title.contains(needle.as_str()),
        }
    }
}

/// Record storage for books.
///
/// Soft-deleted books are invisible to every operation.
#[async_trait]
pub trait BookStore: Send + Sync {
    /// All books ordered by id.
    async fn find_all(&self) -> Result<Vec<Book>, StorageError>;

    /// Exact lookup; `StorageError::NotFound` when absent.
    async fn find_by_id(&self, id: u64) -> Result<Book, StorageError>;

    async fn create(&self, draft: BookDraft) -> Result<Book, StorageError>;

    async fn update(&self, id: u64, draft: BookDraft) -> Result<Book, StorageError>;

    async fn delete(&self, id: u64) -> Result<(), StorageError>;

    /// Books matching `filter`, ordered by id.
    async fn find_where(&self, filter: &BookFilter) -> Result<Vec<Book>, StorageError>;
}

/// Account storage used by the sign-in flow.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Create an account; `StorageError::Conflict` if the email is taken.
    async fn create(&self, email: &str, password_hash: String) -> Result<User, StorageError>;

    async fn find_by_email(&self, email: &str) -> Result<User, StorageError>;
}
