use std::collections::BTreeMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;

use crate::error::StorageError;
use crate::model::{Book, BookDraft, User};
use crate::store::{BookFilter, BookStore, UserStore};

#[derive(Default)]
struct BookTable {
    next_id: u64,
    rows: BTreeMap<u64, Book>,
}

impl BookTable {
    fn live(&self) -> impl Iterator<Item = &Book> {
        self.rows.values().filter(|book| book.deleted_at.is_none())
    }

    fn live_mut(&mut self, id: u64) -> Result<&mut Book, StorageError> {
        self.rows
            .get_mut(&id)
            .filter(|book| book.deleted_at.is_none())
            .ok_or_else(|| StorageError::not_found("book", id))
    }
}

/// In-process [`BookStore`] with soft delete.
#[derive(Default)]
pub struct MemoryBookStore {
    table: RwLock<BookTable>,
}

impl MemoryBookStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl BookStore for MemoryBookStore {
    async fn find_all(&self) -> Result<Vec<Book>, StorageError> {
        let table = self.table.read().await;
        let books = table.live().cloned().collect();
        Ok(books)
    }

    async fn find_by_id(&self, id: u64) -> Result<Book, StorageError> {
        let table = self.table.read().await;
        let found = table.live().find(|book| book.id == id).cloned();
        found.ok_or_else(|| StorageError::not_found("book", id))
    }

    async fn create(&self, draft: BookDraft) -> Result<Book, StorageError> {
        let draft = draft.normalized();
        let now = OffsetDateTime::now_utc();

        let mut table = self.table.write().await;
        table.next_id += 1;
        let book = Book {
            id: table.next_id,
            title: draft.title,
            author: draft.author,
            year: draft.year,
            genre: draft.genre,
            isbn: draft.isbn,
            rating: draft.rating,
            read: draft.read,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        };
        table.rows.insert(book.id, book.clone());

        tracing::debug!(book_id = book.id, "book created");
        Ok(book)
    }

    async fn update(&self, id: u64, draft: BookDraft) -> Result<Book, StorageError> {
        let draft = draft.normalized();

        let mut table = self.table.write().await;
        let book = table.live_mut(id)?;
        book.title = draft.title;
        book.author = draft.author;
        book.year = draft.year;
        book.genre = draft.genre;
        book.isbn = draft.isbn;
        book.rating = draft.rating;
        book.read = draft.read;
        book.updated_at = OffsetDateTime::now_utc();

        tracing::debug!(book_id = id, "book updated");
        Ok(book.clone())
    }

    async fn delete(&self, id: u64) -> Result<(), StorageError> {
        let mut table = self.table.write().await;
        let book = table.live_mut(id)?;
        book.deleted_at = Some(OffsetDateTime::now_utc());

        tracing::debug!(book_id = id, "book soft-deleted");
        Ok(())
    }

    async fn find_where(&self, filter: &BookFilter) -> Result<Vec<Book>, StorageError> {
        let table = self.table.read().await;
        let books = table.live().filter(|book| filter.matches(book)).cloned().collect();
        Ok(books)
    }
}

#[derive(Default)]
struct UserTable {
    next_id: u64,
    rows: Vec<User>,
}

/// In-process [`UserStore`]; emails compare case-insensitively.
#[derive(Default)]
pub struct MemoryUserStore {
    table: RwLock<UserTable>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn create(&self, email: &str, password_hash: String) -> Result<User, StorageError> {
        let email = email.trim();
        let mut table = self.table.write().await;

        if table
            .rows
            .iter()
            .any(|user| user.email.eq_ignore_ascii_case(email))
        {
            return Err(StorageError::conflict("user", email));
        }

        table.next_id += 1;
        let user = User {
            id: table.next_id,
            email: email.to_string(),
            password_hash,
        };
        table.rows.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<User, StorageError> {
        let email = email.trim();
        let table = self.table.read().await;
        let found = table
            .rows
            .iter()
            .find(|user| user.email.eq_ignore_ascii_case(email))
            .cloned();
        found.ok_or_else(|| StorageError::not_found("user", email))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(title: &str) -> BookDraft {
        BookDraft {
            title: title.to_string(),
            author: "Anon".to_string(),
            rating: 3.33,
            ..BookDraft::default()
        }
    }

    #[tokio::test]
    async fn create_assigns_increasing_ids_and_rounds_rating() {
        let store = MemoryBookStore::new();
        let first = store.create(draft("Dune")).await.unwrap();
        let second = store.create(draft("Emma")).await.unwrap();

        assert_eq!(first.id, 1);
        assert_eq!(second.id, 2);
        assert_eq!(first.rating, 3.3);
        assert_eq!(store.find_all().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn deleted_books_disappear_from_every_query() {
        let store = MemoryBookStore::new();
        let book = store.create(draft("Dune")).await.unwrap();
        store.delete(book.id).await.unwrap();

        assert!(store.find_all().await.unwrap().is_empty());
        assert!(store.find_by_id(book.id).await.unwrap_err().is_not_found());
        assert!(store
            .find_where(&BookFilter::TitleContains("Dune".into()))
            .await
            .unwrap()
            .is_empty());
        assert!(store.delete(book.id).await.unwrap_err().is_not_found());
        assert!(store.update(book.id, draft("x")).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn lookups_release_the_table_for_writers() {
        let store = MemoryBookStore::new();
        let dune = store.create(draft("Dune")).await.unwrap();
        let emma = store.create(draft("Emma")).await.unwrap();
        store.delete(dune.id).await.unwrap();

        assert_eq!(store.find_by_id(emma.id).await.unwrap().title, "Emma");
        assert_eq!(store.find_all().await.unwrap(), vec![emma.clone()]);

        // Each read must have dropped its guard, or this write would deadlock.
        let updated = store.update(emma.id, draft("Emma II")).await.unwrap();
        assert_eq!(store.find_by_id(emma.id).await.unwrap(), updated);
    }

    #[tokio::test]
    async fn update_replaces_fields_and_keeps_creation_time() {
        let store = MemoryBookStore::new();
        let book = store.create(draft("Dune")).await.unwrap();
        let updated = store.update(book.id, draft("Dune Messiah")).await.unwrap();

        assert_eq!(updated.title, "Dune Messiah");
        assert_eq!(updated.created_at, book.created_at);
        assert!(updated.updated_at >= book.updated_at);
    }

    #[tokio::test]
    async fn title_filter_is_case_sensitive_substring() {
        let store = MemoryBookStore::new();
        store.create(draft("Children of Dune")).await.unwrap();
        store.create(draft("Dune")).await.unwrap();

        let hits = store
            .find_where(&BookFilter::TitleContains("Dune".into()))
            .await
            .unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].title, "Children of Dune");

        let misses = store
            .find_where(&BookFilter::TitleContains("dune".into()))
            .await
            .unwrap();
        assert!(misses.is_empty());
    }

    #[tokio::test]
    async fn duplicate_email_conflicts_regardless_of_case() {
        let store = MemoryUserStore::new();
        store.create("reader@example.com", "hash".into()).await.unwrap();

        let err = store
            .create("Reader@Example.com", "hash".into())
            .await
            .unwrap_err();
        assert!(matches!(err, StorageError::Conflict { .. }));

        let found = store.find_by_email("READER@example.com").await.unwrap();
        assert_eq!(found.id, 1);
    }
}
