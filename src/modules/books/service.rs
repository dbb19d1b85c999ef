//! Book operations shared by the HTML pages and the JSON API.
//!
//! Reads of the full list go through the cache-aside path. Every write
//! commits to storage first and only then drops the cached list, under the
//! configured invalidation deadline; an invalidation failure never fails the
//! write.

use bookshelf_db::{Book, BookDraft};

use super::error::BookError;
use super::search::{parse_book_id, SearchDispatcher, SearchQuery};
use crate::state::AppState;

pub async fn list(state: &AppState) -> Result<Vec<Book>, BookError> {
    let books = state
        .book_list
        .read_through(|| state.books.find_all())
        .await?;
    Ok(books)
}

pub async fn get(state: &AppState, raw_id: &str) -> Result<Book, BookError> {
    let id = parse_book_id(raw_id)?;
    Ok(state.books.find_by_id(id).await?)
}

pub async fn create(state: &AppState, draft: BookDraft) -> Result<Book, BookError> {
    let book = state.books.create(draft).await?;
    state
        .book_list
        .invalidate_best_effort(state.invalidate_timeout)
        .await;
    Ok(book)
}

pub async fn update(state: &AppState, id: u64, draft: BookDraft) -> Result<Book, BookError> {
    let book = state.books.update(id, draft).await?;
    state
        .book_list
        .invalidate_best_effort(state.invalidate_timeout)
        .await;
    Ok(book)
}

pub async fn delete(state: &AppState, id: u64) -> Result<(), BookError> {
    state.books.delete(id).await?;
    state
        .book_list
        .invalidate_best_effort(state.invalidate_timeout)
        .await;
    Ok(())
}

pub async fn search(state: &AppState, query: &SearchQuery) -> Result<Book, BookError> {
    SearchDispatcher::new(state.books.clone()).find(query).await
}
