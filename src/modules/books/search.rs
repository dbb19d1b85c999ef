//! Locating one book from a user-supplied id or title fragment.

use std::sync::Arc;

use bookshelf_db::{Book, BookFilter, BookStore};
use serde::Deserialize;

use super::error::BookError;

/// Search input as it arrives from a form or query string.
#[derive(Debug, Default, Clone, Deserialize)]
pub struct SearchQuery {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStrategy {
    /// Exact lookup by positive integer id.
    ByIdentifier,
    /// First book, in id order, whose title contains the value (case-sensitive).
    ByTitle,
}

impl SearchStrategy {
    /// Pick a strategy and the value it applies to.
    ///
    /// A non-blank id wins over a title; blank arguments count as absent.
    pub fn select<'q>(
        id: Option<&'q str>,
        title: Option<&'q str>,
    ) -> Result<(Self, &'q str), BookError> {
        let present = |v: Option<&'q str>| v.map(str::trim).filter(|v| !v.is_empty());

        if let Some(id) = present(id) {
            Ok((SearchStrategy::ByIdentifier, id))
        } else if let Some(title) = present(title) {
            Ok((SearchStrategy::ByTitle, title))
        } else {
            Err(BookError::MissingArgument)
        }
    }

    pub async fn locate(&self, store: &dyn BookStore, value: &str) -> Result<Book, BookError> {
        match self {
            SearchStrategy::ByIdentifier => {
                let id = parse_book_id(value)?;
                Ok(store.find_by_id(id).await?)
            }
            SearchStrategy::ByTitle => store
                .find_where(&BookFilter::TitleContains(value.to_string()))
                .await?
                .into_iter()
                .next()
                .ok_or(BookError::NotFound),
        }
    }
}

/// Parse a book id; only positive integers are ids.
pub fn parse_book_id(value: &str) -> Result<u64, BookError> {
    value
        .parse::<u64>()
        .ok()
        .filter(|id| *id > 0)
        .ok_or_else(|| BookError::InvalidArgument(value.to_string()))
}

/// Runs the find-before-act lookups of the update and delete flows.
#[derive(Clone)]
pub struct SearchDispatcher {
    store: Arc<dyn BookStore>,
}

impl SearchDispatcher {
    pub fn new(store: Arc<dyn BookStore>) -> Self {
        Self { store }
    }

    pub async fn find(&self, query: &SearchQuery) -> Result<Book, BookError> {
        let (strategy, value) =
            SearchStrategy::select(query.id.as_deref(), query.title.as_deref())?;
        tracing::debug!(?strategy, value, "searching for book");
        strategy.locate(self.store.as_ref(), value).await
    }
}
