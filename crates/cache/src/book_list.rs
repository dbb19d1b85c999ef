use std::future::Future;
use std::time::Duration;

use bookshelf_db::Book;

use crate::error::CacheError;
use crate::store::CacheStore;

/// The one key the book list lives under.
pub const BOOK_LIST_KEY: &str = "book:list";

/// Default lifetime of the cached list.
pub const BOOK_LIST_TTL: Duration = Duration::from_secs(60);

/// Default deadline for a single read or write against the backend.
pub const DEFAULT_OP_TIMEOUT: Duration = Duration::from_millis(250);

/// Cache-aside wrapper around the "list all books" query.
///
/// The cached value is always a whole snapshot of the collection: it is
/// either replaced or deleted, never patched. Reads are at most one TTL
/// stale after a write whose invalidation was lost. Every backend call is
/// bounded by the operation timeout, so a hanging backend costs a request at
/// most that long before it falls back to storage.
#[derive(Clone)]
pub struct BookListCache {
    store: CacheStore,
    ttl: Duration,
    op_timeout: Duration,
}

impl BookListCache {
    pub fn new(store: CacheStore) -> Self {
        Self {
            store,
            ttl: BOOK_LIST_TTL,
            op_timeout: DEFAULT_OP_TIMEOUT,
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    pub fn with_op_timeout(mut self, op_timeout: Duration) -> Self {
        self.op_timeout = op_timeout;
        self
    }

    pub fn store(&self) -> &CacheStore {
        &self.store
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn op_timeout(&self) -> Duration {
        self.op_timeout
    }

    /// Read the cached list.
    ///
    /// `Ok(None)` is a miss and tells the caller to go to storage. A payload
    /// that does not decode is reported as [`CacheError::Corrupt`], a backend
    /// that does not answer in time as [`CacheError::Timeout`].
    pub async fn get_list(&self) -> Result<Option<Vec<Book>>, CacheError> {
        let Some(bytes) = bounded(self.op_timeout, self.store.get(BOOK_LIST_KEY)).await?? else {
            return Ok(None);
        };

        let books = serde_json::from_slice(&bytes).map_err(CacheError::Corrupt)?;
        Ok(Some(books))
    }

    /// Replace the cached list with `books`.
    pub async fn set_list(&self, books: &[Book]) -> Result<(), CacheError> {
        let payload = serde_json::to_vec(books).map_err(CacheError::Encode)?;
        bounded(
            self.op_timeout,
            self.store.set(BOOK_LIST_KEY, payload, self.ttl),
        )
        .await?
    }

    /// Drop the cached list. Idempotent.
    pub async fn invalidate(&self) -> Result<(), CacheError> {
        self.store.delete(BOOK_LIST_KEY).await
    }

    /// [`invalidate`](Self::invalidate) bounded by `timeout`.
    pub async fn invalidate_within(&self, timeout: Duration) -> Result<(), CacheError> {
        bounded(timeout, self.invalidate()).await?
    }

    /// Invalidate after a committed write. Failures are logged and swallowed
    /// so a degraded cache never fails or stalls the write that triggered it.
    pub async fn invalidate_best_effort(&self, timeout: Duration) {
        match self.invalidate_within(timeout).await {
            Ok(()) => tracing::debug!(key = BOOK_LIST_KEY, "book list cache invalidated"),
            Err(err) => tracing::warn!(
                key = BOOK_LIST_KEY,
                error = %err,
                "book list cache invalidation failed"
            ),
        }
    }

    /// Serve the list from cache, or load it with `load` and repopulate.
    ///
    /// Cache errors are logged and treated like a miss. Errors from `load`
    /// are returned unchanged; a failed repopulation is only logged.
    pub async fn read_through<F, Fut, E>(&self, load: F) -> Result<Vec<Book>, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<Vec<Book>, E>>,
    {
        match self.get_list().await {
            Ok(Some(books)) => {
                tracing::debug!(count = books.len(), "book list served from cache");
                return Ok(books);
            }
            Ok(None) => tracing::debug!("book list cache miss"),
            Err(err) => tracing::warn!(
                error = %err,
                "book list cache unavailable, falling back to storage"
            ),
        }

        let books = load().await?;

        if let Err(err) = self.set_list(&books).await {
            tracing::warn!(error = %err, "failed to repopulate book list cache");
        }

        Ok(books)
    }
}

async fn bounded<T>(timeout: Duration, fut: impl Future<Output = T>) -> Result<T, CacheError> {
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| CacheError::Timeout(timeout))
}
