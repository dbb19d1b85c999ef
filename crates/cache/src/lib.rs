//! Read-through / write-invalidate cache for the book list.
//!
//! [`CacheStore`] is a small key/value store with per-key TTL, backed either
//! by an in-process map or by Redis. [`BookListCache`] layers the cache-aside
//! protocol for the single `book:list` entry on top of it.

pub mod book_list;
pub mod error;
pub mod store;

pub use book_list::{BookListCache, BOOK_LIST_KEY, BOOK_LIST_TTL};
pub use error::CacheError;
pub use store::{CacheStore, MemoryCache, RedisCache};
