//! Record storage for the library.
//!
//! The relational engine is an external collaborator; this crate defines the
//! narrow storage API the rest of the workspace talks to ([`BookStore`],
//! [`UserStore`]) together with in-memory implementations used by the
//! default binary and by tests.

pub mod error;
pub mod memory;
pub mod model;
pub mod store;

pub use error::StorageError;
pub use memory::{MemoryBookStore, MemoryUserStore};
pub use model::{round_rating, Book, BookDraft, User};
pub use store::{BookFilter, BookStore, UserStore};
