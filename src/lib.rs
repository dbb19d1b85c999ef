//! Bookshelf application library
//!
//! Application modules, shared handler state and page rendering, plus the
//! bootstrap used by both the `bookshelf` binary and the CLI.

pub mod bootstrap;
pub mod modules;
pub mod state;
pub mod views;

pub use state::AppState;
