//! Librarium - personal book catalog over the Gutendex API.
//!
//! This library provides functionality for:
//! - Searching the remote catalog by title and normalizing the first result
//! - Persisting books and authors in SQLite with title deduplication
//! - Read queries over the stored catalog (languages, living authors, stats)

pub mod catalog;
pub mod client;
pub mod config;
pub mod console;
pub mod error;
pub mod normalize;
pub mod store;

// Re-export commonly used types
pub use catalog::Catalog;
pub use client::{BookSearch, GutendexClient};
pub use config::Config;
pub use console::Console;
pub use error::{ClientError, ConfigError, NormalizeError, StoreError};
pub use normalize::{CandidateAuthor, CandidateBook, UNKNOWN_LANGUAGE, normalize};
pub use store::{Author, AuthorInfo, Book, BookSummary, CatalogStore, LibraryStats};
