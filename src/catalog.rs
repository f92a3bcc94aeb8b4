//! Catalog facade composing the search client, the normalizer, and the
//! persistent store into the operations the CLI calls.
//!
//! All methods return plain data records; callers never deal with lazy
//! loading or transactions.

use crate::client::BookSearch;
use crate::error::Result;
use crate::normalize::normalize;
use crate::store::{Author, Book, CatalogStore, LibraryStats};

/// High-level book catalog service.
///
/// Generic over the search backend so tests can drive the full pipeline
/// with canned responses.
pub struct Catalog<S: BookSearch> {
    client: S,
    store: CatalogStore,
}

impl<S: BookSearch> Catalog<S> {
    /// Creates a catalog over the given search backend and store.
    pub fn new(client: S, store: CatalogStore) -> Self {
        Self { client, store }
    }

    /// Searches the remote API by title and stores the first result.
    ///
    /// Returns the stored book; if a book with the same title already
    /// exists, the existing record is returned and nothing is written.
    /// Transport failures, malformed payloads, and empty result sets
    /// propagate as errors.
    pub async fn search_and_store(&mut self, title: &str) -> Result<Book> {
        let raw = self.client.search(title).await?;
        let candidate = normalize(&raw)?;
        let book = self.store.save_if_absent(&candidate)?;
        Ok(book)
    }

    /// Looks up an already-stored book by exact title. Local only, no
    /// network call.
    pub fn find_book_by_title(&self, title: &str) -> Result<Option<Book>> {
        Ok(self.store.find_by_title(title)?)
    }

    /// Lists every stored book with its author resolved.
    pub fn list_books(&self) -> Result<Vec<Book>> {
        Ok(self.store.all_books()?)
    }

    /// Lists every stored author with their books resolved.
    pub fn list_authors(&self) -> Result<Vec<Author>> {
        Ok(self.store.all_authors()?)
    }

    /// Lists books whose stored language matches the code exactly.
    pub fn list_by_language(&self, code: &str) -> Result<Vec<Book>> {
        Ok(self.store.books_by_language(code)?)
    }

    /// Lists authors alive in the given year (bounds inclusive).
    pub fn list_authors_alive_in(&self, year: i32) -> Result<Vec<Author>> {
        Ok(self.store.authors_alive_in(year)?)
    }

    /// Returns aggregate catalog statistics.
    pub fn stats(&self) -> Result<LibraryStats> {
        Ok(self.store.stats()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{ClientError, NormalizeError};
    use async_trait::async_trait;

    const DUNE: &str = r#"{"results":[{"title":"Dune","download_count":42,"languages":["en"],"authors":[{"name":"Frank Herbert","birth_year":1920,"death_year":1986}]}]}"#;

    /// Search stub returning the same canned body for every title.
    struct StubSearch(&'static str);

    #[async_trait]
    impl BookSearch for StubSearch {
        async fn search(&self, _title: &str) -> std::result::Result<String, ClientError> {
            Ok(self.0.to_string())
        }
    }

    /// Search stub that always fails with a timeout.
    struct DownSearch;

    #[async_trait]
    impl BookSearch for DownSearch {
        async fn search(&self, _title: &str) -> std::result::Result<String, ClientError> {
            Err(ClientError::Timeout)
        }
    }

    fn catalog(body: &'static str) -> Catalog<StubSearch> {
        Catalog::new(StubSearch(body), CatalogStore::open_in_memory().unwrap())
    }

    #[tokio::test]
    async fn test_search_and_store_end_to_end() {
        let mut catalog = catalog(DUNE);
        let book = catalog.search_and_store("dune").await.unwrap();

        assert_eq!(book.title, "Dune");
        assert_eq!(book.year, Some(42));
        assert_eq!(book.language, "en");

        let books = catalog.list_books().unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].author.as_ref().unwrap().name, "Frank Herbert");

        let alive_1950 = catalog.list_authors_alive_in(1950).unwrap();
        assert_eq!(alive_1950.len(), 1);
        assert_eq!(alive_1950[0].name, "Frank Herbert");
        assert!(catalog.list_authors_alive_in(1990).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_search_and_store_is_idempotent() {
        let mut catalog = catalog(DUNE);

        let first = catalog.search_and_store("dune").await.unwrap();
        let second = catalog.search_and_store("dune").await.unwrap();

        assert_eq!(first.id, second.id);
        assert_eq!(catalog.stats().unwrap().total_books, 1);
    }

    #[tokio::test]
    async fn test_no_results_propagates() {
        let mut catalog = catalog(r#"{"results":[]}"#);
        let err = catalog.search_and_store("nothing").await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<NormalizeError>(),
            Some(NormalizeError::NoResults)
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_propagates() {
        let mut catalog = Catalog::new(DownSearch, CatalogStore::open_in_memory().unwrap());
        let err = catalog.search_and_store("dune").await.unwrap_err();

        assert!(matches!(
            err.downcast_ref::<ClientError>(),
            Some(ClientError::Timeout)
        ));
    }

    #[tokio::test]
    async fn test_find_book_by_title_is_local() {
        let mut catalog = catalog(DUNE);
        catalog.search_and_store("dune").await.unwrap();

        let found = catalog.find_book_by_title("Dune").unwrap();
        assert_eq!(found.unwrap().title, "Dune");
        assert!(catalog.find_book_by_title("Missing").unwrap().is_none());
    }
}
