//! Persistent catalog store backed by SQLite.
//!
//! Owns the schema, the dedup-on-title write path, and the read-only
//! query operations. The title uniqueness constraint lives in the
//! database itself, so the no-duplicate invariant holds even with a
//! second process writing to the same file.

use crate::error::StoreError;
use crate::normalize::CandidateBook;
use rusqlite::{Connection, OptionalExtension, Row, params};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// A persisted book with its author eagerly resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Book {
    pub id: i64,
    pub title: String,
    /// Download-count value stored under the original "year" attribute.
    pub year: Option<i32>,
    pub language: String,
    pub author: Option<AuthorInfo>,
}

/// Author fields as embedded in a [`Book`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorInfo {
    pub id: i64,
    pub name: String,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
}

/// A persisted author with their books eagerly resolved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Author {
    pub id: i64,
    pub name: String,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
    pub books: Vec<BookSummary>,
}

/// Minimal book reference inside an [`Author`]'s collection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookSummary {
    pub id: i64,
    pub title: String,
}

/// Aggregate catalog statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryStats {
    pub total_books: usize,
    pub total_authors: usize,
    pub books_per_language: HashMap<String, usize>,
}

/// SQLite-backed catalog store.
pub struct CatalogStore {
    conn: Connection,
}

impl CatalogStore {
    /// Opens (or creates) the catalog database at the given path.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        Self::from_connection(conn)
    }

    /// Opens an in-memory catalog, used by tests.
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    fn from_connection(conn: Connection) -> Result<Self, StoreError> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS authors (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                birth_year INTEGER,
                death_year INTEGER
            )",
            [],
        )?;

        conn.execute(
            "CREATE TABLE IF NOT EXISTS books (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                title TEXT NOT NULL UNIQUE,
                year INTEGER,
                language TEXT NOT NULL,
                author_id INTEGER REFERENCES authors(id)
            )",
            [],
        )?;

        Ok(Self { conn })
    }

    /// Saves a candidate unless a book with the same title already exists.
    ///
    /// On a title match the existing row is returned unchanged; the new
    /// fetch does not refresh its year or language. A fresh author row is
    /// created for every newly inserted book (no author dedup by name).
    pub fn save_if_absent(&mut self, candidate: &CandidateBook) -> Result<Book, StoreError> {
        let tx = self.conn.transaction()?;

        if let Some(existing) = book_by_title(&tx, &candidate.title)? {
            return Ok(existing);
        }

        let author_id = match &candidate.author {
            Some(author) => {
                tx.execute(
                    "INSERT INTO authors (name, birth_year, death_year) VALUES (?1, ?2, ?3)",
                    params![author.name, author.birth_year, author.death_year],
                )?;
                Some(tx.last_insert_rowid())
            }
            None => None,
        };

        // The UNIQUE constraint backs up the lookup above: if another
        // writer slipped a row in, treat the conflict as success.
        let inserted = tx.execute(
            "INSERT INTO books (title, year, language, author_id)
             VALUES (?1, ?2, ?3, ?4)
             ON CONFLICT(title) DO NOTHING",
            params![candidate.title, candidate.year, candidate.language, author_id],
        )?;

        if inserted == 0 {
            // Lost the race. Roll back the orphan author row and return
            // whatever the other writer committed.
            tx.rollback()?;
            return self
                .find_by_title(&candidate.title)?
                .ok_or_else(|| StoreError::MissingRecord(candidate.title.clone()));
        }

        let book = book_by_title(&tx, &candidate.title)?
            .ok_or_else(|| StoreError::MissingRecord(candidate.title.clone()))?;
        tx.commit()?;

        Ok(book)
    }

    /// Inserts the book, or overwrites the `year` and `language` of an
    /// existing book with the same title.
    ///
    /// This is the explicit update path; note that it refreshes fields
    /// where [`CatalogStore::save_if_absent`] deliberately does not.
    pub fn upsert_by_title(&mut self, book: &Book) -> Result<Book, StoreError> {
        let tx = self.conn.transaction()?;

        let updated = tx.execute(
            "UPDATE books SET year = ?2, language = ?3 WHERE title = ?1",
            params![book.title, book.year, book.language],
        )?;

        if updated == 0 {
            tx.execute(
                "INSERT INTO books (title, year, language, author_id) VALUES (?1, ?2, ?3, ?4)",
                params![
                    book.title,
                    book.year,
                    book.language,
                    book.author.as_ref().map(|a| a.id)
                ],
            )?;
        }

        let stored = book_by_title(&tx, &book.title)?
            .ok_or_else(|| StoreError::MissingRecord(book.title.clone()))?;
        tx.commit()?;

        Ok(stored)
    }

    /// Looks up a single book by exact title.
    pub fn find_by_title(&self, title: &str) -> Result<Option<Book>, StoreError> {
        Ok(book_by_title(&self.conn, title)?)
    }

    /// Returns all books, authors included.
    pub fn all_books(&self) -> Result<Vec<Book>, StoreError> {
        let mut stmt = self.conn.prepare(&format!("{BOOK_SELECT} ORDER BY b.id"))?;
        let books = stmt
            .query_map([], map_book)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(books)
    }

    /// Returns all books stored with exactly the given language code.
    ///
    /// An unknown code yields an empty list, not an error.
    pub fn books_by_language(&self, language: &str) -> Result<Vec<Book>, StoreError> {
        let mut stmt = self
            .conn
            .prepare(&format!("{BOOK_SELECT} WHERE b.language = ?1 ORDER BY b.id"))?;
        let books = stmt
            .query_map([language], map_book)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(books)
    }

    /// Returns all authors, each with their book list materialized.
    pub fn all_authors(&self) -> Result<Vec<Author>, StoreError> {
        self.authors_where("", params![])
    }

    /// Returns authors alive in the given year, bounds inclusive.
    ///
    /// Authors missing either a birth or a death year cannot be evaluated
    /// against the interval and are excluded.
    pub fn authors_alive_in(&self, year: i32) -> Result<Vec<Author>, StoreError> {
        self.authors_where(
            "WHERE ?1 BETWEEN a.birth_year AND a.death_year",
            params![year],
        )
    }

    fn authors_where<P: rusqlite::Params>(
        &self,
        filter: &str,
        filter_params: P,
    ) -> Result<Vec<Author>, StoreError> {
        let mut stmt = self.conn.prepare(&format!(
            "SELECT a.id, a.name, a.birth_year, a.death_year FROM authors a {filter} ORDER BY a.id"
        ))?;
        let mut authors = stmt
            .query_map(filter_params, |row| {
                Ok(Author {
                    id: row.get(0)?,
                    name: row.get(1)?,
                    birth_year: row.get(2)?,
                    death_year: row.get(3)?,
                    books: Vec::new(),
                })
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        // Materialize each author's books up front so callers never see
        // an unresolved collection.
        let mut books_stmt = self
            .conn
            .prepare("SELECT id, title FROM books WHERE author_id = ?1 ORDER BY id")?;
        for author in &mut authors {
            author.books = books_stmt
                .query_map([author.id], |row| {
                    Ok(BookSummary {
                        id: row.get(0)?,
                        title: row.get(1)?,
                    })
                })?
                .collect::<rusqlite::Result<Vec<_>>>()?;
        }

        Ok(authors)
    }

    /// Returns aggregate counts over the whole catalog.
    pub fn stats(&self) -> Result<LibraryStats, StoreError> {
        let total_books: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM books", [], |row| row.get(0))?;
        let total_authors: i64 =
            self.conn
                .query_row("SELECT COUNT(*) FROM authors", [], |row| row.get(0))?;

        let mut stmt = self
            .conn
            .prepare("SELECT language, COUNT(*) FROM books GROUP BY language")?;
        let books_per_language = stmt
            .query_map([], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)? as usize))
            })?
            .collect::<rusqlite::Result<HashMap<_, _>>>()?;

        Ok(LibraryStats {
            total_books: total_books as usize,
            total_authors: total_authors as usize,
            books_per_language,
        })
    }
}

/// Shared SELECT for book rows with the author joined in.
const BOOK_SELECT: &str = "SELECT b.id, b.title, b.year, b.language,
        a.id, a.name, a.birth_year, a.death_year
 FROM books b LEFT JOIN authors a ON b.author_id = a.id";

fn map_book(row: &Row<'_>) -> rusqlite::Result<Book> {
    let author = match row.get::<_, Option<i64>>(4)? {
        Some(id) => Some(AuthorInfo {
            id,
            name: row.get(5)?,
            birth_year: row.get(6)?,
            death_year: row.get(7)?,
        }),
        None => None,
    };

    Ok(Book {
        id: row.get(0)?,
        title: row.get(1)?,
        year: row.get(2)?,
        language: row.get(3)?,
        author,
    })
}

fn book_by_title(conn: &Connection, title: &str) -> rusqlite::Result<Option<Book>> {
    conn.query_row(
        &format!("{BOOK_SELECT} WHERE b.title = ?1"),
        [title],
        map_book,
    )
    .optional()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::normalize::CandidateAuthor;

    fn candidate(title: &str, language: &str) -> CandidateBook {
        CandidateBook {
            title: title.to_string(),
            year: Some(42),
            language: language.to_string(),
            author: Some(CandidateAuthor {
                name: "Frank Herbert".to_string(),
                birth_year: Some(1920),
                death_year: Some(1986),
            }),
        }
    }

    #[test]
    fn test_save_and_read_back() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let book = store.save_if_absent(&candidate("Dune", "en")).unwrap();

        assert_eq!(book.title, "Dune");
        assert_eq!(book.year, Some(42));
        assert_eq!(book.language, "en");
        assert_eq!(book.author.as_ref().unwrap().name, "Frank Herbert");

        let books = store.all_books().unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0], book);
    }

    #[test]
    fn test_duplicate_title_returns_existing_unchanged() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let first = store.save_if_absent(&candidate("Dune", "en")).unwrap();

        let mut refetched = candidate("Dune", "fr");
        refetched.year = Some(99);
        let second = store.save_if_absent(&refetched).unwrap();

        // Import is a no-op on duplicates: same id, fields not refreshed.
        assert_eq!(second.id, first.id);
        assert_eq!(second.language, "en");
        assert_eq!(second.year, Some(42));
        assert_eq!(store.all_books().unwrap().len(), 1);
        assert_eq!(store.stats().unwrap().total_authors, 1);
    }

    #[test]
    fn test_book_without_author() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let mut anonymous = candidate("Beowulf", "en");
        anonymous.author = None;

        let book = store.save_if_absent(&anonymous).unwrap();
        assert!(book.author.is_none());
        assert_eq!(store.stats().unwrap().total_authors, 0);
        assert_eq!(store.all_books().unwrap()[0].author, None);
    }

    #[test]
    fn test_authors_not_deduped_across_imports() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        store.save_if_absent(&candidate("Dune", "en")).unwrap();
        store
            .save_if_absent(&candidate("Dune Messiah", "en"))
            .unwrap();

        // Same author name, two distinct rows: the import path creates a
        // fresh author per book.
        let authors = store.all_authors().unwrap();
        assert_eq!(authors.len(), 2);
        assert_eq!(authors[0].name, authors[1].name);
        assert_ne!(authors[0].id, authors[1].id);
    }

    #[test]
    fn test_upsert_overwrites_year_and_language() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let book = store.save_if_absent(&candidate("Dune", "en")).unwrap();

        let updated = Book {
            year: Some(1965),
            language: "fr".to_string(),
            ..book.clone()
        };
        let stored = store.upsert_by_title(&updated).unwrap();

        assert_eq!(stored.id, book.id);
        assert_eq!(stored.year, Some(1965));
        assert_eq!(stored.language, "fr");
        assert_eq!(store.all_books().unwrap().len(), 1);
    }

    #[test]
    fn test_upsert_inserts_when_absent() {
        let mut store = CatalogStore::open_in_memory().unwrap();

        let book = Book {
            id: 0,
            title: "Emma".to_string(),
            year: Some(7),
            language: "en".to_string(),
            author: None,
        };
        let stored = store.upsert_by_title(&book).unwrap();

        assert_eq!(stored.title, "Emma");
        assert_eq!(store.all_books().unwrap().len(), 1);
    }

    #[test]
    fn test_books_by_language_exact_match() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        store.save_if_absent(&candidate("Dune", "en")).unwrap();
        store.save_if_absent(&candidate("Ficciones", "es")).unwrap();

        let english = store.books_by_language("en").unwrap();
        assert_eq!(english.len(), 1);
        assert_eq!(english[0].title, "Dune");

        // Unknown code: empty list, not an error.
        assert!(store.books_by_language("xx").unwrap().is_empty());
    }

    #[test]
    fn test_authors_alive_in_bounds_inclusive() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        store.save_if_absent(&candidate("Dune", "en")).unwrap();

        // Herbert: 1920-1986.
        assert!(store.authors_alive_in(1919).unwrap().is_empty());
        assert_eq!(store.authors_alive_in(1920).unwrap().len(), 1);
        assert_eq!(store.authors_alive_in(1950).unwrap().len(), 1);
        assert_eq!(store.authors_alive_in(1986).unwrap().len(), 1);
        assert!(store.authors_alive_in(1987).unwrap().is_empty());
    }

    #[test]
    fn test_authors_alive_in_excludes_unknown_lifespan() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        let mut epic = candidate("Iliad", "el");
        epic.author = Some(CandidateAuthor {
            name: "Homer".to_string(),
            birth_year: None,
            death_year: None,
        });
        store.save_if_absent(&epic).unwrap();

        assert!(store.authors_alive_in(1950).unwrap().is_empty());
        assert_eq!(store.all_authors().unwrap().len(), 1);
    }

    #[test]
    fn test_authors_books_eagerly_resolved() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        store.save_if_absent(&candidate("Dune", "en")).unwrap();

        let authors = store.authors_alive_in(1950).unwrap();
        assert_eq!(authors.len(), 1);
        assert_eq!(authors[0].books.len(), 1);
        assert_eq!(authors[0].books[0].title, "Dune");
    }

    #[test]
    fn test_stats_counts_per_language() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        store.save_if_absent(&candidate("Dune", "en")).unwrap();
        store.save_if_absent(&candidate("Emma", "en")).unwrap();
        store.save_if_absent(&candidate("Ficciones", "es")).unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.total_books, 3);
        assert_eq!(stats.total_authors, 3);
        assert_eq!(stats.books_per_language.get("en"), Some(&2));
        assert_eq!(stats.books_per_language.get("es"), Some(&1));
        assert_eq!(stats.books_per_language.get("xx"), None);
    }

    #[test]
    fn test_find_by_title() {
        let mut store = CatalogStore::open_in_memory().unwrap();
        store.save_if_absent(&candidate("Dune", "en")).unwrap();

        assert!(store.find_by_title("Dune").unwrap().is_some());
        assert!(store.find_by_title("dune").unwrap().is_none());
        assert!(store.find_by_title("Missing").unwrap().is_none());
    }

    #[test]
    fn test_open_creates_file_and_persists() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("catalog.db");

        {
            let mut store = CatalogStore::open(&path).unwrap();
            store.save_if_absent(&candidate("Dune", "en")).unwrap();
        }

        let store = CatalogStore::open(&path).unwrap();
        assert_eq!(store.all_books().unwrap().len(), 1);
    }
}
