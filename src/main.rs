//! Librarium CLI - personal book catalog over the Gutendex API.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use librarium::catalog::Catalog;
use librarium::client::GutendexClient;
use librarium::config::Config;
use librarium::console::Console;
use librarium::store::{Author, Book, CatalogStore};

/// Personal book catalog over the Gutendex API.
#[derive(Parser, Debug)]
#[command(name = "librarium")]
#[command(author, version, about, long_about = None)]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Search the remote catalog by title and store the first match.
    Search {
        /// Free-text title to search for.
        title: String,
    },

    /// Look up an already-stored book by exact title (no network call).
    Find {
        /// Exact stored title.
        title: String,
    },

    /// List all stored books.
    Books,

    /// List all stored authors and their books.
    Authors,

    /// List stored books with the given language code.
    ByLanguage {
        /// Language code as stored, e.g. "en" or "es".
        code: String,
    },

    /// List authors who were alive in the given year.
    AliveIn {
        /// Year to check, bounds inclusive.
        year: i32,
    },

    /// Show aggregate catalog statistics.
    Stats,
}

#[tokio::main]
async fn main() {
    let console = Console::new();

    // Expected failures (no results, network down) should read as a
    // message, not a crash.
    if let Err(err) = run(&console).await {
        console.error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

async fn run(console: &Console) -> Result<()> {
    let args = Args::parse();

    let config = Config::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;

    let db_path = config.database_path()?;
    let store = CatalogStore::open(&db_path).context("Failed to open catalog database")?;
    let client = GutendexClient::new(&config.api)?;
    let mut catalog = Catalog::new(client, store);

    match args.command {
        Command::Search { title } => {
            console.step(&format!("Searching for \"{}\"...", title));
            let book = catalog.search_and_store(&title).await?;
            console.success("Book found and saved:");
            print_book(console, &book);
        }

        Command::Find { title } => match catalog.find_book_by_title(&title)? {
            Some(book) => print_book(console, &book),
            None => console.info(&format!("No stored book titled \"{}\"", title)),
        },

        Command::Books => {
            let books = catalog.list_books()?;
            if books.is_empty() {
                console.info("No books stored yet.");
            } else {
                console.section(&format!("Stored books ({})", books.len()));
                for book in &books {
                    print_book(console, book);
                    println!();
                }
            }
        }

        Command::Authors => {
            let authors = catalog.list_authors()?;
            if authors.is_empty() {
                console.info("No authors stored yet.");
            } else {
                console.section(&format!("Stored authors ({})", authors.len()));
                for author in &authors {
                    print_author(console, author);
                    println!();
                }
            }
        }

        Command::ByLanguage { code } => {
            let books = catalog.list_by_language(&code)?;
            if books.is_empty() {
                console.info(&format!("No books stored with language \"{}\"", code));
            } else {
                console.section(&format!("Books in \"{}\" ({})", code, books.len()));
                for book in &books {
                    print_book(console, book);
                    println!();
                }
            }
        }

        Command::AliveIn { year } => {
            let authors = catalog.list_authors_alive_in(year)?;
            if authors.is_empty() {
                console.info(&format!("No stored authors were alive in {}", year));
            } else {
                console.section(&format!("Authors alive in {} ({})", year, authors.len()));
                for author in &authors {
                    print_author(console, author);
                    println!();
                }
            }
        }

        Command::Stats => {
            let stats = catalog.stats()?;
            console.section("Catalog statistics");
            console.field("Books", &console.count(stats.total_books));
            console.field("Authors", &console.count(stats.total_authors));

            let mut languages: Vec<_> = stats.books_per_language.iter().collect();
            languages.sort();
            for (language, count) in languages {
                console.field(&format!("Books in \"{}\"", language), &console.count(*count));
            }
        }
    }

    Ok(())
}

/// Prints one book's fields in the catalog's list format.
fn print_book(console: &Console, book: &Book) {
    console.field("Title", &book.title);
    console.field(
        "Author",
        book.author
            .as_ref()
            .map(|a| a.name.as_str())
            .unwrap_or("(unknown)"),
    );
    console.field("Year", &opt_year(book.year));
    console.field("Language", &book.language);
}

/// Prints one author's fields with their book titles.
fn print_author(console: &Console, author: &Author) {
    console.field("Name", &author.name);
    console.field(
        "Lifespan",
        &format!(
            "{} - {}",
            opt_year(author.birth_year),
            opt_year(author.death_year)
        ),
    );
    let titles = if author.books.is_empty() {
        "(none stored)".to_string()
    } else {
        author
            .books
            .iter()
            .map(|b| b.title.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    };
    console.field("Books", &titles);
}

fn opt_year(year: Option<i32>) -> String {
    match year {
        Some(y) => y.to_string(),
        None => "?".to_string(),
    }
}
