//! Response normalization for the book catalog API.
//!
//! Turns the loosely-structured JSON search payload into a validated
//! candidate record ready for persistence. Pure transformation, no I/O.

use crate::error::NormalizeError;
use serde::Deserialize;

/// Language value used when the API result carries no languages list.
pub const UNKNOWN_LANGUAGE: &str = "unknown";

/// Raw search response as returned by the API.
#[derive(Debug, Deserialize)]
struct SearchResponse {
    results: Option<Vec<RawResult>>,
}

/// One raw search result. Every field is optional at this layer;
/// requiredness is enforced by `normalize`, not by serde.
#[derive(Debug, Deserialize)]
struct RawResult {
    title: Option<String>,
    download_count: Option<i32>,
    languages: Option<Vec<String>>,
    authors: Option<Vec<RawAuthor>>,
}

/// Raw author entry inside a search result.
#[derive(Debug, Deserialize)]
struct RawAuthor {
    name: Option<String>,
    birth_year: Option<i32>,
    death_year: Option<i32>,
}

/// A normalized book candidate, not yet persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateBook {
    /// Book title, the catalog's natural key.
    pub title: String,

    /// The API's download count, stored under the original system's
    /// "year" attribute. Kept as-is until the mapping is revisited.
    pub year: Option<i32>,

    /// First language code of the result, or [`UNKNOWN_LANGUAGE`].
    pub language: String,

    /// First listed author, if the result had any.
    pub author: Option<CandidateAuthor>,
}

/// A normalized author candidate attached to a [`CandidateBook`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateAuthor {
    pub name: String,
    pub birth_year: Option<i32>,
    pub death_year: Option<i32>,
}

/// Normalizes a raw API response body into a [`CandidateBook`].
///
/// Only the first element of `results` is considered; there is no ranking
/// or fuzzy matching against the searched title.
///
/// # Errors
/// - [`NormalizeError::MalformedResponse`] if the body isn't valid JSON
/// - [`NormalizeError::NoResults`] if `results` is absent or empty
/// - [`NormalizeError::MissingField`] if a required field (title,
///   author name) is missing from the selected result
pub fn normalize(raw: &str) -> Result<CandidateBook, NormalizeError> {
    let response: SearchResponse = serde_json::from_str(raw)?;

    let first = response
        .results
        .unwrap_or_default()
        .into_iter()
        .next()
        .ok_or(NormalizeError::NoResults)?;

    let title = first.title.ok_or(NormalizeError::MissingField("title"))?;

    let language = first
        .languages
        .unwrap_or_default()
        .into_iter()
        .next()
        .unwrap_or_else(|| UNKNOWN_LANGUAGE.to_string());

    let author = match first.authors.unwrap_or_default().into_iter().next() {
        Some(raw_author) => Some(CandidateAuthor {
            name: raw_author
                .name
                .ok_or(NormalizeError::MissingField("author name"))?,
            birth_year: raw_author.birth_year,
            death_year: raw_author.death_year,
        }),
        None => None,
    };

    Ok(CandidateBook {
        title,
        year: first.download_count,
        language,
        author,
    })
}
