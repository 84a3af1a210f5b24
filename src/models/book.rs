//! Book model and related types.

use std::collections::HashSet;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize, Serializer};
use thiserror::Error;
use utoipa::ToSchema;

/// Reason a book payload was rejected
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum BookViolation {
    #[error("Please provide the book name")]
    MissingName,
    #[error("readPage must not be greater than pageCount")]
    PageOverflow,
}

/// Full book record
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: String,
    pub name: String,
    pub year: i32,
    pub author: String,
    pub summary: String,
    pub publisher: String,
    pub page_count: u32,
    pub read_page: u32,
    /// Always `read_page == page_count`
    pub finished: bool,
    pub reading: bool,
    #[serde(serialize_with = "serialize_timestamp")]
    pub inserted_at: DateTime<Utc>,
    #[serde(serialize_with = "serialize_timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Build a new record from a payload that already passed [`BookPayload::validate`]
    pub fn new(id: String, name: String, payload: BookPayload, now: DateTime<Utc>) -> Self {
        Self {
            id,
            name,
            year: payload.year,
            author: payload.author,
            summary: payload.summary,
            publisher: payload.publisher,
            page_count: payload.page_count,
            read_page: payload.read_page,
            finished: payload.page_count == payload.read_page,
            reading: payload.reading,
            inserted_at: now,
            updated_at: now,
        }
    }

    /// Replace every mutable attribute; `id` and `inserted_at` are kept.
    pub fn apply(&mut self, name: String, payload: BookPayload, now: DateTime<Utc>) {
        self.name = name;
        self.year = payload.year;
        self.author = payload.author;
        self.summary = payload.summary;
        self.publisher = payload.publisher;
        self.page_count = payload.page_count;
        self.read_page = payload.read_page;
        self.finished = payload.page_count == payload.read_page;
        self.reading = payload.reading;
        self.updated_at = now.max(self.updated_at);
    }

    /// Case-insensitive substring match on the name. `needle` must be lowercase.
    pub fn name_contains(&self, needle: &str) -> bool {
        self.name.to_lowercase().contains(needle)
    }
}

/// Create/update book request.
///
/// `id`, `finished`, `insertedAt` and `updatedAt` are never read from input.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    pub name: Option<String>,
    #[serde(default)]
    pub year: i32,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub page_count: u32,
    #[serde(default)]
    pub read_page: u32,
    #[serde(default)]
    pub reading: bool,
}

impl BookPayload {
    /// Check the payload, returning the book name on success.
    ///
    /// A missing name is reported before a page overflow.
    pub fn validate(&self) -> Result<&str, BookViolation> {
        let name = match self.name.as_deref() {
            Some(name) if !name.is_empty() => name,
            _ => return Err(BookViolation::MissingName),
        };

        if self.read_page > self.page_count {
            return Err(BookViolation::PageOverflow);
        }

        Ok(name)
    }
}

/// Short book representation for lists
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct BookShort {
    pub id: String,
    pub name: String,
    pub publisher: String,
}

impl From<&Book> for BookShort {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id.clone(),
            name: book.name.clone(),
            publisher: book.publisher.clone(),
        }
    }
}

/// List filters
#[derive(Debug, Clone, Default)]
pub struct BookQuery {
    /// Case-insensitive substring of the name
    pub name: Option<String>,
    pub reading: Option<bool>,
    pub finished: Option<bool>,
}

impl BookQuery {
    /// Build filters from raw query-string pairs. Never fails.
    ///
    /// The first occurrence of a repeated key wins. `reading` and `finished`
    /// take `1`/`true` or `0`/`false`; any other value, empty included,
    /// counts as a filter not supplied. Unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        let mut seen = HashSet::new();

        for (key, value) in pairs {
            if !seen.insert(key.clone()) {
                continue;
            }
            match key.as_str() {
                "name" => query.name = Some(value),
                "reading" => query.reading = parse_flag(&value),
                "finished" => query.finished = parse_flag(&value),
                _ => {}
            }
        }

        query
    }

    /// Name filter, lowercased. An empty name counts as no filter.
    pub fn name_needle(&self) -> Option<String> {
        self.name
            .as_deref()
            .filter(|name| !name.is_empty())
            .map(str::to_lowercase)
    }

    pub fn is_empty(&self) -> bool {
        self.name_needle().is_none() && self.reading.is_none() && self.finished.is_none()
    }
}

fn parse_flag(raw: &str) -> Option<bool> {
    match raw {
        "1" | "true" => Some(true),
        "0" | "false" => Some(false),
        _ => None,
    }
}

/// ISO-8601 UTC timestamps with millisecond precision, e.g. `2026-10-18T08:00:00.000Z`
fn serialize_timestamp<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::Millis, true))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn payload(name: Option<&str>, page_count: u32, read_page: u32) -> BookPayload {
        BookPayload {
            name: name.map(str::to_string),
            page_count,
            read_page,
            ..Default::default()
        }
    }

    #[test]
    fn test_validate_missing_name() {
        assert_eq!(payload(None, 10, 5).validate(), Err(BookViolation::MissingName));
        assert_eq!(payload(Some(""), 10, 5).validate(), Err(BookViolation::MissingName));
        // Name is checked first
        assert_eq!(payload(None, 1, 5).validate(), Err(BookViolation::MissingName));
    }

    #[test]
    fn test_validate_page_overflow() {
        assert_eq!(payload(Some("Dune"), 10, 11).validate(), Err(BookViolation::PageOverflow));
        assert_eq!(payload(Some("Dune"), 10, 10).validate(), Ok("Dune"));
    }

    #[test]
    fn test_payload_ignores_derived_fields() {
        let payload: BookPayload = serde_json::from_str(
            r#"{"name":"Dune","pageCount":100,"readPage":20,"finished":true,"id":"x"}"#,
        )
        .unwrap();
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap();
        let book = Book::new("abc".into(), "Dune".into(), payload, now);
        assert_eq!(book.id, "abc");
        assert!(!book.finished);
        assert!(!book.reading);
    }

    #[test]
    fn test_negative_pages_rejected() {
        let result = serde_json::from_str::<BookPayload>(r#"{"name":"Dune","pageCount":-1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_serialized_shape() {
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap();
        let book = Book::new("abc".into(), "Dune".into(), payload(Some("Dune"), 3, 3), now);
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["pageCount"], 3);
        assert_eq!(json["finished"], true);
        assert_eq!(json["insertedAt"], "2026-10-18T08:00:00.000Z");
        assert_eq!(json["updatedAt"], json["insertedAt"]);
    }

    #[test]
    fn test_apply_keeps_identity() {
        let created = Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 10, 18, 9, 0, 0).unwrap();
        let mut book = Book::new("abc".into(), "Dune".into(), payload(Some("Dune"), 3, 1), created);

        book.apply("Dune Messiah".into(), payload(Some("Dune Messiah"), 5, 5), later);

        assert_eq!(book.id, "abc");
        assert_eq!(book.name, "Dune Messiah");
        assert!(book.finished);
        assert_eq!(book.inserted_at, created);
        assert_eq!(book.updated_at, later);
    }

    #[test]
    fn test_apply_never_moves_updated_at_backwards() {
        let created = Utc.with_ymd_and_hms(2026, 10, 18, 8, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2026, 10, 18, 7, 0, 0).unwrap();
        let mut book = Book::new("abc".into(), "Dune".into(), payload(Some("Dune"), 3, 1), created);

        book.apply("Dune".into(), payload(Some("Dune"), 3, 2), earlier);

        assert_eq!(book.updated_at, created);
    }

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn test_query_flags() {
        let query = BookQuery::from_pairs(pairs(&[("reading", "1"), ("finished", "false")]));
        assert_eq!(query.reading, Some(true));
        assert_eq!(query.finished, Some(false));
        assert!(!query.is_empty());
    }

    #[test]
    fn test_unrecognized_flags_count_as_absent() {
        for value in ["maybe", "", "2", "yes"] {
            let query = BookQuery::from_pairs(pairs(&[("reading", value), ("finished", value)]));
            assert_eq!(query.reading, None);
            assert_eq!(query.finished, None);
            assert!(query.is_empty());
        }
    }

    #[test]
    fn test_repeated_keys_keep_first_value() {
        let query = BookQuery::from_pairs(pairs(&[
            ("name", "a"),
            ("name", "b"),
            ("reading", "x"),
            ("reading", "1"),
            ("page", "3"),
        ]));
        assert_eq!(query.name.as_deref(), Some("a"));
        assert_eq!(query.reading, None);
        assert_eq!(query.finished, None);
    }

    #[test]
    fn test_empty_name_filter_is_ignored() {
        let query = BookQuery {
            name: Some(String::new()),
            ..Default::default()
        };
        assert!(query.is_empty());

        let query = BookQuery {
            name: Some("UKU".into()),
            ..Default::default()
        };
        assert_eq!(query.name_needle().as_deref(), Some("uku"));
    }
}
