//! Book model

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::{IntoParams, ToSchema};

/// Book record as held by the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Opaque 16 character identifier
    pub id: String,
    pub name: String,
    pub year: Option<i32>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    /// Total number of pages
    pub page_count: Option<i64>,
    /// Number of pages already read
    pub read_page: Option<i64>,
    /// True when `read_page` equals `page_count`
    pub finished: bool,
    pub reading: bool,
    pub inserted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Book {
    /// Build a new record from a validated payload.
    pub fn from_payload(
        id: String,
        name: String,
        payload: &BookPayload,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            name,
            year: payload.year,
            author: payload.author.clone(),
            summary: payload.summary.clone(),
            publisher: payload.publisher.clone(),
            page_count: payload.page_count,
            read_page: payload.read_page,
            finished: payload.is_finished(),
            reading: payload.reading,
            inserted_at: now,
            updated_at: now,
        }
    }

    /// Replace every editable field. `id` and `inserted_at` are left untouched.
    pub fn apply(&mut self, name: String, payload: &BookPayload, now: DateTime<Utc>) {
        self.name = name;
        self.year = payload.year;
        self.author = payload.author.clone();
        self.summary = payload.summary.clone();
        self.publisher = payload.publisher.clone();
        self.page_count = payload.page_count;
        self.read_page = payload.read_page;
        self.finished = payload.is_finished();
        self.reading = payload.reading;
        self.updated_at = now;
    }

    pub fn to_summary(&self) -> BookSummary {
        BookSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            publisher: self.publisher.clone(),
        }
    }
}

/// Short representation used in list responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct BookSummary {
    pub id: String,
    pub name: String,
    pub publisher: Option<String>,
}

/// Create / update request body. Updates resend the full field set.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    /// Required; a missing or null name is rejected
    pub name: Option<String>,
    pub year: Option<i32>,
    pub author: Option<String>,
    pub summary: Option<String>,
    pub publisher: Option<String>,
    pub page_count: Option<i64>,
    pub read_page: Option<i64>,
    #[serde(default)]
    pub reading: bool,
}

impl BookPayload {
    /// `read_page` past `page_count`. Only decidable when both are present.
    pub fn read_page_exceeds_page_count(&self) -> bool {
        matches!((self.read_page, self.page_count), (Some(read), Some(total)) if read > total)
    }

    pub fn is_finished(&self) -> bool {
        self.page_count == self.read_page
    }
}

/// Raw list query parameters
#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct BookQuery {
    /// Case-insensitive substring of the book name
    pub name: Option<String>,
    /// `1`/`0` (or `true`/`false`)
    pub reading: Option<String>,
    /// `1`/`0` (or `true`/`false`)
    pub finished: Option<String>,
}

impl BookQuery {
    /// Build from raw query pairs. A repeated key keeps its last value and
    /// unknown keys are ignored.
    pub fn from_pairs<I>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "name" => query.name = Some(value),
                "reading" => query.reading = Some(value),
                "finished" => query.finished = Some(value),
                _ => {}
            }
        }
        query
    }
}

/// Boolean-ish query value after numeric coercion
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlagFilter {
    Is(bool),
    /// Value that coerces to neither true nor false; matches nothing
    Unmatchable,
}

impl FlagFilter {
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        match raw {
            "true" => return FlagFilter::Is(true),
            "false" | "" => return FlagFilter::Is(false),
            _ => {}
        }
        match raw.parse::<f64>() {
            Ok(n) if n.is_nan() => FlagFilter::Unmatchable,
            Ok(n) => FlagFilter::Is(n != 0.0),
            Err(_) => FlagFilter::Unmatchable,
        }
    }

    pub fn matches(self, value: bool) -> bool {
        matches!(self, FlagFilter::Is(expected) if expected == value)
    }
}

/// Parsed list filter. Every supplied criterion must match.
#[derive(Debug, Clone, Default)]
pub struct BookFilter {
    name: Option<String>,
    reading: Option<FlagFilter>,
    finished: Option<FlagFilter>,
}

impl BookFilter {
    pub fn matches(&self, book: &Book) -> bool {
        if let Some(needle) = &self.name {
            if !book.name.to_lowercase().contains(needle) {
                return false;
            }
        }
        if let Some(reading) = self.reading {
            if !reading.matches(book.reading) {
                return false;
            }
        }
        if let Some(finished) = self.finished {
            if !finished.matches(book.finished) {
                return false;
            }
        }
        true
    }
}

impl From<&BookQuery> for BookFilter {
    fn from(query: &BookQuery) -> Self {
        Self {
            name: query.name.as_ref().map(|n| n.to_lowercase()),
            reading: query.reading.as_deref().map(FlagFilter::parse),
            finished: query.finished.as_deref().map(FlagFilter::parse),
        }
    }
}
