// Core structs: KeywordGroup, TimeSeriesRow, ItemRow, NormalizedTable
use chrono::NaiveDate;
use serde::Serialize;
use thiserror::Error;

/// Upstream ceiling on keyword groups per trend request.
pub const MAX_GROUP_SIZE: usize = 5;

/// A bounded batch of keywords sent in one trend request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeywordGroup {
    name: String,
    keywords: Vec<String>,
}

impl KeywordGroup {
    /// Returns `None` when `keywords` is empty or exceeds [`MAX_GROUP_SIZE`].
    pub fn new(name: impl Into<String>, keywords: Vec<String>) -> Option<Self> {
        if keywords.is_empty() || keywords.len() > MAX_GROUP_SIZE {
            return None;
        }
        Some(Self {
            name: name.into(),
            keywords,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn keywords(&self) -> &[String] {
        &self.keywords
    }

    pub fn len(&self) -> usize {
        self.keywords.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keywords.is_empty()
    }
}

/// One (keyword, period) observation of the relative search index.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeSeriesRow {
    pub period: NaiveDate,
    /// Relative index, nominally 0..=100. Not range-checked.
    pub value: f64,
    pub keyword: String,
}

/// One search result from the shop or blog lookup.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemRow {
    pub title: String,
    pub price: Option<f64>,
    pub seller_name: String,
    pub category: String,
    pub link: String,
    pub brand: Option<String>,
    pub blogger_name: Option<String>,
    pub post_date: Option<NaiveDate>,
}

/// Schema-uniform rows produced from one or more upstream responses.
///
/// An empty table carrying a `note` is the "no data" outcome; it is a valid
/// state, not an error.
#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedTable<R> {
    pub rows: Vec<R>,
    pub note: Option<String>,
}

impl<R> NormalizedTable<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self { rows, note: None }
    }

    pub fn empty(note: impl Into<String>) -> Self {
        Self {
            rows: Vec::new(),
            note: Some(note.into()),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn is_empty_result(&self) -> bool {
        self.rows.is_empty() && self.note.is_some()
    }
}

impl<R> Default for NormalizedTable<R> {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    #[error("API credentials are not configured")]
    MissingCredentials,
    #[error("upstream returned HTTP {status}: {body}")]
    UpstreamHttp { status: u16, body: String },
    #[error("malformed response: {0}")]
    MalformedResponse(String),
    #[error("transport error: {0}")]
    Transport(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("invalid config: {0}")]
    Invalid(String),
}
