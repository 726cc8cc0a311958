//! SQLite query layer for listing, searching and sampling images.
//!
//! Request parameters are translated into a [`ListRequest`] at the boundary,
//! then into one of three fixed, fully parameterized statements. User input
//! never reaches SQL text.

use std::num::IntErrorKind;

use rusqlite::{Connection, OptionalExtension, Row, params};
use serde::{Deserialize, Serialize};

use crate::error::GalleryError;
use crate::store::Store;

/// Number of records per listing page. Not caller-configurable.
pub const PAGE_SIZE: u32 = 20;

/// Search term that switches `/api/posts` into random-sample mode.
pub const RANDOM_SENTINEL: &str = "random";

/// Title shown for records without a caption.
pub const UNTITLED: &str = "Untitled";

/// Schema for the images database. Rows are written by the ingestion bot.
pub const IMAGES_SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS images (
    id         INTEGER PRIMARY KEY,
    file_name  TEXT    NOT NULL,
    caption    TEXT,
    tags       TEXT,
    created_at INTEGER NOT NULL DEFAULT (unixepoch())
);
CREATE INDEX IF NOT EXISTS idx_images_created_at ON images (created_at DESC);
";

const SQL_UNFILTERED: &str = "SELECT id, file_name, caption, tags, created_at \
     FROM images \
     ORDER BY created_at DESC, id DESC \
     LIMIT 20 OFFSET ?1";

const SQL_FILTERED: &str = r"SELECT id, file_name, caption, tags, created_at
     FROM images
     WHERE tags LIKE ?1 ESCAPE '\' OR caption LIKE ?1 ESCAPE '\'
     ORDER BY created_at DESC, id DESC
     LIMIT 20 OFFSET ?2";

const SQL_RANDOM: &str = "SELECT id, file_name, caption, tags, created_at \
     FROM images \
     ORDER BY RANDOM() \
     LIMIT 1";

const SQL_BY_ID: &str = "SELECT id, file_name, caption, tags, created_at \
     FROM images \
     WHERE id = ?1";

const SQL_RELATED: &str = "SELECT id, file_name, caption, tags, created_at \
     FROM images \
     WHERE id != ?1 \
     ORDER BY RANDOM() \
     LIMIT ?2";

/// A row from the `images` table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRecord {
    /// Store-assigned identifier.
    pub id: i64,
    /// Opaque Telegram file id, served through `/image/{file_name}`.
    pub file_name: String,
    /// Free-text caption; the first line is the display title.
    pub caption: Option<String>,
    /// Space-delimited tags.
    pub tags: Option<String>,
    /// Unix timestamp of ingestion.
    pub created_at: i64,
}

impl ImageRecord {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            file_name: row.get(1)?,
            caption: row.get(2)?,
            tags: row.get(3)?,
            created_at: row.get(4)?,
        })
    }

    /// First line of the caption, or [`UNTITLED`] when there is no caption.
    pub fn title(&self) -> &str {
        match self.caption.as_deref() {
            Some(caption) if !caption.is_empty() => {
                let line = caption.split('\n').next().unwrap_or_default();
                line.strip_suffix('\r').unwrap_or(line)
            }
            _ => UNTITLED,
        }
    }

    /// Tags split on single spaces. Empty tokens are dropped.
    pub fn tag_list(&self) -> Vec<&str> {
        self.tags
            .as_deref()
            .unwrap_or_default()
            .split(' ')
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Raw query string of `/api/posts`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PostsParams {
    /// Search term, or the random sentinel.
    pub q: Option<String>,
    /// Page offset; kept as text so a malformed value degrades to 0.
    pub offset: Option<String>,
}

/// What a listing request asks for, after the sentinel has been interpreted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListRequest {
    /// A page of records, newest first, optionally filtered by a search term.
    Page {
        /// Trimmed, non-empty search term.
        term: Option<String>,
        /// Number of records to skip.
        offset: i64,
    },
    /// A single record picked at random from the whole set.
    RandomSample,
}

impl ListRequest {
    /// Interpret raw query parameters.
    ///
    /// `q=random` selects [`ListRequest::RandomSample`] and ignores the offset.
    /// An absent, empty or whitespace-only `q` selects the unfiltered listing.
    /// An absent or unparseable offset is 0. Offsets beyond what SQLite can
    /// bind saturate, so they still land past the end.
    pub fn from_params(params: &PostsParams) -> Self {
        let term = params
            .q
            .as_deref()
            .map(str::trim)
            .filter(|q| !q.is_empty());

        if term == Some(RANDOM_SENTINEL) {
            return Self::RandomSample;
        }

        let offset = params.offset.as_deref().map_or(0, parse_offset);

        Self::Page {
            term: term.map(str::to_string),
            offset,
        }
    }

    /// Key for the listing cache. Random samples are never cached.
    pub fn cache_key(&self) -> Option<String> {
        match self {
            Self::Page { term, offset } => Some(format!(
                "posts:q={}&offset={offset}",
                term.as_deref().unwrap_or_default()
            )),
            Self::RandomSample => None,
        }
    }
}

/// Non-negative integer offset; too-large values saturate, anything else is 0.
fn parse_offset(raw: &str) -> i64 {
    match raw.trim().parse::<u64>() {
        Ok(n) => i64::try_from(n).unwrap_or(i64::MAX),
        Err(e) if *e.kind() == IntErrorKind::PosOverflow => i64::MAX,
        Err(_) => 0,
    }
}

/// One fixed statement plus its bound parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
enum QueryIntent {
    Unfiltered { offset: i64 },
    Filtered { pattern: String, offset: i64 },
    Random,
}

impl From<&ListRequest> for QueryIntent {
    fn from(request: &ListRequest) -> Self {
        match request {
            ListRequest::RandomSample => Self::Random,
            ListRequest::Page { term: None, offset } => Self::Unfiltered { offset: *offset },
            ListRequest::Page {
                term: Some(term),
                offset,
            } => Self::Filtered {
                pattern: like_pattern(term),
                offset: *offset,
            },
        }
    }
}

impl QueryIntent {
    fn sql(&self) -> &'static str {
        match self {
            Self::Unfiltered { .. } => SQL_UNFILTERED,
            Self::Filtered { .. } => SQL_FILTERED,
            Self::Random => SQL_RANDOM,
        }
    }

    fn run(&self, conn: &Connection) -> rusqlite::Result<Vec<ImageRecord>> {
        let mut stmt = conn.prepare_cached(self.sql())?;
        let rows = match self {
            Self::Unfiltered { offset } => stmt.query_map(params![offset], ImageRecord::from_row)?,
            Self::Filtered { pattern, offset } => {
                stmt.query_map(params![pattern, offset], ImageRecord::from_row)?
            }
            Self::Random => stmt.query_map([], ImageRecord::from_row)?,
        };
        rows.collect()
    }
}

/// Wrap a search term for a case-insensitive substring `LIKE` match.
///
/// `%`, `_` and `\` in the term are escaped so they match literally.
fn like_pattern(term: &str) -> String {
    let mut pattern = String::with_capacity(term.len() + 2);
    pattern.push('%');
    for c in term.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Execute a listing request.
pub async fn list_images(
    store: &Store,
    request: &ListRequest,
) -> Result<Vec<ImageRecord>, GalleryError> {
    let intent = QueryIntent::from(request);
    store.call(move |conn| intent.run(conn)).await
}

/// Fetch a single image by id.
pub async fn fetch_image(store: &Store, id: i64) -> Result<Option<ImageRecord>, GalleryError> {
    store
        .call(move |conn| {
            conn.prepare_cached(SQL_BY_ID)?
                .query_row([id], ImageRecord::from_row)
                .optional()
        })
        .await
}

/// Fetch up to `limit` random images other than `exclude_id`.
pub async fn fetch_related(
    store: &Store,
    exclude_id: i64,
    limit: u32,
) -> Result<Vec<ImageRecord>, GalleryError> {
    store
        .call(move |conn| {
            conn.prepare_cached(SQL_RELATED)?
                .query_map(params![exclude_id, limit], ImageRecord::from_row)?
                .collect()
        })
        .await
}
