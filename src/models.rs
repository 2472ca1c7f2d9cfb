use chrono::{Local, NaiveDateTime};
use sqlx::{any::AnyRow, FromRow, Row, ValueRef};

pub const DEFAULT_SUBJECT: &str = "제목 없음";
pub const DEFAULT_AUTHOR: &str = "익명";
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

// Raw rows as they come out of a `g5_write_*` table. `wr_datetime` is cast to
// text in the query so the same row types decode on every driver. Rows are
// decoded by hand: legacy columns may hold NULL, and MySQL reports `TEXT`
// columns as blobs.

#[derive(Debug, Clone)]
pub struct PostSummaryRow {
    pub wr_id: i64,
    pub wr_subject: Option<String>,
    pub wr_name: Option<String>,
    pub wr_datetime: Option<String>,
    pub wr_hit: i64,
    pub wr_good: i64,
    pub wr_comment: i64,
}

#[derive(Debug, Clone)]
pub struct PostRow {
    pub wr_id: i64,
    pub wr_subject: Option<String>,
    pub wr_name: Option<String>,
    pub wr_datetime: Option<String>,
    pub wr_hit: i64,
    pub wr_good: i64,
    pub wr_content: Option<String>,
}

#[derive(Debug, Clone)]
pub struct CommentRow {
    pub wr_id: i64,
    pub wr_name: Option<String>,
    pub wr_content: Option<String>,
    pub wr_datetime: Option<String>,
}

fn lossy_text(bytes: Vec<u8>) -> String {
    match String::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => String::from_utf8_lossy(e.as_bytes()).into_owned(),
    }
}

/// Reads a text column that may be NULL or arrive as raw bytes.
fn text_column(row: &AnyRow, column: &str) -> Result<Option<String>, sqlx::Error> {
    if row.try_get_raw(column)?.is_null() {
        return Ok(None);
    }
    match row.try_get::<String, _>(column) {
        Ok(text) => Ok(Some(text)),
        Err(_) => row.try_get::<Vec<u8>, _>(column).map(|bytes| Some(lossy_text(bytes))),
    }
}

impl<'r> FromRow<'r, AnyRow> for PostSummaryRow {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(PostSummaryRow {
            wr_id: row.try_get("wr_id")?,
            wr_subject: text_column(row, "wr_subject")?,
            wr_name: text_column(row, "wr_name")?,
            wr_datetime: text_column(row, "wr_datetime")?,
            wr_hit: row.try_get("wr_hit")?,
            wr_good: row.try_get("wr_good")?,
            wr_comment: row.try_get("wr_comment")?,
        })
    }
}

impl<'r> FromRow<'r, AnyRow> for PostRow {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(PostRow {
            wr_id: row.try_get("wr_id")?,
            wr_subject: text_column(row, "wr_subject")?,
            wr_name: text_column(row, "wr_name")?,
            wr_datetime: text_column(row, "wr_datetime")?,
            wr_hit: row.try_get("wr_hit")?,
            wr_good: row.try_get("wr_good")?,
            wr_content: text_column(row, "wr_content")?,
        })
    }
}

impl<'r> FromRow<'r, AnyRow> for CommentRow {
    fn from_row(row: &'r AnyRow) -> Result<Self, sqlx::Error> {
        Ok(CommentRow {
            wr_id: row.try_get("wr_id")?,
            wr_name: text_column(row, "wr_name")?,
            wr_content: text_column(row, "wr_content")?,
            wr_datetime: text_column(row, "wr_datetime")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PostSummary {
    pub id: i64,
    pub subject: String,
    pub author: String,
    pub written_at: NaiveDateTime,
    pub hit: i64,
    pub good: i64,
    pub comment_count: i64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Post {
    pub id: i64,
    pub subject: String,
    pub author: String,
    pub written_at: NaiveDateTime,
    pub hit: i64,
    pub good: i64,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Comment {
    pub id: i64,
    pub author: String,
    pub content: String,
    pub written_at: NaiveDateTime,
}

fn text_or(value: Option<String>, default: &str) -> String {
    match value {
        Some(value) if !value.trim().is_empty() => value,
        _ => default.to_string(),
    }
}

/// Legacy rows carry `0000-00-00 00:00:00` or NULL for unknown dates; those
/// fall back to the current local time.
pub fn parse_datetime(value: Option<&str>) -> NaiveDateTime {
    value
        .map(str::trim)
        .and_then(|value| {
            NaiveDateTime::parse_from_str(value, DATETIME_FORMAT)
                .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%d %H:%M:%S%.f"))
                .or_else(|_| NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S"))
                .ok()
        })
        .unwrap_or_else(|| Local::now().naive_local())
}

pub fn format_datetime(value: &NaiveDateTime) -> String {
    value.format(DATETIME_FORMAT).to_string()
}

impl From<PostSummaryRow> for PostSummary {
    fn from(row: PostSummaryRow) -> Self {
        PostSummary {
            id: row.wr_id,
            subject: text_or(row.wr_subject, DEFAULT_SUBJECT),
            author: text_or(row.wr_name, DEFAULT_AUTHOR),
            written_at: parse_datetime(row.wr_datetime.as_deref()),
            hit: row.wr_hit,
            good: row.wr_good,
            comment_count: row.wr_comment,
        }
    }
}

impl From<PostRow> for Post {
    fn from(row: PostRow) -> Self {
        Post {
            id: row.wr_id,
            subject: text_or(row.wr_subject, DEFAULT_SUBJECT),
            author: text_or(row.wr_name, DEFAULT_AUTHOR),
            written_at: parse_datetime(row.wr_datetime.as_deref()),
            hit: row.wr_hit,
            good: row.wr_good,
            content: row.wr_content.unwrap_or_default(),
        }
    }
}

impl From<CommentRow> for Comment {
    fn from(row: CommentRow) -> Self {
        Comment {
            id: row.wr_id,
            author: text_or(row.wr_name, DEFAULT_AUTHOR),
            content: row.wr_content.unwrap_or_default(),
            written_at: parse_datetime(row.wr_datetime.as_deref()),
        }
    }
}
