//! Request-scoped catalog value objects.
//!
//! Everything here is created at request entry and dropped at response
//! completion; nothing is persisted by the core.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// One catalog entry (book or periodical).
///
/// The related collections (`authors`, `formats`, `series`, `tags`,
/// `publisher`) are attached lazily by the field enricher and default to
/// empty so consumers can iterate unconditionally.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: i64,
    pub title: String,
    pub pubdate: Option<String>,
    /// Library-relative directory holding the book's files.
    pub path: String,
    pub has_cover: bool,
    #[serde(default)]
    pub authors: Vec<Author>,
    #[serde(default)]
    pub formats: Vec<String>,
    #[serde(rename = "serie")]
    pub series: Option<SeriesRef>,
    #[serde(default)]
    pub tags: Vec<Tag>,
    pub publisher: Option<Publisher>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Author {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Tag {
    pub id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Publisher {
    pub id: i64,
    pub name: String,
}

/// Series membership of a book, including its position in the series.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SeriesRef {
    pub id: i64,
    pub name: String,
    pub index: f64,
}

/// One value of a user-defined catalog attribute.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CustomColumnValue {
    pub id: i64,
    pub value: String,
}

/// Where a book's source cover image lives on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoverData {
    pub path: PathBuf,
    pub book_id: i64,
}

/// Resolved location and download name for one stored book file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileData {
    pub path: PathBuf,
    pub filename: String,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
pub struct LibraryStatistics {
    pub books: u64,
    pub authors: u64,
    pub tags: u64,
    pub series: u64,
}
