//! Recording in-memory [`CatalogStore`] fake for tests.

use std::sync::Mutex;

use async_trait::async_trait;

use crate::catalog::CatalogStore;
use crate::error::{CoreError, Result};
use crate::types::{
    Author, Book, CoverData, CustomColumnValue, FileData, LibraryStatistics, Publisher, SeriesRef,
    Tag,
};

/// Serves canned data and records every call it receives, so tests can
/// assert which query pair a filter routed to and with which arguments.
#[derive(Debug, Default)]
pub struct StubStore {
    pub books: Vec<Book>,
    pub authors: Vec<(i64, Author)>,
    pub formats: Vec<(i64, String)>,
    pub series_of: Vec<(i64, SeriesRef)>,
    pub tags_of: Vec<(i64, Tag)>,
    pub publisher: Option<Publisher>,
    pub cc_values: Vec<CustomColumnValue>,
    pub all_tags: Vec<Tag>,
    pub cover: Option<CoverData>,
    pub file: Option<FileData>,
    pub stats: LibraryStatistics,
    /// When set, every operation fails with a store error.
    pub fail: bool,
    calls: Mutex<Vec<String>>,
}

impl StubStore {
    /// A store holding `n` books with ids `1..=n`, titled `Book {id}`.
    pub fn with_books(n: i64) -> Self {
        let books = (1..=n)
            .map(|id| Book {
                id,
                title: format!("Book {id}"),
                path: format!("Author/Book {id} ({id})"),
                has_cover: true,
                ..Book::default()
            })
            .collect();
        Self {
            books,
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().expect("calls lock").clone()
    }

    fn record(&self, call: String) {
        self.calls.lock().expect("calls lock").push(call);
    }

    fn guard(&self) -> Result<()> {
        if self.fail {
            Err(CoreError::Store("stub store failure".into()))
        } else {
            Ok(())
        }
    }

    fn page(&self, limit: u64, offset: u64) -> Vec<Book> {
        self.books
            .iter()
            .skip(offset as usize)
            .take(limit as usize)
            .cloned()
            .collect()
    }

    fn total(&self) -> u64 {
        self.books.len() as u64
    }
}

fn fmt_tokens(tokens: &[String]) -> String {
    format!("[{}]", tokens.join(", "))
}

fn fmt_ids(ids: &[i64]) -> String {
    let joined = ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ");
    format!("[{joined}]")
}

#[async_trait]
impl CatalogStore for StubStore {
    async fn count_books(&self, tokens: &[String]) -> Result<u64> {
        self.record(format!("count_books({})", fmt_tokens(tokens)));
        self.guard()?;
        Ok(self.total())
    }

    async fn find_books(
        &self,
        tokens: &[String],
        sort: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Book>> {
        self.record(format!(
            "find_books({}, sort={sort}, limit={limit}, offset={offset})",
            fmt_tokens(tokens)
        ));
        self.guard()?;
        Ok(self.page(limit, offset))
    }

    async fn count_books_with_tags(&self, tokens: &[String], tag_id: i64) -> Result<u64> {
        self.record(format!(
            "count_books_with_tags({tag_id}, {})",
            fmt_tokens(tokens)
        ));
        self.guard()?;
        Ok(self.total())
    }

    async fn find_books_with_tags(
        &self,
        tokens: &[String],
        tag_id: i64,
        sort: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Book>> {
        self.record(format!(
            "find_books_with_tags({tag_id}, {}, sort={sort}, limit={limit}, offset={offset})",
            fmt_tokens(tokens)
        ));
        self.guard()?;
        Ok(self.page(limit, offset))
    }

    async fn count_books_with_cc(
        &self,
        cc_num: i64,
        tokens: &[String],
        cc_id: i64,
    ) -> Result<u64> {
        self.record(format!(
            "count_books_with_cc({cc_num}, {}, {cc_id})",
            fmt_tokens(tokens)
        ));
        self.guard()?;
        Ok(self.total())
    }

    async fn find_books_with_cc(
        &self,
        cc_num: i64,
        tokens: &[String],
        cc_id: i64,
        sort: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Book>> {
        self.record(format!(
            "find_books_with_cc({cc_num}, {}, {cc_id}, sort={sort}, limit={limit}, offset={offset})",
            fmt_tokens(tokens)
        ));
        self.guard()?;
        Ok(self.page(limit, offset))
    }

    async fn count_books_by_series(&self, series_id: i64) -> Result<u64> {
        self.record(format!("count_books_by_series({series_id})"));
        self.guard()?;
        Ok(self.total())
    }

    async fn find_books_by_series(
        &self,
        series_id: i64,
        sort: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Book>> {
        self.record(format!(
            "find_books_by_series({series_id}, sort={sort}, limit={limit}, offset={offset})"
        ));
        self.guard()?;
        Ok(self.page(limit, offset))
    }

    async fn count_books_by_author(&self, author_id: i64) -> Result<u64> {
        self.record(format!("count_books_by_author({author_id})"));
        self.guard()?;
        Ok(self.total())
    }

    async fn find_books_by_author(
        &self,
        author_id: i64,
        sort: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Book>> {
        self.record(format!(
            "find_books_by_author({author_id}, sort={sort}, limit={limit}, offset={offset})"
        ));
        self.guard()?;
        Ok(self.page(limit, offset))
    }

    async fn authors_of_books(&self, ids: &[i64]) -> Result<Vec<(i64, Author)>> {
        self.record(format!("authors_of_books({})", fmt_ids(ids)));
        self.guard()?;
        Ok(self.authors.clone())
    }

    async fn formats_of_books(&self, ids: &[i64]) -> Result<Vec<(i64, String)>> {
        self.record(format!("formats_of_books({})", fmt_ids(ids)));
        self.guard()?;
        Ok(self.formats.clone())
    }

    async fn series_of_books(&self, ids: &[i64]) -> Result<Vec<(i64, SeriesRef)>> {
        self.record(format!("series_of_books({})", fmt_ids(ids)));
        self.guard()?;
        Ok(self.series_of.clone())
    }

    async fn tags_of_books(&self, ids: &[i64]) -> Result<Vec<(i64, Tag)>> {
        self.record(format!("tags_of_books({})", fmt_ids(ids)));
        self.guard()?;
        Ok(self.tags_of.clone())
    }

    async fn publisher_of_book(&self, id: i64) -> Result<Option<Publisher>> {
        self.record(format!("publisher_of_book({id})"));
        self.guard()?;
        Ok(self.publisher.clone())
    }

    async fn custom_column_of_book(
        &self,
        cc_num: i64,
        id: i64,
    ) -> Result<Vec<CustomColumnValue>> {
        self.record(format!("custom_column_of_book({cc_num}, {id})"));
        self.guard()?;
        Ok(self.cc_values.clone())
    }

    async fn tags(&self) -> Result<Vec<Tag>> {
        self.record("tags()".into());
        self.guard()?;
        Ok(self.all_tags.clone())
    }

    async fn custom_columns(&self, cc_num: i64) -> Result<Vec<CustomColumnValue>> {
        self.record(format!("custom_columns({cc_num})"));
        self.guard()?;
        Ok(self.cc_values.clone())
    }

    async fn cover_data(&self, id: i64) -> Result<CoverData> {
        self.record(format!("cover_data({id})"));
        self.guard()?;
        self.cover
            .clone()
            .ok_or_else(|| CoreError::NotFound(format!("no cover for book {id}")))
    }

    async fn file_data(&self, id: i64, format: &str) -> Result<FileData> {
        self.record(format!("file_data({id}, {format})"));
        self.guard()?;
        self.file
            .clone()
            .ok_or_else(|| CoreError::NotFound(format!("no {format} file for book {id}")))
    }

    async fn statistics(&self) -> Result<LibraryStatistics> {
        self.record("statistics()".into());
        self.guard()?;
        Ok(self.stats)
    }
}
