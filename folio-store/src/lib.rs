//! # Folio Store
//!
//! Read-only [`CatalogStore`] backend over a Calibre library: the
//! `metadata.db` SQLite file plus the per-book directories that hold cover
//! images and formats.
//!
//! Search tokens arrive pre-normalized (lowercased, punctuation stripped,
//! single quotes doubled) from the filter resolver and are spliced into
//! `LIKE` predicates as SQL string literals; numeric filter values are
//! bound as parameters.

mod sort;

use std::path::PathBuf;

use async_trait::async_trait;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::Row;
use tracing::debug;

use folio_core::catalog::CatalogStore;
use folio_core::error::{CoreError, Result};
use folio_core::types::{
    Author, Book, CoverData, CustomColumnValue, FileData, LibraryStatistics, Publisher, SeriesRef,
    Tag,
};

use sort::{order_clause, series_order_clause};

const BOOK_COLUMNS: &str = "b.id, b.title, b.pubdate, b.path, b.has_cover";

/// Catalog store over `{library_root}/metadata.db`.
#[derive(Debug, Clone)]
pub struct CalibreStore {
    pool: SqlitePool,
    root: PathBuf,
}

impl CalibreStore {
    /// Opens the library database read-only. The catalog is never written
    /// through this store.
    pub async fn open(library_root: impl Into<PathBuf>) -> Result<Self> {
        let root = library_root.into();
        let db_path = root.join("metadata.db");
        debug!(?db_path, "opening calibre library");

        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .read_only(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(store_err)?;

        Ok(Self { pool, root })
    }

    async fn count(&self, sql: &str) -> Result<u64> {
        let total: i64 = sqlx::query_scalar(sql)
            .fetch_one(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(total as u64)
    }

    async fn fetch_books(&self, sql: &str, limit: u64, offset: u64) -> Result<Vec<Book>> {
        let rows = sqlx::query(sql)
            .bind(limit as i64)
            .bind(offset as i64)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(rows.iter().map(book_from_row).collect())
    }
}

fn store_err(err: sqlx::Error) -> CoreError {
    CoreError::Store(err.to_string())
}

fn book_from_row(row: &SqliteRow) -> Book {
    Book {
        id: row.get("id"),
        title: row.get("title"),
        pubdate: row.get("pubdate"),
        path: row.get("path"),
        has_cover: row.get("has_cover"),
        ..Book::default()
    }
}

/// One predicate per token, each matching title or author sort. The empty
/// token produced by an empty search string yields `LIKE '%%'`, which
/// matches every row, so an empty search applies no effective filter.
fn search_predicates(tokens: &[String]) -> Vec<String> {
    tokens
        .iter()
        .map(|token| {
            format!(
                "(lower(b.title) LIKE '%{token}%' OR lower(ifnull(b.author_sort, '')) LIKE '%{token}%')"
            )
        })
        .collect()
}

fn where_clause(predicates: &[String]) -> String {
    if predicates.is_empty() {
        String::new()
    } else {
        format!(" WHERE {}", predicates.join(" AND "))
    }
}

fn id_list(ids: &[i64]) -> String {
    ids.iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

#[async_trait]
impl CatalogStore for CalibreStore {
    async fn count_books(&self, tokens: &[String]) -> Result<u64> {
        let sql = format!(
            "SELECT COUNT(*) FROM books b{}",
            where_clause(&search_predicates(tokens))
        );
        self.count(&sql).await
    }

    async fn find_books(
        &self,
        tokens: &[String],
        sort: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Book>> {
        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books b{} ORDER BY {} LIMIT ? OFFSET ?",
            where_clause(&search_predicates(tokens)),
            order_clause(sort),
        );
        self.fetch_books(&sql, limit, offset).await
    }

    async fn count_books_with_tags(&self, tokens: &[String], tag_id: i64) -> Result<u64> {
        let mut predicates = search_predicates(tokens);
        predicates.push(format!(
            "b.id IN (SELECT book FROM books_tags_link WHERE tag = {tag_id})"
        ));
        let sql = format!("SELECT COUNT(*) FROM books b{}", where_clause(&predicates));
        self.count(&sql).await
    }

    async fn find_books_with_tags(
        &self,
        tokens: &[String],
        tag_id: i64,
        sort: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Book>> {
        let mut predicates = search_predicates(tokens);
        predicates.push(format!(
            "b.id IN (SELECT book FROM books_tags_link WHERE tag = {tag_id})"
        ));
        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books b{} ORDER BY {} LIMIT ? OFFSET ?",
            where_clause(&predicates),
            order_clause(sort),
        );
        self.fetch_books(&sql, limit, offset).await
    }

    async fn count_books_with_cc(
        &self,
        cc_num: i64,
        tokens: &[String],
        cc_id: i64,
    ) -> Result<u64> {
        let mut predicates = search_predicates(tokens);
        predicates.push(cc_predicate(cc_num, cc_id));
        let sql = format!("SELECT COUNT(*) FROM books b{}", where_clause(&predicates));
        self.count(&sql).await
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
        let mut predicates = search_predicates(tokens);
        predicates.push(cc_predicate(cc_num, cc_id));
        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books b{} ORDER BY {} LIMIT ? OFFSET ?",
            where_clause(&predicates),
            order_clause(sort),
        );
        self.fetch_books(&sql, limit, offset).await
    }

    async fn count_books_by_series(&self, series_id: i64) -> Result<u64> {
        let sql = format!(
            "SELECT COUNT(*) FROM books b WHERE b.id IN \
             (SELECT book FROM books_series_link WHERE series = {series_id})"
        );
        self.count(&sql).await
    }

    async fn find_books_by_series(
        &self,
        series_id: i64,
        sort: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Book>> {
        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books b WHERE b.id IN \
             (SELECT book FROM books_series_link WHERE series = {series_id}) \
             ORDER BY {} LIMIT ? OFFSET ?",
            series_order_clause(sort),
        );
        self.fetch_books(&sql, limit, offset).await
    }

    async fn count_books_by_author(&self, author_id: i64) -> Result<u64> {
        let sql = format!(
            "SELECT COUNT(*) FROM books b WHERE b.id IN \
             (SELECT book FROM books_authors_link WHERE author = {author_id})"
        );
        self.count(&sql).await
    }

    async fn find_books_by_author(
        &self,
        author_id: i64,
        sort: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Book>> {
        let sql = format!(
            "SELECT {BOOK_COLUMNS} FROM books b WHERE b.id IN \
             (SELECT book FROM books_authors_link WHERE author = {author_id}) \
             ORDER BY {} LIMIT ? OFFSET ?",
            order_clause(sort),
        );
        self.fetch_books(&sql, limit, offset).await
    }

    async fn authors_of_books(&self, ids: &[i64]) -> Result<Vec<(i64, Author)>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT l.book AS book_id, a.id AS id, a.name AS name \
             FROM books_authors_link l JOIN authors a ON a.id = l.author \
             WHERE l.book IN ({}) ORDER BY l.book, l.id",
            id_list(ids)
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(rows
            .iter()
            .map(|row| {
                (
                    row.get("book_id"),
                    Author {
                        id: row.get("id"),
                        name: row.get("name"),
                    },
                )
            })
            .collect())
    }

    async fn formats_of_books(&self, ids: &[i64]) -> Result<Vec<(i64, String)>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT book AS book_id, format FROM data \
             WHERE book IN ({}) ORDER BY book, format",
            id_list(ids)
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(rows
            .iter()
            .map(|row| (row.get("book_id"), row.get("format")))
            .collect())
    }

    async fn series_of_books(&self, ids: &[i64]) -> Result<Vec<(i64, SeriesRef)>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT l.book AS book_id, s.id AS id, s.name AS name, b.series_index AS idx \
             FROM books_series_link l \
             JOIN series s ON s.id = l.series \
             JOIN books b ON b.id = l.book \
             WHERE l.book IN ({})",
            id_list(ids)
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(rows
            .iter()
            .map(|row| {
                (
                    row.get("book_id"),
                    SeriesRef {
                        id: row.get("id"),
                        name: row.get("name"),
                        index: row.get("idx"),
                    },
                )
            })
            .collect())
    }

    async fn tags_of_books(&self, ids: &[i64]) -> Result<Vec<(i64, Tag)>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let sql = format!(
            "SELECT l.book AS book_id, t.id AS id, t.name AS name \
             FROM books_tags_link l JOIN tags t ON t.id = l.tag \
             WHERE l.book IN ({}) ORDER BY l.book, t.name",
            id_list(ids)
        );
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(rows
            .iter()
            .map(|row| {
                (
                    row.get("book_id"),
                    Tag {
                        id: row.get("id"),
                        name: row.get("name"),
                    },
                )
            })
            .collect())
    }

    async fn publisher_of_book(&self, id: i64) -> Result<Option<Publisher>> {
        let row = sqlx::query(
            "SELECT p.id AS id, p.name AS name \
             FROM books_publishers_link l JOIN publishers p ON p.id = l.publisher \
             WHERE l.book = ? LIMIT 1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?;
        Ok(row.map(|row| Publisher {
            id: row.get("id"),
            name: row.get("name"),
        }))
    }

    async fn custom_column_of_book(
        &self,
        cc_num: i64,
        id: i64,
    ) -> Result<Vec<CustomColumnValue>> {
        let sql = format!(
            "SELECT c.id AS id, c.value AS value \
             FROM books_custom_column_{cc_num}_link l \
             JOIN custom_column_{cc_num} c ON c.id = l.value \
             WHERE l.book = ? ORDER BY c.value"
        );
        let rows = sqlx::query(&sql)
            .bind(id)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(rows.iter().map(cc_value_from_row).collect())
    }

    async fn tags(&self) -> Result<Vec<Tag>> {
        let rows = sqlx::query("SELECT id, name FROM tags ORDER BY name")
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(rows
            .iter()
            .map(|row| Tag {
                id: row.get("id"),
                name: row.get("name"),
            })
            .collect())
    }

    async fn custom_columns(&self, cc_num: i64) -> Result<Vec<CustomColumnValue>> {
        let sql = format!("SELECT id, value FROM custom_column_{cc_num} ORDER BY value");
        let rows = sqlx::query(&sql)
            .fetch_all(&self.pool)
            .await
            .map_err(store_err)?;
        Ok(rows.iter().map(cc_value_from_row).collect())
    }

    async fn cover_data(&self, id: i64) -> Result<CoverData> {
        let row = sqlx::query("SELECT path FROM books WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(store_err)?
            .ok_or_else(|| CoreError::NotFound(format!("book {id}")))?;
        let book_path: String = row.get("path");
        Ok(CoverData {
            path: self.root.join(book_path).join("cover.jpg"),
            book_id: id,
        })
    }

    async fn file_data(&self, id: i64, format: &str) -> Result<FileData> {
        let format = format.to_uppercase();
        let row = sqlx::query(
            "SELECT d.name AS name, b.path AS path FROM data d \
             JOIN books b ON b.id = d.book \
             WHERE d.book = ? AND d.format = ?",
        )
        .bind(id)
        .bind(&format)
        .fetch_optional(&self.pool)
        .await
        .map_err(store_err)?
        .ok_or_else(|| CoreError::NotFound(format!("book {id} has no {format} file")))?;

        let name: String = row.get("name");
        let book_path: String = row.get("path");
        let filename = format!("{name}.{}", format.to_lowercase());
        Ok(FileData {
            path: self.root.join(book_path).join(&filename),
            filename,
        })
    }

    async fn statistics(&self) -> Result<LibraryStatistics> {
        Ok(LibraryStatistics {
            books: self.count("SELECT COUNT(*) FROM books b").await?,
            authors: self.count("SELECT COUNT(*) FROM authors").await?,
            tags: self.count("SELECT COUNT(*) FROM tags").await?,
            series: self.count("SELECT COUNT(*) FROM series").await?,
        })
    }
}

fn cc_predicate(cc_num: i64, cc_id: i64) -> String {
    if cc_id > 0 {
        format!(
            "b.id IN (SELECT book FROM books_custom_column_{cc_num}_link WHERE value = {cc_id})"
        )
    } else {
        format!("b.id IN (SELECT book FROM books_custom_column_{cc_num}_link)")
    }
}

fn cc_value_from_row(row: &SqliteRow) -> CustomColumnValue {
    CustomColumnValue {
        id: row.get("id"),
        value: row.get("value"),
    }
}
