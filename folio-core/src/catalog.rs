//! The consumed Catalog Store contract, plus the dispatchers that route a
//! [`Filter`] to the right count/fetch query pair.

use async_trait::async_trait;

use crate::error::Result;
use crate::query::{Dimension, Filter};
use crate::types::{
    Author, Book, CoverData, CustomColumnValue, FileData, LibraryStatistics, Publisher, SeriesRef,
    Tag,
};

/// Read-only facade over the persisted bibliographic data.
///
/// Every `find_*` honors its sort directive as a stable total order with an
/// id-ascending tie-break, so repeated calls with the same filter and
/// differing offsets partition one coherent ordering with no gaps or
/// duplicates. Implementations never short-circuit: callers skip `find`
/// when `count == 0`.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    async fn count_books(&self, tokens: &[String]) -> Result<u64>;
    async fn find_books(
        &self,
        tokens: &[String],
        sort: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Book>>;

    async fn count_books_with_tags(&self, tokens: &[String], tag_id: i64) -> Result<u64>;
    async fn find_books_with_tags(
        &self,
        tokens: &[String],
        tag_id: i64,
        sort: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Book>>;

    async fn count_books_with_cc(
        &self,
        cc_num: i64,
        tokens: &[String],
        cc_id: i64,
    ) -> Result<u64>;
    async fn find_books_with_cc(
        &self,
        cc_num: i64,
        tokens: &[String],
        cc_id: i64,
        sort: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Book>>;

    async fn count_books_by_series(&self, series_id: i64) -> Result<u64>;
    async fn find_books_by_series(
        &self,
        series_id: i64,
        sort: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Book>>;

    async fn count_books_by_author(&self, author_id: i64) -> Result<u64>;
    async fn find_books_by_author(
        &self,
        author_id: i64,
        sort: &str,
        limit: u64,
        offset: u64,
    ) -> Result<Vec<Book>>;

    /// Batched related-entity lookups, keyed by the page's full id set.
    async fn authors_of_books(&self, ids: &[i64]) -> Result<Vec<(i64, Author)>>;
    async fn formats_of_books(&self, ids: &[i64]) -> Result<Vec<(i64, String)>>;
    async fn series_of_books(&self, ids: &[i64]) -> Result<Vec<(i64, SeriesRef)>>;
    async fn tags_of_books(&self, ids: &[i64]) -> Result<Vec<(i64, Tag)>>;

    async fn publisher_of_book(&self, id: i64) -> Result<Option<Publisher>>;
    async fn custom_column_of_book(&self, cc_num: i64, id: i64)
    -> Result<Vec<CustomColumnValue>>;

    async fn tags(&self) -> Result<Vec<Tag>>;
    async fn custom_columns(&self, cc_num: i64) -> Result<Vec<CustomColumnValue>>;

    async fn cover_data(&self, id: i64) -> Result<CoverData>;
    async fn file_data(&self, id: i64, format: &str) -> Result<FileData>;

    async fn statistics(&self) -> Result<LibraryStatistics>;
}

/// Routes a filter to its dimension's count query.
pub async fn count_for(store: &dyn CatalogStore, filter: &Filter) -> Result<u64> {
    let tokens = filter.tokens();
    match filter.dimension {
        Dimension::All => store.count_books(tokens).await,
        Dimension::Tag { tag_id } => store.count_books_with_tags(tokens, tag_id).await,
        Dimension::CustomColumn { num, value_id } => {
            store.count_books_with_cc(num, tokens, value_id).await
        }
        Dimension::Series { series_id } => store.count_books_by_series(series_id).await,
        Dimension::Author { author_id } => store.count_books_by_author(author_id).await,
    }
}

/// Routes a filter to its dimension's fetch query. The sort directive rides
/// along unchanged so every page (and every neighbor lookup) shares one
/// ordering.
pub async fn find_for(
    store: &dyn CatalogStore,
    filter: &Filter,
    limit: u64,
    offset: u64,
) -> Result<Vec<Book>> {
    let tokens = filter.tokens();
    let sort = filter.sort.as_str();
    match filter.dimension {
        Dimension::All => store.find_books(tokens, sort, limit, offset).await,
        Dimension::Tag { tag_id } => {
            store
                .find_books_with_tags(tokens, tag_id, sort, limit, offset)
                .await
        }
        Dimension::CustomColumn { num, value_id } => {
            store
                .find_books_with_cc(num, tokens, value_id, sort, limit, offset)
                .await
        }
        Dimension::Series { series_id } => {
            store
                .find_books_by_series(series_id, sort, limit, offset)
                .await
        }
        Dimension::Author { author_id } => {
            store
                .find_books_by_author(author_id, sort, limit, offset)
                .await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{count_for, find_for};
    use crate::query::{Filter, RawListOptions};
    use crate::testing::StubStore;
    use serde_json::json;

    fn filter_from(body: serde_json::Value) -> Filter {
        let raw: RawListOptions = serde_json::from_value(body).expect("valid raw options");
        Filter::resolve(&raw)
    }

    #[tokio::test]
    async fn tag_dimension_routes_to_tag_queries_only() {
        let store = StubStore::with_books(3);
        let filter = filter_from(json!({ "tagId": 5, "ccNum": 3 }));

        count_for(&store, &filter).await.unwrap();
        find_for(&store, &filter, 30, 0).await.unwrap();

        let calls = store.calls();
        assert!(calls.iter().any(|c| c.starts_with("count_books_with_tags(5")));
        assert!(calls.iter().any(|c| c.starts_with("find_books_with_tags(5")));
        assert!(!calls.iter().any(|c| c.contains("with_cc")));
    }

    #[tokio::test]
    async fn plain_search_routes_to_find_books() {
        let store = StubStore::with_books(3);
        let filter = filter_from(json!({ "searchString": "Harry Potter" }));

        count_for(&store, &filter).await.unwrap();
        find_for(&store, &filter, 30, 0).await.unwrap();

        let calls = store.calls();
        assert!(calls.contains(&"count_books([harry, potter])".to_string()));
        assert!(
            calls.contains(&"find_books([harry, potter], sort=, limit=30, offset=0)".to_string())
        );
    }

    #[tokio::test]
    async fn series_entry_point_routes_by_series() {
        let store = StubStore::with_books(2);
        let filter = filter_from(json!({ "type": "serie", "serieId": 4 }));

        count_for(&store, &filter).await.unwrap();
        let calls = store.calls();
        assert!(calls.contains(&"count_books_by_series(4)".to_string()));
    }
}
