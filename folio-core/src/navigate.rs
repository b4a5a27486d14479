//! Locates a book's immediate neighbors inside its active filter's
//! ordering, using single-row offset queries.

use crate::catalog::{CatalogStore, find_for};
use crate::error::Result;
use crate::query::Filter;
use crate::types::Book;

/// Neighbors of the current book under the same filter and sort it was
/// listed with.
#[derive(Debug, Clone, Default)]
pub struct Adjacent {
    pub previous: Option<Book>,
    pub next: Option<Book>,
}

/// `current_row_number` is the 1-based position the caller saw the book at.
///
/// The first item issues no "previous" query at all; the "next" lookup past
/// the end simply comes back empty. Both neighbors are resolved under the
/// exact ordering of the originating listing, since sort directives can
/// reorder the whole collection and an implicit order would pick wrong
/// neighbors.
pub async fn locate(
    store: &dyn CatalogStore,
    filter: &Filter,
    current_row_number: u64,
) -> Result<Adjacent> {
    let row_num = current_row_number.saturating_sub(1);

    let previous = if row_num == 0 {
        None
    } else {
        find_for(store, filter, 1, row_num - 1)
            .await?
            .into_iter()
            .next()
    };

    let next = find_for(store, filter, 1, row_num + 1)
        .await?
        .into_iter()
        .next();

    Ok(Adjacent { previous, next })
}

#[cfg(test)]
mod tests {
    use super::locate;
    use crate::query::{Filter, RawListOptions};
    use crate::testing::StubStore;
    use serde_json::json;

    fn plain_filter() -> Filter {
        Filter::resolve(&RawListOptions::default())
    }

    #[tokio::test]
    async fn first_row_never_queries_previous() {
        let store = StubStore::with_books(5);
        let adjacent = locate(&store, &plain_filter(), 1).await.unwrap();

        assert!(adjacent.previous.is_none());
        assert_eq!(adjacent.next.as_ref().map(|b| b.id), Some(2));

        // Only the "next" single-row fetch went out.
        let finds: Vec<_> = store
            .calls()
            .into_iter()
            .filter(|c| c.starts_with("find_books"))
            .collect();
        assert_eq!(finds.len(), 1);
        assert!(finds[0].contains("offset=1"));
    }

    #[tokio::test]
    async fn middle_row_fetches_both_neighbors() {
        let store = StubStore::with_books(5);
        let adjacent = locate(&store, &plain_filter(), 3).await.unwrap();

        assert_eq!(adjacent.previous.as_ref().map(|b| b.id), Some(2));
        assert_eq!(adjacent.next.as_ref().map(|b| b.id), Some(4));
    }

    #[tokio::test]
    async fn last_row_reports_no_next() {
        let store = StubStore::with_books(5);
        let adjacent = locate(&store, &plain_filter(), 5).await.unwrap();

        assert_eq!(adjacent.previous.as_ref().map(|b| b.id), Some(4));
        assert!(adjacent.next.is_none());
    }

    #[tokio::test]
    async fn neighbors_use_the_listing_filter() {
        let store = StubStore::with_books(5);
        let raw: RawListOptions =
            serde_json::from_value(json!({ "tagId": 5, "sortString": "pubnew" })).unwrap();
        let filter = Filter::resolve(&raw);

        locate(&store, &filter, 2).await.unwrap();

        let calls = store.calls();
        assert!(calls.iter().all(|c| c.starts_with("find_books_with_tags(5")));
        assert!(calls.iter().all(|c| c.contains("sort=pubnew")));
    }
}
