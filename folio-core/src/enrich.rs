//! Batch-attaches related entities to a page of books.
//!
//! One lookup per entity type for the whole page, keyed by the page's id
//! set, then joined back onto each book. Never one lookup per book.

use std::collections::HashMap;

use crate::catalog::CatalogStore;
use crate::error::Result;
use crate::types::{Author, Book, SeriesRef, Tag};

/// Calibre encodes multi-value text fields with `|`; display strings get it
/// back as a comma.
pub fn decode_multi(raw: &str) -> String {
    raw.replace('|', ",")
}

/// Attaches authors, formats, series, and tags to every book in the page.
/// Missing related sets become empty collections so consumers can iterate
/// unconditionally. No-op on an empty page.
pub async fn enrich_books(store: &dyn CatalogStore, books: &mut [Book]) -> Result<()> {
    if books.is_empty() {
        return Ok(());
    }

    let ids: Vec<i64> = books.iter().map(|b| b.id).collect();

    let mut authors: HashMap<i64, Vec<Author>> = HashMap::new();
    for (book_id, mut author) in store.authors_of_books(&ids).await? {
        author.name = decode_multi(&author.name);
        authors.entry(book_id).or_default().push(author);
    }

    let mut formats: HashMap<i64, Vec<String>> = HashMap::new();
    for (book_id, format) in store.formats_of_books(&ids).await? {
        formats
            .entry(book_id)
            .or_default()
            .push(decode_multi(&format));
    }

    let mut series: HashMap<i64, SeriesRef> = HashMap::new();
    for (book_id, mut serie) in store.series_of_books(&ids).await? {
        serie.name = decode_multi(&serie.name);
        series.insert(book_id, serie);
    }

    let mut tags: HashMap<i64, Vec<Tag>> = HashMap::new();
    for (book_id, mut tag) in store.tags_of_books(&ids).await? {
        tag.name = decode_multi(&tag.name);
        tags.entry(book_id).or_default().push(tag);
    }

    for book in books.iter_mut() {
        book.authors = authors.remove(&book.id).unwrap_or_default();
        book.formats = formats.remove(&book.id).unwrap_or_default();
        book.series = series.remove(&book.id);
        book.tags = tags.remove(&book.id).unwrap_or_default();
    }

    Ok(())
}

/// Detail-view extras for a single book: the publisher, decoded like every
/// other display field.
pub async fn enrich_detail(store: &dyn CatalogStore, book: &mut Book) -> Result<()> {
    if let Some(mut publisher) = store.publisher_of_book(book.id).await? {
        publisher.name = decode_multi(&publisher.name);
        book.publisher = Some(publisher);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{decode_multi, enrich_books, enrich_detail};
    use crate::testing::StubStore;
    use crate::types::{Author, Book, Publisher, SeriesRef, Tag};

    fn book(id: i64) -> Book {
        Book {
            id,
            title: format!("Book {id}"),
            ..Book::default()
        }
    }

    #[test]
    fn decodes_internal_separator() {
        assert_eq!(decode_multi("Pratchett| Terry"), "Pratchett, Terry");
        assert_eq!(decode_multi("plain"), "plain");
    }

    #[tokio::test]
    async fn batches_one_lookup_per_entity_type() {
        let mut store = StubStore::with_books(0);
        store.authors = vec![
            (1, Author { id: 10, name: "Austen| Jane".into() }),
            (2, Author { id: 11, name: "Eco, Umberto".into() }),
        ];
        store.tags_of = vec![(1, Tag { id: 7, name: "Fiction".into() })];
        store.series_of = vec![(2, SeriesRef { id: 3, name: "Name|of the Rose".into(), index: 1.0 })];
        store.formats = vec![(1, "EPUB".into()), (1, "PDF".into())];

        let mut page = vec![book(1), book(2)];
        enrich_books(&store, &mut page).await.unwrap();

        let calls = store.calls();
        assert_eq!(
            calls,
            vec![
                "authors_of_books([1, 2])",
                "formats_of_books([1, 2])",
                "series_of_books([1, 2])",
                "tags_of_books([1, 2])",
            ]
        );

        assert_eq!(page[0].authors[0].name, "Austen, Jane");
        assert_eq!(page[0].formats, vec!["EPUB", "PDF"]);
        assert_eq!(page[0].tags[0].name, "Fiction");
        assert!(page[0].series.is_none());

        assert_eq!(page[1].series.as_ref().unwrap().name, "Name,of the Rose");
        // Absent sets come back empty, never missing.
        assert!(page[1].formats.is_empty());
        assert!(page[1].tags.is_empty());
    }

    #[tokio::test]
    async fn empty_page_issues_no_lookups() {
        let store = StubStore::with_books(0);
        let mut page: Vec<Book> = Vec::new();
        enrich_books(&store, &mut page).await.unwrap();
        assert!(store.calls().is_empty());
    }

    #[tokio::test]
    async fn detail_attaches_decoded_publisher() {
        let mut store = StubStore::with_books(0);
        store.publisher = Some(Publisher { id: 2, name: "Tor|Forge".into() });

        let mut b = book(1);
        enrich_detail(&store, &mut b).await.unwrap();
        assert_eq!(b.publisher.unwrap().name, "Tor,Forge");
    }
}
