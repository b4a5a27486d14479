//! Sort directives are opaque to the core; this is where they become SQL.
//!
//! Unknown keys fall back to title order. Every clause ends with an
//! id-ascending tie-break so the ordering is total; pagination and the
//! adjacent-item navigator both rely on offsets partitioning one coherent
//! ordering.

pub fn order_clause(sort: &str) -> &'static str {
    match sort {
        "new" => "b.timestamp DESC, b.id ASC",
        "old" => "b.timestamp ASC, b.id ASC",
        "nameaz" => "b.sort ASC, b.id ASC",
        "nameza" => "b.sort DESC, b.id ASC",
        "pubnew" => "b.pubdate DESC, b.id ASC",
        "pubold" => "b.pubdate ASC, b.id ASC",
        _ => "b.sort ASC, b.id ASC",
    }
}

/// Series listings default to series order rather than title order.
pub fn series_order_clause(sort: &str) -> &'static str {
    if sort.is_empty() {
        "b.series_index ASC, b.id ASC"
    } else {
        order_clause(sort)
    }
}
