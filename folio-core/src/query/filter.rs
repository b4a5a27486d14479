//! Turns the raw, partially-specified list request into a normalized
//! [`Filter`] with exactly one active dimension.

use serde::Deserialize;
use serde_json::Value;
use std::sync::LazyLock;

use regex::Regex;

/// Word separators collapsed to a single space during tokenization. Single
/// quotes are deliberately absent: they are escaped, not stripped, because
/// the store splices tokens into SQL string literals.
static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r##"[!"#$%&()*,./:;<=>?@\[\\\]^_`{|}~\s-]+"##)
        .expect("separator class is a valid regex")
});

/// The list request as it arrives over the wire. Every numeric field may be
/// absent, a number, or an arbitrary string; [`coerce_id`] folds all of the
/// malformed cases to `0` ("inactive") instead of erroring.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RawListOptions {
    pub page: Option<Value>,
    pub sort_string: Option<String>,
    #[serde(rename = "type")]
    pub entry_type: Option<String>,
    pub search_string: Option<String>,
    pub tag_id: Option<Value>,
    pub cc_num: Option<Value>,
    pub cc_id: Option<Value>,
    #[serde(rename = "serieId")]
    pub series_id: Option<Value>,
    #[serde(rename = "authorsId")]
    pub author_id: Option<Value>,
}

impl RawListOptions {
    pub fn page(&self) -> i64 {
        coerce_id(&self.page)
    }
}

/// Lenient numeric coercion: absent, non-numeric, or fractional input is
/// never an error, it just deactivates the field.
pub fn coerce_id(value: &Option<Value>) -> i64 {
    match value {
        Some(Value::Number(n)) => n.as_i64().unwrap_or(0),
        Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
        _ => 0,
    }
}

/// The single active non-search dimension of a [`Filter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dimension {
    /// Plain free-text search over the whole catalog.
    All,
    Tag { tag_id: i64 },
    /// `value_id == 0` means "any value of this column".
    CustomColumn { num: i64, value_id: i64 },
    Series { series_id: i64 },
    Author { author_id: i64 },
}

/// Normalized request intent: optional search tokens, exactly one active
/// dimension, and the sort directive passed through to the store untouched.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub tokens: Option<Vec<String>>,
    pub dimension: Dimension,
    pub sort: String,
}

impl Filter {
    /// Selects the active dimension by precedence: the `serie` and `author`
    /// entry types bypass tag/custom-column entirely; otherwise tag wins
    /// over custom column, and plain search is the fallback. Pure; never
    /// fails.
    pub fn resolve(raw: &RawListOptions) -> Self {
        let tokens = raw.search_string.as_deref().map(tokenize);
        let dimension = match raw.entry_type.as_deref() {
            Some("serie") => Dimension::Series {
                series_id: coerce_id(&raw.series_id),
            },
            Some("author") => Dimension::Author {
                author_id: coerce_id(&raw.author_id),
            },
            _ => {
                let tag_id = coerce_id(&raw.tag_id);
                let cc_num = coerce_id(&raw.cc_num);
                if tag_id > 0 {
                    Dimension::Tag { tag_id }
                } else if cc_num > 0 {
                    Dimension::CustomColumn {
                        num: cc_num,
                        value_id: coerce_id(&raw.cc_id),
                    }
                } else {
                    Dimension::All
                }
            }
        };

        Filter {
            tokens,
            dimension,
            sort: raw.sort_string.clone().unwrap_or_default(),
        }
    }

    /// Search tokens as a slice; an absent search means no predicates.
    pub fn tokens(&self) -> &[String] {
        self.tokens.as_deref().unwrap_or_default()
    }
}

/// Lowercases, converts `+` to a space, collapses punctuation/whitespace
/// runs to single spaces, doubles single quotes (SQL-literal escape), and
/// splits on spaces.
///
/// An empty input yields `[""]`. The store turns the empty token into
/// `LIKE '%%'`, which matches every row, so callers see "no effective
/// filter" rather than an empty result.
pub fn tokenize(raw: &str) -> Vec<String> {
    let lowered = raw.to_lowercase().replace('+', " ");
    let collapsed = SEPARATORS.replace_all(&lowered, " ");
    let escaped = collapsed.trim().replace('\'', "''");
    escaped.split(' ').map(str::to_owned).collect()
}

#[cfg(test)]
mod tests {
    use super::{Dimension, Filter, RawListOptions, coerce_id, tokenize};
    use serde_json::{Value, json};

    fn raw(body: Value) -> RawListOptions {
        serde_json::from_value(body).expect("valid raw options")
    }

    #[test]
    fn tokenizes_search_string() {
        assert_eq!(tokenize("Harry Potter"), vec!["harry", "potter"]);
        assert_eq!(tokenize("foo+bar"), vec!["foo", "bar"]);
        assert_eq!(tokenize("  A,b;C--d  "), vec!["a", "b", "c", "d"]);
    }

    #[test]
    fn empty_search_yields_single_empty_token() {
        assert_eq!(tokenize(""), vec![String::new()]);
    }

    #[test]
    fn doubles_single_quotes_for_sql_literals() {
        assert_eq!(tokenize("don't"), vec!["don''t"]);
    }

    #[test]
    fn tokenization_is_idempotent_on_normalized_input() {
        let once = tokenize("The Colour: of Magic!");
        let twice = tokenize(&once.join(" "));
        assert_eq!(once, twice);
    }

    #[test]
    fn malformed_numeric_fields_deactivate() {
        assert_eq!(coerce_id(&Some(json!("abc"))), 0);
        assert_eq!(coerce_id(&Some(json!(null))), 0);
        assert_eq!(coerce_id(&None), 0);
        assert_eq!(coerce_id(&Some(json!("7"))), 7);
        assert_eq!(coerce_id(&Some(json!(12))), 12);
    }

    #[test]
    fn plain_search_resolves_to_all() {
        let filter = Filter::resolve(&raw(json!({ "searchString": "Harry Potter" })));
        assert_eq!(filter.dimension, Dimension::All);
        assert_eq!(filter.tokens(), ["harry", "potter"]);
    }

    #[test]
    fn tag_wins_over_custom_column() {
        let filter = Filter::resolve(&raw(json!({ "tagId": 5, "ccNum": 3 })));
        assert_eq!(filter.dimension, Dimension::Tag { tag_id: 5 });
    }

    #[test]
    fn custom_column_applies_when_tag_inactive() {
        let filter = Filter::resolve(&raw(json!({ "tagId": "junk", "ccNum": 3, "ccId": 9 })));
        assert_eq!(
            filter.dimension,
            Dimension::CustomColumn { num: 3, value_id: 9 }
        );
    }

    #[test]
    fn serie_entry_type_bypasses_tag_and_cc() {
        let filter = Filter::resolve(&raw(json!({
            "type": "serie",
            "serieId": "4",
            "tagId": 5,
            "ccNum": 3,
        })));
        assert_eq!(filter.dimension, Dimension::Series { series_id: 4 });
    }

    #[test]
    fn author_entry_type_bypasses_tag_and_cc() {
        let filter = Filter::resolve(&raw(json!({
            "type": "author",
            "authorsId": 11,
            "tagId": 5,
        })));
        assert_eq!(filter.dimension, Dimension::Author { author_id: 11 });
    }

    #[test]
    fn sort_string_passes_through() {
        let filter = Filter::resolve(&raw(json!({ "sortString": "pubnew" })));
        assert_eq!(filter.sort, "pubnew");
    }
}
