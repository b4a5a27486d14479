pub mod filter;
pub mod pagination;

pub use filter::{Dimension, Filter, RawListOptions, coerce_id, tokenize};
pub use pagination::{NavLinks, PageLink, PageNav, paginate};
