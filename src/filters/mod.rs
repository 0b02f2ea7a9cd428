mod model;
mod query;

pub use model::{CategorySelection, LookupKey, MAX_LIMIT, MAX_PAGES, ParseFilters, ParseFlow};
pub use query::QueryString;
