mod debounce;
mod filters;
mod results;
mod sort;

pub use debounce::{Debouncer, SuggestionFeed};
pub use filters::SearchFilters;
pub use results::SearchResults;
pub use sort::SortOrder;
