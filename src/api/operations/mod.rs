mod auth;
mod category;
mod history;
mod job;
mod search;

pub use auth::{AuthOperations, BalanceOperations};
pub use category::CategoryOperations;
pub use history::HistoryOperations;
pub use job::{ExportOutcome, JobOperations};
pub use search::SearchOperations;
