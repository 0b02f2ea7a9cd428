use crate::api::ApiClient;
use crate::api::schema::history::HistoryEntry;
use crate::error::AppResult;

pub struct HistoryOperations;

impl HistoryOperations {
    pub async fn list(client: &ApiClient, token: &str) -> AppResult<Vec<HistoryEntry>> {
        client.get_json("/parse-data", None, token).await
    }
}
