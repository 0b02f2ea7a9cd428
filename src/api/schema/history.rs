use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::{Map, Value};

use super::parse_timestamp;

/// One past collection run.
#[derive(Debug, Clone, Deserialize)]
pub struct HistoryEntry {
    pub id: i64,
    pub created_at: String,
    #[serde(default)]
    pub total_contacts: Option<u64>,
    #[serde(default)]
    pub rows: Option<u64>,
    #[serde(default)]
    pub params: Option<Map<String, Value>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl HistoryEntry {
    pub fn created(&self) -> Option<DateTime<Utc>> {
        parse_timestamp(&self.created_at)
    }

    pub fn record_count(&self) -> u64 {
        self.total_contacts.or(self.rows).unwrap_or(0)
    }

    /// Run parameters: the `params` object when present, otherwise every
    /// field that is not bookkeeping.
    pub fn parameters(&self) -> Vec<(String, String)> {
        let source = self.params.as_ref().unwrap_or(&self.extra);
        source
            .iter()
            .map(|(key, value)| {
                let shown = match value {
                    Value::String(s) => s.clone(),
                    other => other.to_string(),
                };
                (key.clone(), shown)
            })
            .collect()
    }
}
