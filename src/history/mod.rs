use crate::api::ApiClient;
use crate::api::operations::HistoryOperations;
use crate::api::schema::history::HistoryEntry;

/// Past collection runs, in server order, with at most one entry
/// expanded to show its parameters.
#[derive(Debug, Clone, Default)]
pub struct HistoryView {
    entries: Vec<HistoryEntry>,
    expanded: Option<i64>,
}

impl HistoryView {
    pub fn new(entries: Vec<HistoryEntry>) -> Self {
        HistoryView {
            entries,
            expanded: None,
        }
    }

    /// Loads the history. An unreachable history shows as empty.
    pub async fn load(client: &ApiClient, token: &str) -> Self {
        match HistoryOperations::list(client, token).await {
            Ok(entries) => HistoryView::new(entries),
            Err(e) => {
                tracing::warn!("Parse history unavailable: {}", e);
                HistoryView::default()
            }
        }
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn expanded(&self) -> Option<&HistoryEntry> {
        let id = self.expanded?;
        self.entries.iter().find(|entry| entry.id == id)
    }

    /// Expands `id`, or collapses it when it is already open.
    pub fn toggle(&mut self, id: i64) {
        self.expanded = match self.expanded {
            Some(open) if open == id => None,
            _ => Some(id),
        };
    }

    pub fn summary(entry: &HistoryEntry) -> String {
        let when = entry
            .created()
            .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
            .unwrap_or_else(|| entry.created_at.clone());
        format!("#{} {} | {} records", entry.id, when, entry.record_count())
    }
}
