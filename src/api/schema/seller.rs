use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use super::parse_timestamp;

/// One seller row, as returned by job results, listings and search.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SellerRecord {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub seller_id: Option<i64>,
    #[serde(default)]
    pub store_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trademark: Option<String>,
    #[serde(default)]
    pub inn: Option<String>,
    #[serde(default)]
    pub ogrn: Option<String>,
    #[serde(default)]
    pub ogrnip: Option<String>,
    #[serde(default)]
    pub tax_office: Option<String>,
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub reg_date: Option<String>,
    #[serde(rename = "saleCount", default)]
    pub sale_count: Option<i64>,
    #[serde(default, deserialize_with = "contact_list")]
    pub phone: Vec<String>,
    #[serde(default, deserialize_with = "contact_list")]
    pub email: Vec<String>,
}

impl SellerRecord {
    /// Store name, falling back to the trademark.
    pub fn display_name(&self) -> &str {
        self.store_name
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(self.trademark.as_deref())
            .unwrap_or("")
    }

    pub fn registered_at(&self) -> Option<DateTime<Utc>> {
        self.reg_date.as_deref().and_then(parse_timestamp)
    }

    pub fn sales(&self) -> i64 {
        self.sale_count.unwrap_or(0)
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Contacts {
    Many(Vec<Option<String>>),
    One(String),
}

/// Contacts arrive as a list, a single string, or null.
fn contact_list<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let contacts = Option::<Contacts>::deserialize(deserializer)?;
    let list = match contacts {
        Some(Contacts::Many(items)) => items.into_iter().flatten().collect(),
        Some(Contacts::One(item)) => vec![item],
        None => Vec::new(),
    };
    Ok(list
        .into_iter()
        .map(|item| item.trim().to_string())
        .filter(|item| !item.is_empty())
        .collect())
}
