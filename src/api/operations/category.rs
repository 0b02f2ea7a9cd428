use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use reqwest::Method;

use crate::api::ApiClient;
use crate::api::schema::auth::LastCollectedBody;
use crate::api::schema::parse_timestamp;
use crate::api::schema::seller::SellerRecord;
use crate::error::AppResult;
use crate::filters::{LookupKey, ParseFlow, QueryString};

/// Category-scoped endpoints that do not go through the job queue.
pub struct CategoryOperations;

impl CategoryOperations {
    /// Most recent collection with the same parameters. Best-effort: any
    /// failure reads as "no record".
    pub async fn last_collected(
        client: &ApiClient,
        token: &str,
        key: &LookupKey,
    ) -> Option<DateTime<Utc>> {
        let path = match key.flow {
            ParseFlow::Subcategory => "/wb/cat/last",
            ParseFlow::Catalog => "/wb/all/last",
        };
        match client
            .get_json::<LastCollectedBody>(path, Some(&key.query), token)
            .await
        {
            Ok(body) => body.last_collected.as_deref().and_then(parse_timestamp),
            Err(e) => {
                tracing::debug!("Last-collected lookup failed: {}", e);
                None
            }
        }
    }

    /// Synchronous listing for one category (`GET /wb/cat`).
    pub async fn list_sellers(
        client: &ApiClient,
        token: &str,
        query: &QueryString,
    ) -> AppResult<Vec<SellerRecord>> {
        client.get_json("/wb/cat", Some(query), token).await
    }

    /// Spreadsheet for one category, built on the fly by the backend.
    pub async fn export(
        client: &ApiClient,
        token: &str,
        query: &QueryString,
        dir: &Path,
    ) -> AppResult<PathBuf> {
        let mut query = query.clone();
        query.push("format", "excel");
        let request = client.request(Method::GET, "/wb/cat/xlsx", Some(&query), Some(token));
        let response = client.send(request).await?;
        client.save_download(response, dir, "report.xlsx").await
    }
}
