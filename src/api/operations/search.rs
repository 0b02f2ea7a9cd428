use std::path::{Path, PathBuf};

use reqwest::Method;

use crate::api::ApiClient;
use crate::api::schema::search::{RefreshSaleCountResponse, Suggestion};
use crate::api::schema::seller::SellerRecord;
use crate::error::{AppError, AppResult};
use crate::filters::QueryString;
use crate::search::SearchFilters;

const SUGGESTION_LIMIT: u32 = 10;

/// Seller database search
pub struct SearchOperations;

impl SearchOperations {
    /// Type-ahead suggestions. Best-effort: blank input sends nothing and
    /// failures yield an empty list.
    pub async fn suggest(
        client: &ApiClient,
        token: &str,
        filters: &SearchFilters,
    ) -> Vec<Suggestion> {
        if filters.text().is_none() {
            return Vec::new();
        }
        let mut query = filters.query();
        query.push("limit", SUGGESTION_LIMIT);
        match client.get_json("/search", Some(&query), token).await {
            Ok(suggestions) => suggestions,
            Err(e) => {
                tracing::debug!("Suggestion lookup failed: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn results(
        client: &ApiClient,
        token: &str,
        filters: &SearchFilters,
    ) -> AppResult<Vec<SellerRecord>> {
        client
            .get_json("/search/results", Some(&filters.query()), token)
            .await
    }

    /// Category names known to the seller database. Best-effort.
    pub async fn distinct_categories(client: &ApiClient, token: &str) -> Vec<String> {
        match client
            .get_json("/search/distinct-categories", None, token)
            .await
        {
            Ok(categories) => categories,
            Err(e) => {
                tracing::debug!("Distinct categories unavailable: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn export(
        client: &ApiClient,
        token: &str,
        filters: &SearchFilters,
        dir: &Path,
    ) -> AppResult<PathBuf> {
        let request = client.request(
            Method::GET,
            "/search/xlsx",
            Some(&filters.query()),
            Some(token),
        );
        let response = client.send(request).await?;
        client
            .save_download(response, dir, "search_results.xlsx")
            .await
    }

    /// Asks the backend to re-read one seller's sale count upstream.
    pub async fn refresh_sale_count(
        client: &ApiClient,
        token: &str,
        seller_id: i64,
    ) -> AppResult<i64> {
        let mut query = QueryString::new();
        query.push("seller_id", seller_id);
        let request = client.request(
            Method::POST,
            "/wb/update_seller_data",
            Some(&query),
            Some(token),
        );
        let response = client.send(request).await?;
        let body: RefreshSaleCountResponse = client.json(response).await?;
        if body.is_error() {
            return Err(AppError::Http {
                status: 200,
                message: body
                    .detail
                    .unwrap_or_else(|| "sale count refresh failed".into()),
            });
        }
        body.sale_count()
            .ok_or_else(|| AppError::Decode("response carried no saleItemQuantity".into()))
    }
}
