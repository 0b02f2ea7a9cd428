use std::path::{Path, PathBuf};

use reqwest::Method;

use crate::api::ApiClient;
use crate::api::client::is_still_building;
use crate::api::schema::job::{CreateJobResponse, JobStatusResponse};
use crate::api::schema::seller::SellerRecord;
use crate::error::AppResult;
use crate::filters::{ParseFlow, QueryString};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExportOutcome {
    Saved(PathBuf),
    /// The backend is still building the file; the caller may try again.
    StillBuilding,
}

/// Background-job endpoints, one set per parse flow.
pub struct JobOperations;

impl JobOperations {
    pub fn prefix(flow: ParseFlow) -> &'static str {
        match flow {
            ParseFlow::Subcategory => "/parse/cat",
            ParseFlow::Catalog => "/parse",
        }
    }

    pub async fn create(
        client: &ApiClient,
        token: &str,
        flow: ParseFlow,
        query: &QueryString,
    ) -> AppResult<String> {
        let request = client.request(Method::POST, Self::prefix(flow), Some(query), Some(token));
        let response = client.send(request).await?;
        let body: CreateJobResponse = client.json(response).await?;
        tracing::info!("Started {} job {}", flow.as_str(), body.job_id);
        Ok(body.job_id)
    }

    pub async fn status(
        client: &ApiClient,
        token: &str,
        flow: ParseFlow,
        job_id: &str,
    ) -> AppResult<JobStatusResponse> {
        let path = format!("{}/jobs/{}/status", Self::prefix(flow), job_id);
        client.get_json(&path, None, token).await
    }

    pub async fn result(
        client: &ApiClient,
        token: &str,
        flow: ParseFlow,
        job_id: &str,
    ) -> AppResult<Vec<SellerRecord>> {
        let path = format!("{}/jobs/{}/result", Self::prefix(flow), job_id);
        client.get_json(&path, None, token).await
    }

    /// Downloads the spreadsheet of a finished job as `report_<id>.xlsx`.
    pub async fn export(
        client: &ApiClient,
        token: &str,
        flow: ParseFlow,
        job_id: &str,
        dir: &Path,
    ) -> AppResult<ExportOutcome> {
        let path = format!("{}/jobs/{}/excel", Self::prefix(flow), job_id);
        let request = client.request(Method::GET, &path, None, Some(token));
        let response = client.send(request).await?;
        if is_still_building(response.status()) {
            tracing::info!("Export for job {} is still being built", job_id);
            return Ok(ExportOutcome::StillBuilding);
        }
        let file_name = format!("report_{}.xlsx", job_id);
        let saved = client.save_download(response, dir, &file_name).await?;
        Ok(ExportOutcome::Saved(saved))
    }
}
