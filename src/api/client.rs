use std::path::{Path, PathBuf};

use reqwest::{Client, Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error, warn};

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::filters::QueryString;
use crate::result::{Envelope, ErrorBody};

/// Thin wrapper over `reqwest::Client` bound to the backend base URL.
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(config: &Config) -> AppResult<Self> {
        let mut builder = Client::builder().user_agent(concat!(
            env!("CARGO_PKG_NAME"),
            "/",
            env!("CARGO_PKG_VERSION")
        ));
        if let Some(timeout) = config.request_timeout() {
            builder = builder.timeout(timeout);
        }
        let http = builder.build()?;
        Ok(ApiClient {
            http,
            base_url: config.api_base.clone(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str, query: Option<&QueryString>) -> String {
        let mut url = format!("{}{}", self.base_url, path);
        if let Some(query) = query {
            let rendered = query.render();
            if !rendered.is_empty() {
                url.push('?');
                url.push_str(&rendered);
            }
        }
        url
    }

    pub fn request(
        &self,
        method: Method,
        path: &str,
        query: Option<&QueryString>,
        token: Option<&str>,
    ) -> RequestBuilder {
        let url = self.url(path, query);
        debug!("{} {}", method, url);
        let builder = self.http.request(method, url);
        match token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Sends the request and turns any non-2xx status into an `AppError`.
    /// Server errors are logged together with their body.
    pub async fn send(&self, request: RequestBuilder) -> AppResult<Response> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let url = response.url().clone();
        let body = response.text().await.unwrap_or_default();
        if status.is_server_error() {
            error!(
                "Server error occurred - Status: {}, Url: {}, Body: {}",
                status, url, body
            );
        } else {
            warn!("Request rejected - Status: {}, Url: {}", status, url);
        }

        let detail = serde_json::from_str::<ErrorBody>(&body)
            .ok()
            .and_then(|b| b.message());
        Err(AppError::from_status(status, detail))
    }

    /// Decodes a JSON body, accepting both wrapped and bare payloads.
    pub async fn json<T: DeserializeOwned>(&self, response: Response) -> AppResult<T> {
        let url = response.url().clone();
        let bytes = response.bytes().await?;
        serde_json::from_slice::<Envelope<T>>(&bytes)
            .map(Envelope::into_inner)
            .map_err(|e| AppError::Decode(format!("{}: {}", url.path(), e)))
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Option<&QueryString>,
        token: &str,
    ) -> AppResult<T> {
        let response = self
            .send(self.request(Method::GET, path, query, Some(token)))
            .await?;
        self.json(response).await
    }

    /// Writes a download to `dir/file_name`, creating `dir` if needed.
    pub async fn save_download(
        &self,
        response: Response,
        dir: &Path,
        file_name: &str,
    ) -> AppResult<PathBuf> {
        let bytes = response.bytes().await?;
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(file_name);
        tokio::fs::write(&path, &bytes).await?;
        debug!("Saved {} bytes to {}", bytes.len(), path.display());
        Ok(path)
    }
}

pub(crate) fn is_still_building(status: StatusCode) -> bool {
    status == StatusCode::ACCEPTED
}
