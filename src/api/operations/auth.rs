use reqwest::Method;

use crate::api::ApiClient;
use crate::api::schema::auth::{Balance, LoginForm, TokenBody};
use crate::error::{AppError, AppResult};

/// Credential exchange
pub struct AuthOperations;

impl AuthOperations {
    /// Exchanges credentials for a bearer token (form-encoded POST).
    pub async fn login(client: &ApiClient, username: &str, password: &str) -> AppResult<String> {
        let request = client
            .request(Method::POST, "/auth/login", None, None)
            .form(&LoginForm { username, password });
        let response = client.send(request).await?;
        let body: TokenBody = client.json(response).await?;

        match body.access_token {
            Some(token) if !token.trim().is_empty() => {
                tracing::info!("Logged in as {}", username);
                Ok(token)
            }
            _ => Err(AppError::Decode("login response carried no token".into())),
        }
    }
}

/// Account balance of the upstream data provider
pub struct BalanceOperations;

impl BalanceOperations {
    pub async fn fetch(client: &ApiClient, token: &str) -> AppResult<Balance> {
        let value: Option<serde_json::Value> =
            client.get_json("/usersbox/balance", None, token).await?;
        Ok(Balance::from_value(value))
    }
}
