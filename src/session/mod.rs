use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::{debug, warn};

use crate::error::AppResult;
use crate::infrastructure::auth::token_expiry;

/// A persisted login: the bearer token plus the cookie lifetime it was
/// saved with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub token: String,
    pub saved_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Session {
    pub fn new(token: impl Into<String>, ttl: chrono::Duration) -> Self {
        let saved_at = Utc::now();
        Session {
            token: token.into(),
            saved_at,
            expires_at: saved_at + ttl,
        }
    }

    /// Expiry carried by the token payload, if it has one.
    pub fn claims_expiry(&self) -> Option<DateTime<Utc>> {
        token_expiry(&self.token)
    }

    pub fn is_stored_expired(&self, now: DateTime<Utc>) -> bool {
        now >= self.expires_at
    }
}

/// File-backed session cookie.
#[derive(Debug, Clone)]
pub struct SessionStore {
    path: PathBuf,
    ttl: chrono::Duration,
}

impl SessionStore {
    pub fn new(path: impl Into<PathBuf>, ttl: chrono::Duration) -> Self {
        SessionStore {
            path: path.into(),
            ttl,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads the saved session. A missing, corrupt or expired file yields
    /// `None`; the latter two are removed.
    pub async fn load(&self) -> Option<Session> {
        let raw = match fs::read_to_string(&self.path).await {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return None,
            Err(e) => {
                warn!("Cannot read session file {}: {}", self.path.display(), e);
                return None;
            }
        };

        match serde_json::from_str::<Session>(&raw) {
            Ok(session) if !session.token.is_empty() && !session.is_stored_expired(Utc::now()) => {
                Some(session)
            }
            Ok(_) => {
                debug!("Stored session expired, discarding");
                self.discard().await;
                None
            }
            Err(e) => {
                warn!("Discarding unreadable session file: {}", e);
                self.discard().await;
                None
            }
        }
    }

    pub async fn save(&self, token: &str) -> AppResult<Session> {
        let session = Session::new(token, self.ttl);
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }
        let body = serde_json::to_vec_pretty(&session)?;
        fs::write(&self.path, body).await?;
        debug!("Session saved to {}", self.path.display());
        Ok(session)
    }

    pub async fn clear(&self) -> AppResult<()> {
        match fs::remove_file(&self.path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn discard(&self) {
        if let Err(e) = self.clear().await {
            warn!("Cannot remove session file {}: {}", self.path.display(), e);
        }
    }
}
