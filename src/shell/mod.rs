use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval, sleep};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::AppState;
use crate::api::operations::{AuthOperations, BalanceOperations};
use crate::api::schema::auth::BalanceReading;
use crate::error::{AppError, AppResult};
use crate::session::{Session, SessionStore};

/// Session lifecycle shared by every command: the stored login, the
/// balance poller and the auto-logout timer.
#[derive(Clone)]
pub struct Shell {
    inner: Arc<Inner>,
}

struct Inner {
    state: AppState,
    store: SessionStore,
    session: watch::Sender<Option<Session>>,
    balance: watch::Sender<Option<BalanceReading>>,
    teardown: CancellationToken,
}

impl Inner {
    async fn end_session(&self) -> AppResult<()> {
        self.session.send_replace(None);
        self.balance.send_replace(None);
        self.store.clear().await
    }
}

impl Shell {
    /// Opens the shell with whatever session the store still holds.
    pub async fn open(state: AppState) -> Self {
        let store = SessionStore::new(&state.config.session_file, state.config.session_ttl());
        let session = store.load().await;
        if session.is_some() {
            debug!("Restored session from {}", store.path().display());
        }
        Shell {
            inner: Arc::new(Inner {
                state,
                store,
                session: watch::Sender::new(session),
                balance: watch::Sender::new(None),
                teardown: CancellationToken::new(),
            }),
        }
    }

    pub fn state(&self) -> &AppState {
        &self.inner.state
    }

    pub async fn login(&self, username: &str, password: &str) -> AppResult<Session> {
        if username.trim().is_empty() || password.is_empty() {
            return Err(AppError::Validation(
                "username and password are required".into(),
            ));
        }
        let token = AuthOperations::login(&self.inner.state.client, username, password).await?;
        let session = self.inner.store.save(&token).await?;
        self.inner.session.send_replace(Some(session.clone()));
        Ok(session)
    }

    pub async fn logout(&self) -> AppResult<()> {
        self.inner.end_session().await?;
        info!("Logged out");
        Ok(())
    }

    pub fn session(&self) -> Option<Session> {
        self.inner.session.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.inner.session.subscribe()
    }

    pub fn balance(&self) -> watch::Receiver<Option<BalanceReading>> {
        self.inner.balance.subscribe()
    }

    /// Bearer token of a live session. A token whose own expiry has passed
    /// counts as logged out even before the watcher clears it.
    pub fn require_token(&self) -> AppResult<String> {
        let session = self.session().ok_or(AppError::NotLoggedIn)?;
        match session.claims_expiry() {
            Some(exp) if exp <= Utc::now() => Err(AppError::NotLoggedIn),
            _ => Ok(session.token),
        }
    }

    /// Fetches the balance now, then on every refresh interval and after
    /// each login. Failures are logged and the last reading is kept.
    pub fn spawn_balance_refresher(&self) -> JoinHandle<()> {
        let inner = self.inner.clone();
        let mut sessions = inner.session.subscribe();
        tokio::spawn(async move {
            let mut ticker = interval(inner.state.config.balance_refresh_interval());
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    biased;
                    _ = inner.teardown.cancelled() => return,
                    changed = sessions.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                    _ = ticker.tick() => {}
                }

                let Some(token) = sessions.borrow_and_update().as_ref().map(|s| s.token.clone())
                else {
                    continue;
                };
                let fetched = BalanceOperations::fetch(&inner.state.client, &token).await;
                if inner.teardown.is_cancelled() {
                    return;
                }
                match fetched {
                    Ok(balance) => {
                        inner.balance.send_replace(Some(BalanceReading {
                            balance,
                            fetched_at: Utc::now(),
                        }));
                    }
                    Err(e) => warn!("Balance refresh failed: {}", e),
                }
            }
        })
    }

    /// Logs out when the token's own expiry passes. Re-arms on every
    /// session change; tokens without an expiry never time out.
    pub fn spawn_expiry_watcher(&self) -> JoinHandle<()> {
        let inner = self.inner.clone();
        let mut sessions = inner.session.subscribe();
        tokio::spawn(async move {
            loop {
                let expiry = sessions
                    .borrow_and_update()
                    .as_ref()
                    .and_then(Session::claims_expiry);
                let wait = expiry.map(|exp| (exp - Utc::now()).to_std().unwrap_or(Duration::ZERO));

                tokio::select! {
                    biased;
                    _ = inner.teardown.cancelled() => return,
                    changed = sessions.changed() => {
                        if changed.is_err() {
                            return;
                        }
                    }
                    _ = sleep(wait.unwrap_or_default()), if wait.is_some() => {
                        info!("Session token expired, logging out");
                        if let Err(e) = inner.end_session().await {
                            warn!("Automatic logout failed: {}", e);
                        }
                    }
                }
            }
        })
    }

    /// Stops every background task started by this shell.
    pub fn shutdown(&self) {
        self.inner.teardown.cancel();
    }
}
