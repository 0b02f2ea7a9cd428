use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio_util::sync::{CancellationToken, DropGuard};
use tracing::{debug, info, warn};

use crate::AppState;
use crate::api::ApiClient;
use crate::api::operations::{ExportOutcome, JobOperations};
use crate::api::schema::job::JobStatus;
use crate::api::schema::seller::SellerRecord;
use crate::catalog::{Catalog, RegionTable};
use crate::error::{AppError, AppResult};
use crate::filters::{ParseFilters, ParseFlow};

/// Client-side view of a job's lifecycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobPhase {
    NotStarted,
    Submitted { job_id: String },
    Polling { job_id: String, attempts: u32 },
    Finished { job_id: String },
    ResultFetched { job_id: String, count: usize },
    Failed { job_id: Option<String>, message: String },
    Cancelled { job_id: Option<String> },
}

impl JobPhase {
    pub fn job_id(&self) -> Option<&str> {
        match self {
            JobPhase::NotStarted => None,
            JobPhase::Submitted { job_id }
            | JobPhase::Polling { job_id, .. }
            | JobPhase::Finished { job_id }
            | JobPhase::ResultFetched { job_id, .. } => Some(job_id),
            JobPhase::Failed { job_id, .. } | JobPhase::Cancelled { job_id } => job_id.as_deref(),
        }
    }

    pub fn is_done(&self) -> bool {
        matches!(
            self,
            JobPhase::ResultFetched { .. } | JobPhase::Failed { .. } | JobPhase::Cancelled { .. }
        )
    }
}

#[derive(Debug, Clone)]
pub struct CompletedJob {
    pub flow: ParseFlow,
    pub job_id: String,
    pub sellers: Vec<SellerRecord>,
}

/// Drives one server-side parse job: create, poll at a fixed interval
/// until `finished` or `failed`, then fetch the result once.
///
/// Every wait and request races the caller's cancellation token, so an
/// abandoned job stops issuing requests.
pub struct JobWorkflow {
    client: ApiClient,
    catalog: Arc<Catalog>,
    regions: Arc<RegionTable>,
    token: String,
    poll_interval: Duration,
    phase: Arc<watch::Sender<JobPhase>>,
}

impl JobWorkflow {
    pub fn new(state: &AppState, token: impl Into<String>) -> Self {
        let (phase, _) = watch::channel(JobPhase::NotStarted);
        JobWorkflow {
            client: state.client.clone(),
            catalog: state.catalog.clone(),
            regions: state.regions.clone(),
            token: token.into(),
            poll_interval: state.config.job_poll_interval(),
            phase: Arc::new(phase),
        }
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn subscribe(&self) -> watch::Receiver<JobPhase> {
        self.phase.subscribe()
    }

    pub fn phase(&self) -> JobPhase {
        self.phase.borrow().clone()
    }

    pub async fn run(
        &self,
        filters: &ParseFilters,
        cancel: &CancellationToken,
    ) -> AppResult<CompletedJob> {
        let outcome = self.drive(filters, cancel).await;
        if let Err(e) = &outcome {
            self.phase.send_modify(|phase| {
                let job_id = phase.job_id().map(str::to_owned);
                *phase = match e {
                    AppError::Cancelled => JobPhase::Cancelled { job_id },
                    other => JobPhase::Failed {
                        job_id,
                        message: other.user_message(),
                    },
                };
            });
        }
        outcome
    }

    /// Runs the workflow on its own task. Dropping the handle cancels it.
    pub fn spawn(self, filters: ParseFilters) -> JobHandle {
        let cancel = CancellationToken::new();
        let phase = self.subscribe();
        let task_cancel = cancel.clone();
        let task = tokio::spawn(async move { self.run(&filters, &task_cancel).await });
        JobHandle {
            task,
            phase,
            cancel: cancel.clone(),
            _guard: cancel.drop_guard(),
        }
    }

    /// Requests the spreadsheet of an earlier job. A file still being built
    /// is reported, not retried.
    pub async fn export(
        &self,
        flow: ParseFlow,
        job_id: &str,
        dir: &Path,
    ) -> AppResult<ExportOutcome> {
        JobOperations::export(&self.client, &self.token, flow, job_id, dir).await
    }

    async fn drive(
        &self,
        filters: &ParseFilters,
        cancel: &CancellationToken,
    ) -> AppResult<CompletedJob> {
        filters.validate(&self.catalog, &self.regions)?;
        let flow = filters
            .flow()
            .ok_or_else(|| AppError::Validation("select a category first".into()))?;
        let query = filters.job_query(&self.catalog)?;

        let job_id = guarded(
            cancel,
            JobOperations::create(&self.client, &self.token, flow, &query),
        )
        .await?;
        self.phase.send_replace(JobPhase::Submitted {
            job_id: job_id.clone(),
        });

        let mut attempts = 0u32;
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    info!("Job {} abandoned while polling", job_id);
                    return Err(AppError::Cancelled);
                }
                _ = tokio::time::sleep(self.poll_interval) => {}
            }

            attempts += 1;
            self.phase.send_replace(JobPhase::Polling {
                job_id: job_id.clone(),
                attempts,
            });

            let status = guarded(
                cancel,
                JobOperations::status(&self.client, &self.token, flow, &job_id),
            )
            .await?;
            match status.status {
                JobStatus::Finished => break,
                JobStatus::Failed => {
                    let message = status
                        .error
                        .filter(|e| !e.trim().is_empty())
                        .unwrap_or_else(|| "job failed".to_string());
                    warn!("Job {} failed: {}", job_id, message);
                    return Err(AppError::JobFailed(message));
                }
                other => debug!("Job {} is {:?} after {} polls", job_id, other, attempts),
            }
        }

        self.phase.send_replace(JobPhase::Finished {
            job_id: job_id.clone(),
        });
        let sellers = guarded(
            cancel,
            JobOperations::result(&self.client, &self.token, flow, &job_id),
        )
        .await?;
        info!("Job {} finished with {} sellers", job_id, sellers.len());
        self.phase.send_replace(JobPhase::ResultFetched {
            job_id: job_id.clone(),
            count: sellers.len(),
        });

        Ok(CompletedJob {
            flow,
            job_id,
            sellers,
        })
    }
}

async fn guarded<T, F>(cancel: &CancellationToken, request: F) -> AppResult<T>
where
    F: Future<Output = AppResult<T>>,
{
    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(AppError::Cancelled),
        outcome = request => outcome,
    }
}

/// A spawned job, bound to the lifetime of this handle.
pub struct JobHandle {
    task: JoinHandle<AppResult<CompletedJob>>,
    phase: watch::Receiver<JobPhase>,
    cancel: CancellationToken,
    _guard: DropGuard,
}

impl JobHandle {
    pub fn phase(&self) -> watch::Receiver<JobPhase> {
        self.phase.clone()
    }

    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    pub async fn join(self) -> AppResult<CompletedJob> {
        let JobHandle { task, _guard, .. } = self;
        match task.await {
            Ok(outcome) => outcome,
            Err(e) if e.is_cancelled() => Err(AppError::Cancelled),
            Err(e) => std::panic::resume_unwind(e.into_panic()),
        }
    }
}
