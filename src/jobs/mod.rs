//! Background job coordination
//!
//! A registry of named batch jobs: each is submitted once under a
//! caller-supplied request id, executed by a spawned worker, and collected
//! exactly once by the first caller that observes its completion. The
//! registry is generic over the payload so it can be exercised without the
//! network.

use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{watch, RwLock};

/// Job-level failures surfaced to the caller
#[derive(Debug, Error, PartialEq, Eq)]
pub enum JobError {
    /// A job already exists under this request id
    #[error("a job already exists for request id {0}")]
    DuplicateId(String),

    /// No job under this request id — never submitted, or already collected
    #[error("no job for request id {0}")]
    NotFound(String),
}

/// One registered job: a single-fire completion signal carrying the payload.
///
/// The sender half lives in the worker task; `None` means still pending. The
/// channel fires exactly once, moving the job from pending to completed.
struct JobEntry<T> {
    completed: watch::Receiver<Option<Arc<T>>>,
}

/// Registry of in-flight and completed jobs keyed by request id
///
/// Shared across all request handlers behind an `Arc`. Existence checks and
/// waiting take the read lock; registration and the consume-once removal
/// take the write lock. An uncollected job stays registered until process
/// exit.
pub struct JobRegistry<T> {
    jobs: RwLock<HashMap<String, Arc<JobEntry<T>>>>,
}

impl<T: Send + Sync + 'static> JobRegistry<T> {
    /// Creates an empty registry
    pub fn new() -> Self {
        Self {
            jobs: RwLock::new(HashMap::new()),
        }
    }

    /// Registers a job under `request_id` and spawns `work` in the background
    ///
    /// Returns as soon as the worker is scheduled. Fails with
    /// [`JobError::DuplicateId`] if any job — pending or completed — already
    /// holds the id; the registry is left untouched in that case.
    pub async fn submit<F>(&self, request_id: &str, work: F) -> Result<(), JobError>
    where
        F: Future<Output = T> + Send + 'static,
    {
        let (tx, rx) = watch::channel::<Option<Arc<T>>>(None);

        let mut jobs = self.jobs.write().await;
        if jobs.contains_key(request_id) {
            return Err(JobError::DuplicateId(request_id.to_string()));
        }
        jobs.insert(request_id.to_string(), Arc::new(JobEntry { completed: rx }));
        drop(jobs);

        let id = request_id.to_string();
        tokio::spawn(async move {
            tracing::info!("{}: started", id);
            let payload = work.await;
            // Send only fails once every receiver is gone, which means the
            // job was already consumed and nobody is left to notify.
            let _ = tx.send(Some(Arc::new(payload)));
            tracing::info!("{}: finished", id);
        });

        Ok(())
    }

    /// Waits for the job under `request_id` and consumes it
    ///
    /// Unknown ids fail immediately with [`JobError::NotFound`]. A pending
    /// job suspends the caller until the worker finishes (no timeout). At
    /// most one caller wins the completed payload: the winning claim removes
    /// the job, and every other caller — concurrent or later — gets
    /// [`JobError::NotFound`].
    pub async fn collect(&self, request_id: &str) -> Result<Arc<T>, JobError> {
        let entry = {
            let jobs = self.jobs.read().await;
            jobs.get(request_id).cloned()
        };
        let Some(entry) = entry else {
            return Err(JobError::NotFound(request_id.to_string()));
        };

        // Wait for the completion signal. A sender dropped without a payload
        // means the worker died; treat the job as gone.
        let mut completed = entry.completed.clone();
        let payload = {
            match completed.wait_for(|payload| payload.is_some()).await {
                Ok(value) => (*value).clone(),
                Err(_) => return Err(JobError::NotFound(request_id.to_string())),
            }
        };

        // Claim-and-remove is a single critical section: remove the job only
        // if the registry still holds this exact entry. A concurrent winner
        // may have consumed the id already, and a new job may since have been
        // submitted under it — that one is not ours to take.
        let mut jobs = self.jobs.write().await;
        let won = match jobs.get(request_id) {
            Some(current) if Arc::ptr_eq(current, &entry) => {
                jobs.remove(request_id);
                true
            }
            _ => false,
        };
        drop(jobs);

        if !won {
            return Err(JobError::NotFound(request_id.to_string()));
        }

        payload.ok_or_else(|| JobError::NotFound(request_id.to_string()))
    }

    /// Number of registered jobs, pending or completed
    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    /// Whether the registry holds no jobs
    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}

impl<T: Send + Sync + 'static> Default for JobRegistry<T> {
    fn default() -> Self {
        Self::new()
    }
}
