//! Task lifecycle: submit once, poll until a terminal status, hand back the
//! final snapshot.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::api::MeshyApi;
use crate::error::{MeshyError, Result};
use crate::types::{AnimationResult, ModelResult, RiggedResult, TaskKind, TaskStatus};

/// Opaque task id returned by a creation endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TaskHandle(String);

impl TaskHandle {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Display for TaskHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Common view over the per-kind status payloads.
pub trait TaskSnapshot: DeserializeOwned + Send {
    fn status(&self) -> TaskStatus;
    fn progress(&self) -> i64;
    fn error_message(&self) -> Option<&str>;
    /// URL of the downloadable model, empty until the task succeeds.
    fn artifact_url(&self) -> &str;
}

fn non_empty(message: Option<&str>) -> Option<&str> {
    message.filter(|m| !m.trim().is_empty())
}

impl TaskSnapshot for ModelResult {
    fn status(&self) -> TaskStatus {
        self.status
    }
    fn progress(&self) -> i64 {
        self.progress
    }
    fn error_message(&self) -> Option<&str> {
        non_empty(self.task_error.as_ref().and_then(|e| e.message.as_deref()))
    }
    fn artifact_url(&self) -> &str {
        &self.model_urls.glb
    }
}

impl TaskSnapshot for RiggedResult {
    fn status(&self) -> TaskStatus {
        self.status
    }
    fn progress(&self) -> i64 {
        self.progress
    }
    fn error_message(&self) -> Option<&str> {
        non_empty(self.task_error.as_ref().and_then(|e| e.message.as_deref()))
    }
    fn artifact_url(&self) -> &str {
        &self.result.rigged_character_glb_url
    }
}

impl TaskSnapshot for AnimationResult {
    fn status(&self) -> TaskStatus {
        self.status
    }
    fn progress(&self) -> i64 {
        self.progress
    }
    fn error_message(&self) -> Option<&str> {
        non_empty(self.task_error.as_ref().and_then(|e| e.message.as_deref()))
    }
    fn artifact_url(&self) -> &str {
        &self.result.animation_glb_url
    }
}

/// Progress reported after each poll.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressUpdate {
    pub task_id: String,
    pub status: TaskStatus,
    /// Percentage in `0..=100`, never lower than a previous update for the
    /// same task.
    pub progress: u8,
}

/// Polling cadence and timeout.
#[derive(Debug, Clone)]
pub struct PollConfig {
    /// Delay between status requests.
    pub interval: Duration,
    /// Give up after this long. `None` = wait until a terminal status.
    pub timeout: Option<Duration>,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(5),
            timeout: None,
        }
    }
}

/// Drives the poll-until-terminal loop for one task at a time.
///
/// The optional cancellation flag is checked before every status request;
/// dropping the returned future also abandons any in-flight request.
#[derive(Debug, Clone, Default)]
pub struct Poller {
    config: PollConfig,
    cancel: Option<Arc<AtomicBool>>,
}

impl Poller {
    pub fn new(config: PollConfig) -> Self {
        Self {
            config,
            cancel: None,
        }
    }

    /// Attach a shared cancellation flag.
    pub fn with_cancellation(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn config(&self) -> &PollConfig {
        &self.config
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel
            .as_ref()
            .map(|f| f.load(Ordering::Relaxed))
            .unwrap_or(false)
    }

    /// Poll until the task succeeds, fails, or the wait is cut short.
    ///
    /// Returns the succeeded snapshot. A failed or canceled task becomes
    /// [`MeshyError::TaskFailed`] carrying the vendor's message when it sent one.
    pub async fn wait<R, F>(
        &self,
        api: &dyn MeshyApi,
        kind: TaskKind,
        handle: &TaskHandle,
        mut on_progress: F,
    ) -> Result<R>
    where
        R: TaskSnapshot,
        F: FnMut(&ProgressUpdate),
    {
        let start = Instant::now();
        let mut reported: u8 = 0;
        loop {
            if self.is_cancelled() {
                info!(task_id = %handle, "polling cancelled");
                return Err(MeshyError::Cancelled);
            }
            if let Some(timeout) = self.config.timeout {
                if start.elapsed() > timeout {
                    warn!(task_id = %handle, ?timeout, "polling timed out");
                    return Err(MeshyError::Timeout {
                        task_id: handle.to_string(),
                    });
                }
            }

            let raw = api.poll(kind, handle).await?;
            let snapshot: R = serde_json::from_value(raw)?;
            let status = snapshot.status();

            let clamped = snapshot.progress().clamp(0, 100) as u8;
            reported = reported.max(clamped);
            if status == TaskStatus::Succeeded {
                reported = 100;
            }
            debug!(task_id = %handle, %status, progress = reported, "polled task");
            on_progress(&ProgressUpdate {
                task_id: handle.to_string(),
                status,
                progress: reported,
            });

            match status {
                TaskStatus::Succeeded => {
                    info!(task_id = %handle, %kind, "task succeeded");
                    return Ok(snapshot);
                }
                TaskStatus::Failed | TaskStatus::Canceled => {
                    let message = snapshot
                        .error_message()
                        .map(str::to_string)
                        .unwrap_or_else(|| format!("task ended with status {}", status));
                    warn!(task_id = %handle, %status, %message, "task did not succeed");
                    return Err(MeshyError::TaskFailed {
                        task_id: handle.to_string(),
                        message,
                    });
                }
                _ => {}
            }

            tokio::time::sleep(self.config.interval).await;
        }
    }
}
