use crate::models::error::SError;
use std::time::Duration;
use tokio::task::spawn_blocking;
use tracing::warn;

/// Runs blocking filesystem work off the async executor.
pub struct TaskRunner;

impl TaskRunner {
    /// Runs `f` on the blocking pool. With a `timeout`, stops waiting once it
    /// elapses and returns `Timeout`; the worker itself is not interrupted.
    pub async fn run<F, R>(timeout: Option<Duration>, f: F) -> Result<R, SError>
    where
        F: FnOnce() -> Result<R, SError> + Send + 'static,
        R: Send + 'static,
    {
        let handle = spawn_blocking(f);

        let joined = match timeout {
            Some(limit) => tokio::time::timeout(limit, handle).await.map_err(|_| {
                warn!("Task did not finish within {limit:?}");
                SError::Timeout(limit.as_secs())
            })?,
            None => handle.await,
        };

        joined.map_err(|e| SError::AsyncRuntimeError(e.to_string()))?
    }
}
