//! The tick loop behind every simulated task.

use std::future::Future;

use tokio::task::JoinHandle;

use super::handle::TaskHandle;
use super::types::{TaskError, TaskProfile};

/// Drive `handle` through `profile`, then run `work`.
///
/// Progress advances by `profile.step` every `profile.tick` until the
/// duration elapses. Cancellation is checked before each tick and again
/// before `work` runs. A cancel that lands while `work` is running is only
/// seen if `work` checks the handle itself before committing its result and
/// returns [`TaskError::Cancelled`].
pub async fn run_simulated<T, F, Fut>(
    handle: &TaskHandle,
    profile: TaskProfile,
    work: F,
) -> Result<T, TaskError>
where
    F: FnOnce() -> Fut,
    Fut: Future<Output = Result<T, TaskError>>,
{
    let mut elapsed = std::time::Duration::ZERO;
    let mut percent: u8 = 0;

    while elapsed < profile.duration {
        if handle.is_cancelled() {
            return cancelled(handle).await;
        }
        let tick = profile
            .tick
            .max(std::time::Duration::from_millis(1))
            .min(profile.duration - elapsed);
        tokio::time::sleep(tick).await;
        elapsed += tick;
        percent = percent.saturating_add(profile.step).min(100);
        handle.set_percent(percent).await;
    }

    if handle.is_cancelled() {
        return cancelled(handle).await;
    }

    let outcome = work().await;
    match &outcome {
        Ok(_) => {
            handle.finish(&Ok(())).await;
            tracing::debug!(task_id = %handle.id(), kind = handle.kind().as_str(), "task completed");
        }
        Err(TaskError::Cancelled) => {
            handle.finish(&Err(TaskError::Cancelled)).await;
            tracing::info!(task_id = %handle.id(), kind = handle.kind().as_str(), "task cancelled");
        }
        Err(err) => {
            handle.finish(&Err(err.clone())).await;
            tracing::warn!(task_id = %handle.id(), kind = handle.kind().as_str(), error = %err, "task failed");
        }
    }
    outcome
}

async fn cancelled<T>(handle: &TaskHandle) -> Result<T, TaskError> {
    handle.finish(&Err(TaskError::Cancelled)).await;
    tracing::info!(task_id = %handle.id(), kind = handle.kind().as_str(), "task cancelled");
    Err(TaskError::Cancelled)
}

/// Spawn [`run_simulated`] on the runtime.
pub fn spawn_simulated<T, F, Fut>(
    handle: TaskHandle,
    profile: TaskProfile,
    work: F,
) -> JoinHandle<Result<T, TaskError>>
where
    T: Send + 'static,
    F: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<T, TaskError>> + Send + 'static,
{
    tokio::spawn(async move { run_simulated(&handle, profile, work).await })
}
