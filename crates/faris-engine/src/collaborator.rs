//! Timed calls into blocking collaborators

use std::time::Duration;
use tokio::time::timeout;

/// Run a blocking store call on the blocking pool under `limit`
///
/// Every failure mode is flattened into a message; callers record it as a
/// degradation. A timed-out call keeps running on its thread and its result
/// is discarded.
pub(crate) async fn blocking_call<T, F>(limit: Duration, call: F) -> Result<T, String>
where
    T: Send + 'static,
    F: FnOnce() -> Result<T, String> + Send + 'static,
{
    let task = tokio::task::spawn_blocking(call);
    match timeout(limit, task).await {
        Ok(Ok(result)) => result,
        Ok(Err(e)) => Err(format!("task join error: {}", e)),
        Err(_) => Err(format!("timed out after {:?}", limit)),
    }
}
