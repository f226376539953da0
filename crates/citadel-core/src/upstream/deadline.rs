use std::{future::Future, time::Duration};

use crate::upstream::UpstreamError;

/// Runs `operation` with a hard deadline.
///
/// On expiry the operation future is dropped, which aborts any in-flight I/O it owns and
/// releases its resources, and the call resolves to [`UpstreamError::Timeout`]. The timer itself
/// is dropped on every exit path.
///
/// # Errors
///
/// Returns [`UpstreamError::Timeout`] when the deadline elapses, otherwise whatever error the
/// operation produced.
pub async fn with_deadline<F, T>(deadline: Duration, operation: F) -> Result<T, UpstreamError>
where
    F: Future<Output = Result<T, UpstreamError>>,
{
    match tokio::time::timeout(deadline, operation).await {
        Ok(outcome) => outcome,
        Err(_elapsed) => Err(UpstreamError::Timeout),
    }
}
