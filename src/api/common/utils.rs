use std::future::Future;
use std::time::Duration;

use crate::errors::AppError;

/// Bounds a storage call by the per-request timeout.
pub async fn with_timeout<T, F>(duration: Duration, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, AppError>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(elapsed) => {
            tracing::error!("Storage call timed out after {:?}", duration);
            Err(AppError::Timeout(elapsed))
        }
    }
}
