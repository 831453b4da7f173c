use crate::error::ProviderError;
use futures_util::future::{self, Either};
use std::future::Future;

/// Races `op` against `deadline`. The deadline is any future that resolves
/// when time is up (a tokio sleep natively, a gloo timer in the browser).
pub async fn with_deadline<T, F, D>(op: F, deadline: D, label: &str) -> Result<T, ProviderError>
where
    F: Future<Output = Result<T, ProviderError>>,
    D: Future<Output = ()>,
{
    let op = std::pin::pin!(op);
    let deadline = std::pin::pin!(deadline);
    match future::select(op, deadline).await {
        Either::Left((result, _)) => result,
        Either::Right(((), _)) => {
            tracing::warn!(operation = label, "wallet request timed out");
            Err(ProviderError::ConnectionError(format!("{label} timed out")))
        }
    }
}
