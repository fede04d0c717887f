//! Caller-supplied deadlines for store operations
//!
//! Store adapters have no built-in timeout. Callers that need one wrap the
//! call (or the whole store, see `infrastructure::storage::DeadlineStore`)
//! with [`with_deadline`]; an elapsed deadline surfaces as a transient
//! store error so the caller can decide whether to retry.

use std::future::Future;
use std::time::Duration;

use tracing::warn;

use super::errors::{DomainError, DomainResult};

/// Run `operation`, failing with `TransientStore` if it does not finish
/// within `deadline`.
///
/// A zero deadline means "no deadline".
pub async fn with_deadline<T, Fut>(
    deadline: Duration,
    operation_name: &str,
    operation: Fut,
) -> DomainResult<T>
where
    Fut: Future<Output = DomainResult<T>>,
{
    if deadline.is_zero() {
        return operation.await;
    }

    match tokio::time::timeout(deadline, operation).await {
        Ok(result) => result,
        Err(_) => {
            warn!(
                operation = operation_name,
                timeout_ms = deadline.as_millis() as u64,
                "Store operation timed out"
            );
            Err(DomainError::TransientStore(format!(
                "{} timed out after {}ms",
                operation_name,
                deadline.as_millis()
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fast_operation_passes_through() {
        let result = with_deadline(Duration::from_millis(100), "get", async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_slow_operation_is_transient_error() {
        let result: DomainResult<()> = with_deadline(Duration::from_millis(10), "query", async {
            tokio::time::sleep(Duration::from_millis(200)).await;
            Ok(())
        })
        .await;

        let err = result.unwrap_err();
        assert!(err.is_transient());
        assert!(err.to_string().contains("query timed out"));
    }

    #[tokio::test]
    async fn test_zero_deadline_disables_timeout() {
        let result = with_deadline(Duration::ZERO, "put", async {
            tokio::time::sleep(Duration::from_millis(20)).await;
            Ok("done")
        })
        .await;
        assert_eq!(result.unwrap(), "done");
    }

    #[tokio::test]
    async fn test_inner_error_is_preserved() {
        let result: DomainResult<()> = with_deadline(Duration::from_millis(50), "delete", async {
            Err(DomainError::Conflict("busy".into()))
        })
        .await;
        assert!(matches!(result, Err(DomainError::Conflict(_))));
    }
}
