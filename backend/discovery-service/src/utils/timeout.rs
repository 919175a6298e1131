use std::future::Future;
use std::time::Duration;
use tokio::time::timeout;

use crate::error::{AppError, Result};

/// Run a catalog call under a deadline, mapping expiry to `AppError::Timeout`.
pub async fn run_with_timeout<F, T>(limit: Duration, future: F) -> Result<T>
where
    F: Future<Output = Result<T>>,
{
    match timeout(limit, future).await {
        Ok(res) => res,
        Err(_) => Err(AppError::Timeout(limit)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_run_with_timeout_passes_result_through() {
        let res = run_with_timeout(Duration::from_secs(1), async { Ok(42) }).await;
        assert_eq!(res.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_run_with_timeout_passes_error_through() {
        let res: Result<()> = run_with_timeout(Duration::from_secs(1), async {
            Err(AppError::DataSource("down".to_string()))
        })
        .await;
        assert!(matches!(res, Err(AppError::DataSource(_))));
    }

    #[tokio::test]
    async fn test_run_with_timeout_elapsed() {
        let res = run_with_timeout(Duration::from_millis(10), async {
            tokio::time::sleep(Duration::from_secs(1)).await;
            Ok(1)
        })
        .await;
        assert!(matches!(res, Err(AppError::Timeout(_))));
    }
}
