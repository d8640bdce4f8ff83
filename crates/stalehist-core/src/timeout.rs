// SPDX-FileCopyrightText: 2026 stalehist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Upper bound for blocking collaborator calls.

use std::future::Future;
use std::time::Duration;

use crate::error::StalehistError;

/// Awaits `fut`, failing with [`StalehistError::Timeout`] once `duration` elapses.
pub async fn bounded<T, F>(duration: Duration, fut: F) -> Result<T, StalehistError>
where
    F: Future<Output = Result<T, StalehistError>>,
{
    match tokio::time::timeout(duration, fut).await {
        Ok(result) => result,
        Err(_) => Err(StalehistError::Timeout { duration }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn passes_through_results_within_the_bound() {
        let ok = bounded(Duration::from_secs(1), async { Ok::<_, StalehistError>(5) }).await;
        assert_eq!(ok.unwrap(), 5);

        let err = bounded(Duration::from_secs(1), async {
            Err::<(), _>(StalehistError::Internal("nope".into()))
        })
        .await;
        assert!(matches!(err, Err(StalehistError::Internal(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn expires_slow_futures() {
        let result = bounded(Duration::from_secs(5), async {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok::<_, StalehistError>(())
        })
        .await;
        assert!(matches!(
            result,
            Err(StalehistError::Timeout { duration }) if duration == Duration::from_secs(5)
        ));
    }
}
