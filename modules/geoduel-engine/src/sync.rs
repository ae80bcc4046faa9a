//! Best-effort remote score sync.

use std::sync::Arc;

use async_trait::async_trait;
use geoduel_common::ModeScores;
use score_sync_client::{ScoreSyncClient, SyncError};
use tokio::task::JoinHandle;

#[async_trait]
pub trait ScoreReporter: Send + Sync + 'static {
    /// Send the three mode high scores. Returns the endpoint's message.
    async fn report(&self, scores: ModeScores) -> Result<String, SyncError>;
}

#[async_trait]
impl ScoreReporter for ScoreSyncClient {
    async fn report(&self, scores: ModeScores) -> Result<String, SyncError> {
        self.save_scores(scores.population, scores.area, scores.gdp)
            .await
    }
}

/// Fire and forget. The handle resolves to the server message on success and
/// `None` on failure; failures are only logged, never retried.
pub fn report_in_background<R: ScoreReporter>(
    reporter: Arc<R>,
    scores: ModeScores,
) -> JoinHandle<Option<String>> {
    tokio::spawn(async move {
        match reporter.report(scores).await {
            Ok(message) => Some(message),
            Err(e) => {
                tracing::warn!(error = %e, "Score sync failed");
                None
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;

    #[derive(Default)]
    struct FakeReporter {
        fail: bool,
        seen: Mutex<Vec<ModeScores>>,
    }

    #[async_trait]
    impl ScoreReporter for FakeReporter {
        async fn report(&self, scores: ModeScores) -> Result<String, SyncError> {
            self.seen.lock().unwrap().push(scores);
            if self.fail {
                Err(SyncError::Network("connection refused".into()))
            } else {
                Ok("Scores saved".into())
            }
        }
    }

    #[tokio::test]
    async fn success_returns_message() {
        let reporter = Arc::new(FakeReporter::default());
        let scores = ModeScores { population: 4, area: 1, gdp: 0 };

        let message = report_in_background(Arc::clone(&reporter), scores).await.unwrap();
        assert_eq!(message.as_deref(), Some("Scores saved"));
        assert_eq!(*reporter.seen.lock().unwrap(), vec![scores]);
    }

    #[tokio::test]
    async fn failure_is_swallowed() {
        let reporter = Arc::new(FakeReporter {
            fail: true,
            ..FakeReporter::default()
        });
        let message = report_in_background(Arc::clone(&reporter), ModeScores::default())
            .await
            .unwrap();
        assert_eq!(message, None);
        assert_eq!(reporter.seen.lock().unwrap().len(), 1);
    }
}
