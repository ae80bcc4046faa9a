pub mod error;

pub use error::{Result, SyncError};

use std::time::Duration;

pub struct ScoreSyncClient {
    client: reqwest::Client,
    base_url: String,
}

impl ScoreSyncClient {
    pub fn new(base_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Endpoint for one save call. Scores travel in the path, body is empty.
    pub fn save_url(&self, population: u32, area: u32, gdp: u32) -> String {
        format!("{}/save_score/{population}/{area}/{gdp}", self.base_url)
    }

    /// Post the three per-mode high scores. Returns the server's message.
    pub async fn save_scores(&self, population: u32, area: u32, gdp: u32) -> Result<String> {
        let url = self.save_url(population, area, gdp);
        let resp = self.client.post(&url).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            return Err(SyncError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let message = resp.text().await?;
        tracing::info!(population, area, gdp, "Scores saved");
        Ok(message)
    }
}
