use futures::future::try_join_all;
use tracing::{debug, info};

use crate::channels::{parse_m3u, Channel};
use crate::classify::build_channel_list;
use crate::config::SourcesConfig;
use crate::error::FetchError;
use crate::metrics;

/// Fetches every configured playlist and turns them into one classified channel list.
#[derive(Clone)]
pub struct Aggregator {
    client: reqwest::Client,
    config: SourcesConfig,
}

impl Aggregator {
    pub fn new(config: SourcesConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { client, config })
    }

    pub fn sources(&self) -> &[String] {
        &self.config.urls
    }

    async fn fetch_source(&self, url: &str) -> Result<String, FetchError> {
        let result = async {
            let resp = self.client.get(url).send().await?.error_for_status()?;
            resp.text().await
        }
        .await
        .map_err(|e| FetchError::from_reqwest(url, e));

        metrics::record_fetch("source", result.is_ok());
        result
    }

    /// Downloads all sources concurrently and concatenates them in configured order.
    /// The first failure aborts the whole fetch.
    pub async fn fetch_combined(&self) -> Result<String, FetchError> {
        let bodies = try_join_all(self.config.urls.iter().map(|url| self.fetch_source(url))).await?;

        let mut combined = String::with_capacity(bodies.iter().map(|b| b.len() + 1).sum());
        for (url, body) in self.config.urls.iter().zip(&bodies) {
            debug!("Fetched {} bytes from {}", body.len(), url);
            combined.push_str(body);
            combined.push('\n');
        }
        Ok(combined)
    }

    pub async fn load_channels(&self) -> Result<Vec<Channel>, FetchError> {
        let combined = self.fetch_combined().await?;
        let entries = parse_m3u(&combined);
        let parsed = entries.len();
        let channels = build_channel_list(entries);
        info!(
            "Aggregated {} channels ({} parsed) from {} sources",
            channels.len(),
            parsed,
            self.config.urls.len()
        );
        Ok(channels)
    }
}
