use axum::http::header;
use tracing::debug;
use url::Url;

use crate::config::ProxyConfig;
use crate::error::FetchError;
use crate::metrics;

pub const MANIFEST_CONTENT_TYPE: &str = "application/vnd.apple.mpegurl";
pub const NO_CACHE: &str = "no-cache, no-store, must-revalidate";
const NESTED_MANIFEST_MARKER: &str = ".m3u8";

/// `scheme://host[:port]` of the target.
pub fn origin(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Origin plus the directory part of the path, always ending in `/`.
pub fn base_url(url: &Url) -> String {
    let path = url.path();
    let dir = match path.rfind('/') {
        Some(idx) => &path[..=idx],
        None => "/",
    };
    format!("{}{}", origin(url), dir)
}

/// Rewrites the URI lines of a manifest fetched from `target`.
///
/// Tags and blank lines are kept as they are. Relative references are resolved against the
/// target's directory; references to nested `.m3u8` playlists are pointed back at
/// `proxy_path` so the player fetches them through this service too. Everything else (media
/// segments, keys) is left absolute and unproxied.
pub fn rewrite_manifest(text: &str, target: &Url, proxy_path: &str) -> String {
    let base = base_url(target);

    text.split('\n')
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                return line.to_string();
            }

            let absolute = if trimmed.starts_with("http") {
                trimmed.to_string()
            } else {
                format!("{base}{trimmed}")
            };

            if absolute.contains(NESTED_MANIFEST_MARKER) {
                format!("{}?url={}", proxy_path, urlencoding::encode(&absolute))
            } else {
                absolute
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[derive(Clone)]
pub struct ManifestProxy {
    client: reqwest::Client,
    config: ProxyConfig,
}

impl ManifestProxy {
    pub fn new(config: ProxyConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder().timeout(config.timeout()).build()?;
        Ok(Self { client, config })
    }

    async fn fetch(&self, target: &Url) -> Result<String, reqwest::Error> {
        self.client
            .get(target.clone())
            .header(header::USER_AGENT, self.config.user_agent.as_str())
            .header(header::REFERER, origin(target))
            .send()
            .await?
            .error_for_status()?
            .text()
            .await
    }

    /// Fetches `target` and returns the rewritten manifest text.
    pub async fn fetch_rewritten(&self, target: &str) -> Result<String, FetchError> {
        let url = Url::parse(target).map_err(|source| FetchError::InvalidUrl {
            url: target.to_string(),
            source,
        })?;

        let result = self.fetch(&url).await;
        metrics::record_fetch("manifest", result.is_ok());
        let text = result.map_err(|e| FetchError::from_reqwest(target, e))?;

        debug!("Rewriting {} bytes of manifest from {}", text.len(), target);
        Ok(rewrite_manifest(&text, &url, &self.config.path))
    }
}
