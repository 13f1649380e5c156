use std::path::PathBuf;
use std::time::Duration;

use config::{Config, Environment, File};
use serde::de::Deserializer;
use serde::Deserialize;

pub const ENV_PREFIX: &str = "M3U_RELAY";
pub const DEFAULT_SOURCE: &str = "https://iptv-org.github.io/iptv/languages/hin.m3u";
pub const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64)";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub sources: SourcesConfig,
    #[serde(default)]
    pub proxy: ProxyConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Directory holding the pre-built front-end.
    #[serde(default = "default_public_dir")]
    pub public_dir: PathBuf,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    3050
}

fn default_public_dir() -> PathBuf {
    PathBuf::from("public")
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            public_dir: default_public_dir(),
        }
    }
}

/// Playlists merged into `/api/channels`.
#[derive(Debug, Clone, Deserialize)]
pub struct SourcesConfig {
    #[serde(
        alias = "url",
        default = "default_source_urls",
        deserialize_with = "deserialize_one_or_many"
    )]
    pub urls: Vec<String>,
    #[serde(default = "default_source_timeout")]
    pub timeout_secs: u64,
}

fn default_source_urls() -> Vec<String> {
    vec![DEFAULT_SOURCE.to_string()]
}

fn default_source_timeout() -> u64 {
    5
}

impl SourcesConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for SourcesConfig {
    fn default() -> Self {
        Self {
            urls: default_source_urls(),
            timeout_secs: default_source_timeout(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProxyConfig {
    #[serde(default = "default_proxy_timeout")]
    pub timeout_secs: u64,
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
    /// Route that rewritten nested manifests point back to.
    #[serde(default = "default_proxy_path")]
    pub path: String,
}

fn default_proxy_timeout() -> u64 {
    8
}

fn default_user_agent() -> String {
    BROWSER_USER_AGENT.to_string()
}

fn default_proxy_path() -> String {
    "/proxy".to_string()
}

impl ProxyConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_proxy_timeout(),
            user_agent: default_user_agent(),
            path: default_proxy_path(),
        }
    }
}

fn deserialize_one_or_many<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum OneOrMany {
        One(String),
        Many(Vec<String>),
    }

    match OneOrMany::deserialize(deserializer)? {
        OneOrMany::One(s) => Ok(vec![s]),
        OneOrMany::Many(v) => Ok(v),
    }
}

impl Settings {
    /// Loads settings from an optional TOML file, then `M3U_RELAY__*` environment variables.
    pub fn load(path: &str) -> anyhow::Result<Self> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    pub fn load_with_prefix(path: &str, env_prefix: &str) -> anyhow::Result<Self> {
        let settings = Config::builder()
            .add_source(File::with_name(path).required(false))
            .add_source(
                Environment::with_prefix(env_prefix)
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("sources.urls")
                    .try_parsing(true),
            )
            .build()?;
        let settings: Settings = settings.try_deserialize()?;

        if settings.sources.urls.is_empty() {
            anyhow::bail!("no playlist sources configured");
        }
        Ok(settings)
    }
}
