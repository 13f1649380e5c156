use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::classify::{Category, Priority};

pub const EXTINF_MARKER: &str = "#EXTINF:";
pub const DEFAULT_GROUP: &str = "Entertainment";

lazy_static! {
    static ref TVG_LOGO: Regex = Regex::new(r#"tvg-logo="([^"]+)""#).unwrap();
    static ref GROUP_TITLE: Regex = Regex::new(r#"(?i)group-title="([^"]+)""#).unwrap();
}

/// A classified channel as returned by `/api/channels`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub name: String,
    pub url: String,
    pub logo: String,
    pub group: String,
    pub category: Category,
    pub priority: Priority,
}

/// A playlist entry straight out of the parser, not yet classified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaylistEntry {
    pub name: String,
    pub url: String,
    pub logo: String,
    pub group: String,
}

// Metadata collected from the last `#EXTINF:` line, waiting for its URI line.
#[derive(Debug, Default)]
struct PendingEntry {
    name: String,
    logo: String,
    group: Option<String>,
}

impl PendingEntry {
    fn from_extinf(line: &str) -> Self {
        let logo = TVG_LOGO
            .captures(line)
            .map(|caps| caps[1].to_string())
            .unwrap_or_default();
        let group = GROUP_TITLE.captures(line).map(|caps| caps[1].to_string());
        // rsplit always yields at least one item
        let name = line.rsplit(',').next().unwrap_or(line).trim().to_string();

        Self { name, logo, group }
    }

    fn finish(self, url: &str) -> PlaylistEntry {
        PlaylistEntry {
            name: self.name,
            url: url.to_string(),
            logo: self.logo,
            group: self.group.unwrap_or_else(|| DEFAULT_GROUP.to_string()),
        }
    }
}

/// Parses extended M3U text (possibly several playlists concatenated) into entries.
///
/// Malformed lines never fail the parse: missing attributes fall back to defaults, and a
/// metadata line that is not followed by a URI before the next metadata line is dropped.
pub fn parse_m3u(content: &str) -> Vec<PlaylistEntry> {
    let mut entries = Vec::new();
    let mut pending = PendingEntry::default();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with(EXTINF_MARKER) {
            pending = PendingEntry::from_extinf(line);
        } else if !line.starts_with('#') {
            entries.push(std::mem::take(&mut pending).finish(line));
        }
    }

    entries
}
