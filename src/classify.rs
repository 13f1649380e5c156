use std::cmp::Ordering;
use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::channels::{Channel, PlaylistEntry};

/// Names of regional broadcasters that mark a channel as preferred-language.
pub const PREFERRED_KEYWORDS: [&str; 6] = ["zee", "sony", "star", "colors", "abp", "aaj tak"];
pub const PREFERRED_LANGUAGE: &str = "hindi";

fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    News,
    Movies,
    Music,
    Sports,
    Entertainment,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::News,
        Category::Movies,
        Category::Music,
        Category::Sports,
        Category::Entertainment,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Category::News => "News",
            Category::Movies => "Movies",
            Category::Music => "Music",
            Category::Sports => "Sports",
            Category::Entertainment => "Entertainment",
        }
    }

    /// First match wins. Sports matching is a plain substring test, so "ten" catches
    /// "Ten Sports" as well as "Often Funny".
    pub fn classify(name: &str, group: &str) -> Self {
        let name = name.to_lowercase();
        let group = group.to_lowercase();

        if name.contains("news") || group.contains("news") {
            Category::News
        } else if contains_any(&name, &["movie", "cinema", "action"]) {
            Category::Movies
        } else if contains_any(&name, &["music", "hits"]) {
            Category::Music
        } else if contains_any(&name, &["sport", "ten", "six"]) {
            Category::Sports
        } else {
            Category::Entertainment
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Ord for Category {
    fn cmp(&self, other: &Self) -> Ordering {
        self.as_str().cmp(other.as_str())
    }
}

impl PartialOrd for Category {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Serialized as the bare integer (1 or 2).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum Priority {
    Preferred = 1,
    Other = 2,
}

impl Priority {
    pub fn classify(name: &str, group: &str) -> Self {
        let name = name.to_lowercase();
        let group = group.to_lowercase();

        if name.contains(PREFERRED_LANGUAGE)
            || group.contains(PREFERRED_LANGUAGE)
            || contains_any(&name, &PREFERRED_KEYWORDS)
        {
            Priority::Preferred
        } else {
            Priority::Other
        }
    }
}

impl From<Priority> for u8 {
    fn from(priority: Priority) -> Self {
        priority as u8
    }
}

impl TryFrom<u8> for Priority {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Priority::Preferred),
            2 => Ok(Priority::Other),
            other => Err(format!("invalid priority {other}, expected 1 or 2")),
        }
    }
}

pub fn classify_entry(entry: PlaylistEntry) -> Channel {
    let category = Category::classify(&entry.name, &entry.group);
    let priority = Priority::classify(&entry.name, &entry.group);
    Channel {
        name: entry.name,
        url: entry.url,
        logo: entry.logo,
        group: entry.group,
        category,
        priority,
    }
}

/// Ordering used for the channel list: priority, then category name, then channel name.
/// Names compare by code point.
pub fn compare_channels(a: &Channel, b: &Channel) -> Ordering {
    a.priority
        .cmp(&b.priority)
        .then_with(|| a.category.cmp(&b.category))
        .then_with(|| a.name.cmp(&b.name))
}

/// Drops duplicate stream URLs. A repeated URL keeps the position where it was first seen
/// but takes the values of its last occurrence.
pub fn dedup_by_url(channels: Vec<Channel>) -> Vec<Channel> {
    let mut by_url: IndexMap<String, Channel> = IndexMap::with_capacity(channels.len());
    for channel in channels {
        by_url.insert(channel.url.clone(), channel);
    }
    by_url.into_values().collect()
}

/// Classifies, sorts and deduplicates parsed entries into the final channel list.
pub fn build_channel_list(entries: Vec<PlaylistEntry>) -> Vec<Channel> {
    let mut channels: Vec<Channel> = entries.into_iter().map(classify_entry).collect();
    channels.sort_by(compare_channels);
    dedup_by_url(channels)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn entry(name: &str, group: &str, url: &str) -> PlaylistEntry {
        PlaylistEntry {
            name: name.to_string(),
            url: url.to_string(),
            logo: String::new(),
            group: group.to_string(),
        }
    }

    #[test]
    fn test_category_rules() {
        assert_eq!(Category::classify("ABC News", "General"), Category::News);
        assert_eq!(Category::classify("Anything", "NEWS"), Category::News);
        assert_eq!(Category::classify("Star Gold Movies", "General"), Category::Movies);
        assert_eq!(Category::classify("PVR Cinema", "General"), Category::Movies);
        assert_eq!(Category::classify("Action Max", "General"), Category::Movies);
        assert_eq!(Category::classify("9XM Music", "General"), Category::Music);
        assert_eq!(Category::classify("Zing Hits", "General"), Category::Music);
        assert_eq!(Category::classify("DD Sports", "General"), Category::Sports);
        assert_eq!(Category::classify("Sony Six", "General"), Category::Sports);
        assert_eq!(Category::classify("Colors", "General"), Category::Entertainment);
    }

    #[test]
    fn test_category_first_match_wins() {
        // news beats movies
        assert_eq!(Category::classify("Movie News", "General"), Category::News);
        // movies beats sports
        assert_eq!(Category::classify("Action Sports", "General"), Category::Movies);
        // group only counts for news
        assert_eq!(Category::classify("Channel", "Movies"), Category::Entertainment);
    }

    #[test]
    fn test_sports_match_is_loose() {
        assert_eq!(Category::classify("Often Funny", "Comedy"), Category::Sports);
    }

    #[test]
    fn test_priority() {
        assert_eq!(Priority::classify("Star Gold Movies", "Movies"), Priority::Preferred);
        assert_eq!(Priority::classify("Aaj Tak", "News"), Priority::Preferred);
        assert_eq!(Priority::classify("DD National", "Hindi"), Priority::Preferred);
        assert_eq!(Priority::classify("Hindi Khabar", "General"), Priority::Preferred);
        assert_eq!(Priority::classify("BBC World", "News"), Priority::Other);
    }

    #[test]
    fn test_classify_example() {
        let channel = classify_entry(entry("Star Gold Movies", "Entertainment", "http://x/1"));
        assert_eq!(channel.category, Category::Movies);
        assert_eq!(channel.priority, Priority::Preferred);
    }

    #[test]
    fn test_priority_serializes_as_integer() {
        let channel = classify_entry(entry("ABC News", "News", "http://x/abc.m3u8"));
        let json = serde_json::to_value(&channel).unwrap();
        assert_eq!(json["priority"], 2);
        assert_eq!(json["category"], "News");

        let back: Channel = serde_json::from_value(json).unwrap();
        assert_eq!(back, channel);
        assert!(serde_json::from_str::<Priority>("3").is_err());
    }

    #[test]
    fn test_sort_order() {
        let list = build_channel_list(vec![
            entry("BBC World News", "News", "http://x/1"),
            entry("Zee News", "News", "http://x/2"),
            entry("Sony Max", "General", "http://x/3"),
            entry("Abp Ananda", "General", "http://x/4"),
            entry("Colors Cineplex Movies", "General", "http://x/5"),
        ]);
        let names: Vec<&str> = list.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "Abp Ananda",
                "Sony Max",
                "Colors Cineplex Movies",
                "Zee News",
                "BBC World News"
            ]
        );
    }

    #[test]
    fn test_dedup_keeps_first_position_last_value() {
        let list = build_channel_list(vec![
            entry("Zee TV", "General", "http://x/same"),
            entry("Alpha", "General", "http://x/other"),
            entry("Zee TV HD", "General", "http://x/same"),
        ]);
        // sorted: Zee TV, Zee TV HD, Alpha
        assert_eq!(list.len(), 2);
        assert_eq!(list[0].url, "http://x/same");
        assert_eq!(list[0].name, "Zee TV HD");
        assert_eq!(list[1].name, "Alpha");
    }

    #[test]
    fn test_output_invariants() {
        let names = [
            "Aaj Tak", "Sony Ten 1", "MTV Hits", "Zee Cinema", "Random", "NDTV India", "Star Sports",
        ];
        // the same playlist fetched twice
        let entries: Vec<PlaylistEntry> = names
            .iter()
            .chain(names.iter())
            .enumerate()
            .map(|(i, n)| entry(n, "Hindi", &format!("http://x/{}", i % names.len())))
            .collect();

        let list = build_channel_list(entries);

        let urls: HashSet<&str> = list.iter().map(|c| c.url.as_str()).collect();
        assert_eq!(urls.len(), list.len());
        for channel in &list {
            assert!(Category::ALL.contains(&channel.category));
            assert!(matches!(u8::from(channel.priority), 1 | 2));
        }
        for pair in list.windows(2) {
            assert_ne!(compare_channels(&pair[0], &pair[1]), Ordering::Greater);
        }
    }
}
