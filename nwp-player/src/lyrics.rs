//! Lyric synchronizer
//!
//! **Responsibilities:**
//! - Parse `[mm:ss.xx]text` time-tagged lyric text (primary, translated and
//!   romanized channels) into a time-ascending lyric table
//! - Map a playback position to the active line with a position-aware
//!   binary search that reuses the previous answer when still valid

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::OnceLock;

/// One synchronized lyric line
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LyricLine {
    /// Start time of the line in seconds
    pub time_seconds: f64,
    /// Primary (original language) text
    pub text: String,
    /// Translation sharing the same time tag
    #[serde(default)]
    pub translated: Option<String>,
    /// Romanization sharing the same time tag
    #[serde(default)]
    pub romanized: Option<String>,
}

/// Raw lyric text as delivered by the resolver
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LyricText {
    pub primary: String,
    pub translated: Option<String>,
    pub romanized: Option<String>,
}

impl LyricText {
    /// Parse all channels into a lyric table
    pub fn parse(&self) -> Vec<LyricLine> {
        parse_lyrics(
            &self.primary,
            self.translated.as_deref(),
            self.romanized.as_deref(),
        )
    }
}

// Only the first tag of a line is read; the remainder is the text.
fn time_tag_regex() -> Option<&'static Regex> {
    static REGEX: OnceLock<Option<Regex>> = OnceLock::new();
    REGEX
        .get_or_init(|| Regex::new(r"\[(\d{2}):(\d{2})\.(\d{2,3})\](.*)").ok())
        .as_ref()
}

/// Parse one channel into time (ms) → text, later duplicates winning
fn parse_channel(raw: &str) -> BTreeMap<u64, String> {
    let mut lines = BTreeMap::new();
    let Some(regex) = time_tag_regex() else {
        return lines;
    };

    for line in raw.lines() {
        let Some(caps) = regex.captures(line) else {
            continue;
        };
        let minutes: u64 = caps[1].parse().unwrap_or(0);
        let seconds: u64 = caps[2].parse().unwrap_or(0);
        // Centiseconds are right-padded: "12" means 120 ms
        let fraction = format!("{:0<3}", &caps[3]);
        let millis: u64 = fraction.parse().unwrap_or(0);

        let text = caps[4].trim();
        if text.is_empty() {
            continue;
        }

        let key = minutes * 60_000 + seconds * 1_000 + millis;
        lines.insert(key, text.to_string());
    }

    lines
}

/// Parse time-tagged lyric channels into a time-ascending table
///
/// Only time keys present in the primary channel produce rows; the other
/// channels are attached by exact time match. Empty or unparsable input
/// yields an empty table.
pub fn parse_lyrics(
    primary: &str,
    translated: Option<&str>,
    romanized: Option<&str>,
) -> Vec<LyricLine> {
    let primary = parse_channel(primary);
    if primary.is_empty() {
        return Vec::new();
    }

    let mut translated = translated.map(parse_channel).unwrap_or_default();
    let mut romanized = romanized.map(parse_channel).unwrap_or_default();

    primary
        .into_iter()
        .map(|(millis, text)| LyricLine {
            time_seconds: millis as f64 / 1000.0,
            text,
            translated: translated.remove(&millis),
            romanized: romanized.remove(&millis),
        })
        .collect()
}

/// Index of the line active at `position_seconds`
///
/// Returns `None` for an empty table, a non-finite position or a position
/// before the first line, and the last index once the position passes every
/// line. When `previous` is still the active line it is returned without
/// searching; otherwise the search is limited to the lines after it (forward)
/// or before it (backward).
pub fn current_line(
    table: &[LyricLine],
    position_seconds: f64,
    previous: Option<usize>,
) -> Option<usize> {
    let first = table.first()?;
    if !position_seconds.is_finite() || position_seconds < first.time_seconds {
        return None;
    }

    let Some(prev) = previous.filter(|&p| p < table.len()) else {
        return Some(table.partition_point(|l| l.time_seconds <= position_seconds) - 1);
    };

    if table[prev].time_seconds <= position_seconds {
        let tail = &table[prev + 1..];
        if tail.first().map_or(true, |next| position_seconds < next.time_seconds) {
            return Some(prev);
        }
        // Forward: the answer lies after prev
        Some(prev + tail.partition_point(|l| l.time_seconds <= position_seconds))
    } else {
        // Backward seek: the answer lies before prev
        let head = &table[..prev];
        Some(head.partition_point(|l| l.time_seconds <= position_seconds) - 1)
    }
}
