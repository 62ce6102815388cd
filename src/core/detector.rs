//! Emoji detection and removal
//!
//! Classification is per code point against a fixed table of Unicode
//! ranges. Multi-code-point clusters (ZWJ sequences, skin-tone modifiers,
//! flag pairs) are intentionally not assembled: each qualifying code point
//! is reported and removed on its own, so modifier code points outside the
//! table survive removal.

use std::collections::HashSet;

/// A closed interval `[low, high]` of Unicode code points classified as
/// emoji.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodepointRange {
    low: u32,
    high: u32,
}

impl CodepointRange {
    const fn new(low: u32, high: u32) -> Self {
        Self { low, high }
    }

    fn contains(self, c: char) -> bool {
        let cp = c as u32;
        self.low <= cp && cp <= self.high
    }
}

/// Default range table. Ranges are disjoint; order does not affect the
/// outcome.
const EMOJI_RANGES: &[CodepointRange] = &[
    CodepointRange::new(0x1F300, 0x1F5FF), // miscellaneous symbols and pictographs
    CodepointRange::new(0x1F600, 0x1F64F), // emoticons
    CodepointRange::new(0x1F680, 0x1F6FF), // transport and map symbols
    CodepointRange::new(0x1F1E0, 0x1F1FF), // regional indicator symbols
    CodepointRange::new(0x2600, 0x26FF),   // miscellaneous symbols
    CodepointRange::new(0x2700, 0x27BF),   // dingbats
    CodepointRange::new(0x1F900, 0x1F9FF), // supplemental symbols and pictographs
    CodepointRange::new(0x1F018, 0x1F0FF), // playing cards, domino tiles
    CodepointRange::new(0x1FA70, 0x1FA73), // symbols and pictographs extended-A
    CodepointRange::new(0x1FA78, 0x1FA7A),
    CodepointRange::new(0x1FA80, 0x1FA82),
    CodepointRange::new(0x1FA90, 0x1FA95),
];

/// Finds and removes emoji code points in text.
///
/// Each detector owns its range table and allow set, so detectors with
/// different allow lists can coexist without shared state. Both tables are
/// fixed at construction.
#[derive(Debug, Clone)]
pub struct EmojiDetector {
    ranges: Vec<CodepointRange>,
    allowed: HashSet<String>,
}

impl EmojiDetector {
    /// Create a detector covering the default emoji ranges.
    pub fn new() -> Self {
        Self {
            ranges: EMOJI_RANGES.to_vec(),
            allowed: HashSet::new(),
        }
    }

    /// Create a detector that additionally preserves the given emoji
    /// graphemes, even though they fall inside an emoji range.
    pub fn with_allowed<I, S>(allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            allowed: allowed.into_iter().map(Into::into).collect(),
            ..Self::new()
        }
    }

    fn in_ranges(&self, c: char) -> bool {
        self.ranges.iter().any(|r| r.contains(c))
    }

    fn is_allowed(&self, c: char) -> bool {
        if self.allowed.is_empty() {
            return false;
        }
        let mut buf = [0u8; 4];
        self.allowed.contains(&*c.encode_utf8(&mut buf))
    }

    /// Whether a code point qualifies for removal: inside an emoji range
    /// and not exempted by the allow list.
    fn qualifies(&self, c: char) -> bool {
        self.in_ranges(c) && !self.is_allowed(c)
    }

    /// Return the distinct qualifying emojis in `text`, in order of first
    /// appearance. Total over all input; an empty result means none found.
    pub fn find_emojis(&self, text: &str) -> Vec<String> {
        let mut found = Vec::new();
        let mut seen = HashSet::new();

        for c in text.chars() {
            if self.qualifies(c) && seen.insert(c) {
                found.push(c.to_string());
            }
        }

        found
    }

    /// Return `text` with every qualifying emoji code point deleted.
    ///
    /// All other code points, allowed emojis included, are preserved in
    /// order with no replacement character. Idempotent: removal never
    /// introduces new qualifying code points.
    pub fn remove_emojis(&self, text: &str) -> String {
        text.chars().filter(|&c| !self.qualifies(c)).collect()
    }
}

impl Default for EmojiDetector {
    fn default() -> Self {
        Self::new()
    }
}
