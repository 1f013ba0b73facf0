use serde::{Deserialize, Serialize};

/// Number of leading characters of a description treated as the title area.
/// Job boards put the posting title at the top of the description text.
pub const TITLE_AREA_CHARS: usize = 200;

/// How a lowercased pattern is located inside lowercased text.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchMode {
    /// Plain substring containment. "cad" matches inside "decade".
    #[default]
    Substring,
    /// The match must not be flanked by alphanumeric characters.
    WordBoundary,
}

impl MatchMode {
    pub fn contains(self, text: &str, pattern: &str) -> bool {
        match self {
            MatchMode::Substring => text.contains(pattern),
            MatchMode::WordBoundary => text.match_indices(pattern).any(|(start, found)| {
                let before = text[..start].chars().next_back();
                let after = text[start + found.len()..].chars().next();
                !before.is_some_and(char::is_alphanumeric)
                    && !after.is_some_and(char::is_alphanumeric)
            }),
        }
    }

    /// Return the first pattern (in list order) found in `text`.
    pub fn find<'p>(self, text: &str, patterns: &'p [String]) -> Option<&'p str> {
        patterns
            .iter()
            .map(String::as_str)
            .find(|pattern| self.contains(text, pattern))
    }

    pub fn any(self, text: &str, patterns: &[String]) -> bool {
        self.find(text, patterns).is_some()
    }
}

/// Leading slice of `text` covering at most [`TITLE_AREA_CHARS`] characters.
pub fn title_area(text: &str) -> &str {
    match text.char_indices().nth(TITLE_AREA_CHARS) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// Lowercase every pattern in place.
///
/// Surrounding whitespace is kept: `" cto"` is a deliberate way to match a
/// word start in substring mode without hitting "semiconductor".
pub(crate) fn normalize_patterns(patterns: &mut [String]) {
    for pattern in patterns.iter_mut() {
        *pattern = pattern.to_lowercase();
    }
}
