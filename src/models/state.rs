//! Match state vocabulary.

use serde::{Deserialize, Serialize};

/// Lifecycle state of a match. Upstream pages use a wider vocabulary which is
/// folded onto these four values by [`MatchState::normalize`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchState {
    Live,
    #[serde(rename = "Innings Break")]
    InningsBreak,
    Complete,
    #[default]
    Upcoming,
}

impl MatchState {
    pub const ALL: [MatchState; 4] = [
        MatchState::Live,
        MatchState::InningsBreak,
        MatchState::Complete,
        MatchState::Upcoming,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Live => "Live",
            Self::InningsBreak => "Innings Break",
            Self::Complete => "Complete",
            Self::Upcoming => "Upcoming",
        }
    }

    /// Parse a stored (canonical) state string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "Live" => Some(Self::Live),
            "Innings Break" => Some(Self::InningsBreak),
            "Complete" => Some(Self::Complete),
            "Upcoming" => Some(Self::Upcoming),
            _ => None,
        }
    }

    /// Map any upstream state string onto the closed set.
    ///
    /// Unknown values fall back to `Upcoming`, which never carries scores.
    pub fn normalize(raw: &str) -> Self {
        let s = raw.trim().to_ascii_lowercase();
        match s.as_str() {
            "live" | "in progress" | "inprogress" => Self::Live,
            "innings break" | "stumps" | "lunch" | "tea" | "drinks" => Self::InningsBreak,
            "complete" | "completed" | "abandon" | "abandoned" | "no result" => Self::Complete,
            "preview" | "scheduled" | "upcoming" | "" => Self::Upcoming,
            _ => Self::Upcoming,
        }
    }

    /// Whether score values read for a match in this state are trustworthy.
    pub fn has_scores(&self) -> bool {
        !matches!(self, Self::Upcoming)
    }
}

impl std::fmt::Display for MatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const UPSTREAM: &[&str] = &[
        "Live",
        "In Progress",
        "Innings Break",
        "Stumps",
        "Lunch",
        "Tea",
        "Drinks",
        "Complete",
        "Preview",
        "Scheduled",
        "Upcoming",
        "",
        "Abandon",
        "something new",
        "  LIVE ",
    ];

    #[test]
    fn test_normalize_synonyms() {
        assert_eq!(MatchState::normalize("Preview"), MatchState::Upcoming);
        assert_eq!(MatchState::normalize("Stumps"), MatchState::InningsBreak);
        assert_eq!(MatchState::normalize("Drinks"), MatchState::InningsBreak);
        assert_eq!(MatchState::normalize("In Progress"), MatchState::Live);
        assert_eq!(MatchState::normalize("complete"), MatchState::Complete);
        assert_eq!(MatchState::normalize(""), MatchState::Upcoming);
    }

    #[test]
    fn test_normalize_idempotent() {
        for raw in UPSTREAM {
            let once = MatchState::normalize(raw);
            let twice = MatchState::normalize(once.as_str());
            assert_eq!(once, twice, "not idempotent for {:?}", raw);
        }
    }

    #[test]
    fn test_canonical_roundtrip() {
        for state in MatchState::ALL {
            assert_eq!(MatchState::from_str(state.as_str()), Some(state));
        }
        assert_eq!(MatchState::from_str("Preview"), None);
    }

    #[test]
    fn test_has_scores() {
        assert!(MatchState::Live.has_scores());
        assert!(MatchState::InningsBreak.has_scores());
        assert!(MatchState::Complete.has_scores());
        assert!(!MatchState::Upcoming.has_scores());
    }
}
