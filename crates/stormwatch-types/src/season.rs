//! In-game seasons and the mapping from calendar month text.
//!
//! The host reports the current in-game date as a pretty-printed string
//! whose leading word is a month name. [`Season::from_month`] maps that
//! text to one of the four seasons by case-insensitive prefix matching,
//! so localized suffixes or abbreviations ("Sep", "September 3, year 2")
//! all resolve the same way. Anything unrecognized maps to
//! [`Season::Unknown`] -- the function is total and never fails.

use std::fmt;

use serde::{Deserialize, Serialize};

/// One of the four in-game seasons, or `Unknown` for unmapped input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Season {
    /// March through May.
    Spring,
    /// June through August.
    Summer,
    /// September through November.
    Autumn,
    /// December through February.
    Winter,
    /// Month text that did not match any known month prefix.
    Unknown,
}

/// Month-name prefixes and the season each one belongs to.
///
/// Three letters are enough to distinguish every English month name.
const MONTH_PREFIXES: [(&str, Season); 12] = [
    ("jan", Season::Winter),
    ("feb", Season::Winter),
    ("mar", Season::Spring),
    ("apr", Season::Spring),
    ("may", Season::Spring),
    ("jun", Season::Summer),
    ("jul", Season::Summer),
    ("aug", Season::Summer),
    ("sep", Season::Autumn),
    ("oct", Season::Autumn),
    ("nov", Season::Autumn),
    ("dec", Season::Winter),
];

impl Season {
    /// Map calendar month text to a season by prefix matching.
    ///
    /// The input is trimmed and lowercased before matching, so both
    /// `"September"` and `"sep 14, year 3"` resolve to
    /// [`Season::Autumn`]. Unmatched input yields [`Season::Unknown`].
    pub fn from_month(month: &str) -> Self {
        let normalized = month.trim().to_lowercase();
        for (prefix, season) in MONTH_PREFIXES {
            if normalized.starts_with(prefix) {
                return season;
            }
        }
        Self::Unknown
    }

    /// Lowercase wire name used in notification payloads.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Spring => "spring",
            Self::Summer => "summer",
            Self::Autumn => "autumn",
            Self::Winter => "winter",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Season {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_all_twelve_months() {
        let cases = [
            ("January", Season::Winter),
            ("February", Season::Winter),
            ("March", Season::Spring),
            ("April", Season::Spring),
            ("May", Season::Spring),
            ("June", Season::Summer),
            ("July", Season::Summer),
            ("August", Season::Summer),
            ("September", Season::Autumn),
            ("October", Season::Autumn),
            ("November", Season::Autumn),
            ("December", Season::Winter),
        ];
        for (month, expected) in cases {
            assert_eq!(Season::from_month(month), expected, "month: {month}");
        }
    }

    #[test]
    fn matches_prefixes_and_ignores_case() {
        assert_eq!(Season::from_month("sep"), Season::Autumn);
        assert_eq!(Season::from_month("  DECEMBER "), Season::Winter);
        assert_eq!(Season::from_month("jul 12, year 4"), Season::Summer);
    }

    #[test]
    fn unmapped_input_is_unknown() {
        assert_eq!(Season::from_month(""), Season::Unknown);
        assert_eq!(Season::from_month("Frostmoon"), Season::Unknown);
        assert_eq!(Season::from_month("13"), Season::Unknown);
    }

    #[test]
    fn serializes_lowercase() {
        let json = serde_json::to_string(&Season::Autumn).unwrap_or_default();
        assert_eq!(json, "\"autumn\"");
    }
}
