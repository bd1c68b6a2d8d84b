//! Coalition name → group category.
//!
//! The directory reports coalitions as free text, in English or Russian and
//! with arbitrary decoration ("Phoenix Team", "студент коалиции Феникс").
//! Matching ignores case and looks for a spelling anywhere in the name. All
//! Latin spellings are tried before any Cyrillic one, each pass in
//! [`COALITION_TABLE`] order, so "Феникс vs Dragon" is a dragon.

use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GroupCategory {
    Phoenix,
    Dragon,
    Minotaur,
    Pegasus,
}

impl GroupCategory {
    pub const ALL: [GroupCategory; 4] = [
        GroupCategory::Phoenix,
        GroupCategory::Dragon,
        GroupCategory::Minotaur,
        GroupCategory::Pegasus,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Phoenix => "phoenix",
            Self::Dragon => "dragon",
            Self::Minotaur => "minotaur",
            Self::Pegasus => "pegasus",
        }
    }

    /// Lowercase spellings accepted for this category.
    pub fn spellings(&self) -> &'static [&'static str] {
        COALITION_TABLE
            .iter()
            .find(|(category, _)| category == self)
            .map(|(_, spellings)| *spellings)
            .unwrap_or(&[])
    }
}

impl fmt::Display for GroupCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepted lowercase spellings per category, Latin first then Cyrillic.
pub const COALITION_TABLE: &[(GroupCategory, &[&str])] = &[
    (GroupCategory::Phoenix, &["phoenix", "феникс"]),
    (GroupCategory::Dragon, &["dragon", "дракон"]),
    (GroupCategory::Minotaur, &["minotaur", "минотавр"]),
    (GroupCategory::Pegasus, &["pegasus", "пегас"]),
];

/// Map a coalition name to its category. `None` for empty or unknown names.
pub fn match_coalition(name: &str) -> Option<GroupCategory> {
    let name = name.to_lowercase();
    if name.trim().is_empty() {
        return None;
    }
    let longest = COALITION_TABLE.iter().map(|(_, s)| s.len()).max().unwrap_or(0);
    (0..longest).find_map(|pass| {
        COALITION_TABLE.iter().find_map(|(category, spellings)| {
            spellings
                .get(pass)
                .filter(|s| name.contains(*s))
                .map(|_| *category)
        })
    })
}
