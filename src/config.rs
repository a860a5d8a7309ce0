use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Side;

/// Difficulty levels offered by the picker screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    /// Fixed minimax depth for this level.
    pub fn depth(self) -> u8 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 5,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// One-line caption for the picker button.
    pub fn description(self) -> &'static str {
        match self {
            Difficulty::Easy => "Depth 1 · Quick replies",
            Difficulty::Medium => "Depth 2 · Casual play",
            Difficulty::Hard => "Depth 5 · Strong opponent",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Difficulty {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::ALL
            .into_iter()
            .find(|level| level.label().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| CoreError::UnknownDifficulty(s.to_string()))
    }
}

/// Engine settings for one search.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchConfig {
    pub depth: u8,
    /// Wall-clock cap; on expiry the engine falls back to a depth-1 answer.
    pub time_limit_ms: Option<u64>,
}

impl SearchConfig {
    pub fn time_limit(&self) -> Option<Duration> {
        self.time_limit_ms.map(Duration::from_millis)
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Difficulty::Medium.into()
    }
}

impl From<Difficulty> for SearchConfig {
    fn from(level: Difficulty) -> Self {
        Self {
            depth: level.depth(),
            time_limit_ms: None,
        }
    }
}

/// Settings the UI hands to a new session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Colour played by the human; Black (first to move) by default.
    pub human: Side,
    pub time_limit_ms: Option<u64>,
}

impl SessionConfig {
    pub fn search_config(&self, level: Difficulty) -> SearchConfig {
        SearchConfig {
            depth: level.depth(),
            time_limit_ms: self.time_limit_ms,
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            human: Side::Black,
            time_limit_ms: None,
        }
    }
}
