use serde::{Deserialize, Serialize};

/// Problem difficulty
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 3] = [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard];

    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }

    /// Single-letter marker used in listings
    pub fn letter(self) -> char {
        match self {
            Difficulty::Easy => 'E',
            Difficulty::Medium => 'M',
            Difficulty::Hard => 'H',
        }
    }

    /// Parse a difficulty name, case-insensitively. Accepts single letters too.
    pub fn parse(s: &str) -> Option<Difficulty> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" | "e" => Some(Difficulty::Easy),
            "medium" | "m" => Some(Difficulty::Medium),
            "hard" | "h" => Some(Difficulty::Hard),
            _ => None,
        }
    }
}

impl std::fmt::Display for Difficulty {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Difficulty {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Difficulty::parse(s).ok_or_else(|| {
            format!(
                "unknown difficulty '{}' (expected: easy, medium, hard)",
                s
            )
        })
    }
}

/// A single practice problem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: String,
    #[serde(alias = "name")]
    pub title: String,
    #[serde(default)]
    pub difficulty: Difficulty,
    /// Problem page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    /// Walkthrough video
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub video: Option<String>,
    /// Free-text note; empty means no note
    #[serde(default, alias = "notes", skip_serializing_if = "String::is_empty")]
    pub note: String,
    #[serde(default, alias = "isSolved")]
    pub solved: bool,
}

impl Question {
    pub fn new(id: String, title: String, difficulty: Difficulty) -> Self {
        Question {
            id,
            title,
            difficulty,
            url: None,
            video: None,
            note: String::new(),
            solved: false,
        }
    }

    pub fn has_note(&self) -> bool {
        !self.note.trim().is_empty()
    }
}
