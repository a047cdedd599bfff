use serde::{Deserialize, Serialize};
use std::fmt;

/// CEFR proficiency level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum EnglishLevel {
    A1,
    A2,
    B1,
    B2,
    C1,
    C2,
}

impl EnglishLevel {
    pub fn code(&self) -> &'static str {
        match self {
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::B1 => "B1",
            Self::B2 => "B2",
            Self::C1 => "C1",
            Self::C2 => "C2",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Self::A1 => "Beginner",
            Self::A2 => "Elementary",
            Self::B1 => "Intermediate",
            Self::B2 => "Upper Intermediate",
            Self::C1 => "Advanced",
            Self::C2 => "Proficient",
        }
    }
}

impl fmt::Display for EnglishLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}
