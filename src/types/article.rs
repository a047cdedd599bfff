use super::EnglishLevel;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticlePreview {
    pub id: i64,
    pub image_url: String,
    pub level: EnglishLevel,
    pub minutes_to_read: u32,
    pub title: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    pub id: i64,
    pub image_url: String,
    pub content: String,
    pub title: String,
    pub level: EnglishLevel,
    pub minutes: u32,
    pub vocabulary: Vec<GrammarWord>,
    pub rules: Vec<GrammarRule>,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrammarWord {
    pub id: i64,
    pub word: String,
    pub part_of_speech: String,
    pub meaning: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrammarRule {
    pub id: i64,
    pub name: String,
    pub example: String,
    pub note: String,
}
