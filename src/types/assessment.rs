use super::EnglishLevel;
use serde::{Deserialize, Serialize};

/// Result of `POST /sessions/{id}/complete`; sits directly under `data`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpeakingAssessmentResults {
    pub overall_level: EnglishLevel,
    pub top_words: Vec<Word>,
    pub grammar_issues: Vec<GrammarIssue>,
    pub rephrase_suggestions: Vec<RephraseSuggestion>,
    pub overall_feedback: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Word {
    #[serde(rename = "word")]
    pub text: String,
    pub level: EnglishLevel,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GrammarIssue {
    pub sentence: String,
    pub explanation: String,
    pub corrected_sentence: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RephraseSuggestion {
    pub original: String,
    pub suggestion: String,
}
