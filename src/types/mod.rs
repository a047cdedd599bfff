//! # Types Module
//!
//! Strongly-typed payloads exchanged with the backend. Field names follow the
//! wire format (snake_case); serde renames cover the few fields whose Rust name
//! differs from the JSON key.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`Topic`] | Speaking topic shown on the home screen |
//! | [`RecordingSession`] | Session created for a topic, with its questions |
//! | [`SpeakingAssessmentResults`] | Assessment returned when a session completes |
//! | [`ArticlePreview`] | Article card in the paginated list |
//! | [`Article`] | Full article with vocabulary and grammar rules |
//! | [`User`] | Signed-in user held by the credential store |

pub mod article;
pub mod assessment;
pub mod level;
pub mod session;
pub mod topic;
pub mod user;

pub use article::{Article, ArticlePreview, GrammarRule, GrammarWord};
pub use assessment::{GrammarIssue, RephraseSuggestion, SpeakingAssessmentResults, Word};
pub use level::EnglishLevel;
pub use session::{CreateSessionRequest, Question, RecordingSession, TopicQuestions};
pub use topic::Topic;
pub use user::User;

use serde::{Deserialize, Serialize};

/// `data` payload of `GET /topics`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopicsData {
    pub topics: Vec<Topic>,
}

/// `data` payload of `POST /sessions`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub session: RecordingSession,
}

/// `data` payload of `GET /articles`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticlesPreviewData {
    pub articles: Vec<ArticlePreview>,
}

/// `data` payload of `GET /articles/{id}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleData {
    pub article: Article,
}
