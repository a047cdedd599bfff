use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Body of `POST /sessions`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateSessionRequest {
    pub topic_id: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingSession {
    pub id: Uuid,
    #[serde(rename = "topic")]
    pub topic_questions: TopicQuestions,
}

impl RecordingSession {
    pub fn questions(&self) -> &[Question] {
        &self.topic_questions.questions
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicQuestions {
    pub id: i64,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub text: String,
}
