use serde::{Deserialize, Serialize};

/// A top-level comment. Owns its answers; they are always rendered inline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    pub id: i64,
    pub comment: String,
    pub answers: Vec<Answer>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: i64,
    pub answer: String,
    pub question_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateQuestionRequest {
    pub comment: String,
}

/// An absent `comment` leaves the stored text untouched.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateQuestionRequest {
    pub comment: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateAnswerRequest {
    pub answer: String,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct UpdateAnswerRequest {
    pub answer: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteResponse {
    pub message: String,
    pub id: i64,
}

impl DeleteResponse {
    pub fn question(id: i64) -> Self {
        Self {
            message: "Question deleted successfully".to_string(),
            id,
        }
    }

    pub fn answer(id: i64) -> Self {
        Self {
            message: "Answer deleted successfully".to_string(),
            id,
        }
    }
}
