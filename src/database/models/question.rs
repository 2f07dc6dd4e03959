use serde::{Deserialize, Serialize};
use sqlx::FromRow;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Question {
    pub question_id: i32,
    pub parent_survey_id: i32,
    pub question: String,
}

/// A selectable choice of a question
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Answer {
    pub answer_id: i32,
    pub parent_question_id: i32,
    pub answer: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct QuestionWithAnswers {
    #[serde(flatten)]
    pub question: Question,
    pub answers: Vec<Answer>,
}

/// One panelist's chosen answer to one question
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Response {
    pub response_id: i32,
    pub parent_survey_id: i32,
    pub parent_question_id: i32,
    pub response_panelist_id: i32,
    pub response: String,
}
