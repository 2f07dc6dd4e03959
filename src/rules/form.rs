use serde::Serialize;
use std::collections::HashMap;

use crate::database::models::QuestionWithAnswers;

/// One single-choice field of a survey's answering form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FormField {
    pub name: String,
    pub question_id: i32,
    pub label: String,
    pub choices: Vec<String>,
}

const FIELD_PREFIX: &str = "q";

pub fn field_name(question_id: i32) -> String {
    format!("{}{}", FIELD_PREFIX, question_id)
}

fn parse_field_name(name: &str) -> Option<i32> {
    name.strip_prefix(FIELD_PREFIX)?.parse().ok()
}

/// One field per question, offering that question's answers as choices
pub fn build_form(questions: &[QuestionWithAnswers]) -> Vec<FormField> {
    questions
        .iter()
        .map(|q| FormField {
            name: field_name(q.question.question_id),
            question_id: q.question.question_id,
            label: q.question.question.clone(),
            choices: q.answers.iter().map(|a| a.answer.clone()).collect(),
        })
        .collect()
}

/// Resolve a submitted form into `(question_id, chosen answer)` pairs.
///
/// Every question needs exactly one of its own choices. Fields that name no
/// question of this survey are rejected. Errors are keyed by field name.
pub fn match_submission(
    questions: &[QuestionWithAnswers],
    submitted: &HashMap<String, String>,
) -> Result<Vec<(i32, String)>, HashMap<String, String>> {
    let mut errors = HashMap::new();
    let mut chosen = Vec::with_capacity(questions.len());

    for q in questions {
        let name = field_name(q.question.question_id);
        match submitted.get(&name) {
            None => {
                errors.insert(name, "Please choose an answer".to_string());
            }
            Some(value) if q.answers.iter().any(|a| &a.answer == value) => {
                chosen.push((q.question.question_id, value.clone()));
            }
            Some(_) => {
                errors.insert(name, "Not a valid choice".to_string());
            }
        }
    }

    for name in submitted.keys() {
        let known = parse_field_name(name)
            .map(|id| questions.iter().any(|q| q.question.question_id == id))
            .unwrap_or(false);
        if !known {
            errors.insert(name.clone(), "Unknown question".to_string());
        }
    }

    if errors.is_empty() {
        Ok(chosen)
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::models::{Answer, Question};

    fn question(id: i32, choices: &[&str]) -> QuestionWithAnswers {
        QuestionWithAnswers {
            question: Question {
                question_id: id,
                parent_survey_id: 1,
                question: format!("Question {}", id),
            },
            answers: choices
                .iter()
                .enumerate()
                .map(|(i, c)| Answer {
                    answer_id: id * 100 + i as i32,
                    parent_question_id: id,
                    answer: c.to_string(),
                })
                .collect(),
        }
    }

    fn submission(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect()
    }

    #[test]
    fn form_has_one_field_per_question() {
        let form = build_form(&[question(4, &["Yes", "No"]), question(9, &["Red"])]);
        assert_eq!(form.len(), 2);
        assert_eq!(form[0].name, "q4");
        assert_eq!(form[0].choices, vec!["Yes", "No"]);
        assert_eq!(form[1].name, "q9");
        assert_eq!(form[1].label, "Question 9");
    }

    #[test]
    fn submission_is_keyed_by_question_id_not_position() {
        // ids are not contiguous
        let questions = [question(4, &["Yes", "No"]), question(9, &["Red", "Blue"])];
        let chosen = match_submission(&questions, &submission(&[("q9", "Blue"), ("q4", "No")])).unwrap();
        assert_eq!(chosen, vec![(4, "No".to_string()), (9, "Blue".to_string())]);
    }

    #[test]
    fn missing_and_invalid_answers_are_reported() {
        let questions = [question(4, &["Yes", "No"]), question(9, &["Red", "Blue"])];
        let errors = match_submission(&questions, &submission(&[("q4", "Maybe")])).unwrap_err();
        assert_eq!(errors["q4"], "Not a valid choice");
        assert_eq!(errors["q9"], "Please choose an answer");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let questions = [question(4, &["Yes"])];
        let errors =
            match_submission(&questions, &submission(&[("q4", "Yes"), ("q5", "Yes"), ("x", "Yes")])).unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors["q5"], "Unknown question");
        assert_eq!(errors["x"], "Unknown question");
    }
}
