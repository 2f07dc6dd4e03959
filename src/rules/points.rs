use crate::database::models::{Panelist, Survey};
use crate::types::SurveyStatus;

/// Every question adds this much to a survey's payout
pub const POINTS_PER_QUESTION: i32 = 5;

/// Count one more complete; closes the survey once the sample is reached.
///
/// A completed survey stays completed.
pub fn record_completion(survey: &mut Survey) {
    survey.completes += 1;
    if survey.completes >= survey.sample_size {
        survey.status = SurveyStatus::Completed;
    }
}

/// Flat payout for completing a survey, not weighted per question
pub fn award_completion(panelist: &mut Panelist, survey: &Survey) {
    panelist.point_balance += survey.point_value;
}

/// Credit for appending a question, independent of how many answers it has
pub fn record_question_added(survey: &mut Survey) {
    survey.num_questions += 1;
    survey.point_value += POINTS_PER_QUESTION;
}

/// Balance after redeeming `amount`, or `None` when the amount is not
/// positive or the balance cannot cover it
pub fn redeem(balance: i32, amount: i32) -> Option<i32> {
    if amount > 0 && amount <= balance {
        Some(balance - amount)
    } else {
        None
    }
}
