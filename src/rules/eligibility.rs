use chrono::NaiveDate;
use serde::Serialize;

use crate::database::models::{Panelist, SurveyTargeting};
use crate::types::SurveyStatus;

/// First failed condition when a panelist may not answer a survey
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, thiserror::Error)]
#[serde(rename_all = "snake_case")]
pub enum Ineligible {
    #[error("Complete your demographic details before answering surveys")]
    IncompleteProfile,
    #[error("Your age is outside the range this survey targets")]
    OutsideAgeRange,
    #[error("This survey is no longer accepting responses")]
    Closed,
    #[error("You cannot answer a survey you published")]
    OwnSurvey,
    #[error("This survey does not target your race")]
    RaceNotTargeted,
    #[error("This survey does not target your gender")]
    GenderNotTargeted,
    #[error("This survey does not target your region")]
    RegionNotTargeted,
    #[error("You have already answered this survey")]
    AlreadyResponded,
}

fn targets(names: &[String], value: &str) -> bool {
    names.iter().any(|name| name == value)
}

/// Conjunction of every eligibility condition, checked in a fixed order.
///
/// The SQL in `SurveyService::eligible_surveys` expresses the same conjunction;
/// both must change together.
pub fn check_eligibility(
    panelist: &Panelist,
    target: &SurveyTargeting,
    already_responded: bool,
    today: NaiveDate,
) -> Result<(), Ineligible> {
    let (Some(age), Some(race), Some(gender), Some(region)) = (
        panelist.age_on(today),
        panelist.race.as_deref(),
        panelist.gender.as_deref(),
        panelist.region.as_deref(),
    ) else {
        return Err(Ineligible::IncompleteProfile);
    };

    let survey = &target.survey;
    if age < survey.min_age || age > survey.max_age {
        return Err(Ineligible::OutsideAgeRange);
    }
    if survey.status != SurveyStatus::Open {
        return Err(Ineligible::Closed);
    }
    if survey.publisher_id == panelist.panelist_id {
        return Err(Ineligible::OwnSurvey);
    }
    if !targets(&target.races, race) {
        return Err(Ineligible::RaceNotTargeted);
    }
    if !targets(&target.genders, gender) {
        return Err(Ineligible::GenderNotTargeted);
    }
    if !targets(&target.regions, region) {
        return Err(Ineligible::RegionNotTargeted);
    }
    if already_responded {
        return Err(Ineligible::AlreadyResponded);
    }
    Ok(())
}
