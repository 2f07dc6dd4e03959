//! Fixture builders shared by unit tests

use chrono::{NaiveDate, TimeZone, Utc};

use crate::database::models::{Panelist, Survey, SurveyTargeting};
use crate::types::SurveyStatus;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid fixture date")
}

/// A White / Female / Midwest panelist with a 100 point balance
pub fn panelist(panelist_id: i32, dob: &str) -> Panelist {
    Panelist {
        panelist_id,
        email: format!("panelist{}@example.com", panelist_id),
        password: String::new(),
        firstname: Some("Test".to_string()),
        lastname: Some("Panelist".to_string()),
        dob: Some(dob.parse().expect("fixture dob is YYYY-MM-DD")),
        race: Some("White".to_string()),
        gender: Some("Female".to_string()),
        region: Some("Midwest".to_string()),
        joined_date: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
        point_balance: 100,
    }
}

/// An open survey for ages 18 to 65 with no questions yet
pub fn survey(publisher_id: i32) -> Survey {
    Survey {
        survey_id: 10,
        publisher_id,
        category: "Food".to_string(),
        title: "Breakfast habits".to_string(),
        description: "How do you start the day".to_string(),
        sample_size: 100,
        min_age: 18,
        max_age: 65,
        num_questions: 0,
        point_value: 0,
        status: SurveyStatus::Open,
        completes: 0,
        create_date: Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap(),
    }
}

/// `survey` targeting every demographic the `panelist` fixture has
pub fn targeting(publisher_id: i32) -> SurveyTargeting {
    SurveyTargeting {
        survey: survey(publisher_id),
        races: vec!["White".to_string(), "Asian".to_string()],
        genders: vec!["Female".to_string()],
        regions: vec!["Midwest".to_string(), "South".to_string()],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixtures_line_up() {
        let p = panelist(1, "2000-01-01");
        assert_eq!(p.age_on(date(2024, 1, 1)), Some(24));
        assert!(p.race.is_some() && p.gender.is_some() && p.region.is_some());
        assert_eq!(targeting(2).survey.publisher_id, 2);
    }
}
