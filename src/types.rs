//! Enums shared by models, services and handlers

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Lifecycle of a survey. `Completed` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SurveyStatus {
    Open,
    Completed,
}

impl SurveyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            SurveyStatus::Open => "Open",
            SurveyStatus::Completed => "Completed",
        }
    }
}

impl fmt::Display for SurveyStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("unknown value '{0}'")]
pub struct UnknownVariant(pub String);

impl TryFrom<String> for SurveyStatus {
    type Error = UnknownVariant;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "Open" => Ok(SurveyStatus::Open),
            "Completed" => Ok(SurveyStatus::Completed),
            _ => Err(UnknownVariant(value)),
        }
    }
}

/// External reward channels a balance can be redeemed through
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardChannel {
    Amazon,
    PayPal,
    Venmo,
}

impl RewardChannel {
    pub const ALL: [RewardChannel; 3] = [RewardChannel::Amazon, RewardChannel::PayPal, RewardChannel::Venmo];

    /// Name stored in `redemptions.redemption`
    pub fn as_str(&self) -> &'static str {
        match self {
            RewardChannel::Amazon => "Amazon",
            RewardChannel::PayPal => "PayPal",
            RewardChannel::Venmo => "Venmo",
        }
    }

    /// Path segment under /redeem/
    pub fn slug(&self) -> &'static str {
        match self {
            RewardChannel::Amazon => "amazon",
            RewardChannel::PayPal => "paypal",
            RewardChannel::Venmo => "venmo",
        }
    }
}

impl FromStr for RewardChannel {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        RewardChannel::ALL
            .into_iter()
            .find(|channel| channel.slug().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownVariant(s.to_string()))
    }
}

/// Orderings offered on the browse page
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrowseSort {
    Recommended,
    Shortest,
    Longest,
    Newest,
    Oldest,
}

impl FromStr for BrowseSort {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "recommended" => Ok(BrowseSort::Recommended),
            "shortest" => Ok(BrowseSort::Shortest),
            "longest" => Ok(BrowseSort::Longest),
            "newest" => Ok(BrowseSort::Newest),
            "oldest" => Ok(BrowseSort::Oldest),
            _ => Err(UnknownVariant(s.to_string())),
        }
    }
}

impl BrowseSort {
    /// ORDER BY clause for the non-recommended sorts
    pub fn order_by(&self) -> &'static str {
        match self {
            BrowseSort::Recommended => "survey_id",
            BrowseSort::Shortest => "num_questions ASC, survey_id",
            BrowseSort::Longest => "num_questions DESC, survey_id",
            BrowseSort::Newest => "create_date DESC, survey_id DESC",
            BrowseSort::Oldest => "create_date ASC, survey_id",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_parses_stored_text() {
        assert_eq!(SurveyStatus::try_from("Open".to_string()).unwrap(), SurveyStatus::Open);
        assert_eq!(SurveyStatus::try_from("Completed".to_string()).unwrap(), SurveyStatus::Completed);
        assert!(SurveyStatus::try_from("open".to_string()).is_err());
    }

    #[test]
    fn reward_channel_from_slug() {
        assert_eq!("venmo".parse::<RewardChannel>().unwrap(), RewardChannel::Venmo);
        assert_eq!("PayPal".parse::<RewardChannel>().unwrap(), RewardChannel::PayPal);
        assert_eq!(RewardChannel::Venmo.as_str(), "Venmo");
        assert!("bitcoin".parse::<RewardChannel>().is_err());
    }

    #[test]
    fn browse_sort_rejects_unknown() {
        assert_eq!("longest".parse::<BrowseSort>().unwrap(), BrowseSort::Longest);
        assert!("random".parse::<BrowseSort>().is_err());
    }
}
