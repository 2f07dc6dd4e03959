pub mod error;
pub mod panelist_service;
pub mod report_service;
pub mod response_service;
pub mod reward_service;
pub mod survey_service;
pub mod validation;

pub use error::ServiceError;
pub use panelist_service::{DemographicOptions, DetailsInput, PanelistService};
pub use report_service::{AdminTables, Export, ReportService};
pub use response_service::{AnswerForm, ResponseService, SubmissionReceipt};
pub use reward_service::{ChallengeStatus, ClaimOutcome, RedemptionOutcome, RewardService};
pub use survey_service::{NewQuestion, NewSurvey, SurveyResults, SurveyService};
