pub mod demographic;
pub mod panelist;
pub mod question;
pub mod redemption;
pub mod survey;

pub use demographic::{Demographic, DemographicKind};
pub use panelist::Panelist;
pub use question::{Answer, Question, QuestionWithAnswers, Response};
pub use redemption::{Challenge, Redemption};
pub use survey::{Survey, SurveyTargeting};
