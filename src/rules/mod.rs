// Business rules of the exchange, kept free of I/O so they can be checked in
// isolation. Services load rows, apply these, and write the result back.

pub mod eligibility;
pub mod form;
pub mod points;

pub use eligibility::{check_eligibility, Ineligible};
pub use form::{build_form, match_submission, FormField};
