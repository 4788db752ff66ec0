/// All backend primary keys are integer auto-increment columns.
pub type DbId = i64;

/// Calendar dates travel as `YYYY-MM-DD`.
pub type Date = chrono::NaiveDate;

/// Wire format for [`Date`] values in query strings and form fields.
pub const DATE_FORMAT: &str = "%Y-%m-%d";
