//! Defendant plea submissions and the business rules checked before a plea is
//! accepted against the authoritative (SJP) record.

pub mod domain;
mod problem;
mod validator;


pub use domain::{Offence, Plea, PleaValue};
pub use problem::{Problem, ProblemCode, ProblemValue};
pub use validator::{clean_offence_title, validate_plea, OFFENCE_TITLE_MAX_LENGTH};
