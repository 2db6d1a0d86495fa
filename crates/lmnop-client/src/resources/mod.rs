//! Typed call groups, one per backend resource family.
//!
//! Every client borrows the [`Gateway`](crate::gateway::Gateway) and returns
//! its results unchanged: no validation beyond what the wire format needs and
//! no error translation.

mod accounts;
mod courses;
mod enrollments;
mod quizzes;
mod support;

pub use accounts::{AccountFamily, Accounts};
pub use courses::Courses;
pub use enrollments::Enrollments;
pub use quizzes::Quizzes;
pub use support::Support;
