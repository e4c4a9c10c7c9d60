pub mod problem;
pub mod solution;
pub mod submission;

pub use problem::Problem;
pub use solution::{Solution, PYTHON3};
pub use submission::{SubmissionResult, SubmissionStatus};
