pub mod leetcode_client;
pub mod llm;
pub mod result_store;
pub mod solution_saver;
pub mod submitter;

pub use leetcode_client::{JudgeClient, LeetCodeClient};
pub use llm::{create_generator, SolutionGenerator};
pub use result_store::{ResultRecord, ResultStore};
pub use solution_saver::SolutionSaver;
pub use submitter::PollPolicy;
