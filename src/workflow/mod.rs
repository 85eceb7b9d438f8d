pub mod quiz_flow;
pub mod quiz_session;

pub use quiz_flow::{QuizEvaluator, QuizFlow, QuizGenerator, QuizReporter};
pub use quiz_session::{QuizSession, Submission};
