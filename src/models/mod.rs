pub mod loaders;
pub mod profile;
pub mod quiz;
pub mod report;
pub mod result;

pub use loaders::{load_profile, parse_profile};
pub use profile::ProfileData;
pub use quiz::{QuestionType, Quiz, QuizQuestion};
pub use report::{ComplianceReport, Course, SafetyReport};
pub use result::{EvaluationResult, QuizResult, PASSING_SCORE};
