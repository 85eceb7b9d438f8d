pub mod failure_writer;
pub mod llm_service;

pub use failure_writer::FailureWriter;
pub use llm_service::LlmService;
