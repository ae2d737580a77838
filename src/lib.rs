pub mod ai;
pub mod analyzer;
pub mod driver;
pub mod parser;
pub mod probe;
pub mod report;
pub mod runner;
pub mod server;
pub mod utils;

// Re-export common items
pub use analyzer::AppAnalyzer;
pub use parser::types::TestCaseSpec;
pub use runner::executor::TestExecutor;
pub use runner::state::{ExecutionReport, ExecutionResult, ExecutionSummary, TestStatus};
