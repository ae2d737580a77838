pub mod cases;
pub mod types;

pub use cases::{load_test_cases, parse_test_cases};
pub use types::{Priority, TestCaseSpec};
