pub mod filter;
pub mod scanner;

pub use filter::{filter, BASELINE_EXCLUSIONS, UNION_MARKER};
pub use scanner::{list_declared, snapshot};
