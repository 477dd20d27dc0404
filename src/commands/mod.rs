//! Command implementations for check-icinga CLI.

pub mod check;

pub use check::{print_human, print_json, run_check, CheckRequest};
