//! Process exit codes
//!
//! | Exit Code | Meaning |
//! |-----------|---------|
//! | 0 | Success: report written (ingest warnings allowed) |
//! | 1 | Failure: unreadable input, bad config, render or IO error |
//! | 2 | Rejected: the selection broke a rule of its mode |
//! | 3 | Empty: the selection was legal but matched no entries |
//!
//! These are stable API for scripts.

use std::process;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitCode {
    Success = 0,
    Failure = 1,
    Rejected = 2,
    Empty = 3,
}

impl ExitCode {
    pub fn is_success(self) -> bool {
        matches!(self, ExitCode::Success)
    }

    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<ExitCode> for process::ExitCode {
    fn from(code: ExitCode) -> Self {
        process::ExitCode::from(code as u8)
    }
}
