//! Exit status codes for the CLI
//!
//! - 0: Success, including the usage screen
//! - 1: Operational error (I/O, XML, settings, lock)
//! - 2: Command-line parse error
//! - 3: Invalid action
//! - 4: Alias not found
//! - 5: Invalid host/IP
//! - 6: Alias updated but the rule reload failed
//!
//! The rejection codes let scripts branch without parsing the printed
//! message, which stays identical to the historical tool output.

use std::process::{ExitCode, Termination};

use crate::errors::AliasToolError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum ExitStatus {
    Success = 0,
    Error = 1,
    ParseError = 2,
    InvalidAction = 3,
    AliasNotFound = 4,
    InvalidTarget = 5,
    ReloadFailed = 6,
}

impl From<ExitStatus> for ExitCode {
    fn from(status: ExitStatus) -> Self {
        ExitCode::from(status as u8)
    }
}

impl Termination for ExitStatus {
    fn report(self) -> ExitCode {
        ExitCode::from(self as u8)
    }
}

impl ExitStatus {
    /// Map an error to its exit status
    pub fn from_error(error: &AliasToolError) -> Self {
        match error {
            AliasToolError::InvalidAction(_) => ExitStatus::InvalidAction,
            AliasToolError::AliasNotFound(_) => ExitStatus::AliasNotFound,
            AliasToolError::InvalidTarget(_) => ExitStatus::InvalidTarget,
            _ => ExitStatus::Error,
        }
    }
}
