use std::io;

use thiserror::Error;

/// Exit code used when a step failed without producing one of its own.
pub const FALLBACK_EXIT_CODE: i32 = 1;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("run plan has no steps")]
    EmptyPlan,

    #[error("step {step} could not be launched: {command}")]
    Launch {
        step: usize,
        command: String,
        #[source]
        source: io::Error,
    },

    #[error("step {step} exited with status {code}: {command}")]
    NonZeroExit {
        step: usize,
        command: String,
        code: i32,
    },

    #[error("step {step} was terminated without an exit code: {command}")]
    Terminated { step: usize, command: String },
}

impl DriverError {
    /// Process exit code the harness should terminate with.
    ///
    /// A failing command's own code is passed through untouched.
    pub fn exit_code(&self) -> i32 {
        match self {
            DriverError::NonZeroExit { code, .. } => *code,
            DriverError::EmptyPlan
            | DriverError::Launch { .. }
            | DriverError::Terminated { .. } => FALLBACK_EXIT_CODE,
        }
    }

    pub fn step(&self) -> Option<usize> {
        match self {
            DriverError::EmptyPlan => None,
            DriverError::Launch { step, .. }
            | DriverError::NonZeroExit { step, .. }
            | DriverError::Terminated { step, .. } => Some(*step),
        }
    }
}
