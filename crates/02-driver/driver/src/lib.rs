//! Sequential, fail-fast driver for the emulator's external test entry points.

mod error;
mod invocation;
mod plan;
mod runner;

pub use error::{DriverError, FALLBACK_EXIT_CODE};
pub use invocation::{CommandInvocation, SELECTOR_PLACEHOLDER};
pub use plan::{HarnessPlans, RunPlan, DEFAULT_SELECTOR};
pub use runner::{Launcher, RunReport, RunState, SequentialDriver, StepOutcome, SystemLauncher};
