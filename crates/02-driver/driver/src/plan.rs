use serde::{Deserialize, Serialize};

use crate::error::DriverError;
use crate::invocation::CommandInvocation;

/// Selector used when `test-single` is invoked without one.
pub const DEFAULT_SELECTOR: &str = "test_rom";

/// Ordered, non-empty list of commands executed one after another.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RunPlan {
    steps: Vec<CommandInvocation>,
}

impl RunPlan {
    pub fn new(steps: Vec<CommandInvocation>) -> Result<Self, DriverError> {
        if steps.is_empty() {
            return Err(DriverError::EmptyPlan);
        }
        Ok(Self { steps })
    }

    pub fn steps(&self) -> &[CommandInvocation] {
        &self.steps
    }
}

/// Command templates for the two driver modes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct HarnessPlans {
    /// Single-ROM mode. Arguments may contain `{selector}`.
    #[serde(default = "reference_single")]
    pub single: Vec<CommandInvocation>,
    /// Full-suite mode.
    #[serde(default = "reference_suite")]
    pub suite: Vec<CommandInvocation>,
}

impl Default for HarnessPlans {
    fn default() -> Self {
        Self {
            single: reference_single(),
            suite: reference_suite(),
        }
    }
}

impl HarnessPlans {
    /// Plan exercising the emulator against the ROM test(s) matched by `selector`.
    pub fn single_plan(&self, selector: &str) -> Result<RunPlan, DriverError> {
        RunPlan::new(
            self.single
                .iter()
                .map(|step| step.with_selector(selector))
                .collect(),
        )
    }

    /// Plan running the emulator's whole-corpus entry point.
    pub fn suite_plan(&self) -> Result<RunPlan, DriverError> {
        RunPlan::new(self.suite.clone())
    }
}

/// `cargo test {selector} -- --nocapture --test-threads 1`, pinned to one test thread
/// so diagnostics from different ROMs never interleave.
fn reference_single() -> Vec<CommandInvocation> {
    vec![CommandInvocation::new("cargo")
        .args([
            "test",
            crate::invocation::SELECTOR_PLACEHOLDER,
            "--",
            "--nocapture",
            "--test-threads",
            "1",
        ])
        .env("RUST_TEST_THREADS", "1")]
}

fn reference_suite() -> Vec<CommandInvocation> {
    vec![CommandInvocation::new("cargo").args(["run", "--example", "test_roms"])]
}
