//! Fail-fast sequential execution of a [`RunPlan`].

use std::io::{self, Write};
use std::process::{Command, Stdio};

use tracing::{debug, info, warn};

use crate::error::DriverError;
use crate::invocation::CommandInvocation;
use crate::plan::RunPlan;

/// How a launched command finished.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Exited(i32),
    /// Killed before producing an exit code (e.g. by a signal).
    Terminated,
}

/// Runs one command to completion.
pub trait Launcher {
    fn launch(&mut self, invocation: &CommandInvocation) -> io::Result<StepOutcome>;
}

/// Spawns real child processes that share the harness's stdin/stdout/stderr.
#[derive(Clone, Copy, Debug, Default)]
pub struct SystemLauncher;

impl Launcher for SystemLauncher {
    fn launch(&mut self, invocation: &CommandInvocation) -> io::Result<StepOutcome> {
        let mut command = Command::new(&invocation.program);
        command
            .args(&invocation.args)
            .envs(&invocation.env)
            .stdin(Stdio::inherit())
            .stdout(Stdio::inherit())
            .stderr(Stdio::inherit());
        if let Some(dir) = &invocation.current_dir {
            command.current_dir(dir);
        }

        let status = command.status()?;
        Ok(match status.code() {
            Some(code) => StepOutcome::Exited(code),
            None => StepOutcome::Terminated,
        })
    }
}

/// Lifecycle of one run. `step` is the 1-based position in the plan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RunState {
    #[default]
    NotStarted,
    Running {
        step: usize,
    },
    Succeeded,
    Failed {
        step: usize,
        code: Option<i32>,
    },
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Succeeded | RunState::Failed { .. })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunReport {
    pub steps_run: usize,
}

/// Executes plan steps in order and stops at the first failing one.
pub struct SequentialDriver<L = SystemLauncher> {
    launcher: L,
    state: RunState,
}

impl SequentialDriver<SystemLauncher> {
    pub fn system() -> Self {
        Self::new(SystemLauncher)
    }
}

impl<L: Launcher> SequentialDriver<L> {
    pub fn new(launcher: L) -> Self {
        Self {
            launcher,
            state: RunState::NotStarted,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn launcher(&self) -> &L {
        &self.launcher
    }

    /// Runs every step, echoing each command line to stdout right before it starts.
    pub fn run(&mut self, plan: &RunPlan) -> Result<RunReport, DriverError> {
        self.state = RunState::NotStarted;

        for (idx, invocation) in plan.steps().iter().enumerate() {
            let step = idx + 1;
            let command = invocation.to_string();
            self.state = RunState::Running { step };

            echo(&mut io::stdout().lock(), step, &command);
            debug!(step, program = %invocation.program, "launching");

            let outcome = match self.launcher.launch(invocation) {
                Ok(outcome) => outcome,
                Err(source) => {
                    self.state = RunState::Failed { step, code: None };
                    return Err(DriverError::Launch {
                        step,
                        command,
                        source,
                    });
                }
            };

            match outcome {
                StepOutcome::Exited(0) => debug!(step, "step succeeded"),
                StepOutcome::Exited(code) => {
                    self.state = RunState::Failed {
                        step,
                        code: Some(code),
                    };
                    return Err(DriverError::NonZeroExit {
                        step,
                        command,
                        code,
                    });
                }
                StepOutcome::Terminated => {
                    warn!(step, "command terminated without an exit code");
                    self.state = RunState::Failed { step, code: None };
                    return Err(DriverError::Terminated { step, command });
                }
            }
        }

        let steps_run = plan.steps().len();
        self.state = RunState::Succeeded;
        info!("all {steps_run} step(s) passed");
        Ok(RunReport { steps_run })
    }
}

/// Writes the command line and flushes, since the child shares the same stdout
/// and its output must come after the echo. A broken stdout only costs the echo;
/// the step still runs.
fn echo(out: &mut impl Write, step: usize, command: &str) {
    if let Err(err) = writeln!(out, "{command}").and_then(|()| out.flush()) {
        warn!(step, "could not echo command to stdout: {err}");
    }
}
