// src/exec/descriptor.rs

//! Process descriptor: everything needed to launch one child process, plus
//! its lifecycle state.
//!
//! Building a descriptor never touches the OS. A descriptor is single-use:
//! its state only moves `Pending -> Executing -> Terminated`.

use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;
use std::process::ExitStatus;

use tokio::sync::watch;
use tracing::{debug, error};

use crate::args::ArgumentList;

use super::channel::Io;
use super::error::ExecError;
use super::resolver::ExecutableLocation;

/// How a process ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Termination {
    pub code: Option<i32>,
    pub signal: Option<i32>,
}

impl Termination {
    pub fn exited(code: i32) -> Self {
        Self {
            code: Some(code),
            signal: None,
        }
    }

    pub fn signaled(signal: i32) -> Self {
        Self {
            code: None,
            signal: Some(signal),
        }
    }

    pub fn from_status(status: ExitStatus) -> Self {
        #[cfg(unix)]
        let signal = std::os::unix::process::ExitStatusExt::signal(&status);
        #[cfg(not(unix))]
        let signal = None;

        Self {
            code: status.code(),
            signal,
        }
    }

    /// Zero exit code and no signal.
    pub fn is_success(&self) -> bool {
        self.code == Some(0) && self.signal.is_none()
    }
}

impl fmt::Display for Termination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.code, self.signal) {
            (Some(0), None) => write!(f, "exited successfully"),
            (Some(code), _) => write!(f, "exited with code {code}"),
            (None, Some(signal)) => write!(f, "terminated by signal {signal}"),
            (None, None) => write!(f, "terminated abnormally"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecycleState {
    Pending,
    Executing,
    Terminated(Termination),
}

impl LifecycleState {
    fn can_become(&self, next: &LifecycleState) -> bool {
        matches!(
            (self, next),
            (LifecycleState::Pending, LifecycleState::Executing)
                | (LifecycleState::Executing, LifecycleState::Terminated(_))
        )
    }
}

impl fmt::Display for LifecycleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LifecycleState::Pending => write!(f, "pending"),
            LifecycleState::Executing => write!(f, "executing"),
            LifecycleState::Terminated(t) => write!(f, "terminated ({t})"),
        }
    }
}

/// What the exit watcher publishes: `None` while the child runs, then the
/// termination or the reason the exit status could not be collected.
pub(crate) type ExitOutcome = Option<Result<Termination, String>>;

/// Log a finished process at a level matching its outcome.
pub(crate) fn log_termination(tool: &str, termination: Termination) {
    if termination.is_success() {
        debug!(tool = %tool, "process finished");
    } else {
        error!(
            tool = %tool,
            exit_code = ?termination.code,
            signal = ?termination.signal,
            "process {}",
            termination
        );
    }
}

/// Inert description of one prospective child process.
#[derive(Debug)]
pub struct ProcessDescriptor {
    name: String,
    executable: ExecutableLocation,
    pub arguments: ArgumentList,
    /// Working directory; inherited when `None`.
    pub current_dir: Option<PathBuf>,
    /// Overrides merged over the inherited environment.
    pub environment: BTreeMap<String, String>,
    pub io: Io,
    state: LifecycleState,
    exit: Option<watch::Receiver<ExitOutcome>>,
}

impl ProcessDescriptor {
    /// `name` is the logical tool name used in logs and errors.
    pub fn new(name: impl Into<String>, executable: ExecutableLocation) -> Self {
        Self {
            name: name.into(),
            executable,
            arguments: ArgumentList::new(),
            current_dir: None,
            environment: BTreeMap::new(),
            io: Io::default(),
            state: LifecycleState::Pending,
            exit: None,
        }
    }

    /// Descriptor for an explicit location, named after its file name.
    pub fn for_executable(executable: ExecutableLocation) -> Self {
        let name = executable
            .path()
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| executable.to_string());
        Self::new(name, executable)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn executable(&self) -> &ExecutableLocation {
        &self.executable
    }

    /// Current lifecycle state. A process launched without waiting shows as
    /// `Terminated` as soon as it has exited.
    pub fn state(&self) -> LifecycleState {
        match (self.state, self.published_exit()) {
            (LifecycleState::Executing, Some(Ok(termination))) => {
                LifecycleState::Terminated(termination)
            }
            (state, _) => state,
        }
    }

    fn published_exit(&self) -> ExitOutcome {
        self.exit.as_ref().and_then(|rx| (*rx.borrow()).clone())
    }

    pub fn with_arguments(mut self, arguments: impl Into<ArgumentList>) -> Self {
        self.arguments += arguments.into();
        self
    }

    pub fn with_current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    pub fn with_env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.environment.insert(key.into(), value.into());
        self
    }

    pub fn enable_output_capturing(&mut self) {
        self.io.enable_output_capturing();
    }

    pub fn enable_error_capturing(&mut self) {
        self.io.enable_error_capturing();
    }

    /// Move the lifecycle forward. Backwards or skipping moves are rejected.
    pub fn transition(&mut self, next: LifecycleState) -> Result<(), ExecError> {
        self.state = self.state();
        if !self.state.can_become(&next) {
            return Err(ExecError::InvalidTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        self.state = next;
        Ok(())
    }

    /// Record the termination outcome and log it.
    pub fn finish(&mut self, termination: Termination) -> Result<(), ExecError> {
        self.transition(LifecycleState::Terminated(termination))?;
        log_termination(&self.name, termination);
        Ok(())
    }

    pub(crate) fn attach_exit(&mut self, exit: watch::Receiver<ExitOutcome>) {
        self.exit = Some(exit);
    }

    /// Apply a published exit outcome to the lifecycle state.
    fn settle(&mut self, outcome: ExitOutcome) -> Result<Option<Termination>, ExecError> {
        match outcome {
            None => Ok(None),
            Some(Ok(termination)) => {
                self.state = LifecycleState::Terminated(termination);
                Ok(Some(termination))
            }
            Some(Err(reason)) => Err(ExecError::ExitLost {
                program: self.name.clone(),
                reason,
            }),
        }
    }

    /// Non-blocking check: `Ok(None)` while the process is still running.
    pub fn try_wait(&mut self) -> Result<Option<Termination>, ExecError> {
        match self.state {
            LifecycleState::Pending => Err(ExecError::NotLaunched {
                program: self.name.clone(),
            }),
            LifecycleState::Terminated(termination) => Ok(Some(termination)),
            LifecycleState::Executing => {
                let outcome = self.published_exit();
                self.settle(outcome)
            }
        }
    }

    /// Block until the process has terminated and return the outcome.
    ///
    /// Resolves immediately for a descriptor launched with `wait = true`.
    /// If the exit status could not be collected, every call reports
    /// [`ExecError::ExitLost`].
    pub async fn wait(&mut self) -> Result<Termination, ExecError> {
        if self.state == LifecycleState::Executing {
            if let Some(rx) = self.exit.as_mut() {
                let outcome = match rx.wait_for(Option::is_some).await {
                    Ok(published) => (*published).clone(),
                    Err(_) => Some(Err("exit watcher stopped without a status".to_string())),
                };
                self.settle(outcome)?;
            }
        }
        match self.state {
            LifecycleState::Terminated(termination) => Ok(termination),
            LifecycleState::Executing => Err(ExecError::ExitLost {
                program: self.name.clone(),
                reason: "no exit watcher attached".to_string(),
            }),
            LifecycleState::Pending => Err(ExecError::NotLaunched {
                program: self.name.clone(),
            }),
        }
    }

    pub fn termination(&self) -> Option<Termination> {
        match self.state() {
            LifecycleState::Terminated(t) => Some(t),
            _ => None,
        }
    }

    pub fn successfully_finished(&self) -> bool {
        self.termination().is_some_and(|t| t.is_success())
    }

    /// Turn an unsuccessful (or missing) termination into an error.
    pub fn assert_success(&self) -> Result<(), ExecError> {
        match self.state() {
            LifecycleState::Terminated(termination) if termination.is_success() => Ok(()),
            LifecycleState::Terminated(termination) => Err(ExecError::Failed {
                program: self.name.clone(),
                termination,
            }),
            _ => Err(ExecError::NotLaunched {
                program: self.name.clone(),
            }),
        }
    }

    /// Captured stdout, trimmed. `None` unless capturing was enabled.
    pub fn trimmed_output(&self) -> Option<String> {
        self.io.captured_output().map(|b| b.trimmed())
    }

    /// Captured stderr, trimmed. `None` unless capturing was enabled.
    pub fn trimmed_error_output(&self) -> Option<String> {
        self.io.captured_error().map(|b| b.trimmed())
    }

    /// Loggable command line with secure arguments masked.
    pub fn command_line(&self) -> String {
        if self.arguments.is_empty() {
            self.executable.to_string()
        } else {
            format!("{} {}", self.executable, self.arguments)
        }
    }
}

impl fmt::Display for ProcessDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.command_line(), self.state())
    }
}
