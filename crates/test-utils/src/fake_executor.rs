use std::collections::{BTreeMap, HashMap, HashSet};
use std::future::Future;
use std::io;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use highway::exec::{ExecError, LifecycleState, ProcessDescriptor, ProcessExecutor, Termination};

/// What the fake saw for one launch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Launch {
    pub tool: String,
    pub executable: PathBuf,
    /// Loggable form; secure arguments are masked.
    pub arguments: Vec<String>,
    pub current_dir: Option<PathBuf>,
    pub environment: BTreeMap<String, String>,
}

#[derive(Debug, Default)]
struct Script {
    stdout: HashMap<String, String>,
    exit_codes: HashMap<String, i32>,
    spawn_failures: HashSet<String>,
}

/// A fake executor that:
/// - records every descriptor it is asked to launch
/// - never spawns a process; every launch terminates immediately
/// - exits 0 and prints nothing unless scripted otherwise per tool name.
#[derive(Debug, Clone, Default)]
pub struct FakeExecutor {
    launches: Arc<Mutex<Vec<Launch>>>,
    script: Arc<Mutex<Script>>,
}

impl FakeExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Text written to stdout by `tool` (visible when capturing).
    pub fn with_stdout(self, tool: &str, stdout: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .stdout
            .insert(tool.to_string(), stdout.to_string());
        self
    }

    pub fn with_exit_code(self, tool: &str, code: i32) -> Self {
        self.script
            .lock()
            .unwrap()
            .exit_codes
            .insert(tool.to_string(), code);
        self
    }

    /// Launching `tool` fails like a missing binary would.
    pub fn with_spawn_failure(self, tool: &str) -> Self {
        self.script
            .lock()
            .unwrap()
            .spawn_failures
            .insert(tool.to_string());
        self
    }

    pub fn launches(&self) -> Vec<Launch> {
        self.launches.lock().unwrap().clone()
    }

    /// Tool names in launch order.
    pub fn launched_tools(&self) -> Vec<String> {
        self.launches().into_iter().map(|l| l.tool).collect()
    }
}

impl ProcessExecutor for FakeExecutor {
    fn launch<'a>(
        &'a self,
        descriptor: &'a mut ProcessDescriptor,
        _wait: bool,
    ) -> Pin<Box<dyn Future<Output = Result<(), ExecError>> + Send + 'a>> {
        Box::pin(async move {
            let tool = descriptor.name().to_string();
            let (stdout, code, fail) = {
                let script = self.script.lock().unwrap();
                (
                    script.stdout.get(&tool).cloned(),
                    script.exit_codes.get(&tool).copied().unwrap_or(0),
                    script.spawn_failures.contains(&tool),
                )
            };

            if fail {
                return Err(ExecError::Spawn {
                    program: tool,
                    source: io::Error::new(io::ErrorKind::NotFound, "scripted spawn failure"),
                });
            }

            descriptor.transition(LifecycleState::Executing)?;
            self.launches.lock().unwrap().push(Launch {
                tool: tool.clone(),
                executable: descriptor.executable().path().to_path_buf(),
                arguments: descriptor.arguments.loggable(),
                current_dir: descriptor.current_dir.clone(),
                environment: descriptor.environment.clone(),
            });

            if let (Some(text), Some(buffer)) = (stdout, descriptor.io.captured_output()) {
                buffer.append(text.as_bytes());
            }
            descriptor.finish(Termination::exited(code))
        })
    }
}
