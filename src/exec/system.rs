// src/exec/system.rs

use std::fmt;
use std::sync::Arc;

use crate::args::ArgumentList;

use super::descriptor::ProcessDescriptor;
use super::error::ExecError;
use super::executor::{ProcessExecutor, SystemExecutor};
use super::resolver::{ExecutableLocation, ExecutableProvider, SystemExecutableProvider};

/// Resolver + executor pair handed to task bodies.
///
/// Cheap to clone; both halves are shared.
#[derive(Clone)]
pub struct System {
    provider: Arc<dyn ExecutableProvider>,
    executor: Arc<dyn ProcessExecutor>,
}

impl System {
    pub fn new(
        provider: impl ExecutableProvider + 'static,
        executor: impl ProcessExecutor + 'static,
    ) -> Self {
        Self {
            provider: Arc::new(provider),
            executor: Arc::new(executor),
        }
    }

    /// `PATH` lookup on the real filesystem, real processes.
    pub fn local() -> Self {
        Self::new(SystemExecutableProvider::local(), SystemExecutor::new())
    }

    pub fn provider(&self) -> &dyn ExecutableProvider {
        self.provider.as_ref()
    }

    pub fn executable(&self, name: &str) -> Option<ExecutableLocation> {
        self.provider.executable(name)
    }

    /// Descriptor for the tool called `name`.
    ///
    /// Fails with [`ExecError::ToolNotFound`] before any process exists.
    pub fn task(&self, name: &str) -> Result<ProcessDescriptor, ExecError> {
        match self.provider.executable(name) {
            Some(location) => Ok(ProcessDescriptor::new(name, location)),
            None => Err(ExecError::ToolNotFound {
                tool: name.to_string(),
                searched: self.provider.searched_paths(),
            }),
        }
    }

    pub async fn launch(
        &self,
        descriptor: &mut ProcessDescriptor,
        wait: bool,
    ) -> Result<(), ExecError> {
        self.executor.launch(descriptor, wait).await
    }

    /// Launch, wait, and require a successful termination.
    pub async fn execute(&self, descriptor: &mut ProcessDescriptor) -> Result<(), ExecError> {
        self.executor.launch(descriptor, true).await?;
        descriptor.assert_success()
    }

    /// Run `name` with `arguments` and return its trimmed stdout.
    pub async fn output_of(
        &self,
        name: &str,
        arguments: impl Into<ArgumentList>,
    ) -> Result<String, ExecError> {
        let mut descriptor = self.task(name)?.with_arguments(arguments);
        descriptor.enable_output_capturing();
        self.execute(&mut descriptor).await?;
        Ok(descriptor.trimmed_output().unwrap_or_default())
    }
}

impl fmt::Debug for System {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("System")
            .field("provider", &self.provider)
            .field("executor", &self.executor)
            .finish()
    }
}
