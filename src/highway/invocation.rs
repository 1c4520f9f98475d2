// src/highway/invocation.rs

use crate::args::ArgumentList;

/// Which task was requested, with which residual arguments.
///
/// Built once per process run from the command line; bodies receive a fresh
/// copy naming their own task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Invocation {
    highway: Option<String>,
    arguments: ArgumentList,
    verbose: bool,
}

impl Invocation {
    pub fn new(highway: Option<String>, arguments: ArgumentList, verbose: bool) -> Self {
        Self {
            highway: highway.filter(|name| !name.is_empty()),
            arguments,
            verbose,
        }
    }

    /// Invocation selecting `name` with no residual arguments.
    pub fn of(name: impl Into<String>) -> Self {
        Self::new(Some(name.into()), ArgumentList::new(), false)
    }

    pub fn with_arguments(mut self, arguments: impl Into<ArgumentList>) -> Self {
        self.arguments = arguments.into();
        self
    }

    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }

    pub fn highway(&self) -> Option<&str> {
        self.highway.as_deref()
    }

    pub fn arguments(&self) -> &ArgumentList {
        &self.arguments
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// No task selected.
    pub fn is_empty(&self) -> bool {
        self.highway.is_none()
    }
}
