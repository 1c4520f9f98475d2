// src/highway/graph.rs

//! Task registry and the depth-first executor.
//!
//! Per top-level run the executor goes through
//! `Resolving -> RunningDependencies -> RunningBody -> Done | Failed`:
//! the task is looked up, every declared dependency is looked up (an unknown
//! one fails the run before anything executes at that level), dependencies
//! run in declaration order, and finally the body runs and its value is
//! cached. Bodies never run concurrently with each other.

use std::collections::{HashMap, HashSet};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use petgraph::algo::toposort;
use petgraph::graphmap::DiGraphMap;
use tracing::{debug, info, warn};

use crate::args::ArgumentList;
use crate::errors::HighwayError;
use crate::exec::System;
use crate::types::DependencyPolicy;

use super::context::{ResultStore, TaskContext, TaskValue};
use super::description::HighwayDescription;
use super::error::GraphError;
use super::invocation::Invocation;
use super::key::{TaskId, TaskKey};
use super::reporter::{ErrorReporter, StderrReporter};

type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

type Body = Arc<dyn Fn(Invocation, TaskContext) -> BoxFuture<'static, anyhow::Result<TaskValue>> + Send + Sync>;

type EmptyHandler = Arc<dyn Fn(TaskContext) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

type UnrecognizedHandler =
    Arc<dyn Fn(String, ArgumentList, TaskContext) -> BoxFuture<'static, anyhow::Result<()>> + Send + Sync>;

struct TaskNode {
    name: String,
    usage: Option<String>,
    dependencies: Vec<TaskId>,
    body: Body,
}

/// Overall result of [`Highway::go`], mapped to the process exit code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Success,
    Failure,
}

impl RunStatus {
    pub fn exit_code(self) -> i32 {
        match self {
            RunStatus::Success => 0,
            RunStatus::Failure => 1,
        }
    }
}

/// Bookkeeping for one top-level run under [`DependencyPolicy::RunOnce`].
#[derive(Default)]
struct Walk {
    completed: HashSet<String>,
    stack: Vec<String>,
}

/// Registry of named tasks plus everything needed to run them.
pub struct Highway {
    nodes: Vec<TaskNode>,
    index: HashMap<String, usize>,
    system: System,
    reporter: Arc<dyn ErrorReporter>,
    results: ResultStore,
    policy: DependencyPolicy,
    on_empty: Option<EmptyHandler>,
    on_unrecognized: Option<UnrecognizedHandler>,
}

impl Highway {
    /// Empty registry reporting errors to `reporter`.
    ///
    /// The empty-invocation handler defaults to doing nothing; there is no
    /// unrecognized-command handler until one is set.
    pub fn new(system: System, reporter: Arc<dyn ErrorReporter>) -> Self {
        let mut highway = Self {
            nodes: Vec::new(),
            index: HashMap::new(),
            system,
            reporter,
            results: ResultStore::new(),
            policy: DependencyPolicy::default(),
            on_empty: None,
            on_unrecognized: None,
        };
        highway.on_empty(|_| async { Ok(()) });
        highway
    }

    /// Local system, errors to stderr.
    pub fn local() -> Self {
        Self::new(System::local(), Arc::new(StderrReporter::new()))
    }

    pub fn with_policy(mut self, policy: DependencyPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn set_policy(&mut self, policy: DependencyPolicy) {
        self.policy = policy;
    }

    pub fn policy(&self) -> DependencyPolicy {
        self.policy
    }

    pub fn system(&self) -> &System {
        &self.system
    }

    /// Register (or replace) the task named by `key`.
    ///
    /// A later definition with the same name replaces the earlier one but
    /// keeps its position in [`Highway::description`].
    pub fn define<T, I, F, Fut>(&mut self, key: &TaskKey<T>, usage: &str, dependencies: I, body: F)
    where
        T: Send + Sync + 'static,
        I: IntoIterator<Item = TaskId>,
        F: Fn(Invocation, TaskContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<T>> + Send + 'static,
    {
        let body: Body = Arc::new(move |invocation, cx| {
            let fut = body(invocation, cx);
            Box::pin(async move {
                let value = fut.await?;
                Ok(Arc::new(value) as TaskValue)
            })
        });
        let node = TaskNode {
            name: key.name().to_string(),
            usage: (!usage.is_empty()).then(|| usage.to_string()),
            dependencies: dependencies.into_iter().collect(),
            body,
        };

        match self.index.get(&node.name) {
            Some(&i) => {
                debug!(task = %node.name, "replacing existing highway definition");
                self.nodes[i] = node;
            }
            None => {
                self.index.insert(node.name.clone(), self.nodes.len());
                self.nodes.push(node);
            }
        }
    }

    /// Handler run when no task is selected.
    pub fn on_empty<F, Fut>(&mut self, handler: F)
    where
        F: Fn(TaskContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.on_empty = Some(Arc::new(move |cx| Box::pin(handler(cx))));
    }

    /// Without an empty handler an empty invocation is reported as an error.
    pub fn clear_empty_handler(&mut self) {
        self.on_empty = None;
    }

    /// Fallback for task names that are not registered. Receives the
    /// requested name and the residual arguments.
    pub fn on_unrecognized<F, Fut>(&mut self, handler: F)
    where
        F: Fn(String, ArgumentList, TaskContext) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.on_unrecognized = Some(Arc::new(move |name, args, cx| Box::pin(handler(name, args, cx))));
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// `{name, usage}` of every task in registration order.
    pub fn description(&self) -> Vec<HighwayDescription> {
        self.nodes
            .iter()
            .map(|n| HighwayDescription::new(n.name.clone(), n.usage.clone()))
            .collect()
    }

    /// Cached result of the last run of `key`'s task.
    pub fn result<T>(&self, key: &TaskKey<T>) -> Result<T, GraphError>
    where
        T: Clone + 'static,
    {
        self.results.get(key)
    }

    pub fn context(&self) -> TaskContext {
        TaskContext::new(self.system.clone(), self.results.clone(), self.description())
    }

    /// Check every dependency exists and that the graph has no cycle,
    /// without running anything.
    pub fn validate(&self) -> Result<(), GraphError> {
        for node in &self.nodes {
            self.resolve_dependencies(node)?;
        }

        // Edge direction: dependency -> dependent.
        let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
        for node in &self.nodes {
            graph.add_node(node.name.as_str());
            for dep in &node.dependencies {
                graph.add_edge(dep.as_str(), node.name.as_str(), ());
            }
        }

        match toposort(&graph, None) {
            Ok(_) => Ok(()),
            Err(cycle) => Err(GraphError::Cycle(format!("involving '{}'", cycle.node_id()))),
        }
    }

    /// Run `name` and its dependencies.
    ///
    /// An unregistered `name` yields [`GraphError::UnrecognizedCommand`]
    /// without reporting, so callers can fall back. Every other error is
    /// passed to the reporter once and then returned.
    pub async fn run(&self, name: &str, invocation: &Invocation) -> Result<(), HighwayError> {
        let Some(node) = self.node(name) else {
            return Err(GraphError::UnrecognizedCommand(name.to_string()).into());
        };

        let cx = self.context();
        let mut walk = Walk::default();
        match self.run_node(node, invocation, &cx, &mut walk).await {
            Ok(()) => Ok(()),
            Err(err) => {
                self.reporter.report(&err);
                Err(err)
            }
        }
    }

    /// Dispatch a full invocation: empty handler, task run, or the
    /// unrecognized-command fallback.
    pub async fn go(&self, invocation: &Invocation) -> RunStatus {
        let cx = self.context();

        let Some(name) = invocation.highway() else {
            return match &self.on_empty {
                Some(handler) => self.report_outcome(handler(cx).await.map_err(HighwayError::Other)),
                None => self.report_outcome(Err(HighwayError::NoEmptyHandler)),
            };
        };

        match self.run(name, invocation).await {
            Ok(()) => RunStatus::Success,
            Err(HighwayError::Graph(GraphError::UnrecognizedCommand(command))) => {
                match &self.on_unrecognized {
                    Some(handler) => {
                        info!(command = %command, "forwarding unrecognized command to fallback");
                        let outcome = handler(command, invocation.arguments().clone(), cx).await;
                        self.report_outcome(outcome.map_err(HighwayError::Other))
                    }
                    None => self.report_outcome(Err(GraphError::UnrecognizedCommand(command).into())),
                }
            }
            // Already reported by `run`.
            Err(_) => RunStatus::Failure,
        }
    }

    fn report_outcome(&self, outcome: Result<(), HighwayError>) -> RunStatus {
        match outcome {
            Ok(()) => RunStatus::Success,
            Err(err) => {
                self.reporter.report(&err);
                RunStatus::Failure
            }
        }
    }

    fn node(&self, name: &str) -> Option<&TaskNode> {
        self.index.get(name).map(|&i| &self.nodes[i])
    }

    fn resolve_dependencies(&self, node: &TaskNode) -> Result<Vec<&TaskNode>, GraphError> {
        node.dependencies
            .iter()
            .map(|dep| {
                self.node(dep.as_str())
                    .ok_or_else(|| GraphError::UnknownDependency {
                        task: node.name.clone(),
                        dependency: dep.to_string(),
                    })
            })
            .collect()
    }

    fn run_node<'a>(
        &'a self,
        node: &'a TaskNode,
        invocation: &'a Invocation,
        cx: &'a TaskContext,
        walk: &'a mut Walk,
    ) -> BoxFuture<'a, Result<(), HighwayError>> {
        Box::pin(async move {
            let once = self.policy == DependencyPolicy::RunOnce;
            if once {
                if walk.completed.contains(&node.name) {
                    debug!(task = %node.name, "already ran in this invocation; skipping");
                    return Ok(());
                }
                if walk.stack.contains(&node.name) {
                    let mut path = walk.stack.clone();
                    path.push(node.name.clone());
                    return Err(GraphError::Cycle(path.join(" -> ")).into());
                }
                walk.stack.push(node.name.clone());
            }

            let dependencies = self.resolve_dependencies(node)?;
            if !dependencies.is_empty() {
                debug!(
                    task = %node.name,
                    dependencies = ?node.dependencies.iter().map(|d| d.as_str()).collect::<Vec<_>>(),
                    "running dependencies"
                );
            }
            for dependency in dependencies {
                self.run_node(dependency, invocation, cx, walk).await?;
            }

            info!(task = %node.name, "running highway");
            let task_invocation = Invocation::new(
                Some(node.name.clone()),
                invocation.arguments().clone(),
                invocation.is_verbose(),
            );
            let value = (node.body)(task_invocation, cx.clone())
                .await
                .map_err(|source| {
                    warn!(task = %node.name, error = %source, "highway body failed");
                    HighwayError::TaskFailed {
                        task: node.name.clone(),
                        source,
                    }
                })?;
            self.results.store(&node.name, value);
            debug!(task = %node.name, "highway finished");

            if once {
                walk.stack.pop();
                walk.completed.insert(node.name.clone());
            }
            Ok(())
        })
    }
}

impl std::fmt::Debug for Highway {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Highway")
            .field("tasks", &self.nodes.iter().map(|n| n.name.as_str()).collect::<Vec<_>>())
            .field("policy", &self.policy)
            .field("results", &self.results)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use crate::exec::{ProviderChain, SystemExecutor};

    const A: TaskKey<()> = TaskKey::new("a");
    const B: TaskKey<()> = TaskKey::new("b");

    fn highway() -> Highway {
        let system = System::new(ProviderChain::new(), SystemExecutor::new());
        Highway::new(system, Arc::new(|_: &HighwayError| {}))
    }

    #[tokio::test]
    async fn redefinition_keeps_position_and_replaces_body() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut hw = highway();

        let log = calls.clone();
        hw.define(&A, "first", [], move |_, _| {
            let log = log.clone();
            async move {
                log.lock().unwrap().push("old");
                Ok(())
            }
        });
        hw.define(&B, "", [], |_, _| async { Ok(()) });
        let log = calls.clone();
        hw.define(&A, "second", [], move |_, _| {
            let log = log.clone();
            async move {
                log.lock().unwrap().push("new");
                Ok(())
            }
        });

        let description = hw.description();
        assert_eq!(description.len(), 2);
        assert_eq!(description[0].name, "a");
        assert_eq!(description[0].usage.as_deref(), Some("second"));
        assert_eq!(description[1].usage, None);

        hw.run("a", &Invocation::of("a")).await.unwrap();
        assert_eq!(*calls.lock().unwrap(), vec!["new"]);
    }

    #[test]
    fn validate_finds_cycles_and_unknown_dependencies() {
        let mut hw = highway();
        hw.define(&A, "", [B.id()], |_, _| async { Ok(()) });
        assert_eq!(
            hw.validate(),
            Err(GraphError::UnknownDependency {
                task: "a".to_string(),
                dependency: "b".to_string(),
            })
        );

        hw.define(&B, "", [A.id()], |_, _| async { Ok(()) });
        assert!(matches!(hw.validate(), Err(GraphError::Cycle(_))));
    }

    #[test]
    fn exit_codes() {
        assert_eq!(RunStatus::Success.exit_code(), 0);
        assert_eq!(RunStatus::Failure.exit_code(), 1);
    }
}
