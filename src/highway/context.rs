// src/highway/context.rs

use std::any::{Any, type_name};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use crate::exec::System;

use super::description::HighwayDescription;
use super::error::GraphError;
use super::key::TaskKey;

pub(crate) type TaskValue = Arc<dyn Any + Send + Sync>;

/// Last value returned by each task body, keyed by task name.
///
/// Clones share storage. A new value overwrites the previous one.
#[derive(Clone, Default)]
pub struct ResultStore {
    values: Arc<Mutex<HashMap<String, TaskValue>>>,
}

impl ResultStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn store(&self, task: &str, value: TaskValue) {
        let mut values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.insert(task.to_string(), value);
    }

    pub fn contains(&self, task: &str) -> bool {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        values.contains_key(task)
    }

    pub fn get<T>(&self, key: &TaskKey<T>) -> Result<T, GraphError>
    where
        T: Clone + 'static,
    {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        let value = values
            .get(key.name())
            .ok_or_else(|| GraphError::NoResult(key.name().to_string()))?;
        // Only reachable when two keys of different types share a name.
        value
            .downcast_ref::<T>()
            .cloned()
            .ok_or_else(|| GraphError::ResultTypeMismatch {
                task: key.name().to_string(),
                expected: type_name::<T>(),
            })
    }
}

impl fmt::Debug for ResultStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let values = self.values.lock().unwrap_or_else(|e| e.into_inner());
        let mut names: Vec<&String> = values.keys().collect();
        names.sort();
        f.debug_struct("ResultStore").field("tasks", &names).finish()
    }
}

/// Handle passed to every task body.
#[derive(Debug, Clone)]
pub struct TaskContext {
    system: System,
    results: ResultStore,
    descriptions: Arc<Vec<HighwayDescription>>,
}

impl TaskContext {
    pub(crate) fn new(
        system: System,
        results: ResultStore,
        descriptions: Vec<HighwayDescription>,
    ) -> Self {
        Self {
            system,
            results,
            descriptions: Arc::new(descriptions),
        }
    }

    /// Tool resolution and process execution.
    pub fn system(&self) -> &System {
        &self.system
    }

    /// Cached result of a task that already ran.
    pub fn result<T>(&self, key: &TaskKey<T>) -> Result<T, GraphError>
    where
        T: Clone + 'static,
    {
        self.results.get(key)
    }

    /// Every registered highway, in registration order.
    pub fn descriptions(&self) -> &[HighwayDescription] {
        &self.descriptions
    }
}
