// src/highway/key.rs

use std::borrow::Cow;
use std::fmt;
use std::marker::PhantomData;

/// Name of a task whose body produces a `T`.
///
/// Declaring keys as constants gives the closed set of tasks a program
/// knows about, and reading a cached result through the key yields a `T`
/// without any caller-side casting:
///
/// ```
/// use highway::highway::TaskKey;
///
/// const BUILD: TaskKey<String> = TaskKey::new("build");
/// assert_eq!(BUILD.name(), "build");
/// ```
pub struct TaskKey<T> {
    name: Cow<'static, str>,
    _result: PhantomData<fn() -> T>,
}

impl<T> TaskKey<T> {
    pub const fn new(name: &'static str) -> Self {
        Self {
            name: Cow::Borrowed(name),
            _result: PhantomData,
        }
    }

    /// Key for a name only known at runtime (e.g. from a config file).
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Cow::Owned(name.into()),
            _result: PhantomData,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Untyped handle, used in dependency lists.
    pub fn id(&self) -> TaskId {
        TaskId(self.name.clone())
    }
}

impl<T> Clone for TaskKey<T> {
    fn clone(&self) -> Self {
        Self {
            name: self.name.clone(),
            _result: PhantomData,
        }
    }
}

impl<T> fmt::Debug for TaskKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TaskKey")
            .field("name", &self.name)
            .field("result", &std::any::type_name::<T>())
            .finish()
    }
}

/// Untyped task name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(Cow<'static, str>);

impl TaskId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TaskId {
    fn from(name: &str) -> Self {
        TaskId(Cow::Owned(name.to_string()))
    }
}

impl From<String> for TaskId {
    fn from(name: String) -> Self {
        TaskId(Cow::Owned(name))
    }
}

impl<T> From<&TaskKey<T>> for TaskId {
    fn from(key: &TaskKey<T>) -> Self {
        key.id()
    }
}
