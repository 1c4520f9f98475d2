// src/args.rs

//! Argument model shared by the process layer and the task graph.
//!
//! An [`ArgumentList`] is an ordered list of [`Argument`]s. Every argument has
//! two renderings:
//! - the literal value handed to the child process (`process_value`)
//! - a loggable value (`loggable_value`), which for [`SecureString`]s is a
//!   fixed mask so secrets never end up in logs or diagnostics.
//!
//! Empty literals are dropped on insertion, so optional flags can be appended
//! unconditionally.

use std::fmt;
use std::ops::{Add, AddAssign};

/// Mask rendered in place of a secure argument.
///
/// The loggable form of a secure argument is always exactly this string.
/// A secret that happens to be a substring of the mask (`"act"`, `"d"`)
/// still appears inside it; only whole-argument replacement is guaranteed.
pub const REDACTED: &str = "<redacted>";

/// A value that must be passed to a process verbatim but never logged.
#[derive(Clone, PartialEq, Eq)]
pub struct SecureString(String);

impl SecureString {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// The literal secret. Only the process layer should need this.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SecureString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("SecureString").field(&REDACTED).finish()
    }
}

/// One element of a process argument vector.
#[derive(Debug, Clone)]
pub enum Argument {
    Plain(String),
    Secure(SecureString),
}

impl Argument {
    pub fn secure(value: impl Into<String>) -> Self {
        Argument::Secure(SecureString::new(value))
    }

    /// Literal value passed to the child process.
    pub fn process_value(&self) -> &str {
        match self {
            Argument::Plain(value) => value,
            Argument::Secure(secret) => secret.expose(),
        }
    }

    /// Value that is safe to write to logs.
    pub fn loggable_value(&self) -> &str {
        match self {
            Argument::Plain(value) => value,
            Argument::Secure(_) => REDACTED,
        }
    }

    pub fn is_secure(&self) -> bool {
        matches!(self, Argument::Secure(_))
    }
}

/// Arguments compare by their literal values, regardless of how they log.
impl PartialEq for Argument {
    fn eq(&self, other: &Self) -> bool {
        self.process_value() == other.process_value()
    }
}

impl Eq for Argument {}

impl From<&str> for Argument {
    fn from(value: &str) -> Self {
        Argument::Plain(value.to_string())
    }
}

impl From<String> for Argument {
    fn from(value: String) -> Self {
        Argument::Plain(value)
    }
}

impl From<SecureString> for Argument {
    fn from(value: SecureString) -> Self {
        Argument::Secure(value)
    }
}

/// Anything that can contribute arguments to a command line.
///
/// Option structs of tool wrappers implement this so they can be appended to
/// an [`ArgumentList`] directly. Returning `None` contributes nothing.
pub trait ArgumentsConvertible {
    fn arguments(&self) -> Option<ArgumentList>;
}

/// Ordered, redaction-aware argument list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentList {
    all: Vec<Argument>,
}

impl ArgumentList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a list from plain literals, dropping empty ones.
    pub fn from_literals<I, S>(literals: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list = Self::new();
        list.append_all(literals);
        list
    }

    /// Concatenate several lists, preserving order.
    pub fn joined<I>(lists: I) -> Self
    where
        I: IntoIterator<Item = ArgumentList>,
    {
        let mut list = Self::new();
        for other in lists {
            list.append_list(other);
        }
        list
    }

    pub fn len(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.all.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Argument> {
        self.all.iter()
    }

    pub fn first(&self) -> Option<&Argument> {
        self.all.first()
    }

    /// Append a single argument unless its literal value is empty.
    pub fn push(&mut self, argument: impl Into<Argument>) {
        let argument = argument.into();
        if !argument.process_value().is_empty() {
            self.all.push(argument);
        }
    }

    pub fn append(&mut self, literal: impl Into<String>) {
        self.push(Argument::Plain(literal.into()));
    }

    pub fn append_all<I, S>(&mut self, literals: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        for literal in literals {
            self.append(literal);
        }
    }

    pub fn append_secure(&mut self, value: impl Into<String>) {
        self.push(Argument::secure(value));
    }

    pub fn append_list(&mut self, other: ArgumentList) {
        for argument in other.all {
            self.push(argument);
        }
    }

    pub fn append_convertible(&mut self, convertible: &dyn ArgumentsConvertible) {
        if let Some(other) = convertible.arguments() {
            self.append_list(other);
        }
    }

    /// Literal values, used verbatim as the child's argv (after the program).
    pub fn process_values(&self) -> Vec<String> {
        self.all.iter().map(|a| a.process_value().to_string()).collect()
    }

    /// Loggable values with secure arguments masked.
    pub fn loggable(&self) -> Vec<String> {
        self.all.iter().map(|a| a.loggable_value().to_string()).collect()
    }

    pub fn contains(&self, literal: &str) -> bool {
        self.all.iter().any(|a| a.process_value() == literal)
    }

    /// Everything but the first argument.
    pub fn remaining(&self) -> ArgumentList {
        Self {
            all: self.all.iter().skip(1).cloned().collect(),
        }
    }
}

impl fmt::Display for ArgumentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.loggable().join(" "))
    }
}

impl<'a> IntoIterator for &'a ArgumentList {
    type Item = &'a Argument;
    type IntoIter = std::slice::Iter<'a, Argument>;

    fn into_iter(self) -> Self::IntoIter {
        self.all.iter()
    }
}

impl<A: Into<Argument>> FromIterator<A> for ArgumentList {
    fn from_iter<T: IntoIterator<Item = A>>(iter: T) -> Self {
        let mut list = Self::new();
        for argument in iter {
            list.push(argument);
        }
        list
    }
}

impl<A: Into<Argument>> Extend<A> for ArgumentList {
    fn extend<T: IntoIterator<Item = A>>(&mut self, iter: T) {
        for argument in iter {
            self.push(argument);
        }
    }
}

impl From<Vec<String>> for ArgumentList {
    fn from(values: Vec<String>) -> Self {
        Self::from_literals(values)
    }
}

impl From<&[&str]> for ArgumentList {
    fn from(values: &[&str]) -> Self {
        Self::from_literals(values.iter().copied())
    }
}

impl<const N: usize> From<[&str; N]> for ArgumentList {
    fn from(values: [&str; N]) -> Self {
        Self::from_literals(values)
    }
}

impl ArgumentsConvertible for ArgumentList {
    fn arguments(&self) -> Option<ArgumentList> {
        Some(self.clone())
    }
}

impl AddAssign<ArgumentList> for ArgumentList {
    fn add_assign(&mut self, rhs: ArgumentList) {
        self.append_list(rhs);
    }
}

impl AddAssign<&str> for ArgumentList {
    fn add_assign(&mut self, rhs: &str) {
        self.append(rhs);
    }
}

impl AddAssign<String> for ArgumentList {
    fn add_assign(&mut self, rhs: String) {
        self.append(rhs);
    }
}

impl AddAssign<Vec<String>> for ArgumentList {
    fn add_assign(&mut self, rhs: Vec<String>) {
        self.append_all(rhs);
    }
}

impl AddAssign<&dyn ArgumentsConvertible> for ArgumentList {
    fn add_assign(&mut self, rhs: &dyn ArgumentsConvertible) {
        self.append_convertible(rhs);
    }
}

impl Add<ArgumentList> for ArgumentList {
    type Output = ArgumentList;

    fn add(mut self, rhs: ArgumentList) -> Self::Output {
        self += rhs;
        self
    }
}

impl Add<&str> for ArgumentList {
    type Output = ArgumentList;

    fn add(mut self, rhs: &str) -> Self::Output {
        self += rhs;
        self
    }
}

impl Add<&dyn ArgumentsConvertible> for ArgumentList {
    type Output = ArgumentList;

    fn add(mut self, rhs: &dyn ArgumentsConvertible) -> Self::Output {
        self += rhs;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Verbosity(bool);

    impl ArgumentsConvertible for Verbosity {
        fn arguments(&self) -> Option<ArgumentList> {
            self.0.then(|| ArgumentList::from(["--verbose"]))
        }
    }

    #[test]
    fn empty_literals_are_dropped() {
        assert_eq!(
            ArgumentList::from(["hello", "", "world"]),
            ArgumentList::from(["hello", "world"])
        );

        let mut args = ArgumentList::new();
        args += "Hello";
        args += "";
        args += "World";
        args.append_secure("");
        assert_eq!(args.process_values(), vec!["Hello", "World"]);
    }

    #[test]
    fn equal_length_lists_with_different_values_differ() {
        assert_ne!(ArgumentList::from(["a", "b"]), ArgumentList::from(["a", "c"]));
        assert_ne!(ArgumentList::from(["a"]), ArgumentList::from(["a", "b"]));
    }

    #[test]
    fn secure_arguments_are_masked_in_logs_only() {
        let mut args = ArgumentList::from(["-p"]);
        args.append_secure("hunter2");

        assert_eq!(args.process_values(), vec!["-p", "hunter2"]);
        assert_eq!(args.loggable(), vec!["-p", REDACTED]);
        assert_eq!(args.to_string(), format!("-p {REDACTED}"));
        assert!(!format!("{args:?}").contains("hunter2"));
    }

    #[test]
    fn convertibles_append_when_they_produce_arguments() {
        let base = ArgumentList::from(["build"]);
        let on: &dyn ArgumentsConvertible = &Verbosity(true);
        let off: &dyn ArgumentsConvertible = &Verbosity(false);

        assert_eq!((base.clone() + on).process_values(), vec!["build", "--verbose"]);
        assert_eq!((base + off).process_values(), vec!["build"]);
    }

    #[test]
    fn remaining_and_contains() {
        let args = ArgumentList::from(["release", "--dry-run"]);
        assert!(args.contains("--dry-run"));
        assert!(!args.contains("release2"));
        assert_eq!(args.remaining().process_values(), vec!["--dry-run"]);
        assert!(ArgumentList::new().remaining().is_empty());
    }

    #[test]
    fn joined_preserves_order() {
        let list = ArgumentList::joined(vec![
            ArgumentList::from(["a"]),
            ArgumentList::new(),
            ArgumentList::from(["b", "c"]),
        ]);
        assert_eq!(list.process_values(), vec!["a", "b", "c"]);
    }
}
