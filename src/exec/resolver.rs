// src/exec/resolver.rs

//! Executable resolution.
//!
//! A provider answers "where is the tool called `name`?". Providers compose
//! into a [`ProviderChain`] where the first provider returning a location
//! wins. Nothing is cached: every lookup touches the filesystem again.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::trace;

use crate::fs::{FileSystem, RealFileSystem};

/// Absolute path to an invocable binary.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ExecutableLocation(PathBuf);

impl ExecutableLocation {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl fmt::Display for ExecutableLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.display())
    }
}

/// Maps logical tool names to executable locations.
pub trait ExecutableProvider: Send + Sync + fmt::Debug {
    fn executable(&self, name: &str) -> Option<ExecutableLocation>;

    /// Directories this provider looks in, for "not found" diagnostics.
    fn searched_paths(&self) -> Vec<PathBuf> {
        Vec::new()
    }
}

/// Ordered group of providers. The first match wins.
#[derive(Debug, Default)]
pub struct ProviderChain {
    providers: Vec<Box<dyn ExecutableProvider>>,
}

impl ProviderChain {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, provider: impl ExecutableProvider + 'static) {
        self.providers.push(Box::new(provider));
    }

    pub fn with(mut self, provider: impl ExecutableProvider + 'static) -> Self {
        self.add(provider);
        self
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl ExecutableProvider for ProviderChain {
    fn executable(&self, name: &str) -> Option<ExecutableLocation> {
        self.providers.iter().find_map(|p| p.executable(name))
    }

    fn searched_paths(&self) -> Vec<PathBuf> {
        self.providers.iter().flat_map(|p| p.searched_paths()).collect()
    }
}

/// Looks for a regular file literally named `name` in each search directory.
#[derive(Debug, Clone)]
pub struct SearchPathsProvider {
    search_paths: Vec<PathBuf>,
    fs: Arc<dyn FileSystem>,
}

impl SearchPathsProvider {
    pub fn new(search_paths: Vec<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self { search_paths, fs }
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        &self.search_paths
    }
}

impl ExecutableProvider for SearchPathsProvider {
    fn executable(&self, name: &str) -> Option<ExecutableLocation> {
        if !is_plain_file_name(name) {
            return None;
        }
        for dir in &self.search_paths {
            let candidate = dir.join(name);
            if self.fs.is_file(&candidate) {
                trace!(tool = name, path = %candidate.display(), "resolved executable");
                return Some(ExecutableLocation::new(candidate));
            }
        }
        None
    }

    fn searched_paths(&self) -> Vec<PathBuf> {
        self.search_paths.clone()
    }
}

/// Fixed name → location table, e.g. tools living in a vendor directory that
/// is not on `PATH`. A location only resolves while the file exists.
#[derive(Debug, Clone)]
pub struct FixedLocationsProvider {
    locations: BTreeMap<String, PathBuf>,
    fs: Arc<dyn FileSystem>,
}

impl FixedLocationsProvider {
    pub fn new(locations: BTreeMap<String, PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self { locations, fs }
    }
}

impl ExecutableProvider for FixedLocationsProvider {
    fn executable(&self, name: &str) -> Option<ExecutableLocation> {
        let path = self.locations.get(name)?;
        self.fs
            .is_file(path)
            .then(|| ExecutableLocation::new(path.clone()))
    }
}

/// Parsed `PATH`-style variable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PathEnvironment {
    pub raw: Option<String>,
    pub directories: Vec<PathBuf>,
}

impl PathEnvironment {
    /// Parse a `PATH` value. Relative entries are anchored at `cwd`, empty
    /// entries are skipped.
    pub fn parse(raw: Option<&OsStr>, cwd: &Path) -> Self {
        let directories = match raw {
            Some(value) => std::env::split_paths(value)
                .filter(|p| !p.as_os_str().is_empty())
                .map(|p| if p.is_absolute() { p } else { cwd.join(p) })
                .collect(),
            None => Vec::new(),
        };
        Self {
            raw: raw.map(|v| v.to_string_lossy().into_owned()),
            directories,
        }
    }

    pub fn from_env() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("/"));
        Self::parse(std::env::var_os("PATH").as_deref(), &cwd)
    }
}

/// The production provider: additional providers first (in the order they
/// were added), then the configured search directories.
#[derive(Debug)]
pub struct SystemExecutableProvider {
    chain: ProviderChain,
    search: SearchPathsProvider,
}

impl SystemExecutableProvider {
    pub fn new(search_paths: Vec<PathBuf>, fs: Arc<dyn FileSystem>) -> Self {
        Self {
            chain: ProviderChain::new(),
            search: SearchPathsProvider::new(search_paths, fs),
        }
    }

    /// Search the current process's `PATH` on the real filesystem.
    pub fn local() -> Self {
        Self::new(PathEnvironment::from_env().directories, Arc::new(RealFileSystem))
    }

    /// Register a provider consulted before the search directories.
    pub fn add(&mut self, provider: impl ExecutableProvider + 'static) {
        self.chain.add(provider);
    }

    pub fn search_paths(&self) -> &[PathBuf] {
        self.search.search_paths()
    }
}

impl ExecutableProvider for SystemExecutableProvider {
    fn executable(&self, name: &str) -> Option<ExecutableLocation> {
        self.chain
            .executable(name)
            .or_else(|| self.search.executable(name))
    }

    fn searched_paths(&self) -> Vec<PathBuf> {
        let mut paths = self.chain.searched_paths();
        paths.extend(self.search.searched_paths());
        paths
    }
}

fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && Path::new(name).file_name() == Some(OsStr::new(name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fs::mock::MockFileSystem;

    fn mock_fs() -> Arc<MockFileSystem> {
        let fs = MockFileSystem::new();
        fs.add_file("/usr/local/bin/git", b"new git");
        fs.add_file("/usr/bin/git", b"old git");
        fs.add_file("/usr/bin/sh", b"sh");
        fs.add_file("/usr/bin/tools/helper", b"nested");
        Arc::new(fs)
    }

    #[test]
    fn first_search_path_wins() {
        let fs = mock_fs();
        let provider = SearchPathsProvider::new(
            vec![PathBuf::from("/usr/local/bin"), PathBuf::from("/usr/bin")],
            fs,
        );

        assert_eq!(
            provider.executable("git"),
            Some(ExecutableLocation::new("/usr/local/bin/git"))
        );
        assert_eq!(
            provider.executable("sh"),
            Some(ExecutableLocation::new("/usr/bin/sh"))
        );
        assert_eq!(provider.executable("doesnotexist123"), None);
    }

    #[test]
    fn directories_and_paths_are_not_executables() {
        let provider = SearchPathsProvider::new(vec![PathBuf::from("/usr")], mock_fs());
        assert_eq!(provider.executable("bin"), None);

        let provider = SearchPathsProvider::new(vec![PathBuf::from("/usr/bin")], mock_fs());
        assert_eq!(provider.executable("tools/helper"), None);
        assert_eq!(provider.executable(""), None);
    }

    #[test]
    fn chains_compose_transparently() {
        let fs = mock_fs();
        let mut locations = BTreeMap::new();
        locations.insert("git".to_string(), PathBuf::from("/usr/bin/git"));
        locations.insert("missing".to_string(), PathBuf::from("/nowhere/missing"));

        let inner = ProviderChain::new()
            .with(FixedLocationsProvider::new(locations, fs.clone()))
            .with(SearchPathsProvider::new(vec![PathBuf::from("/usr/local/bin")], fs.clone()));
        let outer = ProviderChain::new().with(inner);

        assert_eq!(outer.executable("git"), Some(ExecutableLocation::new("/usr/bin/git")));
        assert_eq!(outer.executable("missing"), None);
        assert_eq!(outer.searched_paths(), vec![PathBuf::from("/usr/local/bin")]);
    }

    #[test]
    fn system_provider_prefers_added_providers() {
        let fs = mock_fs();
        let mut system = SystemExecutableProvider::new(vec![PathBuf::from("/usr/local/bin")], fs.clone());
        assert_eq!(
            system.executable("git"),
            Some(ExecutableLocation::new("/usr/local/bin/git"))
        );

        let mut locations = BTreeMap::new();
        locations.insert("git".to_string(), PathBuf::from("/usr/bin/git"));
        system.add(FixedLocationsProvider::new(locations, fs));
        assert_eq!(
            system.executable("git"),
            Some(ExecutableLocation::new("/usr/bin/git"))
        );
    }

    #[test]
    fn path_environment_parsing() {
        let raw = std::env::join_paths(["/usr/bin", "", "bin", "/opt/x"]).unwrap();
        let env = PathEnvironment::parse(Some(&raw), Path::new("/home/me"));
        assert_eq!(
            env.directories,
            vec![
                PathBuf::from("/usr/bin"),
                PathBuf::from("/home/me/bin"),
                PathBuf::from("/opt/x"),
            ]
        );

        assert!(PathEnvironment::parse(None, Path::new("/")).directories.is_empty());
    }
}
