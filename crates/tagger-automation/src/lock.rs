//! Profile-in-use detection.

use std::path::{Path, PathBuf};

/// Chrome's `SingletonLock` marker inside a profile directory.
///
/// On Linux and macOS the marker is a symlink to `host-pid` that dangles
/// once read from another mount namespace, so presence is tested without
/// following it.
#[derive(Debug, Clone)]
pub struct SessionLock {
    path: PathBuf,
}

impl SessionLock {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Lock for the given profile directory.
    pub fn for_profile(profile_dir: &Path) -> Self {
        Self::new(profile_dir.join("SingletonLock"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether another browser currently owns the profile.
    pub fn is_held(&self) -> bool {
        std::fs::symlink_metadata(&self.path).is_ok()
    }

    /// `host-pid` of the owner, when the marker is a symlink.
    pub fn holder(&self) -> Option<String> {
        std::fs::read_link(&self.path)
            .ok()
            .map(|target| target.to_string_lossy().into_owned())
    }
}
