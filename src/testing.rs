//! Shared test fixtures

use crate::config::Config;
use std::path::{Path, PathBuf};

/// Scratch directory under the system temp dir, removed on drop
///
/// Cleanup runs during unwinding too, so a failed assertion leaves nothing behind.
pub struct TempDir(PathBuf);

impl TempDir {
    /// Fresh directory named after the test; stale leftovers are wiped first
    pub fn new(name: &str) -> Self {
        let path =
            std::env::temp_dir().join(format!("spa-fallback-{name}-{}", std::process::id()));
        std::fs::remove_dir_all(&path).ok();
        std::fs::create_dir_all(&path).unwrap();
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }

    /// Write `contents` to `relative`, creating parent directories
    pub fn file(&self, relative: &str, contents: &str) -> &Self {
        let target = self.0.join(relative);
        if let Some(parent) = target.parent() {
            std::fs::create_dir_all(parent).unwrap();
        }
        std::fs::write(target, contents).unwrap();
        self
    }

    /// Default configuration serving this directory, access log off
    pub fn config(&self) -> Config {
        let mut config = Config::load_from("does-not-exist/spa-fallback").unwrap();
        config.spa.root = self.0.to_string_lossy().into_owned();
        config.logging.access_log = false;
        config
    }
}

impl Drop for TempDir {
    fn drop(&mut self) {
        std::fs::remove_dir_all(&self.0).ok();
    }
}
