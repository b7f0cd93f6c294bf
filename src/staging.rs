use crate::result::Result;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Temporary staging tree, removed on drop unless retained.
pub struct Staging {
    dir: Option<TempDir>,
    path: PathBuf,
    retain: bool,
}

impl Staging {
    /// Create a fresh, uniquely named `out-*-{suffix}` directory below `parent`.
    pub fn create(parent: &Path, suffix: &str, retain: bool) -> Result<Self> {
        std::fs::create_dir_all(parent)?;
        let dir = tempfile::Builder::new()
            .prefix("out-")
            .suffix(&format!("-{suffix}"))
            .tempdir_in(parent)?;
        let path = dir.path().to_path_buf();
        log::debug!("created staging directory {}", path.display());
        Ok(Self {
            dir: Some(dir),
            path,
            retain,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Absolute location of a package-relative path inside the tree.
    pub fn join(&self, relative: &str) -> PathBuf {
        self.path.join(relative)
    }

    pub fn is_retained(&self) -> bool {
        self.retain
    }
}

impl Drop for Staging {
    fn drop(&mut self) {
        let Some(dir) = self.dir.take() else {
            return;
        };
        if self.retain {
            let path = dir.keep();
            log::warn!("leaving staging directory {}", path.display());
        } else if let Err(e) = dir.close() {
            log::warn!("failed to remove staging directory {}: {e}", self.path.display());
        }
    }
}
