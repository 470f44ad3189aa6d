use crate::api::LivemarkApi;
use crate::config::LivemarkConfig;
use crate::store::fs_backend::FsBackend;
use std::path::PathBuf;
use tempfile::TempDir;

/// A livemark data directory that lives as long as the value.
pub struct TestEnv {
    // Dropping the TempDir removes the directory
    pub _temp_dir: TempDir,
    pub root: PathBuf,
}

impl Default for TestEnv {
    fn default() -> Self {
        Self::new()
    }
}

impl TestEnv {
    pub fn new() -> Self {
        let temp_dir = tempfile::tempdir().expect("failed to create temp dir");
        let root = temp_dir.path().to_path_buf();
        Self {
            _temp_dir: temp_dir,
            root,
        }
    }

    pub fn backend(&self) -> FsBackend {
        FsBackend::new(self.root.clone())
    }

    /// Open an API over this directory, the way the binary does on startup.
    pub fn open_api(&self) -> LivemarkApi<FsBackend> {
        let config = LivemarkConfig::load(&self.root).expect("failed to load config");
        LivemarkApi::open(self.backend(), config).expect("failed to open api")
    }
}
