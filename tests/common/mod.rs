//! Common test utilities for Vendo integration tests

use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// A test project root for integration tests
pub struct TestProject {
    /// Temporary directory
    #[allow(dead_code)]
    pub temp: TempDir,
    /// Path to project root
    pub path: PathBuf,
}

impl TestProject {
    /// Create a new test project
    pub fn new() -> Self {
        let temp = TempDir::new().expect("Failed to create temp directory");
        let path = temp.path().to_path_buf();
        Self { temp, path }
    }

    /// Write a file in the project root
    pub fn write_file(&self, path: &str, content: &str) {
        let file_path = self.path.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write file");
    }

    /// Read a file from the project root
    #[allow(dead_code)]
    pub fn read_file(&self, path: &str) -> String {
        std::fs::read_to_string(self.path.join(path)).expect("Failed to read file")
    }

    /// Check if a file exists in the project root
    #[allow(dead_code)]
    pub fn file_exists(&self, path: &str) -> bool {
        self.path.join(path).exists()
    }
}

/// Create a local git repository with the given files committed and
/// return the commit SHA. Used as a source-install upstream.
#[allow(dead_code)]
pub fn fixture_repo(dir: &Path, files: &[(&str, &str)]) -> String {
    let repo = git2::Repository::init(dir).expect("Failed to init fixture repo");

    let mut index = repo.index().expect("Failed to open index");
    for (path, content) in files {
        let file_path = dir.join(path);
        if let Some(parent) = file_path.parent() {
            std::fs::create_dir_all(parent).expect("Failed to create parent directory");
        }
        std::fs::write(&file_path, content).expect("Failed to write fixture file");
        index
            .add_path(Path::new(path))
            .expect("Failed to add fixture file");
    }
    index.write().expect("Failed to write index");

    let tree_id = index.write_tree().expect("Failed to write tree");
    let tree = repo.find_tree(tree_id).expect("Failed to find tree");
    let sig = git2::Signature::now("vendo-tests", "tests@example.test")
        .expect("Failed to create signature");
    repo.commit(Some("HEAD"), &sig, &sig, "fixture", &tree, &[])
        .expect("Failed to commit")
        .to_string()
}
