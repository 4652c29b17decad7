//! [`TestTree`] fixture: a plaintext tree, a ciphertext tree and a registry
//! path inside one temporary directory.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// Temporary `plain/` and `secure/` directories plus a `registry.toml` path.
///
/// # Example
///
/// ```rust,no_run
/// use secdir_test_utils::tree::TestTree;
///
/// let tree = TestTree::new();
/// tree.write("notes/a.txt", "hello");
/// tree.init_parameters("alice@example.com", 0);
/// tree.assert_plain_contains("notes/a.txt", "hello");
/// ```
pub struct TestTree {
    temp_dir: TempDir,
}

impl Default for TestTree {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTree {
    /// Create the temporary directory with empty `plain/` and `secure/`.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        fs::create_dir(temp_dir.path().join("plain")).unwrap();
        fs::create_dir(temp_dir.path().join("secure")).unwrap();
        Self { temp_dir }
    }

    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn plaindir(&self) -> PathBuf {
        self.root().join("plain")
    }

    pub fn securedir(&self) -> PathBuf {
        self.root().join("secure")
    }

    pub fn registry_path(&self) -> PathBuf {
        self.root().join("registry.toml")
    }

    /// Write a registry store with complete parameters and no entries.
    ///
    /// Pass a `last_timestamp` in the future to make every registered file
    /// look unchanged.
    pub fn init_parameters(&self, public_id: &str, last_timestamp: i64) {
        let content = format!(
            "version = \"1.0\"\n\n[parameters]\nplaindir = {:?}\nsecuredir = {:?}\npublic_id = {:?}\nlast_timestamp = {}\n",
            self.plaindir().to_string_lossy(),
            self.securedir().to_string_lossy(),
            public_id,
            last_timestamp
        );
        fs::write(self.registry_path(), content).unwrap();
    }

    /// Write `content` to `path` under the plaintext tree, creating parents.
    pub fn write(&self, path: &str, content: &str) {
        let full_path = self.plaindir().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(full_path, content).unwrap();
    }

    /// Read a plaintext file.
    pub fn read(&self, path: &str) -> String {
        let full_path = self.plaindir().join(path);
        fs::read_to_string(&full_path)
            .unwrap_or_else(|_| panic!("Could not read file: {}", full_path.display()))
    }

    /// Set the modification time of a plaintext file `secs` into the past.
    pub fn backdate(&self, path: &str, secs: u64) {
        let full_path = self.plaindir().join(path);
        let file = fs::File::options().write(true).open(&full_path).unwrap();
        file.set_modified(SystemTime::now() - Duration::from_secs(secs))
            .unwrap();
    }

    /// Create a symlink at `path` under the plaintext tree pointing at `target`.
    #[cfg(unix)]
    pub fn symlink(&self, target: &str, path: &str) {
        let full_path = self.plaindir().join(path);
        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        std::os::unix::fs::symlink(target, full_path).unwrap();
    }

    /// Raw target of the symlink at `path` under the plaintext tree.
    pub fn link_target(&self, path: &str) -> String {
        fs::read_link(self.plaindir().join(path))
            .unwrap()
            .to_string_lossy()
            .into_owned()
    }

    /// Delete the whole plaintext tree and recreate it empty.
    pub fn wipe_plain(&self) {
        fs::remove_dir_all(self.plaindir()).unwrap();
        fs::create_dir(self.plaindir()).unwrap();
    }

    /// Names of all blobs in the ciphertext tree, sorted.
    pub fn blobs(&self) -> Vec<String> {
        let mut names: Vec<String> = fs::read_dir(self.securedir())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    /// Assert that `path` exists under the plaintext tree (links count even
    /// when dangling).
    pub fn assert_plain_exists(&self, path: &str) {
        let full_path = self.plaindir().join(path);
        assert!(
            full_path.symlink_metadata().is_ok(),
            "Expected entry to exist: {}",
            full_path.display()
        );
    }

    pub fn assert_plain_not_exists(&self, path: &str) {
        let full_path = self.plaindir().join(path);
        assert!(
            full_path.symlink_metadata().is_err(),
            "Expected entry NOT to exist: {}",
            full_path.display()
        );
    }

    /// Assert that the plaintext file at `path` contains `content`.
    pub fn assert_plain_contains(&self, path: &str, content: &str) {
        let file_content = self.read(path);
        assert!(
            file_content.contains(content),
            "File {path} does not contain expected content.\nExpected: {content}\nActual: {file_content}"
        );
    }
}
