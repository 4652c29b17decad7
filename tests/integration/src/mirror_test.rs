//! End-to-end mirror test
//!
//! Drives the library through the full cycle the CLI performs: init the
//! registry, encrypt a plaintext tree, lose it, and restore it from the
//! ciphertext tree.

use pretty_assertions::assert_eq;
use secdir_core::{
    DecryptEngine, EncryptEngine, ErrorKind, ParameterOverrides, Registry, RunConfig,
    StoredParameters,
};
use secdir_test_utils::{FakeCipher, TestTree};
use std::fs;

const ALICE: &str = "alice@example.com";
const PASSPHRASE: &str = "correct horse";

fn init(tree: &TestTree) {
    let parameters = StoredParameters {
        plaindir: Some(tree.plaindir().to_string_lossy().into_owned()),
        securedir: Some(tree.securedir().to_string_lossy().into_owned()),
        public_id: Some(ALICE.to_string()),
        ..Default::default()
    };
    Registry::init(&tree.registry_path(), parameters).unwrap();
}

fn open(tree: &TestTree) -> (Registry, RunConfig) {
    let registry = Registry::open(&tree.registry_path()).unwrap();
    let config =
        RunConfig::resolve(registry.raw_parameters(), &ParameterOverrides::default()).unwrap();
    (registry, config)
}

#[test]
fn test_init_encrypt_wipe_decrypt() {
    let tree = TestTree::new();
    let cipher = FakeCipher::new(ALICE, PASSPHRASE);
    init(&tree);

    tree.write("README", "top level");
    tree.write("projects/alpha/plan.md", "# plan");
    tree.write("projects/beta/data.csv", "1,2,3");

    let report = {
        let (mut registry, config) = open(&tree);
        EncryptEngine::new(&config, &cipher).run(&mut registry).unwrap()
    };
    assert_eq!(report.succeeded(), 3);
    assert_eq!(tree.blobs().len(), 3);

    // Nothing in the ciphertext tree reveals a plaintext name
    for blob in tree.blobs() {
        assert!(secdir_core::naming::is_opaque_name(&blob));
    }

    tree.wipe_plain();
    let report = {
        let (registry, config) = open(&tree);
        DecryptEngine::new(&config, &cipher)
            .run(&registry, PASSPHRASE)
            .unwrap()
    };

    assert_eq!(report.succeeded(), 3);
    assert_eq!(report.skipped, 0);
    tree.assert_plain_contains("README", "top level");
    tree.assert_plain_contains("projects/alpha/plan.md", "# plan");
    tree.assert_plain_contains("projects/beta/data.csv", "1,2,3");
}

#[test]
fn test_decrypt_into_fresh_plaintext_root() {
    let tree = TestTree::new();
    let cipher = FakeCipher::new(ALICE, PASSPHRASE);
    init(&tree);
    tree.write("docs/a.txt", "alpha");
    {
        let (mut registry, config) = open(&tree);
        EncryptEngine::new(&config, &cipher).run(&mut registry).unwrap();
    }

    // Restore somewhere else by overriding the plaintext root for one run
    let restore = tree.root().join("restored");
    let registry = Registry::open(&tree.registry_path()).unwrap();
    let overrides = ParameterOverrides {
        plaindir: Some(restore.to_string_lossy().into_owned()),
        ..Default::default()
    };
    let config = RunConfig::resolve(registry.raw_parameters(), &overrides).unwrap();
    DecryptEngine::new(&config, &cipher)
        .run(&registry, PASSPHRASE)
        .unwrap();

    assert_eq!(
        fs::read_to_string(restore.join("docs/a.txt")).unwrap(),
        "alpha"
    );
    // The override is not persisted
    assert_eq!(
        registry.raw_parameters().plaindir.as_deref(),
        Some(tree.plaindir().to_string_lossy().as_ref())
    );
}

#[test]
fn test_missing_parameter_is_a_config_error() {
    let tree = TestTree::new();
    let parameters = StoredParameters {
        plaindir: Some(tree.plaindir().to_string_lossy().into_owned()),
        public_id: Some(ALICE.to_string()),
        ..Default::default()
    };

    let err = Registry::init(&tree.registry_path(), parameters).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Config);
    assert!(!tree.registry_path().exists());
}

#[test]
fn test_missing_registry_is_a_registry_error() {
    let tree = TestTree::new();

    let err = Registry::open(&tree.registry_path()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Registry);
}

#[test]
fn test_corrupt_registry_is_a_registry_error() {
    let tree = TestTree::new();
    fs::write(tree.registry_path(), "this is [not toml").unwrap();

    let err = Registry::open(&tree.registry_path()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Registry);
}

#[test]
fn test_locked_registry_is_a_registry_error() {
    let tree = TestTree::new();
    init(&tree);
    let (_held, _) = open(&tree);

    let err = Registry::open(&tree.registry_path()).unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Registry);
}
