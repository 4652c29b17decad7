//! Whole-system properties of the mirror
//!
//! Each test states one property that must hold for any sequence of runs:
//! idempotence, round trip, no orphans, recipient isolation, symlink
//! fidelity and watermark monotonicity.

use pretty_assertions::assert_eq;
use rstest::rstest;
use secdir_core::{
    DecryptEngine, EncryptEngine, ParameterOverrides, Registry, RunConfig, RunReport,
};
use secdir_test_utils::{FakeCipher, TestTree};
use std::collections::BTreeSet;
use std::fs;

const ALICE: &str = "alice@example.com";
const BOB: &str = "bob@example.com";
const PASSPHRASE: &str = "correct horse";

fn open_as(tree: &TestTree, public_id: Option<&str>) -> (Registry, RunConfig) {
    let registry = Registry::open(&tree.registry_path()).unwrap();
    let overrides = ParameterOverrides {
        public_id: public_id.map(str::to_string),
        ..Default::default()
    };
    let config = RunConfig::resolve(registry.raw_parameters(), &overrides).unwrap();
    (registry, config)
}

fn encrypt_as(tree: &TestTree, cipher: &FakeCipher, public_id: Option<&str>) -> RunReport {
    let (mut registry, config) = open_as(tree, public_id);
    EncryptEngine::new(&config, cipher).run(&mut registry).unwrap()
}

fn encrypt(tree: &TestTree, cipher: &FakeCipher) -> RunReport {
    encrypt_as(tree, cipher, None)
}

fn decrypt(tree: &TestTree, cipher: &FakeCipher) -> RunReport {
    let (registry, config) = open_as(tree, None);
    DecryptEngine::new(&config, cipher)
        .run(&registry, PASSPHRASE)
        .unwrap()
}

/// Every blob belongs to exactly one file row, and every file row's blob exists.
fn assert_no_orphans(tree: &TestTree) {
    let (registry, _) = open_as(tree, None);
    let referenced: Vec<String> = registry
        .snapshot()
        .values()
        .filter(|entry| !entry.is_link)
        .map(|entry| entry.ciphertext_name.clone())
        .collect();
    let unique: BTreeSet<&String> = referenced.iter().collect();
    assert_eq!(unique.len(), referenced.len(), "blob shared by two rows");

    let on_disk: BTreeSet<String> = tree.blobs().into_iter().collect();
    let referenced: BTreeSet<String> = referenced.into_iter().collect();
    assert_eq!(on_disk, referenced);
}

fn registry_rows(tree: &TestTree) -> String {
    let (registry, _) = open_as(tree, None);
    format!("{:?}", registry.snapshot())
}

// ============================================================================
// Idempotence
// ============================================================================

#[test]
fn test_encrypt_twice_changes_nothing_the_second_time() {
    let tree = TestTree::new();
    tree.init_parameters(ALICE, 0);
    let cipher = FakeCipher::new(ALICE, PASSPHRASE);
    for name in ["a.txt", "b/c.txt", "b/d/e.txt"] {
        tree.write(name, name);
        tree.backdate(name, 60);
    }

    encrypt(&tree, &cipher);
    let rows = registry_rows(&tree);
    let blobs = tree.blobs();

    let second = encrypt(&tree, &cipher);

    assert!(second.items.is_empty());
    assert_eq!(registry_rows(&tree), rows);
    assert_eq!(tree.blobs(), blobs);
    assert_eq!(cipher.encrypt_calls(), 3);
}

#[test]
fn test_decrypt_twice_yields_the_same_tree() {
    let tree = TestTree::new();
    tree.init_parameters(ALICE, 0);
    let cipher = FakeCipher::new(ALICE, PASSPHRASE);
    tree.write("a.txt", "alpha");
    encrypt(&tree, &cipher);
    tree.wipe_plain();

    decrypt(&tree, &cipher);
    let second = decrypt(&tree, &cipher);

    assert!(!second.has_failures());
    assert_eq!(tree.read("a.txt"), "alpha");
}

// ============================================================================
// Round trip
// ============================================================================

#[rstest]
#[case::single_file(&[("only.txt", "one")])]
#[case::nested(&[("a/b/c/deep.txt", "deep"), ("top.txt", "top")])]
#[case::empty_file(&[("empty", "")])]
#[case::spaces_and_unicode(&[("my notes/résumé.md", "cv"), ("日本/語.txt", "text")])]
#[case::many_siblings(&[("d/1", "1"), ("d/2", "2"), ("d/3", "3"), ("d/4", "4")])]
fn test_round_trip(#[case] files: &[(&str, &str)]) {
    let tree = TestTree::new();
    tree.init_parameters(ALICE, 0);
    let cipher = FakeCipher::new(ALICE, PASSPHRASE);
    for (path, content) in files {
        tree.write(path, content);
    }

    let encrypted = encrypt(&tree, &cipher);
    tree.wipe_plain();
    let decrypted = decrypt(&tree, &cipher);

    assert_eq!(encrypted.succeeded(), files.len());
    assert_eq!(decrypted.succeeded(), files.len());
    for (path, content) in files {
        assert_eq!(tree.read(path), *content);
    }
}

// ============================================================================
// No orphans
// ============================================================================

#[test]
fn test_no_orphans_across_modifications() {
    let tree = TestTree::new();
    tree.init_parameters(ALICE, 0);
    let cipher = FakeCipher::new(ALICE, PASSPHRASE);
    tree.write("a.txt", "v1");
    tree.write("b.txt", "v1");
    tree.backdate("a.txt", 120);
    tree.backdate("b.txt", 120);
    encrypt(&tree, &cipher);
    assert_no_orphans(&tree);

    tree.write("a.txt", "v2");
    encrypt(&tree, &cipher);
    assert_no_orphans(&tree);
    assert_eq!(tree.blobs().len(), 2);

    tree.backdate("a.txt", 60);
    tree.write("b.txt", "v2");
    encrypt(&tree, &cipher);
    assert_no_orphans(&tree);
    assert_eq!(tree.blobs().len(), 2);
}

#[test]
fn test_no_orphans_after_failed_reencrypt() {
    let tree = TestTree::new();
    tree.init_parameters(ALICE, 0);
    let cipher = FakeCipher::new(ALICE, PASSPHRASE);
    tree.write("a.txt", "v1");
    tree.backdate("a.txt", 60);
    encrypt(&tree, &cipher);

    tree.write("a.txt", "v2");
    cipher.fail_on("a.txt");
    let report = encrypt(&tree, &cipher);

    assert!(report.has_failures());
    assert_no_orphans(&tree);
}

#[cfg(unix)]
#[test]
fn test_no_orphans_when_file_becomes_link() {
    let tree = TestTree::new();
    tree.init_parameters(ALICE, 0);
    let cipher = FakeCipher::new(ALICE, PASSPHRASE);
    tree.write("a.txt", "alpha");
    tree.write("b.txt", "beta");
    encrypt(&tree, &cipher);

    fs::remove_file(tree.plaindir().join("a.txt")).unwrap();
    tree.symlink("b.txt", "a.txt");
    encrypt(&tree, &cipher);

    assert_no_orphans(&tree);
    assert_eq!(tree.blobs().len(), 1);
}

// ============================================================================
// Recipient isolation
// ============================================================================

#[test]
fn test_decrypt_touches_only_own_entries() {
    let tree = TestTree::new();
    tree.init_parameters(ALICE, 0);
    let alice = FakeCipher::new(ALICE, PASSPHRASE);
    let bob = FakeCipher::new(BOB, "bob's secret");

    tree.write("alice.txt", "for alice");
    tree.backdate("alice.txt", 60);
    encrypt(&tree, &alice);
    tree.write("bob.txt", "for bob");
    encrypt_as(&tree, &bob, Some(BOB));

    tree.wipe_plain();
    let report = decrypt(&tree, &alice);

    assert_eq!(report.skipped, 1);
    assert_eq!(report.succeeded(), 1);
    assert_eq!(alice.decrypt_calls(), 1);
    assert_eq!(bob.decrypt_calls(), 0);
    tree.assert_plain_contains("alice.txt", "for alice");
    tree.assert_plain_not_exists("bob.txt");
}

#[test]
fn test_blobs_are_encrypted_for_the_configured_recipient() {
    let tree = TestTree::new();
    tree.init_parameters(ALICE, 0);
    let bob = FakeCipher::new(BOB, "bob's secret");
    tree.write("shared.txt", "hello");

    encrypt_as(&tree, &bob, Some(BOB));

    let (registry, _) = open_as(&tree, None);
    let entry = registry.get(&"shared.txt".into()).unwrap();
    assert_eq!(entry.recipient_id, BOB);
    let blob = tree.securedir().join(&entry.ciphertext_name);
    assert_eq!(FakeCipher::recipient_of(&blob).as_deref(), Some(BOB));
}

// ============================================================================
// Symlink fidelity
// ============================================================================

#[cfg(unix)]
#[rstest]
#[case::relative_file("a.txt", "to-a")]
#[case::parent_relative("../outside", "escape")]
#[case::dangling("nowhere", "broken")]
#[case::nested_link("../a.txt", "sub/up")]
#[case::to_self(".", "self")]
#[case::to_ancestor("..", "sub/back")]
fn test_link_round_trips_without_blob(#[case] target: &str, #[case] link: &str) {
    let tree = TestTree::new();
    tree.init_parameters(ALICE, 0);
    let cipher = FakeCipher::new(ALICE, PASSPHRASE);
    tree.write("a.txt", "alpha");
    tree.symlink(target, link);

    encrypt(&tree, &cipher);
    assert_eq!(cipher.encrypt_calls(), 1);
    assert_eq!(tree.blobs().len(), 1);

    tree.wipe_plain();
    decrypt(&tree, &cipher);

    assert_eq!(tree.link_target(link), target);
}

#[cfg(unix)]
#[test]
fn test_directory_link_contents_are_not_mirrored() {
    let tree = TestTree::new();
    tree.init_parameters(ALICE, 0);
    let cipher = FakeCipher::new(ALICE, PASSPHRASE);
    tree.write("real/x.txt", "x");
    tree.symlink("real", "alias");

    encrypt(&tree, &cipher);

    let (registry, _) = open_as(&tree, None);
    assert!(registry.get(&"alias/x.txt".into()).is_none());
    assert!(registry.get(&"alias".into()).unwrap().is_link);
    assert_eq!(tree.blobs().len(), 1);
}

// ============================================================================
// Watermark monotonicity
// ============================================================================

#[test]
fn test_watermark_never_moves_backwards() {
    let tree = TestTree::new();
    let future = chrono::Utc::now().timestamp() + 3600;
    tree.init_parameters(ALICE, future);
    let cipher = FakeCipher::new(ALICE, PASSPHRASE);

    let report = encrypt(&tree, &cipher);

    assert_eq!(report.watermark, Some(future));
    assert_eq!(open_as(&tree, None).0.watermark(), future);
}

#[test]
fn test_watermark_advances_on_each_run() {
    let tree = TestTree::new();
    tree.init_parameters(ALICE, 0);
    let cipher = FakeCipher::new(ALICE, PASSPHRASE);

    let first = encrypt(&tree, &cipher).watermark.unwrap();
    let second = encrypt(&tree, &cipher).watermark.unwrap();

    assert!(first > 0);
    assert!(second >= first);
}

#[test]
fn test_changes_are_judged_against_the_previous_watermark() {
    let tree = TestTree::new();
    tree.init_parameters(ALICE, 0);
    let cipher = FakeCipher::new(ALICE, PASSPHRASE);
    tree.write("a.txt", "v1");
    tree.backdate("a.txt", 600);
    encrypt(&tree, &cipher);

    // Modified after the first run but before the second run starts
    tree.write("a.txt", "v2");
    let report = encrypt(&tree, &cipher);

    assert_eq!(report.items.len(), 1);
    tree.wipe_plain();
    decrypt(&tree, &cipher);
    assert_eq!(tree.read("a.txt"), "v2");
}

#[test]
fn test_registered_file_older_than_watermark_is_not_reencrypted() {
    let tree = TestTree::new();
    tree.init_parameters(ALICE, 0);
    let cipher = FakeCipher::new(ALICE, PASSPHRASE);
    tree.write("a.txt", "v1");
    encrypt(&tree, &cipher);
    {
        let (mut registry, _) = open_as(&tree, None);
        let mut parameters = registry.raw_parameters().clone();
        parameters.last_timestamp = chrono::Utc::now().timestamp() + 3600;
        registry.set_parameters(parameters).unwrap();
    }

    tree.write("a.txt", "v2");
    let report = encrypt(&tree, &cipher);

    assert!(report.items.is_empty());
    assert_eq!(cipher.encrypt_calls(), 1);
}
