//! Invariant checks from spec.md §8.4: determinism, mutual exclusion,
//! idempotence, ancestor reuse.

use crate::common::{git_package, test_env};
use gpk::package::Package;
use gpk::source::{RemoteAliasTable, resolve_remote};

fn aliases() -> RemoteAliasTable {
    RemoteAliasTable::from([
        ("github".to_string(), "https://github.com".to_string()),
        ("local".to_string(), "file:/tmp/datadir".to_string()),
    ])
}

#[test]
fn resolution_is_deterministic() {
    let a = resolve_remote("github:a/b#semver:~1.0.0", &aliases(), "b").unwrap();
    let b = resolve_remote("github:a/b#semver:~1.0.0", &aliases(), "b").unwrap();
    assert_eq!(a, b);
}

#[test]
fn resolution_never_yields_both_version_and_branch() {
    let inputs = [
        "github:a/b#semver:~1.0.0",
        "github:a/b#v1.0.0",
        "github:a/b#deadbeefdeadbeefdeadbeefdeadbeefdeadbeef",
        "~1.0.0",
        "local:#semver:~1.0.0",
        "git://example.com/a.git",
        "git://example.com/a.git#semver:~2.0.0",
        "git+https://example.com/a.git#main",
    ];
    for input in inputs {
        let d = resolve_remote(input, &aliases(), "b").unwrap();
        assert!(!(d.version.is_some() && d.branch.is_some()), "both set for '{input}': {d:?}");
    }
}

#[tokio::test]
async fn repeated_install_makes_no_further_filesystem_changes() {
    let temp = tempfile::tempdir().unwrap();
    let env = test_env(&temp);
    let remotes = temp.path().join("remotes");
    let d = git_package(&remotes.join("d"), r#"{"name": "d"}"#, "v1.0.0");

    let a_dir = temp.path().join("a");
    std::fs::create_dir_all(&a_dir).unwrap();
    std::fs::write(
        a_dir.join("package.json"),
        format!(r#"{{"name": "a", "dependencies": {{"d": "{}"}}}}"#, d.source("semver:~1.0.0")),
    )
    .unwrap();

    Package::from_directory(&a_dir, false, env.clone(), None).unwrap().install().await.unwrap();

    let d_dir = a_dir.join("node_modules").join("d");
    let before = std::fs::metadata(&d_dir).unwrap().modified().unwrap();

    Package::from_directory(&a_dir, false, env, None).unwrap().install().await.unwrap();

    let after = std::fs::metadata(&d_dir).unwrap().modified().unwrap();
    assert_eq!(before, after, "second install must not touch an already-satisfied dependency");
}

#[tokio::test]
async fn transitive_dependency_reuses_ancestor_materialized_copy() {
    let temp = tempfile::tempdir().unwrap();
    let env = test_env(&temp);
    let remotes = temp.path().join("remotes");

    let d = git_package(&remotes.join("d"), r#"{"name": "d"}"#, "v1.0.0");
    let b = git_package(
        &remotes.join("b"),
        &format!(r#"{{"name": "b", "dependencies": {{"d": "{}"}}}}"#, d.source("semver:~1.0.0")),
        "v1.0.0",
    );

    let a_dir = temp.path().join("a");
    std::fs::create_dir_all(&a_dir).unwrap();
    std::fs::write(
        a_dir.join("package.json"),
        format!(
            r#"{{"name": "a", "dependencies": {{"d": "{}", "b": "{}"}}}}"#,
            d.source("semver:~1.0.0"),
            b.source("semver:~1.0.0"),
        ),
    )
    .unwrap();

    let a = Package::from_directory(&a_dir, false, env, None).unwrap();
    a.install().await.unwrap();

    assert!(a_dir.join("node_modules").join("d").join("package.json").exists());
    assert!(a_dir.join("node_modules").join("b").join("package.json").exists());
    assert!(
        !a_dir.join("node_modules").join("b").join("node_modules").join("d").exists(),
        "b must reuse a's already-materialized d, not fetch its own"
    );
}
