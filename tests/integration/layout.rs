//! The "unflat" layout scenario (spec.md §8.3): `a → c → {d, e, f}`, with
//! `d` and `e` each also depending on `f`. `f` is declared directly by `c`,
//! so it is placed there; `d` and `e`'s own (compatible) requirement on `f`
//! is satisfied by reuse from `c`'s level rather than duplicated under
//! either of them.

use crate::common::{git_package, test_env};
use gpk::package::Package;

#[tokio::test]
async fn unflat_graph_hoists_shared_dependency_without_duplicating_under_siblings() {
    let temp = tempfile::tempdir().unwrap();
    let env = test_env(&temp);
    let remotes = temp.path().join("remotes");

    let f = git_package(&remotes.join("f"), r#"{"name": "f", "version": "1.0.0"}"#, "v1.0.0");
    let d = git_package(
        &remotes.join("d"),
        &format!(r#"{{"name": "d", "dependencies": {{"f": "{}"}}}}"#, f.source("semver:~1.0.0")),
        "v1.0.0",
    );
    let e = git_package(
        &remotes.join("e"),
        &format!(r#"{{"name": "e", "dependencies": {{"f": "{}"}}}}"#, f.source("semver:~1.0.0")),
        "v1.0.0",
    );
    let c = git_package(
        &remotes.join("c"),
        &format!(
            r#"{{"name": "c", "dependencies": {{"d": "{}", "e": "{}", "f": "{}"}}}}"#,
            d.source("semver:~1.0.0"),
            e.source("semver:~1.0.0"),
            f.source("semver:~1.0.0"),
        ),
        "v1.0.0",
    );

    let a_dir = temp.path().join("a");
    std::fs::create_dir_all(&a_dir).unwrap();
    std::fs::write(
        a_dir.join("package.json"),
        format!(r#"{{"name": "a", "dependencies": {{"c": "{}"}}}}"#, c.source("semver:~1.0.0")),
    )
    .unwrap();

    let a = Package::from_directory(&a_dir, false, env, None).unwrap();
    a.install().await.unwrap();

    let c_modules = a_dir.join("node_modules").join("c").join("node_modules");
    assert!(c_modules.join("f").join("package.json").exists(), "f must be hoisted to c's level");
    assert!(c_modules.join("d").join("package.json").exists());
    assert!(c_modules.join("e").join("package.json").exists());
    assert!(
        !c_modules.join("d").join("node_modules").join("f").exists(),
        "d must reuse c's f, not duplicate it"
    );
    assert!(
        !c_modules.join("e").join("node_modules").join("f").exists(),
        "e must reuse c's f, not duplicate it"
    );
}

#[tokio::test]
async fn incompatible_sibling_requirements_each_get_their_own_copy() {
    let temp = tempfile::tempdir().unwrap();
    let env = test_env(&temp);
    let remotes = temp.path().join("remotes");

    let dep = git_package(&remotes.join("dep"), r#"{"name": "dep", "version": "1.0.0"}"#, "v1.0.0");
    run_git_tag_bump(&dep, "2.0.0", "v2.0.0");

    let x = git_package(
        &remotes.join("x"),
        &format!(r#"{{"name": "x", "dependencies": {{"dep": "{}"}}}}"#, dep.source("semver:~1.0.0")),
        "v1.0.0",
    );
    let y = git_package(
        &remotes.join("y"),
        &format!(r#"{{"name": "y", "dependencies": {{"dep": "{}"}}}}"#, dep.source("semver:~2.0.0")),
        "v1.0.0",
    );

    let a_dir = temp.path().join("a");
    std::fs::create_dir_all(&a_dir).unwrap();
    std::fs::write(
        a_dir.join("package.json"),
        format!(
            r#"{{"name": "a", "dependencies": {{"x": "{}", "y": "{}"}}}}"#,
            x.source("semver:~1.0.0"),
            y.source("semver:~1.0.0"),
        ),
    )
    .unwrap();

    let a = Package::from_directory(&a_dir, false, env, None).unwrap();
    a.install().await.unwrap();

    let node_modules = a_dir.join("node_modules");
    assert!(node_modules.join("x").join("node_modules").join("dep").join("package.json").exists());
    assert!(node_modules.join("y").join("node_modules").join("dep").join("package.json").exists());
}

/// Adds a second, higher version on top of an existing fixture repo's first
/// commit, without disturbing the original tag.
fn run_git_tag_bump(repo: &crate::common::TestGit, version: &str, tag: &str) {
    std::fs::write(
        repo.path().join("package.json"),
        format!(r#"{{"name": "dep", "version": "{version}"}}"#),
    )
    .unwrap();
    for args in [vec!["add", "."], vec!["commit", "--quiet", "-m", "bump"], vec!["tag", tag]] {
        let status = std::process::Command::new("git")
            .args(&args)
            .current_dir(repo.path())
            .status()
            .unwrap();
        assert!(status.success(), "git {args:?} failed");
    }
}
