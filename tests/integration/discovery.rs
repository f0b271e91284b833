//! Package discovery (spec.md §8.2): `fromDirectory` walking up from a
//! nested directory to the enclosing manifest.

use crate::common::test_env;
use gpk::GpkError;
use gpk::package::Package;

#[test]
fn walking_discovery_finds_enclosing_package_from_nested_directory() {
    let temp = tempfile::tempdir().unwrap();
    let env = test_env(&temp);
    let pkg_dir = temp.path().join("modules").join("foo");
    let lib_dir = pkg_dir.join("lib");
    std::fs::create_dir_all(&lib_dir).unwrap();
    std::fs::write(pkg_dir.join("package.json"), r#"{"name": "foo", "version": "2.0.0"}"#).unwrap();

    let package = Package::from_directory(&lib_dir, true, env, None).unwrap();

    assert_eq!(package.dir, pkg_dir);
    assert_eq!(package.info.name, "foo");
    assert_eq!(package.info.version.as_deref(), Some("2.0.0"));
}

#[test]
fn non_walking_discovery_requires_manifest_at_exact_directory() {
    let temp = tempfile::tempdir().unwrap();
    let env = test_env(&temp);
    let pkg_dir = temp.path().join("modules").join("foo");
    let lib_dir = pkg_dir.join("lib");
    std::fs::create_dir_all(&lib_dir).unwrap();
    std::fs::write(pkg_dir.join("package.json"), r#"{"name": "foo"}"#).unwrap();

    let err = Package::from_directory(&lib_dir, false, env, None).unwrap_err();
    assert!(matches!(err.downcast_ref::<GpkError>(), Some(GpkError::NoManifest)));
}

#[test]
fn walking_discovery_fails_past_the_filesystem_boundary() {
    let temp = tempfile::tempdir().unwrap();
    let env = test_env(&temp);
    let isolated = temp.path().join("empty");
    std::fs::create_dir_all(&isolated).unwrap();

    let err = Package::from_directory(&isolated, true, env, None).unwrap_err();
    assert!(matches!(err.downcast_ref::<GpkError>(), Some(GpkError::NoManifest)));
}
