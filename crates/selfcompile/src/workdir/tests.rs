//! Unit tests for workdir creation and layout.

use std::fs;
use std::path::Path;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;

#[fixture]
fn root() -> TempDir {
    TempDir::new().expect("allocate test root")
}

fn entries(dir: &Path) -> usize {
    fs::read_dir(dir).expect("read root").count()
}

#[rstest]
fn create_makes_empty_directory_under_root(root: TempDir) {
    let workdir = Workdir::create("custom-", Some(root.path())).expect("create workdir");

    assert!(workdir.path().is_dir());
    assert_eq!(workdir.path().parent(), Some(root.path()));
    assert_eq!(entries(workdir.path()), 0);
    let name = workdir
        .path()
        .file_name()
        .and_then(|n| n.to_str())
        .expect("utf-8 name");
    assert!(name.starts_with("custom-"), "unexpected name {name}");
}

#[rstest]
fn empty_prefix_uses_default(root: TempDir) {
    let workdir = Workdir::create("", Some(root.path())).expect("create workdir");
    let name = workdir
        .path()
        .file_name()
        .and_then(|n| n.to_str())
        .expect("utf-8 name");
    assert!(name.starts_with(DEFAULT_PREFIX), "unexpected name {name}");
}

#[rstest]
fn repeated_creation_yields_distinct_directories(root: TempDir) {
    let first = Workdir::create("", Some(root.path())).expect("first");
    let second = Workdir::create("", Some(root.path())).expect("second");
    assert_ne!(first.path(), second.path());
    assert_eq!(entries(root.path()), 2);
}

#[rstest]
fn create_fails_when_root_is_missing(root: TempDir) {
    let missing = root.path().join("absent");
    let err = Workdir::create("", Some(&missing)).expect_err("missing root");
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
}

#[rstest]
fn destroy_removes_whole_tree(root: TempDir) {
    let workdir = Workdir::create("", Some(root.path())).expect("create workdir");
    let nested = workdir.path().join("_vendor/src/example.org/app");
    fs::create_dir_all(&nested).expect("nested dirs");
    fs::write(nested.join("main.go"), "package main\n").expect("write file");

    workdir.destroy().expect("destroy");

    assert!(!workdir.path().exists());
    assert_eq!(entries(root.path()), 0);
}

#[rstest]
fn destroy_twice_is_harmless(root: TempDir) {
    let workdir = Workdir::create("", Some(root.path())).expect("create workdir");
    workdir.destroy().expect("first destroy");
    workdir.destroy().expect("second destroy");
}

#[test]
fn destroying_empty_path_is_a_no_op() {
    destroy(Path::new("")).expect("empty path");
}

#[test]
fn layout_with_target_nests_source_under_vendor() {
    let target = InstallTarget::new("example.org/app").expect("target");
    let layout = Layout::derive(Path::new("/work"), Some(&target));
    assert_eq!(layout.vendor_root(), Path::new("/work/_vendor"));
    assert_eq!(
        layout.source_root(),
        Path::new("/work/_vendor/src/example.org/app")
    );
    assert_eq!(
        layout.stub_path(),
        Path::new("/work/_vendor/src/example.org/app/plugin_selfcompile.go")
    );
}

#[test]
fn layout_without_target_uses_flat_source_dir() {
    let layout = Layout::derive(Path::new("/work"), None);
    assert_eq!(layout.source_root(), Path::new("/work/_self"));
    assert_eq!(layout.vendor_root(), Path::new("/work/_vendor"));
}

#[rstest]
#[case::with_target(Some("example.org/app"))]
#[case::without_target(None)]
fn layout_is_deterministic(#[case] target: Option<&str>) {
    let target = target.map(|t| InstallTarget::new(t).expect("target"));
    let first = Layout::derive(Path::new("/work"), target.as_ref());
    let second = Layout::derive(Path::new("/work"), target.as_ref());
    assert_eq!(first, second);
    assert!(first.source_root().starts_with("/work"));
    assert!(first.vendor_root().starts_with("/work"));
}

#[rstest]
fn workdir_layout_matches_free_derivation(root: TempDir) {
    let workdir = Workdir::create("", Some(root.path())).expect("create workdir");
    let target = InstallTarget::new("a/b").expect("target");
    assert_eq!(
        workdir.layout(Some(&target)),
        Layout::derive(workdir.path(), Some(&target))
    );
}
