//! Unit tests for asset restoration.

use std::cell::RefCell;
use std::fs;

use rstest::{fixture, rstest};
use tempfile::TempDir;

use super::*;

struct Bundle {
    source: TempDir,
    target: TempDir,
}

#[fixture]
fn bundle() -> Bundle {
    let source = TempDir::new().expect("source dir");
    fs::create_dir_all(source.path().join("bin")).expect("bin dir");
    fs::write(source.path().join("bin/go"), "#!/bin/sh\n").expect("toolchain");
    fs::create_dir_all(source.path().join("_vendor/src/dep")).expect("vendor dir");
    fs::write(source.path().join("_vendor/src/dep/dep.go"), "package dep\n").expect("dep");
    Bundle {
        source,
        target: TempDir::new().expect("target dir"),
    }
}

#[rstest]
fn empty_name_restores_everything(bundle: Bundle) {
    let assets = DirectoryAssets::new(bundle.source.path());
    assets.restore(bundle.target.path(), "").expect("restore");

    let target = bundle.target.path();
    assert_eq!(
        fs::read_to_string(target.join("bin/go")).expect("toolchain copy"),
        "#!/bin/sh\n"
    );
    assert!(target.join("_vendor/src/dep/dep.go").is_file());
}

#[rstest]
fn named_asset_restores_only_that_subtree(bundle: Bundle) {
    let assets = DirectoryAssets::new(bundle.source.path());
    assets.restore(bundle.target.path(), "_vendor").expect("restore");

    let target = bundle.target.path();
    assert!(target.join("_vendor/src/dep/dep.go").is_file());
    assert!(!target.join("bin").exists());
}

#[rstest]
fn restoring_twice_into_fresh_tree_is_idempotent(bundle: Bundle) {
    let assets = DirectoryAssets::new(bundle.source.path());
    assets.restore(bundle.target.path(), "").expect("first restore");
    assets.restore(bundle.target.path(), "").expect("second restore");
    assert!(bundle.target.path().join("bin/go").is_file());
}

#[cfg(unix)]
#[rstest]
fn executable_bits_survive_restoration(bundle: Bundle) {
    use std::os::unix::fs::PermissionsExt;

    let tool = bundle.source.path().join("bin/go");
    fs::set_permissions(&tool, fs::Permissions::from_mode(0o755)).expect("chmod");

    DirectoryAssets::new(bundle.source.path())
        .restore(bundle.target.path(), "")
        .expect("restore");

    let mode = fs::metadata(bundle.target.path().join("bin/go"))
        .expect("metadata")
        .permissions()
        .mode();
    assert_eq!(mode & 0o111, 0o111, "mode {mode:o} lost execute bits");
}

#[cfg(unix)]
#[rstest]
fn linked_directory_cycles_are_recreated_not_followed(bundle: Bundle) {
    let link = bundle.source.path().join("_vendor/src/dep/loop");
    std::os::unix::fs::symlink("..", &link).expect("cyclic link");

    DirectoryAssets::new(bundle.source.path())
        .restore(bundle.target.path(), "")
        .expect("restore");
    DirectoryAssets::new(bundle.source.path())
        .restore(bundle.target.path(), "")
        .expect("restore over existing link");

    let copied = bundle.target.path().join("_vendor/src/dep/loop");
    assert!(
        fs::symlink_metadata(&copied)
            .expect("link metadata")
            .file_type()
            .is_symlink()
    );
    assert_eq!(fs::read_link(&copied).expect("link target"), PathBuf::from(".."));
}

#[rstest]
#[case::parent("../outside")]
#[case::absolute("/etc")]
fn escaping_names_are_rejected(bundle: Bundle, #[case] name: &str) {
    let err = DirectoryAssets::new(bundle.source.path())
        .restore(bundle.target.path(), name)
        .expect_err("escaping name");
    assert_eq!(err.kind(), io::ErrorKind::InvalidInput);
}

#[rstest]
fn missing_source_reports_not_found(bundle: Bundle) {
    let err = DirectoryAssets::new(bundle.source.path().join("absent"))
        .restore(bundle.target.path(), "")
        .expect_err("missing source");
    assert_eq!(err.kind(), io::ErrorKind::NotFound);
}

#[test]
fn closures_act_as_restorers() {
    let calls = RefCell::new(Vec::new());
    let restorer = |target: &Path, name: &str| -> io::Result<()> {
        calls
            .borrow_mut()
            .push((target.to_path_buf(), name.to_owned()));
        Ok(())
    };

    restorer
        .restore(Path::new("/work"), "")
        .expect("closure restore");

    assert_eq!(
        calls.into_inner(),
        vec![(PathBuf::from("/work"), String::new())]
    );
}
