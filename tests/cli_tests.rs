//! File-level formatter helpers behind the `siltfmt` binary.

use std::fs;

use silt::FileStatus;

#[test]
fn format_file_rewrites_then_settles() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("main.silt");
    fs::write(&path, "const a=1;").unwrap();

    let first = silt::format_file(&path, false).unwrap();
    assert_eq!(first, FileStatus::Rewritten);
    assert_eq!(fs::read_to_string(&path).unwrap(), "const a = 1;\n");

    let second = silt::format_file(&path, false).unwrap();
    assert_eq!(second, FileStatus::Unchanged);
}

#[test]
fn check_mode_does_not_touch_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("main.silt");
    fs::write(&path, "const a=1;").unwrap();

    let status = silt::format_file(&path, true).unwrap();
    assert_eq!(status, FileStatus::WouldChange);
    assert_eq!(fs::read_to_string(&path).unwrap(), "const a=1;");
}

#[test]
fn format_file_surfaces_parse_errors() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("broken.silt");
    fs::write(&path, "const = ;\n").unwrap();

    let err = silt::format_file(&path, false).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("expected"), "got: {}", message);
    // The file is left untouched.
    assert_eq!(fs::read_to_string(&path).unwrap(), "const = ;\n");
}

#[test]
fn collect_silt_files_walks_recursively_and_sorts() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("sub/deeper")).unwrap();
    fs::write(dir.path().join("b.silt"), "").unwrap();
    fs::write(dir.path().join("a.silt"), "").unwrap();
    fs::write(dir.path().join("notes.txt"), "").unwrap();
    fs::write(dir.path().join("sub/deeper/c.silt"), "").unwrap();

    let files = silt::collect_silt_files(dir.path()).unwrap();
    let names: Vec<String> = files
        .iter()
        .map(|p| {
            p.strip_prefix(dir.path())
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    assert_eq!(names, vec!["a.silt", "b.silt", "sub/deeper/c.silt"]);
}
