use std::fs;
use std::path::Path;
use std::process::{Command, Output};

const POINT: &str = "package geo\n\ntype Point struct {\n\tX int `access:\"r,w\"`\n\ty int\n}\n";

fn accessor(args: &[&str], cwd: &Path) -> Output {
    Command::new(env!("CARGO_BIN_EXE_accessor"))
        .args(args)
        .current_dir(cwd)
        .env_remove("ACCESSOR_TAG")
        .env("NO_COLOR", "1")
        .output()
        .expect("run accessor binary")
}

#[test]
fn missing_type_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("point.go"), POINT).unwrap();

    let out = accessor(&["."], dir.path());

    assert_eq!(out.status.code(), Some(2));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("--type"), "stderr: {stderr}");
    assert!(!dir.path().join("point_accessor.go").exists());
}

#[test]
fn blank_type_list_is_a_usage_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("point.go"), POINT).unwrap();

    let out = accessor(&["--type", ","], dir.path());

    assert_eq!(out.status.code(), Some(2));
    assert!(!dir.path().join("point_accessor.go").exists());
}

#[test]
fn generates_into_current_directory() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("point.go"), POINT).unwrap();

    let out = accessor(&["--type", "Point", "--quiet"], dir.path());

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let content = fs::read_to_string(dir.path().join("point_accessor.go")).unwrap();
    assert!(content.starts_with("// Code generated by \"accessor --type Point --quiet\"; DO NOT EDIT.\n\npackage geo\n\n"));
    assert!(content.contains("func (p *Point) SetX(param int) {\n\tp.X = param\n}\n"));
    assert!(content.contains("func (p *Point) Gety() int {\n\treturn p.y\n}\n"));
}

#[test]
fn dry_run_prints_instead_of_writing() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("point.go"), POINT).unwrap();

    let out = accessor(&["-t", "Point", "--dry-run", "point.go"], dir.path());

    assert!(out.status.success());
    let stdout = String::from_utf8_lossy(&out.stdout);
    assert!(stdout.contains("func (p *Point) GetX() int {"));
    assert!(!dir.path().join("point_accessor.go").exists());
}

#[test]
fn mixed_packages_fail_without_output() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("point.go"), POINT).unwrap();
    fs::write(dir.path().join("other.go"), "package other\n").unwrap();

    let out = accessor(&["--type", "Point"], dir.path());

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("accessor: error: 2 packages found"), "stderr: {stderr}");
    assert!(!dir.path().join("point_accessor.go").exists());
}

#[test]
fn missing_path_is_fatal() {
    let dir = tempfile::tempdir().unwrap();

    let out = accessor(&["--type", "Point", "nowhere"], dir.path());

    assert_eq!(out.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&out.stderr).contains("nowhere"));
}

#[test]
fn flag_overrides_config_file() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(
        dir.path().join("cfg.go"),
        "package cfg\n\ntype Config struct {\n\tHost string `get:\"r\" access:\"w\"`\n}\n",
    )
    .unwrap();
    fs::write(dir.path().join("accessor.toml"), "[generator]\ntag = \"get\"\n").unwrap();

    let out = accessor(&["--type", "Config", "--quiet"], dir.path());
    assert!(out.status.success());
    let content = fs::read_to_string(dir.path().join("config_accessor.go")).unwrap();
    assert!(content.contains("GetHost"));
    assert!(!content.contains("SetHost"));

    let out = accessor(&["--type", "Config", "--quiet", "--tag", "access"], dir.path());
    assert!(out.status.success());
    let content = fs::read_to_string(dir.path().join("config_accessor.go")).unwrap();
    assert!(content.contains("SetHost"));
    assert!(!content.contains("GetHost"));
}

#[test]
fn write_failure_exits_with_status_one() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("point.go"), POINT).unwrap();
    fs::write(dir.path().join("line.go"), "package geo\n\ntype Line struct {\n\tFrom Point\n}\n").unwrap();
    fs::create_dir(dir.path().join("line_accessor.go")).unwrap();

    let out = accessor(&["--type", "Point,Line"], dir.path());

    assert_eq!(out.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&out.stderr);
    assert!(stderr.contains("accessor: writing output"), "stderr: {stderr}");
    assert!(dir.path().join("point_accessor.go").is_file());
}

#[test]
fn go_style_type_flag_is_accepted() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("point.go"), POINT).unwrap();

    let out = accessor(&["-type", "Point", "--quiet", "."], dir.path());

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    let content = fs::read_to_string(dir.path().join("point_accessor.go")).unwrap();
    assert!(content.starts_with("// Code generated by \"accessor -type Point --quiet .\"; DO NOT EDIT."));
}

#[test]
fn ignored_files_are_left_out_of_the_package() {
    let dir = tempfile::tempdir().unwrap();
    fs::write(dir.path().join("point.go"), POINT).unwrap();
    fs::write(dir.path().join("gen.go"), "//go:build ignore\n\npackage main\n").unwrap();

    let out = accessor(&["--type", "Point", "--quiet"], dir.path());

    assert!(out.status.success(), "stderr: {}", String::from_utf8_lossy(&out.stderr));
    assert!(dir.path().join("point_accessor.go").is_file());
}
