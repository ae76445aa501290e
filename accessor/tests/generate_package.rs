use accessor::{AccessorConfig, GenerateError, LoadError, TagErrorMode, generate_accessors};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn package_dir(files: &[(&str, &str)]) -> TempDir {
    let dir = tempfile::tempdir().expect("tempdir");
    for (name, content) in files {
        fs::write(dir.path().join(name), content).expect("write go file");
    }
    dir
}

fn generated_files(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("read dir")
        .map(|entry| entry.expect("entry").file_name().to_string_lossy().into_owned())
        .filter(|name| name.contains("_accessor"))
        .collect();
    names.sort();
    names
}

const POINT: &str = r#"package geo

// Point is a location on the plane.
type Point struct {
	X int `json:"x" access:"r,w"`
	y int
	Z int `access:"w"`
	label string `access:"-"`
}

func (p Point) String() string { return "point" }
"#;

#[test]
fn writes_accessor_file_next_to_package() {
    let dir = package_dir(&[("point.go", POINT)]);

    let report = generate_accessors()
        .source(dir.path())
        .type_name("Point")
        .invocation("-type Point")
        .run()
        .expect("generation succeeds");

    assert_eq!(report.package, "geo");
    assert_eq!(report.total_accessors(), 4);

    let path = dir.path().join("point_accessor.go");
    let content = fs::read_to_string(&path).expect("output written");
    assert_eq!(
        content,
        "// Code generated by \"accessor -type Point\"; DO NOT EDIT.

package geo

func (p *Point) SetX(param int) {
\tp.X = param
}
func (p *Point) GetX() int {
\treturn p.X
}
func (p *Point) Gety() int {
\treturn p.y
}
func (p *Point) SetZ(param int) {
\tp.Z = param
}
"
    );
}

#[test]
fn unmatched_type_writes_boilerplate_only() {
    let dir = package_dir(&[("point.go", POINT)]);

    let report = generate_accessors()
        .source(dir.path())
        .type_name("Line")
        .invocation("-type Line")
        .run()
        .expect("generation succeeds");

    assert_eq!(report.total_accessors(), 0);
    let content = fs::read_to_string(dir.path().join("line_accessor.go")).expect("output written");
    assert_eq!(
        content,
        "// Code generated by \"accessor -type Line\"; DO NOT EDIT.\n\npackage geo\n\n"
    );
}

#[test]
fn parse_failure_writes_nothing() {
    let dir = package_dir(&[
        ("point.go", POINT),
        ("broken.go", "package geo\n\ntype Broken struct {\n\tA int\n"),
    ]);

    let err = generate_accessors()
        .source(dir.path())
        .type_name("Point")
        .run()
        .expect_err("syntax error is fatal");

    assert!(matches!(err, GenerateError::Load(LoadError::Syntax { .. })));
    assert!(err.to_string().contains("broken.go"));
    assert!(generated_files(dir.path()).is_empty());
}

#[test]
fn multiple_packages_are_rejected() {
    let dir = package_dir(&[("a.go", "package one\n"), ("b.go", "package two\n")]);

    let err = generate_accessors()
        .source(dir.path())
        .type_name("A")
        .run()
        .expect_err("two packages");

    assert_eq!(err.to_string(), "error: 2 packages found (one, two)");
    assert!(generated_files(dir.path()).is_empty());
}

#[test]
fn empty_directory_has_no_go_files() {
    let dir = package_dir(&[("README.md", "# geo\n"), ("point_test.go", "package geo\n")]);

    let err = generate_accessors()
        .source(dir.path())
        .type_name("Point")
        .run()
        .expect_err("no go files");

    assert!(matches!(err, GenerateError::Load(LoadError::NoGoFiles { .. })));
}

#[test]
fn records_accumulate_across_files_in_name_order() {
    let dir = package_dir(&[
        ("b.go", "package geo\n\ntype Point struct {\n\tFromB string\n}\n"),
        ("a.go", "package geo\n\ntype Point struct {\n\tFromA string `access:\"r\"`\n}\n"),
    ]);

    generate_accessors()
        .source(dir.path())
        .type_name("Point")
        .invocation("-type Point")
        .run()
        .expect("generation succeeds");

    let content = fs::read_to_string(dir.path().join("point_accessor.go")).expect("output written");
    let from_a = content.find("GetFromA").expect("a.go accessor");
    let from_b = content.find("SetFromB").expect("b.go accessor");
    assert!(from_a < from_b);
}

#[test]
fn explicit_file_list_uses_first_file_directory() {
    let dir = package_dir(&[("point.go", POINT), ("line.go", "package geo\n\ntype Line struct{ A, B Point }\n")]);

    let report = generate_accessors()
        .sources([dir.path().join("line.go"), dir.path().join("point.go")])
        .type_names(["Line", "Point"])
        .run()
        .expect("generation succeeds");

    assert_eq!(generated_files(dir.path()), vec!["line_accessor.go", "point_accessor.go"]);
    assert_eq!(report.files[0].accessors, 2);
}

#[test]
fn dry_run_leaves_directory_untouched() {
    let dir = package_dir(&[("point.go", POINT)]);

    let report = generate_accessors()
        .source(dir.path())
        .type_name("Point")
        .dry_run(true)
        .run()
        .expect("generation succeeds");

    assert!(report.dry_run);
    assert!(report.files[0].content.contains("func (p *Point) GetX() int {"));
    assert!(generated_files(dir.path()).is_empty());
}

#[test]
fn config_file_settings_apply() {
    let dir = package_dir(&[
        (
            "cfg.go",
            "package cfg\n\ntype Config struct {\n\tHost string `get:\"r\"`\n\tPort int `get:r`\n\tDebug bool\n}\n",
        ),
        (
            "accessor.toml",
            "[generator]\ntag = \"get\"\nsuffix = \"_gen\"\non_bad_tag = \"skip-field\"\n",
        ),
    ]);

    let config = AccessorConfig::discover(dir.path()).expect("valid config").expect("config present");
    assert_eq!(config.generator.on_bad_tag, TagErrorMode::SkipField);

    let report = generate_accessors()
        .source(dir.path())
        .type_name("Config")
        .with_config(&config)
        .run()
        .expect("generation succeeds");

    let file = &report.files[0];
    assert_eq!(file.path, dir.path().join("config_gen.go"));
    assert!(file.content.contains("func (c *Config) GetHost() string {"));
    assert!(!file.content.contains("Port"));
    assert!(file.content.contains("func (c *Config) SetDebug(param bool) {"));
}

#[test]
fn output_override_receives_last_type() {
    let dir = package_dir(&[("point.go", POINT), ("line.go", "package geo\n\ntype Line struct{ A Point }\n")]);
    let out = dir.path().join("all.go");

    generate_accessors()
        .source(dir.path())
        .type_names(["Point", "Line"])
        .output_file(&out)
        .run()
        .expect("generation succeeds");

    let content = fs::read_to_string(&out).expect("override written");
    assert!(content.contains("func (l *Line) SetA(param Point) {"));
    assert!(!content.contains("*Point)"));
}

const LINE: &str = "package geo\n\ntype Line struct {\n\tFrom Point\n}\n";

#[test]
fn write_failure_keeps_earlier_files() {
    let dir = package_dir(&[("point.go", POINT), ("line.go", LINE)]);
    fs::create_dir(dir.path().join("line_accessor.go")).expect("blocking directory");

    let err = generate_accessors()
        .source(dir.path())
        .type_names(["Point", "Line"])
        .run()
        .unwrap_err();

    match err {
        GenerateError::Write { path, .. } => assert!(path.ends_with("line_accessor.go"), "path: {}", path.display()),
        other => panic!("expected write error, got {other:?}"),
    }
    assert!(dir.path().join("point_accessor.go").is_file());
    assert!(dir.path().join("line_accessor.go").is_dir());
}

#[test]
fn ignored_generator_script_does_not_split_package() {
    let dir = package_dir(&[
        ("gen.go", "//go:build ignore\n\npackage main\n\nfunc main() {}\n"),
        ("point.go", POINT),
    ]);

    let report = generate_accessors()
        .source(dir.path())
        .type_name("Point")
        .run()
        .expect("generator script is skipped");

    assert_eq!(report.package, "geo");
    assert!(dir.path().join("point_accessor.go").is_file());
}
