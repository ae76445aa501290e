//! Accessor generation pipeline.

use indexmap::IndexMap;
use log::{debug, info};
use std::fs;
use std::path::{Path, PathBuf};

use crate::config::AccessorConfig;
use crate::errors::GenerateError;
use crate::render::AccessorRenderer;
use crate::scanner::{Package, PackageSource, load_package, resolve_patterns};
use crate::tags::DEFAULT_TAG_KEY;
use crate::walker::{RecordDecl, StructWalker, TagErrorMode};

/// Builder for configuring and running the accessor generator.
#[derive(Debug, Clone)]
pub struct AccessorGenerator {
    patterns: Vec<PathBuf>,
    package_source: Option<PackageSource>,
    type_names: Vec<String>,
    output_file: Option<PathBuf>,
    tag_key: String,
    suffix: String,
    tag_error_mode: TagErrorMode,
    invocation: Option<String>,
    dry_run: bool,
}

/// One generated source file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    pub type_name: String,
    pub path: PathBuf,
    pub content: String,
    /// Number of accessor methods in `content`
    pub accessors: usize,
}

/// Result of a run.
#[derive(Debug, Clone)]
pub struct GenerationReport {
    pub package: String,
    pub files: Vec<GeneratedFile>,
    /// Files were rendered but not written
    pub dry_run: bool,
}

impl GenerationReport {
    pub fn total_accessors(&self) -> usize {
        self.files.iter().map(|f| f.accessors).sum()
    }
}

impl AccessorGenerator {
    /// Create a new generator with default settings.
    pub fn new() -> Self {
        Self {
            patterns: Vec::new(),
            package_source: None,
            type_names: Vec::new(),
            output_file: None,
            tag_key: DEFAULT_TAG_KEY.to_string(),
            suffix: "_accessor".to_string(),
            tag_error_mode: TagErrorMode::default(),
            invocation: None,
            dry_run: false,
        }
    }

    /// Add a package directory or a file of the package.
    ///
    /// Either one directory or any number of files. Default: the current directory.
    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.patterns.push(path.into());
        self
    }

    pub fn sources<I, P>(mut self, paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        self.patterns.extend(paths.into_iter().map(Into::into));
        self
    }

    /// Use an already resolved package source instead of resolving the paths given to [`Self::source`].
    pub fn package_source(mut self, source: PackageSource) -> Self {
        self.package_source = Some(source);
        self
    }

    /// Add a struct type to generate accessors for.
    pub fn type_name(mut self, name: impl Into<String>) -> Self {
        self.type_names.push(name.into());
        self
    }

    pub fn type_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.type_names.extend(names.into_iter().map(Into::into));
        self
    }

    /// Write every type's accessors to this path instead of `<dir>/<type>_accessor.go`.
    pub fn output_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.output_file = Some(path.into());
        self
    }

    /// Struct tag key holding the access tokens.
    ///
    /// Default: `access`
    pub fn tag_key(mut self, key: impl Into<String>) -> Self {
        self.tag_key = key.into();
        self
    }

    /// Output file name suffix.
    ///
    /// Default: `_accessor`
    pub fn suffix(mut self, suffix: impl Into<String>) -> Self {
        self.suffix = suffix.into();
        self
    }

    pub fn tag_error_mode(mut self, mode: TagErrorMode) -> Self {
        self.tag_error_mode = mode;
        self
    }

    /// Command line recorded in the generated header.
    ///
    /// Default: the current process arguments.
    pub fn invocation(mut self, invocation: impl Into<String>) -> Self {
        self.invocation = Some(invocation.into());
        self
    }

    /// Render without writing files.
    pub fn dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Take tag key, suffix and strictness from a loaded configuration file.
    pub fn with_config(mut self, config: &AccessorConfig) -> Self {
        self.tag_key = config.generator.tag.clone();
        self.suffix = config.generator.suffix.clone();
        self.tag_error_mode = config.generator.on_bad_tag;
        self
    }

    /// Run the generator.
    ///
    /// Loads the package, renders one file per requested type and writes them
    /// in request order. The first write failure stops the run; files already
    /// written stay in place.
    pub fn run(self) -> Result<GenerationReport, GenerateError> {
        if self.requested_types().is_empty() {
            return Err(GenerateError::NoTypes);
        }

        let source = match &self.package_source {
            Some(source) => source.clone(),
            None => resolve_patterns(&self.patterns)?,
        };
        let package = load_package(&source)?;
        let files = self.generate(&package, &source.dir)?;

        if !self.dry_run {
            for file in &files {
                fs::write(&file.path, &file.content).map_err(|source| GenerateError::Write {
                    path: file.path.clone(),
                    source,
                })?;
                info!(
                    "wrote {} ({} accessors for {})",
                    file.path.display(),
                    file.accessors,
                    file.type_name
                );
            }
        }

        Ok(GenerationReport {
            package: package.name,
            files,
            dry_run: self.dry_run,
        })
    }

    /// Render the accessor files for an already loaded package without touching disk.
    pub fn generate(&self, package: &Package, dir: &Path) -> Result<Vec<GeneratedFile>, GenerateError> {
        let type_names = self.requested_types();
        let renderer = AccessorRenderer::new()?;
        let walker = StructWalker::new(&self.tag_key, self.tag_error_mode);
        let mut context = GenerationContext::new(&renderer, self.header(&package.name), &type_names);

        for file in &package.files {
            let records = walker.walk(file);
            for type_name in &type_names {
                if let Some(record) = records.get(type_name.as_str()) {
                    debug!("{}: emitting accessors for {}", file.path.display(), type_name);
                    context.emit(record)?;
                }
            }
        }

        Ok(context
            .into_buffers()
            .map(|(type_name, buffer)| GeneratedFile {
                path: self.output_path(&type_name, dir),
                type_name,
                content: buffer.content,
                accessors: buffer.accessors,
            })
            .collect())
    }

    /// Requested names without blanks or repeats, in request order.
    fn requested_types(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for name in &self.type_names {
            let name = name.trim();
            if !name.is_empty() && !names.iter().any(|n| n == name) {
                names.push(name.to_string());
            }
        }
        names
    }

    fn header(&self, package: &str) -> String {
        let invocation = self
            .invocation
            .clone()
            .unwrap_or_else(|| std::env::args().skip(1).collect::<Vec<_>>().join(" "));
        format!("// Code generated by \"accessor {invocation}\"; DO NOT EDIT.\n\npackage {package}\n\n")
    }

    fn output_path(&self, type_name: &str, dir: &Path) -> PathBuf {
        match &self.output_file {
            Some(path) => path.clone(),
            None => dir.join(format!("{type_name}{}.go", self.suffix).to_lowercase()),
        }
    }
}

impl Default for AccessorGenerator {
    fn default() -> Self {
        Self::new()
    }
}

/// Accumulated output for one requested type.
struct OutputBuffer {
    content: String,
    accessors: usize,
}

/// State of one generation run: a buffer per requested type, shared across files.
struct GenerationContext<'a> {
    renderer: &'a AccessorRenderer,
    buffers: IndexMap<String, OutputBuffer>,
}

impl<'a> GenerationContext<'a> {
    fn new(renderer: &'a AccessorRenderer, header: String, type_names: &[String]) -> Self {
        let buffers = type_names
            .iter()
            .map(|name| {
                (
                    name.clone(),
                    OutputBuffer {
                        content: header.clone(),
                        accessors: 0,
                    },
                )
            })
            .collect();
        Self { renderer, buffers }
    }

    /// Append setter then getter for each field of `record`, as its policy allows.
    fn emit(&mut self, record: &RecordDecl) -> Result<(), GenerateError> {
        let Some(buffer) = self.buffers.get_mut(&record.name) else {
            return Ok(());
        };
        let receiver_type = record.receiver_type();
        for field in &record.fields {
            for kind in field.access.kinds() {
                let method = self
                    .renderer
                    .render_kind(kind, &receiver_type, &field.name, &field.type_text)?;
                buffer.content.push_str(&method);
                buffer.content.push('\n');
                buffer.accessors += 1;
            }
        }
        Ok(())
    }

    fn into_buffers(self) -> impl Iterator<Item = (String, OutputBuffer)> {
        self.buffers.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scanner::parse_source;

    fn package(sources: &[(&str, &str)]) -> Package {
        let files = sources
            .iter()
            .map(|(name, src)| parse_source(Path::new(name), src).unwrap())
            .collect::<Vec<_>>();
        Package {
            name: files[0].package.clone(),
            files,
        }
    }

    fn generator(types: &[&str]) -> AccessorGenerator {
        AccessorGenerator::new()
            .type_names(types.iter().copied())
            .invocation("-type Point")
    }

    const POINT: &str = "package geo\n\ntype Point struct {\n\tX int `access:\"r,w\"`\n\ty int\n}\n";

    #[test]
    fn test_point_output() {
        let pkg = package(&[("point.go", POINT)]);
        let files = generator(&["Point"]).generate(&pkg, Path::new("geo")).unwrap();
        assert_eq!(files.len(), 1);
        assert_eq!(files[0].path, Path::new("geo").join("point_accessor.go"));
        assert_eq!(files[0].accessors, 3);
        assert_eq!(
            files[0].content,
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
"
        );
    }

    #[test]
    fn test_unmatched_type_gets_boilerplate_only() {
        let pkg = package(&[("point.go", POINT)]);
        let files = generator(&["Missing"]).generate(&pkg, Path::new(".")).unwrap();
        assert_eq!(files[0].accessors, 0);
        assert_eq!(
            files[0].content,
            "// Code generated by \"accessor -type Point\"; DO NOT EDIT.\n\npackage geo\n\n"
        );
    }

    #[test]
    fn test_records_accumulate_across_files() {
        let pkg = package(&[
            ("a.go", "package geo\n\ntype Point struct{ A int `access:\"r\"` }\n"),
            ("b.go", "package geo\n\ntype Point struct{ B int `access:\"w\"` }\n"),
        ]);
        let files = generator(&["Point"]).generate(&pkg, Path::new(".")).unwrap();
        let content = &files[0].content;
        let get_a = content.find("GetA").unwrap();
        let set_b = content.find("SetB").unwrap();
        assert!(get_a < set_b);
        assert_eq!(content.matches("DO NOT EDIT").count(), 1);
    }

    #[test]
    fn test_one_file_per_requested_type_in_order() {
        let pkg = package(&[(
            "shapes.go",
            "package geo\n\ntype Line struct{ From, To Point }\ntype Point struct{ X int }\n",
        )]);
        let files = generator(&["Point", "Line", "Point", " "])
            .generate(&pkg, Path::new("out"))
            .unwrap();
        let names: Vec<&str> = files.iter().map(|f| f.type_name.as_str()).collect();
        assert_eq!(names, vec!["Point", "Line"]);
        assert_eq!(files[1].path, Path::new("out").join("line_accessor.go"));
        assert!(files[1].content.contains("func (l *Line) SetFrom(param Point) {"));
        assert!(!files[1].content.contains("SetTo"));
    }

    #[test]
    fn test_output_override_and_suffix() {
        let pkg = package(&[("point.go", POINT)]);
        let files = generator(&["Point"])
            .suffix("_Gen")
            .generate(&pkg, Path::new("src"))
            .unwrap();
        assert_eq!(files[0].path, Path::new("src").join("point_gen.go"));

        let files = generator(&["Point"])
            .output_file("custom.go")
            .generate(&pkg, Path::new("src"))
            .unwrap();
        assert_eq!(files[0].path, PathBuf::from("custom.go"));
    }

    #[test]
    fn test_custom_tag_key_and_empty_policy() {
        let pkg = package(&[(
            "cfg.go",
            "package cfg\n\ntype Config struct {\n\tHost string `get:\"r\"`\n\tPort int `get:\"-\"`\n}\n",
        )]);
        let files = generator(&["Config"]).tag_key("get").generate(&pkg, Path::new(".")).unwrap();
        assert_eq!(files[0].accessors, 1);
        assert!(files[0].content.contains("func (c *Config) GetHost() string {"));
        assert!(!files[0].content.contains("Port"));
    }

    #[test]
    fn test_with_config() {
        let mut config = AccessorConfig::default();
        config.generator.tag = "acc".to_string();
        config.generator.on_bad_tag = TagErrorMode::SkipField;
        let generator = AccessorGenerator::new().with_config(&config);
        assert_eq!(generator.tag_key, "acc");
        assert_eq!(generator.tag_error_mode, TagErrorMode::SkipField);
    }

    #[test]
    fn test_run_uses_resolved_package_source() {
        let tmp = tempfile::tempdir().unwrap();
        let file = tmp.path().join("point.go");
        std::fs::write(&file, POINT).unwrap();

        let report = generator(&["Point"])
            .source(tmp.path().join("not-resolved"))
            .package_source(PackageSource {
                dir: tmp.path().to_path_buf(),
                files: vec![file],
                build: None,
            })
            .dry_run(true)
            .run()
            .unwrap();
        assert_eq!(report.package, "geo");
        assert_eq!(report.files[0].path, tmp.path().join("point_accessor.go"));
    }

    #[test]
    fn test_run_without_types_is_an_error() {
        let err = AccessorGenerator::new().source(".").run().unwrap_err();
        assert!(matches!(err, GenerateError::NoTypes));
    }
}
