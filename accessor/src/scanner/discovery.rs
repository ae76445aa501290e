//! Package loading: resolve the command-line patterns into Go files, parse
//! them, and check they form a single package.

use std::fs;
use std::path::{Path, PathBuf};

use log::debug;
use walkdir::WalkDir;

use super::ast::SourceFile;
use super::constraint::BuildContext;
use super::parser::parse_source;
use crate::errors::LoadError;

/// Where the package comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PackageSource {
    /// Directory generated files are written to by default
    pub dir: PathBuf,
    /// Files to parse, in load order
    pub files: Vec<PathBuf>,
    /// Set for directory scans: files whose build constraints reject this
    /// platform are left out. Explicit file lists are taken as given.
    pub build: Option<BuildContext>,
}

/// A loaded package: its name and parsed files in load order.
#[derive(Debug, Clone)]
pub struct Package {
    pub name: String,
    pub files: Vec<SourceFile>,
}

/// Resolve one directory or a list of files into a [`PackageSource`].
///
/// An empty pattern list means the current directory. A single directory
/// contributes its non-test `.go` files, sorted by name; anything else is
/// taken as an explicit file list whose first entry decides the output
/// directory.
pub fn resolve_patterns(patterns: &[PathBuf]) -> Result<PackageSource, LoadError> {
    let patterns: Vec<PathBuf> = if patterns.is_empty() {
        vec![PathBuf::from(".")]
    } else {
        patterns.to_vec()
    };

    if patterns.len() == 1 && is_directory(&patterns[0])? {
        let dir = patterns[0].clone();
        let build = BuildContext::from_env();
        let files = go_files_in(&dir, &build)?;
        if files.is_empty() {
            return Err(LoadError::NoGoFiles { path: dir });
        }
        return Ok(PackageSource {
            dir,
            files,
            build: Some(build),
        });
    }

    let dir = match patterns[0].parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => PathBuf::from("."),
    };
    Ok(PackageSource {
        dir,
        files: patterns,
        build: None,
    })
}

/// Reports whether the named path is a directory. A path that cannot be
/// inspected is an error.
fn is_directory(path: &Path) -> Result<bool, LoadError> {
    fs::metadata(path)
        .map(|meta| meta.is_dir())
        .map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })
}

fn go_files_in(dir: &Path, build: &BuildContext) -> Result<Vec<PathBuf>, LoadError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1).sort_by_file_name() {
        let entry = entry.map_err(|err| LoadError::Io {
            path: dir.to_path_buf(),
            source: err.into(),
        })?;
        let path = entry.path();
        let file_name = entry.file_name().to_string_lossy();
        if !entry.file_type().is_file()
            || path.extension().is_none_or(|ext| ext != "go")
            || file_name.ends_with("_test.go")
            || file_name.starts_with('.')
            || file_name.starts_with('_')
        {
            continue;
        }
        if !build.matches_file_name(&file_name) {
            debug!("{}: excluded by file name for {}/{}", path.display(), build.goos, build.goarch);
            continue;
        }
        files.push(path.to_path_buf());
    }
    Ok(files)
}

/// Parse every file of `source` and check they share one package clause.
pub fn load_package(source: &PackageSource) -> Result<Package, LoadError> {
    let mut files = Vec::with_capacity(source.files.len());
    for path in &source.files {
        let content = fs::read_to_string(path).map_err(|err| LoadError::Io {
            path: path.clone(),
            source: err,
        })?;
        if let Some(build) = &source.build {
            if !build.matches_source(&content) {
                debug!("{}: excluded by build constraints", path.display());
                continue;
            }
        }
        let file = parse_source(path, &content).map_err(|err| LoadError::Syntax {
            path: path.clone(),
            line: err.line,
            column: err.column,
            message: err.message,
        })?;
        debug!("parsed {} (package {})", path.display(), file.package);
        files.push(file);
    }

    let mut names: Vec<String> = Vec::new();
    for file in &files {
        if !names.contains(&file.package) {
            names.push(file.package.clone());
        }
    }
    match names.len() {
        1 => Ok(Package {
            name: names.remove(0),
            files,
        }),
        0 => Err(LoadError::NoGoFiles {
            path: source.dir.clone(),
        }),
        count => Err(LoadError::PackageCount { count, names }),
    }
}
