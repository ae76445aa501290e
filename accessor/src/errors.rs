use std::path::PathBuf;

use thiserror::Error;

/// Failure to turn the requested paths into exactly one parsed package.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A path could not be inspected or read.
    #[error("{}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A file failed to lex or parse.
    #[error("{}:{line}:{column}: {message}", .path.display())]
    Syntax {
        path: PathBuf,
        line: usize,
        column: usize,
        message: String,
    },

    /// The directory holds no buildable Go files.
    #[error("no Go files in {}", .path.display())]
    NoGoFiles { path: PathBuf },

    /// The files declare more than one package.
    #[error("error: {count} packages found ({})", .names.join(", "))]
    PackageCount { count: usize, names: Vec<String> },
}

/// Malformed struct tag on a single field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TagError {
    #[error("bad syntax for struct tag key")]
    KeySyntax,

    #[error("bad syntax for struct tag pair")]
    TagSyntax,

    #[error("bad syntax for struct tag value")]
    ValueSyntax,
}

/// The accessor template could not be compiled or rendered.
#[derive(Debug, Error)]
#[error("rendering {template}: {source}")]
pub struct RenderError {
    pub template: &'static str,
    #[source]
    pub source: minijinja::Error,
}

/// Problem reading `accessor.toml`.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", .path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {}: {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

/// Top-level error type returned by a generation run.
#[derive(Debug, Error)]
pub enum GenerateError {
    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Render(#[from] RenderError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    /// An output file could not be written. Files written earlier in the run stay on disk.
    #[error("writing output: {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// No type names were requested.
    #[error("no type names given")]
    NoTypes,
}
