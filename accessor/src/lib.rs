//! Getter and setter generation for Go struct types.
//!
//! Fields opt in through a struct tag (`access:"r,w"`) or fall back to Go's
//! naming convention: exported fields get both accessors, unexported ones a
//! getter only.
//!
//! # Usage
//!
//! ```no_run
//! let report = accessor::generate_accessors()
//!     .source("internal/geo")
//!     .type_name("Point")
//!     .run()?;
//! for file in &report.files {
//!     println!("{} ({} accessors)", file.path.display(), file.accessors);
//! }
//! # Ok::<(), accessor::GenerateError>(())
//! ```

pub mod config;
mod errors;
pub mod generator;
pub mod render;
pub mod scanner;
pub mod tags;
pub mod walker;

pub use config::{AccessorConfig, CONFIG_FILE_NAME, GeneratorSettings};
pub use errors::{ConfigError, GenerateError, LoadError, RenderError, TagError};
pub use generator::{AccessorGenerator, GeneratedFile, GenerationReport};
pub use tags::{AccessKind, AccessPolicy, DEFAULT_TAG_KEY};
pub use walker::{FieldDescriptor, RecordDecl, StructWalker, TagErrorMode};

/// Create a new accessor generator builder.
pub fn generate_accessors() -> AccessorGenerator {
    AccessorGenerator::new()
}
