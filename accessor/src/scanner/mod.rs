//! Go source scanning for struct declarations.
//!
//! This module provides functionality to:
//! - Discover the Go files that make up one package
//! - Tokenize and parse them into declaration-level syntax trees
//! - Render field type expressions back to Go source

mod ast;
mod constraint;
mod discovery;
mod lexer;
mod parser;

pub use ast::{
    ChanDir, Decl, FieldDecl, InterfaceElem, Param, Signature, SourceFile, TypeExpr, TypeParam, TypeSpec,
};
pub use constraint::BuildContext;
pub use discovery::{Package, PackageSource, load_package, resolve_patterns};
pub use parser::{ParseError, parse_source};
