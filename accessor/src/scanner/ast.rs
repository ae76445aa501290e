//! Syntax tree for the declaration-level subset of Go the generator reads.
//!
//! Type expressions render back to source through [`fmt::Display`] in the
//! single-line form `gofmt` uses for field types.

use std::fmt;
use std::path::PathBuf;

/// One parsed Go file.
#[derive(Debug, Clone)]
pub struct SourceFile {
    /// Path the file was read from
    pub path: PathBuf,
    /// Name from the `package` clause
    pub package: String,
    /// Top-level declarations in source order
    pub decls: Vec<Decl>,
}

impl SourceFile {
    /// Iterate over every top-level type spec in declaration order.
    pub fn type_specs(&self) -> impl Iterator<Item = &TypeSpec> {
        self.decls
            .iter()
            .filter_map(|decl| match decl {
                Decl::Type(specs) => Some(specs),
                _ => None,
            })
            .flatten()
    }
}

#[derive(Debug, Clone)]
pub enum Decl {
    /// `type` declaration, single or grouped
    Type(Vec<TypeSpec>),
    /// Function or method; only the name is kept
    Func { name: String, method: bool },
    /// `var` or `const` declaration, skipped
    Value { keyword: &'static str },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeSpec {
    pub name: String,
    pub type_params: Vec<TypeParam>,
    /// `type A = B`
    pub alias: bool,
    pub ty: TypeExpr,
}

impl TypeSpec {
    /// Names of all type parameters, flattened (`[K, V any]` gives `K`, `V`).
    pub fn type_param_names(&self) -> Vec<String> {
        self.type_params.iter().flat_map(|p| p.names.iter().cloned()).collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeParam {
    pub names: Vec<String>,
    pub constraint: TypeExpr,
}

/// One line of a struct body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDecl {
    /// Declared names; empty for embedded fields
    pub names: Vec<String>,
    pub ty: TypeExpr,
    /// Tag literal exactly as written, quotes included
    pub tag: Option<String>,
}

impl FieldDecl {
    pub fn is_embedded(&self) -> bool {
        self.names.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChanDir {
    Both,
    Send,
    Recv,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub name: Option<String>,
    pub ty: TypeExpr,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub params: Vec<Param>,
    pub results: Vec<Param>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InterfaceElem {
    Method { name: String, sig: Signature },
    /// Embedded interface or type-set term
    Embed(TypeExpr),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeExpr {
    Named {
        package: Option<String>,
        name: String,
        args: Vec<TypeExpr>,
    },
    Pointer(Box<TypeExpr>),
    Slice(Box<TypeExpr>),
    Array {
        /// Length expression as source text (`4`, `N`, `...`)
        len: String,
        elem: Box<TypeExpr>,
    },
    Map {
        key: Box<TypeExpr>,
        value: Box<TypeExpr>,
    },
    Chan {
        dir: ChanDir,
        elem: Box<TypeExpr>,
    },
    Func(Signature),
    Struct(Vec<FieldDecl>),
    Interface(Vec<InterfaceElem>),
    Paren(Box<TypeExpr>),
    /// `...T` in a final parameter
    Ellipsis(Box<TypeExpr>),
    /// `~T` in a constraint
    Tilde(Box<TypeExpr>),
    /// `A | B` in a constraint
    Union(Vec<TypeExpr>),
}

fn write_joined<T: fmt::Display>(f: &mut fmt::Formatter<'_>, items: &[T], sep: &str) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{item}")?;
    }
    Ok(())
}

impl fmt::Display for TypeExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TypeExpr::Named { package, name, args } => {
                if let Some(package) = package {
                    write!(f, "{package}.")?;
                }
                f.write_str(name)?;
                if !args.is_empty() {
                    f.write_str("[")?;
                    write_joined(f, args, ", ")?;
                    f.write_str("]")?;
                }
                Ok(())
            }
            TypeExpr::Pointer(elem) => write!(f, "*{elem}"),
            TypeExpr::Slice(elem) => write!(f, "[]{elem}"),
            TypeExpr::Array { len, elem } => write!(f, "[{len}]{elem}"),
            TypeExpr::Map { key, value } => write!(f, "map[{key}]{value}"),
            TypeExpr::Chan { dir, elem } => match dir {
                ChanDir::Both => write!(f, "chan {elem}"),
                ChanDir::Send => write!(f, "chan<- {elem}"),
                ChanDir::Recv => write!(f, "<-chan {elem}"),
            },
            TypeExpr::Func(sig) => write!(f, "func{sig}"),
            TypeExpr::Struct(fields) if fields.is_empty() => f.write_str("struct{}"),
            TypeExpr::Struct(fields) => {
                f.write_str("struct{ ")?;
                write_joined(f, fields, "; ")?;
                f.write_str(" }")
            }
            TypeExpr::Interface(elems) if elems.is_empty() => f.write_str("interface{}"),
            TypeExpr::Interface(elems) => {
                f.write_str("interface{ ")?;
                write_joined(f, elems, "; ")?;
                f.write_str(" }")
            }
            TypeExpr::Paren(inner) => write!(f, "({inner})"),
            TypeExpr::Ellipsis(elem) => write!(f, "...{elem}"),
            TypeExpr::Tilde(elem) => write!(f, "~{elem}"),
            TypeExpr::Union(terms) => write_joined(f, terms, " | "),
        }
    }
}

impl fmt::Display for Param {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{name} {}", self.ty),
            None => write!(f, "{}", self.ty),
        }
    }
}

impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("(")?;
        write_joined(f, &self.params, ", ")?;
        f.write_str(")")?;
        match self.results.as_slice() {
            [] => Ok(()),
            [single] if single.name.is_none() => write!(f, " {single}"),
            results => {
                f.write_str(" (")?;
                write_joined(f, results, ", ")?;
                f.write_str(")")
            }
        }
    }
}

impl fmt::Display for FieldDecl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.names.is_empty() {
            write!(f, "{} ", self.names.join(", "))?;
        }
        write!(f, "{}", self.ty)?;
        if let Some(tag) = &self.tag {
            write!(f, " {tag}")?;
        }
        Ok(())
    }
}

impl fmt::Display for InterfaceElem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InterfaceElem::Method { name, sig } => write!(f, "{name}{sig}"),
            InterfaceElem::Embed(ty) => write!(f, "{ty}"),
        }
    }
}
