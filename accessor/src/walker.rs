//! Struct discovery: turns a parsed file into per-struct field descriptors.

use clap::ValueEnum;
use indexmap::IndexMap;
use log::{debug, warn};
use serde::{Deserialize, Serialize};

use crate::scanner::{FieldDecl, SourceFile, TypeExpr, TypeSpec};
use crate::tags::{AccessPolicy, resolve};

/// What to do with a struct when one of its field tags does not parse.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum TagErrorMode {
    /// Drop the whole struct from this file's results.
    #[default]
    AbandonRecord,
    /// Drop only the offending field.
    SkipField,
}

/// A named field and the accessors it should get.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: String,
    /// Field type as Go source (`map[string][]int`)
    pub type_text: String,
    pub access: AccessPolicy,
}

/// A struct type declaration and its named fields in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordDecl {
    pub name: String,
    pub type_params: Vec<String>,
    pub fields: Vec<FieldDescriptor>,
}

impl RecordDecl {
    /// Receiver type without the pointer: `Point`, or `Pair[K, V]` for generic structs.
    pub fn receiver_type(&self) -> String {
        if self.type_params.is_empty() {
            self.name.clone()
        } else {
            format!("{}[{}]", self.name, self.type_params.join(", "))
        }
    }
}

/// Walks files for struct declarations, resolving field policies from `tag_key`.
#[derive(Debug, Clone, Copy)]
pub struct StructWalker<'a> {
    tag_key: &'a str,
    mode: TagErrorMode,
}

impl<'a> StructWalker<'a> {
    pub fn new(tag_key: &'a str, mode: TagErrorMode) -> Self {
        Self { tag_key, mode }
    }

    /// Collect every struct declared at the top level of `file`, keyed by name.
    ///
    /// Declaration order is kept. A later struct with an already-seen name
    /// replaces the earlier one in place.
    pub fn walk(&self, file: &SourceFile) -> IndexMap<String, RecordDecl> {
        let mut records = IndexMap::new();
        for spec in file.type_specs() {
            let TypeExpr::Struct(fields) = &spec.ty else {
                continue;
            };
            match self.record(file, spec, fields) {
                Some(record) => {
                    debug!("found struct {} with {} fields", record.name, record.fields.len());
                    records.insert(record.name.clone(), record);
                }
                None => warn!(
                    "{}: struct {} dropped because of a malformed field tag",
                    file.path.display(),
                    spec.name
                ),
            }
        }
        records
    }

    fn record(&self, file: &SourceFile, spec: &TypeSpec, fields: &[FieldDecl]) -> Option<RecordDecl> {
        let mut descriptors = Vec::with_capacity(fields.len());
        for field in fields {
            // Only the first of `A, B int` is honoured; embedded fields have no name.
            let Some(name) = field.names.first() else {
                continue;
            };
            let access = match resolve(field.tag.as_deref(), name, self.tag_key) {
                Ok(access) => access,
                Err(err) => match self.mode {
                    TagErrorMode::AbandonRecord => return None,
                    TagErrorMode::SkipField => {
                        warn!(
                            "{}: skipping {}.{}: {err}",
                            file.path.display(),
                            spec.name,
                            name
                        );
                        continue;
                    }
                },
            };
            debug!("{}.{}: {:?}", spec.name, name, access);
            descriptors.push(FieldDescriptor {
                name: name.clone(),
                type_text: field.ty.to_string(),
                access,
            });
        }
        Some(RecordDecl {
            name: spec.name.clone(),
            type_params: spec.type_param_names(),
            fields: descriptors,
        })
    }
}
