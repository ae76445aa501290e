//! Struct tag parsing and access policy resolution.
//!
//! A field's policy comes from the `access` entry of its struct tag
//! (`access:"r,w"`), or, when the entry is missing, from whether the field
//! name is exported.

use crate::errors::TagError;

/// Tag key read when none is configured.
pub const DEFAULT_TAG_KEY: &str = "access";
/// Token granting a getter.
pub const ACCESS_READ: &str = "r";
/// Token granting a setter.
pub const ACCESS_WRITE: &str = "w";

/// One kind of generated accessor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessKind {
    Write,
    Read,
}

/// Resolved set of accessors to generate for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct AccessPolicy {
    read: bool,
    write: bool,
}

impl AccessPolicy {
    pub const NONE: Self = Self {
        read: false,
        write: false,
    };
    pub const READ_ONLY: Self = Self {
        read: true,
        write: false,
    };
    pub const WRITE_ONLY: Self = Self {
        read: false,
        write: true,
    };
    pub const READ_WRITE: Self = Self { read: true, write: true };

    /// Keep the recognised tokens, drop everything else.
    pub fn from_tokens<'a>(tokens: impl IntoIterator<Item = &'a str>) -> Self {
        tokens.into_iter().fold(Self::NONE, |policy, token| match token {
            ACCESS_READ => Self { read: true, ..policy },
            ACCESS_WRITE => Self { write: true, ..policy },
            _ => policy,
        })
    }

    /// Exported (uppercase-initial) names get both accessors, all others a getter.
    pub fn from_convention(field_name: &str) -> Self {
        if field_name.chars().next().is_some_and(char::is_uppercase) {
            Self::READ_WRITE
        } else {
            Self::READ_ONLY
        }
    }

    pub fn is_empty(self) -> bool {
        !self.read && !self.write
    }

    /// Kinds to emit, setter before getter.
    pub fn kinds(self) -> impl Iterator<Item = AccessKind> {
        [
            (self.write, AccessKind::Write),
            (self.read, AccessKind::Read),
        ]
        .into_iter()
        .filter_map(|(present, kind)| present.then_some(kind))
    }
}

/// One `key:"name,opt1,opt2"` entry of a struct tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructTag {
    pub key: String,
    /// First comma-separated element of the value
    pub name: String,
    /// Remaining elements
    pub options: Vec<String>,
}

/// All entries of a struct tag, in source order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StructTags {
    tags: Vec<StructTag>,
}

impl StructTags {
    /// Parse the conventional `key:"value" key2:"value2"` tag syntax.
    pub fn parse(tag: &str) -> Result<Self, TagError> {
        let mut tags = Vec::new();
        let mut rest = tag.as_bytes();

        loop {
            while rest.first() == Some(&b' ') {
                rest = &rest[1..];
            }
            if rest.is_empty() {
                break;
            }

            // Scan to colon. A space, a quote or a control character is a syntax error.
            let mut i = 0;
            while i < rest.len() && rest[i] > b' ' && rest[i] != b':' && rest[i] != b'"' && rest[i] != 0x7f {
                i += 1;
            }
            if i == 0 {
                return Err(TagError::KeySyntax);
            }
            if i + 1 >= rest.len() || rest[i] != b':' {
                return Err(TagError::TagSyntax);
            }
            if rest[i + 1] != b'"' {
                return Err(TagError::ValueSyntax);
            }
            let key = String::from_utf8_lossy(&rest[..i]).into_owned();
            rest = &rest[i + 1..];

            // Scan the quoted value.
            let mut j = 1;
            while j < rest.len() && rest[j] != b'"' {
                if rest[j] == b'\\' {
                    j += 1;
                }
                j += 1;
            }
            if j >= rest.len() {
                return Err(TagError::ValueSyntax);
            }
            let quoted = std::str::from_utf8(&rest[..=j]).map_err(|_| TagError::ValueSyntax)?;
            let value = unquote(quoted).ok_or(TagError::ValueSyntax)?;
            rest = &rest[j + 1..];

            let mut parts = value.split(',').map(str::to_string);
            let name = parts.next().unwrap_or_default();
            tags.push(StructTag {
                key,
                name,
                options: parts.collect(),
            });
        }

        Ok(Self { tags })
    }

    /// First entry with the given key.
    pub fn get(&self, key: &str) -> Option<&StructTag> {
        self.tags.iter().find(|tag| tag.key == key)
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

/// Decode a Go string literal, raw (backquoted) or interpreted.
pub fn unquote(literal: &str) -> Option<String> {
    if literal.len() >= 2 && literal.starts_with('`') && literal.ends_with('`') {
        let inner = &literal[1..literal.len() - 1];
        if inner.contains('`') {
            return None;
        }
        return Some(inner.replace('\r', ""));
    }
    if literal.len() < 2 || !literal.starts_with('"') || !literal.ends_with('"') {
        return None;
    }

    let inner = &literal[1..literal.len() - 1];
    let mut out: Vec<u8> = Vec::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(ch) = chars.next() {
        match ch {
            '"' | '\n' => return None,
            '\\' => match chars.next()? {
                'a' => out.push(0x07),
                'b' => out.push(0x08),
                'f' => out.push(0x0c),
                'n' => out.push(b'\n'),
                'r' => out.push(b'\r'),
                't' => out.push(b'\t'),
                'v' => out.push(0x0b),
                '\\' => out.push(b'\\'),
                '"' => out.push(b'"'),
                'x' => out.push(u8::try_from(hex_digits(&mut chars, 2)?).ok()?),
                'u' => push_char(&mut out, char::from_u32(hex_digits(&mut chars, 4)?)?),
                'U' => push_char(&mut out, char::from_u32(hex_digits(&mut chars, 8)?)?),
                first @ '0'..='7' => {
                    let mut value = first.to_digit(8)?;
                    for _ in 0..2 {
                        value = value * 8 + chars.next()?.to_digit(8)?;
                    }
                    out.push(u8::try_from(value).ok()?);
                }
                _ => return None,
            },
            other => push_char(&mut out, other),
        }
    }
    String::from_utf8(out).ok()
}

fn hex_digits(chars: &mut std::str::Chars<'_>, count: usize) -> Option<u32> {
    let mut value = 0u32;
    for _ in 0..count {
        value = value * 16 + chars.next()?.to_digit(16)?;
    }
    Some(value)
}

fn push_char(out: &mut Vec<u8>, ch: char) {
    let mut buf = [0u8; 4];
    out.extend_from_slice(ch.encode_utf8(&mut buf).as_bytes());
}

/// Resolve the access policy of one field.
///
/// `tag_literal` is the field's tag exactly as written in source. When the
/// tag carries `key`, its name and options are filtered down to `r`/`w`;
/// otherwise the naming convention decides.
pub fn resolve(tag_literal: Option<&str>, field_name: &str, key: &str) -> Result<AccessPolicy, TagError> {
    let Some(literal) = tag_literal else {
        return Ok(AccessPolicy::from_convention(field_name));
    };
    let tag = unquote(literal).ok_or(TagError::TagSyntax)?;
    let tags = StructTags::parse(&tag)?;
    match tags.get(key) {
        Some(entry) => Ok(AccessPolicy::from_tokens(
            std::iter::once(entry.name.as_str()).chain(entry.options.iter().map(String::as_str)),
        )),
        None => Ok(AccessPolicy::from_convention(field_name)),
    }
}
