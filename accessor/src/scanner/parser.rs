//! Recursive-descent parser for Go package clauses, imports and top-level
//! declarations.
//!
//! Type declarations are parsed in full. Function bodies and `var`/`const`
//! declarations are skipped as balanced token runs, since nothing inside them
//! contributes accessors.

use std::path::Path;

use super::ast::{
    ChanDir, Decl, FieldDecl, InterfaceElem, Param, Signature, SourceFile, TypeExpr, TypeParam, TypeSpec,
};
use super::lexer::{LexError, LitKind, Token, TokenKind, tokenize};

/// A syntax error with its 1-indexed position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

impl From<LexError> for ParseError {
    fn from(err: LexError) -> Self {
        Self {
            line: err.line,
            column: err.column,
            message: err.message,
        }
    }
}

type ParseResult<T> = Result<T, ParseError>;

/// Parse one Go source file.
pub fn parse_source(path: &Path, source: &str) -> ParseResult<SourceFile> {
    let tokens = tokenize(source)?;
    Parser { tokens, pos: 0 }.file(path)
}

/// Keywords that start a type literal.
const TYPE_KEYWORDS: &[&str] = &["map", "chan", "func", "struct", "interface"];

/// Binary operators that `gofmt` surrounds with spaces inside array lengths.
const BINARY_OPERATORS: &[&str] = &["+", "-", "*", "/", "%", "<<", ">>", "&", "|", "^", "&^"];

struct Parser {
    tokens: Vec<Token>,
    pos: usize,
}

impl Parser {
    fn token_at(&self, offset: usize) -> &Token {
        // The stream always ends with Eof, so clamping keeps lookahead in bounds.
        let index = (self.pos + offset).min(self.tokens.len() - 1);
        &self.tokens[index]
    }

    fn peek(&self) -> &TokenKind {
        &self.token_at(0).kind
    }

    fn peek_at(&self, offset: usize) -> &TokenKind {
        &self.token_at(offset).kind
    }

    fn advance(&mut self) -> TokenKind {
        let kind = self.peek().clone();
        if kind != TokenKind::Eof {
            self.pos += 1;
        }
        kind
    }

    fn is_punct(&self, punct: &str) -> bool {
        matches!(self.peek(), TokenKind::Punct(p) if *p == punct)
    }

    fn is_keyword(&self, keyword: &str) -> bool {
        matches!(self.peek(), TokenKind::Keyword(kw) if *kw == keyword)
    }

    fn eat_punct(&mut self, punct: &str) -> bool {
        if self.is_punct(punct) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn error(&self, message: impl Into<String>) -> ParseError {
        let token = self.token_at(0);
        ParseError {
            line: token.line,
            column: token.column,
            message: message.into(),
        }
    }

    fn unexpected(&self, expected: &str) -> ParseError {
        self.error(format!("expected {expected}, found {}", self.peek()))
    }

    fn expect_punct(&mut self, punct: &str) -> ParseResult<()> {
        if self.eat_punct(punct) {
            Ok(())
        } else {
            Err(self.unexpected(&format!("'{punct}'")))
        }
    }

    fn expect_keyword(&mut self, keyword: &str) -> ParseResult<()> {
        if self.is_keyword(keyword) {
            self.advance();
            Ok(())
        } else {
            Err(self.unexpected(keyword))
        }
    }

    fn expect_ident(&mut self) -> ParseResult<String> {
        match self.peek() {
            TokenKind::Ident(name) => {
                let name = name.clone();
                self.advance();
                Ok(name)
            }
            _ => Err(self.unexpected("identifier")),
        }
    }

    /// A semicolon may be omitted before a closing `)` or `}`.
    fn expect_semicolon(&mut self) -> ParseResult<()> {
        match self.peek() {
            TokenKind::Semicolon { .. } => {
                self.advance();
                Ok(())
            }
            TokenKind::Punct(")") | TokenKind::Punct("}") | TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("';'")),
        }
    }

    fn file(mut self, path: &Path) -> ParseResult<SourceFile> {
        self.expect_keyword("package")?;
        let package = self.expect_ident()?;
        self.expect_semicolon()?;

        while self.is_keyword("import") {
            self.advance();
            if self.eat_punct("(") {
                while !self.is_punct(")") {
                    self.import_spec()?;
                    self.expect_semicolon()?;
                }
                self.expect_punct(")")?;
            } else {
                self.import_spec()?;
            }
            self.expect_semicolon()?;
        }

        let mut decls = Vec::new();
        while *self.peek() != TokenKind::Eof {
            decls.push(self.top_level_decl()?);
            self.expect_semicolon()?;
        }

        Ok(SourceFile {
            path: path.to_path_buf(),
            package,
            decls,
        })
    }

    /// Imports are checked for syntax only; field types keep their package qualifier as written.
    fn import_spec(&mut self) -> ParseResult<()> {
        if matches!(self.peek(), TokenKind::Ident(_) | TokenKind::Punct(".")) {
            self.advance();
        }
        match self.peek() {
            TokenKind::Literal(LitKind::String, _) => {
                self.advance();
                Ok(())
            }
            _ => Err(self.unexpected("import path")),
        }
    }

    fn top_level_decl(&mut self) -> ParseResult<Decl> {
        match self.peek() {
            TokenKind::Keyword("type") => {
                self.advance();
                let mut specs = Vec::new();
                if self.eat_punct("(") {
                    while !self.is_punct(")") {
                        specs.push(self.type_spec()?);
                        self.expect_semicolon()?;
                    }
                    self.expect_punct(")")?;
                } else {
                    specs.push(self.type_spec()?);
                }
                Ok(Decl::Type(specs))
            }
            TokenKind::Keyword("func") => self.func_decl(),
            TokenKind::Keyword("var") => self.skip_value_decl("var"),
            TokenKind::Keyword("const") => self.skip_value_decl("const"),
            TokenKind::Keyword("import") => Err(self.error("imports must appear before other declarations")),
            _ => Err(self.unexpected("declaration")),
        }
    }

    fn type_spec(&mut self) -> ParseResult<TypeSpec> {
        let name = self.expect_ident()?;
        let type_params = if self.type_params_follow() {
            self.type_params()?
        } else {
            Vec::new()
        };
        let alias = self.eat_punct("=");
        let ty = self.parse_type()?;
        Ok(TypeSpec {
            name,
            type_params,
            alias,
            ty,
        })
    }

    /// Whether the `[` after a type name opens a parameter list rather than an
    /// array length.
    ///
    /// `[T any]`, `[K, V any]` and `[T ~int]` declare parameters. `[N]`,
    /// `[pkg.N]`, `[N + 1]` and `[len(s)]` are lengths. As in gc, `[P *C]` is a
    /// length unless the operand is itself a type literal.
    fn type_params_follow(&self) -> bool {
        if !self.is_punct("[") || !matches!(self.peek_at(1), TokenKind::Ident(_)) {
            return false;
        }
        match self.peek_at(2) {
            TokenKind::Punct("," | "~" | "[" | "<-") => true,
            TokenKind::Ident(_) => true,
            TokenKind::Keyword(kw) => TYPE_KEYWORDS.contains(kw),
            TokenKind::Punct("*") => match self.peek_at(3) {
                TokenKind::Punct("[" | "*") => true,
                TokenKind::Keyword(kw) => TYPE_KEYWORDS.contains(kw),
                _ => false,
            },
            _ => false,
        }
    }

    fn type_params(&mut self) -> ParseResult<Vec<TypeParam>> {
        self.expect_punct("[")?;
        let mut params = Vec::new();
        loop {
            let mut names = vec![self.expect_ident()?];
            while self.eat_punct(",") {
                names.push(self.expect_ident()?);
            }
            let constraint = self.constraint()?;
            params.push(TypeParam { names, constraint });
            if !self.eat_punct(",") || self.is_punct("]") {
                break;
            }
        }
        self.expect_punct("]")?;
        Ok(params)
    }

    fn constraint(&mut self) -> ParseResult<TypeExpr> {
        let mut terms = vec![self.constraint_term()?];
        while self.eat_punct("|") {
            terms.push(self.constraint_term()?);
        }
        if terms.len() == 1 {
            Ok(terms.remove(0))
        } else {
            Ok(TypeExpr::Union(terms))
        }
    }

    fn constraint_term(&mut self) -> ParseResult<TypeExpr> {
        if self.eat_punct("~") {
            Ok(TypeExpr::Tilde(Box::new(self.parse_type()?)))
        } else {
            self.parse_type()
        }
    }

    fn func_decl(&mut self) -> ParseResult<Decl> {
        self.expect_keyword("func")?;
        let method = self.is_punct("(");
        if method {
            self.params()?;
        }
        let name = self.expect_ident()?;
        if self.is_punct("[") {
            self.type_params()?;
        }
        self.signature()?;
        if self.is_punct("{") {
            self.skip_balanced()?;
        }
        Ok(Decl::Func { name, method })
    }

    fn skip_value_decl(&mut self, keyword: &'static str) -> ParseResult<Decl> {
        self.advance();
        let mut depth = 0usize;
        loop {
            match self.peek() {
                TokenKind::Eof => break,
                TokenKind::Semicolon { .. } if depth == 0 => break,
                TokenKind::Punct("(" | "[" | "{") => depth += 1,
                TokenKind::Punct(")" | "]" | "}") => {
                    if depth == 0 {
                        return Err(self.unexpected("';'"));
                    }
                    depth -= 1;
                }
                _ => {}
            }
            self.advance();
        }
        Ok(Decl::Value { keyword })
    }

    /// Skip a `{ ... }` run, nested braces included.
    fn skip_balanced(&mut self) -> ParseResult<()> {
        self.expect_punct("{")?;
        let mut depth = 1usize;
        while depth > 0 {
            match self.advance() {
                TokenKind::Punct("{") => depth += 1,
                TokenKind::Punct("}") => depth -= 1,
                TokenKind::Eof => return Err(self.error("unexpected EOF in function body")),
                _ => {}
            }
        }
        Ok(())
    }

    fn starts_type_at(&self, offset: usize) -> bool {
        matches!(
            self.peek_at(offset),
            TokenKind::Ident(_)
                | TokenKind::Keyword("map" | "chan" | "func" | "struct" | "interface")
                | TokenKind::Punct("*" | "[" | "(" | "<-")
        )
    }

    /// Offset of the `]` closing the `[` at `offset`.
    fn matching_bracket(&self, offset: usize) -> Option<usize> {
        let mut depth = 0usize;
        let mut current = offset;
        loop {
            match self.peek_at(current) {
                TokenKind::Punct("[") => depth += 1,
                TokenKind::Punct("]") => {
                    depth -= 1;
                    if depth == 0 {
                        return Some(current);
                    }
                }
                TokenKind::Eof => return None,
                _ => {}
            }
            current += 1;
        }
    }

    /// Whether the identifier under the cursor names a parameter or field
    /// rather than starting its type.
    fn ident_is_name(&self) -> bool {
        match self.peek_at(1) {
            TokenKind::Punct("...") => true,
            // `a []int` or `a [4]int` names; `List[int]` instantiates.
            TokenKind::Punct("[") => self
                .matching_bracket(1)
                .is_some_and(|close| self.starts_type_at(close + 1)),
            TokenKind::Punct(".") => false,
            _ => self.starts_type_at(1),
        }
    }

    fn parse_type(&mut self) -> ParseResult<TypeExpr> {
        match self.peek().clone() {
            TokenKind::Ident(name) => {
                self.advance();
                let (package, name) = if self.is_punct(".") && matches!(self.peek_at(1), TokenKind::Ident(_)) {
                    self.advance();
                    (Some(name), self.expect_ident()?)
                } else {
                    (None, name)
                };
                let args = if self.is_punct("[") { self.type_args()? } else { Vec::new() };
                Ok(TypeExpr::Named { package, name, args })
            }
            TokenKind::Punct("*") => {
                self.advance();
                Ok(TypeExpr::Pointer(Box::new(self.parse_type()?)))
            }
            TokenKind::Punct("[") => {
                self.advance();
                if self.eat_punct("]") {
                    return Ok(TypeExpr::Slice(Box::new(self.parse_type()?)));
                }
                let len = self.array_len()?;
                Ok(TypeExpr::Array {
                    len,
                    elem: Box::new(self.parse_type()?),
                })
            }
            TokenKind::Punct("(") => {
                self.advance();
                let inner = self.parse_type()?;
                self.expect_punct(")")?;
                Ok(TypeExpr::Paren(Box::new(inner)))
            }
            TokenKind::Punct("<-") => {
                self.advance();
                self.expect_keyword("chan")?;
                Ok(TypeExpr::Chan {
                    dir: ChanDir::Recv,
                    elem: Box::new(self.parse_type()?),
                })
            }
            TokenKind::Keyword("chan") => {
                self.advance();
                let dir = if self.eat_punct("<-") { ChanDir::Send } else { ChanDir::Both };
                Ok(TypeExpr::Chan {
                    dir,
                    elem: Box::new(self.parse_type()?),
                })
            }
            TokenKind::Keyword("map") => {
                self.advance();
                self.expect_punct("[")?;
                let key = self.parse_type()?;
                self.expect_punct("]")?;
                let value = self.parse_type()?;
                Ok(TypeExpr::Map {
                    key: Box::new(key),
                    value: Box::new(value),
                })
            }
            TokenKind::Keyword("func") => {
                self.advance();
                Ok(TypeExpr::Func(self.signature()?))
            }
            TokenKind::Keyword("struct") => self.struct_type(),
            TokenKind::Keyword("interface") => self.interface_type(),
            _ => Err(self.unexpected("type")),
        }
    }

    fn type_args(&mut self) -> ParseResult<Vec<TypeExpr>> {
        self.expect_punct("[")?;
        let mut args = Vec::new();
        while !self.is_punct("]") {
            args.push(self.parse_type()?);
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct("]")?;
        Ok(args)
    }

    /// Array length as source text; the opening `[` is already consumed.
    fn array_len(&mut self) -> ParseResult<String> {
        let mut text = String::new();
        let mut depth = 0usize;
        loop {
            let token = self.advance();
            let piece = match &token {
                TokenKind::Eof => return Err(self.error("unexpected EOF in array length")),
                TokenKind::Punct("]") if depth == 0 => break,
                TokenKind::Punct("[" | "(") => {
                    depth += 1;
                    token.to_string()
                }
                TokenKind::Punct("]" | ")") => {
                    depth = depth.saturating_sub(1);
                    token.to_string()
                }
                TokenKind::Punct(op) if BINARY_OPERATORS.contains(op) => format!(" {op} "),
                other => other.to_string(),
            };
            text.push_str(&piece);
        }
        if text.is_empty() {
            return Err(self.error("missing array length"));
        }
        Ok(text)
    }

    fn signature(&mut self) -> ParseResult<Signature> {
        let params = self.params()?;
        let results = if self.is_punct("(") {
            self.params()?
        } else if self.starts_type_at(0) {
            vec![Param {
                name: None,
                ty: self.parse_type()?,
            }]
        } else {
            Vec::new()
        };
        Ok(Signature { params, results })
    }

    fn params(&mut self) -> ParseResult<Vec<Param>> {
        self.expect_punct("(")?;
        let mut params = Vec::new();
        while !self.is_punct(")") {
            let name = match self.peek() {
                TokenKind::Ident(name) if self.ident_is_name() => {
                    let name = name.clone();
                    self.advance();
                    Some(name)
                }
                _ => None,
            };
            let ty = if self.eat_punct("...") {
                TypeExpr::Ellipsis(Box::new(self.parse_type()?))
            } else {
                self.parse_type()?
            };
            params.push(Param { name, ty });
            if !self.eat_punct(",") {
                break;
            }
        }
        self.expect_punct(")")?;
        Ok(params)
    }

    fn struct_type(&mut self) -> ParseResult<TypeExpr> {
        self.expect_keyword("struct")?;
        self.expect_punct("{")?;
        let mut fields = Vec::new();
        while !self.is_punct("}") {
            fields.push(self.field_decl()?);
            self.expect_semicolon()?;
        }
        self.expect_punct("}")?;
        Ok(TypeExpr::Struct(fields))
    }

    fn field_decl(&mut self) -> ParseResult<FieldDecl> {
        let mut names = Vec::new();
        let named = matches!(self.peek(), TokenKind::Ident(_))
            && (matches!(self.peek_at(1), TokenKind::Punct(",")) || self.ident_is_name());
        if named {
            names.push(self.expect_ident()?);
            while self.eat_punct(",") {
                names.push(self.expect_ident()?);
            }
        }
        let ty = self.parse_type()?;
        let tag = match self.peek() {
            TokenKind::Literal(LitKind::String, text) => {
                let text = text.clone();
                self.advance();
                Some(text)
            }
            _ => None,
        };
        Ok(FieldDecl { names, ty, tag })
    }

    fn interface_type(&mut self) -> ParseResult<TypeExpr> {
        self.expect_keyword("interface")?;
        self.expect_punct("{")?;
        let mut elems = Vec::new();
        while !self.is_punct("}") {
            let elem = if matches!(self.peek(), TokenKind::Ident(_)) && matches!(self.peek_at(1), TokenKind::Punct("(")) {
                let name = self.expect_ident()?;
                InterfaceElem::Method {
                    name,
                    sig: self.signature()?,
                }
            } else {
                InterfaceElem::Embed(self.constraint()?)
            };
            elems.push(elem);
            self.expect_semicolon()?;
        }
        self.expect_punct("}")?;
        Ok(TypeExpr::Interface(elems))
    }
}
