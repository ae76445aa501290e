//! Tokenizer for Go source files.
//!
//! Produces the token stream the declaration parser consumes, including the
//! semicolons Go inserts automatically at line ends.

use std::fmt;

/// Go keywords. Anything else that lexes as an identifier is a plain name.
const KEYWORDS: &[&str] = &[
    "break",
    "case",
    "chan",
    "const",
    "continue",
    "default",
    "defer",
    "else",
    "fallthrough",
    "for",
    "func",
    "go",
    "goto",
    "if",
    "import",
    "interface",
    "map",
    "package",
    "range",
    "return",
    "select",
    "struct",
    "switch",
    "type",
    "var",
];

/// Operators and delimiters, longest first so the scanner is greedy.
const PUNCTUATION: &[&str] = &[
    "<<=", ">>=", "&^=", "...", "&&", "||", "<-", "++", "--", "==", "!=", "<=", ">=", ":=", "+=", "-=", "*=",
    "/=", "%=", "&=", "|=", "^=", "<<", ">>", "&^", "~", "+", "-", "*", "/", "%", "&", "|", "^", "<", ">", "=",
    "!", "(", ")", "[", "]", "{", "}", ",", ".", ":",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LitKind {
    Int,
    Float,
    Imag,
    Char,
    String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenKind {
    Ident(String),
    Keyword(&'static str),
    /// Literal with its exact source text (quotes included for strings and runes).
    Literal(LitKind, String),
    Punct(&'static str),
    /// `;`, either written or inserted at a line end.
    Semicolon { implicit: bool },
    Eof,
}

impl TokenKind {
    /// Whether a newline after this token ends the statement.
    fn triggers_semicolon(&self) -> bool {
        match self {
            TokenKind::Ident(_) | TokenKind::Literal(..) => true,
            TokenKind::Keyword(kw) => matches!(*kw, "break" | "continue" | "fallthrough" | "return"),
            TokenKind::Punct(p) => matches!(*p, "++" | "--" | ")" | "]" | "}"),
            TokenKind::Semicolon { .. } | TokenKind::Eof => false,
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TokenKind::Ident(name) => write!(f, "{name}"),
            TokenKind::Keyword(kw) => write!(f, "{kw}"),
            TokenKind::Literal(_, text) => write!(f, "{text}"),
            TokenKind::Punct(p) => write!(f, "{p}"),
            TokenKind::Semicolon { implicit: true } => write!(f, "newline"),
            TokenKind::Semicolon { implicit: false } => write!(f, ";"),
            TokenKind::Eof => write!(f, "EOF"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Token {
    pub kind: TokenKind,
    pub line: usize,
    pub column: usize,
}

/// A lexical error with its 1-indexed position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LexError {
    pub line: usize,
    pub column: usize,
    pub message: String,
}

/// Split Go source into tokens, ending with [`TokenKind::Eof`].
///
/// A single leading byte-order mark is ignored.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let source = source.strip_prefix('\u{feff}').unwrap_or(source);
    Lexer::new(source).run()
}

struct Lexer {
    chars: Vec<char>,
    pos: usize,
    line: usize,
    column: usize,
    tokens: Vec<Token>,
}

impl Lexer {
    fn new(source: &str) -> Self {
        Self {
            chars: source.chars().collect(),
            pos: 0,
            line: 1,
            column: 1,
            tokens: Vec::new(),
        }
    }

    fn run(mut self) -> Result<Vec<Token>, LexError> {
        while let Some(ch) = self.peek(0) {
            match ch {
                '\n' => {
                    self.insert_semicolon();
                    self.bump();
                }
                c if c.is_whitespace() => {
                    self.bump();
                }
                '/' if self.peek(1) == Some('/') => self.line_comment(),
                '/' if self.peek(1) == Some('*') => self.general_comment()?,
                c if is_letter(c) => self.identifier(),
                c if c.is_ascii_digit() => self.number(),
                '.' if self.peek(1).is_some_and(|c| c.is_ascii_digit()) => self.number(),
                '"' => self.interpreted_string()?,
                '`' => self.raw_string()?,
                '\'' => self.rune()?,
                ';' => {
                    let (line, column) = (self.line, self.column);
                    self.bump();
                    self.push(TokenKind::Semicolon { implicit: false }, line, column);
                }
                _ => self.punctuation()?,
            }
        }

        self.insert_semicolon();
        let (line, column) = (self.line, self.column);
        self.push(TokenKind::Eof, line, column);
        Ok(self.tokens)
    }

    fn peek(&self, offset: usize) -> Option<char> {
        self.chars.get(self.pos + offset).copied()
    }

    fn bump(&mut self) -> Option<char> {
        let ch = self.chars.get(self.pos).copied()?;
        self.pos += 1;
        if ch == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(ch)
    }

    fn push(&mut self, kind: TokenKind, line: usize, column: usize) {
        self.tokens.push(Token { kind, line, column });
    }

    fn error(&self, line: usize, column: usize, message: impl Into<String>) -> LexError {
        LexError {
            line,
            column,
            message: message.into(),
        }
    }

    fn insert_semicolon(&mut self) {
        if self.tokens.last().is_some_and(|t| t.kind.triggers_semicolon()) {
            let (line, column) = (self.line, self.column);
            self.push(TokenKind::Semicolon { implicit: true }, line, column);
        }
    }

    fn line_comment(&mut self) {
        while let Some(ch) = self.peek(0) {
            if ch == '\n' {
                break;
            }
            self.bump();
        }
    }

    fn general_comment(&mut self) -> Result<(), LexError> {
        let (line, column) = (self.line, self.column);
        self.bump();
        self.bump();
        let mut spans_lines = false;
        loop {
            match self.peek(0) {
                None => return Err(self.error(line, column, "comment not terminated")),
                Some('*') if self.peek(1) == Some('/') => {
                    self.bump();
                    self.bump();
                    break;
                }
                Some(ch) => {
                    spans_lines |= ch == '\n';
                    self.bump();
                }
            }
        }
        // A comment containing a newline acts like a newline.
        if spans_lines {
            self.insert_semicolon();
        }
        Ok(())
    }

    fn identifier(&mut self) {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();
        while let Some(ch) = self.peek(0) {
            if !(is_letter(ch) || ch.is_numeric()) {
                break;
            }
            text.push(ch);
            self.bump();
        }
        let kind = match KEYWORDS.iter().find(|kw| **kw == text) {
            Some(kw) => TokenKind::Keyword(kw),
            None => TokenKind::Ident(text),
        };
        self.push(kind, line, column);
    }

    fn number(&mut self) {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();
        let is_hex = self.peek(0) == Some('0') && matches!(self.peek(1), Some('x' | 'X'));
        while let Some(ch) = self.peek(0) {
            if !(ch.is_ascii_alphanumeric() || ch == '_' || ch == '.') {
                break;
            }
            text.push(ch);
            self.bump();
            let exponent = matches!(ch, 'p' | 'P') || (!is_hex && matches!(ch, 'e' | 'E'));
            if exponent && matches!(self.peek(0), Some('+' | '-')) {
                if let Some(sign) = self.bump() {
                    text.push(sign);
                }
            }
        }

        let kind = if text.ends_with('i') {
            LitKind::Imag
        } else if text.contains('.')
            || text.contains(['p', 'P'])
            || (!is_hex && text.contains(['e', 'E']))
        {
            LitKind::Float
        } else {
            LitKind::Int
        };
        self.push(TokenKind::Literal(kind, text), line, column);
    }

    fn quoted(&mut self, quote: char, what: &str) -> Result<String, LexError> {
        let (line, column) = (self.line, self.column);
        let mut text = String::new();
        if let Some(open) = self.bump() {
            text.push(open);
        }
        loop {
            match self.peek(0) {
                None | Some('\n') => return Err(self.error(line, column, format!("{what} literal not terminated"))),
                Some('\\') => {
                    text.push('\\');
                    self.bump();
                    match self.peek(0) {
                        None | Some('\n') => {
                            return Err(self.error(line, column, format!("{what} literal not terminated")));
                        }
                        Some(escaped) => {
                            text.push(escaped);
                            self.bump();
                        }
                    }
                }
                Some(ch) => {
                    text.push(ch);
                    self.bump();
                    if ch == quote {
                        return Ok(text);
                    }
                }
            }
        }
    }

    fn interpreted_string(&mut self) -> Result<(), LexError> {
        let (line, column) = (self.line, self.column);
        let text = self.quoted('"', "string")?;
        self.push(TokenKind::Literal(LitKind::String, text), line, column);
        Ok(())
    }

    fn rune(&mut self) -> Result<(), LexError> {
        let (line, column) = (self.line, self.column);
        let text = self.quoted('\'', "rune")?;
        self.push(TokenKind::Literal(LitKind::Char, text), line, column);
        Ok(())
    }

    fn raw_string(&mut self) -> Result<(), LexError> {
        let (line, column) = (self.line, self.column);
        let mut text = String::from("`");
        self.bump();
        loop {
            match self.bump() {
                None => return Err(self.error(line, column, "raw string literal not terminated")),
                Some('`') => {
                    text.push('`');
                    break;
                }
                // Carriage returns are discarded from raw string values.
                Some('\r') => {}
                Some(ch) => text.push(ch),
            }
        }
        self.push(TokenKind::Literal(LitKind::String, text), line, column);
        Ok(())
    }

    fn punctuation(&mut self) -> Result<(), LexError> {
        let (line, column) = (self.line, self.column);
        let matched = PUNCTUATION.iter().find(|p| {
            p.chars()
                .enumerate()
                .all(|(i, expected)| self.peek(i) == Some(expected))
        });
        match matched {
            Some(p) => {
                for _ in 0..p.chars().count() {
                    self.bump();
                }
                self.push(TokenKind::Punct(p), line, column);
                Ok(())
            }
            None => {
                let ch = self.peek(0).unwrap_or_default();
                Err(self.error(line, column, format!("invalid character {ch:?}")))
            }
        }
    }
}

fn is_letter(ch: char) -> bool {
    ch == '_' || ch.is_alphabetic()
}
