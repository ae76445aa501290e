//! Build constraints: which files of a directory belong to the package for
//! the target platform.
//!
//! Files are excluded by a `_GOOS`, `_GOARCH` or `_GOOS_GOARCH` name suffix or
//! by a `//go:build` (or legacy `// +build`) line in the header comments.
//! `ignore` and any other custom tag are never satisfied, so generator
//! scripts tagged `//go:build ignore` drop out.

const KNOWN_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "js", "linux", "nacl", "netbsd",
    "openbsd", "plan9", "solaris", "wasip1", "windows", "zos",
];

const KNOWN_ARCH: &[&str] = &[
    "386", "amd64", "amd64p32", "arm", "armbe", "arm64", "arm64be", "loong64", "mips", "mipsle", "mips64",
    "mips64le", "mips64p32", "mips64p32le", "ppc", "ppc64", "ppc64le", "riscv", "riscv64", "s390", "s390x", "sparc",
    "sparc64", "wasm",
];

const UNIX_OS: &[&str] = &[
    "aix", "android", "darwin", "dragonfly", "freebsd", "hurd", "illumos", "ios", "linux", "netbsd", "openbsd",
    "solaris",
];

/// Target platform the constraints are evaluated against.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildContext {
    pub goos: String,
    pub goarch: String,
}

impl BuildContext {
    pub fn new(goos: impl Into<String>, goarch: impl Into<String>) -> Self {
        Self {
            goos: goos.into(),
            goarch: goarch.into(),
        }
    }

    /// `GOOS`/`GOARCH` from the environment, defaulting to the host platform.
    pub fn from_env() -> Self {
        let goos = std::env::var("GOOS").unwrap_or_else(|_| host_os().to_string());
        let goarch = std::env::var("GOARCH").unwrap_or_else(|_| host_arch().to_string());
        Self::new(goos, goarch)
    }

    fn has_tag(&self, tag: &str) -> bool {
        match tag {
            "gc" => true,
            "unix" => UNIX_OS.contains(&self.goos.as_str()),
            "linux" => self.goos == "linux" || self.goos == "android",
            "darwin" => self.goos == "darwin" || self.goos == "ios",
            "solaris" => self.goos == "solaris" || self.goos == "illumos",
            release if release.starts_with("go1.") => true,
            other => other == self.goos || other == self.goarch,
        }
    }

    /// Whether a `name_GOOS_GOARCH.go` style file name admits this platform.
    pub fn matches_file_name(&self, file_name: &str) -> bool {
        let stem = file_name.strip_suffix(".go").unwrap_or(file_name);
        let stem = stem.strip_suffix("_test").unwrap_or(stem);
        // A leading element is the base name, never a constraint.
        let Some((_, suffixes)) = stem.split_once('_') else {
            return true;
        };
        let parts: Vec<&str> = suffixes.split('_').collect();
        let n = parts.len();
        if n >= 2 && KNOWN_OS.contains(&parts[n - 2]) && KNOWN_ARCH.contains(&parts[n - 1]) {
            return self.has_tag(parts[n - 2]) && self.has_tag(parts[n - 1]);
        }
        let last = parts[n - 1];
        if KNOWN_OS.contains(&last) || KNOWN_ARCH.contains(&last) {
            return self.has_tag(last);
        }
        true
    }

    /// Whether the constraint lines in the header of `source` admit this platform.
    ///
    /// Only line comments before the package clause count. A `//go:build`
    /// line takes precedence over `// +build` lines. An expression that does
    /// not parse constrains nothing.
    pub fn matches_source(&self, source: &str) -> bool {
        let mut go_build = None;
        let mut plus_build = Vec::new();
        for line in source.trim_start_matches('\u{feff}').lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }
            let Some(comment) = line.strip_prefix("//") else {
                break;
            };
            if let Some(expr) = comment.strip_prefix("go:build") {
                if go_build.is_none() && (expr.is_empty() || expr.starts_with([' ', '\t'])) {
                    go_build = Some(expr.trim().to_string());
                }
            } else if let Some(options) = comment.trim_start().strip_prefix("+build") {
                if options.is_empty() || options.starts_with([' ', '\t']) {
                    plus_build.push(options.trim().to_string());
                }
            }
        }

        match go_build {
            Some(expr) => ExprParser::new(&expr)
                .parse()
                .is_none_or(|expr| expr.eval(&|tag: &str| self.has_tag(tag))),
            None => plus_build.iter().all(|line| self.matches_plus_build(line)),
        }
    }

    /// `// +build a,b c`: space-separated options are OR'ed, comma-separated terms AND'ed.
    fn matches_plus_build(&self, line: &str) -> bool {
        line.split_whitespace().any(|option| {
            option.split(',').all(|term| match term.strip_prefix('!') {
                Some(tag) => !tag.is_empty() && !self.has_tag(tag),
                None => !term.is_empty() && self.has_tag(term),
            })
        })
    }
}

fn host_os() -> &'static str {
    match std::env::consts::OS {
        "macos" => "darwin",
        other => other,
    }
}

fn host_arch() -> &'static str {
    match std::env::consts::ARCH {
        "x86" => "386",
        "x86_64" => "amd64",
        "aarch64" => "arm64",
        "loongarch64" => "loong64",
        "powerpc" => "ppc",
        "powerpc64" => "ppc64",
        "wasm32" => "wasm",
        other => other,
    }
}

/// `//go:build` expression.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Expr {
    Tag(String),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
}

impl Expr {
    fn eval(&self, has_tag: &dyn Fn(&str) -> bool) -> bool {
        match self {
            Expr::Tag(tag) => has_tag(tag),
            Expr::Not(inner) => !inner.eval(has_tag),
            Expr::And(lhs, rhs) => lhs.eval(has_tag) && rhs.eval(has_tag),
            Expr::Or(lhs, rhs) => lhs.eval(has_tag) || rhs.eval(has_tag),
        }
    }
}

/// Precedence: `!` binds tighter than `&&`, which binds tighter than `||`.
struct ExprParser<'a> {
    rest: &'a str,
}

impl<'a> ExprParser<'a> {
    fn new(source: &'a str) -> Self {
        Self { rest: source }
    }

    fn parse(mut self) -> Option<Expr> {
        let expr = self.or()?;
        self.skip_space();
        self.rest.is_empty().then_some(expr)
    }

    fn skip_space(&mut self) {
        self.rest = self.rest.trim_start();
    }

    fn eat(&mut self, op: &str) -> bool {
        self.skip_space();
        match self.rest.strip_prefix(op) {
            Some(rest) => {
                self.rest = rest;
                true
            }
            None => false,
        }
    }

    fn or(&mut self) -> Option<Expr> {
        let mut expr = self.and()?;
        while self.eat("||") {
            expr = Expr::Or(Box::new(expr), Box::new(self.and()?));
        }
        Some(expr)
    }

    fn and(&mut self) -> Option<Expr> {
        let mut expr = self.not()?;
        while self.eat("&&") {
            expr = Expr::And(Box::new(expr), Box::new(self.not()?));
        }
        Some(expr)
    }

    fn not(&mut self) -> Option<Expr> {
        if self.eat("!") {
            return Some(Expr::Not(Box::new(self.not()?)));
        }
        if self.eat("(") {
            let expr = self.or()?;
            return self.eat(")").then_some(expr);
        }
        self.skip_space();
        let len = self
            .rest
            .find(|c: char| !(c.is_alphanumeric() || c == '_' || c == '.'))
            .unwrap_or(self.rest.len());
        if len == 0 {
            return None;
        }
        let (tag, rest) = self.rest.split_at(len);
        self.rest = rest;
        Some(Expr::Tag(tag.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn linux() -> BuildContext {
        BuildContext::new("linux", "amd64")
    }

    fn windows() -> BuildContext {
        BuildContext::new("windows", "arm64")
    }

    #[test]
    fn test_ignore_tag_excludes_file() {
        let source = "//go:build ignore\n\npackage main\n";
        assert!(!linux().matches_source(source));
        assert!(!linux().matches_source("// +build ignore\n\npackage main\n"));
    }

    #[test]
    fn test_go_build_expressions() {
        let ctx = linux();
        assert!(ctx.matches_source("//go:build linux && amd64\n\npackage p\n"));
        assert!(ctx.matches_source("//go:build !windows\n\npackage p\n"));
        assert!(ctx.matches_source("//go:build (darwin || linux) && !386\n\npackage p\n"));
        assert!(ctx.matches_source("//go:build unix && go1.21\n\npackage p\n"));
        assert!(!ctx.matches_source("//go:build windows || (darwin && arm64)\n\npackage p\n"));
        assert!(!windows().matches_source("//go:build unix\n\npackage p\n"));
    }

    #[test]
    fn test_header_rules() {
        let ctx = linux();
        assert!(ctx.matches_source("package p\n\n//go:build ignore\n"));
        assert!(ctx.matches_source("// Copyright\n\n//go:builder ignore\n\npackage p\n"));
        assert!(!ctx.matches_source("\u{feff}// Copyright\n\n//go:build ignore\n\npackage p\n"));
        assert!(ctx.matches_source("//go:build linux &&\n\npackage p\n"));
    }

    #[test]
    fn test_go_build_wins_over_plus_build() {
        let source = "//go:build linux\n// +build windows\n\npackage p\n";
        assert!(linux().matches_source(source));
    }

    #[test]
    fn test_plus_build_lines() {
        let ctx = linux();
        assert!(ctx.matches_source("// +build darwin linux\n\npackage p\n"));
        assert!(ctx.matches_source("// +build linux,amd64 windows\n\npackage p\n"));
        assert!(!ctx.matches_source("// +build linux,!amd64\n\npackage p\n"));
        assert!(!ctx.matches_source("// +build linux\n// +build 386\n\npackage p\n"));
    }

    #[test]
    fn test_file_name_suffixes() {
        let ctx = linux();
        assert!(ctx.matches_file_name("point.go"));
        assert!(ctx.matches_file_name("linux.go"));
        assert!(ctx.matches_file_name("point_linux.go"));
        assert!(ctx.matches_file_name("point_amd64.go"));
        assert!(ctx.matches_file_name("point_linux_amd64.go"));
        assert!(ctx.matches_file_name("point_helper.go"));
        assert!(!ctx.matches_file_name("point_windows.go"));
        assert!(!ctx.matches_file_name("point_linux_arm64.go"));
        assert!(!ctx.matches_file_name("point_windows_test.go"));
        assert!(BuildContext::new("android", "arm64").matches_file_name("point_linux.go"));
    }
}
