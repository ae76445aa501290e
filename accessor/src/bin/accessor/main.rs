mod output;
mod theme;

use accessor::{AccessorConfig, TagErrorMode, scanner::resolve_patterns};
use anyhow::{Context, Result};
use clap::{
    ColorChoice, Command, CommandFactory, FromArgMatches, Parser,
    builder::{
        Styles,
        styling::{AnsiColor, Color as ClapColor, Style},
    },
    error::ErrorKind,
};
use colored::{Color as ThemeColor, Colorize, control::ShouldColorize};
use std::ffi::OsString;
use std::fmt::Write;
use std::path::PathBuf;

use output::{GlobalOptions, OutputManager};
use theme::{ICONS, THEME};

const ENVIRONMENT_VARIABLES: &[(&str, &str)] = &[
    ("ACCESSOR_TAG", "Struct tag key holding the access tokens"),
    ("RUST_LOG", "Log filter, e.g. accessor=debug"),
];

/// Single-dash spellings accepted for compatibility with Go's flag package.
const GO_STYLE_FLAGS: &[&str] = &["-type", "-output"];

const USAGE: &str = "accessor [flags] --type T [directory]
       accessor [flags] --type T files... # Must be a single package";

#[derive(Parser, Debug)]
#[command(name = "accessor")]
#[command(version)]
#[command(
    about = "Generate Get/Set methods for Go struct fields",
    long_about = r#"Generate Get/Set methods for Go struct fields.

Fields choose their accessors with a struct tag:

  X int `access:"r,w"`   getter and setter
  Y int `access:"r"`     getter only
  Z int `access:"-"`     nothing

Untagged fields follow Go's naming convention: exported fields get both
accessors, unexported fields a getter only.
"#
)]
#[command(override_usage = USAGE)]
struct Cli {
    /// Comma-separated list of type names; must be set
    #[arg(short = 't', long = "type", value_name = "T", value_delimiter = ',', required = true)]
    types: Vec<String>,

    /// Output file name; default srcdir/<type>_accessor.go
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Struct tag key holding the access tokens [default: access]
    #[arg(long, env = "ACCESSOR_TAG")]
    tag: Option<String>,

    /// What to do with a struct whose field tag does not parse [default: abandon-record]
    #[arg(long, value_enum)]
    on_bad_tag: Option<TagErrorMode>,

    /// Configuration file; default srcdir/accessor.toml when present
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Print the generated sources instead of writing them
    #[arg(long)]
    dry_run: bool,

    /// Suppress output (only errors will be shown)
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Package directory, or files of a single package
    #[arg(value_name = "PATH")]
    paths: Vec<PathBuf>,
}

impl Cli {
    fn parse_with_styles() -> Self {
        let matches = build_cli_command()
            .styles(help_styles())
            .get_matches_from(go_style_flags(std::env::args_os()));
        match Cli::from_arg_matches(&matches) {
            Ok(cli) => cli,
            Err(err) => err.exit(),
        }
    }

    /// Requested type names with blanks from `--type A,,B` removed.
    fn type_names(&self) -> Vec<String> {
        self.types
            .iter()
            .map(|name| name.trim())
            .filter(|name| !name.is_empty())
            .map(str::to_string)
            .collect()
    }
}

/// Rewrite `-type T` and `-output=F` to their long forms; everything after `--` is left alone.
fn go_style_flags(args: impl IntoIterator<Item = OsString>) -> Vec<OsString> {
    let mut flags_done = false;
    args.into_iter()
        .map(|arg| {
            let Some(text) = arg.to_str().filter(|_| !flags_done) else {
                return arg;
            };
            if text == "--" {
                flags_done = true;
                return arg;
            }
            GO_STYLE_FLAGS
                .iter()
                .find_map(|flag| {
                    let rest = text.strip_prefix(flag)?;
                    (rest.is_empty() || rest.starts_with('=')).then(|| OsString::from(format!("-{text}")))
                })
                .unwrap_or(arg)
        })
        .collect()
}

fn build_cli_command() -> Command {
    let use_color = detect_color_support();
    Cli::command()
        .after_long_help(render_appendix(use_color))
        .color(if use_color {
            ColorChoice::Auto
        } else {
            ColorChoice::Never
        })
}

fn render_appendix(use_color: bool) -> String {
    let theme = &THEME;
    let mut buffer = String::new();

    let env_heading = stylize("Environment Variables:", theme.highlight, true, use_color);
    let _ = writeln!(buffer, "{env_heading}");
    for (key, description) in ENVIRONMENT_VARIABLES {
        let key_text = stylize(key, theme.key, true, use_color);
        let value_text = stylize(description, theme.value, false, use_color);
        let _ = writeln!(buffer, "  {key_text}  {value_text}");
    }

    buffer.push('\n');

    let examples_heading = stylize("Examples:", theme.highlight, true, use_color);
    let _ = writeln!(buffer, "{examples_heading}");
    for example in [
        "accessor --type Point",
        "accessor --type Point,Line ./geo",
        "accessor --type Config --tag get --dry-run config.go",
    ] {
        let arrow = stylize(ICONS.arrow, theme.secondary, false, use_color);
        let command_text = stylize(example, theme.secondary, false, use_color);
        let _ = writeln!(buffer, "  {arrow} {command_text}");
    }

    buffer
}

fn stylize(text: &str, color: ThemeColor, bold: bool, use_color: bool) -> String {
    if !use_color {
        return text.to_string();
    }
    let styled = text.color(color);
    if bold { styled.bold() } else { styled }.to_string()
}

fn detect_color_support() -> bool {
    ShouldColorize::from_env().should_colorize()
}

fn help_styles() -> Styles {
    let theme = &THEME;
    Styles::styled()
        .usage(style_from_color(theme.primary).bold())
        .header(style_from_color(theme.highlight).bold())
        .literal(style_from_color(theme.secondary))
        .placeholder(style_from_color(theme.muted))
        .valid(style_from_color(theme.success))
        .invalid(style_from_color(theme.warning))
        .error(style_from_color(theme.error).bold())
}

fn style_from_color(color: ThemeColor) -> Style {
    Style::new().fg_color(Some(ClapColor::Ansi(ansi_color(color))))
}

/// ANSI equivalent of a theme color. The theme sticks to the basic palette.
fn ansi_color(color: ThemeColor) -> AnsiColor {
    match color {
        ThemeColor::Red => AnsiColor::Red,
        ThemeColor::Green => AnsiColor::Green,
        ThemeColor::Yellow => AnsiColor::Yellow,
        ThemeColor::Magenta => AnsiColor::Magenta,
        ThemeColor::Cyan => AnsiColor::Cyan,
        ThemeColor::BrightBlack => AnsiColor::BrightBlack,
        ThemeColor::BrightBlue => AnsiColor::BrightBlue,
        ThemeColor::BrightCyan => AnsiColor::BrightCyan,
        _ => AnsiColor::White,
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse_with_styles();
    if cli.no_color {
        colored::control::set_override(false);
    }

    let output = OutputManager::new(GlobalOptions {
        quiet: cli.quiet,
        no_color: cli.no_color,
    });

    if let Err(err) = execute(cli, &output) {
        output.error(&format!("{err:#}"));
        std::process::exit(1);
    }
}

fn execute(cli: Cli, output: &OutputManager) -> Result<()> {
    let type_names = cli.type_names();
    if type_names.is_empty() {
        Cli::command()
            .error(ErrorKind::MissingRequiredArgument, "--type needs at least one type name")
            .exit();
    }

    let source = resolve_patterns(&cli.paths)?;
    let config = match &cli.config {
        Some(path) => AccessorConfig::load(path).context("loading configuration")?,
        None => AccessorConfig::discover(&source.dir)
            .context("loading configuration")?
            .unwrap_or_default(),
    };

    let mut generator = accessor::generate_accessors()
        .package_source(source)
        .type_names(type_names)
        .with_config(&config)
        .dry_run(cli.dry_run);
    if let Some(tag) = cli.tag {
        generator = generator.tag_key(tag);
    }
    if let Some(mode) = cli.on_bad_tag {
        generator = generator.tag_error_mode(mode);
    }
    if let Some(path) = cli.output {
        generator = generator.output_file(path);
    }

    let report = generator.run()?;

    for file in &report.files {
        let path = file.path.display().to_string();
        if report.dry_run {
            output.file_banner(&path);
            print!("{}", file.content);
            continue;
        }
        if file.accessors == 0 {
            output.warning(&format!(
                "{path}: no accessors for {} in package {}",
                file.type_name, report.package
            ));
        } else {
            output.success(&format!("{path} ({} accessors)", file.accessors));
        }
    }

    Ok(())
}
