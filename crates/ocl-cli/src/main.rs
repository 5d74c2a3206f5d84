//! OCL command-line tool
//!
//! Examples:
//!   ocl tokens config.ocl             - one token per line
//!   ocl tree config.ocl               - indented tree dump
//!   ocl tree --format json -          - JSON tree of stdin
//!   ocl check config.ocl              - report problems, exit 1 if any

use std::fmt::Write as _;
use std::io::{self, Read};

use clap::{Parser, Subcommand, ValueEnum};
use ocl_tree::{ColumnUnit, ScanOptions, Token};
use tracing::{debug, info};

// ============================================================================
// Exit codes
// ============================================================================

const EXIT_SUCCESS: i32 = 0;
const EXIT_DIAGNOSTICS: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_IO_ERROR: i32 = 3;

// ============================================================================
// CLI argument structures
// ============================================================================

#[derive(Parser, Debug)]
#[command(name = "ocl")]
#[command(version, about = "Inspect and check OCL configuration files")]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// How columns are counted in positions
    #[arg(long, global = true, value_enum, default_value_t = Columns::Utf16)]
    columns: Columns,

    /// Log to stderr; repeat for more detail
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print one token per line
    Tokens {
        /// Input file, `-` for stdin
        file: String,
    },
    /// Print the syntax tree
    Tree {
        /// Input file, `-` for stdin
        file: String,

        #[arg(short, long, value_enum, default_value_t = TreeFormat::Dump)]
        format: TreeFormat,

        /// Output file, `-` for stdout
        #[arg(short, long)]
        output: Option<String>,
    },
    /// Report every problem with source context
    Check {
        /// Input file, `-` for stdin
        file: String,
    },
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum Columns {
    /// UTF-16 code units, as editors count them
    Utf16,
    /// Unicode scalar values
    Char,
}

impl From<Columns> for ColumnUnit {
    fn from(columns: Columns) -> Self {
        match columns {
            Columns::Utf16 => ColumnUnit::Utf16,
            Columns::Char => ColumnUnit::Char,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum TreeFormat {
    Dump,
    Json,
}

fn main() {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let code = if e.use_stderr() { EXIT_USAGE } else { EXIT_SUCCESS };
            let _ = e.print();
            std::process::exit(code);
        }
    };

    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => std::process::exit(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("error: {e}");
            std::process::exit(e.exit_code());
        }
    }
}

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let options = ScanOptions::default().columns(cli.columns.into());

    match cli.command {
        Command::Tokens { file } => run_tokens(&file, options),
        Command::Tree {
            file,
            format,
            output,
        } => run_tree(&file, format, output.as_deref(), options),
        Command::Check { file } => run_check(&file, options),
    }
}

// ============================================================================
// Error handling
// ============================================================================

#[derive(Debug)]
enum CliError {
    Io { path: String, error: io::Error },
    Diagnostics(usize),
}

impl CliError {
    fn exit_code(&self) -> i32 {
        match self {
            CliError::Io { .. } => EXIT_IO_ERROR,
            CliError::Diagnostics(_) => EXIT_DIAGNOSTICS,
        }
    }
}

impl std::fmt::Display for CliError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CliError::Io { path, error } => write!(f, "{path}: {error}"),
            CliError::Diagnostics(1) => write!(f, "1 problem found"),
            CliError::Diagnostics(n) => write!(f, "{n} problems found"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Io { error, .. } => Some(error),
            CliError::Diagnostics(_) => None,
        }
    }
}

// ============================================================================
// Subcommand implementations
// ============================================================================

fn run_tokens(file: &str, options: ScanOptions) -> Result<(), CliError> {
    let source = read_input(file)?;
    print!("{}", format_tokens(&source, options));
    Ok(())
}

fn run_tree(
    file: &str,
    format: TreeFormat,
    output: Option<&str>,
    options: ScanOptions,
) -> Result<(), CliError> {
    let source = read_input(file)?;
    let doc = ocl_tree::parse_with_options(&source, options);
    info!(nodes = doc.len(), "parsed {}", display_name(file));

    let content = match format {
        TreeFormat::Dump => ocl_tree::dump(&doc),
        TreeFormat::Json => {
            let mut json = serde_json::to_string_pretty(&ocl_tree::DocumentJson::new(&doc))
                .map_err(|e| CliError::Io {
                    path: display_name(file).to_string(),
                    error: io::Error::other(e),
                })?;
            json.push('\n');
            json
        }
    };

    write_output(output.unwrap_or("-"), &content)
}

fn run_check(file: &str, options: ScanOptions) -> Result<(), CliError> {
    let source = read_input(file)?;
    let doc = ocl_tree::parse_with_options(&source, options);
    let diagnostics = ocl_tree::collect_diagnostics(&doc);
    let filename = display_name(file);

    for diagnostic in &diagnostics {
        diagnostic.write_report(filename, &source, io::stderr());
    }

    if diagnostics.is_empty() {
        info!("{filename}: no problems");
        Ok(())
    } else {
        Err(CliError::Diagnostics(diagnostics.len()))
    }
}

/// `line:column Kind "text"`, one token per line, with the lexical error
/// appended when there is one.
fn format_tokens(source: &str, options: ScanOptions) -> String {
    let mut out = String::new();
    for token in ocl_tokenizer::tokenize_with_options(source, options) {
        format_token(&token, &mut out);
    }
    out
}

fn format_token(token: &Token<'_>, out: &mut String) {
    let _ = write!(
        out,
        "{}:{} {:?} {:?}",
        token.line, token.column, token.kind, token.text
    );
    if let Some(error) = &token.error {
        let _ = write!(out, " ! {error}");
    }
    out.push('\n');
}

// ============================================================================
// I/O helpers
// ============================================================================

fn display_name(file: &str) -> &str {
    if file == "-" { "<stdin>" } else { file }
}

fn read_input(file: &str) -> Result<String, CliError> {
    debug!(file, "reading input");
    let result = if file == "-" {
        let mut buf = String::new();
        io::stdin().read_to_string(&mut buf).map(|_| buf)
    } else {
        std::fs::read_to_string(file)
    };
    result.map_err(|error| CliError::Io {
        path: display_name(file).to_string(),
        error,
    })
}

fn write_output(path: &str, content: &str) -> Result<(), CliError> {
    let result = if path == "-" {
        print!("{content}");
        Ok(())
    } else {
        std::fs::write(path, content)
    };
    result.map_err(|error| CliError::Io {
        path: path.to_string(),
        error,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_tokens() {
        let out = format_tokens("int_attribute = 1\n", ScanOptions::default());
        assert_eq!(
            out,
            "1:1 Symbol \"int_attribute\"\n\
             1:15 Assign \"=\"\n\
             1:17 Integer \"1\"\n\
             1:18 Newline \"\\n\"\n\
             2:1 Eof \"\"\n"
        );
    }

    #[test]
    fn test_format_tokens_with_error() {
        let out = format_tokens("-x", ScanOptions::default());
        let first = out.lines().next().unwrap();
        assert_eq!(first, "1:1 Integer \"-\" ! expected number; got `x`");
    }

    #[test]
    fn test_column_option() {
        let utf16 = format_tokens("\"🐙\"", ScanOptions::default());
        let chars = format_tokens("\"🐙\"", ScanOptions::default().columns(ColumnUnit::Char));
        assert!(utf16.ends_with("1:5 Eof \"\"\n"), "{utf16}");
        assert!(chars.ends_with("1:4 Eof \"\"\n"), "{chars}");
    }

    #[test]
    fn test_cli_parses_arguments() {
        let cli = Cli::try_parse_from(["ocl", "--columns", "char", "-vv", "tree", "-f", "json", "-"])
            .unwrap();
        assert_eq!(cli.columns, Columns::Char);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::Tree {
                file,
                format,
                output,
            } => {
                assert_eq!(file, "-");
                assert_eq!(format, TreeFormat::Json);
                assert_eq!(output, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_exit_codes() {
        let io = CliError::Io {
            path: "missing.ocl".to_string(),
            error: io::Error::new(io::ErrorKind::NotFound, "not found"),
        };
        assert_eq!(io.exit_code(), EXIT_IO_ERROR);
        assert_eq!(io.to_string(), "missing.ocl: not found");

        let diagnostics = CliError::Diagnostics(2);
        assert_eq!(diagnostics.exit_code(), EXIT_DIAGNOSTICS);
        assert_eq!(diagnostics.to_string(), "2 problems found");
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = read_input("/nonexistent/definitely/missing.ocl").unwrap_err();
        assert_eq!(err.exit_code(), EXIT_IO_ERROR);
    }
}
