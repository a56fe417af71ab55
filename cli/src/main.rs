mod logger;
mod test_runner;

use std::io::{Read, Write};
use std::path::Path;
use std::process;

use clap::builder::PossibleValuesParser;
use clap::{Parser, Subcommand};
use codespan_reporting::files::SimpleFiles;
use codespan_reporting::term;
use codespan_reporting::term::termcolor::{ColorChoice, StandardStream};

use cosmosfile::{Block, Config, ParseError};

const STDIN: &str = "-";

#[derive(Parser)]
#[command(name = "cosmosfile", version, about = "Block-structured configuration tool")]
struct Cli {
    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,

    /// Log level when RUST_LOG is not set
    #[arg(
        long,
        global = true,
        default_value = "warn",
        value_parser = PossibleValuesParser::new(["off", "error", "warn", "info", "debug", "trace"])
    )]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Rewrite configuration files in canonical layout
    Fmt(FmtArgs),

    /// Parse a configuration file and report on its structure
    Inspect(InspectArgs),

    /// Run .test.conf fixture files
    Test(TestArgs),
}

#[derive(clap::Args)]
struct FmtArgs {
    /// Files to format; `-` or none reads stdin
    files: Vec<String>,

    /// Rewrite files in place instead of printing
    #[arg(long, conflicts_with = "check")]
    overwrite: bool,

    /// List files whose formatting differs and exit 1 if any do
    #[arg(long)]
    check: bool,
}

#[derive(clap::Args)]
struct InspectArgs {
    /// Configuration file to parse
    file: String,

    /// Dump the token stream
    #[arg(long)]
    tokens: bool,

    /// Dump the parsed blocks
    #[arg(long)]
    ast: bool,

    /// List the keys of every top-level block
    #[arg(long)]
    list_blocks: bool,

    /// Print the segments of the first block carrying this key
    #[arg(long)]
    key: Option<String>,
}

#[derive(clap::Args)]
struct TestArgs {
    /// Path to a .test.conf file or directory containing them
    path: String,

    /// Run only tests in these categories (subfolder names). Repeatable.
    #[arg(short, long)]
    category: Vec<String>,

    /// List available categories and exit
    #[arg(long)]
    list_categories: bool,
}

fn main() {
    let cli = Cli::parse();

    if let Err(e) = logger::init(&cli.log_level, !cli.no_color) {
        eprintln!("error: {}", e);
        process::exit(2);
    }

    let exit_code = match cli.command {
        Command::Fmt(args) => do_fmt(args),
        Command::Inspect(args) => do_inspect(args, cli.no_color),
        Command::Test(args) => {
            let path = Path::new(&args.path);
            if args.list_categories {
                test_runner::list_categories(path);
                0
            } else {
                test_runner::run_tests(path, cli.no_color, &args.category)
            }
        }
    };
    process::exit(exit_code);
}

fn read_input(name: &str) -> std::io::Result<Vec<u8>> {
    if name == STDIN {
        let mut input = Vec::new();
        std::io::stdin().read_to_end(&mut input)?;
        Ok(input)
    } else {
        std::fs::read(name)
    }
}

fn do_fmt(args: FmtArgs) -> i32 {
    fmt_to(args, &mut std::io::stdout().lock())
}

/// Format every input named in `args`, printing to `stdout`. A failed write
/// to `stdout` aborts with exit code 1.
fn fmt_to(args: FmtArgs, stdout: &mut impl Write) -> i32 {
    let files = if args.files.is_empty() {
        vec![STDIN.to_string()]
    } else {
        args.files
    };

    let mut exit_code = 0;

    for name in &files {
        let input = match read_input(name) {
            Ok(input) => input,
            Err(e) => {
                eprintln!("error: cannot read '{}': {}", name, e);
                exit_code = 1;
                continue;
            }
        };

        let formatted = cosmosfile::format(&input);
        let changed = formatted != input;
        tracing::info!(file = %name, changed, "formatted");

        if args.check {
            if changed {
                if let Err(e) = writeln!(stdout, "{}", name) {
                    eprintln!("error: cannot write output: {}", e);
                    return 1;
                }
                exit_code = 1;
            }
            continue;
        }

        if args.overwrite && name != STDIN {
            if changed {
                if let Err(e) = std::fs::write(name, &formatted) {
                    eprintln!("error: cannot write '{}': {}", name, e);
                    exit_code = 1;
                }
            }
            continue;
        }

        if let Err(e) = stdout.write_all(&formatted) {
            eprintln!("error: cannot write output: {}", e);
            return 1;
        }
    }

    exit_code
}

fn do_inspect(args: InspectArgs, no_color: bool) -> i32 {
    let color_choice = if no_color {
        ColorChoice::Never
    } else {
        ColorChoice::Auto
    };

    let input = match read_input(&args.file) {
        Ok(input) => input,
        Err(e) => {
            eprintln!("error: cannot read '{}': {}", args.file, e);
            return 1;
        }
    };

    if args.tokens {
        for token in cosmosfile::tokenize(&args.file, &input) {
            println!("{}:{}", token.line, token.text.escape_debug());
        }
        return 0;
    }

    let config = match Config::parse(&args.file, &input) {
        Ok(config) => config,
        Err(error) => {
            emit_parse_error(&args.file, &input, &error, color_choice);
            return 1;
        }
    };

    if args.ast {
        println!("{:#?}", config.blocks);
        return 0;
    }

    if args.list_blocks {
        for block in &config.blocks {
            let keys = if block.keys.is_empty() {
                "(no keys)".to_string()
            } else {
                block.keys.join(" ")
            };
            println!("{} ({} segments)", keys, block.segments.len());
        }
        return 0;
    }

    if let Some(key) = &args.key {
        return match config.get(key) {
            Some(block) => {
                print_segments(block);
                0
            }
            None => {
                eprintln!("error: no block with key '{}' in {}", key, args.file);
                1
            }
        };
    }

    eprintln!("ok: {} parsed successfully", args.file);
    0
}

fn emit_parse_error(name: &str, input: &[u8], error: &ParseError, color_choice: ColorChoice) {
    let mut files = SimpleFiles::new();
    let file_id = files.add(name.to_string(), String::from_utf8_lossy(input).into_owned());

    let writer = StandardStream::stderr(color_choice);
    let config = term::Config::default();
    let diagnostic = error.to_diagnostic(&files, file_id);
    let _ = term::emit_to_write_style(&mut writer.lock(), &config, &files, &diagnostic);
}

/// Print a block's segments one per line, indented by brace depth.
fn print_segments(block: &Block) {
    let mut depth = 0usize;
    for segment in &block.segments {
        if segment.closes_block() {
            depth = depth.saturating_sub(1);
        }
        let words: Vec<&str> = segment.tokens().iter().map(|t| t.text.as_str()).collect();
        println!("{}{}", "\t".repeat(depth), words.join(" "));
        if segment.opens_block() {
            depth += 1;
        }
    }
}
