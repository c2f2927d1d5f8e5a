mod config;
mod output;

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use clide_core::{Parser as UsageParser, Specification, validate_specification};
use tracing_subscriber::EnvFilter;

use crate::config::UsageConfig;
use crate::output::{OutputFormat, format_result, format_spec};

#[derive(Debug, Parser)]
#[command(name = "clide", version, disable_help_subcommand = true)]
#[command(about = "Compile annotated usage lines and match arguments against them")]
struct Cli {
    /// Log compilation and matching decisions to stderr.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Match arguments given after `--` and print the result.
    Parse(ParseArgs),
    /// Print usage and the documentation table.
    Help(HelpArgs),
    /// Dump the compiled specification.
    Compile(CompileArgs),
    /// Compile and lint the usage lines.
    Check(CheckArgs),
}

/// Where the usage lines come from.
#[derive(Debug, Args)]
struct UsageSource {
    /// Usage file (YAML, or JSON with a `.json` extension).
    #[arg(long, conflicts_with = "usage", required_unless_present = "usage")]
    config: Option<PathBuf>,
    /// Inline usage line; repeat for several commands.
    #[arg(long)]
    usage: Vec<String>,
}

impl UsageSource {
    fn load(&self) -> Result<UsageConfig, String> {
        match &self.config {
            Some(path) => UsageConfig::load(path)
                .map_err(|err| format!("Failed to load '{}': {err}", path.display())),
            None => Ok(UsageConfig::from_lines(self.usage.clone())),
        }
    }
}

#[derive(Debug, Args)]
struct ParseArgs {
    #[command(flatten)]
    source: UsageSource,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
    /// Arguments to match.
    #[arg(last = true)]
    argv: Vec<String>,
}

#[derive(Debug, Args)]
struct HelpArgs {
    #[command(flatten)]
    source: UsageSource,
}

#[derive(Debug, Args)]
struct CompileArgs {
    #[command(flatten)]
    source: UsageSource,
    /// Output format.
    #[arg(long, default_value = "json")]
    format: OutputFormat,
    /// Also write the usage file back in normalized form (YAML, or JSON with
    /// a `.json` extension).
    #[arg(long)]
    save: Option<PathBuf>,
}

#[derive(Debug, Args)]
struct CheckArgs {
    #[command(flatten)]
    source: UsageSource,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Command::Parse(args) => run_parse(args),
        Command::Help(args) => run_help(args),
        Command::Compile(args) => run_compile(args),
        Command::Check(args) => run_check(args),
    };

    if let Err(err) = result {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

/// Installs the stderr subscriber. `RUST_LOG` takes precedence; without it
/// the level is `warn`, or `debug` with `--verbose`.
fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy();
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn build_parser(config: &UsageConfig) -> Result<UsageParser, String> {
    UsageParser::from_usage_lines(config.usage.as_slice())
        .map_err(|err| format!("invalid usage: {err}"))
}

fn run_parse(args: ParseArgs) -> Result<(), String> {
    let config = args.source.load()?;
    let parser = build_parser(&config)?;

    match parser.parse(args.argv.as_slice()) {
        Ok(result) => {
            let output = format_result(&result, args.format)?;
            print!("{output}");
            if !output.ends_with('\n') {
                println!();
            }
            Ok(())
        }
        Err(err) => {
            tracing::debug!(argv = ?args.argv, error = %err, "Arguments did not match");
            print!("{}", parser.help_with_docs(&config.doc_pairs()));
            Err(err.to_string())
        }
    }
}

fn run_help(args: HelpArgs) -> Result<(), String> {
    let config = args.source.load()?;
    let parser = build_parser(&config)?;
    print!("{}", parser.help_with_docs(&config.doc_pairs()));
    Ok(())
}

fn run_compile(args: CompileArgs) -> Result<(), String> {
    let config = args.source.load()?;
    let parser = build_parser(&config)?;
    let output = format_spec(parser.specification(), args.format)?;
    print!("{output}");
    if !output.ends_with('\n') {
        println!();
    }

    if let Some(path) = args.save {
        let normalized = UsageConfig {
            usage: normalized_lines(parser.specification()),
            docs: config.docs,
        };
        normalized
            .save(&path)
            .map_err(|err| format!("Failed to write '{}': {err}", path.display()))?;
        tracing::debug!(path = %path.display(), "Wrote normalized usage file");
    }
    Ok(())
}

/// Re-renders every command as a `Usage:` line.
fn normalized_lines(spec: &Specification) -> Vec<String> {
    spec.commands()
        .iter()
        .map(|cmd| {
            let mut line = format!("Usage: {}", spec.program());
            for slot in cmd.slots() {
                line.push(' ');
                line.push_str(&slot.to_string());
            }
            line
        })
        .collect()
}

fn run_check(args: CheckArgs) -> Result<(), String> {
    let config = args.source.load()?;
    let parser = build_parser(&config)?;
    let spec = parser.specification();

    let problems = validate_specification(spec);
    if problems.is_empty() {
        println!(
            "ok: {} command(s) for {}",
            spec.commands().len(),
            spec.program()
        );
        return Ok(());
    }

    for problem in &problems {
        println!("{problem}");
    }
    Err(format!("{} problem(s) found", problems.len()))
}
