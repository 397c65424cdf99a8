//! cflat Compiler Front End
//!
//! Parses a cflat program, runs name resolution and type checking, and
//! prints the annotated program when the analysis is clean.

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

use cflat::frontend::ast::Program;
use cflat::frontend::unparse::unparse;
use cflat::{analyze, parse, Analysis};

/// cflat front end
#[derive(Parser, Debug)]
#[command(name = "cflatc")]
#[command(version = "0.1.0")]
#[command(about = "cflat front end - name resolution and type checking")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Input source file (.cf)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Write the annotated program here instead of stdout
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check a source file for errors
    Check {
        /// Input source file
        input: PathBuf,

        /// Print diagnostics as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print a source file back without analyzing it
    Unparse {
        /// Input source file
        input: PathBuf,

        /// Output file
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Print version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let code = match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            1
        }
    };
    process::exit(code);
}

/// Dispatch the command line; the returned value is the exit code
fn run(cli: &Cli) -> Result<i32> {
    match &cli.command {
        Some(Commands::Check { input, json }) => check_file(input, *json),
        Some(Commands::Unparse { input, output }) => {
            let program = parse_file(input)?;
            emit(&unparse(&program, None), output.as_deref())?;
            Ok(0)
        }
        Some(Commands::Version) => {
            println!("cflatc 0.1.0");
            println!("cflat front end");
            Ok(0)
        }
        None => match &cli.input {
            Some(input) => compile_file(input, cli.output.as_deref()),
            None => {
                eprintln!("Error: No input file specified");
                eprintln!("Usage: cflatc <FILE> or cflatc check <FILE>");
                Ok(1)
            }
        },
    }
}

fn read_source(input: &Path) -> Result<String> {
    fs::read_to_string(input).with_context(|| format!("cannot read {}", input.display()))
}

fn emit(text: &str, output: Option<&Path>) -> Result<()> {
    match output {
        Some(path) => {
            fs::write(path, text).with_context(|| format!("cannot write {}", path.display()))?;
            log::info!("wrote {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

/// Read and parse a file; syntax errors carry their position
fn parse_file(input: &Path) -> Result<Program> {
    let source = read_source(input)?;
    parse(&source).map_err(|e| match e.span() {
        Some(span) => anyhow!("{}:{}: {}", input.display(), span, e),
        None => anyhow!("{}: {}", input.display(), e),
    })
}

/// Parse and analyze a file
fn analyze_file(input: &Path) -> Result<(Program, Analysis)> {
    let program = parse_file(input)?;
    log::debug!("parsed {} declarations", program.decls.len());

    let analysis = analyze(&program)?;
    Ok((program, analysis))
}

/// Analyze and, if clean, print the annotated program
fn compile_file(input: &Path, output: Option<&Path>) -> Result<i32> {
    let (program, analysis) = analyze_file(input)?;

    if !analysis.is_ok() {
        eprint!("{}", analysis.diagnostics);
        eprintln!(
            "{}: {} error(s), no output produced",
            input.display(),
            analysis.diagnostics.fatal_count()
        );
        return Ok(1);
    }

    emit(&unparse(&program, Some(&analysis.bindings)), output)?;
    Ok(0)
}

fn check_file(input: &Path, json: bool) -> Result<i32> {
    let (_, analysis) = analyze_file(input)?;

    if json {
        println!("{}", analysis.diagnostics.to_json());
    } else if analysis.is_ok() {
        println!("No errors found in {}", input.display());
    } else {
        eprint!("{}", analysis.diagnostics);
    }

    Ok(if analysis.is_ok() { 0 } else { 1 })
}
