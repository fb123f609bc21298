mod ast;
mod debugger;
mod exec;
mod lexer;
mod parser;
mod printer;
mod token;

use std::error::Error;
use std::io::{stdin, stdout, BufWriter, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use clap::Parser;
use log::{debug, info, log_enabled, Level};
use crate::exec::Interpreter;

/// Runs a guu program: subs holding print, call and set statements, starting from `sub main`.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Source file of the program.
    file: PathBuf,

    /// Print the syntax tree before running.
    #[arg(short, long)]
    ast: bool,

    /// Stop after parsing and compiling.
    #[arg(short, long)]
    check: bool,

    /// Step through the program interactively.
    #[arg(short, long)]
    debug: bool,

    /// Raise the log level; repeat for more detail.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let args = Args::parse();

    let level = match args.verbose {
        0 => Level::Warn,
        1 => Level::Info,
        2 => Level::Debug,
        _ => Level::Trace,
    };
    if let Err(e) = simple_logger::init_with_level(level) {
        eprintln!("failed to set up logging: {e}");
    }

    if let Err(e) = execute(&args) {
        eprintln!("error: {e}");
        return ExitCode::FAILURE;
    }
    ExitCode::SUCCESS
}

fn execute(args: &Args) -> Result<(), Box<dyn Error>> {
    let source = std::fs::read_to_string(&args.file)
        .map_err(|e| format!("failed to read '{}': {e}", args.file.display()))?;

    let program = parser::parse(&source)?;
    info!("parsed {}", args.file.display());
    if args.ast {
        print!("{}", printer::print_tree(&program));
    }

    let mut interpreter = Interpreter::new(program, BufWriter::new(stdout().lock()))?;
    if args.check {
        info!("{} compiled without errors", args.file.display());
        return Ok(());
    }

    let outcome = if args.debug {
        debugger::session(&mut interpreter, stdin().lock(), stdout())
    } else {
        interpreter.run().map_err(Into::into)
    };
    if outcome.is_err() && log_enabled!(Level::Debug) {
        let mut trace = Vec::new();
        interpreter.backtrace(&mut trace)?;
        debug!("backtrace at failure:\n{}", String::from_utf8_lossy(&trace));
    }
    interpreter.into_output().flush()?;
    outcome
}
