// Ouroboros: tree-walking C interpreter with a simulated heap

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser as ClapParser;
use crossterm::style::Stylize;

use ouroboros::interpreter::constants::DEFAULT_MAX_CALL_DEPTH;
use ouroboros::parser::lexer::Lexer;
use ouroboros::parser::Parser;
use ouroboros::{Error, Interpreter, InterpreterConfig, StdTerminal};

/// Run a C program
#[derive(Debug, ClapParser)]
#[command(name = "ouroboros", version, about)]
struct Cli {
    /// C source file to run
    file: PathBuf,

    /// Maximum nesting of function calls before a stack overflow error
    #[arg(long, value_name = "N", default_value_t = DEFAULT_MAX_CALL_DEPTH)]
    max_depth: usize,

    /// Print heap statistics after the run
    #[arg(long)]
    heap_stats: bool,

    /// Only print the program's own output
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(err) => {
            eprintln!("{} {:#}", "error:".red().bold(), err);
            ExitCode::from(1)
        }
    }
}

/// Run the program; the exit code is `main`'s return value
fn run(cli: &Cli) -> anyhow::Result<u8> {
    let source = fs::read_to_string(&cli.file)
        .with_context(|| format!("failed to read '{}'", cli.file.display()))?;

    progress(cli, &format!("Parsing {}...", cli.file.display()));
    let tokens = Lexer::new(&source).tokenize().map_err(Error::from)?;
    let program = Parser::from_tokens(tokens)
        .parse_program()
        .map_err(Error::from)?;
    progress(
        cli,
        &format!(
            "Parsed successfully. Found {} top-level statements.",
            program.statements.len()
        ),
    );

    let config = InterpreterConfig::default().with_max_call_depth(cli.max_depth);
    let mut interpreter = Interpreter::with_terminal(StdTerminal::new(), config);

    progress(cli, "Executing program...");
    let outcome = interpreter.run_program(&program);

    if cli.heap_stats {
        eprint!("{}", interpreter.heap().debug_dump().dark_grey());
    }

    let results = outcome.map_err(Error::from)?;
    progress(cli, "Execution completed successfully.");

    if !cli.quiet {
        for value in &results {
            println!("{} {}", "Result:".green(), value);
        }
    }

    // `main`'s value is the last result of a conventional program
    let code = match results.last() {
        Some(value) if interpreter.has_function("main") => value.as_int().unwrap_or(0),
        _ => 0,
    };
    Ok(code as u8)
}

fn progress(cli: &Cli, message: &str) {
    if !cli.quiet {
        eprintln!("{}", message.dim());
    }
}
