use std::fs::File;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Parser as ClapParser;
use clap::Subcommand;
use env_logger::Builder;
use log::{debug, info};

use rox::error::LoxError;
use rox::interpreter::Interpreter;
use rox::lox::{self, Lox};
use rox::parser::Parser;
use rox::printer::{AstPrinter, RpnPrinter};

/// Exit code for scan, parse and resolve failures.
const EXIT_STATIC: i32 = 65;

/// Exit code for runtime failures.
const EXIT_RUNTIME: i32 = 70;

#[derive(ClapParser, Debug)]
#[command(version, about = "Lox language interpreter", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    commands: Commands,

    /// Enable logging to rox.log
    #[arg(long, global = true)]
    log: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Tokenizes input from a file, printing each token
    Tokenize {
        filename: Option<PathBuf>,

        /// Print the token list as JSON
        #[arg(long)]
        json: bool,
    },

    /// Parses input from a file as a single expression and prints its AST
    Parse {
        filename: Option<PathBuf>,

        /// Print in reverse Polish notation instead of prefix form
        #[arg(long)]
        rpn: bool,
    },

    /// Evaluates input from a file as a single expression and prints the result
    Evaluate { filename: Option<PathBuf> },

    /// Runs input from a file as a Lox program
    Run { filename: Option<PathBuf> },

    /// Starts an interactive prompt
    Repl,
}

/// Reads the contents of a file into a String
fn read_file(filename: &Path) -> Result<String> {
    info!("Reading file: {:?}", filename);
    let file = File::open(filename).context(format!("Failed to open file {:?}", filename))?;
    let mut reader = BufReader::new(file);
    let mut buf = Vec::new();

    let bytes = reader
        .read_to_end(&mut buf)
        .context(format!("Failed to read file {:?}", filename))?;

    info!("Read {} bytes from {:?}", bytes, filename);

    String::from_utf8(buf).context(format!("{:?} is not valid UTF-8", filename))
}

fn init_logger() -> Result<()> {
    // Create or open the log file
    let log_file = File::create("rox.log").context("Failed to create rox.log")?;

    Builder::new()
        .format(|buf, record| {
            // Strip 'rox::' from module path
            let module = record.module_path().unwrap_or("<unnamed>");
            let module = module.strip_prefix("rox::").unwrap_or(module);
            writeln!(
                buf,
                "[{}:{}] - {}",
                module,
                record.line().unwrap_or(0),
                record.args()
            )
        })
        .target(env_logger::Target::Pipe(Box::new(log_file)))
        .filter(None, log::LevelFilter::Debug) // Default to Debug, override with RUST_LOG
        .parse_default_env()
        .init();

    info!("Logger initialized, writing to rox.log");
    Ok(())
}

/// `file [l:c-l:c]: message`, or the bare error when it has no span.
fn describe(filename: &str, e: &LoxError) -> String {
    match e.location(filename) {
        Some(location) => format!("{}: {}", location, e.message()),
        None => format!("{}: {}", filename, e),
    }
}

/// Print static diagnostics (all of them) or a runtime failure (exactly one).
fn report(filename: &str, errors: &[LoxError]) -> i32 {
    let is_static = errors.iter().all(LoxError::is_static);

    if is_static {
        for e in errors {
            debug!("Static diagnostic: {}", e);
            eprintln!("{}", describe(filename, e));
        }
        if errors.len() > 1 {
            eprintln!("{} errors found.", errors.len());
        }
        EXIT_STATIC
    } else {
        for e in errors {
            debug!("Runtime debug: {}", e);
            eprintln!("Runtime error: {}", describe(filename, e));
        }
        EXIT_RUNTIME
    }
}

fn display_name(filename: &Path) -> String {
    filename.display().to_string()
}

fn no_input() -> ! {
    info!("No filepath provided");

    println!("No input filepath was provided. Exiting...");

    std::process::exit(0);
}

fn tokenize(filename: &Path, json: bool) -> Result<()> {
    let source = read_file(filename)?;

    match lox::scan_source(&source) {
        Ok(tokens) => {
            if json {
                println!("{}", serde_json::to_string_pretty(&tokens)?);
            } else {
                for token in &tokens {
                    println!("{}", token);
                }
            }
            info!("Tokenization completed successfully");
            Ok(())
        }
        Err(errors) => std::process::exit(report(&display_name(filename), &errors)),
    }
}

fn parse(filename: &Path, rpn: bool) -> Result<()> {
    let source = read_file(filename)?;
    let name = display_name(filename);

    let tokens = match lox::scan_source(&source) {
        Ok(tokens) => tokens,
        Err(errors) => std::process::exit(report(&name, &errors)),
    };

    let mut parser = Parser::new(tokens);
    match parser.parse_expression() {
        Ok(expr) => {
            let printed = if rpn {
                RpnPrinter::print(&expr)
            } else {
                AstPrinter::print(&expr)
            };
            debug!("AST: {}", printed);
            println!("{}", printed);

            // The tree is printed even when it holds recovered errors.
            if !parser.diagnostics().is_empty() {
                std::process::exit(report(&name, parser.diagnostics()));
            }
            Ok(())
        }
        Err(errors) => std::process::exit(report(&name, &errors)),
    }
}

fn evaluate(filename: &Path) -> Result<()> {
    let source = read_file(filename)?;
    let name = display_name(filename);

    let tokens = match lox::scan_source(&source) {
        Ok(tokens) => tokens,
        Err(errors) => std::process::exit(report(&name, &errors)),
    };

    let expr = match Parser::new(tokens).parse_expression() {
        Ok(expr) => expr,
        Err(errors) => std::process::exit(report(&name, &errors)),
    };

    let mut interpreter = Interpreter::with_stdout();
    match interpreter.evaluate(&expr) {
        Ok(value) => {
            debug!("Evaluated to: {}", value);
            println!("{}", value);
            Ok(())
        }
        Err(e) => {
            // An `Invalid` node surfaces here as a parse error.
            std::process::exit(report(&name, &[e]));
        }
    }
}

fn run(filename: &Path) -> Result<()> {
    let source = read_file(filename)?;
    let name = display_name(filename);

    info!("Provided input:\n {}", source);

    let mut session = Lox::with_stdout(name.clone());
    match session.run(&source) {
        Ok(_) => {
            info!("Program executed successfully");
            Ok(())
        }
        Err(errors) => std::process::exit(report(&name, &errors)),
    }
}

fn repl() -> Result<()> {
    info!("Starting REPL");

    let mut session = Lox::with_stdout("<repl>");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();

    loop {
        print!("> ");
        io::stdout().flush().context("Failed to flush stdout")?;

        let Some(line) = lines.next() else {
            println!();
            break;
        };
        let line = line.context("Failed to read from stdin")?;

        if line.trim().is_empty() {
            continue;
        }

        match session.run(&line) {
            Ok(Some(value)) => println!("{}", value),
            Ok(None) => {}
            Err(errors) => {
                report("<repl>", &errors);
            }
        }
    }

    Ok(())
}

fn main() -> Result<()> {
    let args: Cli = Cli::parse();

    // Initialize logger only if --log flag is provided
    if args.log {
        init_logger()?;
    } else {
        // Initialize a minimal logger to avoid "no logger" errors
        env_logger::Builder::new()
            .filter_level(log::LevelFilter::Off)
            .init();
    }

    info!("CLI arguments: {:?}", args);

    match args.commands {
        Commands::Tokenize { filename, json } => {
            tokenize(&filename.unwrap_or_else(|| no_input()), json)
        }
        Commands::Parse { filename, rpn } => parse(&filename.unwrap_or_else(|| no_input()), rpn),
        Commands::Evaluate { filename } => evaluate(&filename.unwrap_or_else(|| no_input())),
        Commands::Run { filename } => run(&filename.unwrap_or_else(|| no_input())),
        Commands::Repl => repl(),
    }
}
