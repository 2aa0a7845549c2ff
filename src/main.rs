//! Multiplexer CLI Entry Point
//!
//! # Usage
//!
//! ```bash
//! # Run every command in commands.txt against every host in hosts.tsv
//! multiplexer commands.txt hosts.tsv
//!
//! # Payloads from standard input, 8 workers
//! cut -f1,3 inventory.tsv | multiplexer commands.txt --cpus 8
//!
//! # Start over, ignoring unfinished work from the last run
//! multiplexer commands.txt hosts.tsv --force
//!
//! # Keep task output
//! multiplexer commands.txt hosts.tsv --stdout run.log --stderr run.err
//! ```

use std::error::Error;
use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::Parser;
use colored::Colorize;
use log::{error, info, warn};

use multiplexer::config::{output_sinks, resolve_worker_count, DEFAULT_SAVEFILE};
use multiplexer::execution::CancellationToken;
use multiplexer::monitoring::ConsoleReporter;
use multiplexer::session::{open_terminal, AutoPrompt, Prompt, Session, SessionOptions};
use multiplexer::tasks::{read_payloads, read_templates, PayloadRecord};
use multiplexer::{CheckpointStore, APP_NAME, VERSION};

/// Exit code used when a second interrupt aborts before the savefile is written.
const FORCED_EXIT_CODE: i32 = 130;

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(
    name = "multiplexer",
    version,
    about = "Runs every command in a template file against every payload record, in parallel, with resumable progress"
)]
struct Cli {
    /// Template file: one command per line with {0}, {1}, ... placeholders
    template: PathBuf,

    /// Payload file: one tab-separated record per line [default: standard input]
    payloads: Option<PathBuf>,

    /// Ignore the contents of the savefile
    #[arg(long)]
    force: bool,

    /// Number of simultaneous processes [default: cores - 2, at least 2]
    #[arg(long, value_parser = clap::value_parser!(u16).range(1..))]
    cpus: Option<u16>,

    /// File recording unfinished tasks [default: ~/.multiplexer_progress]
    #[arg(long)]
    savefile: Option<PathBuf>,

    /// Append task stdout to this file
    #[arg(long, value_name = "PATH")]
    stdout: Option<PathBuf>,

    /// Append task stderr to this file
    #[arg(long, value_name = "PATH")]
    stderr: Option<PathBuf>,

    /// Show task output in the terminal instead of discarding it
    #[arg(long)]
    show_output: bool,

    /// Only report failed tasks while running
    #[arg(short, long)]
    quiet: bool,

    /// Never prompt; accept every default answer
    #[arg(short = 'y', long)]
    yes: bool,

    /// Enable debug logging
    #[arg(short, long)]
    verbose: bool,
}

/// Configures the logging system with appropriate formatting.
fn setup_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };

    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format(|buf, record| {
            use std::io::Write;

            match record.level() {
                log::Level::Warn | log::Level::Error => {
                    writeln!(buf, "[{}] {}", record.level(), record.args())
                }
                _ => writeln!(buf, "{}", record.args()),
            }
        })
        .init();
}

/// Prints the application banner with version information.
fn print_banner() {
    println!();
    println!("{} v{}", APP_NAME.bold(), VERSION);
    println!();
}

/// Reads the template file.
fn load_templates(path: &Path) -> Result<Vec<String>, Box<dyn Error>> {
    let file = File::open(path)
        .map_err(|e| format!("Could not open template '{}': {}", path.display(), e))?;
    let templates = read_templates(BufReader::new(file))
        .map_err(|e| format!("Could not read template '{}': {}", path.display(), e))?;

    if templates.is_empty() {
        warn!("Template '{}' contains no commands", path.display());
    }
    Ok(templates)
}

/// Reads payloads from a file, or from standard input for `None` or `-`.
fn load_payloads(path: Option<&Path>) -> Result<Vec<PayloadRecord>, Box<dyn Error>> {
    match path {
        Some(path) if path != Path::new("-") => {
            let file = File::open(path)
                .map_err(|e| format!("Could not open payloads '{}': {}", path.display(), e))?;
            Ok(read_payloads(BufReader::new(file))
                .map_err(|e| format!("Could not read payloads '{}': {}", path.display(), e))?)
        }
        _ => {
            info!("Reading payloads from standard input");
            Ok(read_payloads(io::stdin().lock())
                .map_err(|e| format!("Could not read payloads from standard input: {}", e))?)
        }
    }
}

/// Picks the terminal for questions, or automatic answers when there is none.
///
/// The flag tells whether an operator is actually being asked.
fn select_prompt(never_prompt: bool) -> (Box<dyn Prompt>, bool) {
    if never_prompt {
        let prompt: Box<dyn Prompt> = Box::new(AutoPrompt::defaults());
        return (prompt, false);
    }

    match open_terminal() {
        Ok(terminal) => {
            let prompt: Box<dyn Prompt> = Box::new(terminal);
            (prompt, true)
        }
        Err(e) => {
            info!("No terminal for prompts ({}); using default answers", e);
            let prompt: Box<dyn Prompt> = Box::new(AutoPrompt::defaults());
            (prompt, false)
        }
    }
}

/// Routes Ctrl+C to the session's cancellation token.
///
/// A second interrupt exits immediately without writing the savefile.
fn install_interrupt_handler(cancel: CancellationToken) -> Result<(), Box<dyn Error>> {
    ctrlc::set_handler(move || {
        if cancel.is_cancelled() {
            eprintln!("Interrupted again; exiting without saving progress");
            std::process::exit(FORCED_EXIT_CODE);
        }
        eprintln!("Interrupt received; saving unfinished tasks...");
        cancel.cancel();
    })
    .map_err(|e| format!("Failed to set Ctrl+C handler: {}", e))?;

    Ok(())
}

/// Main application entry point.
fn run() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    setup_logging(cli.verbose);
    print_banner();

    let templates = load_templates(&cli.template)?;
    let payloads = load_payloads(cli.payloads.as_deref())?;

    let savefile = cli.savefile.clone().unwrap_or_else(|| DEFAULT_SAVEFILE.clone());
    let sinks = output_sinks(cli.stdout.as_deref(), cli.stderr.as_deref(), cli.show_output)
        .map_err(|e| format!("Could not open task output file: {}", e))?;

    let (mut prompt, interactive) = select_prompt(cli.yes);

    let options = SessionOptions {
        worker_count: resolve_worker_count(cli.cpus.map(usize::from)),
        resume: !cli.force,
        interactive,
    };

    let cancel = CancellationToken::new();
    install_interrupt_handler(cancel.clone())?;

    let mut session = Session::new(templates, payloads, CheckpointStore::new(&savefile), options);
    session.set_output_sinks(sinks);

    let prepared = session.prepare(prompt.as_mut())?;

    println!("Starting the Multiplexer!");
    println!(
        "Running {} task(s) over {} worker(s).",
        prepared.tasks().len(),
        prepared.worker_count()
    );
    println!("Savefile location is: {}", savefile.display());
    if prepared.resumed_tasks() > 0 {
        println!(
            "Resuming {} unfinished task(s) from the savefile.",
            prepared.resumed_tasks()
        );
    }
    if !prepared.skipped_pairings().is_empty() {
        println!(
            "{}",
            format!(
                "Skipped {} template/payload pairing(s) that could not be filled.",
                prepared.skipped_pairings().len()
            )
            .yellow()
        );
    }
    println!();

    let mut reporter =
        ConsoleReporter::stdout(prepared.tasks().len()).show_completed(!cli.quiet);
    let report = session.execute(prepared, &mut reporter, &cancel).map_err(|e| {
        error!("Could not save progress: {}", e);
        e
    })?;

    println!();
    if report.is_complete() {
        println!("{}", report.headline().green());
    } else {
        println!("{}", report.headline().yellow());
    }

    if cli.verbose {
        println!();
        print!("{}", report.details());
    }

    Ok(())
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!();
            eprintln!("Error: {}", e);
            ExitCode::FAILURE
        }
    }
}
