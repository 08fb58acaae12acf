//! Gallery Tagger
//!
//! Starts the automation session and reads commands from stdin.

mod cli;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use tagger_automation::{AutomationError, Lifecycle, TaggerController};
use tagger_config::{ConfigLoader, NameBook, TaggerConfig};

use crate::cli::{Cli, HELP, PromptCommand};

const READ_TIMEOUT: Duration = Duration::from_secs(10);

/// Get the gallery-tagger home directory (~/.gallery-tagger).
fn tagger_dir() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(".gallery-tagger"))
        .unwrap_or_else(|| PathBuf::from(".gallery-tagger"))
}

/// Initialize tracing with console and file output.
///
/// Log files are written to ~/.gallery-tagger/logs/ with daily rotation.
fn init_tracing() -> Result<(), Box<dyn std::error::Error>> {
    let log_dir = tagger_dir().join("logs");
    std::fs::create_dir_all(&log_dir)?;

    let file_appender = RollingFileAppender::builder()
        .rotation(Rotation::DAILY)
        .filename_prefix("gallery-tagger")
        .filename_suffix("log")
        .max_log_files(14)
        .build(&log_dir)?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    // Flushes the file writer on exit.
    static GUARD: std::sync::OnceLock<tracing_appender::non_blocking::WorkerGuard> =
        std::sync::OnceLock::new();
    let _ = GUARD.set(guard);

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true).with_ansi(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    Ok(())
}

fn load_config(cli: &Cli) -> Result<TaggerConfig, Box<dyn std::error::Error>> {
    let mut config = match &cli.config {
        Some(path) => ConfigLoader::load(path)?,
        None => TaggerConfig::default(),
    };
    if cli.headless {
        config.browser.headless = true;
    }
    if let Some(secs) = cli.timeout {
        config.timing.ready_timeout_secs = secs;
    }
    Ok(config)
}

/// Names file from the flag, else `~/.gallery-tagger/names.json` if present.
fn names_path(cli: &Cli) -> Option<PathBuf> {
    cli.names.clone().or_else(|| {
        let default = tagger_dir().join("names.json");
        default.exists().then_some(default)
    })
}

fn print_names(book: &NameBook) {
    for entry in &book.entries {
        match entry.shortcut {
            Some(marker) => println!("  {:>5}  {}", format!("({})", marker), entry.display),
            None => println!("         {}", entry.display),
        }
    }
}

/// Run one prompt command. Returns `false` to leave the prompt.
fn run_command(
    controller: &TaggerController,
    command: PromptCommand,
    names: Option<&Path>,
) -> Result<bool, AutomationError> {
    match command {
        PromptCommand::Next => controller.go_to_next()?,
        PromptCommand::Previous => controller.go_to_previous()?,
        PromptCommand::Append(text) => controller.append_text(text)?,
        PromptCommand::Backspace => controller.send_backspace()?,
        PromptCommand::Clear => controller.delete_all()?,
        PromptCommand::End => controller.cursor_to_end()?,
        PromptCommand::Read => match controller.read_description(READ_TIMEOUT)? {
            Some(text) => println!("{:?}", text),
            None => println!("(no description)"),
        },
        PromptCommand::State => match serde_json::to_string_pretty(&controller.state()) {
            Ok(json) => println!("{}", json),
            Err(e) => warn!("Failed to render state: {}", e),
        },
        PromptCommand::Reload => {
            let book = NameBook::load_or_default(names);
            println!("{} names loaded", book.entries.len());
            controller.reload_names(book)?;
        }
        PromptCommand::Names => print_names(&controller.names()),
        PromptCommand::Name(key) => match controller.insert_name(&key)? {
            Some(name) => println!("+ {}", name),
            None => println!("nothing bound to {}", key),
        },
        PromptCommand::Help => println!("{}", HELP),
        PromptCommand::Quit => return Ok(false),
    }
    Ok(true)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing()?;

    let cli = Cli::parse();
    let config = load_config(&cli)?;
    let names = names_path(&cli);
    let book = NameBook::load_or_default(names.as_deref());

    info!("Starting Gallery Tagger v{}", env!("CARGO_PKG_VERSION"));
    let headful = !config.browser.headless;
    let timeout = config.timing.ready_timeout();
    let controller = TaggerController::new(config, book);
    controller.start(headful, timeout)?;

    if controller.state().lifecycle != Lifecycle::Ready {
        error!("No automation session; exiting");
        return Ok(());
    }

    println!("{}", HELP);
    let stdin = io::stdin();
    let mut stdout = io::stdout();
    loop {
        print!("> ");
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        let command = match PromptCommand::parse(&line) {
            Ok(Some(command)) => command,
            Ok(None) => continue,
            Err(msg) => {
                println!("{}", msg);
                continue;
            }
        };
        match run_command(&controller, command, names.as_deref()) {
            Ok(true) => {}
            Ok(false) => break,
            Err(AutomationError::NotRunning) => {
                error!("Automation session ended");
                break;
            }
            Err(e) => error!("{}", e),
        }
    }

    controller.stop();
    info!("Bye");
    Ok(())
}
