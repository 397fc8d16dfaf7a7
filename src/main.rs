//! routewise: quality-gated LLM routing and memory-backed console chat.
//!
//! Startup sequence:
//!   1. Load .env (if present)
//!   2. Parse CLI args
//!   3. Load config (environment is read here, once)
//!   4. Init logger once
//!   5. Build providers / memory store from the config struct
//!   6. Run the command: `ask` (one routed query) or `chat` (console loop)

use std::io::IsTerminal;

use tokio::io::BufReader;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use routewise::config::{self, Config};
use routewise::error::AppError;
use routewise::llm::providers;
use routewise::logger;
use routewise::subsystems::agents::memory_chat::MemoryChat;
use routewise::subsystems::agents::routing::RoutingFlow;
use routewise::subsystems::comms::pty::{self, ConsoleExit};
use routewise::subsystems::memory;

#[tokio::main(flavor = "current_thread")]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    // .env is optional
    let _ = dotenvy::dotenv();

    let args = parse_cli_args();

    let mut config = config::load(args.config_path.as_deref())?;
    if let Some(user) = &args.user_id {
        config.memory.user_id = user.clone();
    }

    let effective_log_level = args.log_level.unwrap_or(config.log_level.as_str());
    logger::init(effective_log_level, args.log_level.is_some(), config.log_file.as_deref())?;

    info!(
        configured_log_level = %config.log_level,
        effective_log_level = %effective_log_level,
        api_keys = ?config.api_keys,
        "config loaded"
    );

    match args.command {
        Command::Ask(query) => ask(&config, &query).await,
        Command::Chat => chat(&config).await,
    }
}

/// Run the routing flow once and print the final state as JSON.
async fn ask(config: &Config, query: &str) -> Result<(), AppError> {
    let flow = RoutingFlow::from_config(&config.flow, &config.api_keys)?;
    let outcome = flow.run(query).await?;
    let json = serde_json::to_string_pretty(&outcome.state)
        .map_err(|e| AppError::Io(std::io::Error::other(e)))?;
    println!("{json}");
    Ok(())
}

/// Memory console on stdin/stdout until EOF or Ctrl-C.
async fn chat(config: &Config) -> Result<(), AppError> {
    let provider = providers::build(&config.chat, &config.api_keys)?;
    let store = memory::build(&config.memory, &config.api_keys).await?;
    let chat = MemoryChat::new(provider, store, config.memory.user_id.clone());

    let shutdown = CancellationToken::new();
    tokio::spawn(watch_ctrl_c(shutdown.clone()));

    if std::io::stdin().is_terminal() {
        eprintln!("routewise console, user '{}' (Ctrl-D or Ctrl-C to quit)", chat.user_id());
    }

    let stdin = BufReader::new(tokio::io::stdin());
    let exit = pty::run_console(&chat, stdin, tokio::io::stdout(), shutdown).await?;
    info!(?exit, "console closed");
    if exit == ConsoleExit::Shutdown {
        // tokio's stdin reader thread blocks on read; don't wait for it
        std::process::exit(0);
    }
    Ok(())
}

/// First Ctrl-C cancels `shutdown`; a second one exits immediately.
///
/// The tokio handler replaces the default SIGINT behaviour for the rest of
/// the process, so the watcher keeps listening after the first signal.
async fn watch_ctrl_c(shutdown: CancellationToken) {
    let mut received = 0u32;
    while tokio::signal::ctrl_c().await.is_ok() {
        received += 1;
        if received == 1 {
            info!("ctrl-c received, shutting down");
            shutdown.cancel();
        } else {
            warn!("second ctrl-c, exiting now");
            std::process::exit(130);
        }
    }
}

// ── CLI ──────────────────────────────────────────────────────────────────────

enum Command {
    Ask(String),
    Chat,
}

struct CliArgs {
    command: Command,
    log_level: Option<&'static str>,
    config_path: Option<String>,
    user_id: Option<String>,
}

fn print_help() {
    println!("Usage: routewise [OPTIONS] [COMMAND]");
    println!();
    println!("Commands:");
    println!("  chat                 Memory-backed console chat (default)");
    println!("  ask <QUERY>...       Route one query through respond → evaluate → fallback");
    println!();
    println!("Options:");
    println!("  -h, --help           Print help");
    println!("  -f, --config <PATH>  Path to configuration file (default: config/default.toml)");
    println!("  -u, --user <ID>      Memory user id (overrides [memory] user_id)");
    println!("  -v, -vv, -vvv, -vvvv Increase logging verbosity");
}

fn parse_cli_args() -> CliArgs {
    let mut verbosity = 0u8;
    let mut config_path = None;
    let mut user_id = None;
    let mut positional: Vec<String> = Vec::new();

    let mut iter = std::env::args().skip(1);
    while let Some(arg) = iter.next() {
        if arg == "--" {
            positional.extend(iter.by_ref());
            break;
        }

        match arg.as_str() {
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            "-f" | "--config" => match iter.next() {
                Some(path) => config_path = Some(path),
                None => usage_error("-f/--config requires a path argument"),
            },
            "-u" | "--user" => match iter.next() {
                Some(id) => user_id = Some(id),
                None => usage_error("-u/--user requires an id argument"),
            },
            "--verbose" => verbosity = verbosity.saturating_add(1),
            a if a.starts_with('-') && a.len() > 1 && a.chars().skip(1).all(|c| c == 'v') => {
                verbosity = verbosity.saturating_add((a.len() - 1) as u8);
            }
            _ => positional.push(arg),
        }
    }

    let command = match positional.split_first() {
        None => Command::Chat,
        Some((cmd, _)) if cmd == "chat" => Command::Chat,
        Some((cmd, rest)) if cmd == "ask" => {
            if rest.is_empty() {
                usage_error("ask requires a query");
            }
            Command::Ask(rest.join(" "))
        }
        Some((cmd, _)) => usage_error(&format!("unknown command '{cmd}'")),
    };

    // Each -v raises verbosity one tier:
    //   -v      → warn
    //   -vv     → info
    //   -vvv    → debug  (node entries, transitions)
    //   -vvvv+  → trace  (full request payloads)
    let log_level = match verbosity {
        0 => None,
        1 => Some("warn"),
        2 => Some("info"),
        3 => Some("debug"),
        _ => Some("trace"),
    };

    CliArgs { command, log_level, config_path, user_id }
}

fn usage_error(msg: &str) -> ! {
    eprintln!("error: {msg}");
    eprintln!("Try 'routewise --help'.");
    std::process::exit(2);
}
