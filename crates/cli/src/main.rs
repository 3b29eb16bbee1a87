mod config;
mod error;

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use chrono::{Local, TimeZone};
use clap::{Parser, Subcommand};
use colored::Colorize;
use runtime::{OpenAiBackend, Session, SessionEvent, ToolRegistry, ToolSpec, preview};
use storage::{Event, EventKind, EventStore, Role};
use tracing::warn;

use config::{CONFIG_FILE, Config};
use error::{Error, Result};

const SYSTEM_PROMPT: &str = "You are a helpful assistant that can use these tools:
- read: read file contents
- write: write a file
- edit: edit file contents
- glob: find files
- grep: search file contents
- bash: run shell commands

Pick the tools that fit the user's request. When a task takes several steps, work through them one at a time.";

/// Characters of a stored message shown by `deckhand logs`.
const LOG_PREVIEW_CHARS: usize = 200;

#[derive(Parser)]
#[command(name = "deckhand")]
#[command(about = "A local tool-calling agent for OpenAI-compatible endpoints", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to the config file (default: ./deckhand.toml if present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start an interactive chat session
    Chat,
    /// List the tools declared to the model
    Tools,
    /// List all sessions
    Sessions {
        /// Show only the last N sessions
        #[arg(short, long, default_value = "10")]
        limit: usize,
    },
    /// Show event logs for a session
    Logs {
        /// Session ID (prefix match supported)
        #[arg(short, long)]
        session: String,
        /// Filter by event kind (message, tool_call, tool_result, ...)
        #[arg(short, long)]
        kind: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let dotenv_loaded = dotenvy::dotenv().is_ok();
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .with_target(false)
        .init();

    match cli.command {
        Some(Commands::Chat) | None => cmd_chat(cli.config.as_deref(), dotenv_loaded).await,
        Some(Commands::Tools) => {
            print_tools(ToolRegistry::builtin().describe());
            Ok(())
        }
        Some(Commands::Sessions { limit }) => cmd_sessions(limit),
        Some(Commands::Logs { session, kind }) => cmd_logs(&session, kind.as_deref()),
    }
}

async fn cmd_chat(config_path: Option<&Path>, dotenv_loaded: bool) -> Result<()> {
    println!("deckhand v{}", env!("CARGO_PKG_VERSION"));

    let config = Config::discover(config_path)?.with_env(|k| std::env::var(k).ok());
    if config.backend.api_key.is_none() {
        warn!("no API key configured; requests are sent without authorization");
    }

    let mut builder =
        OpenAiBackend::builder(&config.backend.model).base_url(&config.backend.base_url);
    if let Some(key) = &config.backend.api_key {
        builder = builder.api_key(key);
    }
    let backend = builder.build()?;

    // Initialize event store
    let data_dir = dirs_data_dir().unwrap_or_else(|| ".deckhand".into());
    std::fs::create_dir_all(&data_dir)?;
    let db_path = data_dir.join("events.db");
    let store = EventStore::open(&db_path)?;

    let system = config.system_prompt.as_deref().unwrap_or(SYSTEM_PROMPT);
    let mut session = Session::new(store, backend, ToolRegistry::builtin())?
        .with_system(system)
        .with_observer(print_session_event);
    if let Some(max) = config.max_iterations {
        session = session.with_max_iterations(max);
    }

    println!("Session ID: {}", session.id);
    println!("Model: {}", session.backend().model());
    println!("API: {}", session.backend().base_url());
    println!(
        "Config: {}",
        match config_path {
            Some(path) => path.display().to_string(),
            None if Path::new(CONFIG_FILE).exists() => CONFIG_FILE.to_string(),
            None => "defaults".to_string(),
        }
    );
    println!(".env: {}", if dotenv_loaded { "loaded" } else { "not found" });
    println!("Session stored at: {}", db_path.display());
    println!("Commands: /clear  /tools  /quit\n");

    // Chat loop
    let stdin = io::stdin();
    let mut stdout = io::stdout();

    loop {
        print!("{} ", "you>".cyan().bold());
        stdout.flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            // EOF
            break;
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        match input.to_lowercase().as_str() {
            "/quit" | "/exit" | "quit" | "exit" => break,
            "/clear" => {
                session.reset()?;
                println!("Conversation history cleared.\n");
                continue;
            }
            "/tools" => {
                print_tools(session.tools());
                continue;
            }
            _ => {}
        }

        match session.chat(input).await {
            Ok(outcome) => {
                let text = outcome.text();
                if outcome.is_final() {
                    println!("\n{} {}\n", "agent>".green().bold(), text.green());
                } else {
                    println!("\n{} {}\n", "agent>".yellow().bold(), text.yellow());
                }
            }
            Err(e) => {
                eprintln!("{} {e}\n", "Error:".red().bold());
            }
        }
    }

    session.end()?;
    println!("\nSession ended.");
    Ok(())
}

fn print_session_event(event: &SessionEvent) {
    match event {
        SessionEvent::ToolRound { round, calls } => {
            println!(
                "\n{}",
                format!("[tool round {round}, {calls} call(s)]").yellow()
            );
        }
        SessionEvent::ToolCall {
            name, arguments, ..
        } => {
            println!("  {} {}({arguments})", "call".magenta(), name.magenta().bold());
        }
        SessionEvent::ToolResult { preview, .. } => {
            println!("  {} {preview}", "result:".blue());
        }
    }
}

fn print_tools(specs: &[ToolSpec]) {
    println!("\nAvailable tools:");
    for spec in specs {
        println!("  - {}: {}", spec.name.bold(), spec.description);
        let required: Vec<&str> = spec.schema["required"]
            .as_array()
            .map(|r| r.iter().filter_map(|v| v.as_str()).collect())
            .unwrap_or_default();
        if let Some(properties) = spec.schema["properties"].as_object() {
            let params: Vec<String> = properties
                .iter()
                .map(|(name, schema)| {
                    let ty = schema["type"].as_str().unwrap_or("?");
                    let marker = if required.contains(&name.as_str()) { "" } else { "?" };
                    format!("{name}: {ty}{marker}")
                })
                .collect();
            println!("    params: {}", params.join(", "));
        }
    }
    println!();
}

fn cmd_sessions(limit: usize) -> Result<()> {
    let store = open_store()?;
    let sessions = store.list_sessions()?;

    if sessions.is_empty() {
        println!("No sessions found.");
        return Ok(());
    }

    println!(
        "{:<36}  {:<20}  {:<8}  STATUS",
        "SESSION ID", "STARTED", "MSGS"
    );
    println!("{}", "-".repeat(80));

    for summary in sessions.into_iter().take(limit) {
        let started = Local
            .from_utc_datetime(&summary.started_at.naive_utc())
            .format("%Y-%m-%d %H:%M");
        let status = if summary.ended_at.is_some() {
            "ended"
        } else {
            "active"
        };
        println!(
            "{:<36}  {:<20}  {:<8}  {status}",
            summary.id.to_string(),
            started.to_string(),
            summary.message_count
        );
    }

    Ok(())
}

fn cmd_logs(session_prefix: &str, kind_filter: Option<&str>) -> Result<()> {
    let store = open_store()?;

    // Find session by prefix
    let sessions = store.list_sessions()?;
    let matching: Vec<_> = sessions
        .iter()
        .filter(|s| s.id.to_string().starts_with(session_prefix))
        .collect();

    let session_id = match matching.as_slice() {
        [] => {
            return Err(Error::SessionNotFound {
                prefix: session_prefix.to_string(),
            });
        }
        [only] => only.id,
        _ => {
            return Err(Error::AmbiguousSession {
                prefix: session_prefix.to_string(),
                matches: matching.iter().map(|s| s.id.to_string()).collect(),
            });
        }
    };

    let events = store.load_events(session_id, kind_filter)?;

    if events.is_empty() {
        println!("No events found for session {session_id}");
        return Ok(());
    }

    println!("Session: {session_id}\n");

    for event in events {
        print_event(&event);
    }

    Ok(())
}

fn print_event(event: &Event) {
    let time = Local
        .from_utc_datetime(&event.timestamp.naive_utc())
        .format("%H:%M:%S");

    match &event.kind {
        EventKind::SessionStart => {
            println!("[{time}] === Session started ===");
        }
        EventKind::SessionEnd => {
            println!("[{time}] === Session ended ===");
        }
        EventKind::Reset => {
            println!("[{time}] === History cleared ===");
        }
        EventKind::Message { role, content } => {
            let role_str = match role {
                Role::User => "USER",
                Role::Assistant => "ASSISTANT",
                Role::System => "SYSTEM",
                Role::Tool => "TOOL",
            };
            println!("[{time}] {role_str}: {}", preview(content, LOG_PREVIEW_CHARS));
        }
        EventKind::ToolCall {
            call_id,
            name,
            arguments,
        } => {
            println!("[{time}] TOOL CALL {call_id}: {name} {arguments}");
        }
        EventKind::ToolResult {
            call_id, output, ..
        } => {
            println!(
                "[{time}] TOOL RESULT {call_id}: {}",
                preview(output, LOG_PREVIEW_CHARS)
            );
        }
        EventKind::IterationLimit { iterations } => {
            println!("[{time}] === Iteration limit reached after {iterations} rounds ===");
        }
    }
}

fn open_store() -> Result<EventStore> {
    let data_dir = dirs_data_dir().unwrap_or_else(|| ".deckhand".into());
    let db_path = data_dir.join("events.db");

    if !db_path.exists() {
        return Err(Error::DatabaseNotFound { path: db_path });
    }

    Ok(EventStore::open(&db_path)?)
}

fn dirs_data_dir() -> Option<PathBuf> {
    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local/share/deckhand"))
    }
    #[cfg(target_os = "linux")]
    {
        std::env::var_os("XDG_DATA_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".local/share")))
            .map(|p| p.join("deckhand"))
    }
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|h| PathBuf::from(h).join("deckhand"))
    }
    #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
    {
        None
    }
}
