//! netfix - Wi-Fi troubleshooting assistant

mod commands;
mod config;
mod console;
mod guards;
mod server;
mod service;
mod session;
mod store;
mod transport;

use clap::Parser;
use config::{Config, StoreKind};
use netfix_engine::{EpisodeStore, MemoryStore};
use service::ConversationService;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use transport::{LocalTransport, RestTransport, Transport};

/// netfix - talk your Wi-Fi back to life
#[derive(Parser, Debug)]
#[command(name = "netfix")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Run the REST webhook (optionally on ADDR, default from config)
    #[arg(long, value_name = "ADDR", num_args = 0..=1, default_missing_value = "")]
    serve: Option<String>,

    /// Talk to a running webhook instead of the built-in engine
    #[arg(long, value_name = "URL")]
    remote: Option<String>,

    /// Conversation id to use
    #[arg(long)]
    sender: Option<String>,

    /// Send a single message and exit
    #[arg(short = 'c', long)]
    command: Option<String>,

    /// Resume a previous transcript by ID
    #[arg(long)]
    resume: Option<String>,

    /// List saved transcripts
    #[arg(long)]
    sessions: bool,

    /// Initialize config file
    #[arg(long)]
    init_config: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("netfix=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn open_store(cfg: &Config) -> Arc<dyn EpisodeStore> {
    match cfg.store {
        StoreKind::File => Arc::new(store::FileStore::new(cfg.data_dir().join("conversations"))),
        StoreKind::Memory => Arc::new(MemoryStore::new()),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);

    // Initialize config and exit
    if args.init_config {
        match Config::init() {
            Ok(path) => {
                println!("Config file created at: {}", path.display());
                println!("\nExample config:\n{}", config::example_config());
            }
            Err(e) => {
                eprintln!("Error creating config: {}", e);
                std::process::exit(1);
            }
        }
        return Ok(());
    }

    let mut cfg = Config::load();

    // List transcripts and exit
    if args.sessions {
        return list_sessions(&cfg);
    }

    // Merge config with CLI args (CLI takes precedence)
    if let Some(url) = args.remote {
        cfg.remote_url = Some(url);
    }
    if let Some(sender) = args.sender {
        cfg.sender = sender;
    }

    if let Some(addr) = args.serve {
        if !addr.is_empty() {
            cfg.bind = addr;
        }
        let service = Arc::new(ConversationService::new(cfg.engine(), open_store(&cfg)));
        return server::run(&cfg.bind, service).await;
    }

    let data_dir = cfg.data_dir();
    let resumed = match args.resume {
        Some(ref id) => match session::SessionLog::open(&data_dir, id) {
            Ok((log, messages)) => {
                println!("Resuming session {} ({} messages)", id, messages.len());
                if let Some((_, last)) = messages.iter().rev().find(|(role, _)| *role == session::Role::Bot) {
                    println!("{}", last);
                }
                // Pick up the episode stored for that conversation
                if !log.sender().is_empty() {
                    cfg.sender = log.sender().to_string();
                }
                Some(log)
            }
            Err(e) => {
                eprintln!("Error loading session: {}", e);
                std::process::exit(1);
            }
        },
        None => None,
    };

    let transport: Box<dyn Transport> = match cfg.remote_url.clone() {
        Some(url) => Box::new(RestTransport::new(
            url,
            Duration::from_secs(cfg.request_timeout_secs),
        )?),
        None => {
            let service = Arc::new(ConversationService::new(cfg.engine(), open_store(&cfg)));
            Box::new(LocalTransport::new(service))
        }
    };

    let log = match resumed {
        Some(log) => Some(log),
        None if args.command.is_some() => None,
        None => session::SessionLog::create(&data_dir, &transport.backend(), &cfg.sender)
            .map_err(|e| tracing::warn!("Transcript disabled: {}", e))
            .ok(),
    };

    let mut console = console::Console::new(transport, cfg.sender.clone(), log);

    // Non-interactive mode
    if let Some(command) = args.command {
        return console.run_command(&command).await;
    }

    console.run_interactive().await
}

fn list_sessions(cfg: &Config) -> anyhow::Result<()> {
    let data_dir = cfg.data_dir();
    match session::SessionLog::list(&data_dir) {
        Ok(sessions) => {
            if sessions.is_empty() {
                println!("No saved sessions found.");
                println!(
                    "Sessions are stored in: {}",
                    session::SessionLog::sessions_dir(&data_dir).display()
                );
            } else {
                println!("Saved sessions:\n");
                println!("{:<38} {:<20} {:<8} Backend", "ID", "Created", "Msgs");
                println!("{}", "-".repeat(90));
                for s in sessions {
                    println!(
                        "{:<38} {:<20} {:<8} {}",
                        s.id,
                        s.created_at_display(),
                        s.message_count,
                        s.backend
                    );
                }
                println!("\nResume with: netfix --resume <session-id>");
            }
        }
        Err(e) => {
            eprintln!("Error listing sessions: {}", e);
        }
    }
    Ok(())
}
