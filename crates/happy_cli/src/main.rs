use anyhow::Result;
use clap::Parser;
use happy_core::{
    HappyConfig, JsonFileStore, KeyValueStore, MemoryStore, RandomSource, SeededRandom,
    SystemClock,
};
use happy_orchestrator::{forward, spawn, Orchestrator, OrchestratorHandle, OrchestratorParts, Snapshot};
use std::path::PathBuf;
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::sync::watch;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

mod commands;
mod script;

use commands::ReplCommand;
use script::JsonLinesSource;

#[derive(Parser, Debug)]
#[command(name = "happy", author, version, about = "Happy, a mindful companion in your terminal", long_about = None)]
struct Args {
    /// Path to the TOML config file
    #[arg(short, long, env = "HAPPY_CONFIG", default_value = "happy.toml")]
    config: PathBuf,

    /// JSON file holding the last meditation date (overrides the config)
    #[arg(long)]
    store: Option<PathBuf>,

    /// Seed for reproducible message choices
    #[arg(long)]
    seed: Option<u64>,

    /// Replay perception events from a JSON-lines file, then print the final state
    #[arg(long)]
    script: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long)]
    log_json: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let args = Args::parse();
    init_logging(args.log_json);

    let config = HappyConfig::load_or_default(&args.config);
    let default_pattern = config.breathing.default_pattern.clone();

    let store_path = args
        .store
        .clone()
        .or_else(|| config.storage.path.clone())
        .or_else(default_store_path);
    let store = open_store(store_path);

    let random: Box<dyn RandomSource> = match args.seed {
        Some(seed) => Box::new(SeededRandom::new(seed)),
        None => Box::new(SeededRandom::from_entropy()),
    };

    let orchestrator = Orchestrator::with_parts(
        config,
        OrchestratorParts {
            clock: Box::new(SystemClock::new()),
            random,
            store,
        },
    );
    info!(session = %orchestrator.session_id(), "Happy is awake");

    let handle = spawn(orchestrator);

    if let Some(path) = args.script {
        let source = JsonLinesSource::open(&path).await?;
        let delivered = forward(source, handle.sender()).await?;
        info!("Replayed {} events from {}", delivered, path.display());
        let session = handle.shutdown().await?;
        println!("{}", serde_json::to_string(&session.snapshot())?);
        return Ok(());
    }

    let printer = tokio::spawn(print_messages(handle.subscribe()));
    repl(&handle, &default_pattern).await?;
    printer.abort();

    let session = handle.shutdown().await?;
    info!(session = %session.session_id(), "Goodbye");
    Ok(())
}

fn init_logging(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn default_store_path() -> Option<PathBuf> {
    dirs::data_dir().map(|dir| dir.join("happy").join("happy.json"))
}

fn open_store(path: Option<PathBuf>) -> Box<dyn KeyValueStore> {
    let Some(path) = path else {
        return Box::new(MemoryStore::new());
    };
    match JsonFileStore::open(&path) {
        Ok(store) => {
            info!("Using store at {}", path.display());
            Box::new(store)
        }
        Err(e) => {
            warn!("Store unavailable ({}), keeping state in memory", e);
            Box::new(MemoryStore::new())
        }
    }
}

async fn repl(handle: &OrchestratorHandle, default_pattern: &str) -> Result<()> {
    println!("Happy is listening. Type /help for commands.");
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    while let Some(line) = lines.next_line().await? {
        let Some(command) = commands::parse(&line, default_pattern) else {
            continue;
        };
        match command {
            ReplCommand::Send(inputs) => {
                for input in inputs {
                    handle.send(input).await?;
                }
            }
            ReplCommand::Status => {
                println!("{}", serde_json::to_string_pretty(&handle.snapshot())?);
            }
            ReplCommand::Help => println!("{}", commands::HELP),
            ReplCommand::Quit => break,
            ReplCommand::Unknown(message) => println!("{message}"),
        }
    }
    Ok(())
}

/// Print each new visible message and mood change.
async fn print_messages(mut snapshots: watch::Receiver<Snapshot>) {
    let mut last = snapshots.borrow().clone();
    while snapshots.changed().await.is_ok() {
        let current = snapshots.borrow_and_update().clone();
        if current.visible_message != last.visible_message {
            if let Some(text) = &current.visible_message {
                println!("Happy: {text}");
            }
        }
        if current.classification != last.classification {
            println!("[mood: {:?}]", current.classification);
        }
        last = current;
    }
}
