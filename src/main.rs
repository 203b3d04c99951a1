//! Binary entrypoint for the Mudcore CLI.
//!
//! Commands:
//! - `start [--bind <addr>] [--duplicates <policy>]` - run the game server
//! - `init` - write a starter `config.toml`
//! - `commands [--json]` - print the resolved command table
//!
//! See the library crate docs for module-level details: `mudcore::`.
use anyhow::{anyhow, Result};
use clap::{Parser, Subcommand};
use log::info;

use mudcore::config::Config;
use mudcore::engine::namespace::DuplicatePolicy;
use mudcore::server::GameServer;
use mudcore::world::World;

#[derive(Parser)]
#[command(name = "mudcore")]
#[command(about = "A text-based multiplayer world server")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path (can be used before or after subcommand)
    #[arg(short, long, default_value = "config.toml", global = true)]
    config: String,

    /// Verbose logging (-v, -vv for more; may appear before or after subcommand)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the game server
    Start {
        /// Listen address, overriding `server.bind`
        #[arg(short, long)]
        bind: Option<String>,
        /// Duplicate registration policy (reject, warn, shadow), overriding
        /// `commands.duplicate_policy`
        #[arg(long)]
        duplicates: Option<DuplicatePolicy>,
    },
    /// Write a default configuration file
    Init,
    /// List every registered command in dispatch order
    Commands {
        /// Print JSON instead of a table
        #[arg(long)]
        json: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Start { bind, duplicates } => {
            let mut config = Config::load(&cli.config).await?;
            init_logging(&Some(config.clone()), cli.verbose);
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(policy) = duplicates {
                config.commands.duplicate_policy = policy;
            }
            info!("Starting Mudcore v{}", env!("CARGO_PKG_VERSION"));
            GameServer::new(config)?.run().await?;
            info!("Server stopped");
        }
        Commands::Init => {
            init_logging(&None, cli.verbose);
            if tokio::fs::try_exists(&cli.config).await.unwrap_or(false) {
                return Err(anyhow!("{} already exists, refusing to overwrite", cli.config));
            }
            Config::create_default(&cli.config).await?;
            info!("Configuration file created at {}", cli.config);
        }
        Commands::Commands { json } => {
            let config = Config::load(&cli.config).await.unwrap_or_default();
            init_logging(&None, cli.verbose);
            let world = World::new(&config).map_err(|e| anyhow!("Failed to load command table: {}", e))?;
            let catalog = world.catalog();
            if json {
                println!("{}", serde_json::to_string_pretty(&catalog)?);
            } else {
                for entry in &catalog {
                    println!(
                        "{:<8} {:<10} {:>4}  {}",
                        entry.namespace, entry.name, entry.priority, entry.description
                    );
                }
                let stats = world.registry().stats();
                println!("{} commands, {} songs, {} spells", catalog.len(), stats.songs, stats.spells);
            }
        }
    }

    Ok(())
}

fn init_logging(config: &Option<Config>, verbosity: u8) {
    use std::io::Write;
    let mut builder = env_logger::Builder::new();
    // CLI verbosity overrides the configured level
    let configured = config
        .as_ref()
        .and_then(|c| c.logging.level.parse::<log::LevelFilter>().ok())
        .unwrap_or(log::LevelFilter::Info);
    let base_level = match verbosity {
        0 => configured,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    builder.filter_level(base_level);

    let file = config
        .as_ref()
        .and_then(|c| c.logging.file.as_ref())
        .and_then(|path| std::fs::OpenOptions::new().create(true).append(true).open(path).ok());
    let security_path = config.as_ref().and_then(|c| c.logging.security_file.clone());

    match file {
        Some(f) => {
            let write_mutex = std::sync::Arc::new(std::sync::Mutex::new(f));
            // with a terminal attached, echo to the console as well as the file
            let is_tty = atty::is(atty::Stream::Stdout);

            builder.format(move |fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                let line = format!("{} [{}] {}", ts, record.level(), record.args());

                if let Ok(mut guard) = write_mutex.lock() {
                    let _ = writeln!(guard, "{}", line);
                }

                if record.target() == "security" {
                    if let Some(ref sec_path) = security_path {
                        if let Ok(mut sf) = std::fs::OpenOptions::new()
                            .create(true)
                            .append(true)
                            .open(sec_path)
                        {
                            let _ = writeln!(sf, "{}", line);
                        }
                    }
                }

                if is_tty {
                    writeln!(fmt, "{}", line)
                } else {
                    Ok(())
                }
            });
        }
        None => {
            builder.format(|fmt, record| {
                let ts = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
                writeln!(fmt, "{} [{}] {}", ts, record.level(), record.args())
            });
        }
    }
    let _ = builder.try_init();
}
