//! cidstore CLI - CRUD-shaped query commands over content-addressed storage

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use cidstore::command::{self, Command};
use cidstore::config::{self, BackendKind, CidstoreConfig, TOKEN_ENV};
use cidstore::ui;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[derive(Parser)]
#[command(name = "cidstore")]
#[command(version)]
#[command(about = "CRUD-shaped query commands over content-addressed storage")]
#[command(long_about = r#"
cidstore serves exist, select-row, select-all, insert, delete and update
commands over a content-addressed backend (web3.storage by default).
Rows are addressed by a file name plus the CID of the object holding it.

The web3 backend reads its credential from W3_STORAGE_API_TOKEN.

Example usage:
  cidstore init
  cidstore serve --port 8080
  cidstore exec insert --request '{"fields":["a.txt"],"arguments":["hello"]}'
  cidstore exec select-row --request '{"fields":["a.txt"],"tables":["bafk..."]}'
"#)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to the config file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Use the in-memory backend regardless of the config file
    #[arg(long, global = true)]
    memory: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Serve commands over HTTP
    Serve {
        /// Address to bind (overrides the config file)
        #[arg(long)]
        host: Option<String>,

        /// Port to listen on (overrides the config file)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Run a single command in-process and print the reply
    Exec {
        /// Command name: exist, select-row, select-all, insert, delete, update
        command: String,

        /// Query request as JSON
        #[arg(short, long, default_value = "{}")]
        request: String,

        /// Print the raw reply envelope as JSON
        #[arg(long)]
        json: bool,
    },

    /// Write a default config file
    Init {
        /// Overwrite an existing config
        #[arg(short, long)]
        force: bool,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(config::default_config_path);
    let mut cfg = config::load_config(Some(&config_path))?.unwrap_or_default();
    if cli.memory {
        cfg.backend.kind = BackendKind::Memory;
    }

    match cli.command {
        Commands::Init { force } => {
            config::write_config(&config_path, &CidstoreConfig::default(), force)?;
            ui::success(&format!("Wrote {}", config_path.display()));
        }

        Commands::Serve { host, port } => {
            let service = config::build_service(&cfg.backend, std::env::var(TOKEN_ENV).ok())?;
            let host = host.unwrap_or(cfg.server.host);
            let port = port.unwrap_or(cfg.server.port);
            let addr: SocketAddr = format!("{}:{}", host, port).parse()?;

            ui::header(&format!("cidstore listening on http://{}", addr));
            ui::info("Backend", &format!("{:?}", cfg.backend.kind));
            cidstore::server::start_server(addr, service).await?;
        }

        Commands::Exec { command: name, request, json } => {
            let command: Command = name.parse()?;
            let parameters: serde_json::Value = serde_json::from_str(&request)?;
            let service = config::build_service(&cfg.backend, std::env::var(TOKEN_ENV).ok())?;

            let envelope = command::dispatch(&service, command, parameters).await;
            if json {
                println!("{}", serde_json::to_string_pretty(&envelope)?);
            } else {
                ui::envelope(command.as_str(), &envelope)?;
            }

            if !envelope.is_ok() {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
