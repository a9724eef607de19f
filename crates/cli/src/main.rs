//! crudtable: run CRUD operations against a locally configured table.
//!
//! ```text
//! crudtable --config users.toml --data users.json create alice.json
//! crudtable --config users.toml --data users.json search status=active
//! ```
//!
//! Every subcommand is turned into an invocation payload and handled the same
//! way a remote call would be.

mod local;
mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use crossterm::style::Stylize;
use crudtable_core::{Record, Value};
use crudtable_executor::{Command, Response};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use local::LocalDeployment;

#[derive(Parser, Debug)]
#[command(name = "crudtable", version, about = "CRUD access layer over a key-value table")]
struct Cli {
    /// Configuration file (.toml or .json)
    #[arg(long, value_name = "PATH")]
    config: PathBuf,

    /// JSON snapshot backing the in-memory table
    #[arg(long, value_name = "PATH")]
    data: Option<PathBuf>,

    /// Print the raw request and reply
    #[arg(long)]
    debug: bool,

    #[command(subcommand)]
    command: Cmd,
}

#[derive(Subcommand, Debug)]
enum Cmd {
    /// List every record
    List,
    /// Fetch one record
    Get {
        id: String,
        /// Decrypt encrypted attributes
        #[arg(long)]
        decrypt: bool,
    },
    /// Delete one record
    Delete { id: String },
    /// Find records by field=value
    Search { query: String },
    /// Add to a numeric attribute
    Increment {
        id: String,
        counter_name: String,
        #[arg(long, default_value_t = 1, allow_negative_numbers = true)]
        increment: i64,
    },
    /// Create a record from a JSON file
    Create { file: PathBuf },
    /// Update a record from a JSON file
    Update { file: PathBuf },
    /// Delete every record matching field=value
    BulkDelete { query: String },
    /// Describe the deployment
    Describe,
    /// Check the handler answers
    Ping,
}

impl Cmd {
    fn into_command(self) -> anyhow::Result<Command> {
        Ok(match self {
            Cmd::List => Command::List,
            Cmd::Get { id, decrypt } => Command::Get {
                id: id.into(),
                decrypt,
            },
            Cmd::Delete { id } => Command::Delete { id: id.into() },
            Cmd::Search { query } => Command::Search { query },
            Cmd::Increment {
                id,
                counter_name,
                increment,
            } => Command::IncrementCounter {
                id: id.into(),
                counter_name,
                increment,
            },
            Cmd::Create { file } => Command::Create {
                item: read_record(&file)?,
            },
            Cmd::Update { file } => Command::Update {
                item: read_record(&file)?,
            },
            Cmd::BulkDelete { query } => Command::BulkDelete { query },
            Cmd::Describe => Command::Describe,
            Cmd::Ping => Command::Ping,
        })
    }
}

fn read_record(path: &Path) -> anyhow::Result<Record> {
    let text =
        std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let json: serde_json::Value =
        serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?;
    match Value::from(json) {
        Value::Map(record) => Ok(record),
        _ => anyhow::bail!("{} must contain a JSON object", path.display()),
    }
}

fn run(cli: Cli) -> anyhow::Result<Response> {
    let deployment = LocalDeployment::open(&cli.config, cli.data.clone())?;
    let command = cli.command.into_command()?;
    let is_write = command.operation().is_write();

    let payload = command.to_payload(&deployment.crud.config().id_name);
    if cli.debug {
        eprintln!("request: {}", serde_json::to_string_pretty(&payload)?);
    }
    let reply = deployment.crud.handle_payload(payload);
    if cli.debug {
        eprintln!("reply: {}", serde_json::to_string_pretty(&reply)?);
    }
    let response = Response::from_json(reply).context("decoding reply")?;

    if is_write && response.is_successful() {
        deployment.save()?;
    }
    Ok(response)
}

fn main() -> ExitCode {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crudtable=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    match run(cli) {
        Ok(response) => {
            let mut stdout = std::io::stdout().lock();
            if let Err(e) = render::render(&mut stdout, &response) {
                tracing::error!(target: "crudtable::cli", error = %e, "cannot write output");
            }
            if response.is_successful() {
                ExitCode::SUCCESS
            } else {
                ExitCode::from(1)
            }
        }
        Err(e) => {
            eprintln!("{} {:#}", "error:".red().bold(), e);
            ExitCode::from(2)
        }
    }
}
