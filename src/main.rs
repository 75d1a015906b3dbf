//! lumen CLI entry point.

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

use lumen::config::{self, FileConfig};
use lumen::console::ConsoleInput;
use lumen::counter::CounterStore;
use lumen::dictionary::Dictionary;
use lumen::link::{self, Endpoint};
use lumen::matcher::TfIdfMatcher;
use lumen::{rx, tx};

#[derive(Parser)]
#[command(name = "lumen", version, about = "Short messages over a noisy one-byte link")]
struct Cli {
    /// Optional TOML config file; CLI flags override it
    #[arg(long, global = true, value_name = "FILE", env = "LUMEN_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Transmit: prompt for messages and send encrypted codewords
    Tx(TxArgs),
    /// Receive: monitor the link and decode incoming codewords
    Rx(RxArgs),
}

#[derive(Args)]
struct TxArgs {
    /// Dictionary CSV (codeword,sentence with a header row)
    #[arg(long, value_name = "FILE", env = "LUMEN_DICTIONARY")]
    dictionary: Option<PathBuf>,

    /// Minimum similarity accepted by the matcher
    #[arg(long)]
    threshold: Option<f64>,

    /// Counter file (default: <data dir>/lumen/tx_counter)
    #[arg(long, value_name = "FILE")]
    counter_file: Option<PathBuf>,

    #[command(flatten)]
    endpoint: EndpointArgs,
}

#[derive(Args)]
struct RxArgs {
    /// Dictionary CSV (codeword,sentence with a header row)
    #[arg(long, value_name = "FILE", env = "LUMEN_DICTIONARY")]
    dictionary: Option<PathBuf>,

    /// Resynchronization window: candidate counters tried per frame
    #[arg(long)]
    window: Option<u64>,

    /// Counter file (default: <data dir>/lumen/rx_counter)
    #[arg(long, value_name = "FILE")]
    counter_file: Option<PathBuf>,

    #[command(flatten)]
    endpoint: EndpointArgs,
}

#[derive(Args)]
struct EndpointArgs {
    /// Connect to a TCP link bridge
    #[arg(long, value_name = "ADDR")]
    connect: Option<String>,

    /// Accept one TCP link bridge connection
    #[arg(long, value_name = "ADDR")]
    listen: Option<String>,

    /// Serial device node (e.g. /dev/ttyUSB0)
    #[arg(long, value_name = "PATH")]
    device: Option<PathBuf>,
}

impl EndpointArgs {
    fn resolve(self, file: &FileConfig) -> Result<Endpoint> {
        // CLI endpoint flags replace the file's as a group, so a flag
        // can't be silently combined with a leftover file entry.
        let endpoint = if self.connect.is_some() || self.listen.is_some() || self.device.is_some()
        {
            Endpoint::resolve(self.connect, self.listen, self.device)
        } else {
            Endpoint::resolve(
                file.connect.clone(),
                file.listen.clone(),
                file.device.clone(),
            )
        };
        Ok(endpoint?)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let file = match &cli.config {
        Some(path) => FileConfig::load(path)?,
        None => FileConfig::default(),
    };

    match cli.cmd {
        Cmd::Tx(args) => run_tx(args, file).await,
        Cmd::Rx(args) => run_rx(args, file).await,
    }
}

fn open_store(path: PathBuf) -> Result<CounterStore> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create state dir {}", parent.display()))?;
    }
    Ok(CounterStore::open(path))
}

fn dictionary_path(cli: Option<PathBuf>, file: &FileConfig) -> Result<PathBuf> {
    cli.or_else(|| file.dictionary.clone())
        .context("no dictionary: pass --dictionary or set it in the config file")
}

async fn run_tx(args: TxArgs, file: FileConfig) -> Result<()> {
    let dict_path = dictionary_path(args.dictionary, &file)?;
    let dictionary = Dictionary::load(&dict_path)?;
    tracing::info!(sentences = dictionary.len(), path = %dict_path.display(), "dictionary loaded");

    let threshold = args
        .threshold
        .or(file.threshold)
        .unwrap_or(config::DEFAULT_THRESHOLD);
    let matcher = TfIdfMatcher::new(&dictionary, threshold);

    let store = open_store(
        args.counter_file
            .or_else(|| file.tx_counter_file.clone())
            .unwrap_or_else(|| config::default_counter_file("tx")),
    )?;
    tracing::info!(counter = store.current(), path = %store.path().display(), "counter loaded");

    let endpoint = args.endpoint.resolve(&file)?;
    let link = link::open_writer(&endpoint).await?;

    tx::run(
        tx::Transmitter::new(matcher, store),
        tokio::io::stdin(),
        link,
    )
    .await
}

async fn run_rx(args: RxArgs, file: FileConfig) -> Result<()> {
    let dict_path = dictionary_path(args.dictionary, &file)?;
    let dictionary = Dictionary::load(&dict_path)?;
    tracing::info!(sentences = dictionary.len(), path = %dict_path.display(), "dictionary loaded");

    let window = args.window.or(file.window).unwrap_or(config::DEFAULT_WINDOW);
    if window == 0 {
        anyhow::bail!("window must be at least 1");
    }

    let store = open_store(
        args.counter_file
            .or_else(|| file.rx_counter_file.clone())
            .unwrap_or_else(|| config::default_counter_file("rx")),
    )?;
    tracing::info!(counter = store.current(), path = %store.path().display(), "counter loaded");

    let endpoint = args.endpoint.resolve(&file)?;
    let link = link::open_reader(&endpoint).await?;

    let receiver = rx::Receiver::new(&dictionary, window, store);
    let shutdown = async {
        let _ = tokio::signal::ctrl_c().await;
    };
    // Console bytes come via a detached thread, not the blocking pool:
    // an in-flight stdin read must not hold up runtime shutdown after
    // ctrl-c.
    rx::run(receiver, link, ConsoleInput::stdin(), shutdown).await?;
    Ok(())
}
