use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::fs;
use std::io::{self, BufRead, BufReader, Read, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

use email_triage::triage::{
    process_batch, EmailRequest, EmailTriage, ErrorResponse, MaskResponse, TriageConfig,
};
use email_triage::utils::logger::init_logger;

#[derive(Debug, Parser)]
#[command(name = "email-triage", version, about = "Mask PII in email bodies and classify them")]
struct Cli {
    /// Configuration file (toml, json or yaml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Write logs to a timestamped file in this directory
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Mask PII in an email body and print the masked body with its entity records
    Mask {
        /// Read the body from this file instead of stdin
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Restore a masked body from the JSON written by `mask`
    Demask {
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Fail if any recorded entity cannot be put back
        #[arg(long)]
        strict: bool,
    },
    /// Mask an email body and classify the masked text
    Classify {
        #[arg(short, long)]
        input: Option<PathBuf>,
    },
    /// Triage JSON lines of {"email_body": ...}, writing one result per line
    Batch {
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Override the configured worker count
        #[arg(short, long)]
        workers: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let mut config = TriageConfig::load(cli.config.as_deref())?;
    if let Some(log_dir) = cli.log_dir {
        config.log_dir = Some(log_dir);
    }
    init_logger(config.log_dir.as_deref())?;
    debug!("Loaded configuration: {:?}", config);

    match cli.command {
        Command::Mask { input } => {
            let body = read_input(input.as_deref())?;
            let triage = EmailTriage::from_config(&config);
            print_json(&triage.mask(&body))?;
        }
        Command::Demask { input, strict } => {
            let raw = read_input(input.as_deref())?;
            let masked: MaskResponse =
                serde_json::from_str(&raw).context("Input is not a mask result")?;
            let triage = EmailTriage::from_config(&config)
                .with_strict_demask(strict || config.strict_demask);
            let text = triage.demask(&masked)?;
            let mut stdout = io::stdout().lock();
            stdout.write_all(text.as_bytes())?;
            stdout.flush()?;
        }
        Command::Classify { input } => {
            let body = read_input(input.as_deref())?;
            let triage = EmailTriage::from_config(&config);
            let response = triage.process(&EmailRequest { email_body: body })?;
            print_json(&response)?;
        }
        Command::Batch { input, workers } => {
            if let Some(workers) = workers {
                config.workers = workers;
            }
            config.validate()?;
            run_batch(input.as_deref(), &config).await?;
        }
    }

    Ok(())
}

async fn run_batch(input: Option<&Path>, config: &TriageConfig) -> Result<()> {
    let reader: Box<dyn BufRead> = match input {
        Some(path) => Box::new(BufReader::new(
            fs::File::open(path).with_context(|| format!("Failed to open {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut requests = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let request: EmailRequest = serde_json::from_str(&line)
            .with_context(|| format!("Invalid request on line {}", line_no + 1))?;
        requests.push(request);
    }

    let triage = Arc::new(EmailTriage::from_config(config));
    if !triage.is_ready() {
        bail!("Classifier not loaded; set model_path in the configuration");
    }

    let results = process_batch(triage, requests, config).await?;
    let mut stdout = io::stdout().lock();
    let mut failures = 0;
    for result in results {
        let line = match result {
            Ok(response) => serde_json::to_string(&response)?,
            Err(e) => {
                failures += 1;
                serde_json::to_string(&ErrorResponse::new(e.to_string()))?
            }
        };
        writeln!(stdout, "{}", line)?;
    }
    stdout.flush()?;

    info!("Batch finished with {} failures", failures);
    Ok(())
}

fn read_input(path: Option<&Path>) -> Result<String> {
    match path {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display())),
        None => {
            let mut buffer = String::new();
            io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            Ok(buffer)
        }
    }
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer_pretty(&mut stdout, value)?;
    writeln!(stdout)?;
    Ok(())
}
