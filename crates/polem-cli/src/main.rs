//! Polem CLI - Command-line interface
//!
//! Usage:
//!   polem process <path> [--output <file>] [--indent N]
//!   polem inspect <path>
//!   polem serve [--host <host>] [--port <port>]

use std::fmt::{self, Write as _};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use serde_json::Value;
use tracing::{info, warn};

use polem_api::telemetry::init_tracing;
use polem_core::{keys, AppConfig, Label, PipelineConfig};
use polem_pipeline::{
    align_document, decode_labels, partition_by_service, BatchReport, DictionaryEngine,
    LemmatizationPipeline,
};

#[derive(Parser)]
#[command(name = "polem")]
#[command(about = "Named-entity lemmatization over positional labels")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Append Polem labels to every document of a batch file
    Process {
        /// Path to the input JSON batch
        path: PathBuf,
        /// Write the enriched batch here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// Indentation of the written JSON
        #[arg(long, default_value_t = 4)]
        indent: usize,
        /// TOML dictionary of exact-phrase overrides
        #[arg(short, long)]
        dictionary: Option<PathBuf>,
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Show label counts and aligned tags without normalizing
    Inspect {
        /// Path to the input JSON batch
        path: PathBuf,
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
    /// Run the HTTP server
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(short, long)]
        port: Option<u16>,
        /// TOML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Process {
            path,
            output,
            indent,
            dictionary,
            config,
        } => {
            let mut config = load_config(config.as_deref())?;
            if dictionary.is_some() {
                config.engine.dictionary_path = dictionary;
            }
            init_tracing(&config.logging);

            let report = process(&path, output.as_deref(), indent, &config)?;
            print_failures(&report);
        }
        Commands::Inspect { path, config } => {
            let config = load_config(config.as_deref())?;
            init_tracing(&config.logging);

            let batch = polem_parser::read_json_from_disk(&path)?;
            let mut summary = String::new();
            inspect(&mut summary, &batch, &config.pipeline)?;
            print!("{summary}");
        }
        Commands::Serve { host, port, config } => {
            let mut config = load_config(config.as_deref())?;
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            init_tracing(&config.logging);

            polem_api::serve(config).await?;
        }
    }

    Ok(())
}

/// Configuration file with environment overrides, or the environment alone
fn load_config(path: Option<&Path>) -> anyhow::Result<AppConfig> {
    let config = match path {
        Some(path) => AppConfig::from_file(path)?.with_env_override()?,
        None => AppConfig::from_env()?,
    };
    Ok(config)
}

fn load_engine(config: &AppConfig) -> anyhow::Result<DictionaryEngine> {
    match &config.engine.dictionary_path {
        Some(path) => {
            let engine = DictionaryEngine::from_file(path)
                .with_context(|| format!("loading dictionary {}", path.display()))?;
            info!(entries = engine.len(), "dictionary loaded");
            Ok(engine)
        }
        None => Ok(DictionaryEngine::new()),
    }
}

fn process(
    path: &Path,
    output: Option<&Path>,
    indent: usize,
    config: &AppConfig,
) -> anyhow::Result<BatchReport> {
    let mut batch = polem_parser::read_json_from_disk(path)?;

    let engine = load_engine(config)?;
    let mut pipeline = LemmatizationPipeline::with_config(engine, config.pipeline.clone());
    let report = pipeline
        .process_document_batch(&mut batch)
        .with_context(|| format!("processing {}", path.display()))?;

    match output {
        Some(output) => {
            let file = File::create(output)
                .with_context(|| format!("creating {}", output.display()))?;
            let mut writer = BufWriter::new(file);
            polem_parser::write_json_pretty(&batch, &mut writer, indent)?;
            writeln!(writer)?;
            writer.flush()?;
            info!(path = %output.display(), "output written");
        }
        None => {
            let mut stdout = io::stdout().lock();
            polem_parser::write_json_pretty(&batch, &mut stdout, indent)?;
            writeln!(stdout)?;
        }
    }

    Ok(report)
}

fn print_failures(report: &BatchReport) {
    if report.is_clean() {
        return;
    }

    warn!(failed = report.failures.len(), "some documents were left unchanged");
    eprintln!(
        "{} of {} documents failed:",
        report.failures.len(),
        report.documents_total
    );
    for failure in &report.failures {
        match &failure.document_id {
            Some(id) => eprintln!("  #{} (id {}): {}", failure.index, id, failure.error),
            None => eprintln!("  #{}: {}", failure.index, failure.error),
        }
    }
}

/// Human-readable summary of every document in a batch
fn inspect(out: &mut String, batch: &Value, config: &PipelineConfig) -> fmt::Result {
    let Some(docs) = batch.get(keys::DOCS).and_then(Value::as_array) else {
        return writeln!(out, "no \"{}\" array", keys::DOCS);
    };

    for (index, doc) in docs.iter().enumerate() {
        let labels = doc
            .get(keys::LABELS)
            .and_then(Value::as_array)
            .map(|raw| decode_labels(raw))
            .unwrap_or_default();

        writeln!(out, "document {index}: {} labels", labels.len())?;
        describe_document(out, &labels, config)?;
    }

    Ok(())
}

fn describe_document(
    out: &mut String,
    labels: &[Label],
    config: &PipelineConfig,
) -> fmt::Result {
    for (service, members) in partition_by_service(labels) {
        writeln!(out, "  {service}: {}", members.len())?;
    }

    match align_document(labels, config) {
        Ok(spans) => {
            for span in spans {
                writeln!(
                    out,
                    "  {:?} -> [{}] [{}]",
                    span.label.text().unwrap_or_default(),
                    span.tags.pos_tags,
                    span.tags.lemma_tags
                )?;
            }
            Ok(())
        }
        Err(err) => writeln!(out, "  alignment failed: {err}"),
    }
}
