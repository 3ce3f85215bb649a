//! building-records CLI
//!
//! Converts Building Record XML filings (or ZIP archives of them) to CSV
//! without going through the HTTP server.

use anyhow::Context;
use clap::{Parser, Subcommand};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use building_records::aggregation::{BatchOutcome, DiagnosticKind, SourceDiagnostic};
use building_records::config::AppConfig;
use building_records::{export, Aggregator, RecordTable, SenderFilter, SourceFile};

#[derive(Parser)]
#[command(name = "building-records")]
#[command(author, version, about = "Flatten Building Record XML filings into CSV")]
#[command(
    long_about = "Flatten Building Record XML filings into CSV.

Examples:
  building-records convert filings/*.xml batch.zip
  building-records convert batch.zip -o records.csv --senders CERTAS,HETAS
  building-records summary batch.zip"
)]
struct Cli {
    /// TOML configuration file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Hide the progress bar
    #[arg(short, long, global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert XML files and ZIP archives to a CSV table
    Convert {
        /// XML files or ZIP archives
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Output CSV file (use - for stdout; default: timestamped name)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Only keep these sender codes (comma-separated)
        #[arg(long)]
        senders: Option<String>,
    },

    /// Print record counts and sender codes
    Summary {
        /// XML files or ZIP archives
        #[arg(required = true)]
        inputs: Vec<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "building_records=error".into()),
        )
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load(path)?,
        None => AppConfig::default(),
    };

    match cli.command {
        Commands::Convert {
            inputs,
            output,
            senders,
        } => {
            let outcome = aggregate_paths(&config, &inputs, cli.quiet)?;
            report_diagnostics(&outcome.diagnostics);

            let table = RecordTable::new(outcome.records);
            let filter = senders
                .as_deref()
                .map(SenderFilter::parse)
                .unwrap_or_default();
            let rows = table.filter(&filter);
            let row_count = rows.len();

            let output = output.unwrap_or_else(|| {
                PathBuf::from(export::export_filename(
                    &config.export.filename_prefix,
                    &config.export.timestamp_format,
                    &chrono::Local::now(),
                ))
            });

            if output == Path::new("-") {
                export::write_csv(rows, io::stdout().lock())?;
            } else {
                let file = File::create(&output)
                    .with_context(|| format!("Failed to create {}", output.display()))?;
                export::write_csv(rows, BufWriter::new(file))?;
                eprintln!(
                    "{} {} of {} records written to {}",
                    style("Done:").green().bold(),
                    row_count,
                    table.len(),
                    output.display()
                );
            }
        }
        Commands::Summary { inputs } => {
            let outcome = aggregate_paths(&config, &inputs, cli.quiet)?;
            report_diagnostics(&outcome.diagnostics);

            let table = RecordTable::new(outcome.records);
            let summary = table.summary();
            let stdout = io::stdout();
            let mut out = stdout.lock();

            writeln!(out, "Total records:     {}", summary.total_records)?;
            writeln!(out, "Unique senders:    {}", summary.unique_senders)?;
            writeln!(out, "Unique installers: {}", summary.unique_installers)?;
            match summary.date_range {
                Some(range) => writeln!(out, "Date range:        {} to {}", range.min, range.max)?,
                None => writeln!(out, "Date range:        N/A")?,
            }
            writeln!(out, "Sender codes:      {}", table.sender_codes().join(", "))?;
        }
    }

    Ok(())
}

/// Read every input from disk and aggregate them in order
fn aggregate_paths(config: &AppConfig, inputs: &[PathBuf], quiet: bool) -> anyhow::Result<BatchOutcome> {
    let aggregator = Aggregator::new(config.ingest.clone());
    let mut outcome = BatchOutcome::default();

    let pb = if quiet {
        ProgressBar::hidden()
    } else {
        ProgressBar::new(inputs.len() as u64)
    };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos:>7}/{len:7} {msg}")?
            .progress_chars("##-"),
    );

    for path in inputs {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| path.display().to_string());
        pb.set_message(name.clone());

        match std::fs::read(path) {
            Ok(data) => aggregator.ingest_source(&SourceFile::new(name, data), &mut outcome),
            Err(e) => {
                outcome.sources_processed += 1;
                outcome.diagnostics.push(SourceDiagnostic {
                    source: name,
                    entry: None,
                    kind: DiagnosticKind::SourceRead,
                    message: format!("Failed to read {}: {}", path.display(), e),
                });
            }
        }
        pb.inc(1);
    }

    pb.finish_and_clear();
    Ok(outcome)
}

fn report_diagnostics(diagnostics: &[SourceDiagnostic]) {
    for diagnostic in diagnostics {
        let label = match diagnostic.kind {
            DiagnosticKind::Parse => "parse error",
            DiagnosticKind::Extraction => "extraction error",
            DiagnosticKind::SourceRead => "read error",
        };
        eprintln!(
            "{} {}: {}",
            style(format!("warning ({}):", label)).yellow().bold(),
            diagnostic.document_name(),
            diagnostic.message
        );
    }
}
