//! src/main.rs
use anyhow::Context;
use clap::{CommandFactory, Parser};
use docno_count::configuration::get_configuration;
use docno_count::count_docs::{CountDocuments, CountDocumentsArgs, CountDocumentsError};
use docno_count::telemetry::init_tracing;
use std::path::PathBuf;
use std::process::ExitCode;

const USAGE_EXIT_CODE: u8 = 255;

/// Counts the documents of a collection and writes the docno of each one.
#[derive(Parser, Debug)]
#[command(name = "docno-count", version, about)]
struct Cli {
    /// Input collection (a shard file or a directory of shards)
    #[arg(long, value_name = "PATH")]
    collection: Option<PathBuf>,

    /// Output directory for the docid/docno pairs; replaced if it exists
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Docno mapping artifact shipped to every worker
    #[arg(long, value_name = "PATH")]
    docno_mapping: Option<PathBuf>,

    /// File that receives the final document count
    #[arg(long, value_name = "PATH")]
    count_output: Option<PathBuf>,

    /// Registered docno mapping scheme (defaults to `job.docno_mapping`)
    #[arg(long, value_name = "NAME")]
    docno_mapping_scheme: Option<String>,
}

impl From<Cli> for CountDocumentsArgs {
    fn from(cli: Cli) -> Self {
        CountDocumentsArgs {
            collection: cli.collection,
            output: cli.output,
            docno_mapping: cli.docno_mapping,
            count_output: cli.count_output,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    let mut cli = Cli::parse();
    let configuration = get_configuration().context("Failed to read configuration.")?;
    let tracer_provider = init_tracing("docno-count", &configuration.telemetry)?;

    let mut job = CountDocuments::trec(&configuration);
    if let Some(scheme) = cli.docno_mapping_scheme.take() {
        job = job.with_scheme(&scheme);
    }

    let code = match job.run(&cli.into()).await {
        Ok(count) => {
            println!("{count}");
            ExitCode::SUCCESS
        }
        Err(CountDocumentsError::Usage(message)) => {
            eprintln!("error: {message}\n");
            Cli::command().print_help()?;
            ExitCode::from(USAGE_EXIT_CODE)
        }
        Err(e) => {
            tracing::error!(error = ?e, "Document count failed");
            ExitCode::FAILURE
        }
    };

    if let Some(provider) = tracer_provider {
        if let Err(e) = provider.shutdown() {
            eprintln!("Failed to shut down tracer provider: {e}");
        }
    }
    Ok(code)
}
