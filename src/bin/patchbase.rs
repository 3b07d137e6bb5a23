//! patchbase - manifest deduplication CLI.
//!
//! Reads rendered resource manifests, extracts one shared base per resource
//! type plus a strategic patch per instance, and writes the result tree.

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Args, Parser, Subcommand};

use patchbase::extract::{parse_documents, read_suffixed_files, PatchGenerator};
use patchbase::value::Map;

#[derive(Debug, Parser)]
#[command(
    name = "patchbase",
    version,
    about = "Deduplicate rendered resource manifests into a shared base plus per-instance patches"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Extract a base document and per-instance patches from manifests
    Extract(ExtractArgs),
}

#[derive(Debug, Args)]
struct ExtractArgs {
    /// Directory containing *_openapi.json schema documents
    #[arg(long, value_name = "DIR")]
    schema_dir: PathBuf,

    /// Directory the per-type output folders are written into
    #[arg(long, value_name = "DIR")]
    out: PathBuf,

    /// File name suffix selecting manifests inside input directories
    #[arg(long, default_value = ".yaml")]
    suffix: String,

    /// Manifest files or directories to read
    #[arg(value_name = "INPUT", required = true)]
    inputs: Vec<PathBuf>,
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();
    let outcome = match cli.command {
        Command::Extract(args) => run_extract(&args),
    };
    match outcome {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(error) => {
            eprintln!("{}", error);
            ExitCode::FAILURE
        }
    }
}

/// Runs the extraction pipeline. Returns `Ok(false)` when one or more
/// partitions failed but the run itself completed.
fn run_extract(args: &ExtractArgs) -> patchbase::Result<bool> {
    let mut resources: Vec<Map> = Vec::new();
    for input in &args.inputs {
        let contents = if input.is_dir() {
            read_suffixed_files(input, &args.suffix)?
        } else {
            vec![fs::read_to_string(input)?]
        };
        for content in &contents {
            resources.extend(parse_documents(content)?);
        }
    }

    let generator = PatchGenerator::from_schema_dir(&args.schema_dir)?;
    let mut all_converted = true;
    for outcome in generator.execute(resources)? {
        match outcome.result {
            Ok(partition) => {
                partition.dump_to_folder(&args.out)?;
                log::info!(
                    "wrote {} ({} instances)",
                    outcome.identity.folder_name(),
                    partition.sources().len()
                );
            }
            // Already reported by the generator; keep going.
            Err(_) => all_converted = false,
        }
    }
    Ok(all_converted)
}
