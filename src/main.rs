use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use talent_ai::config::AppConfig;
use talent_ai::error::AppError;
use talent_ai::infra::{AirtableRepository, GeminiClient};
use talent_ai::telemetry;
use talent_ai::workflows::applicants::{
    ApplicantId, ApplicantPipeline, PipelineConfig, SnapshotSync,
};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "Applicant Pipeline",
    about = "Sync applicant records with their canonical JSON profile, shortlist candidates, and enrich profiles with LLM reviews",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run one processing pass over applicants needing work (default command)
    Run(RunArgs),
    /// Rebuild an applicant's child records from their stored profile JSON
    Decompress {
        /// External applicant identifier
        applicant_id: String,
    },
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    /// Override the pacing delay between applicants, in milliseconds
    #[arg(long)]
    pacing_ms: Option<u64>,
}

fn main() -> Result<(), AppError> {
    let cli = Cli::parse();
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;

    match cli.command.unwrap_or(Command::Run(RunArgs::default())) {
        Command::Run(args) => run_batch(&config, args),
        Command::Decompress { applicant_id } => decompress(&config, applicant_id),
    }
}

fn run_batch(config: &AppConfig, args: RunArgs) -> Result<(), AppError> {
    let repository = Arc::new(AirtableRepository::new(&config.store));
    let llm = Arc::new(GeminiClient::new(&config.llm));
    let pacing = args
        .pacing_ms
        .map(Duration::from_millis)
        .unwrap_or(config.pipeline.pacing);

    let pipeline = ApplicantPipeline::new(
        repository,
        llm,
        PipelineConfig {
            pacing,
            ..PipelineConfig::default()
        },
    );

    info!("starting applicant processing run");
    let report = pipeline.process_pending()?;
    info!(
        selected = report.selected,
        processed = report.processed,
        failed = report.failed,
        "run finished"
    );
    Ok(())
}

fn decompress(config: &AppConfig, applicant_id: String) -> Result<(), AppError> {
    let repository = Arc::new(AirtableRepository::new(&config.store));
    let sync = SnapshotSync::new(repository);
    let applicant_id = ApplicantId(applicant_id);

    info!(applicant = %applicant_id, "starting decompression");
    sync.restore(&applicant_id)?;
    info!(applicant = %applicant_id, "decompression complete");
    Ok(())
}
