use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use callcheck::{
    format_transcript, load_transcript, read_transcript_stdin, render_summary, LoadedTranscript,
    run_pipeline, PipelineConfig,
};

#[derive(Parser)]
#[command(name = "callcheck")]
#[command(author, version, about = "Call transcript analysis and payment validation", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a transcript and validate any payment credentials in it
    Run {
        /// Input transcript (JSON array of {role, utterance}, or plain text); "-" reads stdin
        #[arg(short, long)]
        input: PathBuf,

        /// Transcript ID sent to the validation API (defaults to the file stem)
        #[arg(long)]
        transcript_id: Option<String>,

        /// Output file for the full report (JSON)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Skip the call analysis task
        #[arg(long)]
        skip_analysis: bool,

        /// Skip the payment validation task
        #[arg(long)]
        skip_validation: bool,

        /// Verbose output
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print the transcript as the model sees it
    Format {
        /// Input transcript; "-" reads stdin
        #[arg(short, long)]
        input: PathBuf,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            input,
            transcript_id,
            output,
            skip_analysis,
            skip_validation,
            verbose,
        } => {
            setup_logging(verbose);
            run_transcript(
                input,
                transcript_id,
                output,
                skip_analysis,
                skip_validation,
            )
            .await
        }
        Commands::Format { input } => {
            let transcript = read_input(&input)?;
            println!("{}", format_transcript(&transcript.content));
            Ok(())
        }
    }
}

fn setup_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

fn read_input(input: &Path) -> Result<LoadedTranscript> {
    if input.as_os_str() == "-" {
        read_transcript_stdin()
    } else {
        load_transcript(input)
    }
}

async fn run_transcript(
    input: PathBuf,
    transcript_id: Option<String>,
    output: Option<PathBuf>,
    skip_analysis: bool,
    skip_validation: bool,
) -> Result<()> {
    info!("Loading transcript from {:?}", input);
    let transcript = read_input(&input).context("Failed to load input transcript")?;
    let transcript_id = transcript_id.unwrap_or(transcript.transcript_id);

    let mut config = PipelineConfig::from_env()?;
    config.run_analysis = !skip_analysis;
    config.run_validation = !skip_validation;
    let report = run_pipeline(config, &transcript.content, &transcript_id).await?;

    if let Some(path) = output {
        report.write_json(&path)?;
        info!("Report written to {:?}", path);
    }

    print!("{}", render_summary(&report));
    Ok(())
}
