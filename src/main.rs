mod batch;
mod conf;
mod extract;
mod output;
mod render;

use std::path::PathBuf;
use std::time::Instant;

use anyhow::Context;
use clap::Parser;
use tracing::info;

use render::RtfRenderer;

#[derive(Parser)]
#[command(
    name = "rtf_jobs",
    about = "Turn a folder of RTF job postings into a JSONL dataset"
)]
struct Cli {
    /// Directory holding the .rtf postings [env: RTF_JOBS_SOURCE_DIR, default: temp/SDR]
    #[arg(short, long)]
    source_dir: Option<PathBuf>,
    /// JSONL file to write, overwritten on every run [env: RTF_JOBS_OUTPUT_FILE, default: output.jsonl]
    #[arg(short, long)]
    output: Option<PathBuf>,
    /// Hide the progress bar
    #[arg(short, long)]
    quiet: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let t0 = Instant::now();
    let cli = Cli::parse();

    let settings = conf::Settings::new()
        .context("invalid RTF_JOBS_* configuration")?
        .with_overrides(cli.source_dir, cli.output);
    info!(settings = ?settings, "starting RTF processing");

    batch::check_source(&settings.source_dir)?;
    println!("Starting processing of RTF files in: {}", settings.source_dir.display());
    println!("Output will be written to: {}", settings.output_file.display());

    let summary = batch::run(
        &RtfRenderer,
        &settings.source_dir,
        &settings.output_file,
        !cli.quiet,
    )?;

    println!("\nProcessing complete.");
    println!(
        "Successfully processed and wrote {} files to {}.",
        summary.processed,
        settings.output_file.display()
    );
    println!(
        "Encountered errors or skipped {} of {} files.",
        summary.errors,
        summary.total()
    );

    let elapsed = t0.elapsed();
    if elapsed.as_secs() >= 1 {
        println!("\nDone in {}", format_duration(elapsed));
    }

    Ok(())
}

fn format_duration(d: std::time::Duration) -> String {
    let secs = d.as_secs();
    if secs < 60 {
        format!("{:.1}s", d.as_secs_f64())
    } else if secs < 3600 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}h {}m {}s", secs / 3600, (secs % 3600) / 60, secs % 60)
    }
}
