use anyhow::Context;
use clap::Parser;
use location_subscription::contracts::filter_affected_locations::FilterAffectedLocationsInteractor;
use scheduled_interruptions::pdf_reader::PdfReader;
use std::path::PathBuf;

/// Runs extraction against one downloaded document and prints what it
/// finds. Nothing is sent.
#[derive(Parser, Debug)]
#[command(name = "dry_run")]
#[command(about = "Extracts the planned cuts from a local pdf without sending email")]
struct Args {
    /// Path to a downloaded planned cuts pdf
    pdf: PathBuf,

    /// Only print cuts in this location, may be repeated
    #[arg(long = "city")]
    cities: Vec<String>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    shared_kernel::tracing::config_telemetry("dry_run")?;

    let records = PdfReader::new()
        .extract_file(&args.pdf)
        .await
        .with_context(|| format!("Failed to extract cuts from {}", args.pdf.display()))?;

    let records = if args.cities.is_empty() {
        records
    } else {
        FilterAffectedLocationsInteractor::filter_affected_locations(&records, &args.cities)
    };

    for record in records.iter() {
        println!("{record}");
    }
    println!("{} cuts found", records.len());
    Ok(())
}
