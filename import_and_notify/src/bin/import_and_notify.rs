use clap::Parser;
use import_and_notify::config::{self, ConfigError};
use import_and_notify::{CutNotifier, RunError, RunSummary};
use notifications::contracts::send_notification::email::EmailNotifier;
use scheduled_interruptions::pdf_reader::PdfReader;
use scheduled_interruptions::web_page_reader::{PdfCache, WebPageReader};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

#[derive(Parser, Debug)]
#[command(name = "import_and_notify")]
#[command(about = "Checks the upcoming planned electricity cuts and emails the ones in monitored locations")]
struct Args {
    /// Configuration file, defaults to configuration/base.yaml
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(err) = shared_kernel::tracing::config_telemetry("import_and_notify") {
        eprintln!("Error: {err:?}");
        return ExitCode::from(1);
    }

    match start(args).await {
        Ok(summary) => {
            println!("{summary}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            let code = err.exit_code();
            eprintln!("Error: {:?}", anyhow::Error::new(err));
            ExitCode::from(code)
        }
    }
}

async fn start(args: Args) -> Result<RunSummary, RunError> {
    let file = match args.config {
        Some(file) => file,
        None => shared_kernel::configuration::default_configuration_file().map_err(|source| {
            ConfigError::Load {
                path: PathBuf::from("configuration/base.yaml"),
                source,
            }
        })?,
    };
    let settings = config::load(&file)?;
    settings.validate()?;

    let source_url = settings
        .source_url()
        .map_err(|err| ConfigError::Invalid(vec![format!("invalid source_url: {err}")]))?;
    let source = WebPageReader::new(&source_url, PdfCache::new(&settings.pdf_cache_dir))?;
    let notifier = EmailNotifier::new(settings.email_settings()?);

    let cut_notifier = CutNotifier::new(
        Arc::new(source),
        PdfReader::new(),
        Arc::new(notifier),
        settings.monitored_cities.clone(),
        settings.check_days_ahead,
    );
    cut_notifier.run().await
}
