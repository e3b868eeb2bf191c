use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::AtomicBool;

use agenda_scrape::config::ScrapeConfig;
use agenda_scrape::scraping::Termination;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config_path = std::env::args_os().nth(1).map(PathBuf::from);
    let config = match ScrapeConfig::load(config_path.as_deref()) {
        Ok(config) => config,
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "unable to load configuration");
            return ExitCode::FAILURE;
        }
    };

    let cancel = AtomicBool::new(false);
    match agenda_scrape::run(&config, &cancel) {
        Ok(summary) => match summary.termination {
            Termination::Aborted(err) => {
                tracing::error!(error = %err, "harvest aborted");
                ExitCode::FAILURE
            }
            _ => ExitCode::SUCCESS,
        },
        Err(err) => {
            tracing::error!(error = %format!("{err:#}"), "harvest failed");
            ExitCode::FAILURE
        }
    }
}
