use std::process;
use etl::{load_settings, logging, run_with_settings, RunOptions};

#[tokio::main]
async fn main() {
    // Get config path from command line args or use default
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config/etl.toml".to_string());

    println!("Starting ETL pipeline with config: {}", config_path);

    let settings = match load_settings(&config_path, &RunOptions::default()) {
        Ok(settings) => settings,
        Err(e) => {
            eprintln!("ETL pipeline error: {}", e);
            process::exit(1);
        }
    };
    if let Err(e) = logging::init_tracing(&settings.logging) {
        eprintln!("{}", e);
    }

    match run_with_settings(&settings, false).await {
        Ok(report) if report.is_success() => {}
        Ok(report) => {
            eprintln!(
                "ETL pipeline error: {}",
                common::Error::PipelineFailed {
                    failed: report.tables_failed(),
                    total: report.tables.len(),
                }
            );
            process::exit(1);
        }
        Err(e) => {
            eprintln!("ETL pipeline error: {}", e);
            process::exit(1);
        }
    }
}
