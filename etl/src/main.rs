use anyhow::Context;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::path::PathBuf;
use std::process;

use etl::RunOptions;

#[tokio::main]
async fn main() {
    let matches = Command::new("ETL Pipeline Manager")
        .version("1.0")
        .about("Runs metadata-driven table mappings through extract, transform and load")
        .subcommand(
            Command::new("etl")
                .about("Run the ETL pipeline")
                .arg(
                    Arg::new("config")
                        .short('c')
                        .long("config")
                        .value_name("FILE")
                        .help("Sets a custom config file"),
                )
                .arg(
                    Arg::new("metadata")
                        .short('m')
                        .long("metadata")
                        .value_name("CSV")
                        .help("Overrides the metadata file from the config"),
                )
                .arg(
                    Arg::new("dry-run")
                        .long("dry-run")
                        .action(ArgAction::SetTrue)
                        .help("Print the table mappings without extracting or loading"),
                )
                .arg(
                    Arg::new("report-json")
                        .long("report-json")
                        .action(ArgAction::SetTrue)
                        .help("Print the run report as JSON"),
                ),
        )
        .get_matches();

    match matches.subcommand() {
        Some(("etl", etl_matches)) => {
            if let Err(e) = run(etl_matches).await {
                eprintln!("ETL pipeline error: {:#}", e);
                process::exit(1);
            }
        }

        _ => {
            eprintln!("Please specify a valid subcommand");
            process::exit(1);
        }
    }
}

async fn run(matches: &ArgMatches) -> anyhow::Result<()> {
    let config_path = matches
        .get_one::<String>("config")
        .map(|s| s.as_str())
        .unwrap_or("config/etl.toml");
    let options = RunOptions {
        metadata_path: matches.get_one::<String>("metadata").map(PathBuf::from),
        dry_run: matches.get_flag("dry-run"),
    };

    println!("Starting ETL pipeline with config: {}", config_path);

    let settings = etl::load_settings(config_path, &options)
        .with_context(|| format!("failed to load config {}", config_path))?;
    if let Err(e) = etl::logging::init_tracing(&settings.logging) {
        eprintln!("{}", e);
    }

    let report = etl::run_with_settings(&settings, options.dry_run)
        .await
        .with_context(|| format!("run with config {} did not complete", config_path))?;

    if matches.get_flag("report-json") {
        println!("{}", report.to_json()?);
    }

    for failed in report.failures() {
        eprintln!(
            "Table {} failed: {}",
            failed.key,
            failed.error.as_deref().unwrap_or("unknown error")
        );
    }
    if !report.is_success() {
        return Err(common::Error::PipelineFailed {
            failed: report.tables_failed(),
            total: report.tables.len(),
        }
        .into());
    }

    println!(
        "ETL pipeline finished: {} tables, {} rows loaded",
        report.tables_succeeded(),
        report.rows_loaded()
    );
    Ok(())
}
