mod archive;
mod cli;
mod config_loader;
mod error;
mod filter;
mod logging;
mod report;

use std::path::{Path, PathBuf};

use clap::Parser;
use tracing::{error, info, info_span, Instrument};
use uuid::Uuid;

use archive::Archive;
use cli::Args;
use error::CliError;
use filter::RequestFilter;
use reqmin_core::Orchestrator;

#[tokio::main]
async fn main() {
    let args = Args::parse();
    let run_id = Uuid::new_v4();
    let span = info_span!("minimization_run", run_id = %run_id);
    if let Err(err) = run(args).instrument(span).await {
        error!(run_id = %run_id, error = %err, "minimization run failed");
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}

async fn run(args: Args) -> Result<(), CliError> {
    let started_at = chrono::Utc::now();
    let config_path = PathBuf::from(&args.config);
    let run_config = config_loader::load_config(&config_path)?;
    let run_config = config_loader::apply_overrides(
        run_config,
        args.input,
        args.report,
        args.output_har,
        args.max_concurrent,
        args.requests_per_second,
        args.log_level,
        args.log_json,
    );
    config_loader::validate(&run_config)?;

    logging::init_logging(&run_config.logging)?;
    info!(config = %args.config, started_at = %started_at.to_rfc3339(), "loaded configuration");

    let input_path = Path::new(&run_config.engine.input_har);
    let source_archive = Archive::load(input_path)?;
    let requests = source_archive.requests();
    let total_read = requests.len();
    info!(count = total_read, "loaded requests from archive");

    let request_filter = RequestFilter::new(run_config.engine.filters.clone(), run_config.engine.scope.clone());
    let selected = request_filter.apply(requests);
    info!(selected = selected.len(), "requests passed filter and scope gates");

    let orchestrator = Orchestrator::new(&run_config.engine)?;
    let processed = orchestrator.run(selected).await;

    let entries: Vec<_> = processed
        .iter()
        .map(|p| reqmin_core::to_report_entry(p, &run_config.engine.minimization.body))
        .collect();
    let report_path = Path::new(&run_config.engine.report_path);
    report::write_report(report_path, &entries)?;
    info!(report = %run_config.engine.report_path, "wrote report");

    if let Some(output_har) = &run_config.engine.output_har {
        source_archive.export(Path::new(output_har), &processed, run_config.engine.update_har_metadata)?;
        info!(output = %output_har, "wrote minimized archive");
    }

    let matched = entries.iter().filter(|e| e.matched).count();
    let finished_at = chrono::Utc::now();
    info!(
        finished_at = %finished_at.to_rfc3339(),
        duration_ms = (finished_at - started_at).num_milliseconds(),
        "minimization run finished"
    );
    println!(
        "processed {}/{} requests ({} matched baseline)",
        entries.len(),
        total_read,
        matched
    );

    Ok(())
}
