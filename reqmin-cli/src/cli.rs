use clap::Parser;

/// Replays recorded HTTP requests and greedily strips headers and body
/// fields that don't change the response.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Path to the run configuration (YAML or JSON).
    #[arg(long)]
    pub config: String,

    /// Overrides `input_har` from the config file.
    #[arg(long)]
    pub input: Option<String>,

    /// Overrides `report_path` from the config file.
    #[arg(long)]
    pub report: Option<String>,

    /// Overrides `output_har` from the config file.
    #[arg(long)]
    pub output_har: Option<String>,

    /// Overrides the worker-pool size.
    #[arg(long)]
    pub max_concurrent: Option<usize>,

    /// Overrides the outbound request rate, in requests/second.
    #[arg(long)]
    pub requests_per_second: Option<f64>,

    /// Overrides the base log level (trace, debug, info, warn, error).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emits newline-delimited JSON logs instead of the human-readable format.
    #[arg(long)]
    pub log_json: bool,
}
