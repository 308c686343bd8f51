use std::path::PathBuf;
use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use chainguard::api;
use chainguard::config::Config;
use chainguard::ingest::fetcher::Fetcher;
use chainguard::ingest::types::InputPayload;
use chainguard::pipeline::RiskAnalyzer;
use chainguard::report::batch;

const USAGE: &str = "Usage:
  chainguard <input.json>                       Analyze a transaction payload file
  chainguard fetch <address> [chain]            Fetch recent transactions and analyze them
  chainguard batch <report.csv> <input.json>... Analyze many payloads into a CSV report
  chainguard serve                              Run the HTTP API";

#[tokio::main]
async fn main() -> eyre::Result<()> {
    color_eyre::install()?;

    // Logs go to stderr so stdout stays machine-readable (set RUST_LOG=debug for rule detail)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        return Err(eyre::eyre!("Missing arguments\n\n{}", USAGE));
    };

    let config_path = Config::resolve_path();
    let config = Config::load_or_default(&config_path)?;
    let analyzer = Arc::new(RiskAnalyzer::new(&config));

    match command.as_str() {
        "fetch" => {
            let address = args
                .get(1)
                .ok_or_else(|| eyre::eyre!("Missing address\n\n{}", USAGE))?;
            let chain = args.get(2).map(String::as_str).unwrap_or("polygon");
            let fetcher = Fetcher::new(config.fetcher.clone())?;
            let payload = fetcher.fetch_transactions(address, chain).await?;
            print_report(&analyzer, &payload)?;
        }
        "batch" => {
            let output = args
                .get(1)
                .ok_or_else(|| eyre::eyre!("Missing report path\n\n{}", USAGE))?;
            let inputs: Vec<PathBuf> = args[2..].iter().map(PathBuf::from).collect();
            if inputs.is_empty() {
                return Err(eyre::eyre!("No input files given\n\n{}", USAGE));
            }
            let rows = batch::assess_files(analyzer, &inputs).await?;
            batch::write_csv_file(output, &rows)?;
        }
        "serve" => {
            let fetcher = match Fetcher::new(config.fetcher.clone()) {
                Ok(f) => Some(f),
                Err(e) => {
                    tracing::warn!(error = %e, "Fetcher disabled, wallet lookups unavailable");
                    None
                }
            };
            api::serve(analyzer, fetcher, &config.api.host, config.api.port).await?;
        }
        "-h" | "--help" | "help" => println!("{}", USAGE),
        input_file => {
            let payload = InputPayload::from_file(input_file)?;
            print_report(&analyzer, &payload)?;
        }
    }

    Ok(())
}

fn print_report(analyzer: &RiskAnalyzer, payload: &InputPayload) -> eyre::Result<()> {
    let report = analyzer.assess(payload);
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}
