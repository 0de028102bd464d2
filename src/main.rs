use clap::Parser;
use pin_page::{Pipeline, RunOutcome};

mod args;
use args::Args;

#[tokio::main]
async fn main() {
    // Values from a local .env file fill in unset environment variables
    dotenvy::dotenv().ok();

    // Initialize logging
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = Args::parse();

    let config = match args.to_config() {
        Ok(config) => config,
        Err(e) => {
            ::log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    ::log::info!("Starting pipeline for: {}", config.origin_url);
    let start_time = std::time::Instant::now();

    let pipeline = Pipeline::new(config).mirror_only(args.mirror_only);
    let outcome = match pipeline.run().await {
        Ok(outcome) => outcome,
        Err(e) => {
            ::log::error!("Invalid configuration: {}", e);
            std::process::exit(1);
        }
    };

    match &outcome {
        RunOutcome::Succeeded { publish, .. } => {
            println!("Uploaded directory with CID: {}", publish.gateway_url);
        }
        RunOutcome::Mirrored(report) => {
            println!("Mirrored page to {}", report.index_path.display());
        }
        RunOutcome::MirrorFailed(e) => {
            eprintln!("Error storing the data: {}", e);
        }
        RunOutcome::PublishFailed { error, .. } => {
            eprintln!("Error uploading files: {}", error);
        }
    }

    ::log::info!(
        "Finished in {:.2} seconds",
        start_time.elapsed().as_secs_f64()
    );
    std::process::exit(outcome.exit_code());
}
