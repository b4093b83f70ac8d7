use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use labelme2geo::config::load_dotenv;
use labelme2geo::{run, Args};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    load_dotenv();
    let args = Args::parse();

    let config = match args.to_pipeline_config() {
        Ok(config) => config,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return ExitCode::FAILURE;
        }
    };

    info!("Starting the conversion process...");
    info!("Tiles: {}", config.tiles_path.display());
    info!("Annotations: {}", config.annotation_dir.display());

    match run(&config) {
        Ok(report) => {
            info!(
                "Transformed polygons saved to: {} ({} features)",
                report.output_path.display(),
                report.features_written
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Failed to build label map: {}", e);
            ExitCode::FAILURE
        }
    }
}
