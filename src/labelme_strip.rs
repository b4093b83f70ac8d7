use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use labelme2geo::config::load_dotenv;
use labelme2geo::{strip_image_data, StripArgs};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    load_dotenv();
    let args = StripArgs::parse();

    info!(
        "Removing embedded image data under {}...",
        args.json_dir.display()
    );

    match strip_image_data(&args.json_dir, !args.no_recursive) {
        Ok(stats) => {
            stats.print_summary();
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
