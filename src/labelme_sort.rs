use clap::Parser;
use log::{error, info};
use std::process::ExitCode;

use labelme2geo::config::load_dotenv;
use labelme2geo::{organize_by_flags, SortArgs};

fn main() -> ExitCode {
    // Initialize the logger
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    load_dotenv();
    let args = SortArgs::parse();

    info!(
        "Sorting {} by flags: {}",
        args.json_dir.display(),
        args.flags.join(", ")
    );

    match organize_by_flags(&args.json_dir, &args.flags) {
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
