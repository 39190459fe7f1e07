mod args;
mod scenario;

use clap::Parser;
use log::{debug, warn};
use snafu::ErrorCompat;

use crate::args::Args;
use crate::scenario::*;

fn main() {
    let args = Args::parse();

    let mut logger =
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"));
    if args.verbose {
        logger.filter_level(log::LevelFilter::Debug);
    }
    logger.init();
    debug!("args: {:?}", args);

    let overrides = ScenarioOverrides {
        input: args.input.clone(),
        input_type: args.input_type.clone(),
        quotient: args.quotient,
        seats: args.seats,
        excel_worksheet_name: args.excel_worksheet_name.clone(),
    };

    let res = run_scenario(
        args.config.clone(),
        &overrides,
        args.out.clone(),
        args.reference.clone(),
    );

    if let Err(e) = res {
        warn!("Error occurred {:?}", e);
        eprintln!("An error occurred: {}", e);
        if let Some(bt) = ErrorCompat::backtrace(&e) {
            eprintln!("trace: {}", bt);
        }
        std::process::exit(1);
    }
}
