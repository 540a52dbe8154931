use clap::{self, Parser};
use log::{error, info, Level};
use simple_logger::init_with_level;

use bacass_launch::{
    cli::{Args, SubArgs},
    config::Config,
    core::{run, write},
};

fn main() {
    let start = std::time::Instant::now();
    init_with_level(Level::Info).unwrap();

    let args: Args = Args::parse();
    let mut failed = false;

    match args.command {
        SubArgs::Run { args } => {
            let config = Config::read(args.config).expect("ERROR: Could not read config file");

            let outcome = run(config).unwrap_or_else(|e| {
                error!("{}", e);
                std::process::exit(1);
            });

            if !outcome.success {
                error!("ERROR: Pipeline run failed");
            }

            failed = !outcome.success;
        }
        SubArgs::Write { args } => {
            let config =
                Config::read(args.config.clone()).expect("ERROR: Could not read config file");

            write(config, args.out).unwrap_or_else(|e| {
                error!("{}", e);
                std::process::exit(1);
            });
        }
    }

    let elapsed = start.elapsed();
    info!("Elapsed time: {:.3?}", elapsed);

    if failed {
        std::process::exit(1);
    }
}
