use std::io;

use clap::Parser;
use loghours::args::Arguments;
use loghours::config::AppConfig;
use loghours_error::{Result, ResultExt};

fn main() {
    let args = Arguments::parse();
    logutil::configure_global_logger(args.log_level, args.log_format, io::stderr);

    if let Err(err) = inner(args) {
        println!("ERROR: {err}");
        std::process::exit(1);
    }
}

fn inner(args: Arguments) -> Result<()> {
    let config = AppConfig::try_from_args(&args)?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_io()
        .enable_time()
        .thread_name("loghours")
        .build()
        .context("Failed to build tokio runtime")?;

    runtime.block_on(loghours::server::serve(config))
}
