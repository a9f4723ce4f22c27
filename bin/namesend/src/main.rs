use clap::Parser;
use common::init_logger;
use namesend::{run, NamesendArgs};

#[tokio::main]
async fn main() -> namesend::Result<()> {
    let args = NamesendArgs::parse();

    init_logger(&args.log_level).expect("Logger should initialize");

    run(args).await
}
