use std::process::ExitCode;

use clap::Parser;
use nestegg::api::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    env_logger::init();
    nestegg::api::run(Cli::parse()).await
}
