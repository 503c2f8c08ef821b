use anyhow::Result;
use clap::Parser;
use tracing::Level;

mod add_rule_cmd;
mod cli;
mod device_args;
mod path_guard;
mod query_cmd;

use cli::{Cli, Command};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let device = device_args::resolve(&cli.device)?;
    match cli.command {
        Command::Query(args) => query_cmd::run_query_cmd(args, device, cli.format),
        Command::AddRule(args) => {
            add_rule_cmd::run_add_rule(args, device, cli.device.settings.as_deref(), cli.format)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .with_target(false)
        .init();
}
