//! kinvey-flex-scripts entry point.
//!
//! Parses arguments, initializes logging and dispatches to the command.

use clap::Parser;
use kinvey_flex_scripts::{cli, commands, error, logger, ui};
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Start(start_args) => commands::start_execute(start_args).await,
        cli::Command::Deploy(deploy_args) => commands::deploy_execute(deploy_args).await,
        cli::Command::Init(init_args) => commands::init_execute(init_args, args.verbose).await,
        cli::Command::Create(create_args) => {
            commands::create_execute(create_args, args.verbose).await
        }
    };

    result.map_err(error::cli_error_to_miette)
}
