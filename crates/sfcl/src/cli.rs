use anyhow::Result;
use clap::Parser;

use crate::args::GlobalArgs;
use crate::commands::Command;
use crate::commands::SfclCommand;
use crate::exit::Exit;

/// Inspect how composite component files are split into block modules.
#[derive(Parser)]
#[command(name = "sfcl")]
#[command(version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: SfclCommand,

    #[command(flatten)]
    pub global: GlobalArgs,
}

pub fn run(args: Vec<String>) -> Result<Exit> {
    let cli = Cli::try_parse_from(args).unwrap_or_else(|e| {
        e.exit();
    });

    let _guard = crate::logging::init_tracing(&cli.global);
    tracing::debug!(command = ?cli.command, "running");

    let command: &dyn Command = match &cli.command {
        SfclCommand::Entry(cmd) => cmd,
        SfclCommand::Extract(cmd) => cmd,
        SfclCommand::Decode(cmd) => cmd,
        SfclCommand::Intercept(cmd) => cmd,
    };
    command.execute(&cli.global)
}
