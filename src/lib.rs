pub mod commands;
pub mod pipeline;

use anyhow::Result;
use clap::Parser;
use commands::{Cli, Command};

pub fn run() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "cardscan=info,cardscan_lib=info,cardscan_vision=info,cardscan_capture=info,cardscan_data=info"
                    .into()
            }),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let data_dir = cli.data.as_path();

    match cli.command {
        Command::Train { samples, no_runs } => commands::train(&samples, data_dir, !no_runs),
        Command::Templates { samples } => commands::build_templates(&samples, data_dir),
        Command::Recognize {
            screens,
            matcher,
            json,
        } => commands::recognize(&screens, data_dir, matcher, json),
        Command::Verify { screens, matcher } => commands::verify(&screens, data_dir, matcher),
    }
}
