mod recognize;
mod train;

use crate::pipeline::MatcherKind;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

pub use recognize::{recognize, verify};
pub use train::{build_templates, train};

/// Subdirectory of the data directory holding averaged templates
pub const TEMPLATES_DIR: &str = "templates";

/// Learn and read card ranks and suits from table screenshots
#[derive(Debug, Parser)]
#[command(name = "cardscan", version)]
pub struct Cli {
    /// Directory holding layout.json, probe tables and templates
    #[arg(long, global = true, default_value = "data")]
    pub data: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, PartialEq, Eq, Subcommand)]
pub enum Command {
    /// Learn probe tables from labeled screenshots
    Train {
        /// Directory of screenshots named after the cards they show
        samples: PathBuf,
        /// Skip the preference for pixels inside horizontal runs
        #[arg(long)]
        no_runs: bool,
    },
    /// Build averaged templates from labeled screenshots
    Templates { samples: PathBuf },
    /// Print the hand read from each screenshot
    Recognize {
        screens: PathBuf,
        #[arg(long, value_enum, default_value_t = MatcherKind::Probe)]
        matcher: MatcherKind,
        /// One JSON object per line instead of plain text
        #[arg(long)]
        json: bool,
    },
    /// Check every screenshot reads as its file name
    Verify {
        screens: PathBuf,
        #[arg(long, value_enum, default_value_t = MatcherKind::Probe)]
        matcher: MatcherKind,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(line: &str) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("cardscan").chain(line.split_whitespace()))
    }

    #[test]
    fn test_parse_train() {
        let cli = parse("train samples --no-runs --data out").unwrap();
        assert_eq!(cli.data, PathBuf::from("out"));
        assert_eq!(
            cli.command,
            Command::Train {
                samples: PathBuf::from("samples"),
                no_runs: true
            }
        );
    }

    #[test]
    fn test_parse_global_data_before_command() {
        let cli = parse("--data elsewhere templates samples").unwrap();
        assert_eq!(cli.data, PathBuf::from("elsewhere"));
        assert_eq!(
            cli.command,
            Command::Templates {
                samples: PathBuf::from("samples")
            }
        );
    }

    #[test]
    fn test_parse_recognize_defaults() {
        let cli = parse("recognize shots").unwrap();
        assert_eq!(cli.data, PathBuf::from("data"));
        assert_eq!(
            cli.command,
            Command::Recognize {
                screens: PathBuf::from("shots"),
                matcher: MatcherKind::Probe,
                json: false
            }
        );
    }

    #[test]
    fn test_parse_verify_template() {
        let cli = parse("verify shots --matcher template").unwrap();
        assert_eq!(
            cli.command,
            Command::Verify {
                screens: PathBuf::from("shots"),
                matcher: MatcherKind::Template
            }
        );
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse("").is_err());
        assert!(parse("train").is_err());
        assert!(parse("train a b").is_err());
        assert!(parse("train a --data").is_err());
        assert!(parse("recognize a --verbose").is_err());
        assert!(parse("recognize a --matcher nope").is_err());
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
