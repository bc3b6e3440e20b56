use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

use crate::attacks::selector::SelectionMode;
use crate::attacks::AttackType;

#[derive(Parser, Debug)]
#[command(
    name = "phish-trainer",
    version,
    about = "Learn to spot phishing URLs, one round at a time"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Config file path. Default: config/phish-trainer.toml
    #[arg(long, global = true)]
    pub config: Option<String>,

    /// SQLite path for local progress
    #[arg(long, global = true)]
    pub db_path: Option<PathBuf>,

    /// JSON file acting as the remote progress store
    #[arg(long, global = true)]
    pub remote: Option<PathBuf>,

    /// Play without the remote progress store
    #[arg(long, global = true)]
    pub offline: bool,

    /// HTTP feed of candidate URLs
    #[arg(long, global = true)]
    pub phish_list: Option<String>,

    /// Seed for reproducible rounds
    #[arg(long, global = true)]
    pub seed: Option<u64>,

    /// Attack selection mode
    #[arg(long, global = true, value_enum)]
    pub mode: Option<ModeArg>,

    /// Increase verbosity (debug, trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log file path
    #[arg(long, global = true, default_value = "data/trainer.log")]
    pub log_file: String,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Interactive training session
    Play,
    /// Show stored progress
    Stats {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },
    /// Print generated attacks as JSON lines, without touching progress
    Drill {
        /// Number of URLs to generate
        #[arg(long, default_value_t = 10)]
        count: usize,
        /// Restrict to one attack
        #[arg(long, value_enum)]
        attack: Option<AttackArg>,
    },
    /// Push local progress to the remote store and merge back
    Sync,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum ModeArg {
    Level,
    Random,
    Sequential,
}

impl From<ModeArg> for SelectionMode {
    fn from(value: ModeArg) -> Self {
        match value {
            ModeArg::Level => SelectionMode::Level,
            ModeArg::Random => SelectionMode::Random,
            ModeArg::Sequential => SelectionMode::Sequential,
        }
    }
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum AttackArg {
    Typo,
    Homoglyph,
    SubdomainSpoof,
    TldSwap,
}

impl From<AttackArg> for AttackType {
    fn from(value: AttackArg) -> Self {
        match value {
            AttackArg::Typo => AttackType::Typo,
            AttackArg::Homoglyph => AttackType::Homoglyph,
            AttackArg::SubdomainSpoof => AttackType::SubdomainSpoof,
            AttackArg::TldSwap => AttackType::TldSwap,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_drill_with_global_flags() {
        let cli = Cli::try_parse_from([
            "phish-trainer",
            "drill",
            "--count",
            "3",
            "--attack",
            "tld-swap",
            "--seed",
            "7",
        ])
        .unwrap();
        assert_eq!(cli.seed, Some(7));
        match cli.command {
            Command::Drill { count, attack } => {
                assert_eq!(count, 3);
                assert!(matches!(attack, Some(AttackArg::TldSwap)));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn verbosity_counts() {
        let cli = Cli::try_parse_from(["phish-trainer", "-vv", "stats"]).unwrap();
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Command::Stats { json: false }));
    }
}
