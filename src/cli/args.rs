//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

/// Hierarchical investment budget planner: weighted allocation with live redistribution
#[derive(Parser, Debug)]
#[command(name = "budgettree")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Directory holding the local .budgettree.toml (default: cwd)
    #[arg(short = 'C', long, global = true, value_hint = ValueHint::DirPath)]
    pub project_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Allocate a total and record actual investments interactively (default)
    Run(SessionArgs),

    /// Print the initial distribution without prompting
    Plan(SessionArgs),

    /// List leaf categories in entry order
    Leaves {
        /// Weight configuration file (JSON or TOML)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        config: Option<PathBuf>,
    },

    /// Manage settings
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },

    /// Generate shell completions
    Completion {
        /// Shell type
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Arguments shared by session-like commands
#[derive(Args, Debug, Clone, Default)]
pub struct SessionArgs {
    /// Weight configuration file (JSON or TOML)
    #[arg(short, long, value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Total amount to allocate (prompted when missing)
    #[arg(short, long)]
    pub total: Option<f64>,

    /// Top-level weight override NAME=VALUE (repeatable)
    #[arg(short, long = "weight", value_parser = parse_weight_override)]
    pub weights: Vec<(String, f64)>,

    /// Use configured top-level weights without prompting
    #[arg(long)]
    pub defaults: bool,
}

/// Config subcommands
#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,

    /// Print a commented configuration template
    Template,

    /// Show config file locations
    Path,
}

fn parse_weight_override(raw: &str) -> Result<(String, f64), String> {
    let (name, value) = raw
        .rsplit_once('=')
        .ok_or_else(|| format!("expected NAME=VALUE, got '{raw}'"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("missing category name in '{raw}'"));
    }
    let weight: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("invalid weight '{}'", value.trim()))?;
    Ok((name.to_string(), weight))
}
