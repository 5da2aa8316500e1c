//! CLI argument definitions using clap

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum, ValueHint};

use crate::domain::FlowVariant;

/// Company onboarding: build, validate and submit company/branch/location/room trees
#[derive(Parser, Debug)]
#[command(name = "onboard")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Flow variant (default from settings)
    #[arg(long, value_enum, global = true)]
    pub flow: Option<FlowArg>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Walk a draft through the wizard steps and report blocking issues
    Check {
        /// Draft file (JSON create-request body)
        #[arg(value_hint = ValueHint::FilePath)]
        draft: PathBuf,
    },

    /// Show a draft as a tree
    Tree {
        /// Draft file (JSON create-request body)
        #[arg(value_hint = ValueHint::FilePath)]
        draft: PathBuf,
    },

    /// Validate a draft and submit it (dry run: echoes with generated ids)
    Submit {
        /// Draft file (JSON create-request body)
        #[arg(value_hint = ValueHint::FilePath)]
        draft: PathBuf,
        /// Write the echoed records to the output directory
        #[arg(long)]
        save: bool,
    },

    /// List room types with their capacity and the amenity catalog
    Catalog,

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

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective configuration
    Show,
    /// Show config file locations
    Path,
    /// Print a config template
    Template,
}

/// Flow variant as accepted on the command line.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum FlowArg {
    /// Company onboarding (capacity follows room type)
    Onboarding,
    /// Branch dialog of an existing company (capacity editable)
    Branch,
}

impl From<FlowArg> for FlowVariant {
    fn from(arg: FlowArg) -> Self {
        match arg {
            FlowArg::Onboarding => FlowVariant::Onboarding,
            FlowArg::Branch => FlowVariant::StandaloneBranch,
        }
    }
}
