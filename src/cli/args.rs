//! CLI argument definitions using clap

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};

use crate::application::{Target, DEFAULT_BINDING};
use crate::domain::dates::parse_date;

/// Shown under every database action.
pub const EPILOG: &str = "Before taking a mutating action, make a backup!";

const DROP_COLUMNS_ABOUT: &str = "Drop (remove) one or more columns from a weather database.
This command allows you to drop more than one column at once.
For example:
    wxctl database drop-columns soilTemp1 batteryStatus5 leafWet1";

/// Weather-station archive maintenance: schema changes and daily summaries
#[derive(Parser, Debug)]
#[command(name = "wxctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Manage weather databases
    #[command(after_help = EPILOG)]
    Database {
        #[command(subcommand)]
        command: DatabaseCommands,
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

/// Options shared by every database action.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct TargetArgs {
    /// Path to configuration file. Default is ~/.config/wxctl/wxctl.toml
    #[arg(long, value_name = "CONFIG-PATH", env = "WXCTL_CONFIG", value_hint = ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// The data binding to use
    #[arg(long, value_name = "BINDING-NAME", default_value = DEFAULT_BINDING)]
    pub binding: String,

    /// Print what would happen, but do not actually do it
    #[arg(long)]
    pub dry_run: bool,
}

impl TargetArgs {
    pub fn to_target(&self) -> Target {
        Target {
            config: self.config.clone(),
            binding: self.binding.clone(),
            dry_run: self.dry_run,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum DatabaseCommands {
    /// Create a new weather database
    #[command(after_help = EPILOG)]
    Create {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Drop the daily summary from a weather database
    #[command(after_help = EPILOG)]
    DropDaily {
        #[command(flatten)]
        target: TargetArgs,
    },

    /// Rebuild the daily summary in a weather database
    #[command(after_help = EPILOG)]
    RebuildDaily {
        /// Rebuild for this date only
        #[arg(long, value_name = "YYYY-mm-dd", value_parser = parse_date,
              conflicts_with_all = ["from_date", "to_date"])]
        date: Option<NaiveDate>,

        /// Rebuild starting with this date
        #[arg(long = "from", value_name = "YYYY-mm-dd", value_parser = parse_date)]
        from_date: Option<NaiveDate>,

        /// Rebuild ending with this date
        #[arg(long = "to", value_name = "YYYY-mm-dd", value_parser = parse_date)]
        to_date: Option<NaiveDate>,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Add a column to an existing weather database
    #[command(after_help = EPILOG)]
    AddColumn {
        /// Add new column NAME to database
        #[arg(value_name = "NAME")]
        column_name: String,

        /// Type of the new column
        #[arg(long = "type", value_name = "TYPE", default_value = "REAL",
              ignore_case = true, value_parser = ["REAL", "INTEGER", "INT"])]
        column_type: String,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Rename a column in an existing weather database
    #[command(after_help = EPILOG)]
    RenameColumn {
        /// Column to be renamed
        #[arg(value_name = "FROM-NAME")]
        column_name: String,

        /// New name of the column. Required.
        #[arg(long = "to-name", value_name = "NEW-NAME")]
        new_name: String,

        #[command(flatten)]
        target: TargetArgs,
    },

    /// Drop (remove) one or more columns from a weather database
    #[command(long_about = DROP_COLUMNS_ABOUT, after_help = EPILOG)]
    DropColumns {
        /// Column to be dropped. More than one NAME can be specified.
        #[arg(value_name = "NAME", required = true, num_args = 1..)]
        column_names: Vec<String>,

        #[command(flatten)]
        target: TargetArgs,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective config
    Show {
        /// Config file (default: ~/.config/wxctl/wxctl.toml)
        #[arg(long, value_name = "CONFIG-PATH", env = "WXCTL_CONFIG")]
        config: Option<PathBuf>,
    },

    /// Create config template
    Init {
        /// Where to write (default: ~/.config/wxctl/wxctl.toml)
        #[arg(long, value_name = "CONFIG-PATH", env = "WXCTL_CONFIG")]
        config: Option<PathBuf>,
        /// Overwrite an existing file
        #[arg(short, long)]
        force: bool,
    },

    /// Show config paths
    Path,
}
