//! Command line definition.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "paddock")]
#[command(
    version,
    about = "Paddock: race pick strategy backtesting and A/B comparison",
    long_about = None
)]
pub struct Cli {
    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Database URL override (e.g. sqlite://paddock.db)
    #[arg(long, global = true)]
    pub database_url: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Backtest one strategy over a date range
    Backtest {
        /// First race date, YYYYMMDD
        #[arg(long)]
        from: String,

        /// Last race date, YYYYMMDD (inclusive)
        #[arg(long)]
        to: String,

        /// Strategy id (defaults to the first registered strategy)
        #[arg(short, long, conflicts_with = "preset")]
        strategy: Option<String>,

        /// Run a saved preset instead of --strategy/--param
        #[arg(long)]
        preset: Option<String>,

        /// Parameter override, repeatable
        #[arg(short, long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,
    },

    /// Run presets A and B over the same range side by side
    Compare {
        #[arg(long)]
        from: String,

        #[arg(long)]
        to: String,
    },

    /// Picks of the active preset for upcoming races
    Predict {
        /// Defaults to the coming Saturday
        #[arg(long, requires = "to")]
        from: Option<String>,

        /// Defaults to the coming Sunday
        #[arg(long, requires = "from")]
        to: Option<String>,
    },

    /// Manage saved presets
    Preset {
        #[command(subcommand)]
        command: PresetCommand,
    },

    /// List registered strategies and their parameters
    Strategies,

    /// Load the bundled sample races into the database
    Seed {
        /// Remove existing races, entries and results first
        #[arg(long)]
        reset: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum PresetCommand {
    /// Save a preset; ids A and B are the comparison slots
    Save {
        id: String,

        #[arg(short, long)]
        strategy: Option<String>,

        #[arg(short, long = "param", value_name = "KEY=VALUE")]
        params: Vec<String>,

        /// Display label (ignored for slots A and B)
        #[arg(short, long)]
        label: Option<String>,
    },

    /// Show one preset, or all of them
    Show { id: Option<String> },

    /// Delete a preset
    Delete { id: String },

    /// Adopt a preset for live predictions
    Activate { id: String },
}
