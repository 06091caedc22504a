//! # FloorGraph CLI
//!
//! Command-line interface over FloorGraph project files.
//!
//! ## Commands
//!
//! - `new` - Create an empty project file
//! - `info` - Display floors, node counts and connections
//! - `validate` - Check one file or a directory of files, optionally repairing them
//! - `export` - Re-emit a project as JSON
//! - `floor add` / `floor remove` - Edit floors
//! - `node add` / `node remove` - Edit nodes
//! - `link` / `unlink` - Connect two nodes, on one floor or across floors
//!

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use floorgraph_core::NodeType;

pub mod commands;

pub use commands::run;

/// CLI version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// CLI name
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Indoor navigation graph editor for multi-floor buildings
#[derive(Parser, Debug)]
#[command(name = "floorgraph")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Editor configuration file (TOML)
    #[arg(long, global = true, env = "FLOORGRAPH_CONFIG", value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Log debug output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create an empty project file
    New {
        /// Output file (".json" is appended when missing)
        path: PathBuf,

        /// Building name
        #[arg(short, long, default_value = "New Project")]
        name: String,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Show a summary of a project
    Info {
        /// Project file
        path: PathBuf,

        /// Print statistics as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check project files for integrity problems
    Validate {
        /// Project file or directory to scan for .json files
        path: PathBuf,

        /// Repair what can be repaired and save the result
        #[arg(long)]
        fix: bool,
    },

    /// Re-emit a project as JSON
    Export {
        /// Project file
        path: PathBuf,

        /// Drop floor-plan images from the output
        #[arg(long)]
        strip_images: bool,

        /// Single-line output
        #[arg(long)]
        compact: bool,

        /// Write to this file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Edit floors
    Floor {
        #[command(subcommand)]
        action: FloorAction,
    },

    /// Edit nodes
    Node {
        #[command(subcommand)]
        action: NodeAction,
    },

    /// Connect two nodes (same floor: local edge, different floors: stair/elevator link)
    Link {
        /// Project file
        path: PathBuf,

        /// First node id
        from: String,

        /// Second node id
        to: String,

        /// Edge weight; derived from the positions (or the floor change cost) when omitted
        #[arg(short, long)]
        distance: Option<f64>,
    },

    /// Remove the connection between two nodes
    Unlink {
        /// Project file
        path: PathBuf,

        /// First node id
        from: String,

        /// Second node id
        to: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum FloorAction {
    /// Append a floor
    Add(FloorAddArgs),

    /// Remove a floor with its nodes and connections
    Remove {
        /// Project file
        path: PathBuf,

        /// Floor id or name
        floor: String,
    },
}

#[derive(Args, Debug)]
pub struct FloorAddArgs {
    /// Project file
    pub path: PathBuf,

    /// Floor name
    pub name: String,

    /// Level (defaults to the number of existing floors)
    #[arg(short, long, allow_negative_numbers = true)]
    pub level: Option<i32>,

    /// Explicit floor id
    #[arg(long)]
    pub id: Option<String>,

    /// Floor-plan image URL
    #[arg(long, requires = "width")]
    pub image: Option<String>,

    /// Floor-plan width in pixels
    #[arg(long, requires = "height")]
    pub width: Option<f64>,

    /// Floor-plan height in pixels
    #[arg(long, requires = "width")]
    pub height: Option<f64>,
}

#[derive(Subcommand, Debug)]
pub enum NodeAction {
    /// Place a node on a floor
    Add(NodeAddArgs),

    /// Remove a node and every edge touching it
    Remove {
        /// Project file
        path: PathBuf,

        /// Node id
        node: String,
    },
}

#[derive(Args, Debug)]
pub struct NodeAddArgs {
    /// Project file
    pub path: PathBuf,

    /// Floor id or name
    #[arg(short, long)]
    pub floor: String,

    /// Grid x (0-100)
    #[arg(short)]
    pub x: f64,

    /// Grid y (0-100)
    #[arg(short)]
    pub y: f64,

    /// room, hallway, stair or elevator
    #[arg(short = 't', long = "type", default_value = "room")]
    pub kind: NodeType,

    /// Display name
    #[arg(short, long, default_value = "")]
    pub name: String,

    /// Explicit node id
    #[arg(long)]
    pub id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_node_add() {
        let cli = Cli::try_parse_from([
            "floorgraph", "node", "add", "p.json", "--floor", "L1", "-x", "12.5", "-y", "40",
            "--type", "stair",
        ])
        .unwrap();
        let Command::Node {
            action: NodeAction::Add(args),
        } = cli.command
        else {
            panic!("expected node add");
        };
        assert_eq!(args.kind, NodeType::Stair);
        assert_eq!(args.x, 12.5);
        assert_eq!(args.name, "");
    }

    #[test]
    fn test_rejects_unknown_node_type() {
        let result = Cli::try_parse_from([
            "floorgraph", "node", "add", "p.json", "--floor", "L1", "-x", "1", "-y", "1",
            "--type", "escalator",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_dimensions_come_in_pairs() {
        assert!(Cli::try_parse_from(["floorgraph", "floor", "add", "p.json", "L1", "--width", "10"]).is_err());
        assert!(
            Cli::try_parse_from([
                "floorgraph", "floor", "add", "p.json", "B1", "--level", "-1", "--width", "10",
                "--height", "20",
            ])
            .is_ok()
        );
    }
}
