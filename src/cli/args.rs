//! CLI argument definitions using clap

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{ArgAction, Parser, Subcommand, ValueHint};
use itertools::Itertools;

use crate::domain::{DEFAULT_NODE_NAME, DEFAULT_ROOT_NAME};

/// Tree-structured notes: create, inspect, edit, import and merge documents
#[derive(Parser, Debug)]
#[command(name = "litestone")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase log verbosity (-d info, -dd debug, -ddd trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub debug: u8,

    /// Settings file (default: platform config dir)
    #[arg(long, global = true, value_hint = ValueHint::FilePath)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create an empty document
    New {
        /// Target file (.lts appended if missing)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Name of the root node
        #[arg(short, long, default_value = DEFAULT_ROOT_NAME)]
        name: String,
    },

    /// Print a document as a tree
    Show {
        /// Document in any supported format
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        /// Print nested JSON instead of a tree
        #[arg(long)]
        json: bool,
    },

    /// Load any supported format and save it as LTS
    Convert {
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        #[arg(value_hint = ValueHint::FilePath)]
        output: PathBuf,
    },

    /// Import a CherryTree (.ctd) or NoteCase (.ncd) outline
    Import {
        #[arg(value_hint = ValueHint::FilePath)]
        input: PathBuf,
        /// Target file (default: input with .lts extension)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Append the top-level nodes of other documents to a base document
    Merge {
        /// Base document
        #[arg(value_hint = ValueHint::FilePath)]
        base: PathBuf,
        /// Documents to merge, in order
        #[arg(required = true, value_hint = ValueHint::FilePath)]
        incoming: Vec<PathBuf>,
        /// Target file (default: base, as .lts)
        #[arg(short, long, value_hint = ValueHint::FilePath)]
        output: Option<PathBuf>,
    },

    /// Apply one structural edit and save the document
    Edit {
        /// Document to edit (foreign formats are saved as .lts)
        #[arg(value_hint = ValueHint::FilePath)]
        file: PathBuf,
        #[command(subcommand)]
        command: EditCommands,
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

/// Edit subcommands; nodes are addressed by index path from the root,
/// e.g. `0/2` is the third child of the first top-level node and `/` the root.
#[derive(Subcommand, Debug)]
pub enum EditCommands {
    /// Append a new node
    Add {
        /// Parent node
        parent: NodePath,
        #[arg(short, long, default_value = DEFAULT_NODE_NAME)]
        name: String,
        #[arg(short, long, default_value = "")]
        content: String,
    },
    /// Delete a node and its subtree
    Remove { node: NodePath },
    /// Swap with previous sibling
    Up { node: NodePath },
    /// Swap with next sibling
    Down { node: NodePath },
    /// Become last child of previous sibling
    Indent { node: NodePath },
    /// Move out to follow the current parent
    Outdent { node: NodePath },
    /// Rename a node
    Rename { node: NodePath, name: String },
    /// Replace a node's content
    SetContent { node: NodePath, content: String },
    /// Append a deep copy of a node under another node
    Copy {
        node: NodePath,
        #[arg(long)]
        to: NodePath,
    },
    /// Move a node (with its subtree) to the end of another node's children
    Move {
        node: NodePath,
        #[arg(long)]
        to: NodePath,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Show effective settings
    Show,
    /// Show settings file location
    Path,
    /// Print a settings template
    Template,
}

/// Index path from the document root.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NodePath(pub Vec<usize>);

impl FromStr for NodePath {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split('/')
            .filter(|part| !part.is_empty())
            .map(|part| {
                part.parse::<usize>()
                    .map_err(|_| format!("invalid node path segment {part:?} in {s:?}"))
            })
            .collect::<Result<Vec<_>, _>>()
            .map(NodePath)
    }
}

impl fmt::Display for NodePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "/{}", self.0.iter().join("/"))
    }
}
