use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "folio", bin_name = "folio", version)]
#[command(about = "Browse, page through, search and edit files from the terminal", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Root to browse, by position or name (default: first root; env FOLIO_ROOT)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub root: Option<String>,

    /// Directory holding config.json
    #[arg(long = "config-dir", global = true, help_heading = "Options")]
    pub config_dir: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true, help_heading = "Options")]
    pub json: bool,

    /// Verbose output (debug logging to stderr)
    #[arg(short, long, global = true, help_heading = "Options")]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List configured roots
    Roots,

    /// List a directory
    Ls {
        /// Directory relative to the root
        dir: Option<String>,
    },

    /// Show a page of a file
    View {
        file: String,

        /// Page to show (1-based)
        #[arg(long, conflicts_with = "line")]
        page: Option<usize>,

        /// Show the page holding this line
        #[arg(long)]
        line: Option<usize>,
    },

    /// Search a file and show the page of a match
    Search {
        file: String,
        query: String,

        /// Match to show (1-based)
        #[arg(long)]
        hit: Option<usize>,
    },

    /// Page through a file interactively
    Browse { file: String },

    /// Print the value at a path of a JSON file
    Get {
        file: String,
        /// Path such as server.hosts[0] (default: whole document)
        path: Option<String>,
    },

    /// Set values in a JSON file: PATH VALUE [PATH VALUE ...]
    Set {
        file: String,
        #[arg(required = true, num_args = 2.., allow_hyphen_values = true)]
        assignments: Vec<String>,
    },

    /// Delete the entry at a path of a JSON file
    Del { file: String, path: String },

    /// Add a field to an object (use "" for the root)
    AddField {
        file: String,
        parent: String,
        key: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// Append an item to an array (use "" for the root)
    AddItem {
        file: String,
        parent: String,
        #[arg(allow_hyphen_values = true)]
        value: String,
    },

    /// List every leaf value of a JSON file with its path
    Leaves { file: String },

    /// Get or set configuration values
    Config {
        key: Option<String>,
        value: Option<String>,
    },

    /// Create an empty file
    Touch { dir: String, name: String },

    /// Create a directory
    Mkdir { dir: String, name: String },

    /// Delete a file
    Rm { file: String },
}
