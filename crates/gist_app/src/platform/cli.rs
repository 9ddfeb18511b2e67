use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Browse, search, create, star and fork gists.
#[derive(Debug, Parser)]
#[command(name = "gist", version)]
pub struct Cli {
    /// RON configuration file (defaults to ./gist.ron when present)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    /// API token; overrides GIST_TOKEN and the config file
    #[arg(long, global = true)]
    pub token: Option<String>,
    /// API base url; overrides GIST_BASE_URL and the config file
    #[arg(long, global = true)]
    pub base_url: Option<String>,
    /// Log more (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, clap::Args)]
pub struct ListArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,
    #[arg(long)]
    pub per_page: Option<u32>,
    /// Client-side filter over description, owner, filenames and previews
    #[arg(long)]
    pub filter: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List public gists.
    Public(ListArgs),
    /// List your own gists.
    Mine(ListArgs),
    /// List your starred gists.
    Starred(ListArgs),
    /// Search gists on the server.
    Search {
        query: String,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long)]
        per_page: Option<u32>,
    },
    /// Show one gist with the content of every file.
    Show { id: String },
    /// Create a gist from local files.
    Create {
        /// File to upload as NAME=PATH
        #[arg(long = "file", value_name = "NAME=PATH", required = true)]
        files: Vec<String>,
        #[arg(long, default_value = "")]
        description: String,
        /// Create a secret gist
        #[arg(long)]
        secret: bool,
    },
    /// Star a gist.
    Star { id: String },
    /// Remove the star from a gist.
    Unstar { id: String },
    /// Fork a gist.
    Fork { id: String },
    /// Show the user behind the token.
    Whoami,
    /// Interactive session.
    Shell,
}
