use std::path::PathBuf;

use clap::Parser;

use crate::{plumb, search_path::DEFAULT_QUERY};

#[derive(Debug, Parser)]
#[command(
    name = "edit",
    about = "Find files by partial path and plumb the best match",
    after_help = "Queries are partial paths: each element must match an \
                  element of the candidate path, in order. Elements match \
                  as substrings, or as globs when they contain any of *?[. \
                  Prefix the query with ~ to look in parent directories \
                  instead. Use dir:query to search dir under every \
                  directory in EDITPATH."
)]
pub struct Cli {
    /// Partial path to look for
    #[arg(default_value = DEFAULT_QUERY)]
    pub query: String,

    /// Directories to search (default: .); missing ones are looked up in
    /// EDITPATH
    pub roots: Vec<PathBuf>,

    /// Look for directories instead of files
    #[arg(short, long)]
    pub dirs: bool,

    /// Print every match instead of plumbing the best one
    #[arg(short = 'n', long, conflicts_with = "first")]
    pub list: bool,

    /// Print only the best match instead of plumbing it
    #[arg(short = '1', long)]
    pub first: bool,

    /// Address appended to the plumbed path, e.g. a line number
    #[arg(short, long)]
    pub addr: Option<String>,

    /// Command used to open the best match
    #[arg(long, default_value = plumb::DEFAULT_COMMAND)]
    pub plumber: String,

    /// Plumb port to send the match to
    #[arg(long, default_value = plumb::DEFAULT_DEST)]
    pub dest: String,

    /// Increase log verbosity (can be repeated: -v, -vv)
    #[arg(short, long, visible_alias = "debug", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

/// What to do with the ranked matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    First,
    Open,
}

impl Cli {
    pub fn action(&self) -> Action {
        if self.list {
            Action::List
        } else if self.first {
            Action::First
        } else {
            Action::Open
        }
    }
}
