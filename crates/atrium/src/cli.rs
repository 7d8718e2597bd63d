//! CLI argument parsing with clap

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Atrium - module and theme management for an Atrium site
#[derive(Parser, Debug)]
#[command(name = "atrium")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Increase verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to atrium.yaml config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Show version information
    Version(VersionArgs),

    /// Plugin module management
    #[command(subcommand)]
    Module(ModuleCommands),

    /// Theme management
    #[command(subcommand)]
    Theme(ThemeCommands),
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Subcommand, Debug)]
pub enum ModuleCommands {
    /// List installed modules
    List(ListArgs),

    /// Search installed modules
    Search(SearchArgs),

    /// Install modules from the repository feed
    Install(IdsArgs),

    /// Update installed modules from the repository feed
    Update(UpdateArgs),

    /// Activate disabled modules
    Activate(IdsArgs),

    /// Deactivate modules
    Deactivate(IdsArgs),

    /// Delete modules and their files
    Delete(DeleteArgs),

    /// Clone modules side by side
    Clone(IdsArgs),

    /// Fetch and install a package from a URL
    Fetch(FetchArgs),
}

#[derive(Subcommand, Debug)]
pub enum ThemeCommands {
    /// List installed themes
    List(ListArgs),

    /// Select the site's current theme
    Select(SelectArgs),
}

#[derive(Args, Debug)]
pub struct ListArgs {
    /// Sort field (sname, name, author, version, section)
    #[arg(long, default_value = "sname")]
    pub sort: String,

    /// Sort descending
    #[arg(long)]
    pub desc: bool,

    /// Show only modules starting with this index character
    #[arg(long)]
    pub index: Option<char>,

    /// Show only modules with a pending update (contacts the feed)
    #[arg(long)]
    pub updates: bool,

    /// Page number
    #[arg(long, default_value_t = 1)]
    pub page: u64,

    /// Items per page
    #[arg(long, default_value_t = 10)]
    pub page_size: u64,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search terms (all must match; at least two characters)
    pub query: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct IdsArgs {
    /// Module ids
    #[arg(required = true)]
    pub ids: Vec<String>,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    /// Module ids; empty means every updatable module
    pub ids: Vec<String>,
}

#[derive(Args, Debug)]
pub struct DeleteArgs {
    /// Module ids
    #[arg(required = true)]
    pub ids: Vec<String>,

    /// Skip the confirmation prompt
    #[arg(short, long)]
    pub yes: bool,
}

#[derive(Args, Debug)]
pub struct FetchArgs {
    /// Package archive URL (tar.gz)
    pub url: String,
}

#[derive(Args, Debug)]
pub struct SelectArgs {
    /// Theme id
    pub id: String,
}
