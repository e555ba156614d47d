//! CLI argument parsing

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Query hierarchical site configuration
#[derive(Parser, Debug)]
#[command(name = "sitecfg")]
#[command(about = "Resolve hierarchical site configuration from a repository tree")]
#[command(version)]
pub struct Cli {
    /// Repository root directory
    ///
    /// Overrides `repository.root` from the settings file.
    #[arg(long, global = true, env = "SITECFG_ROOT")]
    pub root: Option<PathBuf>,

    /// Query the online (published) cache instead of the offline one
    #[arg(long, global = true)]
    pub online: bool,

    /// Settings file (default: $XDG_CONFIG_HOME/sitecfg/sitecfg.toml)
    #[arg(long, global = true)]
    pub settings: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the effective configuration for a path
    Resolve {
        /// Repository path, e.g. /sites/default/news/
        path: String,
    },

    /// List the detail pages configured for a resource type
    #[command(name = "detail-pages")]
    DetailPages {
        type_name: String,
    },

    /// Print the content folder -> resource type index
    #[command(name = "folder-types")]
    FolderTypes,

    /// Check whether a resource is, or lives in, a detail page
    #[command(name = "is-detail-page")]
    IsDetailPage {
        path: String,
    },

    /// List element views
    #[command(name = "element-views")]
    ElementViews,

    /// Watch the repository and report every refresh
    Watch,

    /// Print the default settings file
    #[command(name = "default-settings")]
    DefaultSettings,
}
