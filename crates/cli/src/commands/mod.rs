//! Command implementations for fabricctl

pub mod profile;
pub mod version;

use clap::Subcommand;

#[derive(Subcommand)]
pub enum VersionCommands {
    /// List all versions
    List,

    /// Show a version and its profiles
    Show {
        /// Version id
        version: String,
    },

    /// Create a version, optionally cloning an existing one
    Create {
        /// New version id
        version: String,
        /// Version to copy profiles and attributes from
        #[arg(short, long)]
        parent: Option<String>,
        /// Version attribute as KEY=VALUE
        #[arg(short, long = "attribute", value_name = "KEY=VALUE")]
        attributes: Vec<String>,
    },

    /// Delete a version and all of its profiles
    Delete {
        /// Version id
        version: String,
    },
}

#[derive(Subcommand)]
pub enum ProfileCommands {
    /// List the profiles of a version
    List {
        /// Version id
        version: String,
    },

    /// Show a profile
    Show {
        /// Version id
        version: String,
        /// Profile id
        profile: String,
        /// Show the merged overlay instead of the profile's own files
        #[arg(short, long)]
        overlay: bool,
    },

    /// Create a profile
    Create {
        /// Version id
        version: String,
        /// Profile id
        profile: String,
        /// Parent profile id, may be repeated
        #[arg(short, long = "parent", value_name = "ID")]
        parents: Vec<String>,
        /// File configuration read from disk, as NAME=PATH
        #[arg(short, long = "file", value_name = "NAME=PATH")]
        files: Vec<String>,
    },

    /// Replace the files and parents of an existing profile
    Update {
        /// Version id
        version: String,
        /// Profile id
        profile: String,
        /// Parent profile id, may be repeated
        #[arg(short, long = "parent", value_name = "ID")]
        parents: Vec<String>,
        /// File configuration read from disk, as NAME=PATH
        #[arg(short, long = "file", value_name = "NAME=PATH")]
        files: Vec<String>,
    },

    /// Delete a profile
    Delete {
        /// Version id
        version: String,
        /// Profile id
        profile: String,
        /// Also remove the profile from containers that use it
        #[arg(short, long)]
        force: bool,
    },
}

/// Split a `KEY=VALUE` argument.
pub fn split_pair<'a>(arg: &'a str, what: &str) -> Result<(&'a str, &'a str), crate::error::CliError> {
    arg.split_once('=')
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| crate::error::CliError::InvalidArgument(format!("expected {what}, got '{arg}'")))
}
