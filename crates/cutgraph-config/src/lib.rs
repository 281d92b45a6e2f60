//! TOML front end for the cutgraph kernel.
//!
//! Two file kinds:
//!
//! - **cut files**: an array of `[[cut]]` tables, one per cut, loaded into a
//!   [`CutConfig`](cutgraph_kernel::CutConfig) by [`parse_cut_config`] /
//!   [`load_cut_config`];
//! - **setup files**: a `[manager]` table naming cut files and factory
//!   options, loaded by [`ManagerSetup::load`].

mod cuts;
mod setup;

use std::path::Path;
use thiserror::Error;

pub use cuts::{load_cut_config, parse_cut_config};
pub use setup::{ManagerSetup, expand_vars, expand_vars_with};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read file: {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid toml at {path}: {source}")]
    ParseToml {
        path: String,
        #[source]
        source: toml::de::Error,
    },

    #[error("environment variable '{name}' is not set (in {text:?})")]
    UnsetVariable { name: String, text: String },

    #[error(transparent)]
    Cut(#[from] cutgraph_kernel::CutError),

    #[error("{0}")]
    Contract(String),
}

fn read_text(path: &Path) -> Result<String, ConfigError> {
    std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: display_path(path),
        source,
    })
}

fn parse_toml(text: &str, path: &str) -> Result<toml::Value, ConfigError> {
    text.parse().map_err(|source| ConfigError::ParseToml {
        path: path.to_string(),
        source,
    })
}

fn display_path(path: &Path) -> String {
    path.to_string_lossy().to_string()
}
