//! Errors raised while building or loading a configuration.

use std::path::PathBuf;

use sluice_dsl::ParseError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error(transparent)]
    Syntax(#[from] ParseError),

    /// A call got more positional arguments than it accepts, or `input` /
    /// `output` got anything other than exactly one.
    #[error("arity error in `{name}`: {message}")]
    Arity { name: String, message: String },

    /// A call that needs a `{ }` body was written without one.
    #[error("{name} block must be specified")]
    MissingBlock { name: String },

    #[error("unknown event: {0:?} (expected \"start\" or \"complete\")")]
    UnknownEvent(String),

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JSON config error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML config error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// Events can only be attached by DSL sources.
    #[error("{} is not a DSL config", .0.display())]
    NotDsl(PathBuf),

    #[error("expected an object at the top of the config, got {0}")]
    NotAnObject(String),
}

impl ConfigError {
    pub(crate) fn arity(name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Arity { name: name.into(), message: message.into() }
    }

    pub(crate) fn missing_block(name: impl Into<String>) -> Self {
        Self::MissingBlock { name: name.into() }
    }
}

pub type ConfigResult<T> = std::result::Result<T, ConfigError>;
