//! Error types for Simulation
//!
//! This module defines the error types used throughout the simulation crate,
//! covering pack I/O, scenario patching and result bundle writing.

//-----------------------------------------------------------------------------
// Error Types
//-----------------------------------------------------------------------------

use std::path::PathBuf;

use agent_zero_engine::EngineError;
use thiserror::Error;

/// Main error type for the simulation crate.
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Represents an error during simulation setup or configuration.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// The engine aborted the run.
    #[error("Engine error: {0}")]
    Engine(#[from] EngineError),

    /// Represents a file I/O error.
    #[error("File I/O error at {path}: {source}")]
    FileIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A CSV table could not be read or written.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// A manifest or scenario document could not be parsed or written.
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// The configuration file is not valid TOML.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Represents a serialization/deserialization error.
    #[error("Serialization/Deserialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A pack manifest names a type other than `assumptions` or `scenario`.
    #[error("Unknown pack type '{0}' in manifest.yaml; expected 'assumptions' or 'scenario'")]
    UnknownPackType(String),

    /// A `replace` patch matched nothing and lacks a dimension needed to insert a row.
    #[error("Patch {index} matched no rows and has no {missing} to insert with")]
    IncompletePatch { index: usize, missing: &'static str },

    /// A `--years` argument could not be understood.
    #[error("{0}")]
    Years(String),
}

impl SimulationError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SimulationError::FileIo {
            path: path.into(),
            source,
        }
    }
}

/// Result type alias for simulation operations.
pub type SimulationResult<T> = Result<T, SimulationError>;
