//! Error types for the Engine
//!
//! The engine substitutes defaults for missing table rows, so the only
//! failures left are broken data-model invariants. Each one aborts the run.

//-----------------------------------------------------------------------------
// Error Types
//-----------------------------------------------------------------------------

use thiserror::Error;

/// Main error type for the engine crate.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EngineError {
    /// An agent type name outside the fixed roster of behaviours.
    #[error("Unknown agent type: {0}")]
    UnknownAgentType(String),

    /// A producer agent was constructed without the commodity it produces.
    #[error("Producer agent {agent_id} has no tech")]
    MissingTech { agent_id: String },

    /// The world carries no price for a commodity a decision depends on.
    #[error("No {commodity} price in world state at year {year}")]
    MissingPrice { commodity: String, year: i32 },
}

/// Result type alias for engine operations.
pub type EngineResult<T> = Result<T, EngineError>;
