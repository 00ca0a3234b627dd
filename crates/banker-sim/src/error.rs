//! Error types for the simulator
//!
//! This module defines the error types used throughout the banker-sim crate,
//! providing categorized error handling and proper context propagation.

//-----------------------------------------------------------------------------
// Error Types
//-----------------------------------------------------------------------------

use thiserror::Error;

/// Main error type for the banker-sim crate.
///
/// A denied request is not an error: denial is an expected outcome and is
/// reported through [`crate::report::Grant::Denied`].
#[derive(Error, Debug)]
pub enum SimulationError {
    /// Represents malformed initialization input. Fatal to startup: no
    /// customer task may be spawned from a configuration that failed
    /// validation.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Represents a proposal outside the caller's bound. Signals a defect in
    /// the driving code; the offending transaction is aborted with the ledger
    /// untouched.
    #[error("Invalid amount from customer {customer}: {detail}")]
    InvalidAmount { customer: usize, detail: String },

    /// Represents an error during simulation runtime.
    #[error("Runtime error: {0}")]
    Runtime(String),

    /// An I/O error occurred while reading a scenario file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A scenario file could not be parsed.
    #[error("Scenario parse error: {0}")]
    Scenario(#[from] toml::de::Error),
}

/// Result type alias for simulation operations.
pub type SimulationResult<T> = Result<T, SimulationError>;
