//! Banker's Algorithm Simulation
//!
//! This crate provides a deadlock-avoidance simulator built around the
//! Banker's Algorithm: a resource manager that grants or denies requests
//! from a fixed set of concurrent customers only when granting keeps the
//! system in a state from which every customer can eventually finish.
//!
//! ## Core Components
//!
//! - **Ledger**: the shared allocation/maximum/need/available state, with
//!   `need = maximum - allocation` maintained on every delta
//! - **Safety check**: pure function over a ledger snapshot that finds a
//!   completion order or reports that none exists
//! - **Bank**: the request/release protocol; tentative apply, safety check,
//!   and commit-or-rollback under one exclusive lock
//! - **Customer**: per-customer task alternating random requests and
//!   releases, bounded by its current need and allocation
//! - **SimulationController**: spawns the customer tasks and aggregates a
//!   run summary
//!
//! ## Getting Started
//!
//! ```rust,no_run
//! use banker_sim::{SimulationConfig, SimulationController};
//!
//! # async fn demo() -> banker_sim::SimulationResult<()> {
//! let config = SimulationConfig::new(
//!     vec![vec![7, 5, 3], vec![3, 2, 2]],
//!     vec![3, 3, 2],
//! )
//! .with_seed(42);
//!
//! let summary = SimulationController::new(config)?.run().await?;
//! println!("{} granted, {} denied", summary.granted, summary.denied);
//! # Ok(())
//! # }
//! ```

pub mod actor;
pub mod bank;
pub mod cli;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod ledger;
pub mod randomness;
pub mod report;
pub mod safety;

// Core exports
pub use actor::{Customer, CustomerStats, DemandStrategy, ScriptedDemand, UniformDemand};
pub use bank::Bank;
pub use clock::SimClock;
pub use config::SimulationConfig;
pub use controller::{SimulationController, SimulationSummary};
pub use error::{SimulationError, SimulationResult};
pub use ledger::{Ledger, LedgerSnapshot, Units, MAX_CUSTOMERS, MAX_RESOURCE_KINDS};
pub use randomness::SeededRng;
pub use report::{DenialReason, Grant, StateReport};
pub use safety::{is_safe, safe_sequence};
