//! Scenario configuration
//!
//! Defines the declarative description of one simulation run, loadable from
//! a TOML scenario file, and the validation that gates startup.

//-----------------------------------------------------------------------------
// Configuration Structures
//-----------------------------------------------------------------------------

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{SimulationError, SimulationResult};
use crate::ledger::{Units, MAX_CUSTOMERS, MAX_RESOURCE_KINDS};

/// One simulation scenario: the resource declaration plus run parameters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    /// Number of customer tasks.
    pub customers: usize,
    /// Number of distinct resource kinds.
    pub resource_kinds: usize,
    /// Declared maximum demand, one row per customer.
    pub maximum: Vec<Vec<Units>>,
    /// Units of each kind initially in the free pool.
    pub available: Vec<Units>,
    /// Units already held per customer at startup; none held when absent.
    #[serde(default)]
    pub allocation: Option<Vec<Vec<Units>>>,
    /// Request/release cycles each customer performs.
    #[serde(default = "default_cycles")]
    pub cycles: u32,
    /// RNG seed; drawn from entropy (and reported) when absent.
    #[serde(default)]
    pub seed: Option<u64>,
    /// Pause between operations, in milliseconds.
    #[serde(default = "default_pause_ms")]
    pub pause_ms: u64,
    /// Pacing speed multiplier; zero disables pauses entirely.
    #[serde(default = "default_time_scale")]
    pub time_scale: f64,
}

fn default_cycles() -> u32 {
    10
}

fn default_pause_ms() -> u64 {
    1000
}

fn default_time_scale() -> f64 {
    1.0
}

impl SimulationConfig {
    /// Build a configuration from a maximum-demand matrix and an available
    /// vector, deriving the dimensions from their shapes. Run parameters
    /// take their defaults and can be adjusted with the `with_*` builders.
    pub fn new(maximum: Vec<Vec<Units>>, available: Vec<Units>) -> Self {
        Self {
            customers: maximum.len(),
            resource_kinds: available.len(),
            maximum,
            available,
            allocation: None,
            cycles: default_cycles(),
            seed: None,
            pause_ms: default_pause_ms(),
            time_scale: default_time_scale(),
        }
    }

    /// Set the initial allocation matrix.
    pub fn with_allocation(mut self, allocation: Vec<Vec<Units>>) -> Self {
        self.allocation = Some(allocation);
        self
    }

    /// Set the per-customer cycle count.
    pub fn with_cycles(mut self, cycles: u32) -> Self {
        self.cycles = cycles;
        self
    }

    /// Set the RNG seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the pacing speed multiplier; zero disables pauses.
    pub fn with_time_scale(mut self, time_scale: f64) -> Self {
        self.time_scale = time_scale;
        self
    }

    /// Load and validate a scenario from a TOML file.
    pub fn from_toml_path(path: &Path) -> SimulationResult<Self> {
        let text = fs::read_to_string(path)?;
        let config: Self = toml::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the declaration before any ledger is built or task spawned.
    ///
    /// Rejects out-of-bound dimensions, shape mismatches, negative entries,
    /// and initial allocations exceeding the declared maximum.
    pub fn validate(&self) -> SimulationResult<()> {
        if self.customers == 0 || self.customers > MAX_CUSTOMERS {
            return Err(config_error(format!(
                "customer count {} outside 1..={MAX_CUSTOMERS}",
                self.customers
            )));
        }
        if self.resource_kinds == 0 || self.resource_kinds > MAX_RESOURCE_KINDS {
            return Err(config_error(format!(
                "resource kind count {} outside 1..={MAX_RESOURCE_KINDS}",
                self.resource_kinds
            )));
        }

        check_matrix("maximum", &self.maximum, self.customers, self.resource_kinds)?;
        check_vector("available", &self.available, self.resource_kinds)?;

        if let Some(allocation) = &self.allocation {
            check_matrix("allocation", allocation, self.customers, self.resource_kinds)?;
            for (c, (alloc_row, max_row)) in
                allocation.iter().zip(&self.maximum).enumerate()
            {
                for (r, (held, max)) in alloc_row.iter().zip(max_row).enumerate() {
                    if held > max {
                        return Err(config_error(format!(
                            "allocation[{c}][{r}] = {held} exceeds maximum {max}"
                        )));
                    }
                }
            }
        }

        if self.time_scale < 0.0 {
            return Err(config_error(format!(
                "time scale {} is negative",
                self.time_scale
            )));
        }

        Ok(())
    }
}

fn config_error(detail: String) -> SimulationError {
    SimulationError::Configuration(detail)
}

fn check_matrix(
    name: &str,
    matrix: &[Vec<Units>],
    rows: usize,
    columns: usize,
) -> SimulationResult<()> {
    if matrix.len() != rows {
        return Err(config_error(format!(
            "{name} has {} rows, expected {rows}",
            matrix.len()
        )));
    }
    for (c, row) in matrix.iter().enumerate() {
        check_vector(&format!("{name}[{c}]"), row, columns)?;
    }
    Ok(())
}

fn check_vector(name: &str, vector: &[Units], length: usize) -> SimulationResult<()> {
    if vector.len() != length {
        return Err(config_error(format!(
            "{name} has {} entries, expected {length}",
            vector.len()
        )));
    }
    if let Some(units) = vector.iter().find(|units| **units < 0) {
        return Err(config_error(format!("{name} contains negative entry {units}")));
    }
    Ok(())
}

//-----------------------------------------------------------------------------
// Tests
//-----------------------------------------------------------------------------
