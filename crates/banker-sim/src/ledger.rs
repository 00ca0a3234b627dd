//! Shared resource ledger: allocation, maximum demand, remaining need, and
//! available units, sized once at initialization and never resized.

use serde::{Deserialize, Serialize};

use crate::config::SimulationConfig;
use crate::error::SimulationResult;

/// Resource quantity. Signed so that a release can flow through the same
/// delta primitive as a grant; validated states never hold negative entries.
pub type Units = i64;

/// Upper bound on customers accepted at initialization.
pub const MAX_CUSTOMERS: usize = 64;

/// Upper bound on distinct resource kinds accepted at initialization.
pub const MAX_RESOURCE_KINDS: usize = 32;

/// The mutable shared state of the simulation.
///
/// Maintains `need = maximum - allocation` incrementally on every delta, and
/// conservation of `available[r] + sum of allocation[_][r]` against the total
/// fixed at initialization. The ledger performs no safety checking of its
/// own; all mutation is driven by [`crate::bank::Bank`], which validates
/// bounds before touching it.
#[derive(Debug)]
pub struct Ledger {
    maximum: Vec<Vec<Units>>,
    allocation: Vec<Vec<Units>>,
    need: Vec<Vec<Units>>,
    available: Vec<Units>,
    total_units: Vec<Units>,
}

impl Ledger {
    /// Build a ledger from a configuration, validating it first.
    ///
    /// Allocation starts from the configured initial matrix when one is
    /// given, otherwise from all zeroes; need is derived as
    /// `maximum - allocation`.
    pub fn new(config: &SimulationConfig) -> SimulationResult<Self> {
        config.validate()?;

        let maximum = config.maximum.clone();
        let allocation = match &config.allocation {
            Some(rows) => rows.clone(),
            None => vec![vec![0; config.resource_kinds]; config.customers],
        };
        let need: Vec<Vec<Units>> = maximum
            .iter()
            .zip(&allocation)
            .map(|(max_row, alloc_row)| {
                max_row.iter().zip(alloc_row).map(|(m, a)| m - a).collect()
            })
            .collect();

        let mut total_units = config.available.clone();
        for row in &allocation {
            for (total, held) in total_units.iter_mut().zip(row) {
                *total += held;
            }
        }

        Ok(Self {
            maximum,
            allocation,
            need,
            available: config.available.clone(),
            total_units,
        })
    }

    /// Number of customers the ledger was sized for.
    pub fn customers(&self) -> usize {
        self.allocation.len()
    }

    /// Number of distinct resource kinds.
    pub fn resource_kinds(&self) -> usize {
        self.available.len()
    }

    /// Shift `delta[r]` units of each kind to `customer`: allocation grows
    /// by the delta while need and available shrink by it. Negative entries
    /// release units back to the pool.
    ///
    /// This is a bare state transition with no rollback of its own; the
    /// caller validates bounds before applying.
    pub fn apply_delta(&mut self, customer: usize, delta: &[Units]) {
        for (r, &d) in delta.iter().enumerate() {
            self.allocation[customer][r] += d;
            self.need[customer][r] -= d;
            self.available[r] -= d;
        }
    }

    /// Remaining need row for one customer.
    pub fn need_row(&self, customer: usize) -> &[Units] {
        &self.need[customer]
    }

    /// Current allocation row for one customer.
    pub fn allocation_row(&self, customer: usize) -> &[Units] {
        &self.allocation[customer]
    }

    /// Declared maximum demand row for one customer.
    pub fn maximum_row(&self, customer: usize) -> &[Units] {
        &self.maximum[customer]
    }

    /// Units of each kind not currently held by any customer.
    pub fn available(&self) -> &[Units] {
        &self.available
    }

    /// Per-kind totals fixed at initialization; available plus all
    /// allocations always sums to this.
    pub fn total_units(&self) -> &[Units] {
        &self.total_units
    }

    /// Immutable copy of the mutable state, safe to inspect and to hand to
    /// the safety check without holding the ledger's lock.
    pub fn snapshot(&self) -> LedgerSnapshot {
        LedgerSnapshot {
            allocation: self.allocation.clone(),
            need: self.need.clone(),
            available: self.available.clone(),
        }
    }
}

/// Point-in-time copy of the ledger's mutable state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub allocation: Vec<Vec<Units>>,
    pub need: Vec<Vec<Units>>,
    pub available: Vec<Units>,
}

impl LedgerSnapshot {
    /// Number of customers captured in the snapshot.
    pub fn customers(&self) -> usize {
        self.allocation.len()
    }

    /// Number of distinct resource kinds captured in the snapshot.
    pub fn resource_kinds(&self) -> usize {
        self.available.len()
    }
}

//-----------------------------------------------------------------------------
// Tests
//-----------------------------------------------------------------------------
