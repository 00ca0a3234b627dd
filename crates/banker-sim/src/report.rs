//! State reporting after protocol operations
//!
//! Every commit and every rollback yields a [`StateReport`] so the caller
//! sees the available vector, the allocation and need matrices, and a safety
//! flag without any separate signaling channel.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::ledger::LedgerSnapshot;

/// Why a request was turned down.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DenialReason {
    /// More units were asked for than the pool currently holds. Checked
    /// before the safety test ever runs.
    Insufficient,
    /// Granting would leave a state with no completion order.
    Unsafe,
}

impl fmt::Display for DenialReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Insufficient => write!(f, "resources not currently available"),
            Self::Unsafe => write!(f, "would produce unsafe state"),
        }
    }
}

/// Outcome of a request: either the new committed state or a denial with
/// the untouched state. Denial is an ordinary outcome, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Grant {
    /// The request committed; the report shows the post-commit state.
    Granted(StateReport),
    /// The request was rolled back; the report shows the unchanged state.
    Denied {
        reason: DenialReason,
        report: StateReport,
    },
}

impl Grant {
    /// Whether the request committed.
    pub fn is_granted(&self) -> bool {
        matches!(self, Self::Granted(_))
    }

    /// The state report carried by either outcome.
    pub fn report(&self) -> &StateReport {
        match self {
            Self::Granted(report) => report,
            Self::Denied { report, .. } => report,
        }
    }
}

/// Snapshot of the system produced after every commit or rollback.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateReport {
    pub snapshot: LedgerSnapshot,
    /// Whether the reported state admits a completion order.
    pub safe: bool,
    /// Human-readable denial reason, set only when a request was refused.
    pub denial: Option<String>,
}

impl StateReport {
    /// Report for a committed operation.
    pub fn committed(snapshot: LedgerSnapshot, safe: bool) -> Self {
        Self { snapshot, safe, denial: None }
    }

    /// Report for a denied request. The snapshot is the rolled-back state,
    /// which was committed safe earlier.
    pub fn denied(snapshot: LedgerSnapshot, reason: DenialReason) -> Self {
        Self {
            snapshot,
            safe: true,
            denial: Some(reason.to_string()),
        }
    }
}

impl fmt::Display for StateReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Available resources:")?;
        for units in &self.snapshot.available {
            write!(f, " {units}")?;
        }
        writeln!(f)?;

        writeln!(f, "Resource allocation:")?;
        for (c, row) in self.snapshot.allocation.iter().enumerate() {
            write!(f, "Customer {c}:")?;
            for units in row {
                write!(f, " {units}")?;
            }
            writeln!(f)?;
        }

        writeln!(f, "Resource need:")?;
        for (c, row) in self.snapshot.need.iter().enumerate() {
            write!(f, "Customer {c}:")?;
            for units in row {
                write!(f, " {units}")?;
            }
            writeln!(f)?;
        }

        write!(f, "Safe: {}", if self.safe { "yes" } else { "no" })?;
        if let Some(reason) = &self.denial {
            write!(f, " (denied: {reason})")?;
        }
        Ok(())
    }
}

//-----------------------------------------------------------------------------
// Tests
//-----------------------------------------------------------------------------
