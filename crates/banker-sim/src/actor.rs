//! Customer tasks driving the request/release protocol
//!
//! Each customer alternates a random request and a random release for a
//! fixed number of cycles. Proposals are always drawn within the customer's
//! current need and allocation rows; that bound is load-bearing for the
//! protocol, which treats anything outside it as a caller defect.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::bank::Bank;
use crate::clock::SimClock;
use crate::error::SimulationResult;
use crate::ledger::Units;
use crate::randomness::SeededRng;
use crate::report::{DenialReason, Grant};

/// Source of request and release proposals for one customer.
///
/// Implementations must stay within the passed bound per resource kind.
#[cfg_attr(test, mockall::automock)]
pub trait DemandStrategy: Send {
    /// Propose a request bounded component-wise by `need`.
    fn next_request(&mut self, need: &[Units]) -> Vec<Units>;

    /// Propose a release bounded component-wise by `held`.
    fn next_release(&mut self, held: &[Units]) -> Vec<Units>;
}

/// Uniform random proposals in `[0, bound]` per resource kind.
#[derive(Debug)]
pub struct UniformDemand {
    rng: SeededRng,
}

impl UniformDemand {
    pub fn new(rng: SeededRng) -> Self {
        Self { rng }
    }

    fn draw(&mut self, bounds: &[Units]) -> Vec<Units> {
        bounds.iter().map(|&b| self.rng.gen_range(0..=b)).collect()
    }
}

impl DemandStrategy for UniformDemand {
    fn next_request(&mut self, need: &[Units]) -> Vec<Units> {
        self.draw(need)
    }

    fn next_release(&mut self, held: &[Units]) -> Vec<Units> {
        self.draw(held)
    }
}

/// Replays fixed proposal sequences; the deterministic driver for tests.
///
/// Exhausted scripts propose all-zero vectors. Scripted values are used as
/// given, so a script that ignores the passed bound will surface as an
/// invalid-amount error from the protocol.
#[derive(Debug, Default)]
pub struct ScriptedDemand {
    requests: VecDeque<Vec<Units>>,
    releases: VecDeque<Vec<Units>>,
}

impl ScriptedDemand {
    pub fn new(requests: Vec<Vec<Units>>, releases: Vec<Vec<Units>>) -> Self {
        Self {
            requests: requests.into(),
            releases: releases.into(),
        }
    }
}

impl DemandStrategy for ScriptedDemand {
    fn next_request(&mut self, need: &[Units]) -> Vec<Units> {
        self.requests.pop_front().unwrap_or_else(|| vec![0; need.len()])
    }

    fn next_release(&mut self, held: &[Units]) -> Vec<Units> {
        self.releases.pop_front().unwrap_or_else(|| vec![0; held.len()])
    }
}

/// Per-customer tallies accumulated over one run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerStats {
    pub granted: u32,
    pub denied_insufficient: u32,
    pub denied_unsafe: u32,
    pub released: u32,
}

/// One customer task.
pub struct Customer<S> {
    id: usize,
    bank: Arc<Bank>,
    strategy: S,
    clock: SimClock,
    pause: Duration,
}

impl<S: DemandStrategy> Customer<S> {
    pub fn new(
        id: usize,
        bank: Arc<Bank>,
        strategy: S,
        clock: SimClock,
        pause: Duration,
    ) -> Self {
        Self { id, bank, strategy, clock, pause }
    }

    /// Run `cycles` request/release rounds against the bank.
    ///
    /// Each round re-reads the customer's need and allocation rows so the
    /// next proposal is bounded by current state, not by a stale copy. A
    /// denied request is not retried; the customer moves on to its next
    /// scheduled action.
    pub async fn run(mut self, cycles: u32) -> SimulationResult<CustomerStats> {
        let mut stats = CustomerStats::default();
        for cycle in 0..cycles {
            let need = self.bank.need_of(self.id)?;
            let amount = self.strategy.next_request(&need);
            debug!(customer = self.id, cycle, ?amount, "submitting request");
            match self.bank.request(self.id, &amount)? {
                Grant::Granted(report) => {
                    stats.granted += 1;
                    debug!(customer = self.id, state = %report, "ledger after grant");
                }
                Grant::Denied { reason: DenialReason::Insufficient, .. } => {
                    stats.denied_insufficient += 1;
                }
                Grant::Denied { reason: DenialReason::Unsafe, .. } => {
                    stats.denied_unsafe += 1;
                }
            }
            self.clock.pause(self.pause).await;

            let held = self.bank.held_by(self.id)?;
            let amount = self.strategy.next_release(&held);
            debug!(customer = self.id, cycle, ?amount, "submitting release");
            let report = self.bank.release(self.id, &amount)?;
            debug!(customer = self.id, state = %report, "ledger after release");
            stats.released += 1;
            self.clock.pause(self.pause).await;
        }
        Ok(stats)
    }
}

//-----------------------------------------------------------------------------
// Tests
//-----------------------------------------------------------------------------
