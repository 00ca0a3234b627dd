//! Request/release protocol over the shared ledger
//!
//! All mutation funnels through [`Bank::request`] and [`Bank::release`].
//! For a request, the tentative apply, the snapshot, the safety check, and
//! the commit-or-rollback all happen under one lock acquisition, so every
//! other customer observes only committed, safe states.

use std::sync::Mutex;

use tracing::{debug, info, warn};

use crate::config::SimulationConfig;
use crate::error::{SimulationError, SimulationResult};
use crate::ledger::{Ledger, LedgerSnapshot, Units};
use crate::report::{DenialReason, Grant, StateReport};
use crate::safety::is_safe;

/// The resource manager: a ledger behind a single exclusive lock.
#[derive(Debug)]
pub struct Bank {
    ledger: Mutex<Ledger>,
}

impl Bank {
    /// Build the shared ledger from a configuration.
    ///
    /// The configured starting state must itself admit a completion order:
    /// every quiescent state is required to be safe, including the first,
    /// and no sequence of grants could restore safety to a state that never
    /// had it.
    pub fn new(config: &SimulationConfig) -> SimulationResult<Self> {
        let ledger = Ledger::new(config)?;
        if !is_safe(&ledger.snapshot()) {
            return Err(SimulationError::Configuration(
                "initial state has no safe completion order".into(),
            ));
        }
        Ok(Self { ledger: Mutex::new(ledger) })
    }

    /// Ask for `amount` units on behalf of `customer`.
    ///
    /// The amount must satisfy `0 <= amount[r] <= need[customer][r]` for
    /// every kind; anything else is a [`SimulationError::InvalidAmount`]
    /// caller defect and leaves the ledger untouched. Within bounds, the
    /// outcome is a [`Grant`]: denied fast when the pool cannot cover the
    /// amount, denied after rollback when the tentative grant fails the
    /// safety check, committed otherwise.
    pub fn request(&self, customer: usize, amount: &[Units]) -> SimulationResult<Grant> {
        let mut ledger = self.ledger.lock().unwrap();
        check_customer(&ledger, customer)?;
        check_amount(customer, amount, ledger.need_row(customer), "need")?;

        // Fast path: the units simply are not there. Distinct from
        // unsafety; the safety check never runs.
        if amount.iter().zip(ledger.available()).any(|(a, avail)| a > avail) {
            debug!(customer, ?amount, "request denied: insufficient units");
            let report = StateReport::denied(ledger.snapshot(), DenialReason::Insufficient);
            return Ok(Grant::Denied { reason: DenialReason::Insufficient, report });
        }

        // Tentative grant, then ask whether the new state still admits a
        // completion order.
        ledger.apply_delta(customer, amount);
        let snapshot = ledger.snapshot();
        if is_safe(&snapshot) {
            info!(customer, ?amount, "request granted");
            return Ok(Grant::Granted(StateReport::committed(snapshot, true)));
        }

        // Roll the tentative grant back before the lock is released.
        let reverse: Vec<Units> = amount.iter().map(|a| -a).collect();
        ledger.apply_delta(customer, &reverse);
        debug!(customer, ?amount, "request denied: would produce unsafe state");
        let report = StateReport::denied(ledger.snapshot(), DenialReason::Unsafe);
        Ok(Grant::Denied { reason: DenialReason::Unsafe, report })
    }

    /// Return `amount` units held by `customer` to the pool.
    ///
    /// The amount must satisfy `0 <= amount[r] <= allocation[customer][r]`
    /// for every kind and is validated in full before any mutation. A
    /// release only ever returns units to the pool, so it applies
    /// unconditionally; safety is re-evaluated afterwards purely for the
    /// report's diagnostic flag.
    pub fn release(&self, customer: usize, amount: &[Units]) -> SimulationResult<StateReport> {
        let mut ledger = self.ledger.lock().unwrap();
        check_customer(&ledger, customer)?;
        check_amount(customer, amount, ledger.allocation_row(customer), "allocation")?;

        let reverse: Vec<Units> = amount.iter().map(|a| -a).collect();
        ledger.apply_delta(customer, &reverse);
        let snapshot = ledger.snapshot();
        let safe = is_safe(&snapshot);
        if !safe {
            warn!(customer, ?amount, "ledger reports unsafe after a release");
        }
        info!(customer, ?amount, "release applied");
        Ok(StateReport::committed(snapshot, safe))
    }

    /// Copy of the current state, for reporting outside the protocol.
    pub fn snapshot(&self) -> LedgerSnapshot {
        self.ledger.lock().unwrap().snapshot()
    }

    /// Per-kind totals fixed at initialization.
    pub fn total_units(&self) -> Vec<Units> {
        self.ledger.lock().unwrap().total_units().to_vec()
    }

    /// Current remaining need row for one customer; bounds the next request.
    pub fn need_of(&self, customer: usize) -> SimulationResult<Vec<Units>> {
        let ledger = self.ledger.lock().unwrap();
        check_customer(&ledger, customer)?;
        Ok(ledger.need_row(customer).to_vec())
    }

    /// Current allocation row for one customer; bounds the next release.
    pub fn held_by(&self, customer: usize) -> SimulationResult<Vec<Units>> {
        let ledger = self.ledger.lock().unwrap();
        check_customer(&ledger, customer)?;
        Ok(ledger.allocation_row(customer).to_vec())
    }
}

fn check_customer(ledger: &Ledger, customer: usize) -> SimulationResult<()> {
    if customer >= ledger.customers() {
        return Err(SimulationError::InvalidAmount {
            customer,
            detail: format!("no such customer (ledger holds {})", ledger.customers()),
        });
    }
    Ok(())
}

fn check_amount(
    customer: usize,
    amount: &[Units],
    bound: &[Units],
    bound_name: &str,
) -> SimulationResult<()> {
    if amount.len() != bound.len() {
        return Err(SimulationError::InvalidAmount {
            customer,
            detail: format!(
                "amount has {} entries, expected {}",
                amount.len(),
                bound.len()
            ),
        });
    }
    for (r, (a, b)) in amount.iter().zip(bound).enumerate() {
        if *a < 0 || a > b {
            return Err(SimulationError::InvalidAmount {
                customer,
                detail: format!("amount {a} for resource {r} outside 0..={b} ({bound_name})"),
            });
        }
    }
    Ok(())
}

//-----------------------------------------------------------------------------
// Tests
//-----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // The classic five-customer, three-resource instance.
    fn textbook_config() -> SimulationConfig {
        SimulationConfig::new(
            vec![
                vec![7, 5, 3],
                vec![3, 2, 2],
                vec![9, 0, 2],
                vec![2, 2, 2],
                vec![4, 3, 3],
            ],
            vec![3, 3, 2],
        )
        .with_allocation(vec![
            vec![0, 1, 0],
            vec![2, 0, 0],
            vec![3, 0, 2],
            vec![2, 1, 1],
            vec![0, 0, 2],
        ])
    }

    #[test]
    fn test_unsafe_initial_state_rejected() {
        let mut config = textbook_config();
        config.available = vec![0, 0, 0];

        let err = Bank::new(&config).unwrap_err();
        assert!(matches!(err, SimulationError::Configuration(_)));
        assert!(err.to_string().contains("no safe completion order"));
    }

    #[test]
    fn test_safe_request_commits() {
        let bank = Bank::new(&textbook_config()).unwrap();

        let grant = bank.request(1, &[1, 0, 2]).unwrap();
        assert!(grant.is_granted());

        let report = grant.report();
        assert!(report.safe);
        assert_eq!(report.snapshot.available, vec![2, 3, 0]);
        assert_eq!(report.snapshot.allocation[1], vec![3, 0, 2]);
        assert_eq!(report.snapshot.need[1], vec![0, 2, 0]);
    }

    #[test]
    fn test_insufficient_request_denied_fast_without_mutation() {
        let bank = Bank::new(&textbook_config()).unwrap();
        let before = bank.snapshot();

        // Customer 0 may still need up to [7, 4, 3]; only [3, 3, 2] exists.
        let grant = bank.request(0, &[4, 0, 0]).unwrap();
        match grant {
            Grant::Denied { reason, report } => {
                assert_eq!(reason, DenialReason::Insufficient);
                assert_eq!(report.snapshot, before);
            }
            Grant::Granted(_) => panic!("request beyond available must not commit"),
        }
        assert_eq!(bank.snapshot(), before);
    }

    #[test]
    fn test_unsafe_request_rolled_back() {
        let bank = Bank::new(&textbook_config()).unwrap();
        let before = bank.snapshot();

        // Within customer 4's need and within available, but draining the
        // pool to [0, 0, 2] leaves no customer able to finish.
        let grant = bank.request(4, &[3, 3, 0]).unwrap();
        match grant {
            Grant::Denied { reason, report } => {
                assert_eq!(reason, DenialReason::Unsafe);
                assert_eq!(report.denial.as_deref(), Some("would produce unsafe state"));
                assert_eq!(report.snapshot, before);
            }
            Grant::Granted(_) => panic!("jointly infeasible request must not commit"),
        }
        assert_eq!(bank.snapshot(), before);
    }

    #[test]
    fn test_request_over_need_is_caller_defect() {
        let bank = Bank::new(&textbook_config()).unwrap();
        let before = bank.snapshot();

        // Customer 3 needs at most [0, 1, 1].
        let err = bank.request(3, &[1, 0, 0]).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidAmount { customer: 3, .. }));
        assert_eq!(bank.snapshot(), before);

        let err = bank.request(3, &[0, -1, 0]).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidAmount { .. }));
        assert_eq!(bank.snapshot(), before);

        let err = bank.request(3, &[0, 1]).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidAmount { .. }));
        assert_eq!(bank.snapshot(), before);

        let err = bank.request(9, &[0, 0, 0]).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidAmount { customer: 9, .. }));
    }

    #[test]
    fn test_release_returns_units_and_reports_safe() {
        let bank = Bank::new(&textbook_config()).unwrap();

        let report = bank.release(2, &[1, 0, 2]).unwrap();
        assert!(report.safe);
        assert_eq!(report.snapshot.available, vec![4, 3, 4]);
        assert_eq!(report.snapshot.allocation[2], vec![2, 0, 0]);
        assert_eq!(report.snapshot.need[2], vec![7, 0, 2]);
    }

    #[test]
    fn test_release_over_allocation_is_caller_defect() {
        let bank = Bank::new(&textbook_config()).unwrap();
        let before = bank.snapshot();

        // Customer 0 holds [0, 1, 0].
        let err = bank.release(0, &[1, 0, 0]).unwrap_err();
        assert!(matches!(err, SimulationError::InvalidAmount { customer: 0, .. }));
        assert_eq!(bank.snapshot(), before);
    }

    #[test]
    fn test_row_accessors_track_state() {
        let bank = Bank::new(&textbook_config()).unwrap();
        assert_eq!(bank.need_of(1).unwrap(), vec![1, 2, 2]);
        assert_eq!(bank.held_by(1).unwrap(), vec![2, 0, 0]);

        bank.request(1, &[1, 0, 2]).unwrap();
        assert_eq!(bank.need_of(1).unwrap(), vec![0, 2, 0]);
        assert_eq!(bank.held_by(1).unwrap(), vec![3, 0, 2]);

        assert!(bank.need_of(7).is_err());
    }
}
