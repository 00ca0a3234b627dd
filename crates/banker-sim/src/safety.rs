//! Safety check over a ledger snapshot
//!
//! The classic Banker's safety test: a state is safe when there exists at
//! least one order in which every customer can obtain its maximum demand and
//! finish. Operates purely on a [`LedgerSnapshot`]; the live ledger is never
//! touched.

use crate::ledger::{LedgerSnapshot, Units};

/// Find an order in which every customer can run to completion from `snap`.
///
/// Starts from the available vector and repeatedly scans customers in index
/// order, retiring any unfinished customer whose remaining need fits within
/// the working pool and folding that customer's allocation back in. A single
/// pass may retire several customers; the scan stops when a full pass retires
/// none. Returns the completion order found, or `None` when the unfinished
/// set can never proceed. O(customers² × resource kinds).
pub fn safe_sequence(snap: &LedgerSnapshot) -> Option<Vec<usize>> {
    let customers = snap.customers();
    let mut work: Vec<Units> = snap.available.clone();
    let mut finish = vec![false; customers];
    let mut order = Vec::with_capacity(customers);

    while order.len() < customers {
        let mut advanced = false;
        for c in 0..customers {
            if finish[c] || !fits(&snap.need[c], &work) {
                continue;
            }
            for (w, held) in work.iter_mut().zip(&snap.allocation[c]) {
                *w += held;
            }
            finish[c] = true;
            order.push(c);
            advanced = true;
        }
        if !advanced {
            return None;
        }
    }
    Some(order)
}

/// Whether `snap` admits any completion order.
pub fn is_safe(snap: &LedgerSnapshot) -> bool {
    safe_sequence(snap).is_some()
}

fn fits(need: &[Units], work: &[Units]) -> bool {
    need.iter().zip(work).all(|(n, w)| n <= w)
}

//-----------------------------------------------------------------------------
// Tests
//-----------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    // Five customers, three resource kinds, the classic textbook instance.
    fn textbook_snapshot(available: Vec<Units>) -> LedgerSnapshot {
        let maximum = [
            [7, 5, 3],
            [3, 2, 2],
            [9, 0, 2],
            [2, 2, 2],
            [4, 3, 3],
        ];
        let allocation = vec![
            vec![0, 1, 0],
            vec![2, 0, 0],
            vec![3, 0, 2],
            vec![2, 1, 1],
            vec![0, 0, 2],
        ];
        let need = maximum
            .iter()
            .zip(&allocation)
            .map(|(max_row, alloc_row)| {
                max_row.iter().zip(alloc_row).map(|(m, a)| m - a).collect()
            })
            .collect();
        LedgerSnapshot { allocation, need, available }
    }

    /// Replay `order` against the snapshot, checking the component-wise
    /// admission test at every step.
    fn is_valid_order(snap: &LedgerSnapshot, order: &[usize]) -> bool {
        let mut work = snap.available.clone();
        let mut seen = vec![false; snap.customers()];
        for &c in order {
            if seen[c] || !snap.need[c].iter().zip(&work).all(|(n, w)| n <= w) {
                return false;
            }
            for (w, held) in work.iter_mut().zip(&snap.allocation[c]) {
                *w += held;
            }
            seen[c] = true;
        }
        seen.iter().all(|&s| s)
    }

    #[test]
    fn test_textbook_state_is_safe() {
        let snap = textbook_snapshot(vec![3, 3, 2]);
        let order = safe_sequence(&snap).expect("textbook state must be safe");

        assert!(is_valid_order(&snap, &order));
        // The index-order scan retires 1, 3, 4 on the first pass and 0, 2
        // on the second.
        assert_eq!(order, vec![1, 3, 4, 0, 2]);
    }

    #[test]
    fn test_drained_pool_is_unsafe() {
        let snap = textbook_snapshot(vec![0, 0, 0]);
        assert_eq!(safe_sequence(&snap), None);
        assert!(!is_safe(&snap));
    }

    #[test]
    fn test_zero_need_is_safe_with_empty_pool() {
        let snap = LedgerSnapshot {
            allocation: vec![vec![2, 1], vec![0, 3]],
            need: vec![vec![0, 0], vec![0, 0]],
            available: vec![0, 0],
        };
        assert_eq!(safe_sequence(&snap), Some(vec![0, 1]));
    }

    #[test]
    fn test_single_customer() {
        let snap = LedgerSnapshot {
            allocation: vec![vec![1]],
            need: vec![vec![2]],
            available: vec![2],
        };
        assert_eq!(safe_sequence(&snap), Some(vec![0]));

        let snap = LedgerSnapshot {
            allocation: vec![vec![1]],
            need: vec![vec![3]],
            available: vec![2],
        };
        assert!(!is_safe(&snap));
    }

    #[test]
    fn test_second_pass_retires_late_finisher() {
        // Customer 0 only fits after customer 1 returns its allocation.
        let snap = LedgerSnapshot {
            allocation: vec![vec![0], vec![3]],
            need: vec![vec![4], vec![1]],
            available: vec![1],
        };
        assert_eq!(safe_sequence(&snap), Some(vec![1, 0]));
    }
}
