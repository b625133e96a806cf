//! Property-based tests for the cycle scheduler.
//!
//! Tests the following invariants:
//! - SCHED-1: Cycle starts stay on the grid `last + k * cycle`
//! - SCHED-2: Proving starts exactly at `cycle_start + interval` or later
//! - SCHED-3: Repeated rounds never drift, however late the loop wakes

use crate::strategies::*;
use da_prover::da::scheduler::schedule_step;
use proptest::prelude::*;

proptest! {
    #![proptest_config(ProptestConfig::with_cases(512))]

    /// SCHED-1: The aligned cycle start is on the grid and not after now.
    #[test]
    fn prop_cycle_start_on_grid(
        (interval, period) in cycle_strategy(),
        last in 0i64..2_000_000_000,
        elapsed in 0i64..100_000_000,
    ) {
        let cycle = interval + period;
        let step = schedule_step(last + elapsed, last, interval, period);
        prop_assert_eq!((step.last - last) % cycle, 0);
        prop_assert!(step.last <= last + elapsed);
        prop_assert!(last + elapsed < step.last + cycle);
        prop_assert_eq!(step.next, step.last + cycle);
    }

    /// SCHED-2: After the wait, the clock is at or past the end of the interval.
    #[test]
    fn prop_wait_ends_after_interval(
        (interval, period) in cycle_strategy(),
        last in 0i64..2_000_000_000,
        elapsed in 0i64..100_000_000,
    ) {
        let now = last + elapsed;
        let step = schedule_step(now, last, interval, period);
        prop_assert!(step.wait_secs >= 0);
        if step.wait_secs > 0 {
            prop_assert_eq!(now + step.wait_secs, step.last + interval);
        } else {
            prop_assert!(now >= step.last + interval);
        }
    }

    /// SCHED-3: Following `next` across many late wake-ups stays on the grid.
    #[test]
    fn prop_no_drift_over_rounds(
        (interval, period) in cycle_strategy(),
        origin in 0i64..1_000_000_000,
        delays in prop::collection::vec(0i64..1_000_000, 1..20),
    ) {
        let cycle = interval + period;
        let mut last = origin;
        for delay in delays {
            let step = schedule_step(last + delay, last, interval, period);
            prop_assert_eq!((step.last - origin) % cycle, 0);
            last = step.next;
        }
    }
}
