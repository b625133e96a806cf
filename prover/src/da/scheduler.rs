//! Drift-free cycle arithmetic.
//!
//! A cycle is `interval + period` seconds long and starts at a boundary
//! `last + k * cycle`. Proving happens once the interval of the current
//! cycle has elapsed. Re-aligning `last` from the remainder, instead of
//! adding sleep durations, keeps boundaries fixed however late the loop
//! wakes up.

/// Result of one scheduling step.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct CycleStep {
    /// Seconds to sleep before proving (0 = proceed now)
    pub wait_secs: i64,
    /// Start of the cycle the round belongs to
    pub last: i64,
    /// Start of the following cycle
    pub next: i64,
}

/// Compute the wait and the aligned cycle boundaries.
///
/// `%` is the truncated remainder, so a clock behind `last` yields a
/// negative remainder and a wait that ends at `last + interval`.
pub fn schedule_step(now: i64, last: i64, interval: i64, period: i64) -> CycleStep {
    let cycle = interval + period;
    let elapsed = now - last;
    let over = elapsed.checked_rem(cycle).unwrap_or(0);

    let wait_secs = if over < interval { interval - over } else { 0 };
    let last = last + elapsed - over;

    CycleStep {
        wait_secs,
        last,
        next: last + cycle,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INTERVAL: i64 = 600;
    const PERIOD: i64 = 3000;

    #[test]
    fn test_waits_out_interval_at_cycle_start() {
        let step = schedule_step(10_000, 10_000, INTERVAL, PERIOD);
        assert_eq!(
            step,
            CycleStep {
                wait_secs: 600,
                last: 10_000,
                next: 13_600
            }
        );
    }

    #[test]
    fn test_proceeds_inside_period() {
        let step = schedule_step(11_000, 10_000, INTERVAL, PERIOD);
        assert_eq!(step.wait_secs, 0);
        assert_eq!(step.last, 10_000);
        assert_eq!(step.next, 13_600);
    }

    #[test]
    fn test_realigns_after_missed_cycles() {
        // Two full cycles and 100s later: inside the interval of cycle 3.
        let step = schedule_step(10_000 + 2 * 3_600 + 100, 10_000, INTERVAL, PERIOD);
        assert_eq!(step.wait_secs, 500);
        assert_eq!(step.last, 17_200);
        assert_eq!(step.next, 20_800);
    }

    #[test]
    fn test_clock_behind_last() {
        // After a successful round `last` is the next boundary, which is
        // still in the future.
        let step = schedule_step(13_000, 13_600, INTERVAL, PERIOD);
        assert_eq!(step.wait_secs, 1_200);
        assert_eq!(step.last, 13_600);
        assert_eq!(step.next, 17_200);
    }

    #[test]
    fn test_boundaries_do_not_drift() {
        let mut last = 0;
        for k in 1..50i64 {
            // Wake up late by a varying amount each cycle.
            let now = last + INTERVAL + (k * 37) % PERIOD;
            let step = schedule_step(now, last, INTERVAL, PERIOD);
            assert_eq!(step.last % (INTERVAL + PERIOD), 0);
            last = step.next;
        }
        assert_eq!(last, 50 * (INTERVAL + PERIOD) - (INTERVAL + PERIOD));
    }

    #[test]
    fn test_zero_cycle_does_not_panic() {
        let step = schedule_step(5, 0, 0, 0);
        assert_eq!(step.wait_secs, 0);
    }
}
