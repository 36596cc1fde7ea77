//! Property tests for countdown monotonicity and alert uniqueness.

use bosswatch_core::timer::TickOutcome;
use bosswatch_core::{SlotState, TickScheduler, TimerRegistry};
use proptest::prelude::*;

const THRESHOLD: u32 = 300;

fn registry() -> TimerRegistry {
    TimerRegistry::new(&["Subora".to_string(), "Ultumuno".to_string()], 8)
}

proptest! {
    #[test]
    fn remaining_drops_by_one_per_pass(duration in 1u32..5000, passes in 0usize..6000) {
        let mut reg = registry();
        let mut sched = TickScheduler::new();
        let id = reg.resolve("Ultumuno", 6).unwrap();
        reg.slot_mut(id).arm(duration);
        sched.arm(id);

        let mut previous = reg.slot(id).remaining_secs();
        for _ in 0..passes {
            let was_counting = reg.slot(id).is_counting();
            sched.pass(&mut reg, THRESHOLD);
            let now = reg.slot(id).remaining_secs();
            if was_counting {
                prop_assert_eq!(now, previous - 1);
            } else {
                prop_assert_eq!(now, 0);
            }
            previous = now;
        }

        let expected_state = if passes >= duration as usize {
            SlotState::Expired
        } else {
            SlotState::Counting
        };
        prop_assert_eq!(reg.slot(id).state(), expected_state);
    }

    #[test]
    fn alert_fires_at_most_once_per_cycle(duration in 1u32..2000, rearm_after in 0usize..2000) {
        let mut reg = registry();
        let mut sched = TickScheduler::new();
        let id = reg.resolve("Subora", 0).unwrap();
        reg.slot_mut(id).arm(duration);
        sched.arm(id);

        let mut alerts = 0;
        for _ in 0..rearm_after.min(duration as usize) {
            for (_, outcome) in sched.pass(&mut reg, THRESHOLD) {
                alerts += usize::from(outcome == TickOutcome::Alerted);
            }
        }
        prop_assert!(alerts <= 1);

        // A fresh kill starts a new cycle with its own alert.
        reg.slot_mut(id).arm(duration);
        sched.arm(id);
        prop_assert!(!reg.slot(id).alerted());
        let mut second_cycle = 0;
        for _ in 0..duration {
            for (_, outcome) in sched.pass(&mut reg, THRESHOLD) {
                second_cycle += usize::from(outcome == TickOutcome::Alerted);
            }
        }
        prop_assert_eq!(second_cycle, usize::from(duration > THRESHOLD));
        prop_assert_eq!(reg.slot(id).state(), SlotState::Expired);
    }
}
