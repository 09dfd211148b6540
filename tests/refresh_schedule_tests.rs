use dtop::refresh::RefreshController;
use proptest::prelude::*;

proptest! {
    #[test]
    fn fires_exactly_on_period_multiples(period in 1u64..200, horizon in 0u64..5_000) {
        let mut controller = RefreshController::new(period);
        for tick in 0..=horizon {
            prop_assert_eq!(controller.poll(tick), tick % period == 0, "tick {}", tick);
        }
    }

    #[test]
    fn zero_period_fires_every_tick(horizon in 0u64..1_000) {
        let mut controller = RefreshController::new(0);
        for tick in 0..=horizon {
            prop_assert!(controller.poll(tick));
        }
    }

    #[test]
    fn gap_between_fires_is_at_least_the_period(
        period in 1u64..100,
        ticks in prop::collection::btree_set(0u64..10_000, 1..300),
    ) {
        // Sparse ticks model a loop that skipped some because it was busy.
        let mut controller = RefreshController::new(period);
        let mut last = None;
        for &tick in &ticks {
            if controller.poll(tick) {
                if let Some(prev) = last {
                    prop_assert!(tick - prev >= period);
                }
                last = Some(tick);
            }
        }
        prop_assert!(last.is_some());
    }

    #[test]
    fn force_fires_on_next_poll(period in 1u64..100, at in 0u64..1_000) {
        let mut controller = RefreshController::new(period);
        prop_assert!(controller.poll(0));
        controller.force();
        prop_assert!(controller.poll(at));
        prop_assert_eq!(controller.last_refresh_tick(), Some(at));
    }
}
