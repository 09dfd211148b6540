/// Decides on which ticks telemetry is re-fetched, independent of redraw rate.
#[derive(Debug, Clone)]
pub struct RefreshController {
    period_ticks: u64,
    last_refresh_tick: Option<u64>,
    forced: bool,
}

impl RefreshController {
    pub fn new(period_ticks: u64) -> Self {
        Self {
            period_ticks,
            last_refresh_tick: None,
            forced: false,
        }
    }

    pub fn period_ticks(&self) -> u64 {
        self.period_ticks
    }

    pub fn last_refresh_tick(&self) -> Option<u64> {
        self.last_refresh_tick
    }

    /// The first tick is always due so the dashboard never starts blank.
    pub fn is_due(&self, tick: u64) -> bool {
        if self.forced {
            return true;
        }
        match self.last_refresh_tick {
            None => true,
            Some(last) => tick.saturating_sub(last) >= self.period_ticks,
        }
    }

    /// Returns whether `tick` should refresh and, if so, records it.
    pub fn poll(&mut self, tick: u64) -> bool {
        if !self.is_due(tick) {
            return false;
        }
        self.last_refresh_tick = Some(tick);
        self.forced = false;
        true
    }

    /// Make the next poll fire regardless of the period. Stays pending until
    /// a poll consumes it.
    pub fn force(&mut self) {
        self.forced = true;
    }

    pub fn is_forced(&self) -> bool {
        self.forced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fires_on_first_tick_then_every_period() {
        let mut controller = RefreshController::new(20);
        let fired: Vec<u64> = (0..=60).filter(|&t| controller.poll(t)).collect();
        assert_eq!(fired, vec![0, 20, 40, 60]);
    }

    #[test]
    fn first_tick_fires_even_when_counter_starts_late() {
        let mut controller = RefreshController::new(20);
        assert!(controller.poll(7));
        assert!(!controller.poll(8));
        assert!(controller.poll(27));
        assert_eq!(controller.last_refresh_tick(), Some(27));
    }

    #[test]
    fn force_fires_next_tick_and_restarts_period() {
        let mut controller = RefreshController::new(20);
        assert!(controller.poll(0));
        controller.force();
        assert!(controller.poll(5));
        assert!(!controller.poll(20));
        assert!(controller.poll(25));
    }

    #[test]
    fn force_survives_until_polled() {
        let mut controller = RefreshController::new(20);
        assert!(controller.poll(0));
        controller.force();
        assert!(controller.is_forced());
        assert!(controller.is_due(3));
        assert!(controller.is_due(4));
        assert!(controller.poll(4));
        assert!(!controller.is_forced());
        assert!(!controller.poll(5));
    }

    #[test]
    fn is_due_does_not_record() {
        let controller = RefreshController::new(20);
        assert!(controller.is_due(0));
        assert!(controller.is_due(0));
        assert_eq!(controller.last_refresh_tick(), None);
    }

    #[test]
    fn zero_period_fires_every_tick() {
        let mut controller = RefreshController::new(0);
        assert!((0..5).all(|t| controller.poll(t)));
    }
}
