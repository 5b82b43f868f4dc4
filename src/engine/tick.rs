use std::time::{Duration, Instant};

/// Self-rescheduling timer for the periodic save pass.
///
/// The next deadline is taken from the moment a pass *finished*, so a slow
/// pass pushes the following one back instead of overlapping it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepeatingTimer {
    interval: Duration,
    next_due: Option<Instant>,
}

impl RepeatingTimer {
    /// Creates a timer that is due one interval after `now`.
    ///
    /// An interval too large to be represented as an `Instant` leaves the timer unarmed.
    pub fn started(interval: Duration, now: Instant) -> Self {
        Self {
            interval,
            next_due: now.checked_add(interval),
        }
    }

    pub fn is_armed(&self) -> bool {
        self.next_due.is_some()
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.next_due.map_or(false, |due| now >= due)
    }

    pub fn reschedule(&mut self, finished_at: Instant) {
        if self.next_due.is_some() {
            self.next_due = finished_at.checked_add(self.interval);
        }
    }

    pub fn cancel(&mut self) {
        self.next_due = None;
    }

    /// Time left until the deadline, zero when overdue, `None` when cancelled.
    pub fn time_until(&self, now: Instant) -> Option<Duration> {
        self.next_due.map(|due| due.saturating_duration_since(now))
    }
}

// A tick result tells the host what the periodic trigger did and when to tick again
#[derive(Default, Debug, Clone, PartialEq, Eq)]
pub struct TickResult {
    /// Did this tick run a save pass
    pub saved: bool,
    /// When the next tick is needed, `None` when no periodic save is scheduled
    pub next_tick_in: Option<Duration>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn due_after_one_interval() {
        let t0 = Instant::now();
        let timer = RepeatingTimer::started(Duration::from_secs(5), t0);

        assert!(timer.is_armed());
        assert!(!timer.is_due(t0));
        assert!(!timer.is_due(t0 + Duration::from_secs(4)));
        assert!(timer.is_due(t0 + Duration::from_secs(5)));
        assert_eq!(timer.time_until(t0 + Duration::from_secs(2)), Some(Duration::from_secs(3)));
        assert_eq!(timer.time_until(t0 + Duration::from_secs(9)), Some(Duration::ZERO));
    }

    #[test]
    fn reschedule_counts_from_the_end_of_the_pass() {
        let t0 = Instant::now();
        let mut timer = RepeatingTimer::started(Duration::from_secs(5), t0);

        // pass started at t0+5 and took 2 seconds
        let finished = t0 + Duration::from_secs(7);
        timer.reschedule(finished);
        assert!(!timer.is_due(t0 + Duration::from_secs(10)));
        assert!(timer.is_due(t0 + Duration::from_secs(12)));
    }

    #[test]
    fn unrepresentable_deadline_is_never_due() {
        let t0 = Instant::now();
        let mut timer = RepeatingTimer::started(Duration::from_secs(u64::MAX), t0);
        assert!(!timer.is_armed());
        assert!(!timer.is_due(t0 + Duration::from_secs(3600)));

        let mut short = RepeatingTimer::started(Duration::from_secs(1), t0);
        short.interval = Duration::MAX;
        short.reschedule(t0);
        assert!(!short.is_armed());
        timer.reschedule(t0);
        assert_eq!(timer.time_until(t0), None);
    }

    #[test]
    fn cancelled_timer_stays_cancelled() {
        let t0 = Instant::now();
        let mut timer = RepeatingTimer::started(Duration::from_secs(1), t0);
        timer.cancel();
        timer.reschedule(t0);

        assert!(!timer.is_armed());
        assert!(!timer.is_due(t0 + Duration::from_secs(60)));
        assert_eq!(timer.time_until(t0), None);
    }
}
