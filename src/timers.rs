use std::time::Duration;

/// Fixed-step accumulator. Feed it real elapsed time, then drain due steps
/// one at a time so the period can change between steps.
#[derive(Clone, Debug)]
pub(crate) struct Ticker {
    period: Duration,
    accum: Duration,
}

impl Ticker {
    pub(crate) fn new(period: Duration) -> Self {
        Self {
            period,
            accum: Duration::ZERO,
        }
    }

    pub(crate) fn set_period(&mut self, period: Duration) {
        self.period = period;
    }

    pub(crate) fn reset(&mut self) {
        self.accum = Duration::ZERO;
    }

    pub(crate) fn feed(&mut self, dt: Duration) {
        self.accum = self.accum.saturating_add(dt);
    }

    pub(crate) fn try_fire(&mut self) -> bool {
        if self.period.is_zero() || self.accum < self.period {
            return false;
        }
        self.accum -= self.period;
        true
    }
}

struct Entry<T> {
    due: Duration,
    seq: u64,
    item: T,
}

/// One-shot timers on the same clock as the tickers.
pub(crate) struct Deferred<T> {
    now: Duration,
    seq: u64,
    queue: Vec<Entry<T>>,
}

impl<T> Default for Deferred<T> {
    fn default() -> Self {
        Self {
            now: Duration::ZERO,
            seq: 0,
            queue: Vec::new(),
        }
    }
}

impl<T> Deferred<T> {
    pub(crate) fn schedule(&mut self, after: Duration, item: T) {
        self.seq += 1;
        self.queue.push(Entry {
            due: self.now.saturating_add(after),
            seq: self.seq,
            item,
        });
    }

    /// Moves the clock forward and returns everything that came due, oldest
    /// deadline first.
    pub(crate) fn advance(&mut self, dt: Duration) -> Vec<T> {
        self.now = self.now.saturating_add(dt);
        let now = self.now;
        let (mut due, pending): (Vec<_>, Vec<_>) =
            std::mem::take(&mut self.queue).into_iter().partition(|e| e.due <= now);
        self.queue = pending;
        due.sort_by_key(|e| (e.due, e.seq));
        due.into_iter().map(|e| e.item).collect()
    }

    #[cfg(test)]
    pub(crate) fn len(&self) -> usize {
        self.queue.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ticker_fires_once_per_period_and_keeps_remainder() {
        let mut t = Ticker::new(Duration::from_millis(200));
        t.feed(Duration::from_millis(450));
        assert!(t.try_fire());
        assert!(t.try_fire());
        assert!(!t.try_fire());
        t.feed(Duration::from_millis(150));
        assert!(t.try_fire());
    }

    #[test]
    fn ticker_period_change_applies_to_next_step() {
        let mut t = Ticker::new(Duration::from_millis(200));
        t.feed(Duration::from_millis(300));
        assert!(t.try_fire());
        t.set_period(Duration::from_millis(80));
        assert!(t.try_fire());
        assert!(!t.try_fire());
        t.reset();
        t.feed(Duration::from_millis(79));
        assert!(!t.try_fire());
    }

    #[test]
    fn deferred_releases_in_deadline_order() {
        let mut d = Deferred::default();
        d.schedule(Duration::from_millis(300), "late");
        d.schedule(Duration::from_millis(100), "early");
        d.schedule(Duration::from_millis(100), "early-second");

        assert!(d.advance(Duration::from_millis(99)).is_empty());
        assert_eq!(d.advance(Duration::from_millis(1)), vec!["early", "early-second"]);
        assert_eq!(d.len(), 1);
        assert_eq!(d.advance(Duration::from_secs(5)), vec!["late"]);
        assert_eq!(d.len(), 0);
    }
}
