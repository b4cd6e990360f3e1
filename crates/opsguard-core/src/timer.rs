use std::collections::BTreeMap;
use std::time::Duration;

/// Timers cancelled together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lineage {
    /// Repeating loop trigger and delayed start.
    Loop,
    /// One-shot phase callbacks of the current run.
    Phase,
    /// Self-rescheduling timeline chain.
    Timeline,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    lineage: Lineage,
    action: T,
}

/// Deadline-ordered set of pending callbacks. Equal deadlines fire in
/// scheduling order.
#[derive(Debug, Clone)]
pub struct TimerQueue<T> {
    next_seq: u64,
    pending: BTreeMap<(Duration, u64), Pending<T>>,
}

impl<T> Default for TimerQueue<T> {
    fn default() -> Self {
        Self {
            next_seq: 0,
            pending: BTreeMap::new(),
        }
    }
}

impl<T> TimerQueue<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, at: Duration, lineage: Lineage, action: T) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.insert((at, seq), Pending { lineage, action });
    }

    pub fn cancel_lineage(&mut self, lineage: Lineage) -> usize {
        let before = self.pending.len();
        self.pending.retain(|_, timer| timer.lineage != lineage);
        before - self.pending.len()
    }

    pub fn clear(&mut self) -> usize {
        let cancelled = self.pending.len();
        self.pending.clear();
        cancelled
    }

    /// Removes and returns the earliest timer due at or before `now`.
    pub fn pop_due(&mut self, now: Duration) -> Option<(Duration, T)> {
        let (&(at, seq), _) = self.pending.iter().next()?;
        if at > now {
            return None;
        }
        self.pending
            .remove(&(at, seq))
            .map(|timer| (at, timer.action))
    }

    pub fn next_deadline(&self) -> Option<Duration> {
        self.pending.keys().next().map(|(at, _)| *at)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn count(&self, lineage: Lineage) -> usize {
        self.pending
            .values()
            .filter(|timer| timer.lineage == lineage)
            .count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn pops_in_deadline_then_schedule_order() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(300), Lineage::Phase, "late");
        queue.schedule(ms(100), Lineage::Phase, "first");
        queue.schedule(ms(100), Lineage::Timeline, "second");

        assert_eq!(queue.pop_due(ms(50)), None);
        assert_eq!(queue.pop_due(ms(100)), Some((ms(100), "first")));
        assert_eq!(queue.pop_due(ms(100)), Some((ms(100), "second")));
        assert_eq!(queue.pop_due(ms(100)), None);
        assert_eq!(queue.next_deadline(), Some(ms(300)));
    }

    #[test]
    fn cancel_lineage_leaves_other_lineages() {
        let mut queue = TimerQueue::new();
        queue.schedule(ms(10), Lineage::Phase, 1);
        queue.schedule(ms(20), Lineage::Phase, 2);
        queue.schedule(ms(30), Lineage::Timeline, 3);
        queue.schedule(ms(40), Lineage::Loop, 4);

        assert_eq!(queue.cancel_lineage(Lineage::Phase), 2);
        assert_eq!(queue.count(Lineage::Timeline), 1);
        assert_eq!(queue.count(Lineage::Loop), 1);
        assert_eq!(queue.clear(), 2);
        assert!(queue.is_empty());
    }
}
