//! Restartable single-shot deadlines.
//!
//! Every timer role of the volume plugin (HUD fade, slider decay, config write,
//! HUD reposition) is one [`Debounced`] instance. The event loop owns the clock:
//! it asks for [`Debounced::deadline`], sleeps until then and calls
//! [`Debounced::poll`]. Nothing here spawns tasks, so all state stays on the loop.

use std::time::Duration;
use tokio::time::Instant;

/// Holds at most one pending action together with its deadline.
#[derive(Debug)]
pub struct Debounced<A> {
    delay: Duration,
    pending: Option<Pending<A>>,
}

#[derive(Debug)]
struct Pending<A> {
    deadline: Instant,
    action: A,
}

impl<A> Debounced<A> {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            pending: None,
        }
    }

    pub fn from_millis(ms: u64) -> Self {
        Self::new(Duration::from_millis(ms))
    }

    /// Replace the pending action (if any) and restart the quiet window.
    pub fn schedule(&mut self, now: Instant, action: A) {
        self.pending = Some(Pending {
            deadline: now + self.delay,
            action,
        });
    }

    /// Drop the pending action without running it.
    pub fn cancel(&mut self) {
        self.pending = None;
    }

    /// Take the pending action right away, ignoring the deadline.
    pub fn flush(&mut self) -> Option<A> {
        self.pending.take().map(|p| p.action)
    }

    /// Take the pending action if its deadline has passed.
    pub fn poll(&mut self, now: Instant) -> Option<A> {
        match &self.pending {
            Some(p) if p.deadline <= now => self.pending.take().map(|p| p.action),
            _ => None,
        }
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|p| p.deadline)
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }
}

/// Earliest of several optional deadlines.
pub fn earliest(deadlines: impl IntoIterator<Item = Option<Instant>>) -> Option<Instant> {
    deadlines.into_iter().flatten().min()
}

/// Sleep until `deadline`, or forever when there is none. Meant for a `select!` arm.
pub async fn sleep_until(deadline: Option<Instant>) {
    match deadline {
        Some(d) => tokio::time::sleep_until(d).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_fires_after_quiet_window() {
        let t0 = Instant::now();
        let mut d = Debounced::from_millis(1000);
        d.schedule(t0, "write");
        assert_eq!(d.poll(t0 + ms(999)), None);
        assert_eq!(d.poll(t0 + ms(1000)), Some("write"));
        assert!(!d.is_pending());
        assert_eq!(d.poll(t0 + ms(5000)), None);
    }

    #[test]
    fn test_reschedule_keeps_only_latest() {
        let t0 = Instant::now();
        let mut d = Debounced::from_millis(1000);
        let mut fired = Vec::new();
        for i in 0..10u64 {
            let now = t0 + ms(i * 100);
            if let Some(v) = d.poll(now) {
                fired.push(v);
            }
            d.schedule(now, i);
        }
        // Last schedule at 900ms, deadline at 1900ms.
        assert_eq!(d.deadline(), Some(t0 + ms(1900)));
        assert_eq!(d.poll(t0 + ms(1899)), None);
        if let Some(v) = d.poll(t0 + ms(1900)) {
            fired.push(v);
        }
        assert_eq!(fired, vec![9]);
    }

    #[test]
    fn test_cancel_and_flush() {
        let t0 = Instant::now();
        let mut d = Debounced::from_millis(250);
        d.schedule(t0, 1);
        d.cancel();
        assert_eq!(d.poll(t0 + ms(300)), None);

        d.schedule(t0, 2);
        assert_eq!(d.flush(), Some(2));
        assert_eq!(d.deadline(), None);
    }

    #[test]
    fn test_earliest() {
        let t0 = Instant::now();
        assert_eq!(earliest([None, Some(t0 + ms(5)), Some(t0 + ms(2))]), Some(t0 + ms(2)));
        assert_eq!(earliest([None, None]), None);
    }
}
