use std::collections::HashMap;
use std::time::Duration;
use tokio::time::Instant;

/// Sliding window of failure timestamps per hook.
///
/// A hook is disabled while at least `threshold` failures fall inside `window`.
/// Entries older than the window are pruned before every evaluation, so a
/// disabled hook re-enables itself once its failures age out.
#[derive(Debug)]
pub struct FailureTracker {
    window: Duration,
    threshold: usize,
    failures: HashMap<String, Vec<Instant>>,
}

impl FailureTracker {
    pub fn new(window: Duration, threshold: usize) -> Self {
        Self {
            window,
            threshold: threshold.max(1),
            failures: HashMap::new(),
        }
    }

    /// Returns the failure count inside the window after recording.
    pub fn record_failure(&mut self, name: &str, now: Instant) -> usize {
        let window = self.window;
        let entries = self.failures.entry(name.to_string()).or_default();
        entries.push(now);
        Self::prune_entries(entries, now, window);
        entries.len()
    }

    pub fn failure_count(&mut self, name: &str, now: Instant) -> usize {
        let window = self.window;
        match self.failures.get_mut(name) {
            Some(entries) => {
                Self::prune_entries(entries, now, window);
                let count = entries.len();
                if count == 0 {
                    self.failures.remove(name);
                }
                count
            }
            None => 0,
        }
    }

    pub fn is_disabled(&mut self, name: &str, now: Instant) -> bool {
        self.failure_count(name, now) >= self.threshold
    }

    pub fn reset(&mut self, name: &str) {
        self.failures.remove(name);
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    fn prune_entries(entries: &mut Vec<Instant>, now: Instant, window: Duration) {
        entries.retain(|at| now.duration_since(*at) < window);
    }
}
