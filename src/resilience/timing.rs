//! Per-inbound-request dependency timings.
//!
//! A [`TimingBag`] is opened when an inbound request starts and shared by every
//! call made on its behalf. Each dependency name holds the elapsed
//! milliseconds of its latest attempt.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use std::time::Instant;

/// Shared map from dependency name to elapsed milliseconds.
#[derive(Debug, Clone)]
pub struct TimingBag {
    started: Instant,
    entries: Arc<Mutex<BTreeMap<String, u64>>>,
}

impl TimingBag {
    /// Open a timing session.
    pub fn start() -> Self {
        Self {
            started: Instant::now(),
            entries: Arc::new(Mutex::new(BTreeMap::new())),
        }
    }

    pub fn started(&self) -> Instant {
        self.started
    }

    /// Record `elapsed_ms` for `name`, replacing any earlier value.
    pub fn record(&self, name: &str, elapsed_ms: u64) {
        let mut entries = self.entries.lock().expect("timing bag mutex poisoned");
        entries.insert(name.to_string(), elapsed_ms);
    }

    pub fn get(&self, name: &str) -> Option<u64> {
        let entries = self.entries.lock().expect("timing bag mutex poisoned");
        entries.get(name).copied()
    }

    pub fn snapshot(&self) -> BTreeMap<String, u64> {
        self.entries.lock().expect("timing bag mutex poisoned").clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_overwrites() {
        let bag = TimingBag::start();
        bag.record("req-dispatch", 120);
        bag.record("req-dispatch", 15);
        assert_eq!(bag.get("req-dispatch"), Some(15));
        assert_eq!(bag.snapshot().len(), 1);
    }

    #[test]
    fn test_clones_share_start() {
        let bag = TimingBag::start();
        assert_eq!(bag.clone().started(), bag.started());
        assert!(bag.started() <= Instant::now());
    }

    #[test]
    fn test_clones_share_entries() {
        let bag = TimingBag::start();
        let other = bag.clone();
        other.record("db", 3);
        assert_eq!(bag.get("db"), Some(3));
    }
}
