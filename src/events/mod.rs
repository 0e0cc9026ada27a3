//! Lifecycle event broadcast.
//!
//! A reducer notifies named events with a structured payload; every
//! subscribed [`EventHandler`] receives a call to the identically-named
//! method. Missing handler interest is expressed the idiomatic static way:
//! every method has an empty default body, so a handler only overrides what
//! it cares about — the Rust equivalent of picire's `EventListener.notify`
//! swallowing `AttributeError` for partial listeners.

pub mod logger;
pub mod stats;

pub use logger::Logger;
pub use stats::Statistics;

use std::sync::Arc;

use crate::config::{ConfigId, Configuration};
use crate::outcome::Outcome;

/// All-default-empty listener interface. Implement only the methods you
/// need; everything else is a no-op.
pub trait EventHandler: Send + Sync {
    fn iteration_started(&self, _iteration: u32, _configuration: &Configuration) {}
    fn cycle_started(&self, _iteration: u32, _cycle: u32, _configuration: &Configuration) {}
    fn successful_reduction(&self, _configuration: &Configuration) {}
    fn configuration_split(&self, _configuration: &Configuration) {}
    fn test_started(&self, _configuration: &Configuration, _config_id: &ConfigId) {}
    fn test_finished(&self, _configuration: &Configuration, _config_id: &ConfigId, _outcome: Outcome) {}
    fn cache_lookup(&self, _config_id: &ConfigId, _outcome: Option<Outcome>) {}
    fn cache_insert(&self, _config_id: &ConfigId, _outcome: Outcome) {}
    fn finished(&self, _reason: &str, _result: &Configuration) {}
}

/// A broadcast registry of zero or more handlers. Does not influence
/// control flow — purely observational.
#[derive(Clone, Default)]
pub struct EventSink {
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    pub fn iteration_started(&self, iteration: u32, configuration: &Configuration) {
        for h in &self.handlers {
            h.iteration_started(iteration, configuration);
        }
    }

    pub fn cycle_started(&self, iteration: u32, cycle: u32, configuration: &Configuration) {
        for h in &self.handlers {
            h.cycle_started(iteration, cycle, configuration);
        }
    }

    pub fn successful_reduction(&self, configuration: &Configuration) {
        for h in &self.handlers {
            h.successful_reduction(configuration);
        }
    }

    pub fn configuration_split(&self, configuration: &Configuration) {
        for h in &self.handlers {
            h.configuration_split(configuration);
        }
    }

    pub fn test_started(&self, configuration: &Configuration, config_id: &ConfigId) {
        for h in &self.handlers {
            h.test_started(configuration, config_id);
        }
    }

    pub fn test_finished(&self, configuration: &Configuration, config_id: &ConfigId, outcome: Outcome) {
        for h in &self.handlers {
            h.test_finished(configuration, config_id, outcome);
        }
    }

    pub fn cache_lookup(&self, config_id: &ConfigId, outcome: Option<Outcome>) {
        for h in &self.handlers {
            h.cache_lookup(config_id, outcome);
        }
    }

    pub fn cache_insert(&self, config_id: &ConfigId, outcome: Outcome) {
        for h in &self.handlers {
            h.cache_insert(config_id, outcome);
        }
    }

    pub fn finished(&self, reason: &str, result: &Configuration) {
        for h in &self.handlers {
            h.finished(reason, result);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingHandler {
        count: AtomicUsize,
    }

    impl EventHandler for CountingHandler {
        fn successful_reduction(&self, _configuration: &Configuration) {
            self.count.fetch_add(1, Ordering::Relaxed);
        }
    }

    #[test]
    fn unimplemented_methods_are_silent_no_ops() {
        let handler = Arc::new(CountingHandler {
            count: AtomicUsize::new(0),
        });
        let mut sink = EventSink::new();
        sink.subscribe(handler.clone());

        sink.iteration_started(0, &Configuration::empty());
        sink.test_started(&Configuration::empty(), &ConfigId::new(["a0"]));
        assert_eq!(handler.count.load(Ordering::Relaxed), 0);

        sink.successful_reduction(&Configuration::empty());
        assert_eq!(handler.count.load(Ordering::Relaxed), 1);
    }

    #[test]
    fn broadcasts_to_every_subscriber() {
        let h1 = Arc::new(CountingHandler {
            count: AtomicUsize::new(0),
        });
        let h2 = Arc::new(CountingHandler {
            count: AtomicUsize::new(0),
        });
        let mut sink = EventSink::new();
        sink.subscribe(h1.clone());
        sink.subscribe(h2.clone());

        sink.successful_reduction(&Configuration::empty());
        assert_eq!(h1.count.load(Ordering::Relaxed), 1);
        assert_eq!(h2.count.load(Ordering::Relaxed), 1);
    }
}
