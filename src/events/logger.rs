//! Diagnostic logging event handler, backed by `tracing`.

use super::EventHandler;
use crate::config::{ConfigId, Configuration};
use crate::outcome::Outcome;

/// Renders lifecycle events as `tracing` records instead of maintaining its
/// own output stream, so the usual `tracing-subscriber` filters/formatters
/// govern what the user actually sees.
#[derive(Debug, Default, Clone, Copy)]
pub struct Logger;

impl EventHandler for Logger {
    fn iteration_started(&self, iteration: u32, configuration: &Configuration) {
        tracing::info!(iteration, len = configuration.len(), "iteration started");
    }

    fn cycle_started(&self, iteration: u32, cycle: u32, configuration: &Configuration) {
        tracing::debug!(iteration, cycle, len = configuration.len(), "cycle started");
    }

    fn successful_reduction(&self, configuration: &Configuration) {
        tracing::info!(len = configuration.len(), "successful reduction");
    }

    fn configuration_split(&self, configuration: &Configuration) {
        tracing::debug!(len = configuration.len(), "granularity escalated");
    }

    fn test_started(&self, _configuration: &Configuration, config_id: &ConfigId) {
        tracing::trace!(%config_id, "test started");
    }

    fn test_finished(&self, _configuration: &Configuration, config_id: &ConfigId, outcome: Outcome) {
        tracing::trace!(%config_id, outcome = ?outcome, "test finished");
    }

    fn cache_lookup(&self, config_id: &ConfigId, outcome: Option<Outcome>) {
        tracing::trace!(%config_id, hit = outcome.is_some(), "cache lookup");
    }

    fn cache_insert(&self, config_id: &ConfigId, outcome: Outcome) {
        tracing::trace!(%config_id, outcome = ?outcome, "cache insert");
    }

    fn finished(&self, reason: &str, result: &Configuration) {
        tracing::info!(reason, len = result.len(), "reduction finished");
    }
}
