use crate::config::RegistryConfig;
use crate::logging;
use crate::mocks::Deactivatable;
use crate::Result;
use std::rc::Rc;

/// Registry size at which deactivated handles start being pruned
pub const REGISTRY_SOFT_LIMIT: usize = 100;

/// Registrations between two prune passes while at or over the soft limit
pub const DEFAULT_PRUNE_INTERVAL: usize = 10;

/// Long-lived mock handles awaiting bulk deactivation at a suite boundary.
///
/// Handles deactivated early stay in the registry until a prune pass drops
/// them. Pruning starts once the registry reaches its soft limit and then
/// repeats every `prune_interval` registrations, so the size may exceed the
/// limit between passes.
pub struct MockRegistry {
    entries: Vec<Rc<dyn Deactivatable>>,
    soft_limit: usize,
    prune_interval: usize,
    prune_attempts: usize,
}

impl MockRegistry {
    pub fn new() -> Self {
        Self::with_limits(REGISTRY_SOFT_LIMIT, DEFAULT_PRUNE_INTERVAL)
    }

    /// A `prune_interval` of `0` prunes on every registration, like `1`.
    pub fn with_limits(soft_limit: usize, prune_interval: usize) -> Self {
        Self {
            entries: Vec::new(),
            soft_limit,
            prune_interval: prune_interval.max(1),
            prune_attempts: 0,
        }
    }

    pub fn from_config(config: &RegistryConfig) -> Self {
        Self::with_limits(config.soft_limit, config.effective_prune_interval())
    }

    /// Track `handle` until the next [`deactivate_all`](Self::deactivate_all)
    pub fn register(&mut self, handle: Rc<dyn Deactivatable>) {
        self.entries.push(handle);

        if self.entries.len() < self.soft_limit {
            self.prune_attempts = 0;
            return;
        }
        if self.prune_attempts == 0 {
            self.prune();
            if self.entries.len() < self.soft_limit {
                return;
            }
        }
        self.prune_attempts = (self.prune_attempts + 1) % self.prune_interval;
    }

    /// Drop every handle that is already deactivated; returns how many went
    pub fn prune(&mut self) -> usize {
        let before = self.entries.len();
        self.entries.retain(|handle| !handle.is_deactivated());
        let after = self.entries.len();
        logging::log_registry_pruned(before, after);
        before - after
    }

    /// Deactivate every handle and empty the registry.
    ///
    /// The registry is emptied even when a handle fails; the first failure is
    /// returned after all handles were attempted.
    pub fn deactivate_all(&mut self) -> Result<()> {
        let entries = std::mem::take(&mut self.entries);
        self.prune_attempts = 0;
        logging::log_deactivate_all(entries.len());

        let mut first_error = None;
        for handle in entries {
            if let Err(e) = handle.deactivate() {
                first_error.get_or_insert(e);
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[Rc<dyn Deactivatable>] {
        &self.entries
    }

    pub fn soft_limit(&self) -> usize {
        self.soft_limit
    }

    pub fn prune_interval(&self) -> usize {
        self.prune_interval
    }
}

impl Default for MockRegistry {
    fn default() -> Self {
        Self::new()
    }
}
