//! Board registry: registered addresses and the active subset
//!
//! Two disjoint-purpose sets over the same 0..=15 address space. The
//! *registered* list is fixed at configuration time and drives the
//! round-robin polling order. The *active* flags are populated by
//! discovery: a board is polled at runtime only when it is registered
//! **and** active.
//!
//! Writes to the active flags are confined to one execution context by
//! construction: the registry value is owned by whoever runs discovery
//! and is then moved into the master loop thread. Other contexts only
//! ever see the snapshot taken at connect time.

use pinbus_core::MAX_BOARDS;
use tracing::debug;

/// Registered board list plus active flags.
#[derive(Debug, Default)]
pub struct BoardRegistry {
    registered: Vec<u8>,
    active: [bool; MAX_BOARDS],
}

impl BoardRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a board address for polling.
    ///
    /// Registration order defines the round-robin order. Once 16
    /// entries are registered, or for addresses outside 0..=15,
    /// this is a silent no-op — a documented limitation, not an error.
    pub fn register(&mut self, address: u8) {
        if usize::from(address) >= MAX_BOARDS {
            debug!(address, "ignoring board address outside the bus range");
            return;
        }
        if self.registered.len() >= MAX_BOARDS {
            debug!(address, "board registry full, registration ignored");
            return;
        }
        self.registered.push(address);
    }

    /// Mark an address reachable. Called only from the discovery /
    /// master-loop context; active status is never revoked.
    pub fn mark_active(&mut self, address: u8) {
        if let Some(flag) = self.active.get_mut(usize::from(address)) {
            *flag = true;
        }
    }

    pub fn is_active(&self, address: u8) -> bool {
        self.active
            .get(usize::from(address))
            .copied()
            .unwrap_or(false)
    }

    /// Registered addresses in registration (= polling) order.
    pub fn registered(&self) -> &[u8] {
        &self.registered
    }

    /// Addresses confirmed reachable, ascending.
    pub fn active_addresses(&self) -> Vec<u8> {
        (0..MAX_BOARDS as u8).filter(|&a| self.active[usize::from(a)]).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn registration_order_is_preserved() {
        let mut registry = BoardRegistry::new();
        for address in [3, 1, 7] {
            registry.register(address);
        }
        assert_eq!(registry.registered(), &[3, 1, 7]);
    }

    #[test]
    fn seventeenth_registration_is_ignored() {
        let mut registry = BoardRegistry::new();
        for address in 0..16 {
            registry.register(address);
        }
        registry.register(9); // full: silently dropped
        assert_eq!(registry.registered().len(), 16);
    }

    #[test]
    fn out_of_range_address_is_ignored() {
        let mut registry = BoardRegistry::new();
        registry.register(16);
        registry.register(200);
        assert!(registry.registered().is_empty());
    }

    #[test]
    fn active_is_separate_from_registered() {
        let mut registry = BoardRegistry::new();
        registry.register(2);
        registry.mark_active(5); // active but never registered
        assert!(!registry.is_active(2));
        assert!(registry.is_active(5));
        assert_eq!(registry.active_addresses(), vec![5]);
    }
}
