//! Re-entrancy guard: at most one generation or document render runs at a time.
//!
//! `try_acquire` hands out a `GenerationTicket`; the slot is released when the ticket
//! drops, including on early returns and panics inside the handler.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tracing::debug;
use uuid::Uuid;

#[derive(Clone, Default)]
pub struct GenerationGuard {
    busy: Arc<AtomicBool>,
}

/// Proof that the caller holds the generation slot.
#[derive(Debug)]
pub struct GenerationTicket {
    token: Uuid,
    busy: Arc<AtomicBool>,
}

impl GenerationGuard {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claims the slot, or returns `None` if another request holds it.
    pub fn try_acquire(&self) -> Option<GenerationTicket> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()?;
        let token = Uuid::new_v4();
        debug!(%token, "Generation slot acquired");
        Some(GenerationTicket {
            token,
            busy: Arc::clone(&self.busy),
        })
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}

impl GenerationTicket {
    pub fn token(&self) -> Uuid {
        self.token
    }
}

impl Drop for GenerationTicket {
    fn drop(&mut self) {
        self.busy.store(false, Ordering::Release);
        debug!(token = %self.token, "Generation slot released");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_acquire_fails_while_held() {
        let guard = GenerationGuard::new();
        let ticket = guard.try_acquire().unwrap();
        assert!(guard.is_busy());
        assert!(guard.try_acquire().is_none());
        drop(ticket);
        assert!(!guard.is_busy());
        assert!(guard.try_acquire().is_some());
    }

    #[test]
    fn test_clones_share_the_slot() {
        let guard = GenerationGuard::new();
        let other = guard.clone();
        let _ticket = guard.try_acquire().unwrap();
        assert!(other.try_acquire().is_none());
    }

    #[test]
    fn test_tickets_carry_distinct_tokens() {
        let guard = GenerationGuard::new();
        let first = guard.try_acquire().unwrap().token();
        let second = guard.try_acquire().unwrap().token();
        assert_ne!(first, second);
    }
}
