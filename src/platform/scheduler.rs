//! Cooperative frame scheduling
//!
//! The host (requestAnimationFrame or a native loop) asks for a handle, then
//! calls back with it. Only the most recently issued handle is live; cancel
//! is synchronous, so a frame queued before a state change can never run
//! against the new state.

/// Identifies one scheduled frame
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TickHandle(u64);

#[derive(Debug, Default)]
pub struct FrameScheduler {
    next_id: u64,
    pending: Option<TickHandle>,
}

impl FrameScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue a new handle, replacing any pending one
    pub fn schedule(&mut self) -> TickHandle {
        self.next_id += 1;
        let handle = TickHandle(self.next_id);
        self.pending = Some(handle);
        handle
    }

    /// Drop the pending handle; returns it if there was one
    pub fn cancel(&mut self) -> Option<TickHandle> {
        self.pending.take()
    }

    pub fn pending(&self) -> Option<TickHandle> {
        self.pending
    }

    /// Consume `handle` if it is the live one. Stale or cancelled handles
    /// return false and leave the scheduler untouched.
    pub fn fire(&mut self, handle: TickHandle) -> bool {
        if self.pending == Some(handle) {
            self.pending = None;
            true
        } else {
            log::debug!("Ignoring stale frame {:?}", handle);
            false
        }
    }
}
