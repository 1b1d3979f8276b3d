//! Cancellable timers for deferred game work
//!
//! Each timer kind has at most one outstanding handle: scheduling a kind again
//! replaces the pending one, so rapid resets never produce duplicate firings.
//! Time is whatever clock the owner advances (milliseconds here).

use serde::{Deserialize, Serialize};

/// Deferred work the session knows how to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimerKind {
    /// Clears the player's invulnerable flag
    InvulnerabilityExpiry,
    /// Emits the next background melody phrase and re-arms itself
    MelodyRepeat,
}

/// Opaque id of a scheduled timer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerHandle(u64);

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Pending {
    handle: TimerHandle,
    kind: TimerKind,
    due_ms: f64,
}

/// A timer that came due
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fired {
    pub handle: TimerHandle,
    pub kind: TimerKind,
    pub due_ms: f64,
}

/// Pending timers, at most one per kind
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Timers {
    pending: Vec<Pending>,
    next_handle: u64,
}

impl Timers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `kind` to fire at `due_ms`, cancelling any outstanding one
    pub fn schedule(&mut self, kind: TimerKind, due_ms: f64) -> TimerHandle {
        self.cancel(kind);
        let handle = TimerHandle(self.next_handle);
        self.next_handle += 1;
        self.pending.push(Pending {
            handle,
            kind,
            due_ms,
        });
        handle
    }

    /// Cancel the outstanding timer of this kind; returns whether one existed
    pub fn cancel(&mut self, kind: TimerKind) -> bool {
        let before = self.pending.len();
        self.pending.retain(|p| p.kind != kind);
        self.pending.len() != before
    }

    pub fn is_pending(&self, kind: TimerKind) -> bool {
        self.pending.iter().any(|p| p.kind == kind)
    }

    pub fn due_at(&self, kind: TimerKind) -> Option<f64> {
        self.pending.iter().find(|p| p.kind == kind).map(|p| p.due_ms)
    }

    /// Remove and return the earliest timer due at or before `now_ms`
    pub fn pop_due(&mut self, now_ms: f64) -> Option<Fired> {
        let idx = self
            .pending
            .iter()
            .enumerate()
            .filter(|(_, p)| p.due_ms <= now_ms)
            .min_by(|(_, a), (_, b)| a.due_ms.total_cmp(&b.due_ms))
            .map(|(i, _)| i)?;
        let p = self.pending.remove(idx);
        Some(Fired {
            handle: p.handle,
            kind: p.kind,
            due_ms: p.due_ms,
        })
    }
}
