#![forbid(unsafe_code)]

//! Coalesce-to-next-frame scheduling for high-frequency pointer moves.
//!
//! A drag produces far more pointer moves than the display can show. The
//! [`FrameCoalescer`] keeps at most one pending evaluation:
//!
//! - Scheduling while something is pending replaces it ("latest wins") and
//!   reports the cancelled ticket, so the host can drop the frame callback it
//!   registered for it.
//! - The host hands the ticket back on the next display tick; only the
//!   current ticket yields the pending value, stale tickets yield nothing.
//! - Events that must not be reordered (scroll, release) call
//!   [`flush`](FrameCoalescer::flush) first so the pending move is evaluated
//!   before them.
//!
//! # Usage
//!
//! ```
//! use blocksel_core::frame::FrameCoalescer;
//! use web_time::Instant;
//!
//! let mut frames = FrameCoalescer::new();
//! let first = frames.schedule(1, Instant::now());
//! let second = frames.schedule(2, Instant::now());
//! assert_eq!(second.cancelled, Some(first.ticket));
//!
//! assert_eq!(frames.take(first.ticket), None);
//! assert_eq!(frames.take(second.ticket), Some(2));
//! ```

use web_time::Instant;

use crate::logging::TARGET_FRAME;

/// Handle for a requested frame callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FrameTicket(u64);

impl FrameTicket {
    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Outcome of [`FrameCoalescer::schedule`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scheduled {
    /// Ticket to request a frame for.
    pub ticket: FrameTicket,
    /// Ticket that was pending and is now void.
    pub cancelled: Option<FrameTicket>,
}

#[derive(Debug, Clone)]
struct Pending<T> {
    ticket: FrameTicket,
    value: T,
    scheduled_at: Instant,
}

/// Single-slot, cancel-on-reschedule frame scheduler.
///
/// Not thread-safe; it lives on the host's event loop.
#[derive(Debug, Clone)]
pub struct FrameCoalescer<T> {
    pending: Option<Pending<T>>,
    next_ticket: u64,
    coalesced: u64,
}

impl<T> Default for FrameCoalescer<T> {
    fn default() -> Self {
        Self {
            pending: None,
            next_ticket: 1,
            coalesced: 0,
        }
    }
}

impl<T> FrameCoalescer<T> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `value` for the next frame, replacing anything pending.
    pub fn schedule(&mut self, value: T, now: Instant) -> Scheduled {
        let ticket = FrameTicket(self.next_ticket);
        self.next_ticket = self.next_ticket.wrapping_add(1);

        let cancelled = self.pending.take().map(|old| {
            self.coalesced = self.coalesced.saturating_add(1);
            old.ticket
        });

        self.pending = Some(Pending {
            ticket,
            value,
            scheduled_at: now,
        });
        Scheduled { ticket, cancelled }
    }

    /// Take the pending value if `ticket` is the current one.
    pub fn take(&mut self, ticket: FrameTicket) -> Option<T> {
        if self.pending.as_ref().is_some_and(|p| p.ticket == ticket) {
            return self.flush();
        }
        tracing::trace!(
            target: TARGET_FRAME,
            ticket = ticket.get(),
            "stale frame ticket ignored"
        );
        None
    }

    /// Take the pending value regardless of ticket.
    pub fn flush(&mut self) -> Option<T> {
        let pending = self.pending.take()?;
        tracing::trace!(
            target: TARGET_FRAME,
            ticket = pending.ticket.get(),
            latency_us = pending.scheduled_at.elapsed().as_micros() as u64,
            "frame evaluation"
        );
        Some(pending.value)
    }

    /// Drop the pending value, returning its ticket for host-side cancellation.
    pub fn cancel(&mut self) -> Option<FrameTicket> {
        self.pending.take().map(|p| p.ticket)
    }

    #[must_use]
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    #[must_use]
    pub fn pending_ticket(&self) -> Option<FrameTicket> {
        self.pending.as_ref().map(|p| p.ticket)
    }

    /// Number of values replaced before they were evaluated.
    #[must_use]
    pub fn coalesced_count(&self) -> u64 {
        self.coalesced
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_coalescer_has_no_pending() {
        let frames: FrameCoalescer<u8> = FrameCoalescer::new();
        assert!(!frames.has_pending());
        assert_eq!(frames.pending_ticket(), None);
        assert_eq!(frames.coalesced_count(), 0);
    }

    #[test]
    fn reschedule_cancels_previous_ticket() {
        let mut frames = FrameCoalescer::new();
        let now = Instant::now();

        let a = frames.schedule("a", now);
        assert_eq!(a.cancelled, None);

        let b = frames.schedule("b", now);
        assert_eq!(b.cancelled, Some(a.ticket));
        assert_ne!(a.ticket, b.ticket);
        assert_eq!(frames.coalesced_count(), 1);
        assert_eq!(frames.pending_ticket(), Some(b.ticket));
    }

    #[test]
    fn latest_value_wins() {
        let mut frames = FrameCoalescer::new();
        let now = Instant::now();
        for i in 0..10 {
            frames.schedule(i, now);
        }
        assert_eq!(frames.flush(), Some(9));
        assert_eq!(frames.flush(), None);
        assert_eq!(frames.coalesced_count(), 9);
    }

    #[test]
    fn stale_ticket_yields_nothing_and_keeps_pending() {
        let mut frames = FrameCoalescer::new();
        let now = Instant::now();
        let old = frames.schedule(1, now).ticket;
        let new = frames.schedule(2, now).ticket;

        assert_eq!(frames.take(old), None);
        assert!(frames.has_pending());
        assert_eq!(frames.take(new), Some(2));
        assert!(!frames.has_pending());
        // Taking twice is harmless.
        assert_eq!(frames.take(new), None);
    }

    #[test]
    fn cancel_returns_ticket() {
        let mut frames = FrameCoalescer::new();
        let t = frames.schedule((), Instant::now()).ticket;
        assert_eq!(frames.cancel(), Some(t));
        assert_eq!(frames.cancel(), None);
        assert_eq!(frames.take(t), None);
    }
}
