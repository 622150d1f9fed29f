//! Repaint scheduling keyed to trigger signals and the display's frame clock.
//!
//! Time-update events can arrive faster than the display refreshes. The
//! scheduler never queues: each trigger supersedes the outstanding repaint
//! ticket, so a burst of events collapses into one repaint on the next frame,
//! and that repaint reads the playback position current at execution time.

use std::collections::BTreeSet;

use crate::signals::Trigger;

/// Handle to a requested, not-yet-executed repaint.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(pub u64);

/// The display's "call me before the next paint" primitive.
pub trait FrameClock {
    fn request_frame(&mut self) -> Ticket;
    fn cancel_frame(&mut self, ticket: Ticket);
}

/// A frame clock driven by its host.
///
/// Requests are recorded; the host calls [`ManualClock::take_due`] once per
/// display refresh and redeems the returned tickets. Cancelled tickets are
/// never returned.
#[derive(Debug, Default)]
pub struct ManualClock {
    next_id: u64,
    outstanding: BTreeSet<Ticket>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Tickets waiting for the next refresh, oldest first. Draining.
    pub fn take_due(&mut self) -> Vec<Ticket> {
        std::mem::take(&mut self.outstanding).into_iter().collect()
    }

    pub fn outstanding(&self) -> usize {
        self.outstanding.len()
    }
}

impl FrameClock for ManualClock {
    fn request_frame(&mut self) -> Ticket {
        self.next_id += 1;
        let ticket = Ticket(self.next_id);
        self.outstanding.insert(ticket);
        ticket
    }

    fn cancel_frame(&mut self, ticket: Ticket) {
        self.outstanding.remove(&ticket);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SchedulerState {
    Idle,
    RepaintPending(Ticket),
    /// Terminal: every trigger and ticket is ignored.
    TornDown,
}

pub struct RedrawScheduler<C: FrameClock> {
    clock: C,
    state: SchedulerState,
    /// Triggers folded into the pending repaint.
    coalesced: u32,
}

impl<C: FrameClock> RedrawScheduler<C> {
    pub fn new(clock: C) -> Self {
        Self {
            clock,
            state: SchedulerState::Idle,
            coalesced: 0,
        }
    }

    pub fn state(&self) -> SchedulerState {
        self.state
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.state, SchedulerState::RepaintPending(_))
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    /// Request a repaint for `trigger`, superseding any outstanding ticket.
    ///
    /// Returns the new ticket, or `None` after teardown.
    pub fn trigger(&mut self, trigger: Trigger) -> Option<Ticket> {
        match self.state {
            SchedulerState::TornDown => {
                tracing::trace!(?trigger, "ignoring trigger after teardown");
                return None;
            }
            SchedulerState::RepaintPending(previous) => {
                self.clock.cancel_frame(previous);
                self.coalesced += 1;
                tracing::trace!(?trigger, ticket = previous.0, "superseding pending repaint");
            }
            SchedulerState::Idle => {
                self.coalesced = 1;
            }
        }
        let ticket = self.clock.request_frame();
        self.state = SchedulerState::RepaintPending(ticket);
        Some(ticket)
    }

    /// Claim `ticket` for execution.
    ///
    /// Succeeds only for the current pending ticket; the scheduler returns to
    /// `Idle` before the caller paints, so a trigger fired during the paint
    /// schedules a fresh repaint rather than being lost.
    pub fn begin_repaint(&mut self, ticket: Ticket) -> bool {
        match self.state {
            SchedulerState::RepaintPending(pending) if pending == ticket => {
                tracing::debug!(
                    ticket = ticket.0,
                    coalesced = self.coalesced,
                    "running repaint"
                );
                self.state = SchedulerState::Idle;
                self.coalesced = 0;
                true
            }
            state => {
                tracing::trace!(ticket = ticket.0, ?state, "rejecting stale ticket");
                false
            }
        }
    }

    /// Cancel the outstanding ticket and stop accepting triggers.
    pub fn teardown(&mut self) {
        if let SchedulerState::RepaintPending(ticket) = self.state {
            self.clock.cancel_frame(ticket);
        }
        if self.state != SchedulerState::TornDown {
            tracing::debug!("redraw scheduler torn down");
        }
        self.state = SchedulerState::TornDown;
        self.coalesced = 0;
    }
}
