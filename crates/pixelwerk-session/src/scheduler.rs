// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Debounce timers for live preview.
//
// One pending slot per transform. Rescheduling a control replaces its slot, so
// a burst of slider ticks collapses into a single recompute. Time is always
// passed in by the caller; nothing here reads the clock.

use std::time::{Duration, Instant};

use pixelwerk_core::types::TransformKind;
use tracing::debug;

/// Identifies one scheduled recompute. Tokens increase monotonically, so a
/// larger token was scheduled later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskToken(u64);

/// A recompute waiting for its deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingRecompute {
    pub kind: TransformKind,
    pub token: TaskToken,
    pub deadline: Instant,
}

#[derive(Debug, Default)]
pub struct PreviewScheduler {
    slots: [Option<PendingRecompute>; 3],
    next_token: u64,
}

impl PreviewScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a recompute of `kind` at `now + delay`, cancelling any
    /// recompute already pending for it.
    pub fn schedule(&mut self, kind: TransformKind, now: Instant, delay: Duration) -> TaskToken {
        self.next_token += 1;
        let token = TaskToken(self.next_token);
        let replaced = self.slots[slot(kind)].replace(PendingRecompute {
            kind,
            token,
            deadline: now + delay,
        });
        debug!(%kind, ?token, delay_ms = delay.as_millis() as u64, replaced = replaced.is_some(), "recompute scheduled");
        token
    }

    /// Drop the pending recompute for `kind`, returning its token.
    pub fn cancel(&mut self, kind: TransformKind) -> Option<TaskToken> {
        self.slots[slot(kind)].take().map(|pending| pending.token)
    }

    pub fn cancel_all(&mut self) {
        for s in &mut self.slots {
            *s = None;
        }
    }

    pub fn pending(&self, kind: TransformKind) -> Option<&PendingRecompute> {
        self.slots[slot(kind)].as_ref()
    }

    pub fn is_pending(&self, kind: TransformKind) -> bool {
        self.slots[slot(kind)].is_some()
    }

    pub fn is_idle(&self) -> bool {
        self.slots.iter().all(Option::is_none)
    }

    /// Earliest deadline among the pending recomputes. Hosts use this to
    /// decide when to poll next.
    pub fn next_deadline(&self) -> Option<Instant> {
        self.slots.iter().flatten().map(|p| p.deadline).min()
    }

    /// Remove and return every recompute due at `now`, in the order they were
    /// scheduled.
    pub fn take_due(&mut self, now: Instant) -> Vec<PendingRecompute> {
        let mut due: Vec<PendingRecompute> = self
            .slots
            .iter_mut()
            .filter(|s| s.is_some_and(|p| p.deadline <= now))
            .filter_map(Option::take)
            .collect();
        due.sort_by_key(|p| p.token);
        due
    }
}

fn slot(kind: TransformKind) -> usize {
    match kind {
        TransformKind::Denoise => 0,
        TransformKind::Enhance => 1,
        TransformKind::Grade => 2,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MS: Duration = Duration::from_millis(1);

    #[test]
    fn reschedule_replaces_the_slot() {
        let t0 = Instant::now();
        let mut scheduler = PreviewScheduler::new();
        let first = scheduler.schedule(TransformKind::Grade, t0, 50 * MS);
        let second = scheduler.schedule(TransformKind::Grade, t0 + 10 * MS, 50 * MS);
        assert!(second > first);

        assert!(scheduler.take_due(t0 + 50 * MS).is_empty());
        let due = scheduler.take_due(t0 + 60 * MS);
        assert_eq!(due.len(), 1);
        assert_eq!(due[0].token, second);
        assert!(scheduler.is_idle());
    }

    #[test]
    fn due_tasks_come_out_in_scheduling_order() {
        let t0 = Instant::now();
        let mut scheduler = PreviewScheduler::new();
        scheduler.schedule(TransformKind::Grade, t0, 10 * MS);
        scheduler.schedule(TransformKind::Denoise, t0, 5 * MS);
        scheduler.schedule(TransformKind::Enhance, t0, 100 * MS);

        let due: Vec<_> = scheduler.take_due(t0 + 20 * MS).iter().map(|p| p.kind).collect();
        assert_eq!(due, vec![TransformKind::Grade, TransformKind::Denoise]);
        assert!(scheduler.is_pending(TransformKind::Enhance));
        assert_eq!(scheduler.next_deadline(), Some(t0 + 100 * MS));
    }

    #[test]
    fn deadline_is_inclusive() {
        let t0 = Instant::now();
        let mut scheduler = PreviewScheduler::new();
        scheduler.schedule(TransformKind::Enhance, t0, 120 * MS);
        assert_eq!(scheduler.take_due(t0 + 120 * MS).len(), 1);
    }

    #[test]
    fn cancel_empties_slots() {
        let t0 = Instant::now();
        let mut scheduler = PreviewScheduler::new();
        let token = scheduler.schedule(TransformKind::Denoise, t0, MS);
        scheduler.schedule(TransformKind::Grade, t0, MS);

        assert_eq!(scheduler.cancel(TransformKind::Denoise), Some(token));
        assert_eq!(scheduler.cancel(TransformKind::Denoise), None);
        scheduler.cancel_all();
        assert!(scheduler.take_due(t0 + Duration::from_secs(1)).is_empty());
        assert_eq!(scheduler.next_deadline(), None);
    }
}
