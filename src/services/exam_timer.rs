use chrono::Duration;

use crate::{models::domain::ExamSession, services::clock::Clock};

/// Remaining time is always derived from the stored deadline; nothing about
/// the countdown is persisted.
#[derive(Clone, Debug, Default)]
pub struct ExamTimer {
    clock: Clock,
}

impl ExamTimer {
    pub fn new(clock: Clock) -> Self {
        Self { clock }
    }

    pub fn clock(&self) -> &Clock {
        &self.clock
    }

    /// Time left until the deadline; negative once it has passed.
    pub fn remaining(&self, session: &ExamSession) -> Duration {
        session.deadline - self.clock.now()
    }

    /// Whole seconds left, never below zero.
    pub fn remaining_seconds(&self, session: &ExamSession) -> i64 {
        self.remaining(session).num_seconds().max(0)
    }

    pub fn is_expired(&self, session: &ExamSession) -> bool {
        self.remaining(session) <= Duration::zero()
    }
}
