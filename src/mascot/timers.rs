//! Registry of every delayed action the behavior machine has armed.
use std::{collections::BTreeMap, fmt, time::Duration};

use bevy::prelude::*;

/// The concern a delayed action belongs to. At most one timer per key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TimerKey {
    NextAction,
    DialogueClose,
    PeekStart,
    PeekEnd,
    FinishHiding,
    SummonWindow,
    TabSettle,
}

impl TimerKey {
    pub fn label(self) -> &'static str {
        match self {
            Self::NextAction => "next-action",
            Self::DialogueClose => "dialogue-close",
            Self::PeekStart => "peek-start",
            Self::PeekEnd => "peek-end",
            Self::FinishHiding => "finish-hiding",
            Self::SummonWindow => "summon-window",
            Self::TabSettle => "tab-settle",
        }
    }
}

impl fmt::Display for TimerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[derive(Debug, Clone)]
struct PendingTimer {
    timer: Timer,
    overdue: Duration,
}

#[derive(Debug, Default, Clone)]
pub struct TimerRegistry {
    timers: BTreeMap<TimerKey, PendingTimer>,
}

impl TimerRegistry {
    /// Arms `key` to fire after `delay`, replacing any timer already armed
    /// under the same key.
    pub fn schedule(&mut self, key: TimerKey, delay: Duration) {
        if self
            .timers
            .insert(
                key,
                PendingTimer {
                    timer: Timer::new(delay, TimerMode::Once),
                    overdue: Duration::ZERO,
                },
            )
            .is_some()
        {
            debug!("Replaced pending {} timer", key);
        }
    }

    pub fn cancel(&mut self, key: TimerKey) -> bool {
        self.timers.remove(&key).is_some()
    }

    /// Drops every armed timer. Returns how many were cancelled.
    pub fn cancel_all(&mut self) -> usize {
        let cancelled = self.timers.len();
        self.timers.clear();
        cancelled
    }

    pub fn is_armed(&self, key: TimerKey) -> bool {
        self.timers.contains_key(&key)
    }

    pub fn remaining(&self, key: TimerKey) -> Option<Duration> {
        self.timers.get(&key).map(|pending| pending.timer.remaining())
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn keys(&self) -> impl Iterator<Item = TimerKey> + '_ {
        self.timers.keys().copied()
    }

    /// Advances every armed timer by `delta`. Expired timers stay registered
    /// until collected with [`TimerRegistry::pop_expired`].
    pub fn tick(&mut self, delta: Duration) {
        for pending in self.timers.values_mut() {
            let remaining = pending.timer.remaining();
            pending.timer.tick(delta);
            if pending.timer.is_finished() {
                pending.overdue += delta.saturating_sub(remaining);
            }
        }
    }

    /// Removes and returns one expired timer, the one that expired first.
    /// Handlers run between pops, so a timer cancelled by an earlier handler
    /// never fires.
    pub fn pop_expired(&mut self) -> Option<TimerKey> {
        let key = self
            .timers
            .iter()
            .filter(|(_, pending)| pending.timer.is_finished())
            .max_by_key(|(_, pending)| pending.overdue)
            .map(|(key, _)| *key)?;
        self.timers.remove(&key);
        Some(key)
    }
}
