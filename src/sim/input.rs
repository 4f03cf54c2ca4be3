//! Edge-triggered input
//!
//! Input callbacks never touch the simulation. They push stamped edges into
//! an `InputQueue`; the host drains it once per tick into a `TickInput`, so
//! a single press can be applied at most once.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

/// A press or release edge, stamped with the clock reading when it happened
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum InputEvent {
    ChargeStart { at_ms: u64 },
    ChargeEnd { at_ms: u64 },
}

/// Input commands for a single tick
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Edges in arrival order
    pub events: Vec<InputEvent>,
}

impl TickInput {
    pub fn charge_start(at_ms: u64) -> Self {
        Self {
            events: vec![InputEvent::ChargeStart { at_ms }],
        }
    }

    pub fn charge_end(at_ms: u64) -> Self {
        Self {
            events: vec![InputEvent::ChargeEnd { at_ms }],
        }
    }
}

/// Pending edges between ticks
#[derive(Debug, Clone, Default)]
pub struct InputQueue {
    pending: VecDeque<InputEvent>,
}

impl InputQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, event: InputEvent) {
        self.pending.push_back(event);
    }

    /// Take everything queued so far; the queue is empty afterwards
    pub fn drain(&mut self) -> TickInput {
        TickInput {
            events: self.pending.drain(..).collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
