//! Dialogue Queue
//!
//! Bounded FIFO of lines waiting for the speech bubble.

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::errors::MascotError;

/// What happens to a push once the queue is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum OverflowPolicy {
    /// Evict the oldest pending line to make room
    #[default]
    DropOldest,
    /// Keep the queue as is and reject the new line
    DropNewest,
}

impl fmt::Display for OverflowPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DropOldest => f.write_str("drop-oldest"),
            Self::DropNewest => f.write_str("drop-newest"),
        }
    }
}

impl FromStr for OverflowPolicy {
    type Err = MascotError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "drop-oldest" => Ok(Self::DropOldest),
            "drop-newest" => Ok(Self::DropNewest),
            other => Err(MascotError::UnknownOverflowPolicy(Arc::new(other.to_string()))),
        }
    }
}

/// Outcome of [`DialogueQueue::push`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Enqueued {
    Queued,
    /// Queued, but the oldest line was evicted to make room.
    Evicted(String),
    /// Not queued; the line is handed back.
    Rejected(String),
}

#[derive(Debug, Clone)]
pub struct DialogueQueue {
    lines: VecDeque<String>,
    capacity: usize,
    policy: OverflowPolicy,
}

impl DialogueQueue {
    /// Capacity is clamped to at least one line.
    pub fn new(capacity: usize, policy: OverflowPolicy) -> Self {
        let capacity = capacity.max(1);
        Self {
            lines: VecDeque::with_capacity(capacity),
            capacity,
            policy,
        }
    }

    pub fn push(&mut self, line: impl Into<String>) -> Enqueued {
        let line = line.into();
        if self.lines.len() < self.capacity {
            self.lines.push_back(line);
            return Enqueued::Queued;
        }

        match self.policy {
            OverflowPolicy::DropOldest => {
                let evicted = self.lines.pop_front().unwrap_or_default();
                self.lines.push_back(line);
                warn!(capacity = self.capacity, "Dialogue queue full, dropped oldest line");
                Enqueued::Evicted(evicted)
            }
            OverflowPolicy::DropNewest => {
                warn!(capacity = self.capacity, "Dialogue queue full, rejected new line");
                Enqueued::Rejected(line)
            }
        }
    }

    /// Takes the next line to display.
    pub fn pop(&mut self) -> Option<String> {
        self.lines.pop_front()
    }

    pub fn peek(&self) -> Option<&str> {
        self.lines.front().map(String::as_str)
    }

    /// Empties the queue, returning how many lines were discarded.
    pub fn clear(&mut self) -> usize {
        let n = self.lines.len();
        self.lines.clear();
        n
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn policy(&self) -> OverflowPolicy {
        self.policy
    }

    pub fn snapshot(&self) -> Vec<String> {
        self.lines.iter().cloned().collect()
    }
}

impl Default for DialogueQueue {
    fn default() -> Self {
        Self::new(16, OverflowPolicy::default())
    }
}
