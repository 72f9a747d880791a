//! Structured event trace.
//!
//! A side channel for observability: every event push, failure, revert,
//! and stack resolution lands here as a typed entry. Game logic never
//! reads the trace.

use im::Vector;
use serde::Serialize;

use crate::core::ObjectId;
use crate::game::turn::Phase;

/// One trace record.
///
/// Serializes for export to external logging; never deserialized (the
/// trace is an outbound side channel only).
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum TraceEntry {
    /// An event applied successfully at the given nesting depth.
    Applied { name: &'static str, depth: usize },
    /// An event's preconditions failed.
    Failed { name: &'static str, depth: usize },
    /// An event's own action was undone.
    Reverted { name: &'static str },
    /// A strict revert was refused because the subtree is irreversible.
    RevertRefused { name: &'static str },
    /// A zone move into the battlefield was silently denied.
    MoveDenied { object: ObjectId },
    /// The top of the stack resolved.
    StackResolved { object: ObjectId },
    /// A phase began.
    PhaseStarted { phase: Phase, turn: u32 },
    /// A choice was put to the decision source.
    ChoiceRequested { title: String },
}

/// Append-only trace log.
#[derive(Clone, Debug, Default)]
pub struct TraceBus {
    log: Vector<TraceEntry>,
}

impl TraceBus {
    /// Create an empty trace.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry.
    pub fn push(&mut self, entry: TraceEntry) {
        self.log.push_back(entry);
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.log.len()
    }

    /// True if nothing has been traced.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.log.is_empty()
    }

    /// Iterate entries oldest-first.
    pub fn entries(&self) -> impl Iterator<Item = &TraceEntry> {
        self.log.iter()
    }

    /// Count entries matching a predicate.
    #[must_use]
    pub fn count_where(&self, predicate: impl Fn(&TraceEntry) -> bool) -> usize {
        self.log.iter().filter(|e| predicate(e)).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_push_and_iterate() {
        let mut trace = TraceBus::new();
        assert!(trace.is_empty());

        trace.push(TraceEntry::Applied {
            name: "Tap",
            depth: 0,
        });
        trace.push(TraceEntry::Reverted { name: "Tap" });

        assert_eq!(trace.len(), 2);
        let names: Vec<_> = trace.entries().collect();
        assert_eq!(
            names[0],
            &TraceEntry::Applied {
                name: "Tap",
                depth: 0
            }
        );
    }

    #[test]
    fn test_count_where() {
        let mut trace = TraceBus::new();
        trace.push(TraceEntry::Applied {
            name: "Tap",
            depth: 0,
        });
        trace.push(TraceEntry::Applied {
            name: "Draw",
            depth: 1,
        });

        let applied = trace.count_where(|e| matches!(e, TraceEntry::Applied { .. }));
        assert_eq!(applied, 2);
    }
}
