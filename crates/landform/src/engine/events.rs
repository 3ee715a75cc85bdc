//! Event types and sinks for observing recalculation passes.
//!
//! This module defines [`TraversalEvent`] and a set of sinks to collect or forward
//! events while running [`crate::engine::Engine::traverse_all_with_events`] or
//! [`crate::engine::Engine::recalculate_with_events`].
use crate::engine::TraversalReport;
use crate::error::Error;
use crate::graph::{NodeId, NodeKind};

/// Describes events emitted during a recalculation pass.
#[non_exhaustive]
#[derive(Debug, Clone)]
pub enum TraversalEvent {
    /// Emitted when a pass starts.
    PassStarted {
        /// Whether every node is recalculated.
        full: bool,
        /// Nodes the work-list was seeded with: every node, roots first, for a
        /// full pass.
        seeds: Vec<NodeId>,
    },

    /// Emitted after a node compiled successfully.
    NodeCalculated {
        node: NodeId,
        /// Name of the node kind.
        kind: &'static str,
    },

    /// Emitted the first time a node fails to compile within a pass.
    CompileFailed {
        node: NodeId,
        error: Error,
    },

    /// Emitted when a scan makes no progress with nodes still pending.
    Stalled {
        /// Nodes left uncalculated.
        nodes: Vec<NodeId>,
    },

    /// Emitted when the pass finishes.
    PassFinished {
        /// Summary of the pass.
        report: TraversalReport,
    },
}

/// Discriminant of a [`TraversalEvent`], used for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TraversalEventKind {
    PassStarted,
    NodeCalculated,
    CompileFailed,
    Stalled,
    PassFinished,
}

impl TraversalEvent {
    pub fn kind(&self) -> TraversalEventKind {
        match self {
            TraversalEvent::PassStarted { .. } => TraversalEventKind::PassStarted,
            TraversalEvent::NodeCalculated { .. } => TraversalEventKind::NodeCalculated,
            TraversalEvent::CompileFailed { .. } => TraversalEventKind::CompileFailed,
            TraversalEvent::Stalled { .. } => TraversalEventKind::Stalled,
            TraversalEvent::PassFinished { .. } => TraversalEventKind::PassFinished,
        }
    }

    pub(crate) fn calculated(node: NodeId, kind: &NodeKind) -> Self {
        TraversalEvent::NodeCalculated {
            node,
            kind: kind.name(),
        }
    }
}

/// A generic event sink that accepts [`TraversalEvent`]s.
pub trait EventSink {
    fn send(&mut self, event: TraversalEvent);

    /// Whether events of `kind` should be built at all. Defaults to all kinds.
    fn wants(&self, _kind: TraversalEventKind) -> bool {
        true
    }
}

/// A no-op event sink.
impl EventSink for () {
    #[inline]
    fn send(&mut self, _event: TraversalEvent) {}

    #[inline]
    fn wants(&self, _kind: TraversalEventKind) -> bool {
        false
    }
}

/// An event sink that forwards to a user-provided closure.
pub struct FnSink<F>
where
    F: FnMut(TraversalEvent),
{
    f: F,
}

impl<F> FnSink<F>
where
    F: FnMut(TraversalEvent),
{
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

impl<F> EventSink for FnSink<F>
where
    F: FnMut(TraversalEvent),
{
    #[inline]
    fn send(&mut self, event: TraversalEvent) {
        (self.f)(event);
    }
}

/// An event sink that collects events in a `Vec`, optionally restricted to some kinds.
#[derive(Default)]
pub struct VecSink {
    events: Vec<TraversalEvent>,
    only: Option<Vec<TraversalEventKind>>,
}

impl VecSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Collects only events of the listed kinds.
    pub fn only(kinds: &[TraversalEventKind]) -> Self {
        Self {
            events: Vec::new(),
            only: Some(kinds.to_vec()),
        }
    }

    pub fn into_inner(self) -> Vec<TraversalEvent> {
        self.events
    }

    pub fn as_slice(&self) -> &[TraversalEvent] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

impl EventSink for VecSink {
    #[inline]
    fn send(&mut self, event: TraversalEvent) {
        if self.wants(event.kind()) {
            self.events.push(event);
        }
    }

    fn wants(&self, kind: TraversalEventKind) -> bool {
        self.only.as_ref().is_none_or(|kinds| kinds.contains(&kind))
    }
}
