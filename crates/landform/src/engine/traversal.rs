//! Work-list propagation shared by full and localized recalculation.
use std::collections::HashSet;

use tracing::{debug, error, warn};

use crate::engine::events::{EventSink, TraversalEvent, TraversalEventKind};
use crate::engine::TraversalReport;
use crate::error::Error;
use crate::graph::{Graph, NodeId};
use crate::nodes::{compile, CompileContext};

enum Outcome {
    Calculated,
    /// `true` on the first failure of the node within this pass.
    Failed(bool),
    Blocked,
}

/// State of one recalculation pass.
///
/// `pending` holds the nodes this pass must (re)compute. An upstream node is
/// settled once it is no longer pending or has failed during this pass; a failed
/// or stale upstream contributes no value.
pub(crate) struct Pass<'a> {
    graph: &'a mut Graph,
    ctx: CompileContext<'a>,
    sink: &'a mut dyn EventSink,
    pending: HashSet<NodeId>,
    failed: HashSet<NodeId>,
    work: Vec<NodeId>,
    report: TraversalReport,
}

impl<'a> Pass<'a> {
    pub fn new(
        graph: &'a mut Graph,
        ctx: CompileContext<'a>,
        sink: &'a mut dyn EventSink,
    ) -> Self {
        Self {
            graph,
            ctx,
            sink,
            pending: HashSet::new(),
            failed: HashSet::new(),
            work: Vec::new(),
            report: TraversalReport::default(),
        }
    }

    /// Invalidates every node and seeds the work-list with all of them, roots first.
    pub fn seed_all(&mut self) {
        for node in self.graph.nodes_mut() {
            node.clear_compiled();
        }
        let roots = self.graph.roots();
        let rest: Vec<NodeId> = self
            .graph
            .node_ids()
            .filter(|id| !roots.contains(id))
            .collect();
        self.pending = roots.iter().chain(rest.iter()).copied().collect();
        self.work = roots;
        self.work.extend(rest);
    }

    /// Invalidates `seeds` and everything reachable forward from them, then seeds
    /// the work-list with `seeds` only.
    pub fn seed_changed(&mut self, seeds: &[NodeId]) {
        let mut stack: Vec<NodeId> = seeds.to_vec();
        while let Some(id) = stack.pop() {
            if self.pending.insert(id) {
                stack.extend(self.graph.downstream(id));
            }
        }
        for id in &self.pending {
            if let Some(node) = self.graph.node_mut(*id) {
                node.clear_compiled();
            }
        }
        self.work = seeds.to_vec();
    }

    /// Emits `PassStarted` with the seeded work-list.
    pub fn announce(&mut self, full: bool) {
        if self.sink.wants(TraversalEventKind::PassStarted) {
            self.sink.send(TraversalEvent::PassStarted {
                full,
                seeds: self.work.clone(),
            });
        }
    }

    fn settled(&self, id: NodeId) -> bool {
        !self.pending.contains(&id) || self.failed.contains(&id)
    }

    fn eligible(&self, id: NodeId) -> bool {
        self.graph.upstream(id).into_iter().all(|u| self.settled(u))
    }

    fn enqueue(&mut self, id: NodeId) {
        if !self.work.contains(&id) {
            self.work.push(id);
        }
    }

    fn try_compile(&mut self, id: NodeId) -> Outcome {
        if !self.eligible(id) {
            return Outcome::Blocked;
        }
        let result = match self.graph.node(id) {
            Some(node) => compile(&*self.graph, node, &self.ctx),
            None => Err(Error::UnknownNode(id)),
        };
        let Some(node) = self.graph.node_mut(id) else {
            self.pending.remove(&id);
            return Outcome::Blocked;
        };
        match result {
            Ok(compiled) => {
                node.values = compiled.outputs;
                node.values.resize(node.outputs.len(), None);
                node.result = compiled.result;
                node.calculated = true;
                let kind = node.kind.name();
                debug!(node = %id, kind, "node calculated");
                if self.sink.wants(TraversalEventKind::NodeCalculated) {
                    self.sink
                        .send(TraversalEvent::calculated(id, &node.kind));
                }
                self.pending.remove(&id);
                self.failed.remove(&id);
                self.report.calculated.push(id);
                Outcome::Calculated
            }
            Err(err) => {
                node.clear_compiled();
                let first = self.failed.insert(id);
                if first {
                    warn!("Node {} ({}) failed to compile: {}", id, node.kind.name(), err);
                    if self.sink.wants(TraversalEventKind::CompileFailed) {
                        self.sink.send(TraversalEvent::CompileFailed {
                            node: id,
                            error: err.clone(),
                        });
                    }
                    self.report.failures.push(err);
                }
                Outcome::Failed(first)
            }
        }
    }

    /// Depth-first push from `start` into every node reading from it.
    fn push_forward(&mut self, start: NodeId) {
        let mut stack: Vec<NodeId> = self.graph.downstream(start);
        stack.reverse();
        while let Some(next) = stack.pop() {
            if !self.pending.contains(&next) || self.failed.contains(&next) {
                continue;
            }
            self.enqueue(next);
            match self.try_compile(next) {
                Outcome::Calculated | Outcome::Failed(true) => {
                    let mut downstream = self.graph.downstream(next);
                    downstream.reverse();
                    stack.extend(downstream);
                }
                Outcome::Failed(false) | Outcome::Blocked => {}
            }
        }
    }

    /// Runs scans until the work-list empties or a scan makes no progress. Nodes
    /// still pending afterwards are reported as stalled.
    pub fn run(mut self) -> TraversalReport {
        loop {
            let mut progress = false;
            let scan = self.work.clone();
            for id in scan {
                if !self.pending.contains(&id) {
                    continue;
                }
                match self.try_compile(id) {
                    Outcome::Calculated | Outcome::Failed(true) => {
                        progress = true;
                        self.push_forward(id);
                    }
                    Outcome::Failed(false) | Outcome::Blocked => {}
                }
            }
            let pending = &self.pending;
            self.work.retain(|id| pending.contains(id));
            if self.work.is_empty() || !progress {
                break;
            }
        }

        if !self.pending.is_empty() {
            let mut stalled: Vec<NodeId> = self.pending.iter().copied().collect();
            stalled.sort();
            let err = Error::UnsatisfiableDependency {
                nodes: stalled.clone(),
            };
            error!("{}", err);
            if self.sink.wants(TraversalEventKind::Stalled) {
                self.sink.send(TraversalEvent::Stalled {
                    nodes: stalled.clone(),
                });
            }
            self.report.failures.push(err);
            self.report.stalled = stalled;
        }
        self.report
    }
}
