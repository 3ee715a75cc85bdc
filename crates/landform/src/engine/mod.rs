//! Dependency-ordered recalculation of a [`Graph`].
//!
//! [`Engine::traverse_all`] recompiles every node; [`Engine::on_change`] recompiles a
//! node and everything downstream of it while leaving upstream nodes untouched;
//! [`Engine::apply_changes`] drains the graph's change log and picks between the two.
//!
//! Nodes become eligible once every node they read from is settled. A successful
//! compile pushes straight into the nodes reading from it, so no topological order
//! is computed up front. Compile failures and unsatisfiable dependencies (cycles,
//! nodes that can never compile) are logged and reported; they never abort a pass.
use tracing::info;

use crate::context::WorldTileInfo;
use crate::error::Error;
use crate::graph::{Graph, GraphChange, NodeId};
use crate::nodes::CompileContext;

pub mod events;
mod traversal;

use events::{EventSink, TraversalEvent, TraversalEventKind};
use traversal::Pass;

/// Summary of one recalculation pass.
#[derive(Debug, Clone, Default)]
pub struct TraversalReport {
    /// Nodes compiled successfully, in compile order.
    pub calculated: Vec<NodeId>,
    /// Node compile failures, then an unsatisfiable-dependency error if the pass stalled.
    pub failures: Vec<Error>,
    /// Nodes left uncalculated.
    pub stalled: Vec<NodeId>,
}

impl TraversalReport {
    /// Whether every node in the pass compiled.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.stalled.is_empty()
    }
}

/// Runs compile passes for graphs generated against one world tile.
#[derive(Debug, Clone, Default)]
pub struct Engine {
    tile: WorldTileInfo,
}

impl Engine {
    pub fn new(tile: WorldTileInfo) -> Self {
        Self { tile }
    }

    pub fn tile(&self) -> &WorldTileInfo {
        &self.tile
    }

    /// Replaces the world tile. Compiled outputs are stale until the next full pass.
    pub fn set_tile(&mut self, tile: WorldTileInfo) {
        self.tile = tile;
    }

    fn context(&self, graph: &Graph) -> CompileContext<'_> {
        CompileContext {
            tile: &self.tile,
            graph_seed: graph.seed(),
        }
    }

    /// Recompiles every node of `graph` and discards its pending change log.
    pub fn traverse_all(&self, graph: &mut Graph) -> TraversalReport {
        self.traverse_all_with_events(graph, &mut ())
    }

    pub fn traverse_all_with_events(
        &self,
        graph: &mut Graph,
        sink: &mut dyn EventSink,
    ) -> TraversalReport {
        // A full pass covers every edit recorded so far.
        graph.drain_changes();
        let ctx = self.context(graph);
        let mut pass = Pass::new(graph, ctx, sink);
        pass.seed_all();
        pass.announce(true);
        let report = pass.run();
        finish(report, sink)
    }

    /// Recompiles `node` and every node reachable forward from it.
    pub fn on_change(&self, graph: &mut Graph, node: NodeId) -> TraversalReport {
        self.recalculate_with_events(graph, &[node], &mut ())
    }

    /// Recompiles `seeds` and every node reachable forward from them in one pass.
    pub fn recalculate(&self, graph: &mut Graph, seeds: &[NodeId]) -> TraversalReport {
        self.recalculate_with_events(graph, seeds, &mut ())
    }

    pub fn recalculate_with_events(
        &self,
        graph: &mut Graph,
        seeds: &[NodeId],
        sink: &mut dyn EventSink,
    ) -> TraversalReport {
        let seeds: Vec<NodeId> = seeds
            .iter()
            .copied()
            .filter(|id| graph.node(*id).is_some())
            .collect();
        let ctx = self.context(graph);
        let mut pass = Pass::new(graph, ctx, sink);
        pass.seed_changed(&seeds);
        pass.announce(false);
        let report = pass.run();
        finish(report, sink)
    }

    /// Drains `graph`'s change log and recalculates what it touched. A seed change
    /// triggers a full pass.
    pub fn apply_changes(&self, graph: &mut Graph) -> TraversalReport {
        self.apply_changes_with_events(graph, &mut ())
    }

    pub fn apply_changes_with_events(
        &self,
        graph: &mut Graph,
        sink: &mut dyn EventSink,
    ) -> TraversalReport {
        let changes = graph.drain_changes();
        if changes.is_empty() {
            return TraversalReport::default();
        }
        if changes.iter().any(|c| matches!(c, GraphChange::SeedChanged)) {
            return self.traverse_all_with_events(graph, sink);
        }
        let seeds = affected_nodes(&changes);
        self.recalculate_with_events(graph, &seeds, sink)
    }
}

/// Nodes whose compiled output an edit may have changed, in first-seen order.
fn affected_nodes(changes: &[GraphChange]) -> Vec<NodeId> {
    let mut out: Vec<NodeId> = Vec::new();
    let mut push = |id: NodeId| {
        if !out.contains(&id) {
            out.push(id);
        }
    };
    for change in changes {
        match change {
            GraphChange::NodeAdded(id) | GraphChange::ParamsChanged(id) => push(*id),
            GraphChange::NodeRemoved { downstream, .. } => downstream.iter().for_each(|id| push(*id)),
            GraphChange::Connected(c) | GraphChange::Disconnected(c) => {
                push(c.from.node);
                push(c.to.node);
            }
            GraphChange::PortAdded(p) | GraphChange::PortRemoved(p) => push(p.node),
            GraphChange::SeedChanged => {}
        }
    }
    out
}

fn finish(report: TraversalReport, sink: &mut dyn EventSink) -> TraversalReport {
    info!(
        "Recalculated {} node(s); {} failure(s), {} stalled.",
        report.calculated.len(),
        report.failures.len(),
        report.stalled.len()
    );
    if sink.wants(TraversalEventKind::PassFinished) {
        sink.send(TraversalEvent::PassFinished {
            report: report.clone(),
        });
    }
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::events::VecSink;
    use crate::graph::{NodeKind, OperatorTarget};
    use crate::operation::Operation;

    /// a -> b -> c where b and c are single-input operators.
    fn chain(g: &mut Graph) -> (NodeId, NodeId, NodeId) {
        let a = g.add_node(NodeKind::constant(1.0));
        let b = g.add_node(NodeKind::operator(OperatorTarget::Value, Operation::Add, 1.0));
        let c = g.add_node(NodeKind::operator(OperatorTarget::Value, Operation::Add, 1.0));
        g.connect_named(a, "value", b, "input0").unwrap();
        g.connect_named(b, "result", c, "input0").unwrap();
        (a, b, c)
    }

    fn value_of(g: &Graph, id: NodeId) -> Option<f32> {
        g.node(id)?.primary_value()?.as_value().map(|s| s.get())
    }

    #[test]
    fn full_pass_compiles_in_dependency_order() {
        let mut g = Graph::new(0);
        let (a, b, c) = chain(&mut g);
        let report = Engine::default().traverse_all(&mut g);
        assert!(report.is_complete());
        let pos = |id| report.calculated.iter().position(|n| *n == id).unwrap();
        assert!(pos(a) < pos(b) && pos(b) < pos(c));
        assert_eq!(value_of(&g, c), Some(1.0));
    }

    #[test]
    fn on_change_leaves_upstream_alone() {
        let mut g = Graph::new(0);
        let (a, b, c) = chain(&mut g);
        let engine = Engine::default();
        engine.traverse_all(&mut g);

        g.edit_node(b, |kind| {
            if let NodeKind::Operator { params } = kind {
                params.operation = Operation::Multiply;
            }
        })
        .unwrap();
        let report = engine.on_change(&mut g, b);
        assert_eq!(report.calculated, vec![b, c]);
        assert!(g.node(a).unwrap().is_calculated());
        // 1 * literal 0
        assert_eq!(value_of(&g, c), Some(0.0));
    }

    #[test]
    fn cycles_stall_without_panicking() {
        let mut g = Graph::new(0);
        let x = g.add_node(NodeKind::operator(OperatorTarget::Value, Operation::Add, 1.0));
        let y = g.add_node(NodeKind::operator(OperatorTarget::Value, Operation::Add, 1.0));
        g.connect_named(x, "result", y, "input0").unwrap();
        g.connect_named(y, "result", x, "input0").unwrap();

        let mut sink = VecSink::only(&[TraversalEventKind::Stalled]);
        let report = Engine::default().traverse_all_with_events(&mut g, &mut sink);
        assert_eq!(report.stalled, vec![x, y]);
        assert!(matches!(
            report.failures.last(),
            Some(Error::UnsatisfiableDependency { .. })
        ));
        assert!(!g.node(x).unwrap().is_calculated());
        assert!(!g.node(y).unwrap().is_calculated());
        assert_eq!(sink.len(), 1);
    }

    #[test]
    fn failed_upstream_degrades_to_absent_input() {
        let mut g = Graph::new(0);
        let broken = g.add_node(NodeKind::GridInvert);
        let sum = g.add_node(NodeKind::operator(OperatorTarget::ValueGrid, Operation::Add, 1.0));
        let out = g.add_node(NodeKind::output(crate::graph::OutputChannel::Elevation));
        g.connect_named(broken, "grid", sum, "input0").unwrap();
        g.connect_named(sum, "result", out, "input").unwrap();
        let literal = g.port_named(sum, "input1").unwrap();
        g.set_literal(literal, crate::value::Literal::Number(4.0))
            .unwrap();

        let report = Engine::default().traverse_all(&mut g);
        assert_eq!(report.stalled, vec![broken]);
        assert!(g.node(out).unwrap().is_calculated());
        let grid = g
            .node(out)
            .and_then(|n| n.result())
            .and_then(|v| v.as_value_grid())
            .unwrap();
        assert_eq!(grid.value_at(glam::Vec2::ZERO), 4.0);
    }

    #[test]
    fn apply_changes_recalculates_touched_nodes() {
        let mut g = Graph::new(0);
        let (a, b, c) = chain(&mut g);
        let engine = Engine::default();
        let first = engine.apply_changes(&mut g);
        assert_eq!(first.calculated.len(), 3);

        g.edit_node(a, |kind| *kind = NodeKind::constant(5.0)).unwrap();
        let report = engine.apply_changes(&mut g);
        assert_eq!(report.calculated, vec![a, b, c]);
        assert_eq!(value_of(&g, c), Some(5.0));

        assert!(engine.apply_changes(&mut g).calculated.is_empty());

        g.set_seed(9);
        let mut sink = VecSink::only(&[TraversalEventKind::PassStarted]);
        engine.apply_changes_with_events(&mut g, &mut sink);
        assert!(matches!(
            sink.as_slice()[0],
            TraversalEvent::PassStarted { full: true, .. }
        ));
    }

    #[test]
    fn full_pass_clears_the_change_log() {
        let mut g = Graph::new(0);
        let a = g.add_node(NodeKind::random(0.0, 1.0));
        let b = g.add_node(NodeKind::operator(OperatorTarget::Value, Operation::Add, 1.0));
        let c = g.add_node(NodeKind::operator(OperatorTarget::Value, Operation::Add, 1.0));
        g.connect_named(a, "value", b, "input0").unwrap();
        g.connect_named(b, "result", c, "input0").unwrap();
        let engine = Engine::default();
        engine.traverse_all(&mut g);
        assert!(!g.has_pending_changes());
        let drawn = g.node(a).unwrap().primary_value().cloned().unwrap();

        g.edit_node(b, |kind| {
            if let NodeKind::Operator { params } = kind {
                params.operation = Operation::Multiply;
            }
        })
        .unwrap();
        let report = engine.apply_changes(&mut g);
        assert_eq!(report.calculated, vec![b, c]);
        let kept = g.node(a).unwrap().primary_value().unwrap();
        assert!(std::sync::Arc::ptr_eq(
            drawn.as_value().unwrap(),
            kept.as_value().unwrap()
        ));
    }

    #[test]
    fn pass_started_reports_the_seeded_work_list() {
        let mut g = Graph::new(0);
        let (a, b, c) = chain(&mut g);
        let engine = Engine::default();
        let mut sink = VecSink::only(&[TraversalEventKind::PassStarted]);
        engine.traverse_all_with_events(&mut g, &mut sink);
        assert!(matches!(
            &sink.as_slice()[0],
            TraversalEvent::PassStarted { full: true, seeds } if seeds == &vec![a, b, c]
        ));

        sink.clear();
        engine.recalculate_with_events(&mut g, &[b], &mut sink);
        assert!(matches!(
            &sink.as_slice()[0],
            TraversalEvent::PassStarted { full: false, seeds } if seeds == &vec![b]
        ));
    }
}
