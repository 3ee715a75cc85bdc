//! The editable graph document.
use std::collections::BTreeMap;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{Error, Result};
use crate::graph::node::{Node, NodeKind};
use crate::graph::port::{Direction, NodeId, Port, PortId, PortRef, PortType};
use crate::random::seed_from_index;
use crate::value::Literal;

/// Directed link from an output port to an input port.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Connection {
    pub from: PortRef,
    pub to: PortRef,
}

/// Notification recorded for every successful edit.
#[derive(Clone, Debug, PartialEq)]
pub enum GraphChange {
    NodeAdded(NodeId),
    /// `downstream` lists the nodes that were reading from the removed node.
    NodeRemoved {
        node: NodeId,
        downstream: Vec<NodeId>,
    },
    Connected(Connection),
    Disconnected(Connection),
    ParamsChanged(NodeId),
    PortAdded(PortRef),
    PortRemoved(PortRef),
    SeedChanged,
}

/// Nodes, connections and the graph seed.
///
/// A graph with an `id` is *bound*: it stands for a registered landform and must
/// keep its singleton nodes.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default)]
pub struct Graph {
    id: Option<String>,
    seed: i32,
    nodes: BTreeMap<NodeId, Node>,
    connections: Vec<Connection>,
    next_node: u64,
    revision: u64,
    #[cfg_attr(feature = "serde", serde(skip))]
    changes: Vec<GraphChange>,
}

impl Graph {
    /// Creates an unbound graph.
    pub fn new(seed: i32) -> Self {
        Self {
            seed,
            ..Default::default()
        }
    }

    /// Creates a graph bound to the landform `id`.
    pub fn bound(id: impl Into<String>, seed: i32) -> Self {
        Self {
            id: Some(id.into()),
            seed,
            ..Default::default()
        }
    }

    pub fn id(&self) -> Option<&str> {
        self.id.as_deref()
    }

    pub fn is_bound(&self) -> bool {
        self.id.is_some()
    }

    pub fn seed(&self) -> i32 {
        self.seed
    }

    /// Incremented by every successful edit.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn set_seed(&mut self, seed: i32) {
        if self.seed != seed {
            self.seed = seed;
            self.record(GraphChange::SeedChanged);
        }
    }

    pub fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Nodes in insertion order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut Node> {
        self.nodes.values_mut()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Adds a node and returns its id. Adding a singleton kind replaces the
    /// existing node of that role.
    pub fn add_node(&mut self, kind: NodeKind) -> NodeId {
        if let Some(role) = kind.singleton_role() {
            let existing: Vec<NodeId> = self
                .nodes
                .values()
                .filter(|n| n.kind.singleton_role() == Some(role))
                .map(Node::id)
                .collect();
            for id in existing {
                debug!(node = %id, role, "replacing singleton node");
                self.detach(id);
            }
        }

        let id = NodeId(self.next_node);
        self.next_node += 1;
        let node = Node::new(id, kind, seed_from_index(id.0));
        self.nodes.insert(id, node);
        self.record(GraphChange::NodeAdded(id));
        id
    }

    /// Removes a node together with its connections.
    pub fn remove_node(&mut self, id: NodeId) -> Result<()> {
        let node = self.nodes.get(&id).ok_or(Error::UnknownNode(id))?;
        if let (Some(role), Some(graph)) = (node.kind.singleton_role(), self.id.as_ref()) {
            let count = self
                .nodes
                .values()
                .filter(|n| n.kind.singleton_role() == Some(role))
                .count();
            if count <= 1 {
                return Err(Error::SingletonViolation {
                    role: role.to_string(),
                    graph: graph.clone(),
                });
            }
        }
        self.detach(id);
        Ok(())
    }

    fn detach(&mut self, id: NodeId) {
        let downstream = self.downstream(id);
        self.connections
            .retain(|c| c.from.node != id && c.to.node != id);
        self.nodes.remove(&id);
        self.record(GraphChange::NodeRemoved {
            node: id,
            downstream,
        });
    }

    fn port(&self, port: PortRef) -> Result<&Port> {
        let node = self.node(port.node).ok_or(Error::UnknownNode(port.node))?;
        node.input(port.port)
            .or_else(|| node.output(port.port))
            .ok_or(Error::UnknownPort(port))
    }

    /// Resolves a port by node and declared name, searching inputs then outputs.
    pub fn port_named(&self, node: NodeId, name: &str) -> Result<PortRef> {
        let n = self.node(node).ok_or(Error::UnknownNode(node))?;
        n.input_named(name)
            .or_else(|| n.output_named(name))
            .map(|p| PortRef::new(node, p.id))
            .ok_or_else(|| Error::Other(format!("node {node} has no port named '{name}'")))
    }

    /// Connects output `from` to input `to`, replacing any connection `to` had.
    pub fn connect(&mut self, from: PortRef, to: PortRef) -> Result<()> {
        let source = self.port(from)?;
        let target = self.port(to)?;
        if source.direction != Direction::Output || target.direction != Direction::Input {
            return Err(Error::InvalidConnection {
                from,
                to,
                reason: "connections run from an output to an input".into(),
            });
        }
        if from.node == to.node {
            return Err(Error::InvalidConnection {
                from,
                to,
                reason: "a node cannot feed itself".into(),
            });
        }
        if source.ty != target.ty {
            return Err(Error::IncompatibleType {
                port: to,
                expected: target.ty,
                found: source.ty,
            });
        }

        if let Some(index) = self.connections.iter().position(|c| c.to == to) {
            let old = self.connections.remove(index);
            if old.from == from {
                self.connections.insert(index, old);
                return Ok(());
            }
            self.record(GraphChange::Disconnected(old));
        }
        let connection = Connection { from, to };
        self.connections.push(connection);
        self.record(GraphChange::Connected(connection));
        Ok(())
    }

    /// Connects ports addressed by name; see [`Graph::connect`].
    pub fn connect_named(
        &mut self,
        from: NodeId,
        output: &str,
        to: NodeId,
        input: &str,
    ) -> Result<()> {
        let from = self.port_named(from, output)?;
        let to = self.port_named(to, input)?;
        self.connect(from, to)
    }

    /// Removes the connection feeding input `to`, returning it.
    pub fn disconnect(&mut self, to: PortRef) -> Result<Option<Connection>> {
        self.port(to)?;
        let Some(index) = self.connections.iter().position(|c| c.to == to) else {
            return Ok(None);
        };
        let old = self.connections.remove(index);
        self.record(GraphChange::Disconnected(old));
        Ok(Some(old))
    }

    /// Output port feeding input `to`, if connected.
    pub fn upstream_of(&self, to: PortRef) -> Option<PortRef> {
        self.connections
            .iter()
            .find(|c| c.to == to)
            .map(|c| c.from)
    }

    /// Distinct nodes feeding `node`.
    pub fn upstream(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for c in self.connections.iter().filter(|c| c.to.node == node) {
            if !out.contains(&c.from.node) {
                out.push(c.from.node);
            }
        }
        out
    }

    /// Distinct nodes reading from `node`, in connection order.
    pub fn downstream(&self, node: NodeId) -> Vec<NodeId> {
        let mut out = Vec::new();
        for c in self.connections.iter().filter(|c| c.from.node == node) {
            if !out.contains(&c.to.node) {
                out.push(c.to.node);
            }
        }
        out
    }

    /// Nodes with no connected inputs; full recalculation starts from these.
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .keys()
            .copied()
            .filter(|id| !self.connections.iter().any(|c| c.to.node == *id))
            .collect()
    }

    /// Appends a port to `node`'s dynamic input list.
    pub fn add_dynamic_port(&mut self, node: NodeId, ty: PortType) -> Result<PortId> {
        let n = self.nodes.get_mut(&node).ok_or(Error::UnknownNode(node))?;
        let decl = n.kind.layout().dynamic.ok_or(Error::NotDynamic(node))?;
        if decl.ty != ty {
            return Err(Error::IncompatibleType {
                port: PortRef::new(node, n.next_port_id()),
                expected: decl.ty,
                found: ty,
            });
        }
        let id = n.push_dynamic(&decl);
        self.record(GraphChange::PortAdded(PortRef::new(node, id)));
        Ok(id)
    }

    /// Removes a dynamic input port, dropping its connection.
    pub fn remove_dynamic_port(&mut self, port: PortRef) -> Result<()> {
        let n = self
            .nodes
            .get_mut(&port.node)
            .ok_or(Error::UnknownNode(port.node))?;
        let decl = n.kind.layout().dynamic.ok_or(Error::NotDynamic(port.node))?;
        if !n.input(port.port).is_some_and(|p| p.dynamic) {
            return Err(Error::UnknownPort(port));
        }
        if n.dynamic_inputs().count() <= decl.min {
            return Err(Error::ArityViolation {
                node: port.node,
                min: decl.min,
            });
        }
        n.remove_dynamic(port.port, decl.prefix);
        if let Some(index) = self.connections.iter().position(|c| c.to == port) {
            let old = self.connections.remove(index);
            self.record(GraphChange::Disconnected(old));
        }
        self.record(GraphChange::PortRemoved(port));
        Ok(())
    }

    /// Edits a node's parameters in place. Edits that would change the node's port
    /// types are rolled back and rejected.
    pub fn edit_node(&mut self, id: NodeId, edit: impl FnOnce(&mut NodeKind)) -> Result<()> {
        let node = self.nodes.get_mut(&id).ok_or(Error::UnknownNode(id))?;
        let mut kind = node.kind.clone();
        edit(&mut kind);
        if kind.signature() != node.kind.signature() {
            return Err(Error::SignatureChange(id));
        }
        if kind == node.kind {
            return Ok(());
        }
        node.kind = kind;
        self.record(GraphChange::ParamsChanged(id));
        Ok(())
    }

    /// Sets the literal a disconnected input falls back to.
    pub fn set_literal(&mut self, port: PortRef, literal: Literal) -> Result<()> {
        let node = self
            .nodes
            .get_mut(&port.node)
            .ok_or(Error::UnknownNode(port.node))?;
        let input = node.input_mut(port.port).ok_or(Error::UnknownPort(port))?;
        if !input.ty.accepts(&literal) {
            return Err(Error::IncompatibleLiteral { port });
        }
        input.literal = Some(literal);
        self.record(GraphChange::ParamsChanged(port.node));
        Ok(())
    }

    /// Overrides the node-local seed combined with the graph seed.
    pub fn set_node_seed(&mut self, id: NodeId, seed: i32) -> Result<()> {
        let node = self.nodes.get_mut(&id).ok_or(Error::UnknownNode(id))?;
        if node.seed != seed {
            node.seed = seed;
            self.record(GraphChange::ParamsChanged(id));
        }
        Ok(())
    }

    /// Takes the changes recorded since the last drain.
    pub fn drain_changes(&mut self) -> Vec<GraphChange> {
        std::mem::take(&mut self.changes)
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    fn record(&mut self, change: GraphChange) {
        self.revision += 1;
        self.changes.push(change);
    }
}
