//! Graph model: nodes with typed ports, connections and the editable document.
//!
//! Structural edits go through [`Graph`], which validates them synchronously
//! (type tags, arity, singletons) and records a [`GraphChange`] for each one.
//! The traversal engine drains those changes to decide what to recompile.
pub mod document;
pub mod node;
pub mod port;

pub use document::{Connection, Graph, GraphChange};
pub use node::{
    FloatRange, GridLinearParams, GridNoiseParams, ManifestParams, Node, NodeKind, NodeLayout,
    OperatorParams, OperatorTarget, OutputChannel, RandomValueParams, SelectParams,
    TileRequirementsParams, TokenToValueParams, WORLD_TILE_OUTPUTS,
};
pub use port::{Direction, DynamicDecl, NodeId, Port, PortDecl, PortId, PortRef, PortType};
