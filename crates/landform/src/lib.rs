#![forbid(unsafe_code)]
//! landform: node-graph engine for procedural terrain layers.
//!
//! Modules:
//! - supplier: lazy, resettable value sources (constants, seeded draws, folds, selects)
//! - grid: pure 2D grid functions and combinators (arithmetic, smooth blends, transforms, span distance, noise, select)
//! - graph: nodes, typed ports, connections and the editable graph document
//! - engine: full and localized recalculation with work-list propagation, events
//! - output: per-channel results, host map configuration and baking
//!
//! Typical flow: build a [`graph::Graph`], run [`engine::Engine::traverse_all`], then
//! sample the grids returned by [`output::GraphOutputs::collect`].
pub mod context;
pub mod engine;
pub mod error;
pub mod graph;
pub mod grid;
mod nodes;
pub mod operation;
pub mod output;
pub mod random;
pub mod supplier;
pub mod value;

pub use nodes::CompileContext;

/// Convenient re-exports for common types. Import with `use landform::prelude::*;`.
pub mod prelude {
    pub use crate::context::{CoastSides, Hilliness, LinearFeature, Side, Topology, WorldTileInfo};
    pub use crate::engine::events::{
        EventSink, FnSink, TraversalEvent, TraversalEventKind, VecSink,
    };
    pub use crate::engine::{Engine, TraversalReport};
    pub use crate::error::{Error, Result};
    pub use crate::graph::{
        Connection, FloatRange, Graph, GraphChange, GridLinearParams, GridNoiseParams,
        ManifestParams, Node, NodeId, NodeKind, OperatorParams, OperatorTarget, OutputChannel,
        PortId, PortRef, PortType, RandomValueParams, SelectParams, TileRequirementsParams,
        TokenToValueParams,
    };
    pub use crate::grid::{GridFunction, NoiseFunction, NoiseSettings, NoiseType, SpanDistance};
    pub use crate::operation::Operation;
    pub use crate::output::{GraphOutputs, MapGrid, Raster};
    pub use crate::supplier::Supplier;
    pub use crate::value::{
        Literal, PortValue, Token, TokenGrid, TokenKind, TokenSupplier, ValueGrid, ValueSupplier,
    };
}
