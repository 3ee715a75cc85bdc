//! Per-node compile steps.
//!
//! [`compile`] turns one node plus the compiled outputs of its upstream nodes into
//! fresh supplier and grid trees. Inputs resolve in three ways:
//! - connected to an upstream that produced a value: that value;
//! - connected to an upstream without a value: absent, which each node family
//!   handles as its neutral case;
//! - disconnected: the port's literal, or missing when it has none.
use std::sync::Arc;

use tracing::warn;

use crate::context::WorldTileInfo;
use crate::error::{Error, Result};
use crate::graph::{Graph, Node, NodeKind, Port, PortRef};
use crate::grid::{Const as ConstGrid, GridFunction};
use crate::random::combined_seed;
use crate::supplier::{Const as ConstSupplier, Supplier};
use crate::value::{Literal, PortValue, Token, ValueGrid, ValueSupplier};

mod grid;
mod operator;
mod select;
mod value;
mod world;

/// Read-only inputs shared by every compile step of a pass.
#[derive(Clone, Copy, Debug)]
pub struct CompileContext<'a> {
    pub tile: &'a WorldTileInfo,
    pub graph_seed: i32,
}

impl CompileContext<'_> {
    /// Seed for `node`'s random streams.
    pub fn seed_for(&self, node: &Node) -> i32 {
        combined_seed(node.seed(), self.graph_seed)
    }
}

/// Result of a successful compile step.
#[derive(Clone, Debug, Default)]
pub(crate) struct Compiled {
    /// One entry per output port, in port order.
    pub outputs: Vec<Option<PortValue>>,
    /// Value captured by an output node.
    pub result: Option<PortValue>,
}

impl Compiled {
    fn single(value: PortValue) -> Self {
        Self {
            outputs: vec![Some(value)],
            result: None,
        }
    }
}

/// How an input port resolved.
#[derive(Clone, Debug)]
pub(crate) enum Input {
    Connected(PortValue),
    Absent,
    Literal(Literal),
    Missing,
}

/// Input lookup for one node.
pub(crate) struct Inputs<'g> {
    graph: &'g Graph,
    node: &'g Node,
}

impl<'g> Inputs<'g> {
    pub fn new(graph: &'g Graph, node: &'g Node) -> Self {
        Self { graph, node }
    }

    pub fn node(&self) -> &'g Node {
        self.node
    }

    pub fn resolve(&self, port: &Port) -> Input {
        let at = PortRef::new(self.node.id(), port.id);
        match self.graph.upstream_of(at) {
            Some(from) => match self
                .graph
                .node(from.node)
                .and_then(|n| n.value(from.port))
            {
                Some(value) => Input::Connected(value.clone()),
                None => Input::Absent,
            },
            None => match &port.literal {
                Some(literal) => Input::Literal(literal.clone()),
                None => Input::Missing,
            },
        }
    }

    fn named(&self, name: &str) -> Result<&'g Port> {
        self.node
            .input_named(name)
            .ok_or_else(|| Error::compile(self.node.id(), format!("no input named '{name}'")))
    }

    /// Resolves an input, substituting the port literal for an absent upstream.
    fn with_fallback(&self, port: &Port) -> Input {
        match self.resolve(port) {
            Input::Absent => {
                warn!(
                    "Input '{}' of node {} has no upstream value; using its literal.",
                    port.name,
                    self.node.id()
                );
                port.literal
                    .clone()
                    .map_or(Input::Missing, Input::Literal)
            }
            other => other,
        }
    }

    /// Scalar supplier for a `Value` input.
    pub fn value(&self, name: &str) -> Result<Option<ValueSupplier>> {
        let port = self.named(name)?;
        Ok(match self.with_fallback(port) {
            Input::Connected(v) => v.as_value().cloned(),
            Input::Literal(l) => Some(Arc::new(ConstSupplier(l.as_number()))),
            Input::Absent | Input::Missing => None,
        })
    }

    /// Numeric grid for a `ValueGrid` input.
    pub fn value_grid(&self, name: &str) -> Result<Option<ValueGrid>> {
        let port = self.named(name)?;
        Ok(match self.with_fallback(port) {
            Input::Connected(v) => v.as_value_grid().cloned(),
            Input::Literal(l) => Some(Arc::new(ConstGrid(l.as_number()))),
            Input::Absent | Input::Missing => None,
        })
    }

    /// Like [`Inputs::value_grid`] but fails the compile when nothing is available.
    pub fn require_value_grid(&self, name: &str) -> Result<ValueGrid> {
        self.value_grid(name)?.ok_or_else(|| {
            Error::compile(self.node.id(), format!("required input '{name}' has no value"))
        })
    }

    /// Reads a scalar input once, for parameters baked into a grid.
    pub fn read_value(&self, name: &str) -> Result<Option<f32>> {
        Ok(self.value(name)?.map(|s| read(&*s)))
    }
}

/// Value of `supplier` at the start of a pass.
pub(crate) fn read<T>(supplier: &dyn Supplier<T>) -> T {
    supplier.reset_state();
    supplier.get()
}

/// Value shapes a generic node family can carry: numbers and optional tokens.
pub(crate) trait Shape: Clone + Default + Send + Sync + 'static {
    fn supplier(value: &PortValue) -> Option<Arc<dyn Supplier<Self>>>;
    fn grid(value: &PortValue) -> Option<Arc<dyn GridFunction<Self>>>;
    fn from_literal(literal: &Literal) -> Self;
    fn wrap_supplier(supplier: Arc<dyn Supplier<Self>>) -> PortValue;
    fn wrap_grid(grid: Arc<dyn GridFunction<Self>>) -> PortValue;

    /// Input as a supplier; absent or missing inputs yield the default.
    fn input_supplier(input: Input) -> Arc<dyn Supplier<Self>> {
        match input {
            Input::Connected(v) => Self::supplier(&v),
            Input::Literal(l) => {
                Some(Arc::new(ConstSupplier(Self::from_literal(&l))) as Arc<dyn Supplier<Self>>)
            }
            Input::Absent | Input::Missing => None,
        }
        .unwrap_or_else(|| Arc::new(ConstSupplier(Self::default())))
    }

    /// Input lifted to a grid. Scalar inputs are read once and held constant.
    fn input_grid(input: Input) -> Arc<dyn GridFunction<Self>> {
        match input {
            Input::Connected(v) => Self::grid(&v).or_else(|| {
                Self::supplier(&v).map(|s| Arc::new(ConstGrid(read(&*s))) as Arc<dyn GridFunction<Self>>)
            }),
            Input::Literal(l) => {
                Some(Arc::new(ConstGrid(Self::from_literal(&l))) as Arc<dyn GridFunction<Self>>)
            }
            Input::Absent | Input::Missing => None,
        }
        .unwrap_or_else(|| Arc::new(ConstGrid(Self::default())))
    }
}

impl Shape for f32 {
    fn supplier(value: &PortValue) -> Option<Arc<dyn Supplier<Self>>> {
        value.as_value().cloned()
    }

    fn grid(value: &PortValue) -> Option<Arc<dyn GridFunction<Self>>> {
        value.as_value_grid().cloned()
    }

    fn from_literal(literal: &Literal) -> Self {
        literal.as_number()
    }

    fn wrap_supplier(supplier: Arc<dyn Supplier<Self>>) -> PortValue {
        PortValue::Value(supplier)
    }

    fn wrap_grid(grid: Arc<dyn GridFunction<Self>>) -> PortValue {
        PortValue::ValueGrid(grid)
    }
}

impl Shape for Option<Token> {
    fn supplier(value: &PortValue) -> Option<Arc<dyn Supplier<Self>>> {
        value.as_token().cloned()
    }

    fn grid(value: &PortValue) -> Option<Arc<dyn GridFunction<Self>>> {
        value.as_token_grid().cloned()
    }

    fn from_literal(literal: &Literal) -> Self {
        literal.as_token()
    }

    fn wrap_supplier(supplier: Arc<dyn Supplier<Self>>) -> PortValue {
        PortValue::Token(supplier)
    }

    fn wrap_grid(grid: Arc<dyn GridFunction<Self>>) -> PortValue {
        PortValue::TokenGrid(grid)
    }
}

/// Runs the compile step of `node` against the current state of `graph`.
pub(crate) fn compile(graph: &Graph, node: &Node, ctx: &CompileContext<'_>) -> Result<Compiled> {
    let inputs = Inputs::new(graph, node);
    let seed = ctx.seed_for(node);
    match node.kind() {
        NodeKind::Manifest { .. } | NodeKind::TileRequirements { .. } => Ok(Compiled::default()),
        NodeKind::WorldTile => Ok(world::compile(ctx.tile)),
        NodeKind::ConstValue { value } => Ok(Compiled::single(PortValue::constant(*value))),
        NodeKind::RandomValue { params } => Ok(Compiled::single(value::random(params, seed))),
        NodeKind::ConstToken { token, .. } => Ok(Compiled::single(PortValue::Token(Arc::new(
            ConstSupplier(token.clone()),
        )))),
        NodeKind::TokenToValue { params } => value::token_to_value(&inputs, params).map(Compiled::single),
        NodeKind::GridFromValue => grid::from_value(&inputs).map(Compiled::single),
        NodeKind::GridNoise { params } => Ok(Compiled::single(grid::noise(params, seed))),
        NodeKind::GridSpanDistance { params } => {
            Ok(Compiled::single(PortValue::ValueGrid(Arc::new(params.clone()))))
        }
        NodeKind::GridRotate { pivot } => grid::rotate(&inputs, *pivot).map(Compiled::single),
        NodeKind::GridTransform { translate, scale } => {
            grid::transform(&inputs, *translate, *scale).map(Compiled::single)
        }
        NodeKind::GridLinear { params } => grid::linear(&inputs, params).map(Compiled::single),
        NodeKind::GridInvert => grid::invert(&inputs).map(Compiled::single),
        NodeKind::GridLerp => grid::lerp(&inputs).map(Compiled::single),
        NodeKind::Operator { params } => Ok(Compiled::single(operator::compile(&inputs, params, seed))),
        NodeKind::Select { params } => select::compile(&inputs, params).map(Compiled::single),
        NodeKind::Output { .. } => Ok(Compiled {
            outputs: Vec::new(),
            result: output(&inputs)?,
        }),
    }
}

fn output(inputs: &Inputs<'_>) -> Result<Option<PortValue>> {
    let port = inputs.named("input")?;
    Ok(match inputs.resolve(port) {
        Input::Connected(v) => Some(v),
        Input::Absent => {
            warn!(
                "Output node {} is connected to an upstream without a value.",
                inputs.node().id()
            );
            None
        }
        Input::Literal(_) | Input::Missing => None,
    })
}
