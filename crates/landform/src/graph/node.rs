//! Node kinds, their parameters and port layouts.
//!
//! Each [`NodeKind`] reports a [`NodeLayout`]: the fixed ports it declares plus an
//! optional dynamic-arity input list. A [`Node`] instantiates that layout with stable
//! [`PortId`]s and carries the per-node state the traversal engine maintains.
use glam::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::context::{Hilliness, Topology};
use crate::graph::port::{Direction, DynamicDecl, Port, PortDecl, PortId, PortType};
use crate::graph::NodeId;
use crate::grid::{NoiseType, SpanDistance};
use crate::operation::Operation;
use crate::value::{Literal, PortValue, Token, TokenKind};

/// Inclusive numeric range.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FloatRange {
    pub min: f32,
    pub max: f32,
}

impl FloatRange {
    pub const ANY: FloatRange = FloatRange {
        min: f32::NEG_INFINITY,
        max: f32::INFINITY,
    };

    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, v: f32) -> bool {
        v >= self.min && v <= self.max
    }
}

impl Default for FloatRange {
    fn default() -> Self {
        Self::ANY
    }
}

/// Graph-level metadata.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ManifestParams {
    pub id: String,
    pub display_name: String,
    pub is_custom: bool,
    pub revision: u32,
}

/// Requirements a world tile must meet for the graph to apply. Only carried here;
/// matching is done by the host.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct TileRequirementsParams {
    /// Allowed topologies; empty allows any.
    pub topologies: Vec<Topology>,
    pub hilliness: (Hilliness, Hilliness),
    pub elevation: FloatRange,
    pub temperature: FloatRange,
    pub rainfall: FloatRange,
    pub swampiness: FloatRange,
    pub map_size: FloatRange,
    pub river_coverage: FloatRange,
    pub road_coverage: FloatRange,
    pub allow_settlements: bool,
    pub allow_sites: bool,
}

impl Default for TileRequirementsParams {
    fn default() -> Self {
        Self {
            topologies: Vec::new(),
            hilliness: (Hilliness::Flat, Hilliness::Impassable),
            elevation: FloatRange::ANY,
            temperature: FloatRange::ANY,
            rainfall: FloatRange::ANY,
            swampiness: FloatRange::ANY,
            map_size: FloatRange::ANY,
            river_coverage: FloatRange::ANY,
            road_coverage: FloatRange::ANY,
            allow_settlements: true,
            allow_sites: true,
        }
    }
}

/// Parameters for a seeded random value node.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct RandomValueParams {
    pub min: f32,
    pub max: f32,
}

/// Parameters for a token to number lookup.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct TokenToValueParams {
    pub kind: TokenKind,
    pub entries: Vec<(Token, f32)>,
    /// Result for absent or unlisted tokens.
    pub fallback: f32,
}

/// Parameters for a noise grid node.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct GridNoiseParams {
    pub noise: NoiseType,
    pub frequency: f64,
    pub lacunarity: f64,
    pub persistence: f64,
    pub octaves: usize,
    /// Output remap: `noise * scale + bias`.
    pub scale: f32,
    pub bias: f32,
}

impl Default for GridNoiseParams {
    fn default() -> Self {
        Self {
            noise: NoiseType::Perlin,
            frequency: 0.021,
            lacunarity: 2.0,
            persistence: 0.5,
            octaves: 6,
            scale: 0.5,
            bias: 0.5,
        }
    }
}

/// Parameters for a scale-bias-clamp node.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct GridLinearParams {
    pub scale: f32,
    pub bias: f32,
    pub min: f32,
    pub max: f32,
}

impl Default for GridLinearParams {
    fn default() -> Self {
        Self {
            scale: 1.0,
            bias: 0.0,
            min: f32::NEG_INFINITY,
            max: f32::INFINITY,
        }
    }
}

/// Whether an operator folds scalar suppliers or numeric grids.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum OperatorTarget {
    Value,
    #[default]
    ValueGrid,
}

impl OperatorTarget {
    pub fn port_type(self) -> PortType {
        match self {
            OperatorTarget::Value => PortType::Value,
            OperatorTarget::ValueGrid => PortType::ValueGrid,
        }
    }
}

/// Parameters for an N-ary operator node.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct OperatorParams {
    pub target: OperatorTarget,
    pub operation: Operation,
    /// Probability each non-base input takes part in the fold.
    pub apply_chance: f32,
}

impl Default for OperatorParams {
    fn default() -> Self {
        Self {
            target: OperatorTarget::ValueGrid,
            operation: Operation::Add,
            apply_chance: 1.0,
        }
    }
}

/// Parameters for a threshold select node.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct SelectParams {
    /// `Value` or `ValueGrid`.
    pub axis: PortType,
    /// Type of every option port.
    pub options: PortType,
    /// Ascending, one fewer than the options. Kept in sync by the caller.
    pub thresholds: Vec<f32>,
}

impl SelectParams {
    /// Type of the node's result: options are lifted to grids when the axis is a grid.
    pub fn result_type(&self) -> PortType {
        if self.axis.is_grid() {
            self.options.as_grid()
        } else {
            self.options
        }
    }
}

/// Channel a finished graph exposes to the host.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum OutputChannel {
    Elevation,
    Fertility,
    WaterFlow,
    Terrain,
    Biome,
    Roof,
}

impl OutputChannel {
    pub const ALL: [OutputChannel; 6] = [
        OutputChannel::Elevation,
        OutputChannel::Fertility,
        OutputChannel::WaterFlow,
        OutputChannel::Terrain,
        OutputChannel::Biome,
        OutputChannel::Roof,
    ];

    pub fn port_type(self) -> PortType {
        match self {
            OutputChannel::Elevation | OutputChannel::Fertility | OutputChannel::WaterFlow => {
                PortType::ValueGrid
            }
            OutputChannel::Terrain => PortType::TokenGrid(TokenKind::Terrain),
            OutputChannel::Biome => PortType::TokenGrid(TokenKind::Biome),
            OutputChannel::Roof => PortType::TokenGrid(TokenKind::Roof),
        }
    }
}

/// Names of the `WorldTile` node outputs, in port order.
pub const WORLD_TILE_OUTPUTS: [&str; 15] = [
    "biome",
    "hilliness",
    "elevation",
    "temperature",
    "rainfall",
    "swampiness",
    "map_size",
    "river_width",
    "river_angle",
    "road_width",
    "road_angle",
    "coast_north",
    "coast_east",
    "coast_south",
    "coast_west",
];

/// What a node does, with its parameters.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    Manifest {
        params: ManifestParams,
    },
    TileRequirements {
        params: TileRequirementsParams,
    },
    /// Exposes the world-tile context.
    WorldTile,
    ConstValue {
        value: f32,
    },
    RandomValue {
        params: RandomValueParams,
    },
    ConstToken {
        kind: TokenKind,
        token: Option<Token>,
    },
    TokenToValue {
        params: TokenToValueParams,
    },
    GridFromValue,
    GridNoise {
        params: GridNoiseParams,
    },
    GridSpanDistance {
        params: SpanDistance,
    },
    GridRotate {
        pivot: Vec2,
    },
    GridTransform {
        translate: Vec2,
        scale: Vec2,
    },
    GridLinear {
        params: GridLinearParams,
    },
    GridInvert,
    GridLerp,
    Operator {
        params: OperatorParams,
    },
    Select {
        params: SelectParams,
    },
    Output {
        channel: OutputChannel,
    },
}

/// Ports declared by a node kind.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct NodeLayout {
    pub inputs: Vec<PortDecl>,
    pub outputs: Vec<PortDecl>,
    pub dynamic: Option<DynamicDecl>,
}

impl NodeKind {
    /// Creates a constant value node.
    pub fn constant(value: f32) -> Self {
        NodeKind::ConstValue { value }
    }

    /// Creates a seeded random value node drawing from `[min, max]`.
    pub fn random(min: f32, max: f32) -> Self {
        NodeKind::RandomValue {
            params: RandomValueParams { min, max },
        }
    }

    /// Creates a constant token node.
    pub fn token(kind: TokenKind, token: impl Into<Token>) -> Self {
        NodeKind::ConstToken {
            kind,
            token: Some(token.into()),
        }
    }

    /// Creates an operator node.
    pub fn operator(target: OperatorTarget, operation: Operation, apply_chance: f32) -> Self {
        NodeKind::Operator {
            params: OperatorParams {
                target,
                operation,
                apply_chance,
            },
        }
    }

    /// Creates a threshold select node.
    pub fn select(axis: PortType, options: PortType, thresholds: Vec<f32>) -> Self {
        NodeKind::Select {
            params: SelectParams {
                axis,
                options,
                thresholds,
            },
        }
    }

    /// Creates a noise grid node.
    pub fn noise(params: GridNoiseParams) -> Self {
        NodeKind::GridNoise { params }
    }

    /// Creates a span distance grid node.
    pub fn span_distance(params: SpanDistance) -> Self {
        NodeKind::GridSpanDistance { params }
    }

    /// Creates an output node for `channel`.
    pub fn output(channel: OutputChannel) -> Self {
        NodeKind::Output { channel }
    }

    pub fn name(&self) -> &'static str {
        match self {
            NodeKind::Manifest { .. } => "Manifest",
            NodeKind::TileRequirements { .. } => "TileRequirements",
            NodeKind::WorldTile => "WorldTile",
            NodeKind::ConstValue { .. } => "ConstValue",
            NodeKind::RandomValue { .. } => "RandomValue",
            NodeKind::ConstToken { .. } => "ConstToken",
            NodeKind::TokenToValue { .. } => "TokenToValue",
            NodeKind::GridFromValue => "GridFromValue",
            NodeKind::GridNoise { .. } => "GridNoise",
            NodeKind::GridSpanDistance { .. } => "GridSpanDistance",
            NodeKind::GridRotate { .. } => "GridRotate",
            NodeKind::GridTransform { .. } => "GridTransform",
            NodeKind::GridLinear { .. } => "GridLinear",
            NodeKind::GridInvert => "GridInvert",
            NodeKind::GridLerp => "GridLerp",
            NodeKind::Operator { .. } => "Operator",
            NodeKind::Select { .. } => "Select",
            NodeKind::Output { .. } => "Output",
        }
    }

    /// Role name for kinds that may exist at most once per graph.
    pub fn singleton_role(&self) -> Option<&'static str> {
        match self {
            NodeKind::Manifest { .. } => Some("manifest"),
            NodeKind::TileRequirements { .. } => Some("tile requirements"),
            _ => None,
        }
    }

    pub fn layout(&self) -> NodeLayout {
        let number = |v: f32| Literal::Number(v);
        match self {
            NodeKind::Manifest { .. } | NodeKind::TileRequirements { .. } => NodeLayout::default(),
            NodeKind::WorldTile => NodeLayout {
                outputs: WORLD_TILE_OUTPUTS
                    .iter()
                    .map(|name| {
                        let ty = if *name == "biome" {
                            PortType::Token(TokenKind::Biome)
                        } else {
                            PortType::Value
                        };
                        PortDecl::output(name, ty)
                    })
                    .collect(),
                ..Default::default()
            },
            NodeKind::ConstValue { .. } | NodeKind::RandomValue { .. } => NodeLayout {
                outputs: vec![PortDecl::output("value", PortType::Value)],
                ..Default::default()
            },
            NodeKind::ConstToken { kind, .. } => NodeLayout {
                outputs: vec![PortDecl::output("token", PortType::Token(*kind))],
                ..Default::default()
            },
            NodeKind::TokenToValue { params } => NodeLayout {
                inputs: vec![PortDecl::optional(
                    "token",
                    PortType::Token(params.kind),
                    Literal::Token(None),
                )],
                outputs: vec![PortDecl::output("value", PortType::Value)],
                ..Default::default()
            },
            NodeKind::GridFromValue => NodeLayout {
                inputs: vec![PortDecl::optional("value", PortType::Value, number(0.0))],
                outputs: vec![PortDecl::output("grid", PortType::ValueGrid)],
                ..Default::default()
            },
            NodeKind::GridNoise { .. } | NodeKind::GridSpanDistance { .. } => NodeLayout {
                outputs: vec![PortDecl::output("grid", PortType::ValueGrid)],
                ..Default::default()
            },
            NodeKind::GridRotate { .. } => NodeLayout {
                inputs: vec![
                    PortDecl::required("input", PortType::ValueGrid),
                    PortDecl::optional("angle", PortType::Value, number(0.0)),
                ],
                outputs: vec![PortDecl::output("grid", PortType::ValueGrid)],
                ..Default::default()
            },
            NodeKind::GridTransform { .. }
            | NodeKind::GridLinear { .. }
            | NodeKind::GridInvert => NodeLayout {
                inputs: vec![PortDecl::required("input", PortType::ValueGrid)],
                outputs: vec![PortDecl::output("grid", PortType::ValueGrid)],
                ..Default::default()
            },
            NodeKind::GridLerp => NodeLayout {
                inputs: vec![
                    PortDecl::optional("a", PortType::ValueGrid, number(0.0)),
                    PortDecl::optional("b", PortType::ValueGrid, number(1.0)),
                    PortDecl::optional("t", PortType::ValueGrid, number(0.5)),
                ],
                outputs: vec![PortDecl::output("grid", PortType::ValueGrid)],
                ..Default::default()
            },
            NodeKind::Operator { params } => NodeLayout {
                outputs: vec![PortDecl::output("result", params.target.port_type())],
                dynamic: Some(DynamicDecl {
                    prefix: "input",
                    ty: params.target.port_type(),
                    min: 2,
                }),
                ..Default::default()
            },
            NodeKind::Select { params } => NodeLayout {
                inputs: vec![PortDecl::optional("axis", params.axis, number(0.0))],
                outputs: vec![PortDecl::output("result", params.result_type())],
                dynamic: Some(DynamicDecl {
                    prefix: "option",
                    ty: params.options,
                    min: 2,
                }),
            },
            NodeKind::Output { channel } => NodeLayout {
                inputs: vec![PortDecl {
                    name: "input",
                    ty: channel.port_type(),
                    required: false,
                    literal: None,
                }],
                ..Default::default()
            },
        }
    }

    /// Port type signature; parameter edits must leave it unchanged.
    pub(crate) fn signature(&self) -> (Vec<PortType>, Vec<PortType>, Option<PortType>) {
        let layout = self.layout();
        (
            layout.inputs.iter().map(|p| p.ty).collect(),
            layout.outputs.iter().map(|p| p.ty).collect(),
            layout.dynamic.map(|d| d.ty),
        )
    }
}

/// A node instance.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug)]
pub struct Node {
    id: NodeId,
    pub(crate) kind: NodeKind,
    pub(crate) seed: i32,
    pub(crate) inputs: Vec<Port>,
    pub(crate) outputs: Vec<Port>,
    next_port: u32,
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) calculated: bool,
    /// Compiled values, parallel to `outputs`.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) values: Vec<Option<PortValue>>,
    /// Compiled result of an output node.
    #[cfg_attr(feature = "serde", serde(skip))]
    pub(crate) result: Option<PortValue>,
}

impl Node {
    pub(crate) fn new(id: NodeId, kind: NodeKind, seed: i32) -> Self {
        let layout = kind.layout();
        let mut node = Self {
            id,
            kind,
            seed,
            inputs: Vec::new(),
            outputs: Vec::new(),
            next_port: 0,
            calculated: false,
            values: Vec::new(),
            result: None,
        };
        for decl in layout.inputs {
            node.push_port(Direction::Input, &decl, false);
        }
        for decl in layout.outputs {
            node.push_port(Direction::Output, &decl, false);
        }
        if let Some(dynamic) = layout.dynamic {
            for _ in 0..dynamic.min {
                node.push_dynamic(&dynamic);
            }
        }
        node.values = vec![None; node.outputs.len()];
        node
    }

    fn push_port(&mut self, direction: Direction, decl: &PortDecl, dynamic: bool) -> PortId {
        let id = PortId(self.next_port);
        self.next_port += 1;
        let port = Port {
            id,
            name: decl.name.to_string(),
            ty: decl.ty,
            direction,
            required: decl.required,
            dynamic,
            literal: decl.literal.clone(),
        };
        match direction {
            Direction::Input => self.inputs.push(port),
            Direction::Output => self.outputs.push(port),
        }
        id
    }

    pub(crate) fn push_dynamic(&mut self, decl: &DynamicDecl) -> PortId {
        let index = self.dynamic_inputs().count();
        let id = self.push_port(
            Direction::Input,
            &PortDecl::optional(decl.prefix, decl.ty, decl.ty.default_literal()),
            true,
        );
        if let Some(port) = self.inputs.last_mut() {
            port.name = format!("{}{}", decl.prefix, index);
        }
        id
    }

    pub(crate) fn next_port_id(&self) -> PortId {
        PortId(self.next_port)
    }

    /// Drops dynamic input `id` and renumbers the remaining dynamic names.
    pub(crate) fn remove_dynamic(&mut self, id: PortId, prefix: &str) -> bool {
        let Some(index) = self.inputs.iter().position(|p| p.id == id && p.dynamic) else {
            return false;
        };
        self.inputs.remove(index);
        for (i, port) in self.inputs.iter_mut().filter(|p| p.dynamic).enumerate() {
            port.name = format!("{prefix}{i}");
        }
        true
    }

    pub(crate) fn input_mut(&mut self, id: PortId) -> Option<&mut Port> {
        self.inputs.iter_mut().find(|p| p.id == id)
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    pub fn seed(&self) -> i32 {
        self.seed
    }

    pub fn inputs(&self) -> &[Port] {
        &self.inputs
    }

    pub fn outputs(&self) -> &[Port] {
        &self.outputs
    }

    /// Inputs belonging to the dynamic-arity list, in order.
    pub fn dynamic_inputs(&self) -> impl Iterator<Item = &Port> {
        self.inputs.iter().filter(|p| p.dynamic)
    }

    pub fn input(&self, id: PortId) -> Option<&Port> {
        self.inputs.iter().find(|p| p.id == id)
    }

    pub fn output(&self, id: PortId) -> Option<&Port> {
        self.outputs.iter().find(|p| p.id == id)
    }

    /// Input port by declared name.
    pub fn input_named(&self, name: &str) -> Option<&Port> {
        self.inputs.iter().find(|p| p.name == name)
    }

    /// Output port by declared name.
    pub fn output_named(&self, name: &str) -> Option<&Port> {
        self.outputs.iter().find(|p| p.name == name)
    }

    pub fn is_calculated(&self) -> bool {
        self.calculated
    }

    /// Compiled value of output port `id`, if the node compiled and produced one.
    pub fn value(&self, id: PortId) -> Option<&PortValue> {
        let index = self.outputs.iter().position(|p| p.id == id)?;
        self.values.get(index)?.as_ref()
    }

    /// Compiled value of the first output port.
    pub fn primary_value(&self) -> Option<&PortValue> {
        self.values.first()?.as_ref()
    }

    /// Compiled result of an output node.
    pub fn result(&self) -> Option<&PortValue> {
        self.result.as_ref()
    }

    pub(crate) fn clear_compiled(&mut self) {
        self.calculated = false;
        self.values.iter_mut().for_each(|v| *v = None);
        self.result = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn operator_starts_with_minimum_dynamic_inputs() {
        let node = Node::new(
            NodeId(1),
            NodeKind::operator(OperatorTarget::ValueGrid, Operation::Add, 1.0),
            0,
        );
        let names: Vec<_> = node.dynamic_inputs().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["input0", "input1"]);
        assert!(node
            .dynamic_inputs()
            .all(|p| p.ty == PortType::ValueGrid && p.literal == Some(Literal::Number(0.0))));
        assert_eq!(node.outputs().len(), 1);
        assert_eq!(node.values.len(), 1);
    }

    #[test]
    fn port_ids_are_unique_within_node() {
        let node = Node::new(NodeId(2), NodeKind::WorldTile, 0);
        let mut ids: Vec<_> = node.outputs().iter().map(|p| p.id).collect();
        ids.dedup();
        assert_eq!(ids.len(), WORLD_TILE_OUTPUTS.len());
        assert_eq!(
            node.output_named("biome").map(|p| p.ty),
            Some(PortType::Token(TokenKind::Biome))
        );
    }

    #[test]
    fn select_result_is_lifted_by_grid_axis() {
        let grid_axis = NodeKind::select(
            PortType::ValueGrid,
            PortType::Token(TokenKind::Terrain),
            vec![0.5],
        );
        let layout = grid_axis.layout();
        assert_eq!(layout.outputs[0].ty, PortType::TokenGrid(TokenKind::Terrain));
        assert_eq!(
            layout.dynamic.map(|d| d.ty),
            Some(PortType::Token(TokenKind::Terrain))
        );

        let value_axis = NodeKind::select(PortType::Value, PortType::Value, vec![0.5]);
        assert_eq!(value_axis.layout().outputs[0].ty, PortType::Value);
    }

    #[test]
    fn signature_ignores_plain_parameters() {
        let a = NodeKind::operator(OperatorTarget::Value, Operation::Add, 1.0);
        let b = NodeKind::operator(OperatorTarget::Value, Operation::Max, 0.3);
        let c = NodeKind::operator(OperatorTarget::ValueGrid, Operation::Add, 1.0);
        assert_eq!(a.signature(), b.signature());
        assert_ne!(a.signature(), c.signature());
    }

    #[test]
    fn float_range_contains_bounds() {
        let r = FloatRange::new(-1.0, 1.0);
        assert!(r.contains(-1.0) && r.contains(1.0));
        assert!(!r.contains(1.5));
        assert!(FloatRange::default().contains(1.0e9));
    }
}
