//! N-ary operator compile step.
use std::sync::Arc;

use tracing::{debug, warn};

use crate::graph::{OperatorParams, OperatorTarget};
use crate::grid::{combine, Const as ConstGrid};
use crate::nodes::{read, Input, Inputs};
use crate::random::{rng_for, roll};
use crate::supplier::{Cached, Operated};
use crate::value::{PortValue, ValueGrid, ValueSupplier};

/// Contributions of the dynamic inputs, one slot per port in port order. Inputs
/// connected to an upstream without a value leave their slot empty.
fn contributions(inputs: &Inputs<'_>) -> Vec<Option<PortValue>> {
    let node = inputs.node();
    node.dynamic_inputs()
        .map(|port| match inputs.resolve(port) {
            Input::Connected(v) => Some(v),
            Input::Literal(l) => Some(PortValue::constant(l.as_number())),
            Input::Absent => {
                warn!(
                    "Input '{}' of operator {} has no upstream value; it contributes nothing.",
                    port.name,
                    node.id()
                );
                None
            }
            Input::Missing => None,
        })
        .collect()
}

pub(crate) fn compile(inputs: &Inputs<'_>, params: &OperatorParams, seed: i32) -> PortValue {
    let slots = contributions(inputs);
    match params.target {
        OperatorTarget::Value => {
            let suppliers: Vec<Option<ValueSupplier>> = slots
                .iter()
                .map(|v| v.as_ref().and_then(|v| v.as_value().cloned()))
                .collect();
            let folded =
                Operated::with_slots(params.operation, suppliers, params.apply_chance, seed);
            PortValue::Value(Arc::new(Cached::new(Arc::new(folded))))
        }
        OperatorTarget::ValueGrid => {
            let grids: Vec<Option<ValueGrid>> = slots
                .iter()
                .map(|v| match v {
                    Some(PortValue::ValueGrid(g)) => Some(g.clone()),
                    Some(PortValue::Value(s)) => Some(Arc::new(ConstGrid(read(&**s))) as ValueGrid),
                    _ => None,
                })
                .collect();
            PortValue::ValueGrid(fold_grids(params, grids, seed))
        }
    }
}

/// Left fold of the grid slots. Apply-chance coin flips are drawn once here, so the
/// compiled grid stays a pure function. Every non-base slot takes its flip even when
/// empty; an empty base starts the fold at the neutral element.
fn fold_grids(params: &OperatorParams, slots: Vec<Option<ValueGrid>>, seed: i32) -> ValueGrid {
    let neutral = || Arc::new(ConstGrid(params.operation.neutral())) as ValueGrid;
    let mut layers = slots.into_iter();
    let Some(base) = layers.next() else {
        return neutral();
    };
    let mut acc = base.unwrap_or_else(neutral);
    let mut rng = rng_for(seed);
    for (i, layer) in layers.enumerate() {
        if !roll(&mut rng, params.apply_chance) {
            debug!(layer = i + 1, "operator layer excluded by apply chance");
            continue;
        }
        if let Some(layer) = layer {
            acc = combine(params.operation, acc, layer);
        }
    }
    acc
}

#[cfg(test)]
mod tests {
    use glam::Vec2;

    use super::*;
    use crate::context::WorldTileInfo;
    use crate::graph::{Graph, NodeId, NodeKind};
    use crate::grid::Const;
    use crate::nodes::{compile as compile_node, CompileContext};
    use crate::operation::Operation;
    use crate::value::Literal;

    fn constants(values: &[f32]) -> Vec<Option<ValueGrid>> {
        values
            .iter()
            .map(|v| Some(Arc::new(Const(*v)) as ValueGrid))
            .collect()
    }

    fn params(operation: Operation, apply_chance: f32) -> OperatorParams {
        OperatorParams {
            target: OperatorTarget::ValueGrid,
            operation,
            apply_chance,
        }
    }

    #[test]
    fn full_chance_folds_everything() {
        let g = fold_grids(&params(Operation::Add, 1.0), constants(&[2.0, 3.0]), 8);
        assert_eq!(g.value_at(Vec2::new(40.0, -7.0)), 5.0);
    }

    #[test]
    fn zero_chance_keeps_base() {
        let g = fold_grids(&params(Operation::Add, 0.0), constants(&[2.0, 3.0, 4.0]), 8);
        assert_eq!(g.value_at(Vec2::ZERO), 2.0);
    }

    #[test]
    fn empty_fold_is_neutral() {
        let add = fold_grids(&params(Operation::Add, 1.0), Vec::new(), 0);
        let mul = fold_grids(&params(Operation::Multiply, 1.0), Vec::new(), 0);
        assert_eq!(add.value_at(Vec2::ZERO), 0.0);
        assert_eq!(mul.value_at(Vec2::ZERO), 1.0);
    }

    #[test]
    fn partial_chance_is_reproducible() {
        let p = params(Operation::Add, 0.5);
        let layers = [1.0, 2.0, 4.0, 8.0, 16.0, 32.0];
        let a = fold_grids(&p, constants(&layers), 123);
        let b = fold_grids(&p, constants(&layers), 123);
        assert_eq!(a.value_at(Vec2::ZERO), b.value_at(Vec2::ZERO));
    }

    #[test]
    fn empty_slot_keeps_later_flips_aligned() {
        let p = params(Operation::Add, 0.5);
        for seed in 0..16 {
            let holed = vec![
                Some(Arc::new(Const(1.0_f32)) as ValueGrid),
                None,
                Some(Arc::new(Const(10.0_f32)) as ValueGrid),
                Some(Arc::new(Const(100.0_f32)) as ValueGrid),
            ];
            let zeroed = constants(&[1.0, 0.0, 10.0, 100.0]);
            let a = fold_grids(&p, holed, seed).value_at(Vec2::ZERO);
            let b = fold_grids(&p, zeroed, seed).value_at(Vec2::ZERO);
            assert_eq!(a, b, "seed {seed}");
        }
    }

    /// Operator whose base input reads from a node without a value; the other
    /// inputs carry literals 3 and 4.
    fn absent_base(target: OperatorTarget, apply_chance: f32) -> (Graph, NodeId) {
        let mut g = Graph::new(0);
        let upstream = match target {
            OperatorTarget::ValueGrid => g.add_node(NodeKind::GridInvert),
            OperatorTarget::Value => g.add_node(NodeKind::constant(9.0)),
        };
        let op = g.add_node(NodeKind::operator(target, Operation::Add, apply_chance));
        g.add_dynamic_port(op, target.port_type()).unwrap();
        let output = match target {
            OperatorTarget::ValueGrid => "grid",
            OperatorTarget::Value => "value",
        };
        g.connect_named(upstream, output, op, "input0").unwrap();
        for (name, v) in [("input1", 3.0), ("input2", 4.0)] {
            let port = g.port_named(op, name).unwrap();
            g.set_literal(port, Literal::Number(v)).unwrap();
        }
        (g, op)
    }

    fn compiled(g: &Graph, op: NodeId) -> PortValue {
        let tile = WorldTileInfo::default();
        let ctx = CompileContext {
            tile: &tile,
            graph_seed: 0,
        };
        let mut out = compile_node(g, g.node(op).unwrap(), &ctx).unwrap();
        out.outputs.remove(0).unwrap()
    }

    #[test]
    fn absent_base_grid_starts_from_neutral() {
        let (g, op) = absent_base(OperatorTarget::ValueGrid, 0.0);
        let grid = compiled(&g, op);
        assert_eq!(grid.as_value_grid().unwrap().value_at(Vec2::ZERO), 0.0);

        let (g, op) = absent_base(OperatorTarget::ValueGrid, 1.0);
        let grid = compiled(&g, op);
        assert_eq!(grid.as_value_grid().unwrap().value_at(Vec2::ZERO), 7.0);
    }

    #[test]
    fn absent_base_value_starts_from_neutral() {
        let (g, op) = absent_base(OperatorTarget::Value, 0.0);
        assert_eq!(compiled(&g, op).as_value().unwrap().get(), 0.0);

        let (g, op) = absent_base(OperatorTarget::Value, 1.0);
        assert_eq!(compiled(&g, op).as_value().unwrap().get(), 7.0);
    }
}
