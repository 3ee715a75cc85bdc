#![allow(dead_code)]

use std::time::Duration;

use criterion::{Criterion, Throughput};
use glam::Vec2;
use landform::prelude::*;

pub const SAMPLE_SIZE: usize = 20;
pub const WARM_UP: Duration = Duration::from_secs(1);
pub const MEASUREMENT_TIME: Duration = Duration::from_secs(2);

pub fn default_criterion() -> Criterion {
    Criterion::default()
        .configure_from_args()
        .sample_size(SAMPLE_SIZE)
        .warm_up_time(WARM_UP)
        .measurement_time(MEASUREMENT_TIME)
}

pub fn elements_throughput(elements: usize) -> Throughput {
    Throughput::Elements(elements.max(1) as u64)
}

/// Typical terrain graph: `layers` noise grids summed onto a coastal falloff, then
/// thresholded into terrain tokens. Returns the graph and its first noise node.
pub fn terrain_graph(seed: i32, layers: usize) -> (Graph, NodeId) {
    let mut g = Graph::new(seed);

    let falloff = g.add_node(NodeKind::span_distance(SpanDistance {
        origin: Vec2::new(125.0, 125.0),
        span_px: 125.0,
        span_nx: 125.0,
        span_pz: 125.0,
        span_nz: 125.0,
        circular: true,
        ..Default::default()
    }));
    let sum = g.add_node(NodeKind::operator(
        OperatorTarget::ValueGrid,
        Operation::Add,
        0.75,
    ));
    for _ in 2..=layers {
        g.add_dynamic_port(sum, PortType::ValueGrid)
            .expect("operator takes grids");
    }
    g.connect_named(falloff, "grid", sum, "input0")
        .expect("falloff feeds sum");

    let mut first_noise = falloff;
    for i in 0..layers {
        let noise = g.add_node(NodeKind::noise(GridNoiseParams {
            frequency: 0.01 * (i + 1) as f64,
            ..Default::default()
        }));
        if i == 0 {
            first_noise = noise;
        }
        g.connect_named(noise, "grid", sum, &format!("input{}", i + 1))
            .expect("noise feeds sum");
    }

    let elevation = g.add_node(NodeKind::output(OutputChannel::Elevation));
    g.connect_named(sum, "result", elevation, "input")
        .expect("sum feeds elevation");

    let select = g.add_node(NodeKind::select(
        PortType::ValueGrid,
        PortType::Token(TokenKind::Terrain),
        vec![0.4, 0.8],
    ));
    g.add_dynamic_port(select, PortType::Token(TokenKind::Terrain))
        .expect("select takes tokens");
    for (i, name) in ["Sand", "Soil", "Gravel"].iter().enumerate() {
        let port = g
            .port_named(select, &format!("option{i}"))
            .expect("option port");
        g.set_literal(port, Literal::Token(Some(Token::new(name))))
            .expect("token literal");
    }
    g.connect_named(sum, "result", select, "axis")
        .expect("sum feeds select");
    let terrain = g.add_node(NodeKind::output(OutputChannel::Terrain));
    g.connect_named(select, "result", terrain, "input")
        .expect("select feeds terrain");

    (g, first_noise)
}
