use std::sync::Arc;

use crate::context::{Side, WorldTileInfo};
use crate::graph::WORLD_TILE_OUTPUTS;
use crate::nodes::Compiled;
use crate::supplier::Const;
use crate::value::PortValue;

fn flag(b: bool) -> f32 {
    if b {
        1.0
    } else {
        0.0
    }
}

/// Scalar for the named `WorldTile` output.
fn number(tile: &WorldTileInfo, name: &str) -> f32 {
    let road = tile.main_road();
    match name {
        "hilliness" => tile.hilliness.as_value(),
        "elevation" => tile.elevation,
        "temperature" => tile.temperature,
        "rainfall" => tile.rainfall,
        "swampiness" => tile.swampiness,
        "map_size" => tile.map_size as f32,
        "river_width" => tile.river.map_or(0.0, |r| r.width),
        "river_angle" => tile.river.map_or(0.0, |r| r.angle),
        "road_width" => road.map_or(0.0, |r| r.width),
        "road_angle" => road.map_or(0.0, |r| r.angle),
        "coast_north" => flag(tile.coast.get(Side::North)),
        "coast_east" => flag(tile.coast.get(Side::East)),
        "coast_south" => flag(tile.coast.get(Side::South)),
        "coast_west" => flag(tile.coast.get(Side::West)),
        _ => 0.0,
    }
}

pub(crate) fn compile(tile: &WorldTileInfo) -> Compiled {
    let outputs = WORLD_TILE_OUTPUTS
        .iter()
        .map(|name| {
            Some(match *name {
                "biome" => PortValue::Token(Arc::new(Const(tile.biome.clone()))),
                other => PortValue::constant(number(tile, other)),
            })
        })
        .collect();
    Compiled {
        outputs,
        result: None,
    }
}
