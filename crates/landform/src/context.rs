//! Read-only world-tile record consumed by input nodes.
//!
//! The host fills a [`WorldTileInfo`] for the tile being generated. Besides feeding
//! the `WorldTile` node it carries every field an external landform requirement
//! matcher needs (topology, climate ranges, map size, river and road coverage,
//! settlement and site flags).

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::value::Token;

/// Hilliness category of a world tile.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Hilliness {
    #[default]
    Undefined,
    Flat,
    SmallHills,
    LargeHills,
    Mountainous,
    Impassable,
}

impl Hilliness {
    /// Numeric form exposed on the `WorldTile` node (`0` for undefined up to `5`).
    pub fn as_value(self) -> f32 {
        self as u8 as f32
    }
}

/// Compass side of the map.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Side {
    North,
    East,
    South,
    West,
}

impl Side {
    pub const ALL: [Side; 4] = [Side::North, Side::East, Side::South, Side::West];

    pub fn opposite(self) -> Side {
        match self {
            Side::North => Side::South,
            Side::East => Side::West,
            Side::South => Side::North,
            Side::West => Side::East,
        }
    }
}

/// Which map sides border an ocean or large lake.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct CoastSides {
    pub north: bool,
    pub east: bool,
    pub south: bool,
    pub west: bool,
}

impl CoastSides {
    pub fn get(&self, side: Side) -> bool {
        match side {
            Side::North => self.north,
            Side::East => self.east,
            Side::South => self.south,
            Side::West => self.west,
        }
    }

    pub fn count(&self) -> usize {
        Side::ALL.iter().filter(|s| self.get(**s)).count()
    }
}

/// Coastal layout of a tile, derived from [`CoastSides`].
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Topology {
    #[default]
    Inland,
    CoastOneSide,
    /// Two adjacent coastal sides.
    CoastTwoSides,
    /// Two opposite coastal sides.
    CoastLandbridge,
    CoastThreeSides,
    CoastAllSides,
}

/// Linear feature (river or road) crossing the tile.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct LinearFeature {
    /// Direction in degrees.
    pub angle: f32,
    pub width: f32,
}

#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Clone, Debug, PartialEq)]
pub struct WorldTileInfo {
    pub biome: Option<Token>,
    pub hilliness: Hilliness,
    pub elevation: f32,
    pub temperature: f32,
    pub rainfall: f32,
    pub swampiness: f32,
    /// Host map edge length in cells.
    pub map_size: u32,
    pub river: Option<LinearFeature>,
    pub roads: Vec<LinearFeature>,
    pub coast: CoastSides,
    pub has_settlement: bool,
    pub has_site: bool,
}

impl Default for WorldTileInfo {
    fn default() -> Self {
        Self {
            biome: None,
            hilliness: Hilliness::Flat,
            elevation: 0.0,
            temperature: 15.0,
            rainfall: 1000.0,
            swampiness: 0.0,
            map_size: 250,
            river: None,
            roads: Vec::new(),
            coast: CoastSides::default(),
            has_settlement: false,
            has_site: false,
        }
    }
}

impl WorldTileInfo {
    pub fn topology(&self) -> Topology {
        match self.coast.count() {
            0 => Topology::Inland,
            1 => Topology::CoastOneSide,
            2 => {
                let opposite = Side::ALL
                    .iter()
                    .any(|s| self.coast.get(*s) && self.coast.get(s.opposite()));
                if opposite {
                    Topology::CoastLandbridge
                } else {
                    Topology::CoastTwoSides
                }
            }
            3 => Topology::CoastThreeSides,
            _ => Topology::CoastAllSides,
        }
    }

    /// Widest road on the tile, if any.
    pub fn main_road(&self) -> Option<LinearFeature> {
        self.roads
            .iter()
            .copied()
            .max_by(|a, b| a.width.total_cmp(&b.width))
    }
}
