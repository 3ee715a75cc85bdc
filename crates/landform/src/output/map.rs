//! Host map geometry a finished graph is sampled into.
use glam::Vec2;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Edge length of the graph coordinate space, independent of the host map size.
pub const DEFAULT_FULL_SIZE: f32 = 250.0;

/// Configuration of a host map grid.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq)]
pub struct MapGrid {
    /// Number of host cells along x.
    pub width: usize,
    /// Number of host cells along z.
    pub height: usize,
    /// Graph-space span covered by the whole map along each axis.
    pub full_size: f32,
}

impl Default for MapGrid {
    fn default() -> Self {
        Self {
            width: 250,
            height: 250,
            full_size: DEFAULT_FULL_SIZE,
        }
    }
}

impl MapGrid {
    /// Creates a new [`MapGrid`] with the given cell counts.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Default::default()
        }
    }

    /// Sets the graph-space span.
    pub fn with_full_size(mut self, full_size: f32) -> Self {
        self.full_size = full_size;
        self
    }

    /// Validates the configuration, returning an error if invalid.
    pub fn validate(&self) -> Result<()> {
        if self.width == 0 || self.height == 0 {
            return Err(Error::InvalidConfig(
                "width and height must be > 0".into(),
            ));
        }
        if !(self.full_size.is_finite() && self.full_size > 0.0) {
            return Err(Error::InvalidConfig("full_size must be finite and > 0".into()));
        }
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.width * self.height
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Graph-space size of one host cell.
    pub fn cell_size(&self) -> Vec2 {
        Vec2::new(
            self.full_size / self.width as f32,
            self.full_size / self.height as f32,
        )
    }

    /// Graph-space position of the centre of host cell `(ix, iz)`.
    pub fn to_graph_space(&self, ix: usize, iz: usize) -> Vec2 {
        (Vec2::new(ix as f32, iz as f32) + 0.5) * self.cell_size()
    }

    /// Host cell containing graph-space point `p`, if inside the map.
    pub fn to_cell(&self, p: Vec2) -> Option<(usize, usize)> {
        let c = (p / self.cell_size()).floor();
        if c.x < 0.0 || c.y < 0.0 {
            return None;
        }
        let (ix, iz) = (c.x as usize, c.y as usize);
        (ix < self.width && iz < self.height).then_some((ix, iz))
    }
}
