//! Baked samples of a grid function over a host map.
use glam::Vec2;

use super::map::MapGrid;
use crate::grid::GridFunction;

/// Row-major samples, one per host cell.
#[derive(Clone, Debug)]
pub struct Raster<T> {
    pub grid: MapGrid,
    pub data: Vec<T>,
}

impl<T> Raster<T> {
    /// Samples `function` at the centre of every cell of `grid`.
    pub fn bake(grid: MapGrid, function: &dyn GridFunction<T>) -> Self {
        let mut data = Vec::with_capacity(grid.len());
        for iz in 0..grid.height {
            for ix in 0..grid.width {
                data.push(function.value_at(grid.to_graph_space(ix, iz)));
            }
        }
        Self { grid, data }
    }

    /// Get the size of the raster as `(width, height)`.
    pub fn size(&self) -> (usize, usize) {
        (self.grid.width, self.grid.height)
    }

    /// Value of cell `(ix, iz)`, `None` if out of bounds.
    pub fn get(&self, ix: usize, iz: usize) -> Option<&T> {
        if ix >= self.grid.width || iz >= self.grid.height {
            return None;
        }
        self.data.get(iz * self.grid.width + ix)
    }

    /// Value of the cell containing graph-space point `p`.
    pub fn sample(&self, p: Vec2) -> Option<&T> {
        let (ix, iz) = self.grid.to_cell(p)?;
        self.get(ix, iz)
    }

    /// Applies `f` to every cell.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Raster<U> {
        Raster {
            grid: self.grid,
            data: self.data.into_iter().map(f).collect(),
        }
    }
}
