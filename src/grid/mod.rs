//! Farm grid — sparse occupancy map over integer floor cells.
//!
//! Cells are addressed by world (x, z) rounded to integers. Objects snap to
//! even coordinates because each cell spans 2×2 world units. Anything outside
//! the configured rectangle is rejected by every query and mutation.

use bevy::prelude::*;
use std::collections::HashMap;

use crate::shared::CELL_SIZE;

#[derive(Resource, Debug, Clone)]
pub struct FarmGrid {
    /// World (x, z) of the grid's minimum corner.
    origin: Vec2,
    cells_x: u32,
    cells_z: u32,
    /// Explicit occupancy. Absent cells are free.
    occupancy: HashMap<IVec2, bool>,
}

impl Default for FarmGrid {
    fn default() -> Self {
        Self::new(Vec2::ZERO, 10, 10)
    }
}

impl FarmGrid {
    pub fn new(origin: Vec2, cells_x: u32, cells_z: u32) -> Self {
        Self {
            origin,
            cells_x,
            cells_z,
            occupancy: HashMap::new(),
        }
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    /// World-space width and depth of the grid.
    pub fn size(&self) -> Vec2 {
        Vec2::new(
            (self.cells_x as i32 * CELL_SIZE) as f32,
            (self.cells_z as i32 * CELL_SIZE) as f32,
        )
    }

    /// Half-open containment: the minimum edge is inside, the maximum edge
    /// is not.
    pub fn contains(&self, cell: IVec2) -> bool {
        let max = self.origin + self.size();
        let (x, z) = (cell.x as f32, cell.y as f32);
        x >= self.origin.x && x < max.x && z >= self.origin.y && z < max.y
    }

    /// True if `cell` is inside the grid and not occupied.
    pub fn can_place(&self, cell: IVec2) -> bool {
        if !self.contains(cell) {
            return false;
        }
        !self.occupancy.get(&cell).copied().unwrap_or(false)
    }

    /// Writes the occupancy of `cell`. Returns false (and leaves the grid
    /// untouched) when the cell is out of bounds.
    pub fn try_set_occupied(&mut self, cell: IVec2, occupied: bool) -> bool {
        if !self.contains(cell) {
            return false;
        }
        self.occupancy.insert(cell, occupied);
        true
    }

    pub fn is_occupied(&self, cell: IVec2) -> bool {
        self.occupancy.get(&cell).copied().unwrap_or(false)
    }

    pub fn occupied_cells(&self) -> impl Iterator<Item = IVec2> + '_ {
        self.occupancy
            .iter()
            .filter(|(_, occupied)| **occupied)
            .map(|(cell, _)| *cell)
    }

    /// Every cell address inside the bounds, stepping by the cell size.
    /// Used to visualise the grid.
    pub fn bounds_cells(&self) -> Vec<IVec2> {
        let start_x = self.origin.x.round() as i32;
        let start_z = self.origin.y.round() as i32;
        let mut cells = Vec::with_capacity((self.cells_x * self.cells_z) as usize);
        for i in 0..self.cells_x as i32 {
            for j in 0..self.cells_z as i32 {
                cells.push(IVec2::new(start_x + i * CELL_SIZE, start_z + j * CELL_SIZE));
            }
        }
        cells
    }

    /// Changes the cell counts and forgets occupancy that no longer fits.
    pub fn resize(&mut self, cells_x: u32, cells_z: u32) {
        self.cells_x = cells_x;
        self.cells_z = cells_z;
        let before = self.occupancy.len();
        let (origin, size) = (self.origin, self.size());
        self.occupancy.retain(|cell, _| {
            let (x, z) = (cell.x as f32, cell.y as f32);
            x >= origin.x && x < origin.x + size.x && z >= origin.y && z < origin.y + size.y
        });
        let dropped = before - self.occupancy.len();
        if dropped > 0 {
            warn!("[Grid] Resize to {}x{} dropped {} cells", cells_x, cells_z, dropped);
        }
    }
}
