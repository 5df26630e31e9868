//! Footprint cells — per-cell validity during a move, aggregated into one
//! object-level placeable / not-placeable state.

use bevy::prelude::*;

use crate::grid::FarmGrid;
use crate::shared::cell_for;

/// One footprint cell of the object being moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FootprintCell {
    /// Offset from the anchor in world units (placement offset included).
    pub offset: IVec2,
    pub valid: bool,
}

impl FootprintCell {
    /// Cells start out valid; the first check reports a flip if the cell
    /// is taken.
    pub fn new(offset: IVec2) -> Self {
        Self { offset, valid: true }
    }

    pub fn world_position(&self, anchor: Vec3) -> Vec3 {
        anchor + Vec3::new(self.offset.x as f32, 0.0, self.offset.y as f32)
    }

    /// Rechecks the cell. Returns the new validity only when it
    /// changed.
    pub fn check(&mut self, anchor: Vec3, grid: &FarmGrid) -> Option<bool> {
        let checked = grid.can_place(cell_for(anchor, self.offset));
        if checked == self.valid {
            return None;
        }
        self.valid = checked;
        Some(checked)
    }
}

/// The footprint cells of one moving object plus a running count of the invalid ones.
#[derive(Debug, Clone, Default)]
pub struct PlacementValidator {
    cells: Vec<FootprintCell>,
    invalid: usize,
}

impl PlacementValidator {
    pub fn build(offsets: impl IntoIterator<Item = IVec2>, anchor: Vec3, grid: &FarmGrid) -> Self {
        let mut validator = Self {
            cells: offsets.into_iter().map(FootprintCell::new).collect(),
            invalid: 0,
        };
        validator.recheck(anchor, grid);
        validator
    }

    /// Rechecks every cell at the new anchor. Returns true when the
    /// object-level state flipped.
    pub fn recheck(&mut self, anchor: Vec3, grid: &FarmGrid) -> bool {
        let was_placeable = self.is_placeable();
        for i in 0..self.cells.len() {
            if let Some(valid) = self.cells[i].check(anchor, grid) {
                self.on_valid_changed(valid);
            }
        }
        was_placeable != self.is_placeable()
    }

    fn on_valid_changed(&mut self, valid: bool) {
        if valid {
            debug_assert!(self.invalid > 0, "invalid counter underflow");
            self.invalid = self.invalid.saturating_sub(1);
        } else {
            self.invalid += 1;
        }
    }

    pub fn invalid_count(&self) -> usize {
        self.invalid
    }

    pub fn is_placeable(&self) -> bool {
        self.invalid == 0
    }

    pub fn cells(&self) -> &[FootprintCell] {
        &self.cells
    }
}

/// Display mirror of a footprint cell. Spawned at move start, despawned at move end.
#[derive(Component, Debug, Clone)]
pub struct PlacementMarker {
    pub owner: Entity,
    pub index: usize,
    pub valid: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid() -> FarmGrid {
        FarmGrid::new(Vec2::ZERO, 10, 10)
    }

    fn counted_invalid(validator: &PlacementValidator) -> usize {
        validator.cells().iter().filter(|p| !p.valid).count()
    }

    #[test]
    fn test_footprint_cell_reports_only_flips() {
        let mut grid = grid();
        let mut cell = FootprintCell::new(IVec2::ZERO);
        let anchor = Vec3::new(4.0, 0.0, 4.0);
        assert_eq!(cell.check(anchor, &grid), None);
        grid.try_set_occupied(IVec2::new(4, 4), true);
        assert_eq!(cell.check(anchor, &grid), Some(false));
        assert_eq!(cell.check(anchor, &grid), None);
        grid.try_set_occupied(IVec2::new(4, 4), false);
        assert_eq!(cell.check(anchor, &grid), Some(true));
    }

    #[test]
    fn test_blocked_cell_makes_object_unplaceable() {
        let mut grid = grid();
        grid.try_set_occupied(IVec2::new(4, 4), true);
        let validator = PlacementValidator::build(
            [IVec2::new(0, 0), IVec2::new(2, 0)],
            Vec3::new(4.0, 0.0, 4.0),
            &grid,
        );
        assert_eq!(validator.invalid_count(), 1);
        assert!(!validator.is_placeable());
    }

    #[test]
    fn test_counter_never_drifts_across_moves() {
        let mut grid = grid();
        grid.try_set_occupied(IVec2::new(4, 4), true);
        grid.try_set_occupied(IVec2::new(8, 8), true);
        let offsets = [IVec2::new(0, 0), IVec2::new(2, 0), IVec2::new(0, 2), IVec2::new(2, 2)];
        let mut validator = PlacementValidator::build(offsets, Vec3::ZERO, &grid);

        let path = [
            Vec3::new(2.0, 0.0, 2.0),
            Vec3::new(4.0, 0.0, 4.0),
            Vec3::new(6.0, 0.0, 6.0),
            Vec3::new(18.0, 0.0, 18.0), // partly off-grid
            Vec3::new(-2.0, 0.0, 0.0),
            Vec3::new(10.0, 0.0, 10.0),
        ];
        for anchor in path {
            validator.recheck(anchor, &grid);
            assert_eq!(validator.invalid_count(), counted_invalid(&validator), "at {anchor:?}");
        }
    }

    #[test]
    fn test_recheck_reports_object_level_flip() {
        let mut grid = grid();
        grid.try_set_occupied(IVec2::new(6, 4), true);
        let mut validator =
            PlacementValidator::build([IVec2::new(0, 0), IVec2::new(2, 0)], Vec3::ZERO, &grid);
        assert!(validator.is_placeable());
        assert!(validator.recheck(Vec3::new(4.0, 0.0, 4.0), &grid));
        assert!(!validator.recheck(Vec3::new(6.0, 0.0, 4.0), &grid));
        assert!(validator.recheck(Vec3::new(10.0, 0.0, 10.0), &grid));
    }
}
