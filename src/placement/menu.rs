//! Select, hold menu, rotate and delete for placed objects.

use bevy::prelude::*;
use std::f32::consts::FRAC_PI_2;

use crate::grid::FarmGrid;
use crate::shared::*;

use super::PlacementEvents;

/// Frames the object on camera and opens its select panel.
pub fn select(
    entity: Entity,
    transform: &Transform,
    bounds: &PickBounds,
    title: &str,
    phase: &mut PlacementPhase,
    events: &mut PlacementEvents,
) {
    if *phase == PlacementPhase::Moving {
        debug!("[Placement] Select ignored for {:?}, it is moving", entity);
        return;
    }
    *phase = PlacementPhase::Selected;
    events.camera.send(CameraRequest::FrameObject {
        center: bounds.midpoint(transform.translation),
        half_extents: bounds.half_extents,
    });
    events.ui.send(UiRequest::OpenSelectPanel {
        entity,
        title: title.to_string(),
    });
}

pub fn end_select(entity: Entity, phase: &mut PlacementPhase, events: &mut PlacementEvents) {
    if *phase != PlacementPhase::Selected {
        return;
    }
    *phase = PlacementPhase::Idle;
    events.camera.send(CameraRequest::ZoomOut);
    events.ui.send(UiRequest::CloseSelectPanel { entity });
}

/// Opens the Move / Rotate / Delete menu above the object.
pub fn select_hold(
    entity: Entity,
    transform: &Transform,
    bounds: &PickBounds,
    phase: &mut PlacementPhase,
    events: &mut PlacementEvents,
) {
    if *phase == PlacementPhase::Moving {
        debug!("[Placement] Hold ignored for {:?}, it is moving", entity);
        return;
    }
    *phase = PlacementPhase::HoldMenuOpen;
    events.ui.send(UiRequest::OpenHoldMenu {
        entity,
        anchor: bounds.midpoint(transform.translation),
    });
}

/// Closes the hold menu if it is open. Otherwise a no-op.
pub fn end_select_hold(entity: Entity, phase: &mut PlacementPhase, events: &mut PlacementEvents) {
    if *phase != PlacementPhase::HoldMenuOpen {
        return;
    }
    *phase = PlacementPhase::Idle;
    events.ui.send(UiRequest::CloseHoldMenu { entity });
}

/// Footprint offsets after a quarter turn clockwise seen from above.
pub fn rotated_footprint(placeable: &Placeable) -> Vec<IVec2> {
    placeable
        .footprint
        .iter()
        .map(|offset| {
            let combined = placeable.placement_offset + *offset;
            IVec2::new(combined.y, -combined.x)
        })
        .collect()
}

/// Turns the object a quarter turn in place if the rotated footprint fits.
pub fn rotate(
    entity: Entity,
    placeable: &mut Placeable,
    transform: &mut Transform,
    grid: &mut FarmGrid,
) -> bool {
    let anchor = transform.translation;
    // The object's own cells do not block its rotation.
    placeable.set_occupied(anchor, grid, false);

    let rotated = Placeable {
        def_id: placeable.def_id.clone(),
        footprint: rotated_footprint(placeable),
        placement_offset: IVec2::ZERO,
    };
    if rotated.cells_at(anchor).iter().all(|cell| grid.can_place(*cell)) {
        *placeable = rotated;
        transform.rotate_y(-FRAC_PI_2);
        placeable.set_occupied(anchor, grid, true);
        info!("[Placement] Rotated {} ({:?})", placeable.def_id, entity);
        true
    } else {
        placeable.set_occupied(anchor, grid, true);
        warn!(
            "[Placement] Cannot rotate {} ({:?}): rotated footprint is blocked",
            placeable.def_id, entity
        );
        false
    }
}

/// Frees the object's cells and removes it from the world.
pub fn delete(
    entity: Entity,
    placeable: &Placeable,
    transform: &Transform,
    grid: &mut FarmGrid,
    commands: &mut Commands,
) {
    placeable.set_occupied(transform.translation, grid, false);
    commands.entity(entity).despawn_recursive();
    info!("[Placement] Deleted {} ({:?})", placeable.def_id, entity);
}
