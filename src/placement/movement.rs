//! Moving a placed object: snapshot, drag snapping, confirm and cancel.

use bevy::prelude::*;

use crate::grid::FarmGrid;
use crate::shared::*;

use super::marker::{PlacementMarker, PlacementValidator};
use super::{ActiveMove, MoveGhost, PlacementEvents};

/// State owned by the object for the duration of one move.
#[derive(Debug, Clone)]
pub struct MoveSession {
    /// Pose before the move started.
    pub snapshot: Transform,
    pub drag_offset: Vec3,
    pub validator: PlacementValidator,
    pub markers: Vec<Entity>,
    pub ghost: Option<Entity>,
}

impl MoveSession {
    /// Records the offset between the touched point and the anchor so the
    /// pivot does not jump to the cursor.
    pub fn begin_drag(&mut self, anchor: Vec3, point: Vec3) {
        self.drag_offset = anchor - Vec3::new(point.x, anchor.y, point.z);
    }

    /// Snapped anchor for a drag to `point`, or `None` if the object would
    /// not move.
    pub fn drag_target(&self, anchor: Vec3, point: Vec3) -> Option<Vec3> {
        let mut target = Vec3::new(point.x, anchor.y, point.z) + self.drag_offset;
        target.x = closest_even(target.x) as f32;
        target.z = closest_even(target.z) as f32;
        (target != anchor).then_some(target)
    }
}

/// Closest even integer to `value`. Cells are 2 units wide, so anchors
/// always sit on even coordinates.
pub fn closest_even(value: f32) -> i32 {
    let rounded = value.round() as i32;
    if rounded % 2 != 0 {
        if value > rounded as f32 {
            return rounded + 1;
        }
        return rounded - 1;
    }
    rounded
}

/// Footprint offsets for a placeable: placement offset plus each footprint cell.
pub fn footprint_offsets(placeable: &Placeable) -> Vec<IVec2> {
    placeable
        .footprint
        .iter()
        .map(|offset| placeable.placement_offset + *offset)
        .collect()
}

/// Begins moving `entity`. Frees its cells, leaves a ghost at the old pose
/// and spawns one marker per footprint cell.
#[allow(clippy::too_many_arguments)]
pub fn start_move(
    entity: Entity,
    placeable: &Placeable,
    transform: &Transform,
    bounds: &PickBounds,
    phase: &mut PlacementPhase,
    tint: &mut ObjectTint,
    active: &mut ActiveMove,
    grid: &mut FarmGrid,
    commands: &mut Commands,
    events: &mut PlacementEvents,
) -> bool {
    if let Some(mover) = active.entity() {
        warn!(
            "[Placement] {:?} cannot start moving while {:?} is still moving",
            entity, mover
        );
        return false;
    }

    placeable.set_occupied(transform.translation, grid, false);

    let ghost = commands
        .spawn((MoveGhost { owner: entity }, *transform))
        .id();

    let validator = PlacementValidator::build(footprint_offsets(placeable), transform.translation, grid);
    let markers = validator
        .cells()
        .iter()
        .enumerate()
        .map(|(index, cell)| {
            commands
                .spawn((
                    PlacementMarker { owner: entity, index, valid: cell.valid },
                    Transform::from_translation(cell.world_position(transform.translation)),
                ))
                .id()
        })
        .collect();

    *tint = if validator.is_placeable() {
        ObjectTint::Selector
    } else {
        ObjectTint::InvalidSelector
    };
    *phase = PlacementPhase::Moving;

    active.begin(
        entity,
        MoveSession {
            snapshot: *transform,
            drag_offset: Vec3::ZERO,
            validator,
            markers,
            ghost: Some(ghost),
        },
    );

    events.ui.send(UiRequest::ShowConfirmCancel {
        entity,
        anchor: bounds.midpoint(transform.translation),
    });
    events.started.send(MoveStarted { entity });
    info!("[Placement] Started moving {} ({:?})", placeable.def_id, entity);
    true
}

/// Applies one drag update to the moving object.
pub fn drag(
    entity: Entity,
    point: Vec3,
    first: bool,
    transform: &mut Transform,
    tint: &mut ObjectTint,
    active: &mut ActiveMove,
    grid: &FarmGrid,
    events: &mut PlacementEvents,
) {
    let Some(session) = active.session_mut(entity) else {
        debug!("[Placement] Drag for {:?} ignored, it is not moving", entity);
        return;
    };

    if first {
        session.begin_drag(transform.translation, point);
        return;
    }

    let Some(target) = session.drag_target(transform.translation, point) else {
        return;
    };
    transform.translation = target;

    if session.validator.recheck(target, grid) {
        let placeable = session.validator.is_placeable();
        *tint = if placeable {
            ObjectTint::Selector
        } else {
            ObjectTint::InvalidSelector
        };
        events
            .validity
            .send(PlacementValidityChanged { entity, placeable });
    }
}

/// Places the object at its current anchor if every footprint cell is valid.
/// Invalid placements are rejected without any state change.
#[allow(clippy::too_many_arguments)]
pub fn confirm_move(
    entity: Entity,
    placeable: &Placeable,
    transform: &Transform,
    phase: &mut PlacementPhase,
    tint: &mut ObjectTint,
    active: &mut ActiveMove,
    grid: &mut FarmGrid,
    commands: &mut Commands,
    events: &mut PlacementEvents,
) -> bool {
    let Some(session) = active.session_mut(entity) else {
        debug!("[Placement] Confirm for {:?} ignored, it is not moving", entity);
        return false;
    };
    if !session.validator.is_placeable() {
        debug!(
            "[Placement] Confirm rejected for {:?}: {} invalid cells",
            entity,
            session.validator.invalid_count()
        );
        return false;
    }

    placeable.set_occupied(transform.translation, grid, true);
    end_move(entity, true, phase, tint, active, commands, events);
    info!(
        "[Placement] {} placed at ({}, {})",
        placeable.def_id, transform.translation.x, transform.translation.z
    );
    true
}

/// Restores the pre-move pose and re-occupies the original cells. A cancel
/// for an object that is not moving does nothing.
#[allow(clippy::too_many_arguments)]
pub fn cancel_move(
    entity: Entity,
    placeable: &Placeable,
    transform: &mut Transform,
    phase: &mut PlacementPhase,
    tint: &mut ObjectTint,
    active: &mut ActiveMove,
    grid: &mut FarmGrid,
    commands: &mut Commands,
    events: &mut PlacementEvents,
) -> bool {
    let Some(session) = active.session_mut(entity) else {
        debug!("[Placement] Cancel for {:?} ignored, it is not moving", entity);
        return false;
    };

    transform.translation = session.snapshot.translation;
    transform.rotation = session.snapshot.rotation;
    placeable.set_occupied(transform.translation, grid, true);
    end_move(entity, false, phase, tint, active, commands, events);
    info!("[Placement] Move of {} cancelled", placeable.def_id);
    true
}

/// Cleanup shared by confirm and cancel.
fn end_move(
    entity: Entity,
    confirmed: bool,
    phase: &mut PlacementPhase,
    tint: &mut ObjectTint,
    active: &mut ActiveMove,
    commands: &mut Commands,
    events: &mut PlacementEvents,
) {
    if let Some(session) = active.finish(entity) {
        let transient = session.markers.into_iter().chain(session.ghost);
        for transient_entity in transient {
            // Already-despawned markers are skipped.
            if let Some(mut entity_commands) = commands.get_entity(transient_entity) {
                entity_commands.despawn();
            }
        }
    }
    *tint = ObjectTint::Normal;
    *phase = PlacementPhase::Idle;
    events.ui.send(UiRequest::HideConfirmCancel { entity });
    events.ended.send(MoveEnded { entity, confirmed });
}
