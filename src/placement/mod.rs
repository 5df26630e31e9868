//! Placement domain — placed objects, the hold menu, and moving objects
//! across the farm grid with per-cell validation and rollback.
//!
//! Objects receive `ObjectCommand` events from the selection machine and
//! answer with `MoveStarted` / `MoveEnded` plus camera and UI requests.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;
use std::collections::HashSet;

use crate::grid::FarmGrid;
use crate::shared::*;

pub mod marker;
pub mod menu;
pub mod movement;

use marker::PlacementMarker;
use movement::MoveSession;

/// The single object currently being moved, with its session state.
#[derive(Resource, Debug, Default)]
pub struct ActiveMove {
    current: Option<(Entity, MoveSession)>,
}

impl ActiveMove {
    pub fn entity(&self) -> Option<Entity> {
        self.current.as_ref().map(|(entity, _)| *entity)
    }

    pub fn session(&self, entity: Entity) -> Option<&MoveSession> {
        match &self.current {
            Some((mover, session)) if *mover == entity => Some(session),
            _ => None,
        }
    }

    pub fn session_mut(&mut self, entity: Entity) -> Option<&mut MoveSession> {
        match &mut self.current {
            Some((mover, session)) if *mover == entity => Some(session),
            _ => None,
        }
    }

    fn begin(&mut self, entity: Entity, session: MoveSession) {
        self.current = Some((entity, session));
    }

    fn finish(&mut self, entity: Entity) -> Option<MoveSession> {
        if self.entity() != Some(entity) {
            return None;
        }
        self.current.take().map(|(_, session)| session)
    }
}

/// Copy of the object left at its pre-move pose while it is dragged.
#[derive(Component, Debug, Clone, Copy)]
pub struct MoveGhost {
    pub owner: Entity,
}

/// Display mirror of one grid cell, kept in step with the grid bounds.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridCell {
    pub cell: IVec2,
}

/// Outgoing events of the placement systems, bundled so the helpers take
/// one parameter.
#[derive(SystemParam)]
pub struct PlacementEvents<'w> {
    pub camera: EventWriter<'w, CameraRequest>,
    pub ui: EventWriter<'w, UiRequest>,
    pub started: EventWriter<'w, MoveStarted>,
    pub ended: EventWriter<'w, MoveEnded>,
    pub validity: EventWriter<'w, PlacementValidityChanged>,
}

pub struct PlacementPlugin;

impl Plugin for PlacementPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActiveMove>()
            .add_systems(OnEnter(AppState::Playing), spawn_initial_layout)
            .add_systems(
                Update,
                (process_object_commands, handle_grid_resize)
                    .chain()
                    .in_set(FarmSet::Commands)
                    .run_if(in_state(AppState::Playing)),
            )
            .add_systems(
                Update,
                (sync_move_markers, sync_grid_cells)
                    .in_set(FarmSet::Sync)
                    .run_if(in_state(AppState::Playing)),
            );
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// World setup
// ─────────────────────────────────────────────────────────────────────────────

/// Spawns a placeable at `anchor` and registers its cells. Overlaps are
/// logged but the object is still placed.
pub fn spawn_placeable(
    commands: &mut Commands,
    grid: &mut FarmGrid,
    def: &PlaceableDef,
    anchor: Vec3,
) -> Entity {
    let placeable = Placeable {
        def_id: def.id.clone(),
        footprint: def.footprint.iter().map(|&(x, z)| IVec2::new(x, z)).collect(),
        placement_offset: IVec2::new(def.placement_offset.0, def.placement_offset.1),
    };

    let blocked = placeable
        .cells_at(anchor)
        .into_iter()
        .filter(|cell| !grid.can_place(*cell))
        .count();
    if blocked > 0 {
        warn!(
            "[Placement] {} at ({}, {}) overlaps {} blocked cells",
            def.id, anchor.x, anchor.z, blocked
        );
    }
    placeable.set_occupied(anchor, grid, true);
    let offset = placeable.footprint_centre();

    commands
        .spawn((
            placeable,
            Transform::from_translation(anchor),
            PlacementPhase::default(),
            ObjectTint::default(),
            PickBounds {
                offset,
                half_extents: Vec2::new(def.pick_half_extents.0, def.pick_half_extents.1),
                midpoint_height: def.midpoint_height,
            },
            Selectable {
                title: def.title.clone(),
            },
        ))
        .id()
}

fn spawn_initial_layout(
    mut commands: Commands,
    layout: Res<FarmLayout>,
    catalog: Res<PlaceableCatalog>,
    mut grid: ResMut<FarmGrid>,
) {
    let mut spawned = 0;
    for entry in &layout.entries {
        let Some(def) = catalog.get(&entry.placeable) else {
            warn!("[Placement] Unknown placeable '{}' in layout", entry.placeable);
            continue;
        };
        let anchor = Vec3::new(entry.anchor.0, 0.0, entry.anchor.1);
        spawn_placeable(&mut commands, &mut grid, def, anchor);
        spawned += 1;
    }

    if let Some(shop) = &layout.shop {
        commands.spawn((
            ShopFront {
                stock: shop.stock.clone(),
            },
            Transform::from_xyz(shop.anchor.0, 0.0, shop.anchor.1),
            PickBounds {
                offset: Vec2::ZERO,
                half_extents: Vec2::new(shop.pick_half_extents.0, shop.pick_half_extents.1),
                midpoint_height: 0.0,
            },
        ));
    }

    info!("[Placement] Spawned {} placeables", spawned);
}

// ─────────────────────────────────────────────────────────────────────────────
// Command handling
// ─────────────────────────────────────────────────────────────────────────────

type ObjectQuery<'w, 's> = Query<
    'w,
    's,
    (
        &'static mut Placeable,
        &'static mut Transform,
        &'static mut PlacementPhase,
        &'static mut ObjectTint,
        &'static mut PickBounds,
        Option<&'static Selectable>,
    ),
>;

pub fn process_object_commands(
    mut requests: EventReader<ObjectCommand>,
    mut objects: ObjectQuery,
    mut active: ResMut<ActiveMove>,
    mut grid: ResMut<FarmGrid>,
    mut commands: Commands,
    mut events: PlacementEvents,
) {
    for request in requests.read() {
        let entity = request.entity();
        let Ok((mut placeable, mut transform, mut phase, mut tint, mut bounds, selectable)) =
            objects.get_mut(entity)
        else {
            warn!("[Placement] {:?} for a missing object", request);
            continue;
        };

        match *request {
            ObjectCommand::Select(_) => {
                let title = selectable.map(|s| s.title.as_str()).unwrap_or_default();
                menu::select(entity, &transform, &bounds, title, &mut phase, &mut events);
            }
            ObjectCommand::EndSelect(_) => {
                menu::end_select(entity, &mut phase, &mut events);
            }
            ObjectCommand::SelectHold(_) => {
                menu::select_hold(entity, &transform, &bounds, &mut phase, &mut events);
            }
            ObjectCommand::EndSelectHold(_) => {
                menu::end_select_hold(entity, &mut phase, &mut events);
            }
            ObjectCommand::Choose(_, choice) => {
                menu::end_select_hold(entity, &mut phase, &mut events);
                match choice {
                    HoldChoice::Move => {
                        movement::start_move(
                            entity,
                            &placeable,
                            &transform,
                            &bounds,
                            &mut phase,
                            &mut tint,
                            &mut active,
                            &mut grid,
                            &mut commands,
                            &mut events,
                        );
                    }
                    // The grid stays frozen under an open move; the mover's
                    // cached validity depends on it.
                    HoldChoice::Rotate | HoldChoice::Delete if active.entity().is_some() => {
                        warn!(
                            "[Placement] Cannot {:?} {:?} while {:?} is moving",
                            choice,
                            entity,
                            active.entity()
                        );
                    }
                    HoldChoice::Rotate => {
                        if menu::rotate(entity, &mut placeable, &mut transform, &mut grid) {
                            bounds.offset = placeable.footprint_centre();
                            bounds.half_extents = bounds.half_extents.yx();
                        }
                    }
                    HoldChoice::Delete => {
                        menu::delete(entity, &placeable, &transform, &mut grid, &mut commands);
                    }
                }
            }
            ObjectCommand::Drag { point, first, .. } => {
                movement::drag(
                    entity,
                    point,
                    first,
                    &mut transform,
                    &mut tint,
                    &mut active,
                    &grid,
                    &mut events,
                );
            }
            ObjectCommand::Confirm(_) => {
                movement::confirm_move(
                    entity,
                    &placeable,
                    &transform,
                    &mut phase,
                    &mut tint,
                    &mut active,
                    &mut grid,
                    &mut commands,
                    &mut events,
                );
            }
            ObjectCommand::Cancel(_) => {
                movement::cancel_move(
                    entity,
                    &placeable,
                    &mut transform,
                    &mut phase,
                    &mut tint,
                    &mut active,
                    &mut grid,
                    &mut commands,
                    &mut events,
                );
            }
        }
    }
}

/// Keeps the marker entities on their footprint cells and validity.
pub fn sync_move_markers(
    active: Res<ActiveMove>,
    owners: Query<&Transform, (With<Placeable>, Without<PlacementMarker>)>,
    mut markers: Query<(&mut PlacementMarker, &mut Transform), Without<Placeable>>,
) {
    for (mut marker, mut transform) in &mut markers {
        let Some(session) = active.session(marker.owner) else {
            continue;
        };
        let (Some(cell), Ok(owner)) = (
            session.validator.cells().get(marker.index),
            owners.get(marker.owner),
        ) else {
            continue;
        };
        if marker.valid != cell.valid {
            marker.valid = cell.valid;
        }
        transform.translation = cell.world_position(owner.translation);
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Grid bounds
// ─────────────────────────────────────────────────────────────────────────────

pub fn handle_grid_resize(
    mut requests: EventReader<GridResizeRequest>,
    active: Res<ActiveMove>,
    mut grid: ResMut<FarmGrid>,
) {
    for request in requests.read() {
        if let Some(mover) = active.entity() {
            warn!(
                "[Placement] Cannot resize the grid to {}x{} while {:?} is moving",
                request.cells_x, request.cells_z, mover
            );
            continue;
        }
        grid.resize(request.cells_x, request.cells_z);
        info!("[Placement] Grid resized to {}x{}", request.cells_x, request.cells_z);
    }
}

/// Spawns a `GridCell` for every cell inside the bounds and despawns the
/// ones that fell outside.
pub fn sync_grid_cells(
    mut commands: Commands,
    grid: Res<FarmGrid>,
    cells: Query<(Entity, &GridCell)>,
) {
    if !grid.is_changed() {
        return;
    }
    let wanted: HashSet<IVec2> = grid.bounds_cells().into_iter().collect();
    let mut present = HashSet::new();
    for (entity, cell) in &cells {
        if wanted.contains(&cell.cell) {
            present.insert(cell.cell);
        } else {
            commands.entity(entity).despawn();
        }
    }
    for cell in wanted.difference(&present) {
        commands.spawn((
            GridCell { cell: *cell },
            Transform::from_xyz(cell.x as f32, 0.0, cell.y as f32),
        ));
    }
}
