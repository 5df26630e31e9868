//! Headless integration tests for Farmstead.
//!
//! These tests exercise the game's ECS logic without a window or GPU.
//! They use Bevy's `MinimalPlugins` to tick the app, add every gameplay
//! plugin except input, and drive the farm by writing `TouchPointer` and
//! sending events the way the input layer and UI would.
//!
//! Run with: `cargo test --test headless`

use std::collections::HashSet;

use bevy::ecs::event::EventCursor;
use bevy::prelude::*;
use bevy::state::app::StatesPlugin;
use farmstead::economy::inventory::Inventory;
use farmstead::farming::garden::GardenSoil;
use farmstead::farming::FarmClock;
use farmstead::grid::FarmGrid;
use farmstead::placement::marker::PlacementMarker;
use farmstead::placement::{ActiveMove, GridCell};
use farmstead::selection::{SelectionMachine, SelectionMode};
use farmstead::shared::*;
use farmstead::FarmPlugins;

/// Pinned wall clock for every test.
const T0: f64 = 1_750_000_000.0;

// ─────────────────────────────────────────────────────────────────────────────
// Test App Builder
// ─────────────────────────────────────────────────────────────────────────────

/// Builds the farm with the embedded data and ticks it into Playing.
fn build_farm_app() -> App {
    let mut app = App::new();
    app.add_plugins(MinimalPlugins);
    app.add_plugins(StatesPlugin);
    app.add_plugins(FarmPlugins);
    app.insert_resource(FarmClock::at(T0));

    // Loading → data installed; Playing → layout spawned; then gardens get slots.
    app.update();
    app.update();
    app.update();
    app
}

fn send<E: Event>(app: &mut App, event: E) {
    app.world_mut().send_event(event);
}

/// Reads every event of one type exactly once, however many updates it
/// stays buffered for. Events are left in place for the game's own readers.
struct EventLog<E: Event>(EventCursor<E>);

impl<E: Event + Clone> EventLog<E> {
    /// Starts after every event already sent.
    fn new(app: &App) -> Self {
        Self(app.world().resource::<Events<E>>().get_cursor_current())
    }

    /// Events sent since the previous call.
    fn fresh(&mut self, app: &App) -> Vec<E> {
        self.0
            .read(app.world().resource::<Events<E>>())
            .cloned()
            .collect()
    }
}

fn set_pointer(app: &mut App, x: f32, z: f32, contacts: u8) {
    let mut pointer = app.world_mut().resource_mut::<TouchPointer>();
    pointer.position = Vec2::new(x, z);
    pointer.contacts = contacts;
    pointer.over_ui = false;
}

fn placeable_at(app: &mut App, def_id: &str, x: f32, z: f32) -> Entity {
    let mut query = app.world_mut().query::<(Entity, &Placeable, &Transform)>();
    query
        .iter(app.world())
        .find(|(_, placeable, transform)| {
            placeable.def_id == def_id
                && transform.translation.x == x
                && transform.translation.z == z
        })
        .map(|(entity, _, _)| entity)
        .unwrap_or_else(|| panic!("no {def_id} at ({x}, {z})"))
}

fn occupied(app: &App) -> HashSet<IVec2> {
    app.world().resource::<FarmGrid>().occupied_cells().collect()
}

fn marker_count(app: &mut App) -> usize {
    let mut query = app.world_mut().query::<&PlacementMarker>();
    query.iter(app.world()).count()
}

fn grid_cell_count(app: &mut App) -> usize {
    let mut query = app.world_mut().query::<&GridCell>();
    query.iter(app.world()).count()
}

fn phase(app: &App, entity: Entity) -> PlacementPhase {
    *app.world().get::<PlacementPhase>(entity).expect("placeable has a phase")
}

fn anchor(app: &App, entity: Entity) -> Vec3 {
    app.world().get::<Transform>(entity).expect("placeable has a transform").translation
}

fn mode(app: &App) -> SelectionMode {
    app.world().resource::<SelectionMachine>().mode()
}

fn drag(app: &mut App, entity: Entity, x: f32, z: f32, first: bool) {
    send(app, ObjectCommand::Drag { entity, point: Vec3::new(x, 0.0, z), first });
    app.update();
}

// ─────────────────────────────────────────────────────────────────────────────
// Boot
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_headless_boot_installs_farm() {
    let mut app = build_farm_app();

    let state = app.world().resource::<State<AppState>>();
    assert_eq!(state.get(), &AppState::Playing, "Expected to reach Playing after loading data");

    // Two 2-cell gardens and a 4-cell shed.
    assert_eq!(occupied(&app).len(), 8);
    assert_eq!(app.world().resource::<Inventory>().gold(), 500);
    assert_eq!(grid_cell_count(&mut app), 100, "One visual cell per grid cell");

    let garden = placeable_at(&mut app, "garden_soil", 4.0, 4.0);
    let soil = app.world().get::<GardenSoil>(garden).expect("garden has slots");
    assert_eq!(soil.slots.len(), 3);
    assert!(soil.slots.iter().all(|slot| slot.is_empty()));

    let shed = placeable_at(&mut app, "shed", 12.0, 12.0);
    assert!(app.world().get::<GardenSoil>(shed).is_none());

    // Smoke: run a small frame budget without panic.
    for _ in 0..60 {
        app.update();
    }
    assert_eq!(mode(&app), SelectionMode::None);
    assert_eq!(grid_cell_count(&mut app), 100);
}

// ─────────────────────────────────────────────────────────────────────────────
// Placement
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_move_then_cancel_restores_grid_exactly() {
    let mut app = build_farm_app();
    let garden = placeable_at(&mut app, "garden_soil", 4.0, 4.0);
    let before = occupied(&app);
    let mut started = EventLog::<MoveStarted>::new(&app);
    let mut ended = EventLog::<MoveEnded>::new(&app);

    send(&mut app, ObjectCommand::Choose(garden, HoldChoice::Move));
    app.update();

    assert_eq!(phase(&app, garden), PlacementPhase::Moving);
    assert_eq!(app.world().resource::<ActiveMove>().entity(), Some(garden));
    assert_eq!(started.fresh(&app).len(), 1);
    assert!(!occupied(&app).contains(&IVec2::new(4, 4)));
    assert_eq!(marker_count(&mut app), 2);

    drag(&mut app, garden, 4.0, 4.0, true);
    drag(&mut app, garden, 8.2, 6.1, false);
    drag(&mut app, garden, 14.9, 1.0, false);
    drag(&mut app, garden, 30.0, 30.0, false);
    assert_eq!(anchor(&app, garden), Vec3::new(30.0, 0.0, 30.0));

    send(&mut app, ObjectCommand::Cancel(garden));
    app.update();

    assert_eq!(anchor(&app, garden), Vec3::new(4.0, 0.0, 4.0));
    assert_eq!(occupied(&app), before);
    assert_eq!(phase(&app, garden), PlacementPhase::Idle);
    assert_eq!(app.world().resource::<ActiveMove>().entity(), None);
    assert_eq!(marker_count(&mut app), 0);

    let cancelled = ended.fresh(&app);
    assert_eq!(cancelled.len(), 1);
    assert!(!cancelled[0].confirmed);

    // A second cancel is a no-op.
    send(&mut app, ObjectCommand::Cancel(garden));
    app.update();
    app.update();
    assert!(ended.fresh(&app).is_empty(), "A repeated cancel must not end the move again");
    assert_eq!(occupied(&app), before);
    assert_eq!(anchor(&app, garden), Vec3::new(4.0, 0.0, 4.0));
}

#[test]
fn test_confirm_rejected_on_blocked_cell_then_accepted() {
    let mut app = build_farm_app();
    let mover = placeable_at(&mut app, "garden_soil", 4.0, 10.0);
    let mut flips = EventLog::<PlacementValidityChanged>::new(&app);
    let mut ended = EventLog::<MoveEnded>::new(&app);

    send(&mut app, ObjectCommand::Choose(mover, HoldChoice::Move));
    app.update();

    // Onto the other garden at (4, 4): candidate cells {(4,4), (6,4)}.
    drag(&mut app, mover, 4.0, 10.0, true);
    drag(&mut app, mover, 4.0, 4.0, false);

    let flipped = flips.fresh(&app);
    assert_eq!(flipped.len(), 1);
    assert!(!flipped[0].placeable);
    assert_eq!(
        app.world().get::<ObjectTint>(mover),
        Some(&ObjectTint::InvalidSelector)
    );

    send(&mut app, ObjectCommand::Confirm(mover));
    app.update();
    app.update();
    assert_eq!(phase(&app, mover), PlacementPhase::Moving, "Confirm should be rejected");
    assert_eq!(marker_count(&mut app), 2, "Markers remain after a rejected confirm");
    assert!(ended.fresh(&app).is_empty());

    drag(&mut app, mover, 10.0, 4.0, false);
    send(&mut app, ObjectCommand::Confirm(mover));
    app.update();

    assert_eq!(phase(&app, mover), PlacementPhase::Idle);
    let cells = occupied(&app);
    assert!(cells.contains(&IVec2::new(10, 4)));
    assert!(cells.contains(&IVec2::new(12, 4)));
    assert!(!cells.contains(&IVec2::new(4, 10)));
    assert!(!cells.contains(&IVec2::new(6, 10)));
    let confirmed = ended.fresh(&app);
    assert_eq!(confirmed.len(), 1);
    assert!(confirmed[0].confirmed);
    assert_eq!(marker_count(&mut app), 0);
}

#[test]
fn test_only_one_object_moves_at_a_time() {
    let mut app = build_farm_app();
    let garden = placeable_at(&mut app, "garden_soil", 4.0, 4.0);
    let shed = placeable_at(&mut app, "shed", 12.0, 12.0);

    send(&mut app, ObjectCommand::Choose(garden, HoldChoice::Move));
    app.update();
    send(&mut app, ObjectCommand::Choose(shed, HoldChoice::Move));
    app.update();

    assert_eq!(app.world().resource::<ActiveMove>().entity(), Some(garden));
    assert_eq!(phase(&app, shed), PlacementPhase::Idle);
    assert!(occupied(&app).contains(&IVec2::new(12, 12)));
}

#[test]
fn test_rotate_and_delete_update_grid() {
    let mut app = build_farm_app();
    let garden = placeable_at(&mut app, "garden_soil", 4.0, 4.0);

    send(&mut app, ObjectCommand::Choose(garden, HoldChoice::Rotate));
    app.update();
    let cells = occupied(&app);
    assert!(cells.contains(&IVec2::new(4, 4)));
    assert!(cells.contains(&IVec2::new(4, 2)));
    assert!(!cells.contains(&IVec2::new(6, 4)));

    // The pick rectangle turns with the footprint: it now spans z in [2, 6].
    let bounds = *app.world().get::<PickBounds>(garden).expect("garden has bounds");
    let anchor = Vec3::new(4.0, 0.0, 4.0);
    assert!(bounds.contains(anchor, Vec3::new(4.5, 0.0, 2.5)));
    assert!(!bounds.contains(anchor, Vec3::new(7.5, 0.0, 4.5)));

    send(&mut app, ObjectCommand::Choose(garden, HoldChoice::Delete));
    app.update();
    app.update();
    assert!(!app.world().entities().contains(garden));
    assert!(!occupied(&app).contains(&IVec2::new(4, 4)));
    assert_eq!(occupied(&app).len(), 6);
}

#[test]
fn test_grid_is_frozen_for_other_objects_during_a_move() {
    let mut app = build_farm_app();
    let mover = placeable_at(&mut app, "garden_soil", 4.0, 10.0);
    let other = placeable_at(&mut app, "garden_soil", 4.0, 4.0);
    let mut ended = EventLog::<MoveEnded>::new(&app);

    send(&mut app, ObjectCommand::Choose(mover, HoldChoice::Move));
    app.update();
    drag(&mut app, mover, 4.0, 10.0, true);
    drag(&mut app, mover, 4.0, 2.0, false);
    assert_eq!(app.world().get::<ObjectTint>(mover), Some(&ObjectTint::Selector));

    // Turning the other garden would swing it onto (4, 2).
    send(&mut app, ObjectCommand::Choose(other, HoldChoice::Rotate));
    app.update();
    let cells = occupied(&app);
    assert!(cells.contains(&IVec2::new(6, 4)), "Rotate is refused while a move is open");
    assert!(!cells.contains(&IVec2::new(4, 2)));

    send(&mut app, ObjectCommand::Choose(other, HoldChoice::Delete));
    app.update();
    app.update();
    assert!(app.world().entities().contains(other), "Delete is refused while a move is open");
    assert!(occupied(&app).contains(&IVec2::new(4, 4)));

    send(&mut app, ObjectCommand::Confirm(mover));
    app.update();
    assert!(ended.fresh(&app).iter().any(|ev| ev.confirmed));
    let cells = occupied(&app);
    for (x, z) in [(4, 2), (6, 2), (4, 4), (6, 4)] {
        assert!(cells.contains(&IVec2::new(x, z)), "({x}, {z}) should be occupied");
    }
    assert_eq!(cells.len(), 8, "No two objects share a cell");
}

#[test]
fn test_grid_resize_rebuilds_cells_and_waits_for_moves() {
    let mut app = build_farm_app();
    let garden = placeable_at(&mut app, "garden_soil", 4.0, 4.0);

    send(&mut app, GridResizeRequest { cells_x: 12, cells_z: 12 });
    app.update();
    app.update();
    assert_eq!(app.world().resource::<FarmGrid>().size(), Vec2::new(24.0, 24.0));
    assert_eq!(grid_cell_count(&mut app), 144);
    assert_eq!(occupied(&app).len(), 8);

    send(&mut app, ObjectCommand::Choose(garden, HoldChoice::Move));
    app.update();
    send(&mut app, GridResizeRequest { cells_x: 4, cells_z: 4 });
    app.update();
    app.update();
    assert_eq!(
        app.world().resource::<FarmGrid>().size(),
        Vec2::new(24.0, 24.0),
        "Resize is refused while a move is open"
    );
    assert_eq!(grid_cell_count(&mut app), 144);

    send(&mut app, ObjectCommand::Cancel(garden));
    app.update();
    // World [0, 12) on both axes: the shed at (12, 12) falls outside.
    send(&mut app, GridResizeRequest { cells_x: 6, cells_z: 6 });
    app.update();
    app.update();
    assert_eq!(grid_cell_count(&mut app), 36);
    let cells = occupied(&app);
    assert_eq!(cells.len(), 4);
    assert!(!cells.contains(&IVec2::new(12, 12)));
    assert!(cells.contains(&IVec2::new(4, 4)));
    assert!(cells.contains(&IVec2::new(6, 10)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Selection
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_drag_start_is_deferred_one_tick() {
    let mut app = build_farm_app();
    let mut camera = EventLog::<CameraRequest>::new(&app);
    set_pointer(&mut app, 30.0, 30.0, 1);

    send(&mut app, GestureEvent::DragStart);
    app.update();
    assert_eq!(mode(&app), SelectionMode::None);
    assert!(!camera.fresh(&app).contains(&CameraRequest::StartDrag));

    app.update();
    assert_eq!(mode(&app), SelectionMode::Dragging);
    assert!(camera.fresh(&app).contains(&CameraRequest::StartDrag));

    send(&mut app, GestureEvent::DragEnd);
    app.update();
    assert_eq!(mode(&app), SelectionMode::None);
}

#[test]
fn test_drag_start_over_ui_never_pans() {
    let mut app = build_farm_app();
    let mut camera = EventLog::<CameraRequest>::new(&app);
    set_pointer(&mut app, 30.0, 30.0, 1);
    app.world_mut().resource_mut::<TouchPointer>().over_ui = true;

    send(&mut app, GestureEvent::DragStart);
    app.update();
    app.update();
    assert_eq!(mode(&app), SelectionMode::None);
    assert!(!camera.fresh(&app).contains(&CameraRequest::StartDrag));
}

#[test]
fn test_tap_selects_object_and_frames_camera() {
    let mut app = build_farm_app();
    let garden = placeable_at(&mut app, "garden_soil", 4.0, 4.0);
    let mut ui = EventLog::<UiRequest>::new(&app);
    let mut camera = EventLog::<CameraRequest>::new(&app);
    set_pointer(&mut app, 4.0, 4.0, 0);

    send(&mut app, GestureEvent::Tap);
    app.update();

    assert_eq!(mode(&app), SelectionMode::Select);
    assert_eq!(phase(&app, garden), PlacementPhase::Selected);
    assert!(ui.fresh(&app).contains(&UiRequest::OpenSelectPanel {
        entity: garden,
        title: "Garden Soil".into(),
    }));
    // Framed on the middle of both cells, not on the anchor.
    assert!(camera.fresh(&app).contains(&CameraRequest::FrameObject {
        center: Vec3::new(6.0, 1.0, 5.0),
        half_extents: Vec2::new(2.0, 1.0),
    }));

    send(&mut app, SelectionCommand::EndSelect);
    app.update();
    assert_eq!(phase(&app, garden), PlacementPhase::Idle);
    assert!(camera.fresh(&app).contains(&CameraRequest::ZoomOut));
}

#[test]
fn test_tap_on_far_cell_of_footprint_selects_object() {
    let mut app = build_farm_app();
    let garden = placeable_at(&mut app, "garden_soil", 4.0, 4.0);
    set_pointer(&mut app, 7.5, 5.5, 0);

    send(&mut app, GestureEvent::Tap);
    app.update();

    assert_eq!(mode(&app), SelectionMode::Select);
    assert_eq!(app.world().resource::<SelectionMachine>().selected(), Some(garden));
    assert_eq!(phase(&app, garden), PlacementPhase::Selected);
}

#[test]
fn test_hold_move_drag_and_confirm_through_gestures() {
    let mut app = build_farm_app();
    let garden = placeable_at(&mut app, "garden_soil", 4.0, 4.0);
    set_pointer(&mut app, 4.0, 4.0, 1);

    send(&mut app, GestureEvent::LongPress);
    app.update();
    assert_eq!(mode(&app), SelectionMode::SelectHold);
    assert_eq!(phase(&app, garden), PlacementPhase::HoldMenuOpen);

    // The hold menu's Move button.
    send(&mut app, ObjectCommand::Choose(garden, HoldChoice::Move));
    app.update();
    app.update();
    assert_eq!(app.world().resource::<SelectionMachine>().mover(), Some(garden));
    assert_eq!(mode(&app), SelectionMode::None);

    // Touch the mover and drag it two cells along x and one along z.
    send(&mut app, GestureEvent::DragStart);
    app.update();
    assert_eq!(mode(&app), SelectionMode::MovingObject);

    set_pointer(&mut app, 8.0, 6.0, 1);
    app.update();
    assert_eq!(anchor(&app, garden), Vec3::new(8.0, 0.0, 6.0));

    // Lifting the finger does not end the move.
    set_pointer(&mut app, 8.0, 6.0, 0);
    send(&mut app, GestureEvent::DragEnd);
    app.update();
    assert_eq!(mode(&app), SelectionMode::MovingObject);

    send(&mut app, ObjectCommand::Confirm(garden));
    app.update();
    app.update();
    assert_eq!(mode(&app), SelectionMode::None);
    assert_eq!(app.world().resource::<SelectionMachine>().mover(), None);
    let cells = occupied(&app);
    assert!(cells.contains(&IVec2::new(8, 6)));
    assert!(cells.contains(&IVec2::new(10, 6)));
}

// ─────────────────────────────────────────────────────────────────────────────
// Economy
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_gold_changes_notify_running_totals() {
    let mut app = build_farm_app();
    let mut gold = EventLog::<GoldChangedEvent>::new(&app);

    send(&mut app, GoldChangeRequest { amount: 50, reason: "test gain".into() });
    send(&mut app, GoldChangeRequest { amount: -30, reason: "test spend".into() });
    app.update();

    let totals: Vec<u32> = gold.fresh(&app).iter().map(|ev| ev.total).collect();
    assert_eq!(totals, vec![550, 520]);
    assert_eq!(app.world().resource::<Inventory>().gold(), 520);
}

#[test]
fn test_shop_tap_purchase_and_exit() {
    let mut app = build_farm_app();
    let mut ui = EventLog::<UiRequest>::new(&app);
    let mut gold = EventLog::<GoldChangedEvent>::new(&app);
    set_pointer(&mut app, -6.0, 4.0, 0);

    send(&mut app, GestureEvent::Tap);
    app.update();
    assert_eq!(mode(&app), SelectionMode::Shop);
    let greetings = app.world().resource::<FarmTuning>().shop_greetings.clone();
    let opened = ui.fresh(&app).into_iter().find_map(|req| match req {
        UiRequest::OpenShop { greeting } => Some(greeting),
        _ => None,
    });
    assert!(opened.is_some_and(|greeting| greetings.contains(&greeting)));

    send(&mut app, ShopCommand::AddToCart("wheat_seeds".into()));
    send(&mut app, ShopCommand::AddToCart("carrot_seeds".into()));
    send(&mut app, ShopCommand::AddToCart("wheat".into())); // not stocked
    send(&mut app, ShopCommand::Purchase);
    app.update();

    let inventory = app.world().resource::<Inventory>();
    assert_eq!(inventory.quantity_of("wheat_seeds", 0), 6);
    assert_eq!(inventory.quantity_of("carrot_seeds", 0), 3);
    assert_eq!(inventory.gold(), 500 - 10 - 25);
    let totals: Vec<u32> = gold.fresh(&app).iter().map(|ev| ev.total).collect();
    assert_eq!(totals, vec![465]);

    send(&mut app, ShopCommand::Exit);
    app.update();
    assert!(ui.fresh(&app).contains(&UiRequest::CloseShop));
    app.update();
    assert_eq!(mode(&app), SelectionMode::None);
}

#[test]
fn test_purchases_in_one_frame_never_overdraw() {
    let mut app = build_farm_app();

    // 8 pumpkin seeds at 60g leave 20g, so the next one is unaffordable.
    for _ in 0..MAX_CART_ITEMS {
        send(&mut app, ShopCommand::AddToCart("pumpkin_seeds".into()));
    }
    send(&mut app, ShopCommand::Purchase);
    send(&mut app, ShopCommand::AddToCart("pumpkin_seeds".into()));
    send(&mut app, ShopCommand::Purchase);
    app.update();
    app.update();

    let inventory = app.world().resource::<Inventory>();
    assert_eq!(inventory.quantity_of("pumpkin_seeds", 0), 8);
    assert_eq!(inventory.gold(), 20);
}

#[test]
fn test_sell_pays_quality_weighted_price() {
    let mut app = build_farm_app();
    let carrot = app
        .world()
        .resource::<ItemCatalog>()
        .get("carrot")
        .cloned()
        .expect("carrot in catalog");
    app.world_mut().resource_mut::<Inventory>().add_item(&carrot, 50, 2);

    send(
        &mut app,
        ShopCommand::Sell { item: "carrot".into(), quality: 50, quantity: 2 },
    );
    app.update();

    // 15 + floor(0.5 * (45 - 15)) = 30 each.
    let inventory = app.world().resource::<Inventory>();
    assert_eq!(inventory.gold(), 560);
    assert!(!inventory.contains("carrot"));
}

#[test]
fn test_sale_too_large_for_gold_is_refused() {
    let mut app = build_farm_app();

    send(
        &mut app,
        ShopCommand::Sell { item: "wheat_seeds".into(), quality: 0, quantity: u32::MAX },
    );
    app.update();
    app.update();

    let inventory = app.world().resource::<Inventory>();
    assert_eq!(inventory.gold(), 500);
    assert_eq!(inventory.quantity_of("wheat_seeds", 0), 5);
}

// ─────────────────────────────────────────────────────────────────────────────
// Farming
// ─────────────────────────────────────────────────────────────────────────────

#[test]
fn test_plant_then_harvest_after_growth() {
    let mut app = build_farm_app();
    let garden = placeable_at(&mut app, "garden_soil", 4.0, 4.0);
    let mut harvests = EventLog::<HarvestResultEvent>::new(&app);

    send(&mut app, PlantRequest { soil: garden, slot: 0, seed: "wheat_seeds".into() });
    app.update();

    assert_eq!(app.world().resource::<Inventory>().quantity_of("wheat_seeds", 0), 4);
    let soil = app.world().get::<GardenSoil>(garden).expect("garden has slots");
    assert!(!soil.slots[0].is_empty());
    assert_eq!(soil.slots[0].time_left(T0), "00:05:00");

    // Too early: nothing happens.
    send(&mut app, HarvestRequest { soil: garden, slot: 0 });
    app.update();
    assert!(harvests.fresh(&app).is_empty());

    app.world_mut().resource_mut::<FarmClock>().now = T0 + 300.0;
    send(&mut app, HarvestRequest { soil: garden, slot: 0 });
    app.update();

    let results = harvests.fresh(&app);
    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.item_id, "wheat");
    assert_eq!(result.quantity, if result.crit { 6 } else { 3 });
    assert_eq!(
        app.world().resource::<Inventory>().quantity_of("wheat", result.quality),
        result.quantity
    );
    let soil = app.world().get::<GardenSoil>(garden).expect("garden has slots");
    assert!(soil.slots[0].is_empty());
}

#[test]
fn test_planting_needs_a_seed_in_stock() {
    let mut app = build_farm_app();
    let garden = placeable_at(&mut app, "garden_soil", 4.0, 4.0);

    send(&mut app, PlantRequest { soil: garden, slot: 1, seed: "pumpkin_seeds".into() });
    send(&mut app, PlantRequest { soil: garden, slot: 2, seed: "wheat".into() });
    app.update();

    let soil = app.world().get::<GardenSoil>(garden).expect("garden has slots");
    assert!(soil.slots[1].is_empty(), "No pumpkin seeds owned");
    assert!(soil.slots[2].is_empty(), "Harvest goods are not seeds");
}
