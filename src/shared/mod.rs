//! Shared components, resources, events, and states for Farmstead.
//!
//! This is the type contract. Every domain plugin imports from here.
//! No domain imports from any other domain directly, except for the grid
//! and the inventory ledger, which several domains mutate in place.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::economy::inventory::Inventory;
use crate::grid::FarmGrid;

// ═══════════════════════════════════════════════════════════════════════
// APP STATE — boot sequencing
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, States, Default)]
pub enum AppState {
    #[default]
    Loading,
    Playing,
}

/// Per-frame ordering of the farm systems. Gestures are decoded first, the
/// selection machine arbitrates them, object/economy commands are applied,
/// then reactions and visual mirrors run.
#[derive(SystemSet, Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FarmSet {
    Input,
    Selection,
    Commands,
    Reactions,
    Sync,
}

// ═══════════════════════════════════════════════════════════════════════
// ITEMS
// ═══════════════════════════════════════════════════════════════════════

/// Unique identifier for every item type in the game.
pub type ItemId = String;

/// Quality scalar, 0–100. Only harvest goods carry it.
pub type Quality = u8;

pub const MAX_QUALITY: Quality = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Gold,
    Harvest,
    Seeds,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemDef {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub category: ItemCategory,
    /// Buy price, or the sell price at quality 0 for harvest goods.
    #[serde(default)]
    pub price: u32,
    /// Sell price at quality 100. Ignored for items without quality.
    #[serde(default)]
    pub premium_price: u32,
    /// Seconds from planting until harvest (seeds only).
    #[serde(default)]
    pub growth_secs: u32,
    /// Harvest item a seed grows into.
    #[serde(default)]
    pub yields: Option<ItemId>,
}

impl ItemDef {
    pub fn has_quality(&self) -> bool {
        self.category == ItemCategory::Harvest
    }

    pub fn is_seed(&self) -> bool {
        self.category == ItemCategory::Seeds
    }

    /// Value of one unit at the given quality. Quality goods scale linearly
    /// from `price` at 0 to `premium_price` at 100, rounding down.
    pub fn cost(&self, quality: Quality) -> u32 {
        if !self.has_quality() {
            return self.price;
        }
        let scale = quality.min(MAX_QUALITY) as f64 / MAX_QUALITY as f64;
        let difference = self.premium_price as i64 - self.price as i64;
        let addition = (scale * difference as f64).floor() as i64;
        (self.price as i64 + addition).max(0) as u32
    }
}

/// One stock entry of an item type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InventoryItem {
    pub quality: Quality,
    pub quantity: u32,
}

impl InventoryItem {
    pub fn new(quality: Quality, quantity: u32) -> Self {
        Self { quality, quantity }
    }
}

#[derive(Resource, Debug, Clone, Default)]
pub struct ItemCatalog {
    pub items: HashMap<ItemId, ItemDef>,
    /// The distinguished gold item.
    pub gold_id: ItemId,
}

impl ItemCatalog {
    pub fn get(&self, id: &str) -> Option<&ItemDef> {
        self.items.get(id)
    }

    pub fn gold(&self) -> Option<&ItemDef> {
        self.items.get(&self.gold_id)
    }

    pub fn insert(&mut self, def: ItemDef) {
        self.items.insert(def.id.clone(), def);
    }
}

// ═══════════════════════════════════════════════════════════════════════
// PLACEABLES — catalog and world layout
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaceableDef {
    pub id: String,
    /// Display metadata handed to the select panel.
    pub title: String,
    /// Footprint offsets in world units, relative to the placement offset.
    pub footprint: Vec<(i32, i32)>,
    #[serde(default)]
    pub placement_offset: (i32, i32),
    /// Half-size of the pick rectangle on the floor plane.
    pub pick_half_extents: (f32, f32),
    /// Height of the menu anchor above the object's anchor.
    #[serde(default)]
    pub midpoint_height: f32,
    /// Growth slots when the object is a garden soil.
    #[serde(default)]
    pub garden_slots: Option<usize>,
}

#[derive(Resource, Debug, Clone, Default)]
pub struct PlaceableCatalog {
    pub defs: HashMap<String, PlaceableDef>,
}

impl PlaceableCatalog {
    pub fn get(&self, id: &str) -> Option<&PlaceableDef> {
        self.defs.get(id)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LayoutEntry {
    pub placeable: String,
    /// World (x, z) of the anchor.
    pub anchor: (f32, f32),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopFrontDef {
    pub anchor: (f32, f32),
    pub pick_half_extents: (f32, f32),
    /// Items listed for sale.
    pub stock: Vec<ItemId>,
}

/// Objects placed when the world is set up.
#[derive(Resource, Debug, Clone, Default)]
pub struct FarmLayout {
    pub entries: Vec<LayoutEntry>,
    pub shop: Option<ShopFrontDef>,
}

// ═══════════════════════════════════════════════════════════════════════
// TUNING
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FarmTuning {
    /// Percent chance (0–99 roll) that a garden harvest doubles its yield.
    pub garden_crit_chance: u32,
    pub harvest_yield: u32,
    /// Pixels the pointer must travel before a pan counts as a drag.
    pub min_drag_distance: f32,
    /// Screen-space y multiplier applied to camera drag deltas.
    pub drag_vertical_factor: f32,
    pub zoom_speed: f32,
    pub long_press_secs: f32,
    /// Pixels a contact may wander and still count as a tap.
    pub tap_slop: f32,
    pub shop_greetings: Vec<String>,
}

impl Default for FarmTuning {
    fn default() -> Self {
        Self {
            garden_crit_chance: 10,
            harvest_yield: 3,
            min_drag_distance: 20.0,
            drag_vertical_factor: 1.2,
            zoom_speed: 0.02,
            long_press_secs: 0.5,
            tap_slop: 12.0,
            shop_greetings: vec!["Welcome! Take a look around.".to_string()],
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════
// WORLD OBJECT COMPONENTS
// ═══════════════════════════════════════════════════════════════════════

/// A farm object that occupies grid cells. Its anchor is the entity's
/// `Transform` translation.
#[derive(Component, Debug, Clone)]
pub struct Placeable {
    pub def_id: String,
    pub footprint: Vec<IVec2>,
    pub placement_offset: IVec2,
}

impl Placeable {
    /// Absolute grid cells for the given anchor.
    pub fn cells_at(&self, anchor: Vec3) -> Vec<IVec2> {
        self.footprint
            .iter()
            .map(|offset| cell_for(anchor, self.placement_offset + *offset))
            .collect()
    }

    /// Centre of the footprint's bounding rectangle relative to the anchor.
    /// Each cell spans `CELL_SIZE` units from its address.
    pub fn footprint_centre(&self) -> Vec2 {
        let mut offsets = self
            .footprint
            .iter()
            .map(|offset| (self.placement_offset + *offset).as_vec2());
        let Some(first) = offsets.next() else {
            return Vec2::ZERO;
        };
        let (min, max) = offsets.fold((first, first), |(min, max), o| (min.min(o), max.max(o)));
        (min + max) / 2.0 + Vec2::splat(CELL_SIZE as f32 / 2.0)
    }

    /// Registers (or frees) every footprint cell at `anchor`. Cells outside
    /// the grid are skipped by the grid itself.
    pub fn set_occupied(&self, anchor: Vec3, grid: &mut FarmGrid, occupied: bool) {
        for cell in self.cells_at(anchor) {
            grid.try_set_occupied(cell, occupied);
        }
    }
}

/// Nearest-integer cell of `anchor + offset` on the floor plane.
pub fn cell_for(anchor: Vec3, offset: IVec2) -> IVec2 {
    IVec2::new(
        (anchor.x + offset.x as f32).round() as i32,
        (anchor.z + offset.y as f32).round() as i32,
    )
}

/// Lifecycle of a placeable with respect to selection and moving.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PlacementPhase {
    #[default]
    Idle,
    Selected,
    HoldMenuOpen,
    Moving,
}

/// Material state the renderer mirrors.
#[derive(Component, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ObjectTint {
    #[default]
    Normal,
    Selector,
    InvalidSelector,
}

/// Capability: the object can be tapped / held.
#[derive(Component, Debug, Clone)]
pub struct Selectable {
    pub title: String,
}

/// Capability: tapping opens the shop.
#[derive(Component, Debug, Clone)]
pub struct ShopFront {
    pub stock: Vec<ItemId>,
}

/// Floor-plane rectangle used for hit testing.
#[derive(Component, Debug, Clone, Copy)]
pub struct PickBounds {
    /// Centre of the rectangle relative to the anchor, as world (x, z).
    pub offset: Vec2,
    pub half_extents: Vec2,
    /// Height of the midpoint menus and confirm buttons follow.
    pub midpoint_height: f32,
}

impl PickBounds {
    pub fn centre(&self, anchor: Vec3) -> Vec3 {
        anchor + Vec3::new(self.offset.x, 0.0, self.offset.y)
    }

    pub fn contains(&self, anchor: Vec3, point: Vec3) -> bool {
        let centre = self.centre(anchor);
        (point.x - centre.x).abs() <= self.half_extents.x
            && (point.z - centre.z).abs() <= self.half_extents.y
    }

    pub fn midpoint(&self, anchor: Vec3) -> Vec3 {
        self.centre(anchor) + Vec3::Y * self.midpoint_height
    }
}

// ═══════════════════════════════════════════════════════════════════════
// POINTER — engine-provided snapshot
// ═══════════════════════════════════════════════════════════════════════

#[derive(Resource, Debug, Clone, Default)]
pub struct TouchPointer {
    /// Screen position of the primary contact, in pixels.
    pub position: Vec2,
    /// Distance between the first two contacts.
    pub pinch_distance: f32,
    pub contacts: u8,
    /// The UI layout of this frame captures the pointer.
    pub over_ui: bool,
}

// ═══════════════════════════════════════════════════════════════════════
// EVENTS — cross-domain communication
// ═══════════════════════════════════════════════════════════════════════

/// Edge-triggered gestures decoded from touch/mouse contacts.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureEvent {
    DragStart,
    DragEnd,
    PinchStart,
    PinchEnd,
    Tap,
    LongPress,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HoldChoice {
    Move,
    Rotate,
    Delete,
}

/// Requests against a single placeable.
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum ObjectCommand {
    Select(Entity),
    EndSelect(Entity),
    SelectHold(Entity),
    EndSelectHold(Entity),
    /// A choice picked from the hold menu.
    Choose(Entity, HoldChoice),
    /// Drag update for the object being moved. `first` only records the
    /// offset between the touched point and the anchor.
    Drag { entity: Entity, point: Vec3, first: bool },
    Confirm(Entity),
    Cancel(Entity),
}

impl ObjectCommand {
    pub fn entity(&self) -> Entity {
        match *self {
            ObjectCommand::Select(entity)
            | ObjectCommand::EndSelect(entity)
            | ObjectCommand::SelectHold(entity)
            | ObjectCommand::EndSelectHold(entity)
            | ObjectCommand::Choose(entity, _)
            | ObjectCommand::Drag { entity, .. }
            | ObjectCommand::Confirm(entity)
            | ObjectCommand::Cancel(entity) => entity,
        }
    }
}

/// Requests the UI sends to the selection machine.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionCommand {
    EndSelect,
    EndSelectHold,
    Reset,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct MoveStarted {
    pub entity: Entity,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct MoveEnded {
    pub entity: Entity,
    pub confirmed: bool,
}

/// Changes the grid's cell counts. Refused while an object is moving.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridResizeRequest {
    pub cells_x: u32,
    pub cells_z: u32,
}

/// Object-level validity flip during a move.
#[derive(Event, Debug, Clone, Copy)]
pub struct PlacementValidityChanged {
    pub entity: Entity,
    pub placeable: bool,
}

#[derive(Event, Debug, Clone)]
pub struct GoldChangeRequest {
    pub amount: i32, // positive = gain, negative = spend
    pub reason: String,
}

/// Fired after every gold adjustment with the freshly queried total.
#[derive(Event, Debug, Clone, Copy, PartialEq, Eq)]
pub struct GoldChangedEvent {
    pub total: u32,
}

#[derive(Event, Debug, Clone)]
pub struct PlantRequest {
    pub soil: Entity,
    pub slot: usize,
    pub seed: ItemId,
}

#[derive(Event, Debug, Clone, Copy)]
pub struct HarvestRequest {
    pub soil: Entity,
    pub slot: usize,
}

#[derive(Event, Debug, Clone)]
pub struct HarvestResultEvent {
    pub item_id: ItemId,
    pub quality: Quality,
    pub quantity: u32,
    pub crit: bool,
}

/// Shop panel actions. `Open` comes from the selection machine, the rest
/// from the shop UI.
#[derive(Event, Debug, Clone, PartialEq, Eq)]
pub enum ShopCommand {
    Open,
    AddToCart(ItemId),
    RemoveFromCart(usize),
    EmptyCart,
    Purchase,
    Sell {
        item: ItemId,
        quality: Quality,
        quantity: u32,
    },
    Exit,
}

/// Requests for the camera rig (external).
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub enum CameraRequest {
    FrameObject { center: Vec3, half_extents: Vec2 },
    ZoomOut,
    StartDrag,
    Drag { delta: Vec2 },
    StartPinch,
    Zoom { offset: f32 },
    EdgePan { screen: Vec2 },
}

/// Requests for transient UI surfaces (external).
#[derive(Event, Debug, Clone, PartialEq)]
pub enum UiRequest {
    OpenSelectPanel { entity: Entity, title: String },
    CloseSelectPanel { entity: Entity },
    OpenHoldMenu { entity: Entity, anchor: Vec3 },
    CloseHoldMenu { entity: Entity },
    ShowConfirmCancel { entity: Entity, anchor: Vec3 },
    HideConfirmCancel { entity: Entity },
    OpenShop { greeting: String },
    CloseShop,
}

// ═══════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════

/// World units per grid cell edge.
pub const CELL_SIZE: i32 = 2;

pub const MAX_CART_ITEMS: usize = 8;

pub const READY_TO_HARVEST: &str = "Ready to Harvest!";

// ═══════════════════════════════════════════════════════════════════════
// REGISTRATION
// ═══════════════════════════════════════════════════════════════════════

/// Registers the shared state, resources, events and set ordering. Domain
/// plugins assume this has been added first.
pub struct SharedPlugin;

impl Plugin for SharedPlugin {
    fn build(&self, app: &mut App) {
        app.init_state::<AppState>()
            // Shared resources
            .init_resource::<ItemCatalog>()
            .init_resource::<PlaceableCatalog>()
            .init_resource::<FarmLayout>()
            .init_resource::<FarmTuning>()
            .init_resource::<FarmGrid>()
            .init_resource::<Inventory>()
            .init_resource::<TouchPointer>()
            // Events
            .add_event::<GestureEvent>()
            .add_event::<ObjectCommand>()
            .add_event::<SelectionCommand>()
            .add_event::<MoveStarted>()
            .add_event::<MoveEnded>()
            .add_event::<PlacementValidityChanged>()
            .add_event::<GridResizeRequest>()
            .add_event::<GoldChangeRequest>()
            .add_event::<GoldChangedEvent>()
            .add_event::<PlantRequest>()
            .add_event::<HarvestRequest>()
            .add_event::<HarvestResultEvent>()
            .add_event::<ShopCommand>()
            .add_event::<CameraRequest>()
            .add_event::<UiRequest>()
            .configure_sets(
                Update,
                (
                    FarmSet::Input,
                    FarmSet::Selection,
                    FarmSet::Commands,
                    FarmSet::Reactions,
                    FarmSet::Sync,
                )
                    .chain(),
            );
    }
}
