//! Data layer — populates the catalogs, grid, layout and starting stock at
//! game startup.
//!
//! This plugin runs in OnEnter(AppState::Loading), parses the embedded
//! `assets/data/farm.ron`, installs every resource it describes, then
//! transitions the game into AppState::Playing.
//!
//! A broken data file is logged and the game boots with empty catalogs.

use bevy::prelude::*;
use serde::Deserialize;

use crate::economy::inventory::Inventory;
use crate::grid::FarmGrid;
use crate::shared::*;

const FARM_DATA: &str = include_str!("../../assets/data/farm.ron");

#[derive(Debug, Clone, Deserialize)]
pub struct GridConfig {
    pub origin: (f32, f32),
    pub cells_x: u32,
    pub cells_z: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            origin: (0.0, 0.0),
            cells_x: 10,
            cells_z: 10,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct StartingStock {
    pub item: ItemId,
    #[serde(default)]
    pub quality: Quality,
    pub quantity: u32,
}

/// Everything `farm.ron` describes.
#[derive(Debug, Clone, Deserialize)]
pub struct FarmData {
    #[serde(default)]
    pub grid: GridConfig,
    pub gold_id: ItemId,
    pub items: Vec<ItemDef>,
    #[serde(default)]
    pub placeables: Vec<PlaceableDef>,
    #[serde(default)]
    pub layout: Vec<LayoutEntry>,
    #[serde(default)]
    pub shop: Option<ShopFrontDef>,
    #[serde(default)]
    pub starting_inventory: Vec<StartingStock>,
    #[serde(default)]
    pub tuning: FarmTuning,
}

pub fn parse_farm_data(text: &str) -> Result<FarmData, String> {
    ron::from_str(text).map_err(|e| format!("farm data: {e}"))
}

/// Cross-references that the parser cannot check. Each entry is one
/// human-readable problem.
pub fn validate_farm_data(data: &FarmData) -> Vec<String> {
    let known_item = |id: &str| data.items.iter().any(|def| def.id == id);
    let mut problems = Vec::new();

    if !known_item(&data.gold_id) {
        problems.push(format!("gold item '{}' is not defined", data.gold_id));
    }
    for def in data.items.iter().filter(|def| def.is_seed()) {
        match def.yields.as_deref() {
            Some(yields) if known_item(yields) => {}
            Some(yields) => problems.push(format!("seed '{}' yields unknown '{}'", def.id, yields)),
            None => problems.push(format!("seed '{}' yields nothing", def.id)),
        }
    }
    for entry in &data.layout {
        if !data.placeables.iter().any(|def| def.id == entry.placeable) {
            problems.push(format!("layout uses unknown placeable '{}'", entry.placeable));
        }
    }
    for stock in &data.starting_inventory {
        if !known_item(&stock.item) {
            problems.push(format!("starting stock uses unknown item '{}'", stock.item));
        }
    }
    if let Some(shop) = &data.shop {
        for item in shop.stock.iter().filter(|item| !known_item(item)) {
            problems.push(format!("shop sells unknown item '{}'", item));
        }
    }
    problems
}

/// Builds the starting inventory from the catalog. Unknown ids are skipped.
pub fn starting_inventory(data: &FarmData, catalog: &ItemCatalog) -> Inventory {
    let mut inventory = Inventory::new(data.gold_id.clone());
    for stock in &data.starting_inventory {
        if let Some(def) = catalog.get(&stock.item) {
            inventory.add_item(def, stock.quality, stock.quantity);
        }
    }
    inventory
}

pub struct DataPlugin;

impl Plugin for DataPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(OnEnter(AppState::Loading), load_farm_data);
    }
}

fn load_farm_data(mut commands: Commands, mut next_state: ResMut<NextState<AppState>>) {
    info!("[Data] Loading farm data…");

    match parse_farm_data(FARM_DATA) {
        Ok(data) => install_farm_data(&mut commands, data),
        Err(err) => error!("[Data] {}. Starting with empty catalogs.", err),
    }

    next_state.set(AppState::Playing);
}

fn install_farm_data(commands: &mut Commands, data: FarmData) {
    for problem in validate_farm_data(&data) {
        warn!("[Data] {}", problem);
    }

    let mut catalog = ItemCatalog {
        gold_id: data.gold_id.clone(),
        ..default()
    };
    for def in &data.items {
        catalog.insert(def.clone());
    }
    let placeables = PlaceableCatalog {
        defs: data
            .placeables
            .iter()
            .map(|def| (def.id.clone(), def.clone()))
            .collect(),
    };
    let inventory = starting_inventory(&data, &catalog);
    let grid = FarmGrid::new(
        Vec2::new(data.grid.origin.0, data.grid.origin.1),
        data.grid.cells_x,
        data.grid.cells_z,
    );

    info!(
        "[Data] Items: {}, placeables: {}, layout entries: {}, grid {}x{}, starting gold: {}",
        catalog.items.len(),
        placeables.defs.len(),
        data.layout.len(),
        data.grid.cells_x,
        data.grid.cells_z,
        inventory.gold()
    );

    commands.insert_resource(catalog);
    commands.insert_resource(placeables);
    commands.insert_resource(inventory);
    commands.insert_resource(grid);
    commands.insert_resource(FarmLayout {
        entries: data.layout,
        shop: data.shop,
    });
    commands.insert_resource(data.tuning);
}
