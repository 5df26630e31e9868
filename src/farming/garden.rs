//! Garden soil — a placeable with a row of growth slots.

use bevy::prelude::*;
use rand::Rng;

use super::growth::GardenSoilItem;
use super::FarmClock;
use crate::economy::inventory::Inventory;
use crate::shared::*;

#[derive(Component, Debug, Clone, Default)]
pub struct GardenSoil {
    pub slots: Vec<GardenSoilItem>,
}

impl GardenSoil {
    pub fn new(slot_count: usize) -> Self {
        Self {
            slots: vec![GardenSoilItem::default(); slot_count],
        }
    }
}

/// Gives every newly placed garden its empty slots.
pub fn attach_garden_slots(
    mut commands: Commands,
    placed: Query<(Entity, &Placeable), (Added<Placeable>, Without<GardenSoil>)>,
    catalog: Res<PlaceableCatalog>,
) {
    for (entity, placeable) in &placed {
        let Some(slots) = catalog.get(&placeable.def_id).and_then(|def| def.garden_slots) else {
            continue;
        };
        commands.entity(entity).insert(GardenSoil::new(slots));
        debug!("[Farming] {:?} is a garden with {} slots", entity, slots);
    }
}

/// Plants one seed from the inventory into an empty slot.
pub fn handle_plant_requests(
    mut requests: EventReader<PlantRequest>,
    mut soils: Query<&mut GardenSoil>,
    catalog: Res<ItemCatalog>,
    mut inventory: ResMut<Inventory>,
    clock: Res<FarmClock>,
) {
    for request in requests.read() {
        let Ok(mut soil) = soils.get_mut(request.soil) else {
            warn!("[Farming] Plant request for {:?}, which is not a garden", request.soil);
            continue;
        };
        let Some(slot) = soil.slots.get_mut(request.slot) else {
            warn!("[Farming] Garden {:?} has no slot {}", request.soil, request.slot);
            continue;
        };
        if !slot.is_empty() {
            warn!("[Farming] Slot {} of {:?} is already growing", request.slot, request.soil);
            continue;
        }
        let Some(def) = catalog.get(&request.seed) else {
            warn!("[Farming] Unknown seed '{}'", request.seed);
            continue;
        };
        if inventory.quantity_of(&def.id, 0) == 0 {
            warn!("[Farming] No '{}' left to plant", def.id);
            continue;
        }
        if slot.plant_seeds(def, clock.now) {
            inventory.try_use_item(def, 1, 0);
            info!(
                "[Farming] Planted {} in slot {}, ready in {}",
                def.name,
                request.slot,
                slot.time_left(clock.now)
            );
        }
    }
}

pub fn handle_harvest_requests(
    mut requests: EventReader<HarvestRequest>,
    mut soils: Query<&mut GardenSoil>,
    catalog: Res<ItemCatalog>,
    tuning: Res<FarmTuning>,
    mut inventory: ResMut<Inventory>,
    clock: Res<FarmClock>,
    mut results: EventWriter<HarvestResultEvent>,
) {
    let mut rng = rand::thread_rng();
    for request in requests.read() {
        let Ok(mut soil) = soils.get_mut(request.soil) else {
            warn!("[Farming] Harvest request for {:?}, which is not a garden", request.soil);
            continue;
        };
        let Some(slot) = soil.slots.get_mut(request.slot) else {
            warn!("[Farming] Garden {:?} has no slot {}", request.soil, request.slot);
            continue;
        };
        if let Some(result) =
            harvest_slot(slot, clock.now, &catalog, &tuning, &mut inventory, &mut rng)
        {
            results.send(result);
        }
    }
}

/// Harvests a ripe slot into the inventory. The base yield doubles on a
/// crit roll and the quality is rolled uniformly over 0..=100.
pub fn harvest_slot(
    slot: &mut GardenSoilItem,
    now: f64,
    catalog: &ItemCatalog,
    tuning: &FarmTuning,
    inventory: &mut Inventory,
    rng: &mut impl Rng,
) -> Option<HarvestResultEvent> {
    if slot.is_empty() {
        debug!("[Farming] Nothing is growing in this slot");
        return None;
    }
    if !slot.can_be_harvested(now) {
        debug!("[Farming] Cannot be harvested yet ({})", slot.time_left(now));
        return None;
    }
    let yield_def = slot
        .seed
        .as_deref()
        .and_then(|seed| catalog.get(seed))
        .and_then(|seed| seed.yields.as_deref())
        .and_then(|id| catalog.get(id));
    let Some(yield_def) = yield_def else {
        warn!("[Farming] Seed {:?} has no harvest item", slot.seed);
        return None;
    };

    slot.harvest(now, None);

    let crit = rng.gen_range(0..99) < tuning.garden_crit_chance;
    let quantity = if crit {
        tuning.harvest_yield * 2
    } else {
        tuning.harvest_yield
    };
    let quality = rng.gen_range(0..=MAX_QUALITY);
    inventory.add_item(yield_def, quality, quantity);

    info!(
        "[Farming] Harvested {} {} of quality {}{}",
        quantity,
        yield_def.name,
        quality,
        if crit { " (crit!)" } else { "" }
    );
    Some(HarvestResultEvent {
        item_id: yield_def.id.clone(),
        quality,
        quantity,
        crit,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn catalog() -> ItemCatalog {
        let mut catalog = ItemCatalog::default();
        catalog.insert(ItemDef {
            id: "carrot_seeds".into(),
            name: "Carrot Seeds".into(),
            description: String::new(),
            category: ItemCategory::Seeds,
            price: 10,
            premium_price: 0,
            growth_secs: 100,
            yields: Some("carrot".into()),
        });
        catalog.insert(ItemDef {
            id: "carrot".into(),
            name: "Carrot".into(),
            description: String::new(),
            category: ItemCategory::Harvest,
            price: 20,
            premium_price: 60,
            growth_secs: 0,
            yields: None,
        });
        catalog
    }

    fn planted(catalog: &ItemCatalog) -> GardenSoilItem {
        let mut slot = GardenSoilItem::default();
        let seeds = catalog.get("carrot_seeds").cloned().unwrap_or_else(|| panic!("seed"));
        assert!(slot.plant_seeds(&seeds, 0.0));
        slot
    }

    #[test]
    fn test_harvest_adds_yield() {
        let catalog = catalog();
        let tuning = FarmTuning::default();
        let mut inventory = Inventory::default();
        let mut slot = planted(&catalog);
        let mut rng = StdRng::seed_from_u64(42);

        let result = harvest_slot(&mut slot, 100.0, &catalog, &tuning, &mut inventory, &mut rng)
            .expect("ripe slot harvests");
        assert_eq!(result.item_id, "carrot");
        assert!(result.quality <= MAX_QUALITY);
        let expected = if result.crit { 6 } else { 3 };
        assert_eq!(result.quantity, expected);
        assert_eq!(inventory.quantity_of("carrot", result.quality), expected);
        assert!(slot.is_empty());
    }

    #[test]
    fn test_guaranteed_crit_doubles_yield() {
        let catalog = catalog();
        let tuning = FarmTuning {
            garden_crit_chance: 100,
            ..default()
        };
        let mut inventory = Inventory::default();
        let mut slot = planted(&catalog);
        let mut rng = StdRng::seed_from_u64(1);
        let result = harvest_slot(&mut slot, 150.0, &catalog, &tuning, &mut inventory, &mut rng)
            .expect("ripe slot harvests");
        assert!(result.crit);
        assert_eq!(result.quantity, 6);
    }

    #[test]
    fn test_unripe_or_empty_slot_yields_nothing() {
        let catalog = catalog();
        let tuning = FarmTuning::default();
        let mut inventory = Inventory::default();
        let mut rng = StdRng::seed_from_u64(3);

        let mut slot = planted(&catalog);
        assert!(harvest_slot(&mut slot, 99.0, &catalog, &tuning, &mut inventory, &mut rng).is_none());
        assert!(!slot.is_empty());

        let mut empty = GardenSoilItem::default();
        assert!(harvest_slot(&mut empty, 500.0, &catalog, &tuning, &mut inventory, &mut rng).is_none());
        assert_eq!(inventory.all_items().count(), 0);
    }
}
