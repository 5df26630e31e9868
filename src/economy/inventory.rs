//! Stock ledger keyed by item id, then by quality.

use bevy::prelude::*;
use std::collections::BTreeMap;

use crate::shared::*;

/// The player's stock. Every id present has at least one entry and every
/// entry has a positive quantity.
#[derive(Resource, Debug, Clone)]
pub struct Inventory {
    ledger: BTreeMap<ItemId, Vec<InventoryItem>>,
    gold_id: ItemId,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new("gold")
    }
}

impl Inventory {
    pub fn new(gold_id: impl Into<ItemId>) -> Self {
        Self {
            ledger: BTreeMap::new(),
            gold_id: gold_id.into(),
        }
    }

    pub fn gold_id(&self) -> &str {
        &self.gold_id
    }

    /// Adds stock. Items without quality always merge into their quality-0
    /// entry; quality goods merge into an exact quality match or get a new
    /// entry.
    pub fn add_item(&mut self, def: &ItemDef, quality: Quality, quantity: u32) {
        self.add_stock(&def.id, def.has_quality(), quality, quantity);
    }

    fn add_stock(&mut self, id: &str, has_quality: bool, quality: Quality, quantity: u32) {
        if quantity == 0 {
            return;
        }
        let quality = if has_quality { quality.min(MAX_QUALITY) } else { 0 };
        let entries = self.ledger.entry(id.to_string()).or_default();
        match entries.iter_mut().find(|e| e.quality == quality) {
            Some(entry) => entry.quantity = entry.quantity.saturating_add(quantity),
            None => entries.push(InventoryItem::new(quality, quantity)),
        }
    }

    /// Consumes `quantity` of the given quality. Fails without any change if
    /// the id or quality is not held, or if fewer than `quantity` are held.
    pub fn try_use_item(&mut self, def: &ItemDef, quantity: u32, quality: Quality) -> bool {
        self.use_stock(&def.id, def.has_quality(), quantity, quality)
    }

    fn use_stock(&mut self, id: &str, has_quality: bool, quantity: u32, quality: Quality) -> bool {
        let quality = if has_quality { quality } else { 0 };
        let Some(entries) = self.ledger.get_mut(id) else {
            debug!("[Inventory] Trying to use '{}', but none is owned", id);
            return false;
        };
        let Some(index) = entries.iter().position(|e| e.quality == quality) else {
            debug!(
                "[Inventory] Trying to use '{}' of quality {}, but none is owned",
                id, quality
            );
            return false;
        };
        if entries[index].quantity < quantity {
            warn!(
                "[Inventory] Trying to use {} '{}', but only {} owned",
                quantity, id, entries[index].quantity
            );
            return false;
        }

        entries[index].quantity -= quantity;
        if entries[index].quantity == 0 {
            entries.remove(index);
        }
        if entries.is_empty() {
            self.ledger.remove(id);
        }
        true
    }

    /// Entries held for `id`, in insertion order.
    pub fn entries(&self, id: &str) -> &[InventoryItem] {
        self.ledger.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.ledger.contains_key(id)
    }

    pub fn quantity_of(&self, id: &str, quality: Quality) -> u32 {
        self.entries(id)
            .iter()
            .find(|e| e.quality == quality)
            .map_or(0, |e| e.quantity)
    }

    /// Every (id, entry) pair in the ledger.
    pub fn all_items(&self) -> impl Iterator<Item = (&ItemId, &InventoryItem)> + '_ {
        self.ledger
            .iter()
            .flat_map(|(id, entries)| entries.iter().map(move |entry| (id, entry)))
    }

    /// Entries whose item belongs to `category`. Ids missing from the
    /// catalog are skipped.
    pub fn filter_by_category<'a>(
        &'a self,
        catalog: &'a ItemCatalog,
        category: ItemCategory,
    ) -> Vec<(&'a ItemDef, InventoryItem)> {
        self.all_items()
            .filter_map(|(id, entry)| catalog.get(id).map(|def| (def, *entry)))
            .filter(|(def, _)| def.category == category)
            .collect()
    }

    pub fn gold(&self) -> u32 {
        self.quantity_of(&self.gold_id, 0)
    }

    /// Adds (positive) or spends (negative) gold and returns the new
    /// balance. A spend larger than the balance is refused.
    pub fn change_gold(&mut self, amount: i32) -> u32 {
        let gold_id = self.gold_id.clone();
        if amount > 0 {
            self.add_stock(&gold_id, false, 0, amount.unsigned_abs());
        } else if amount < 0 {
            self.use_stock(&gold_id, false, amount.unsigned_abs(), 0);
        }
        self.gold()
    }
}
