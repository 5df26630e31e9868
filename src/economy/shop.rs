use bevy::prelude::*;
use rand::seq::SliceRandom;
use rand::Rng;

use super::gold::{apply_gold_change, EconomyStats};
use super::inventory::Inventory;
use crate::shared::*;

// ─────────────────────────────────────────────────────────────────────────────
// Cart
// ─────────────────────────────────────────────────────────────────────────────

/// Items picked in the shop but not yet paid for. Each entry is one unit.
#[derive(Resource, Debug, Clone, Default)]
pub struct ShopCart {
    items: Vec<ItemId>,
}

impl ShopCart {
    /// Returns false when the cart is full.
    pub fn add_to_cart(&mut self, item: ItemId) -> bool {
        if self.items.len() >= MAX_CART_ITEMS {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn remove_from_cart(&mut self, index: usize) -> Option<ItemId> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    pub fn empty(&mut self) {
        self.items.clear();
    }

    pub fn items(&self) -> &[ItemId] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Sum of the listed prices. Unknown ids count as free.
    pub fn total(&self, catalog: &ItemCatalog) -> u32 {
        self.items
            .iter()
            .filter_map(|id| catalog.get(id))
            .fold(0u32, |total, def| total.saturating_add(def.cost(0)))
    }

    pub fn can_afford(&self, catalog: &ItemCatalog, gold: u32) -> bool {
        self.total(catalog) <= gold
    }
}

pub fn pick_greeting(greetings: &[String], rng: &mut impl Rng) -> String {
    greetings.choose(rng).cloned().unwrap_or_default()
}

// ─────────────────────────────────────────────────────────────────────────────
// Systems
// ─────────────────────────────────────────────────────────────────────────────

/// Gold delta for a purchase of `total`, or `None` if it does not fit.
pub fn purchase_amount(total: u32) -> Option<i32> {
    i32::try_from(total).ok().map(|total| -total)
}

/// Gold delta for selling `quantity` units at `unit_price`, or `None` if it
/// does not fit.
pub fn sale_amount(unit_price: u32, quantity: u32) -> Option<i32> {
    unit_price
        .checked_mul(quantity)
        .and_then(|payout| i32::try_from(payout).ok())
}

/// Shop actions settle gold immediately, so a second purchase in the same
/// frame sees the balance left by the first.
#[allow(clippy::too_many_arguments)]
pub fn handle_shop_commands(
    mut requests: EventReader<ShopCommand>,
    mut cart: ResMut<ShopCart>,
    mut inventory: ResMut<Inventory>,
    mut stats: ResMut<EconomyStats>,
    catalog: Res<ItemCatalog>,
    tuning: Res<FarmTuning>,
    fronts: Query<&ShopFront>,
    mut gold_changed: EventWriter<GoldChangedEvent>,
    mut ui_writer: EventWriter<UiRequest>,
    mut selection_writer: EventWriter<SelectionCommand>,
) {
    for request in requests.read() {
        match request {
            ShopCommand::Open => {
                let greeting = pick_greeting(&tuning.shop_greetings, &mut rand::thread_rng());
                ui_writer.send(UiRequest::OpenShop { greeting });
            }
            ShopCommand::AddToCart(item) => {
                if !fronts.iter().any(|front| front.stock.contains(item)) {
                    warn!("[Economy] '{}' is not sold here", item);
                } else if !cart.add_to_cart(item.clone()) {
                    debug!("[Economy] Cart is full ({} items)", MAX_CART_ITEMS);
                }
            }
            ShopCommand::RemoveFromCart(index) => {
                cart.remove_from_cart(*index);
            }
            ShopCommand::EmptyCart => cart.empty(),
            ShopCommand::Purchase => {
                if cart.is_empty() {
                    continue;
                }
                let total = cart.total(&catalog);
                if !cart.can_afford(&catalog, inventory.gold()) {
                    debug!(
                        "[Economy] Cart costs {}g, only {}g available",
                        total,
                        inventory.gold()
                    );
                    continue;
                }
                let Some(amount) = purchase_amount(total) else {
                    warn!("[Economy] Cart total {}g is out of range", total);
                    continue;
                };
                if !apply_gold_change(&mut inventory, &mut stats, amount, "shop purchase") {
                    continue;
                }
                for id in cart.items() {
                    if let Some(def) = catalog.get(id) {
                        inventory.add_item(def, 0, 1);
                    }
                }
                info!("[Economy] Purchased {} items for {}g", cart.items().len(), total);
                gold_changed.send(GoldChangedEvent {
                    total: inventory.gold(),
                });
                cart.empty();
            }
            ShopCommand::Sell {
                item,
                quality,
                quantity,
            } => {
                let Some(def) = catalog.get(item) else {
                    warn!("[Economy] Cannot sell unknown item '{}'", item);
                    continue;
                };
                let Some(amount) = sale_amount(def.cost(*quality), *quantity) else {
                    warn!("[Economy] Sale of {} '{}' is out of range", quantity, item);
                    continue;
                };
                if !inventory.try_use_item(def, *quantity, *quality) {
                    continue;
                }
                let reason = format!("sold {} {}", quantity, def.name);
                apply_gold_change(&mut inventory, &mut stats, amount, &reason);
                gold_changed.send(GoldChangedEvent {
                    total: inventory.gold(),
                });
            }
            ShopCommand::Exit => {
                cart.empty();
                ui_writer.send(UiRequest::CloseShop);
                selection_writer.send(SelectionCommand::Reset);
            }
        }
    }
}
