//! Economy domain — inventory ledger, gold, and the shop cart.
//!
//! All cross-domain communication goes through `crate::shared::*` events and resources.

use bevy::prelude::*;
use crate::shared::*;

pub mod gold;
pub mod inventory;
pub mod shop;

use gold::{apply_gold_changes, EconomyStats};
use shop::{handle_shop_commands, ShopCart};

// ─────────────────────────────────────────────────────────────────────────────
// Plugin
// ─────────────────────────────────────────────────────────────────────────────

pub struct EconomyPlugin;

impl Plugin for EconomyPlugin {
    fn build(&self, app: &mut App) {
        // ── Resources ──────────────────────────────────────────────────────
        app.init_resource::<EconomyStats>()
            .init_resource::<ShopCart>();

        // ── Systems ────────────────────────────────────────────────────────
        app.add_systems(
            Update,
            (
                // Shop UI and selection machine requests.
                handle_shop_commands.in_set(FarmSet::Commands),
                // Gold requests can come from the shop or any other domain.
                apply_gold_changes.in_set(FarmSet::Reactions),
            )
                .run_if(in_state(AppState::Playing)),
        );

        info!("[Economy] EconomyPlugin registered.");
    }
}
