use bevy::prelude::*;

use super::inventory::Inventory;
use crate::shared::*;

/// Running totals of gold flow for the session.
#[derive(Resource, Debug, Clone, Default)]
pub struct EconomyStats {
    pub total_gold_earned: u64,
    pub total_gold_spent: u64,
    pub total_transactions: u64,
    /// Spends refused because the balance was too low.
    pub rejected_spends: u64,
}

/// Applies one gold change to the ledger and the session totals. Returns
/// false when a spend was refused because the balance was too low.
pub fn apply_gold_change(
    inventory: &mut Inventory,
    stats: &mut EconomyStats,
    amount: i32,
    reason: &str,
) -> bool {
    let before = inventory.gold();
    let total = inventory.change_gold(amount);
    stats.total_transactions += 1;

    if amount >= 0 {
        stats.total_gold_earned = stats
            .total_gold_earned
            .saturating_add(amount.unsigned_abs() as u64);
        info!(
            "[Economy] Gold +{}: {}. New balance: {}",
            amount,
            reason,
            format_gold(total)
        );
        true
    } else if total < before {
        stats.total_gold_spent = stats
            .total_gold_spent
            .saturating_add((before - total) as u64);
        info!(
            "[Economy] Gold -{}: {}. New balance: {}",
            amount.unsigned_abs(),
            reason,
            format_gold(total)
        );
        true
    } else {
        stats.rejected_spends += 1;
        warn!(
            "[Economy] Tried to spend {}g but only have {} (reason: {})",
            amount.unsigned_abs(),
            format_gold(before),
            reason
        );
        false
    }
}

/// Applies GoldChangeRequests to the inventory's gold entry.
/// Every request is followed by a GoldChangedEvent carrying the balance read
/// back from the ledger, including refused spends.
pub fn apply_gold_changes(
    mut requests: EventReader<GoldChangeRequest>,
    mut inventory: ResMut<Inventory>,
    mut stats: ResMut<EconomyStats>,
    mut changed: EventWriter<GoldChangedEvent>,
) {
    for ev in requests.read() {
        apply_gold_change(&mut inventory, &mut stats, ev.amount, &ev.reason);
        changed.send(GoldChangedEvent {
            total: inventory.gold(),
        });
    }
}

/// Format a gold amount as a display string (e.g. "1,234g").
pub fn format_gold(amount: u32) -> String {
    let digits = amount.to_string();
    let mut result = String::with_capacity(digits.len() + 4);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            result.push(',');
        }
        result.push(ch);
    }
    result.push('g');
    result
}
