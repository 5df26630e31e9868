//! Growth timer for one garden slot.
//!
//! All queries take `now` (seconds since the Unix epoch, see `FarmClock`) so
//! the timer stays deterministic.

use bevy::prelude::*;

use crate::shared::*;

#[derive(Debug, Clone, PartialEq)]
pub struct GardenSoilItem {
    pub seed: Option<ItemId>,
    pub start: f64,
    pub end: f64,
    pub harvested: bool,
    /// UI entity currently showing this slot, if the select panel is open.
    pub display: Option<Entity>,
}

impl Default for GardenSoilItem {
    /// An empty slot.
    fn default() -> Self {
        Self {
            seed: None,
            start: 0.0,
            end: 0.0,
            harvested: true,
            display: None,
        }
    }
}

impl GardenSoilItem {
    /// Starts growing `seed`. Non-seed items are refused and the slot is
    /// left as it was.
    pub fn plant_seeds(&mut self, seed: &ItemDef, now: f64) -> bool {
        if !seed.is_seed() {
            error!("[Farming] Tried to plant non-seed item '{}'", seed.id);
            return false;
        }
        self.seed = Some(seed.id.clone());
        self.start = now;
        self.end = now + seed.growth_secs as f64;
        self.harvested = false;
        true
    }

    pub fn is_empty(&self) -> bool {
        self.harvested
    }

    pub fn can_be_harvested(&self, now: f64) -> bool {
        now >= self.end
    }

    /// Remaining time as `HH:MM:SS`, or the ready sentinel.
    pub fn time_left(&self, now: f64) -> String {
        if self.can_be_harvested(now) {
            return READY_TO_HARVEST.to_string();
        }
        let remaining = (self.end - now).max(0.0) as u64;
        format!(
            "{:02}:{:02}:{:02}",
            remaining / 3600,
            (remaining / 60) % 60,
            remaining % 60
        )
    }

    /// Fraction of the growth duration that has elapsed, in [0, 1].
    pub fn percentage_complete(&self, now: f64) -> f32 {
        let total = self.end - self.start;
        if self.can_be_harvested(now) || total <= 0.0 {
            return 1.0;
        }
        let left = self.end - now;
        (1.0 - left / total).clamp(0.0, 1.0) as f32
    }

    /// Marks the slot harvested and swaps in the new display link. Refused
    /// before the end time.
    pub fn harvest(&mut self, now: f64, display: Option<Entity>) -> bool {
        if !self.can_be_harvested(now) {
            error!(
                "[Farming] Tried to harvest {:?} before it is ready ({})",
                self.seed,
                self.time_left(now)
            );
            return false;
        }
        self.harvested = true;
        self.display = display;
        true
    }
}
