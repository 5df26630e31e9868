//! Farming domain — garden soils, timed growth, planting and harvest.
//!
//! Communicates with other domains through crate::shared events/resources;
//! harvests go straight into the shared inventory ledger.

use bevy::prelude::*;
use crate::shared::*;

pub mod garden;
pub mod growth;

/// Wall-clock seconds since the Unix epoch. Growth timers read `now` from
/// here instead of the system clock so tests can pin it.
#[derive(Resource, Debug, Clone, Copy)]
pub struct FarmClock {
    pub now: f64,
    /// A paused clock is not advanced by `Time`.
    pub paused: bool,
}

impl Default for FarmClock {
    fn default() -> Self {
        Self {
            now: wall_clock_secs(),
            paused: false,
        }
    }
}

impl FarmClock {
    /// A paused clock fixed at `now`.
    pub fn at(now: f64) -> Self {
        Self { now, paused: true }
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn wall_clock_secs() -> f64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .map_or(0.0, |elapsed| elapsed.as_secs_f64())
}

// No system clock on the web; timers count from page load.
#[cfg(target_arch = "wasm32")]
fn wall_clock_secs() -> f64 {
    0.0
}

pub struct FarmingPlugin;

impl Plugin for FarmingPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<FarmClock>()
            // ------------------------------------------------------------------
            // Clock and garden setup run ahead of the command handlers
            // ------------------------------------------------------------------
            .add_systems(
                Update,
                (advance_farm_clock, garden::attach_garden_slots)
                    .before(FarmSet::Commands)
                    .run_if(in_state(AppState::Playing)),
            )
            // ------------------------------------------------------------------
            // Planting and harvest requests from the garden UI
            // ------------------------------------------------------------------
            .add_systems(
                Update,
                (garden::handle_plant_requests, garden::handle_harvest_requests)
                    .in_set(FarmSet::Commands)
                    .run_if(in_state(AppState::Playing)),
            );
    }
}

fn advance_farm_clock(time: Res<Time>, mut clock: ResMut<FarmClock>) {
    if clock.paused {
        return;
    }
    clock.now += time.delta_secs_f64();
}
