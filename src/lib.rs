//! Farmstead library crate — re-exports all modules for integration testing.
//!
//! The binary crate (`main.rs`) is the actual game entry point.
//! This library crate exposes the same modules so that `tests/` integration
//! tests can drive the farm headlessly, without a window or GPU.

pub mod shared;
pub mod grid;
pub mod placement;
pub mod farming;
pub mod economy;
pub mod selection;
pub mod input;
pub mod data;

use bevy::prelude::*;

/// Every gameplay plugin except input, which needs a window.
pub struct FarmPlugins;

impl Plugin for FarmPlugins {
    fn build(&self, app: &mut App) {
        app.add_plugins((
            shared::SharedPlugin,
            data::DataPlugin,
            placement::PlacementPlugin,
            farming::FarmingPlugin,
            economy::EconomyPlugin,
            selection::SelectionPlugin,
        ));
    }
}
