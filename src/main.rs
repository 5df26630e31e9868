use bevy::prelude::*;
use bevy::window::{PresentMode, WindowResolution};

use farmstead::input::InputPlugin;
use farmstead::selection::{Picker, TopDownPicker};
use farmstead::FarmPlugins;

const SCREEN_WIDTH: f32 = 720.0;
const SCREEN_HEIGHT: f32 = 1280.0;

/// World units per screen pixel for the top-down camera.
const UNITS_PER_PIXEL: f32 = 1.0 / 32.0;

fn main() {
    App::new()
        .add_plugins(DefaultPlugins.set(WindowPlugin {
            primary_window: Some(Window {
                title: "Farmstead".into(),
                resolution: WindowResolution::new(SCREEN_WIDTH, SCREEN_HEIGHT),
                present_mode: PresentMode::AutoVsync,
                resizable: true,
                ..default()
            }),
            ..default()
        }))
        // Screen (0, 0) is the top-left corner; centre the farm under the camera.
        .insert_resource(Picker::new(TopDownPicker {
            origin: Vec2::new(
                10.0 - SCREEN_WIDTH * UNITS_PER_PIXEL / 2.0,
                10.0 - SCREEN_HEIGHT * UNITS_PER_PIXEL / 2.0,
            ),
            units_per_pixel: UNITS_PER_PIXEL,
        }))
        .add_plugins(FarmPlugins)
        .add_plugins(InputPlugin)
        .add_systems(Startup, setup_camera)
        .run();
}

fn setup_camera(mut commands: Commands) {
    commands.spawn((
        Camera3d::default(),
        Transform::from_xyz(10.0, 30.0, 10.0).looking_at(Vec3::new(10.0, 0.0, 10.0), Vec3::NEG_Z),
    ));
}
