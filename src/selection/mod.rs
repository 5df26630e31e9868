//! Selection domain — decides whether a gesture pans the camera, zooms,
//! drags the object being moved, selects, opens the hold menu or the shop.

use bevy::prelude::*;
use crate::shared::*;

pub mod machine;
pub mod picking;

pub use machine::{Outbox, SelectionMachine, SelectionMode};
pub use picking::{nearest_hit, PickHit, Picker, TopDownPicker, WorldPicker};

pub struct SelectionPlugin;

impl Plugin for SelectionPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<SelectionMachine>();
        // The engine side may install its own picker before this plugin.
        if !app.world().contains_resource::<Picker>() {
            app.insert_resource(Picker::new(TopDownPicker::default()));
        }
        app.add_systems(
            Update,
            run_selection
                .in_set(FarmSet::Selection)
                .run_if(in_state(AppState::Playing)),
        );
    }
}

type Pickables<'w, 's> = Query<
    'w,
    's,
    (
        Entity,
        &'static Transform,
        &'static PickBounds,
        Has<Selectable>,
        Has<ShopFront>,
    ),
>;

/// One tick of the selection machine: last tick's pending starts, move and
/// UI notifications, this tick's gestures, then the active mode.
#[allow(clippy::too_many_arguments)]
pub fn run_selection(
    mut machine: ResMut<SelectionMachine>,
    mut gestures: EventReader<GestureEvent>,
    mut ui_commands: EventReader<SelectionCommand>,
    mut started: EventReader<MoveStarted>,
    mut ended: EventReader<MoveEnded>,
    pointer: Res<TouchPointer>,
    tuning: Res<FarmTuning>,
    picker: Res<Picker>,
    pickables: Pickables,
    mut object_writer: EventWriter<ObjectCommand>,
    mut camera_writer: EventWriter<CameraRequest>,
    mut shop_writer: EventWriter<ShopCommand>,
) {
    let mut out = Outbox::default();

    machine.consume_pending(&pointer, &mut out);

    for ev in started.read() {
        machine.on_move_started(ev.entity);
    }
    for ev in ended.read() {
        machine.on_move_ended(ev.entity);
    }
    for command in ui_commands.read() {
        machine.on_command(*command, &mut out);
    }

    let floor_point = picker.floor_point(pointer.position);
    let mut hit = None;
    let mut hit_tested = false;
    for gesture in gestures.read() {
        if !hit_tested {
            hit = floor_point.and_then(|point| {
                nearest_hit(
                    point,
                    pickables.iter().map(|(entity, transform, bounds, selectable, shop)| {
                        (entity, transform.translation, bounds, selectable, shop)
                    }),
                )
            });
            hit_tested = true;
        }
        let before = machine.mode();
        machine.on_gesture(*gesture, hit, &pointer, &mut out);
        if machine.mode() != before {
            debug!("[Selection] {:?}: {:?} -> {:?}", gesture, before, machine.mode());
        }
    }

    machine.drive(&pointer, floor_point, &tuning, &mut out);

    object_writer.send_batch(out.objects);
    camera_writer.send_batch(out.camera);
    shop_writer.send_batch(out.shop);
}
