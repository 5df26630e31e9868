//! Touch and mouse contacts → gesture edges and the pointer snapshot.
//!
//! Only the binary installs [`InputPlugin`]; headless runs write
//! `TouchPointer` and send `GestureEvent`s directly.

use bevy::prelude::*;
use bevy::window::PrimaryWindow;

use crate::shared::*;

/// Contact id used for the mouse. Touch ids come from the platform.
const MOUSE_CONTACT: u64 = u64::MAX;

#[derive(Debug, Clone, Copy)]
struct Contact {
    id: u64,
    position: Vec2,
}

/// Tap / long-press bookkeeping for the primary contact.
#[derive(Debug, Clone, Copy)]
struct Press {
    origin: Vec2,
    held_secs: f32,
    travelled: bool,
    long_fired: bool,
}

/// Counts contacts and turns their edges into gestures. The first contact
/// drags, a second one pinches, anything beyond that is ignored.
#[derive(Resource, Debug, Default)]
pub struct TouchTracker {
    contacts: Vec<Contact>,
    press: Option<Press>,
    last_position: Vec2,
}

impl TouchTracker {
    pub fn contact_count(&self) -> usize {
        self.contacts.len()
    }

    pub fn press(&mut self, id: u64, position: Vec2, out: &mut Vec<GestureEvent>) {
        if self.contacts.iter().any(|c| c.id == id) {
            return;
        }
        if self.contacts.len() >= 2 {
            warn!("[Input] Ignoring contact {}: already tracking two", id);
            return;
        }
        self.contacts.push(Contact { id, position });
        self.last_position = self.primary_position();
        match self.contacts.len() {
            1 => {
                self.press = Some(Press {
                    origin: position,
                    held_secs: 0.0,
                    travelled: false,
                    long_fired: false,
                });
                out.push(GestureEvent::DragStart);
            }
            _ => {
                // A second finger is never a tap.
                self.press = None;
                out.push(GestureEvent::PinchStart);
            }
        }
    }

    pub fn release(&mut self, id: u64, tuning: &FarmTuning, out: &mut Vec<GestureEvent>) {
        let Some(index) = self.contacts.iter().position(|c| c.id == id) else {
            return;
        };
        let released = self.contacts.remove(index);
        match self.contacts.len() {
            0 => {
                self.last_position = released.position;
                out.push(GestureEvent::DragEnd);
                if let Some(press) = self.press.take() {
                    if !press.travelled && !press.long_fired && press.held_secs < tuning.long_press_secs
                    {
                        out.push(GestureEvent::Tap);
                    }
                }
            }
            _ => {
                // The remaining contact becomes the primary one.
                self.last_position = self.primary_position();
                out.push(GestureEvent::PinchEnd);
                out.push(GestureEvent::DragStart);
            }
        }
    }

    pub fn moved(&mut self, id: u64, position: Vec2, tuning: &FarmTuning) {
        let Some(index) = self.contacts.iter().position(|c| c.id == id) else {
            return;
        };
        self.contacts[index].position = position;
        if index == 0 {
            self.last_position = position;
            if let Some(press) = self.press.as_mut() {
                if press.origin.distance(position) > tuning.tap_slop {
                    press.travelled = true;
                }
            }
        }
    }

    /// Advances the hold timer; fires LongPress once per press.
    pub fn tick(&mut self, dt: f32, tuning: &FarmTuning, out: &mut Vec<GestureEvent>) {
        let Some(press) = self.press.as_mut() else {
            return;
        };
        press.held_secs += dt;
        if !press.long_fired && !press.travelled && press.held_secs >= tuning.long_press_secs {
            press.long_fired = true;
            out.push(GestureEvent::LongPress);
        }
    }

    fn primary_position(&self) -> Vec2 {
        self.contacts
            .first()
            .map_or(self.last_position, |c| c.position)
    }

    /// Writes position, pinch distance and contact count into `pointer`.
    pub fn fill_pointer(&self, pointer: &mut TouchPointer) {
        pointer.position = self.primary_position();
        pointer.pinch_distance = match self.contacts.as_slice() {
            [a, b, ..] => a.position.distance(b.position),
            _ => 0.0,
        };
        pointer.contacts = self.contacts.len() as u8;
    }
}

pub struct InputPlugin;

impl Plugin for InputPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<TouchTracker>().add_systems(
            Update,
            read_contacts
                .in_set(FarmSet::Input)
                .run_if(in_state(AppState::Playing)),
        );
    }
}

/// The single point where mouse and touch input become gestures.
#[allow(clippy::too_many_arguments)]
fn read_contacts(
    mouse: Res<ButtonInput<MouseButton>>,
    touches: Res<Touches>,
    windows: Query<&Window, With<PrimaryWindow>>,
    interactions: Query<&Interaction>,
    time: Res<Time>,
    tuning: Res<FarmTuning>,
    mut tracker: ResMut<TouchTracker>,
    mut pointer: ResMut<TouchPointer>,
    mut gestures: EventWriter<GestureEvent>,
) {
    let mut out = Vec::new();

    let cursor = windows.get_single().ok().and_then(Window::cursor_position);
    if let Some(cursor) = cursor {
        if mouse.just_pressed(MouseButton::Left) {
            tracker.press(MOUSE_CONTACT, cursor, &mut out);
        }
        tracker.moved(MOUSE_CONTACT, cursor, &tuning);
    }
    if mouse.just_released(MouseButton::Left) {
        tracker.release(MOUSE_CONTACT, &tuning, &mut out);
    }

    for touch in touches.iter_just_pressed() {
        tracker.press(touch.id(), touch.position(), &mut out);
    }
    for touch in touches.iter() {
        tracker.moved(touch.id(), touch.position(), &tuning);
    }
    for touch in touches.iter_just_released().chain(touches.iter_just_canceled()) {
        tracker.release(touch.id(), &tuning, &mut out);
    }

    tracker.tick(time.delta_secs(), &tuning, &mut out);

    tracker.fill_pointer(&mut pointer);
    pointer.over_ui = interactions.iter().any(|i| *i != Interaction::None);

    gestures.send_batch(out);
}
