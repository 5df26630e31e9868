//! The top-level interaction mode and its transitions.
//!
//! The machine never touches the world itself. Every transition writes the
//! requests it wants sent into an [`Outbox`], which the selection system
//! flushes into events.

use bevy::prelude::*;

use super::picking::PickHit;
use crate::shared::*;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SelectionMode {
    #[default]
    None,
    Dragging,
    Pinching,
    Select,
    SelectHold,
    MovingObject,
    Shop,
}

/// Requests produced by one tick of the machine.
#[derive(Debug, Default, PartialEq)]
pub struct Outbox {
    pub objects: Vec<ObjectCommand>,
    pub camera: Vec<CameraRequest>,
    pub shop: Vec<ShopCommand>,
}

#[derive(Resource, Debug, Clone)]
pub struct SelectionMachine {
    mode: SelectionMode,
    /// Set by DragStart/PinchStart, acted on at the start of the next tick
    /// once the UI layout for the touch is known.
    pending_drag: bool,
    pending_pinch: bool,
    /// The current pan has travelled past the minimum drag distance.
    is_dragging: bool,
    /// The next object drag update only records the touch offset.
    new_drag_offset: bool,
    start_drag_position: Vec2,
    start_pinch_distance: f32,
    selected: Option<Entity>,
    held: Option<Entity>,
    /// Object waiting in the moving role. Only touches on it drag it.
    mover: Option<Entity>,
}

impl Default for SelectionMachine {
    fn default() -> Self {
        Self {
            mode: SelectionMode::None,
            pending_drag: false,
            pending_pinch: false,
            is_dragging: false,
            new_drag_offset: true,
            start_drag_position: Vec2::ZERO,
            start_pinch_distance: 0.0,
            selected: None,
            held: None,
            mover: None,
        }
    }
}

impl SelectionMachine {
    pub fn mode(&self) -> SelectionMode {
        self.mode
    }

    pub fn mover(&self) -> Option<Entity> {
        self.mover
    }

    pub fn selected(&self) -> Option<Entity> {
        self.selected
    }

    pub fn held(&self) -> Option<Entity> {
        self.held
    }

    pub fn is_dragging(&self) -> bool {
        self.is_dragging
    }

    pub fn has_pending(&self) -> bool {
        self.pending_drag || self.pending_pinch
    }

    pub fn reset(&mut self) {
        self.mode = SelectionMode::None;
    }

    /// Acts on the drag/pinch starts recorded last tick.
    pub fn consume_pending(&mut self, pointer: &TouchPointer, out: &mut Outbox) {
        if self.pending_pinch {
            if pointer.over_ui {
                self.reset();
            } else {
                self.end_select_hold(out);
                self.start_pinch_distance = pointer.pinch_distance;
                out.camera.push(CameraRequest::StartPinch);
                self.mode = SelectionMode::Pinching;
            }
            self.pending_pinch = false;
        }

        if self.mode == SelectionMode::None && self.pending_drag && !pointer.over_ui {
            self.end_select_hold(out);
            self.start_drag_position = pointer.position;
            out.camera.push(CameraRequest::StartDrag);
            self.mode = SelectionMode::Dragging;
        }
        self.pending_drag = false;
    }

    pub fn on_gesture(
        &mut self,
        gesture: GestureEvent,
        hit: Option<PickHit>,
        pointer: &TouchPointer,
        out: &mut Outbox,
    ) {
        match gesture {
            GestureEvent::DragStart => {
                let on_mover = matches!((self.mover, hit), (Some(mover), Some(hit)) if hit.entity == mover);
                if on_mover {
                    self.mode = SelectionMode::MovingObject;
                } else {
                    // Touching anything but the mover pans the camera.
                    if self.mode == SelectionMode::MovingObject {
                        self.reset();
                    }
                    self.pending_drag = true;
                }
            }
            GestureEvent::DragEnd => {
                self.end_dragging();
                if self.mode != SelectionMode::MovingObject {
                    self.reset();
                }
            }
            GestureEvent::PinchStart => self.pending_pinch = true,
            GestureEvent::PinchEnd => {
                if self.mode != SelectionMode::MovingObject {
                    self.reset();
                }
            }
            GestureEvent::Tap => self.select(hit, pointer, out),
            GestureEvent::LongPress => self.select_hold(hit, pointer, out),
        }
    }

    fn end_dragging(&mut self) {
        self.is_dragging = false;
        self.new_drag_offset = true;
    }

    fn select(&mut self, hit: Option<PickHit>, pointer: &TouchPointer, out: &mut Outbox) {
        if pointer.over_ui || self.mode == SelectionMode::Select {
            return;
        }
        let Some(hit) = hit else {
            return;
        };

        if hit.shop {
            self.end_select_hold(out);
            out.shop.push(ShopCommand::Open);
            self.mode = SelectionMode::Shop;
            return;
        }

        if self.mover.is_none() && hit.selectable {
            self.end_select_hold(out);
            if let Some(previous) = self.selected.filter(|previous| *previous != hit.entity) {
                out.objects.push(ObjectCommand::EndSelect(previous));
            }
            self.selected = Some(hit.entity);
            out.objects.push(ObjectCommand::Select(hit.entity));
            self.mode = SelectionMode::Select;
        }
    }

    fn select_hold(&mut self, hit: Option<PickHit>, pointer: &TouchPointer, out: &mut Outbox) {
        if pointer.over_ui || self.mode == SelectionMode::Select || self.is_dragging {
            return;
        }
        let Some(hit) = hit.filter(|hit| hit.selectable) else {
            return;
        };
        if self.mover.is_some() {
            return;
        }

        self.end_select_hold(out);
        self.held = Some(hit.entity);
        out.objects.push(ObjectCommand::SelectHold(hit.entity));
        self.mode = SelectionMode::SelectHold;
        self.end_dragging();
    }

    /// Closes the select panel of the selected object, if any.
    pub fn end_select(&mut self, out: &mut Outbox) {
        if let Some(entity) = self.selected.take() {
            out.objects.push(ObjectCommand::EndSelect(entity));
        }
        self.reset();
    }

    /// Closes the hold menu of the held object, if any.
    pub fn end_select_hold(&mut self, out: &mut Outbox) {
        if let Some(entity) = self.held.take() {
            out.objects.push(ObjectCommand::EndSelectHold(entity));
            self.reset();
        }
    }

    pub fn on_command(&mut self, command: SelectionCommand, out: &mut Outbox) {
        match command {
            SelectionCommand::EndSelect => self.end_select(out),
            SelectionCommand::EndSelectHold => self.end_select_hold(out),
            SelectionCommand::Reset => self.reset(),
        }
    }

    /// The object took the moving role; its hold menu closed itself.
    pub fn on_move_started(&mut self, entity: Entity) {
        if self.held == Some(entity) {
            self.held = None;
        }
        self.mover = Some(entity);
        self.new_drag_offset = true;
        self.reset();
    }

    pub fn on_move_ended(&mut self, entity: Entity) {
        if self.mover == Some(entity) {
            self.mover = None;
        }
        self.reset();
    }

    /// Per-tick work of the active mode.
    pub fn drive(
        &mut self,
        pointer: &TouchPointer,
        floor_point: Option<Vec3>,
        tuning: &FarmTuning,
        out: &mut Outbox,
    ) {
        match self.mode {
            SelectionMode::Dragging => {
                let mut delta = self.start_drag_position - pointer.position;
                if delta.length() > tuning.min_drag_distance {
                    self.is_dragging = true;
                }
                delta.y *= tuning.drag_vertical_factor;
                out.camera.push(CameraRequest::Drag { delta });
            }
            SelectionMode::Pinching => {
                let pinch_delta = self.start_pinch_distance - pointer.pinch_distance;
                out.camera.push(CameraRequest::Zoom {
                    offset: pinch_delta * tuning.zoom_speed,
                });
            }
            SelectionMode::MovingObject if pointer.contacts > 0 => {
                if let (Some(entity), Some(point)) = (self.mover, floor_point) {
                    out.objects.push(ObjectCommand::Drag {
                        entity,
                        point,
                        first: self.new_drag_offset,
                    });
                    self.new_drag_offset = false;
                }
                out.camera.push(CameraRequest::EdgePan {
                    screen: pointer.position,
                });
            }
            _ => {}
        }
    }
}
