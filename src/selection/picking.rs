//! Screen → floor mapping and hit testing against pick rectangles.

use bevy::prelude::*;

use crate::shared::PickBounds;

/// Maps a screen position to a point on the floor plane. The engine side
/// installs one that matches its camera.
pub trait WorldPicker: Send + Sync + 'static {
    fn floor_point(&self, screen: Vec2) -> Option<Vec3>;
}

#[derive(Resource)]
pub struct Picker(pub Box<dyn WorldPicker>);

impl Picker {
    pub fn new(picker: impl WorldPicker) -> Self {
        Self(Box::new(picker))
    }

    pub fn floor_point(&self, screen: Vec2) -> Option<Vec3> {
        self.0.floor_point(screen)
    }
}

/// Orthographic top-down view: screen pixels map linearly onto world x/z.
#[derive(Debug, Clone, Copy)]
pub struct TopDownPicker {
    /// World (x, z) under screen pixel (0, 0).
    pub origin: Vec2,
    pub units_per_pixel: f32,
}

impl Default for TopDownPicker {
    fn default() -> Self {
        Self {
            origin: Vec2::ZERO,
            units_per_pixel: 1.0,
        }
    }
}

impl WorldPicker for TopDownPicker {
    fn floor_point(&self, screen: Vec2) -> Option<Vec3> {
        let world = self.origin + screen * self.units_per_pixel;
        Some(Vec3::new(world.x, 0.0, world.y))
    }
}

/// What the pointer landed on, with the capabilities of that entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PickHit {
    pub entity: Entity,
    pub selectable: bool,
    pub shop: bool,
}

/// Candidate for hit testing: entity, anchor, bounds, selectable, shop.
pub type PickCandidate<'a> = (Entity, Vec3, &'a PickBounds, bool, bool);

/// The candidate whose rectangle contains `point`, nearest centre first.
pub fn nearest_hit<'a>(
    point: Vec3,
    candidates: impl IntoIterator<Item = PickCandidate<'a>>,
) -> Option<PickHit> {
    candidates
        .into_iter()
        .filter(|(_, anchor, bounds, _, _)| bounds.contains(*anchor, point))
        .map(|(entity, anchor, bounds, selectable, shop)| {
            let centre = bounds.centre(anchor);
            let distance = Vec2::new(centre.x - point.x, centre.z - point.z).length_squared();
            (distance, PickHit { entity, selectable, shop })
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, hit)| hit)
}
