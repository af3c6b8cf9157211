// src/engine_lib/scene_types.rs
use glam::Vec3;

/// Stable index into `Scene::brushes`. Portals keep this instead of a
/// reference so the brush list stays freely movable.
pub type BrushId = usize;

/// A static axis-aligned solid box forming level geometry. Immutable after
/// load.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Brush {
    pub min: Vec3,
    pub max: Vec3,
    pub color: Vec3,
}

impl Brush {
    pub fn new(min: Vec3, max: Vec3, color: Vec3) -> Self {
        Self { min, max, color }
    }
}

/// One of the two linked portal apertures. `width` and `height` are
/// half-extents of the rectangular footprint; `position` sits slightly off
/// the owning brush face along `normal` (see `place_portal`).
#[derive(Clone, Copy, Debug)]
pub struct Portal {
    pub open: bool,
    /// Scene time at which this portal was (last) placed. Read by the
    /// renderer for the spawn fade; physics ignores it.
    pub spawn_time: f64,
    pub position: Vec3,
    pub normal: Vec3,
    pub width: f32,
    pub height: f32,
    /// Brush the portal is mounted on. Only consulted by the aperture
    /// pass-through exception.
    pub brush: Option<BrushId>,
}

impl Portal {
    /// A closed portal slot with the default 1.0 half-extents.
    pub fn closed() -> Self {
        Self {
            open: false,
            spawn_time: 0.0,
            position: Vec3::ZERO,
            normal: Vec3::ZERO,
            width: 1.0,
            height: 1.0,
            brush: None,
        }
    }
}

/// A dynamic, physically simulated box. `size` is the half-extent.
#[derive(Clone, Copy, Debug)]
pub struct Cube {
    pub position: Vec3,
    pub velocity: Vec3,
    pub color: Vec3,
    pub size: f32,
    pub grabbed: bool,
    /// Render hint: the cube's footprint currently overlaps an open portal,
    /// so the renderer may slice it visually. Not used by physics.
    pub in_portal: bool,
}

impl Cube {
    pub fn new(position: Vec3, color: Vec3) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            color,
            size: 0.5,
            grabbed: false,
            in_portal: false,
        }
    }
}

/// The complete simulated world: static brushes, dynamic cubes, the two
/// portal slots, the ambient light direction, and the monotonic simulation
/// time supplied by the frame driver.
#[derive(Clone, Debug)]
pub struct Scene {
    pub brushes: Vec<Brush>,
    pub cubes: Vec<Cube>,
    pub portal1: Portal,
    pub portal2: Portal,
    pub light_dir: Vec3,
    pub time: f64,
}

impl Scene {
    pub fn new(light_dir: Vec3, brushes: Vec<Brush>) -> Self {
        Self {
            brushes,
            cubes: Vec::new(),
            portal1: Portal::closed(),
            portal2: Portal::closed(),
            light_dir,
            time: 0.0,
        }
    }
}
