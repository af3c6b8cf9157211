// src/engine_lib/intersection.rs

use glam::Vec3;

use crate::engine_lib::scene_types::{BrushId, Scene};

/// Result of a ray hitting a single axis-aligned box. `face_min`/`face_max`
/// span the specific face that was struck (degenerate on the hit axis);
/// portal placement later projects into that rectangle.
#[derive(Clone, Copy, Debug)]
pub struct AabbHit {
    pub intersection: Vec3,
    pub normal: Vec3,
    pub face_min: Vec3,
    pub face_max: Vec3,
}

/// A scene-wide raycast result, carrying the index of the brush that was
/// hit.
#[derive(Clone, Copy, Debug)]
pub struct RaycastHit {
    pub intersection: Vec3,
    pub normal: Vec3,
    pub face_min: Vec3,
    pub face_max: Vec3,
    pub brush: BrushId,
}

#[derive(Clone, Copy, PartialEq)]
enum Slab {
    Below,
    Above,
    Inside,
}

/// Ray-vs-box test after Woo's "fast ray-box intersection": classify the
/// origin against each axis slab, take the farthest candidate plane the ray
/// must cross, then validate the remaining two coordinates at that
/// distance. An origin inside the box is an immediate hit with a zero
/// normal. `dir` need not be unit length.
pub fn intersect_aabb(min_b: Vec3, max_b: Vec3, origin: Vec3, dir: Vec3) -> Option<AabbHit> {
    let mut inside = true;
    let mut slab = [Slab::Inside; 3];
    let mut candidate_plane = [0.0f32; 3];

    for i in 0..3 {
        if origin[i] < min_b[i] {
            slab[i] = Slab::Below;
            candidate_plane[i] = min_b[i];
            inside = false;
        } else if origin[i] > max_b[i] {
            slab[i] = Slab::Above;
            candidate_plane[i] = max_b[i];
            inside = false;
        }
    }

    if inside {
        return Some(AabbHit {
            intersection: origin,
            normal: Vec3::ZERO,
            face_min: min_b,
            face_max: max_b,
        });
    }

    // Parametric distance to each candidate plane; -1 marks "not a
    // candidate".
    let mut max_t = [-1.0f32; 3];
    for i in 0..3 {
        if slab[i] != Slab::Inside && dir[i] != 0.0 {
            max_t[i] = (candidate_plane[i] - origin[i]) / dir[i];
        }
    }

    // The true hit plane is the last one the ray crosses on its way in.
    let mut which_plane = 0;
    for i in 1..3 {
        if max_t[which_plane] < max_t[i] {
            which_plane = i;
        }
    }

    if max_t[which_plane] < 0.0 {
        return None;
    }

    let mut coord = Vec3::ZERO;
    for i in 0..3 {
        if i != which_plane {
            coord[i] = origin[i] + max_t[which_plane] * dir[i];
            if coord[i] < min_b[i] || coord[i] > max_b[i] {
                return None;
            }
        } else {
            coord[i] = candidate_plane[i];
        }
    }

    let mut normal = Vec3::ZERO;
    let mut face_min = min_b;
    let mut face_max = max_b;
    if slab[which_plane] == Slab::Below {
        normal[which_plane] = -1.0;
        face_max[which_plane] = min_b[which_plane];
    } else {
        normal[which_plane] = 1.0;
        face_min[which_plane] = max_b[which_plane];
    }

    Some(AabbHit {
        intersection: coord,
        normal,
        face_min,
        face_max,
    })
}

/// Casts a ray against every brush in the scene and returns the nearest hit
/// by distance from `origin`. Pure query; the renderer and the portal
/// placement path both use it.
pub fn raycast(scene: &Scene, origin: Vec3, dir: Vec3) -> Option<RaycastHit> {
    let mut nearest: Option<RaycastHit> = None;

    for (brush_index, brush) in scene.brushes.iter().enumerate() {
        if let Some(hit) = intersect_aabb(brush.min, brush.max, origin, dir) {
            let replace = match &nearest {
                Some(best) => {
                    origin.distance(hit.intersection) < origin.distance(best.intersection)
                }
                None => true,
            };
            if replace {
                nearest = Some(RaycastHit {
                    intersection: hit.intersection,
                    normal: hit.normal,
                    face_min: hit.face_min,
                    face_max: hit.face_max,
                    brush: brush_index,
                });
            }
        }
    }

    nearest
}
