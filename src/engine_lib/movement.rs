// src/engine_lib/movement.rs

use glam::Vec3;
use log::info;

use crate::engine_lib::camera::Camera;
use crate::engine_lib::collision::{aabb_brush_collision, collision_excused_by_portal};
use crate::engine_lib::portal::{find_portal_intersection, pcam_transform, portals_open};
use crate::engine_lib::scene_types::Scene;

/// Downward acceleration applied to the camera (by the controller) and to
/// free cubes, in units per second squared.
pub const GRAVITY: f32 = -15.0;

/// Player collision half-extents: the camera sits near the top of a box
/// reaching 1.5 units down and 0.2 units sideways.
const PLAYER_EXTENT_DOWN: Vec3 = Vec3::new(0.2, 1.5, 0.2);
const PLAYER_EXTENT_UP: f32 = 0.2;

/// A contact normal counts as ground when it points this much upward.
pub const GROUND_NORMAL_THRESHOLD: f32 = 0.1;

/// Teleports the camera if the intended displacement crosses either open
/// portal. Returns true when a teleport happened; the step is then fully
/// consumed.
pub fn handle_portal_movement(cam: &mut Camera, translation: Vec3, scene: &Scene) -> bool {
    if !portals_open(scene) {
        return false;
    }
    if find_portal_intersection(cam.position, translation, &scene.portal1).is_some() {
        cam.set_transform(pcam_transform(cam, &scene.portal1, &scene.portal2));
        info!("camera teleport: portal 1 -> portal 2");
        true
    } else if find_portal_intersection(cam.position, translation, &scene.portal2).is_some() {
        cam.set_transform(pcam_transform(cam, &scene.portal2, &scene.portal1));
        info!("camera teleport: portal 2 -> portal 1");
        true
    } else {
        false
    }
}

/// Moves the camera by the intended displacement, teleporting through
/// portals or sliding along brushes. Collisions are resolved per brush in
/// sequence, each removing its normal component from the running
/// translation; open portal apertures on a brush face are treated as open
/// space. Returns whether the camera ended the step on the ground.
///
/// Gravity and jump impulses are the caller's business; this only resolves
/// the geometric part of a proposed displacement.
pub fn scene_aware_movement(cam: &mut Camera, translation: Vec3, scene: &Scene) -> bool {
    let mut on_ground = false;

    let player_min = cam.position - PLAYER_EXTENT_DOWN;
    let player_max = cam.position + Vec3::splat(PLAYER_EXTENT_UP);
    let player_center = (player_min + player_max) / 2.0;

    if handle_portal_movement(cam, translation, scene) {
        return on_ground;
    }

    let mut translation = translation;
    for (brush_id, brush) in scene.brushes.iter().enumerate() {
        if let Some(hit_normal) = aabb_brush_collision(player_min, player_max, translation, brush) {
            if collision_excused_by_portal(scene, brush_id, hit_normal, player_center) {
                continue;
            }

            let projection = hit_normal.dot(translation) * hit_normal;
            translation -= projection;

            if hit_normal.dot(Vec3::Y) > GROUND_NORMAL_THRESHOLD {
                on_ground = true;
            }
        }
    }

    cam.position += translation;
    on_ground
}
