// src/engine_lib/cubes.rs

use glam::{Mat4, Vec3};
use log::debug;

use crate::engine_lib::camera::Camera;
use crate::engine_lib::collision::{aabb_brush_collision, collision_excused_by_portal};
use crate::engine_lib::intersection::raycast;
use crate::engine_lib::movement::{GRAVITY, GROUND_NORMAL_THRESHOLD};
use crate::engine_lib::portal::{
    find_portal_intersection, portal_aabb_collision_test, portal_transform, portals_open,
};
use crate::engine_lib::scene_types::{Cube, Scene};

/// How far in front of the camera a grabbed cube is held.
pub const HOLDING_DISTANCE: f32 = 3.0;

/// Gain applied to the gap between a grabbed cube and its holding target
/// when steering its velocity.
const HOLD_PULL_GAIN: f32 = 1000.0;

/// Maps a cube through the portal pair. Position goes through the full
/// transform; velocity only through its rotational part, so a thrown cube
/// keeps a consistent heading on the far side.
pub fn teleport_cube(cube: &mut Cube, in_portal_transform: Mat4) {
    let teleported = in_portal_transform * Mat4::from_translation(cube.position);
    cube.position = teleported.w_axis.truncate();
    cube.velocity = in_portal_transform.transform_vector3(cube.velocity);
}

/// Where a grabbed cube wants to be: a fixed distance along the camera
/// forward, remapped through a portal if one is in the way, otherwise
/// clamped to just in front of whatever geometry the view ray hits first.
pub fn find_holding_position(cam: &Camera, scene: &Scene, cube_size: f32) -> Vec3 {
    let translation = cam.forward_direction() * HOLDING_DISTANCE;
    let holding_pos = cam.position + translation;

    if find_portal_intersection(cam.position, translation, &scene.portal1).is_some() {
        portal_transform(&scene.portal1, &scene.portal2).transform_point3(holding_pos)
    } else if find_portal_intersection(cam.position, translation, &scene.portal2).is_some() {
        portal_transform(&scene.portal2, &scene.portal1).transform_point3(holding_pos)
    } else {
        match raycast(scene, cam.position, cam.forward_direction()) {
            Some(hit) if cam.position.distance(hit.intersection) < HOLDING_DISTANCE => {
                hit.intersection + hit.normal * cube_size
            }
            _ => holding_pos,
        }
    }
}

/// Direction from `start` toward `target`, shortcutting through an open
/// portal when the remapped target is closer and the path actually crosses
/// that portal's plane.
pub fn portal_aware_direction(start: Vec3, target: Vec3, scene: &Scene) -> Vec3 {
    let p1_target = portal_transform(&scene.portal1, &scene.portal2).transform_point3(target);
    let p2_target = portal_transform(&scene.portal2, &scene.portal1).transform_point3(target);

    if start.distance(target) > start.distance(p2_target)
        && find_portal_intersection(start, p2_target - start, &scene.portal1).is_some()
    {
        p2_target - start
    } else if start.distance(target) > start.distance(p1_target)
        && find_portal_intersection(start, p1_target - start, &scene.portal2).is_some()
    {
        p1_target - start
    } else {
        target - start
    }
}

/// Steps every cube: grab steering or gravity, portal teleport, the
/// `in_portal` render hint, then brush collision with the aperture
/// exception. Landing on a strongly-upward normal zeroes the vertical
/// velocity.
pub fn update_cubes(scene: &mut Scene, cam: &Camera, delta_time: f32) {
    let mut cubes = std::mem::take(&mut scene.cubes);

    for cube in &mut cubes {
        let cube_aabb_min = cube.position - Vec3::splat(cube.size);
        let cube_aabb_max = cube.position + Vec3::splat(cube.size);

        if cube.grabbed {
            let target_pos = find_holding_position(cam, scene, cube.size);
            cube.velocity =
                portal_aware_direction(cube.position, target_pos, scene) * HOLD_PULL_GAIN * delta_time;
        } else {
            cube.velocity.y += GRAVITY * delta_time;
        }

        let translation = cube.velocity * delta_time;

        let both_portals_open = portals_open(scene);
        if both_portals_open
            && find_portal_intersection(cube.position, translation, &scene.portal1).is_some()
        {
            teleport_cube(cube, portal_transform(&scene.portal1, &scene.portal2));
            debug!("cube teleport: portal 1 -> portal 2");
        } else if both_portals_open
            && find_portal_intersection(cube.position, translation, &scene.portal2).is_some()
        {
            teleport_cube(cube, portal_transform(&scene.portal2, &scene.portal1));
            debug!("cube teleport: portal 2 -> portal 1");
        }

        cube.in_portal = both_portals_open
            && (portal_aabb_collision_test(&scene.portal1, cube_aabb_max, cube_aabb_min)
                || portal_aabb_collision_test(&scene.portal2, cube_aabb_max, cube_aabb_min));

        // Velocity may have been re-oriented by a teleport.
        let mut translation = cube.velocity * delta_time;

        for (brush_id, brush) in scene.brushes.iter().enumerate() {
            if let Some(hit_normal) =
                aabb_brush_collision(cube_aabb_min, cube_aabb_max, translation, brush)
            {
                if collision_excused_by_portal(scene, brush_id, hit_normal, cube.position) {
                    continue;
                }

                let projection = hit_normal.dot(translation) * hit_normal;
                translation -= projection;

                if hit_normal.dot(Vec3::Y) > GROUND_NORMAL_THRESHOLD {
                    cube.velocity.y = 0.0;
                }
            }
        }

        cube.position += translation;
    }

    scene.cubes = cubes;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_lib::scene_types::{Brush, Portal};

    const EPS: f32 = 1e-4;

    fn floor_scene() -> Scene {
        let mut scene = Scene::new(
            Vec3::Y,
            vec![Brush::new(
                Vec3::new(-20.0, -1.0, -20.0),
                Vec3::new(20.0, 0.0, 20.0),
                Vec3::ONE,
            )],
        );
        scene.cubes.push(Cube::new(Vec3::new(0.0, 5.0, 0.0), Vec3::X));
        scene
    }

    fn facing_portals(scene: &mut Scene) {
        let mut p1 = Portal::closed();
        p1.open = true;
        p1.position = Vec3::new(-8.0, 1.0, 0.0);
        p1.normal = Vec3::Z;
        scene.portal1 = p1;
        let mut p2 = Portal::closed();
        p2.open = true;
        p2.position = Vec3::new(8.0, 1.0, 0.0);
        p2.normal = Vec3::Z;
        scene.portal2 = p2;
    }

    #[test]
    fn free_cube_accelerates_downward() {
        let mut scene = floor_scene();
        let cam = Camera::new(Vec3::new(0.0, 2.0, 10.0), 0.0, 0.0);
        update_cubes(&mut scene, &cam, 0.1);
        let cube = scene.cubes[0];
        assert!((cube.velocity.y - GRAVITY * 0.1).abs() < EPS);
        assert!(cube.position.y < 5.0);
    }

    #[test]
    fn landing_zeroes_vertical_velocity() {
        let mut scene = floor_scene();
        scene.cubes[0].position = Vec3::new(0.0, 0.55, 0.0);
        scene.cubes[0].velocity = Vec3::new(2.0, -5.0, 0.0);
        let cam = Camera::new(Vec3::new(0.0, 2.0, 10.0), 0.0, 0.0);
        update_cubes(&mut scene, &cam, 0.1);
        let cube = scene.cubes[0];
        assert!((cube.velocity.y - 0.0).abs() < EPS);
        // Horizontal motion slides on.
        assert!(cube.position.x > 0.0);
        assert!((cube.position.y - 0.55).abs() < EPS);
    }

    #[test]
    fn cube_crossing_a_portal_is_relocated_and_velocity_reoriented() {
        let mut scene = floor_scene();
        facing_portals(&mut scene);
        scene.cubes[0].position = Vec3::new(-8.0, 1.0, 0.5);
        scene.cubes[0].velocity = Vec3::new(0.0, 0.0, -6.0);
        let cam = Camera::new(Vec3::new(0.0, 2.0, 10.0), 0.0, 0.0);
        update_cubes(&mut scene, &cam, 0.1);
        let cube = scene.cubes[0];
        // Comes out of portal 2, heading flipped to +z.
        assert!((cube.position.x - 8.0).abs() < 0.1);
        assert!(cube.velocity.z > 0.0);
    }

    #[test]
    fn in_portal_hint_tracks_footprint_overlap() {
        let mut scene = floor_scene();
        facing_portals(&mut scene);
        scene.cubes[0].position = Vec3::new(-8.0, 1.0, 0.2);
        scene.cubes[0].velocity = Vec3::ZERO;
        scene.cubes[0].grabbed = true;
        let cam = Camera::new(Vec3::new(-8.0, 1.0, 0.2), 0.0, 0.0);
        update_cubes(&mut scene, &cam, 0.001);
        assert!(scene.cubes[0].in_portal);
    }

    #[test]
    fn portal_aware_direction_shortcuts_through_the_nearer_portal() {
        let mut scene = floor_scene();
        facing_portals(&mut scene);
        // Target sits by portal 2; the start is in front of portal 1. The
        // remapped target lies just through portal 1's plane, so the
        // shortcut wins over the 16-unit direct path.
        let start = Vec3::new(-8.0, 1.0, 0.5);
        let target = Vec3::new(8.0, 1.0, 0.5);
        let dir = portal_aware_direction(start, target, &scene);
        assert!(dir.length() < start.distance(target));
        // The chosen path heads into portal 1, not across the room.
        assert!(dir.z < 0.0);
        assert!(dir.x.abs() < 1.0);
    }

    #[test]
    fn direct_path_wins_when_no_portal_helps() {
        let mut scene = floor_scene();
        facing_portals(&mut scene);
        let start = Vec3::new(0.0, 1.0, 5.0);
        let target = Vec3::new(1.0, 1.0, 5.0);
        let dir = portal_aware_direction(start, target, &scene);
        assert!(dir.distance(Vec3::new(1.0, 0.0, 0.0)) < EPS);
    }

    #[test]
    fn holding_position_clamps_to_near_geometry() {
        let mut scene = floor_scene();
        scene.brushes.push(Brush::new(
            Vec3::new(-1.0, 0.0, -3.0),
            Vec3::new(1.0, 4.0, -2.0),
            Vec3::ONE,
        ));
        // Looking straight at the wall one unit away; hold distance 3
        // would bury the target inside it.
        let cam = Camera::new(Vec3::new(0.0, 2.0, -1.0), 0.0, 0.0);
        let pos = find_holding_position(&cam, &scene, 0.5);
        assert!((pos.z - -1.5).abs() < EPS);
    }

    #[test]
    fn holding_position_remaps_through_a_portal_in_the_way() {
        let mut scene = floor_scene();
        facing_portals(&mut scene);
        // Camera one unit in front of portal 1, looking through it.
        let cam = Camera::new(Vec3::new(-8.0, 1.0, 1.0), 0.0, 0.0);
        let pos = find_holding_position(&cam, &scene, 0.5);
        // Held point appears on portal 2's side of the world.
        assert!((pos.x - 8.0).abs() < EPS);
        assert!((pos.z - 2.0).abs() < EPS);
    }
}
