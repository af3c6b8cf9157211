// src/engine_lib/portal.rs

use glam::{Mat4, Vec3};

use crate::engine_lib::camera::Camera;
use crate::engine_lib::intersection::RaycastHit;
use crate::engine_lib::scene_types::{Portal, Scene};

/// Tolerance added to the displacement length so a crossing exactly at the
/// end of the step is not missed.
const CROSSING_TOLERANCE: f32 = 0.001;

/// Portals are pushed this far off their brush face to avoid z-fighting
/// with the surface. Not a physical gap.
const SURFACE_OFFSET: f32 = 0.01;

pub fn portals_open(scene: &Scene) -> bool {
    scene.portal1.open && scene.portal2.open
}

/// Rotation aligning the canonical forward axis with the portal normal,
/// via a yaw-then-pitch Euler decomposition of the normal. Exact for the
/// axis-aligned normals placement produces; not singularity-free in
/// general.
pub fn portal_rotation(portal: &Portal) -> Mat4 {
    let yaw = portal.normal.x.atan2(portal.normal.z);
    let pitch = (-portal.normal.y).clamp(-1.0, 1.0).asin();
    Mat4::from_rotation_y(yaw) * Mat4::from_rotation_x(pitch)
}

/// Rigid transform from `portal`'s local frame to `linked_portal`'s. The
/// 180 degree yaw flip makes an exit face away from the linked surface, so
/// you come out looking back at where you entered.
pub fn portal_transform(portal: &Portal, linked_portal: &Portal) -> Mat4 {
    let p1_model = Mat4::from_translation(portal.position) * portal_rotation(portal);
    let p2_model = Mat4::from_translation(linked_portal.position) * portal_rotation(linked_portal);
    let p2_rotated = p2_model * Mat4::from_rotation_y(std::f32::consts::PI);
    p2_rotated * p1_model.inverse()
}

/// World transform of a virtual camera behind `linked_portal` that sees
/// what the real camera would see through `portal`. Also the camera's new
/// transform when it actually teleports.
pub fn pcam_transform(real_cam: &Camera, portal: &Portal, linked_portal: &Portal) -> Mat4 {
    portal_transform(portal, linked_portal) * real_cam.transform()
}

/// Tests whether moving from `start` by `translation` crosses the portal
/// plane within the aperture. One-directional: only motion against the
/// portal normal can cross. Returns the plane intersection point on
/// success.
///
/// The lateral bound is the literal radial check against `width` only,
/// matching the shipped behavior (see DESIGN.md).
pub fn find_portal_intersection(start: Vec3, translation: Vec3, portal: &Portal) -> Option<Vec3> {
    if translation.length_squared() < f32::EPSILON {
        return None;
    }
    let dir = translation.normalize();
    let denom = dir.dot(portal.normal);
    if denom >= 0.0 {
        return None;
    }
    let dist = (portal.position - start).dot(portal.normal) / denom;
    if dist < 0.0 {
        return None;
    }
    let plane_intersection = start + dir * dist;
    if dist < translation.length() + CROSSING_TOLERANCE
        && plane_intersection.distance(portal.position) < portal.width
    {
        Some(plane_intersection)
    } else {
        None
    }
}

/// Footprint-vs-portal test for the `in_portal` render hint: true when the
/// AABB is laterally contained in the portal rectangle. The distance along
/// the portal normal is deliberately ignored; this only feeds visual
/// slicing.
///
/// Panics on a non-axis-aligned portal normal; placement never produces
/// one.
pub fn portal_aabb_collision_test(portal: &Portal, max: Vec3, min: Vec3) -> bool {
    let pos = portal.position;
    let n = portal.normal;
    if (1.0 - n.dot(Vec3::X).abs()).abs() < 0.001 {
        pos.y - portal.height <= min.y
            && pos.y + portal.height >= max.y
            && pos.z - portal.width <= min.z
            && pos.z + portal.width >= max.z
    } else if (1.0 - n.dot(Vec3::Y).abs()).abs() < 0.001 {
        pos.x - portal.width <= min.x
            && pos.x + portal.width >= max.x
            && pos.z - portal.height <= min.z
            && pos.z + portal.height >= max.z
    } else if (1.0 - n.dot(Vec3::Z).abs()).abs() < 0.001 {
        pos.x - portal.width <= min.x
            && pos.x + portal.width >= max.x
            && pos.y - portal.height <= min.y
            && pos.y + portal.height >= max.y
    } else {
        panic!("portal normal is not axis-aligned: {:?}", portal.normal);
    }
}

/// In-plane basis for an axis-aligned face normal: (u, v) with u carrying
/// the portal width and v the height. Any other normal violates the
/// axis-aligned-brush contract.
fn face_basis(normal: Vec3) -> (Vec3, Vec3) {
    if (1.0 - normal.dot(Vec3::X).abs()).abs() < 0.001 {
        (Vec3::Z, Vec3::Y)
    } else if (1.0 - normal.dot(Vec3::Y).abs()).abs() < 0.001 {
        (Vec3::X, Vec3::Z)
    } else if (1.0 - normal.dot(Vec3::Z).abs()).abs() < 0.001 {
        (Vec3::X, Vec3::Y)
    } else {
        panic!("raycast hit face with non-axis-aligned normal: {:?}", normal);
    }
}

/// Converts a raycast hit into an open portal on that face. Fails (returns
/// false, portal untouched) when the face cannot contain the full portal
/// footprint; otherwise clamps the position so the footprint stays inside
/// the face, offsets it slightly along the normal and commits. The only
/// portal mutator besides load-time reset.
pub fn place_portal(portal: &mut Portal, hit: &RaycastHit, time: f64) -> bool {
    let (u, v) = face_basis(hit.normal);

    let hit_u = hit.intersection.dot(u);
    let hit_v = hit.intersection.dot(v);
    let face_min_u = hit.face_min.dot(u).min(hit.face_max.dot(u));
    let face_max_u = hit.face_min.dot(u).max(hit.face_max.dot(u));
    let face_min_v = hit.face_min.dot(v).min(hit.face_max.dot(v));
    let face_max_v = hit.face_min.dot(v).max(hit.face_max.dot(v));

    // The face must be at least as big as the full portal rectangle.
    if face_max_u - face_min_u < 2.0 * portal.width
        || face_max_v - face_min_v < 2.0 * portal.height
    {
        return false;
    }

    let clamped_u = hit_u.clamp(face_min_u + portal.width, face_max_u - portal.width);
    let clamped_v = hit_v.clamp(face_min_v + portal.height, face_max_v - portal.height);

    portal.position = hit.intersection
        + (clamped_u - hit_u) * u
        + (clamped_v - hit_v) * v
        + hit.normal * SURFACE_OFFSET;
    portal.normal = hit.normal;
    portal.open = true;
    portal.spawn_time = time;
    portal.brush = Some(hit.brush);
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f32 = 1e-4;

    fn open_portal(position: Vec3, normal: Vec3) -> Portal {
        let mut portal = Portal::closed();
        portal.open = true;
        portal.position = position;
        portal.normal = normal;
        portal
    }

    fn wall_hit(intersection: Vec3, normal: Vec3, face_min: Vec3, face_max: Vec3) -> RaycastHit {
        RaycastHit {
            intersection,
            normal,
            face_min,
            face_max,
            brush: 0,
        }
    }

    #[test]
    fn round_trip_through_both_portals_restores_pose() {
        let p1 = open_portal(Vec3::new(-8.0, 1.0, 0.0), Vec3::Z);
        let p2 = open_portal(Vec3::new(8.0, 1.0, 0.0), Vec3::X);
        let mut cam = Camera::new(Vec3::new(-8.0, 1.0, 2.0), 25.0, -10.0);
        let original = cam;

        cam.set_transform(pcam_transform(&cam, &p1, &p2));
        cam.set_transform(pcam_transform(&cam, &p2, &p1));

        assert!(cam.position.distance(original.position) < EPS);
        let yaw_diff = (cam.yaw - original.yaw).rem_euclid(360.0);
        assert!(yaw_diff < EPS || (360.0 - yaw_diff) < EPS);
        assert!((cam.pitch - original.pitch).abs() < EPS);
    }

    #[test]
    fn teleport_relocates_to_linked_portal_with_yaw_flipped() {
        // Both portals face +z; entering portal 1 must come out at portal 2
        // with the heading rotated by 180 degrees.
        let p1 = open_portal(Vec3::new(-8.0, 1.0, 0.0), Vec3::Z);
        let p2 = open_portal(Vec3::new(8.0, 1.0, 0.0), Vec3::Z);
        let mut cam = Camera::new(Vec3::new(-8.0, 1.0, 1.0), 10.0, 0.0);
        let translation = Vec3::new(0.0, 0.0, -2.0);

        let crossing = find_portal_intersection(cam.position, translation, &p1)
            .expect("moving against the portal normal should cross");
        assert!(crossing.distance(Vec3::new(-8.0, 1.0, 0.0)) < EPS);

        let old_yaw = cam.yaw;
        cam.set_transform(pcam_transform(&cam, &p1, &p2));
        assert!((cam.position.x - 8.0).abs() < EPS);
        assert!((cam.position.y - 1.0).abs() < EPS);
        let yaw_diff = (cam.yaw - old_yaw).rem_euclid(360.0);
        assert!((yaw_diff - 180.0).abs() < EPS);
    }

    #[test]
    fn crossing_requires_motion_against_the_normal() {
        let portal = open_portal(Vec3::new(0.0, 1.0, 0.0), Vec3::Z);
        // Moving along the normal: no crossing even though the path spans
        // the plane.
        let away = find_portal_intersection(
            Vec3::new(0.0, 1.0, -1.0),
            Vec3::new(0.0, 0.0, 2.0),
            &portal,
        );
        assert!(away.is_none());
    }

    #[test]
    fn crossing_requires_plane_hit_within_step_and_aperture() {
        let portal = open_portal(Vec3::new(0.0, 1.0, 0.0), Vec3::Z);
        // Too short to reach the plane.
        assert!(find_portal_intersection(
            Vec3::new(0.0, 1.0, 2.0),
            Vec3::new(0.0, 0.0, -1.0),
            &portal,
        )
        .is_none());
        // Long enough but laterally outside the aperture.
        assert!(find_portal_intersection(
            Vec3::new(5.0, 1.0, 1.0),
            Vec3::new(0.0, 0.0, -2.0),
            &portal,
        )
        .is_none());
        // Through the middle.
        assert!(find_portal_intersection(
            Vec3::new(0.0, 1.0, 1.0),
            Vec3::new(0.0, 0.0, -2.0),
            &portal,
        )
        .is_some());
    }

    #[test]
    fn zero_translation_never_crosses() {
        let portal = open_portal(Vec3::ZERO, Vec3::Z);
        assert!(find_portal_intersection(Vec3::new(0.0, 0.0, 0.5), Vec3::ZERO, &portal).is_none());
    }

    #[test]
    fn place_portal_refuses_undersized_faces() {
        let mut portal = Portal::closed();
        // A 1x1 face cannot hold a 2x2 portal footprint.
        let hit = wall_hit(
            Vec3::new(0.5, 0.5, 1.0),
            Vec3::Z,
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(1.0, 1.0, 1.0),
        );
        assert!(!place_portal(&mut portal, &hit, 1.0));
        assert!(!portal.open);
    }

    #[test]
    fn place_portal_clamps_footprint_inside_face() {
        let mut portal = Portal::closed();
        // Wall face spanning x 0..10, y 0..6 at z = 1; hit near a corner.
        let hit = wall_hit(
            Vec3::new(0.2, 0.3, 1.0),
            Vec3::Z,
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(10.0, 6.0, 1.0),
        );
        assert!(place_portal(&mut portal, &hit, 2.5));
        assert!(portal.open);
        assert_eq!(portal.brush, Some(0));
        assert!((portal.spawn_time - 2.5).abs() < 1e-9);
        assert!((portal.position.x - 1.0).abs() < EPS);
        assert!((portal.position.y - 1.0).abs() < EPS);
        // Offset off the surface along the normal.
        assert!((portal.position.z - 1.01).abs() < EPS);
        assert_eq!(portal.normal, Vec3::Z);
    }

    #[test]
    fn place_portal_keeps_centered_hits_in_place() {
        let mut portal = Portal::closed();
        let hit = wall_hit(
            Vec3::new(5.0, 3.0, 1.0),
            Vec3::Z,
            Vec3::new(0.0, 0.0, 1.0),
            Vec3::new(10.0, 6.0, 1.0),
        );
        assert!(place_portal(&mut portal, &hit, 0.0));
        assert!((portal.position.x - 5.0).abs() < EPS);
        assert!((portal.position.y - 3.0).abs() < EPS);
    }

    #[test]
    fn footprint_test_ignores_distance_along_normal() {
        let mut portal = open_portal(Vec3::new(0.0, 1.0, 0.0), Vec3::Z);
        portal.width = 1.0;
        portal.height = 1.0;
        let min = Vec3::new(-0.4, 0.6, 5.0);
        let max = Vec3::new(0.4, 1.4, 5.8);
        assert!(portal_aabb_collision_test(&portal, max, min));
        // Laterally outside.
        let min = Vec3::new(2.0, 0.6, 0.0);
        let max = Vec3::new(2.8, 1.4, 0.8);
        assert!(!portal_aabb_collision_test(&portal, max, min));
    }
}
