// src/engine_lib/collision.rs

use glam::Vec3;

use crate::engine_lib::portal::portals_open;
use crate::engine_lib::scene_types::{Brush, BrushId, Portal, Scene};

/// Swept AABB-vs-brush test. Translates the box by `translation`, checks
/// overlap on all three axes, and on overlap returns the signed unit
/// normal of the dominant separating axis (the axis with the smallest
/// overlap extent), picking the side the translated box approached from.
pub fn aabb_brush_collision(
    aabb_min: Vec3,
    aabb_max: Vec3,
    translation: Vec3,
    brush: &Brush,
) -> Option<Vec3> {
    let translated_min = aabb_min + translation;
    let translated_max = aabb_max + translation;

    let collision = translated_min.x <= brush.max.x
        && translated_max.x >= brush.min.x
        && translated_min.y <= brush.max.y
        && translated_max.y >= brush.min.y
        && translated_min.z <= brush.max.z
        && translated_max.z >= brush.min.z;
    if !collision {
        return None;
    }

    let overlap_min = translated_min.max(brush.min);
    let overlap_max = translated_max.min(brush.max);
    let overlap_size = overlap_max - overlap_min;

    let normal = if overlap_size.x < overlap_size.y && overlap_size.x < overlap_size.z {
        if translated_max.x > brush.min.x && translated_min.x < brush.min.x {
            Vec3::new(-1.0, 0.0, 0.0)
        } else {
            Vec3::new(1.0, 0.0, 0.0)
        }
    } else if overlap_size.y < overlap_size.x && overlap_size.y < overlap_size.z {
        if translated_max.y > brush.min.y && translated_min.y < brush.min.y {
            Vec3::new(0.0, -1.0, 0.0)
        } else {
            Vec3::new(0.0, 1.0, 0.0)
        }
    } else {
        if translated_max.z > brush.min.z && translated_min.z < brush.min.z {
            Vec3::new(0.0, 0.0, -1.0)
        } else {
            Vec3::new(0.0, 0.0, 1.0)
        }
    };

    Some(normal)
}

fn portal_clears(portal: &Portal, brush_id: BrushId, hit_normal: Vec3, center: Vec3) -> bool {
    portal.brush == Some(brush_id)
        && (portal.normal - hit_normal).length() < 0.001
        && (portal.position - center).length() < portal.width
}

/// The aperture exception: a collision against `brush_id` is ignored when
/// both portals are open, one of them is mounted on that brush with a
/// matching face normal, and the mover's center is within the portal width
/// of the portal position. The rest of the face stays solid.
pub fn collision_excused_by_portal(
    scene: &Scene,
    brush_id: BrushId,
    hit_normal: Vec3,
    center: Vec3,
) -> bool {
    portals_open(scene)
        && (portal_clears(&scene.portal1, brush_id, hit_normal, center)
            || portal_clears(&scene.portal2, brush_id, hit_normal, center))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine_lib::scene_types::Portal;

    fn floor_brush() -> Brush {
        Brush::new(
            Vec3::new(-10.0, -1.0, -10.0),
            Vec3::new(10.0, 0.0, 10.0),
            Vec3::ONE,
        )
    }

    #[test]
    fn no_overlap_means_no_collision() {
        let brush = floor_brush();
        let min = Vec3::new(-0.5, 2.0, -0.5);
        let max = Vec3::new(0.5, 3.0, 0.5);
        assert!(aabb_brush_collision(min, max, Vec3::new(0.0, -0.5, 0.0), &brush).is_none());
    }

    #[test]
    fn falling_onto_floor_yields_up_normal() {
        let brush = floor_brush();
        let min = Vec3::new(-0.5, 0.1, -0.5);
        let max = Vec3::new(0.5, 1.1, 0.5);
        let normal = aabb_brush_collision(min, max, Vec3::new(0.0, -0.3, 0.0), &brush)
            .expect("box sinks into the floor");
        assert_eq!(normal, Vec3::new(0.0, 1.0, 0.0));
        assert!((normal.length() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn walking_into_wall_yields_side_normal() {
        let wall = Brush::new(
            Vec3::new(5.0, 0.0, -10.0),
            Vec3::new(6.0, 10.0, 10.0),
            Vec3::ONE,
        );
        let min = Vec3::new(4.3, 1.0, -0.5);
        let max = Vec3::new(4.9, 2.0, 0.5);
        let normal = aabb_brush_collision(min, max, Vec3::new(0.3, 0.0, 0.0), &wall)
            .expect("box pushes into the wall");
        assert_eq!(normal, Vec3::new(-1.0, 0.0, 0.0));
    }

    fn scene_with_wall_portal() -> (Scene, Brush) {
        let wall = Brush::new(
            Vec3::new(-10.0, -10.0, -1.0),
            Vec3::new(10.0, 10.0, 0.0),
            Vec3::ONE,
        );
        let mut scene = Scene::new(Vec3::Y, vec![wall]);
        let mut p1 = Portal::closed();
        p1.open = true;
        p1.position = Vec3::new(0.0, 1.0, 0.01);
        p1.normal = Vec3::Z;
        p1.brush = Some(0);
        scene.portal1 = p1;
        let mut p2 = Portal::closed();
        p2.open = true;
        p2.position = Vec3::new(5.0, 1.0, 0.01);
        p2.normal = Vec3::Z;
        p2.brush = Some(0);
        scene.portal2 = p2;
        (scene, wall)
    }

    #[test]
    fn open_portal_excuses_collision_within_its_width() {
        let (scene, _) = scene_with_wall_portal();
        let center = Vec3::new(0.2, 1.0, 0.3);
        assert!(collision_excused_by_portal(&scene, 0, Vec3::Z, center));
    }

    #[test]
    fn same_face_away_from_portal_stays_solid() {
        let (scene, _) = scene_with_wall_portal();
        let center = Vec3::new(-8.0, 1.0, 0.3);
        assert!(!collision_excused_by_portal(&scene, 0, Vec3::Z, center));
    }

    #[test]
    fn closed_portals_excuse_nothing() {
        let (mut scene, _) = scene_with_wall_portal();
        scene.portal2.open = false;
        let center = Vec3::new(0.2, 1.0, 0.3);
        assert!(!collision_excused_by_portal(&scene, 0, Vec3::Z, center));
    }

    #[test]
    fn mismatched_normal_is_not_excused() {
        let (scene, _) = scene_with_wall_portal();
        let center = Vec3::new(0.2, 1.0, 0.3);
        assert!(!collision_excused_by_portal(&scene, 0, Vec3::X, center));
    }
}
