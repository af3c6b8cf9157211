// src/demo_scene.rs

use glam::Vec3;

use crate::engine_lib::scene_types::{Brush, Cube, Scene};

/// Builds the test chamber used when no scene file is given on the command
/// line: a floor slab, four surrounding walls big enough to hold portals,
/// a couple of platforms, and the seed cube.
pub fn create_demo_scene() -> Scene {
    let light_dir = Vec3::new(-0.801_783_7, 0.534_522_5, 0.267_261_24);

    let floor_color = Vec3::new(0.55, 0.55, 0.6);
    let wall_color = Vec3::new(0.75, 0.73, 0.68);
    let platform_color = Vec3::new(0.35, 0.45, 0.65);

    let brushes = vec![
        // Floor
        Brush::new(
            Vec3::new(-16.0, -1.0, -16.0),
            Vec3::new(16.0, 0.0, 16.0),
            floor_color,
        ),
        // Walls (x-, x+, z-, z+)
        Brush::new(
            Vec3::new(-17.0, 0.0, -16.0),
            Vec3::new(-16.0, 12.0, 16.0),
            wall_color,
        ),
        Brush::new(
            Vec3::new(16.0, 0.0, -16.0),
            Vec3::new(17.0, 12.0, 16.0),
            wall_color,
        ),
        Brush::new(
            Vec3::new(-16.0, 0.0, -17.0),
            Vec3::new(16.0, 12.0, -16.0),
            wall_color,
        ),
        Brush::new(
            Vec3::new(-16.0, 0.0, 16.0),
            Vec3::new(16.0, 12.0, 17.0),
            wall_color,
        ),
        // Platforms to jump and drop cubes from
        Brush::new(
            Vec3::new(-12.0, 0.0, -6.0),
            Vec3::new(-8.0, 2.0, -2.0),
            platform_color,
        ),
        Brush::new(
            Vec3::new(6.0, 0.0, 4.0),
            Vec3::new(12.0, 4.0, 8.0),
            platform_color,
        ),
    ];

    let mut scene = Scene::new(light_dir, brushes);
    scene
        .cubes
        .push(Cube::new(Vec3::new(-10.0, 10.0, 0.0), Vec3::new(1.0, 0.0, 0.0)));
    scene
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_scene_is_freshly_loaded_state() {
        let scene = create_demo_scene();
        assert!(!scene.brushes.is_empty());
        assert_eq!(scene.cubes.len(), 1);
        assert!(!scene.portal1.open);
        assert!(!scene.portal2.open);
        // Wall faces must be able to hold a default 2x2 portal footprint.
        let wall = &scene.brushes[1];
        assert!(wall.max.z - wall.min.z >= 2.0);
        assert!(wall.max.y - wall.min.y >= 2.0);
    }
}
