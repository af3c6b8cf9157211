// src/engine_lib/mod.rs

pub mod camera;
pub mod collision;
pub mod controller;
pub mod cubes;
pub mod intersection;
pub mod movement;
pub mod portal;
pub mod scene_loader;
pub mod scene_types;

pub use camera::Camera;
pub use controller::PlayerController;
pub use scene_types::{Brush, BrushId, Cube, Portal, Scene};
