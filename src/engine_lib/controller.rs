// src/engine_lib/controller.rs

use glam::Vec3;
use log::{debug, info};
use winit::{
    event::{DeviceEvent, ElementState, MouseButton, WindowEvent},
    keyboard::{KeyCode, PhysicalKey},
    window::{CursorGrabMode, Window},
};

use crate::engine_lib::camera::Camera;
use crate::engine_lib::cubes::HOLDING_DISTANCE;
use crate::engine_lib::intersection::raycast;
use crate::engine_lib::movement::{scene_aware_movement, GRAVITY};
use crate::engine_lib::portal::place_portal;
use crate::engine_lib::scene_types::Scene;

const MOVE_SPEED: f32 = 5.0;
const JUMP_SPEED: f32 = 6.0;
/// Degrees of look per mouse count.
const MOUSE_SENSITIVITY: f32 = 0.08;
const PITCH_LIMIT: f32 = 89.0;
const GRAB_RANGE: f32 = HOLDING_DISTANCE + 1.0;

/// Turns window/device input into per-frame camera displacements, portal
/// shots and cube grabs. Owns the player's vertical velocity; the movement
/// orchestrator only resolves geometry.
pub struct PlayerController {
    forward_input: f32,
    strafe_input: f32,
    jump_held: bool,

    mouse_dx_accum: f32,
    mouse_dy_accum: f32,

    fire_portal1: bool,
    fire_portal2: bool,
    toggle_grab: bool,

    vertical_velocity: f32,
    on_ground: bool,

    pub cursor_grabbed: bool,
}

impl PlayerController {
    pub fn new(initial_grab: bool) -> Self {
        Self {
            forward_input: 0.0,
            strafe_input: 0.0,
            jump_held: false,
            mouse_dx_accum: 0.0,
            mouse_dy_accum: 0.0,
            fire_portal1: false,
            fire_portal2: false,
            toggle_grab: false,
            vertical_velocity: 0.0,
            on_ground: false,
            cursor_grabbed: initial_grab,
        }
    }

    pub fn handle_window_event(&mut self, event: &WindowEvent, window: &Window) -> bool {
        match event {
            WindowEvent::KeyboardInput { event: key_event, .. } => {
                if key_event.state == ElementState::Pressed
                    && key_event.physical_key == PhysicalKey::Code(KeyCode::Escape)
                {
                    self.toggle_cursor_grab(window);
                    return true;
                }
                let pressed = key_event.state == ElementState::Pressed;
                let axis = if pressed { 1.0 } else { 0.0 };
                match key_event.physical_key {
                    PhysicalKey::Code(KeyCode::KeyW) => {
                        self.forward_input = axis;
                        true
                    }
                    PhysicalKey::Code(KeyCode::KeyS) => {
                        self.forward_input = -axis;
                        true
                    }
                    PhysicalKey::Code(KeyCode::KeyA) => {
                        self.strafe_input = -axis;
                        true
                    }
                    PhysicalKey::Code(KeyCode::KeyD) => {
                        self.strafe_input = axis;
                        true
                    }
                    PhysicalKey::Code(KeyCode::Space) => {
                        self.jump_held = pressed;
                        true
                    }
                    PhysicalKey::Code(KeyCode::KeyE) => {
                        if pressed && !key_event.repeat {
                            self.toggle_grab = true;
                        }
                        true
                    }
                    _ => false,
                }
            }
            WindowEvent::MouseInput { state, button, .. } => {
                if *state != ElementState::Pressed {
                    return false;
                }
                if !self.cursor_grabbed {
                    if *button == MouseButton::Left {
                        self.grab_cursor(window, true);
                        return true;
                    }
                    return false;
                }
                match button {
                    MouseButton::Left => {
                        self.fire_portal1 = true;
                        true
                    }
                    MouseButton::Right => {
                        self.fire_portal2 = true;
                        true
                    }
                    _ => false,
                }
            }
            WindowEvent::Focused(focused) => {
                if !*focused && self.cursor_grabbed {
                    self.grab_cursor(window, false);
                }
                false
            }
            _ => false,
        }
    }

    pub fn handle_device_event(&mut self, event: &DeviceEvent) {
        if !self.cursor_grabbed {
            self.mouse_dx_accum = 0.0;
            self.mouse_dy_accum = 0.0;
            return;
        }
        if let DeviceEvent::MouseMotion { delta: (dx, dy) } = event {
            self.mouse_dx_accum += *dx as f32;
            self.mouse_dy_accum += *dy as f32;
        }
    }

    pub fn toggle_cursor_grab(&mut self, window: &Window) {
        self.grab_cursor(window, !self.cursor_grabbed);
    }

    fn grab_cursor(&mut self, window: &Window, grab: bool) {
        if grab && !self.cursor_grabbed {
            if window
                .set_cursor_grab(CursorGrabMode::Confined)
                .or_else(|_e| window.set_cursor_grab(CursorGrabMode::Locked))
                .is_ok()
            {
                window.set_cursor_visible(false);
                self.cursor_grabbed = true;
            } else {
                log::warn!("could not grab cursor");
            }
        } else if !grab && self.cursor_grabbed {
            if window.set_cursor_grab(CursorGrabMode::None).is_ok() {
                window.set_cursor_visible(true);
                self.cursor_grabbed = false;
                self.mouse_dx_accum = 0.0;
                self.mouse_dy_accum = 0.0;
            } else {
                log::warn!("could not ungrab cursor");
            }
        }
    }

    /// Runs one frame of player simulation: mouse look, walk/jump/gravity
    /// through the movement orchestrator, then any queued portal shots and
    /// grab toggles.
    pub fn update(&mut self, scene: &mut Scene, cam: &mut Camera, dt: f32) {
        cam.yaw -= self.mouse_dx_accum * MOUSE_SENSITIVITY;
        cam.pitch -= self.mouse_dy_accum * MOUSE_SENSITIVITY;
        cam.pitch = cam.pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);
        self.mouse_dx_accum = 0.0;
        self.mouse_dy_accum = 0.0;

        self.vertical_velocity += GRAVITY * dt;
        if self.jump_held && self.on_ground {
            self.vertical_velocity = JUMP_SPEED;
        }

        let walk = cam.pitchless_forward_direction() * self.forward_input
            + cam.right_direction() * self.strafe_input;
        let walk = walk.normalize_or_zero() * MOVE_SPEED;
        let translation = (walk + Vec3::Y * self.vertical_velocity) * dt;

        self.on_ground = scene_aware_movement(cam, translation, scene);
        if self.on_ground && self.vertical_velocity < 0.0 {
            self.vertical_velocity = 0.0;
        }

        if self.fire_portal1 {
            self.fire_portal1 = false;
            fire_portal(scene, cam, true);
        }
        if self.fire_portal2 {
            self.fire_portal2 = false;
            fire_portal(scene, cam, false);
        }
        if self.toggle_grab {
            self.toggle_grab = false;
            toggle_cube_grab(scene, cam);
        }
    }
}

fn fire_portal(scene: &mut Scene, cam: &Camera, first_slot: bool) {
    let Some(hit) = raycast(scene, cam.position, cam.forward_direction()) else {
        debug!("portal shot hit nothing");
        return;
    };
    let time = scene.time;
    let portal = if first_slot {
        &mut scene.portal1
    } else {
        &mut scene.portal2
    };
    if place_portal(portal, &hit, time) {
        info!(
            "placed portal {} on brush {} at {:?}",
            if first_slot { 1 } else { 2 },
            hit.brush,
            portal.position
        );
    } else {
        debug!("portal placement refused: face too small");
    }
}

fn toggle_cube_grab(scene: &mut Scene, cam: &Camera) {
    if let Some(cube) = scene.cubes.iter_mut().find(|c| c.grabbed) {
        cube.grabbed = false;
        info!("released cube");
        return;
    }

    let mut best: Option<(usize, f32)> = None;
    for (i, cube) in scene.cubes.iter().enumerate() {
        let dist = cam.position.distance(cube.position);
        if dist < GRAB_RANGE && best.map_or(true, |(_, d)| dist < d) {
            best = Some((i, dist));
        }
    }
    if let Some((i, _)) = best {
        scene.cubes[i].grabbed = true;
        info!("grabbed cube {}", i);
    }
}
