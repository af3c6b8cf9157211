// src/engine_lib/camera.rs

use glam::{Mat4, Vec3, Vec4Swizzles};

/// First-person camera. Orientation is stored as yaw/pitch in degrees; the
/// world transform and view matrix are derived on demand. Teleporting
/// through a portal goes the other way: compute the teleported transform
/// with `pcam_transform`, then `set_transform` decomposes it back into
/// yaw/pitch/position.
#[derive(Clone, Copy, Debug)]
pub struct Camera {
    pub position: Vec3,
    pub yaw: f32,
    pub pitch: f32,
}

impl Camera {
    pub fn new(position: Vec3, yaw: f32, pitch: f32) -> Self {
        Self { position, yaw, pitch }
    }

    pub fn forward_direction(&self) -> Vec3 {
        let yaw = self.yaw.to_radians();
        let pitch = self.pitch.to_radians();
        Vec3::new(
            -yaw.sin() * pitch.cos(),
            pitch.sin(),
            -yaw.cos() * pitch.cos(),
        )
    }

    /// Forward projected onto the horizontal plane, for ground movement
    /// input.
    pub fn pitchless_forward_direction(&self) -> Vec3 {
        let yaw = self.yaw.to_radians();
        Vec3::new(-yaw.sin(), 0.0, -yaw.cos())
    }

    pub fn right_direction(&self) -> Vec3 {
        self.forward_direction().cross(Vec3::Y)
    }

    /// World transform: translation, then yaw about Y, then pitch about X.
    pub fn transform(&self) -> Mat4 {
        Mat4::from_translation(self.position)
            * Mat4::from_rotation_y(self.yaw.to_radians())
            * Mat4::from_rotation_x(self.pitch.to_radians())
    }

    /// Inverse of `transform`, built directly from yaw/pitch/position.
    pub fn view(&self) -> Mat4 {
        Mat4::from_rotation_x(-self.pitch.to_radians())
            * Mat4::from_rotation_y(-self.yaw.to_radians())
            * Mat4::from_translation(-self.position)
    }

    /// Decompose a yaw-pitch rigid transform back into this camera's
    /// yaw/pitch/position. Only valid for matrices of the exact
    /// `T·Ry·Rx` shape `transform` produces (which is what the portal
    /// transforms hand back).
    pub fn set_transform(&mut self, transform: Mat4) {
        let cos_yaw = transform.x_axis.x.clamp(-1.0, 1.0);
        let cos_pitch = transform.y_axis.y.clamp(-1.0, 1.0);
        self.yaw = -transform.x_axis.z.signum() * cos_yaw.acos().to_degrees();
        self.pitch = -transform.z_axis.y.signum() * cos_pitch.acos().to_degrees();
        self.position = transform.w_axis.xyz();
    }
}
