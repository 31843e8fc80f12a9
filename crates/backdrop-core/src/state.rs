//! Camera and surface description shared by the CPU renderers and the web
//! frontend.
//!
//! These types avoid platform APIs so both the wasm renderer and the native
//! snapshot tool can build identical camera matrices.

use crate::constants::{MORPH_CAMERA_Z, MORPH_FOV_DEG, RAYMARCH_CAMERA_Z, RAYMARCH_FOV_DEG};
use glam::{Mat4, UVec2, Vec2, Vec3};

/// Simple right-handed camera description with perspective projection.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    pub aspect: f32,
    pub fovy_radians: f32,
    pub znear: f32,
    pub zfar: f32,
}

impl Camera {
    pub fn looking_at_origin(z: f32, fov_deg: f32, aspect: f32) -> Self {
        Self {
            eye: Vec3::new(0.0, 0.0, z),
            target: Vec3::ZERO,
            up: Vec3::Y,
            aspect,
            fovy_radians: fov_deg.to_radians(),
            znear: 0.1,
            zfar: 1000.0,
        }
    }

    /// Camera used by the ray-march variant.
    pub fn for_raymarch(aspect: f32) -> Self {
        Self::looking_at_origin(RAYMARCH_CAMERA_Z, RAYMARCH_FOV_DEG, aspect)
    }

    /// Camera used by the morph variant.
    pub fn for_morph(aspect: f32) -> Self {
        Self::looking_at_origin(MORPH_CAMERA_Z, MORPH_FOV_DEG, aspect)
    }

    /// Compute the clip-space projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fovy_radians, self.aspect, self.znear, self.zfar)
    }

    /// Compute the view matrix that transforms world to view space.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    /// Orthonormal `(right, up, back)` basis of the camera in world space.
    ///
    /// A view-space direction `(x, y, -f)` maps to world space as
    /// `right * x + up * y + back * -f`.
    pub fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let back = (self.eye - self.target).normalize_or_zero();
        let back = if back == Vec3::ZERO { Vec3::Z } else { back };
        let right = self.up.cross(back).normalize_or_zero();
        let right = if right == Vec3::ZERO { Vec3::X } else { right };
        let up = back.cross(right);
        (right, up, back)
    }

    /// World-space extent of the view frustum at `distance` in front of the eye.
    pub fn viewport_at_distance(&self, distance: f32) -> Vec2 {
        let h = 2.0 * distance * (self.fovy_radians * 0.5).tan();
        Vec2::new(h * self.aspect, h)
    }

    pub fn set_aspect_from(&mut self, size: UVec2) {
        self.aspect = aspect_of(size);
    }
}

#[inline]
pub fn aspect_of(size: UVec2) -> f32 {
    size.x.max(1) as f32 / size.y.max(1) as f32
}
