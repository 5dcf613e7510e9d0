// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

use glam::{
    Vec2,
    Vec3A,
};

use crate::{
    config::CAMERA_FOV,
    render::Ray,
};

/// Perspective camera. Only what picking needs: where it is, where it looks
/// and how wide it sees.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Camera {
    pub position: Vec3A,
    pub target:   Vec3A,
    pub up:       Vec3A,

    /// Vertical field of view, degrees
    pub fov_y:  f32,
    pub aspect: f32,
}

impl Camera {
    pub const fn new(
        position: Vec3A,
        target: Vec3A,
    ) -> Self {
        Self {
            position,
            target,
            up: Vec3A::Y,
            fov_y: CAMERA_FOV,
            aspect: 1.0,
        }
    }

    #[must_use]
    pub const fn with_aspect(
        mut self,
        aspect: f32,
    ) -> Self {
        self.aspect = aspect;
        self
    }

    #[must_use]
    pub const fn with_up(
        mut self,
        up: Vec3A,
    ) -> Self {
        self.up = up;
        self
    }

    #[must_use]
    pub const fn with_fov(
        mut self,
        fov_y: f32,
    ) -> Self {
        self.fov_y = fov_y;
        self
    }

    /// Ray through a pointer position in normalized device coordinates
    /// (x right, y up, both in `-1..=1`). The direction is unit length.
    pub fn ray_from_ndc(
        &self,
        ndc: Vec2,
    ) -> Ray {
        let half_height = (self.fov_y.to_radians() / 2.0).tan();
        let half_width = half_height * self.aspect;

        let focal_w = (self.position - self.target).normalize_or_zero();
        let focal_u = self.up.cross(focal_w).normalize_or_zero();
        let focal_v = focal_w.cross(focal_u);

        let direction =
            focal_u * (ndc.x * half_width) + focal_v * (ndc.y * half_height) - focal_w;
        Ray::new(self.position, direction.normalize_or_zero())
    }

    /// Center of pixel `pixel` on a `size` viewport, y growing downwards.
    pub fn ndc_from_pixel(
        pixel: Vec2,
        size: Vec2,
    ) -> Vec2 {
        let uv = (pixel + 0.5) / size;
        Vec2::new(uv.x.mul_add(2.0, -1.0), uv.y.mul_add(-2.0, 1.0))
    }
}
