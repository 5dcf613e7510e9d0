// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

mod fixed;

pub use fixed::{
    Static,
    StaticBuilder,
};
use glam::Vec3A;

use crate::render::{
    Object,
    Ray,
};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub max: Vec3A,
    pub min: Vec3A,
}

impl BoundingBox {
    pub const fn new() -> Self {
        Self {
            max: Vec3A::splat(f32::MIN),
            min: Vec3A::splat(f32::MAX),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.min.cmpgt(self.max).any()
    }

    /// Slab test. Returns the entry distance along the ray, clamped to the
    /// ray origin.
    #[inline]
    pub fn intersects(
        &self,
        ray: &Ray,
    ) -> Option<f32> {
        let to_min = (self.min - ray.origin) * ray.inv_dir;
        let to_max = (self.max - ray.origin) * ray.inv_dir;

        let tmin = to_min.min(to_max).max_element().max(0.0);
        let tmax = to_min.max(to_max).min_element();

        if tmin > tmax {
            None
        } else {
            Some(tmin)
        }
    }

    #[inline]
    pub fn grow_to_include_point(
        &mut self,
        point: Vec3A,
    ) {
        self.max = self.max.max(point);
        self.min = self.min.min(point);
    }

    pub fn grow_to_include(
        &mut self,
        object: &Object,
    ) {
        match object {
            Object::Sphere { center, radius } => {
                self.grow_to_include_point(*center - Vec3A::splat(*radius));
                self.grow_to_include_point(*center + Vec3A::splat(*radius));
            },
            Object::Triangle { a, b, c } => {
                self.grow_to_include_point(*a);
                self.grow_to_include_point(*b);
                self.grow_to_include_point(*c);
            },
        }
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}
