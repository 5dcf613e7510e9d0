// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

use std::ops::{
    Bound,
    RangeBounds,
};

use glam::{
    Affine3A,
    Vec3A,
};

/// Determinants below this are treated as a ray parallel to the triangle.
const PARALLEL_EPSILON: f32 = 1e-12;

#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin:    Vec3A,
    pub direction: Vec3A,
    pub inv_dir:   Vec3A,
}

impl Ray {
    pub fn new(
        origin: Vec3A,
        direction: Vec3A,
    ) -> Self {
        Self {
            origin,
            direction,
            inv_dir: direction.recip(),
        }
    }

    #[inline]
    pub fn at(
        &self,
        along: f32,
    ) -> Vec3A {
        self.origin + self.direction * along
    }

    /// Moves the ray into the space described by `transform`'s inverse.
    ///
    /// The direction is not renormalized, so `along` values measured in local
    /// space are the world space ones.
    pub fn to_local(
        &self,
        world_from_local: &Affine3A,
    ) -> Self {
        let local_from_world = world_from_local.inverse();
        Self::new(
            local_from_world.transform_point3a(self.origin),
            local_from_world.transform_vector3a(self.direction),
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitRecord {
    pub along:  f32,
    pub normal: Vec3A,
}

pub type SearchRange = (Bound<f32>, Bound<f32>);

pub const FULL_RANGE: SearchRange = (Bound::Included(0.0), Bound::Unbounded);

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Object {
    Sphere { center: Vec3A, radius: f32 },
    Triangle { a: Vec3A, b: Vec3A, c: Vec3A },
}

impl Object {
    pub fn center(&self) -> Vec3A {
        match self {
            Self::Sphere { center, radius: _ } => *center,
            Self::Triangle { a, b, c } => (*a + *b + *c) / 3.0,
        }
    }

    pub fn hit(
        &self,
        ray: &Ray,
        search_range: SearchRange,
    ) -> Option<HitRecord> {
        match *self {
            Self::Sphere { center, radius } => hit_sphere(ray, search_range, center, radius),
            Self::Triangle { a, b, c } => hit_triangle(ray, search_range, a, b, c),
        }
    }
}

fn hit_sphere(
    ray: &Ray,
    search_range: SearchRange,
    center: Vec3A,
    radius: f32,
) -> Option<HitRecord> {
    let offset_origin = center - ray.origin;
    let a = ray.direction.length_squared();
    let h = ray.direction.dot(offset_origin);
    let c = radius.mul_add(-radius, offset_origin.length_squared());

    let discrim = h.mul_add(h, -(a * c));
    if discrim < 0.0 {
        return None;
    }

    let sqrt_d = discrim.sqrt();
    let mut root = (h - sqrt_d) / a;
    if !search_range.contains(&root) {
        root = (h + sqrt_d) / a;
        if !search_range.contains(&root) {
            return None;
        }
    }

    Some(HitRecord {
        along:  root,
        normal: (ray.at(root) - center) / radius,
    })
}

// Moller-Trumbore, double sided
fn hit_triangle(
    ray: &Ray,
    search_range: SearchRange,
    a: Vec3A,
    b: Vec3A,
    c: Vec3A,
) -> Option<HitRecord> {
    let edge_ab = b - a;
    let edge_ac = c - a;

    let p = ray.direction.cross(edge_ac);
    let det = edge_ab.dot(p);
    if det.abs() < PARALLEL_EPSILON {
        return None;
    }
    let inv_det = det.recip();

    let s = ray.origin - a;
    let u = s.dot(p) * inv_det;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge_ab);
    let v = ray.direction.dot(q) * inv_det;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let along = edge_ac.dot(q) * inv_det;
    if !search_range.contains(&along) {
        return None;
    }

    let mut normal = edge_ab.cross(edge_ac).normalize_or_zero();
    if normal.dot(ray.direction) > 0.0 {
        normal = -normal;
    }

    Some(HitRecord { along, normal })
}

#[cfg(test)]
mod tests {
    use glam::Vec3;

    use super::*;

    fn unit_triangle() -> Object {
        Object::Triangle {
            a: Vec3A::new(-1.0, -1.0, 0.0),
            b: Vec3A::new(1.0, -1.0, 0.0),
            c: Vec3A::new(0.0, 1.0, 0.0),
        }
    }

    #[test]
    fn triangle_is_hit_from_both_sides() {
        let front = Ray::new(Vec3A::new(0.0, 0.0, 5.0), Vec3A::NEG_Z);
        let back = Ray::new(Vec3A::new(0.0, 0.0, -5.0), Vec3A::Z);

        let front_hit = unit_triangle().hit(&front, FULL_RANGE).expect("front hit");
        let back_hit = unit_triangle().hit(&back, FULL_RANGE).expect("back hit");

        assert!((front_hit.along - 5.0).abs() < 1e-5);
        assert!((back_hit.along - 5.0).abs() < 1e-5);
        assert!(front_hit.normal.dot(front.direction) < 0.0);
        assert!(back_hit.normal.dot(back.direction) < 0.0);
    }

    #[test]
    fn triangle_miss_outside_edges() {
        let ray = Ray::new(Vec3A::new(2.0, 0.0, 5.0), Vec3A::NEG_Z);
        assert!(unit_triangle().hit(&ray, FULL_RANGE).is_none());
    }

    #[test]
    fn triangle_behind_origin_is_ignored() {
        let ray = Ray::new(Vec3A::new(0.0, 0.0, -5.0), Vec3A::NEG_Z);
        assert!(unit_triangle().hit(&ray, FULL_RANGE).is_none());
    }

    #[test]
    fn sphere_reports_near_root() {
        let sphere = Object::Sphere {
            center: Vec3A::ZERO,
            radius: 1.0,
        };
        let ray = Ray::new(Vec3A::new(0.0, 0.0, 10.0), Vec3A::NEG_Z);
        let hit = sphere.hit(&ray, FULL_RANGE).expect("sphere hit");
        assert!((hit.along - 9.0).abs() < 1e-5);
        assert!((hit.normal - Vec3A::Z).length() < 1e-5);
    }

    #[test]
    fn local_ray_keeps_world_distances() {
        let world_from_local = Affine3A::from_scale_rotation_translation(
            Vec3::splat(2.0),
            glam::Quat::IDENTITY,
            Vec3::new(3.0, 0.0, 0.0),
        );
        let sphere = Object::Sphere {
            center: Vec3A::ZERO,
            radius: 1.0,
        };
        // World sphere: centered at x=3 with radius 2
        let ray = Ray::new(Vec3A::new(3.0, 0.0, 10.0), Vec3A::NEG_Z);
        let hit = sphere
            .hit(&ray.to_local(&world_from_local), FULL_RANGE)
            .expect("scaled sphere hit");
        assert!((hit.along - 8.0).abs() < 1e-4);
    }
}
