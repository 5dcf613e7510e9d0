// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

use std::ops::{
    Bound,
    RangeBounds,
};

use glam::Vec3A;

use super::BoundingBox;
use crate::render::{
    HitRecord,
    Object,
    Ray,
    SearchRange,
};

// Corner indices are `x | y << 1 | z << 2`, each quad wound around its face
const CUBOID_FACES: [[usize; 4]; 6] = [
    [0, 1, 3, 2],
    [4, 5, 7, 6],
    [0, 2, 6, 4],
    [1, 3, 7, 5],
    [0, 1, 5, 4],
    [2, 3, 7, 6],
];

/// Collects primitives (each tagged with an index into its surface's material
/// slot) and builds a [`Static`] BVH over them.
pub struct StaticBuilder {
    objects:     Vec<(Object, usize)>,
    root_bounds: BoundingBox,
}

impl StaticBuilder {
    const BVH_MAX_LEAF: u32 = 4;

    pub const fn new() -> Self {
        Self {
            objects:     Vec::new(),
            root_bounds: BoundingBox::new(),
        }
    }

    pub fn append(
        &mut self,
        object: Object,
        material: usize,
    ) -> &mut Self {
        self.root_bounds.grow_to_include(&object);
        self.objects.push((object, material));
        self
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn build(mut self) -> Static {
        if self.objects.is_empty() {
            return Static {
                objects:   Vec::new(),
                tree:      Vec::new(),
                max_depth: 0,
            };
        }

        // Top-down: split each node along the longest axis of its centroids
        let mut tree = vec![BvhNode {
            bounds:  self.root_bounds,
            objects: u32::try_from(self.objects.len()).expect("Mesh too large"),
            index:   0,
        }];

        let mut leaves = 0usize;
        let mut max_depth = 0usize;

        let mut pending = vec![(0usize, 0usize)];
        while let Some((idx, depth)) = pending.pop() {
            let BvhNode { objects, index, .. } = tree[idx];
            max_depth = max_depth.max(depth);
            if objects <= Self::BVH_MAX_LEAF {
                leaves += 1;
                continue;
            }

            let slice = &mut self.objects[index as usize..(index + objects) as usize];

            let mut centroids = BoundingBox::new();
            for (object, _) in slice.iter() {
                centroids.grow_to_include_point(object.center());
            }
            let extent = centroids.max - centroids.min;
            let axis = if extent.x >= extent.y && extent.x >= extent.z {
                0
            } else if extent.y >= extent.z {
                1
            } else {
                2
            };
            let split = (centroids.min[axis] + centroids.max[axis]) * 0.5;

            let mut part_point = 0usize;
            for i in 0..slice.len() {
                if slice[i].0.center()[axis] < split {
                    slice.swap(part_point, i);
                    part_point += 1;
                }
            }

            if part_point == 0 || part_point == slice.len() {
                // Centroids coincide along the axis, fall back to a median split
                slice.sort_unstable_by(|(l, _), (r, _)| {
                    l.center()[axis].total_cmp(&r.center()[axis])
                });
                part_point = slice.len() / 2;
            }

            let mut left = BoundingBox::new();
            for (object, _) in &slice[..part_point] {
                left.grow_to_include(object);
            }
            let mut right = BoundingBox::new();
            for (object, _) in &slice[part_point..] {
                right.grow_to_include(object);
            }

            let left_objects = u32::try_from(part_point).expect("Mesh too large");
            let first_child = u32::try_from(tree.len()).expect("BVH too large");

            pending.push((tree.len(), depth + 1));
            pending.push((tree.len() + 1, depth + 1));

            tree.push(BvhNode {
                bounds:  left,
                objects: left_objects,
                index,
            });
            tree.push(BvhNode {
                bounds:  right,
                objects: objects - left_objects,
                index:   index + left_objects,
            });

            tree[idx].index = first_child;
            tree[idx].objects = 0;
        }

        tracing::trace!(
            nodes = tree.len(),
            leaves,
            max_depth,
            primitives = self.objects.len(),
            "BVH built"
        );

        Static {
            objects: self.objects,
            tree,
            max_depth,
        }
    }
}

impl Default for StaticBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Clone, Copy, Debug)]
struct BvhNode {
    bounds:  BoundingBox,
    // Leaf when non-zero, otherwise `index` points at the left child
    objects: u32,
    index:   u32,
}

#[derive(Debug)]
pub struct Static {
    objects:   Vec<(Object, usize)>,
    tree:      Vec<BvhNode>,
    max_depth: usize,
}

impl Static {
    /// Axis aligned box made of twelve triangles, all using `material`.
    pub fn cuboid(
        min: Vec3A,
        max: Vec3A,
        material: usize,
    ) -> Self {
        let corner = |i: usize| {
            Vec3A::new(
                if i & 1 == 0 { min.x } else { max.x },
                if i & 2 == 0 { min.y } else { max.y },
                if i & 4 == 0 { min.z } else { max.z },
            )
        };

        let mut builder = StaticBuilder::new();
        for [p, q, r, s] in CUBOID_FACES {
            builder.append(
                Object::Triangle {
                    a: corner(p),
                    b: corner(q),
                    c: corner(r),
                },
                material,
            );
            builder.append(
                Object::Triangle {
                    a: corner(p),
                    b: corner(r),
                    c: corner(s),
                },
                material,
            );
        }
        builder.build()
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    pub fn bounds(&self) -> BoundingBox {
        self.tree.first().map_or_else(BoundingBox::new, |root| root.bounds)
    }

    pub const fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Closest hit within `search_range`, with the material index of the
    /// primitive that was hit. `stack` is scratch space and is cleared first.
    pub fn hit_scene(
        &self,
        ray: &Ray,
        mut search_range: SearchRange,
        stack: &mut Vec<u32>,
    ) -> Option<(HitRecord, usize)> {
        let root = self.tree.first()?;
        if !search_range.contains(&root.bounds.intersects(ray)?) {
            return None;
        }

        let mut closest = None;

        stack.clear();
        stack.push(0);
        while let Some(next_search) = stack.pop() {
            let node = &self.tree[next_search as usize];
            let index = node.index as usize;

            if node.objects > 0 {
                for (object, material) in &self.objects[index..index + node.objects as usize] {
                    let Some(hit) = object.hit(ray, search_range) else {
                        continue;
                    };
                    search_range.1 = Bound::Included(hit.along);
                    closest = Some((hit, *material));
                }
                continue;
            }

            // Push the far child first so the near one gets popped next
            let left = node.index;
            let right = node.index + 1;
            match (
                self.entry(left, ray, search_range),
                self.entry(right, ray, search_range),
            ) {
                (Some(l), Some(r)) if l <= r => stack.extend([right, left]),
                (Some(_), Some(_)) => stack.extend([left, right]),
                (Some(_), None) => stack.push(left),
                (None, Some(_)) => stack.push(right),
                (None, None) => {},
            }
        }

        closest
    }

    fn entry(
        &self,
        node: u32,
        ray: &Ray,
        search_range: SearchRange,
    ) -> Option<f32> {
        let along = self.tree[node as usize].bounds.intersects(ray)?;
        search_range.contains(&along).then_some(along)
    }
}
