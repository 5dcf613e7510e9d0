// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

use glam::{
    Affine3A,
    Vec2,
};
use tracing::trace;

use crate::{
    camera::Camera,
    index::{
        find_building_root,
        Building,
    },
    render::{
        Ray,
        FULL_RANGE,
    },
    scene::{
        NodeKey,
        SceneGraph,
    },
};

/// Cursor the host should show for the current hover.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum CursorAffordance {
    #[default]
    Default,
    Interactive,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Intersection {
    pub distance: f32,
    pub node:     NodeKey,
    pub material: usize,
}

/// Scene ray caster. Keeps its scratch buffers between casts, they only ever
/// grow to the size of the scene.
#[derive(Debug, Default)]
pub struct Raycaster {
    nodes:     Vec<(NodeKey, Affine3A)>,
    bvh_stack: Vec<u32>,
    hits:      Vec<Intersection>,
}

impl Raycaster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Nearest hit of every visible mesh, nearest first. Hidden nodes hide
    /// their whole subtree.
    pub fn cast(
        &mut self,
        scene: &SceneGraph,
        ray: &Ray,
    ) -> &[Intersection] {
        self.hits.clear();
        self.nodes.clear();
        self.nodes.push((scene.root(), Affine3A::IDENTITY));

        while let Some((key, parent_world)) = self.nodes.pop() {
            let Some(node) = scene.node(key) else {
                continue;
            };
            if !node.visible {
                continue;
            }

            let world = parent_world * node.transform;
            if let Some(mesh) = &node.mesh {
                let local_ray = ray.to_local(&world);
                if let Some((hit, material)) =
                    mesh.geometry
                        .hit_scene(&local_ray, FULL_RANGE, &mut self.bvh_stack)
                {
                    self.hits.push(Intersection {
                        distance: hit.along,
                        node: key,
                        material,
                    });
                }
            }

            self.nodes
                .extend(node.children().iter().rev().map(|child| (*child, world)));
        }

        self.hits
            .sort_unstable_by(|l, r| l.distance.total_cmp(&r.distance));
        &self.hits
    }

    pub fn intersections(&self) -> &[Intersection] {
        &self.hits
    }
}

/// The first building found walking the hits nearest first. Hits on scenery
/// that belongs to no building are looked through.
pub fn pick_building(
    scene: &SceneGraph,
    raycaster: &mut Raycaster,
    ray: &Ray,
) -> Option<Building> {
    raycaster
        .cast(scene, ray)
        .iter()
        .find_map(|hit| find_building_root(scene, hit.node))
}

/// Per-frame hover resolution. Nothing carries over from the previous frame
/// except the scratch buffers.
#[derive(Debug, Default)]
pub struct PickingLoop {
    raycaster:  Raycaster,
    hovered:    Option<Building>,
    affordance: CursorAffordance,
}

impl PickingLoop {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn tick(
        &mut self,
        scene: &SceneGraph,
        camera: &Camera,
        pointer: Vec2,
    ) -> CursorAffordance {
        let ray = camera.ray_from_ndc(pointer);
        self.hovered = pick_building(scene, &mut self.raycaster, &ray);
        self.affordance = if self.hovered.is_some() {
            CursorAffordance::Interactive
        } else {
            CursorAffordance::Default
        };

        trace!(
            hovered = ?self.hovered.map(|building| building.id),
            hits = self.raycaster.intersections().len(),
            "Picked"
        );
        self.affordance
    }

    pub const fn hovered(&self) -> Option<Building> {
        self.hovered
    }

    pub const fn affordance(&self) -> CursorAffordance {
        self.affordance
    }

    pub fn clear(&mut self) {
        self.hovered = None;
        self.affordance = CursorAffordance::Default;
    }
}
