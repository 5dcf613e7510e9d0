// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

use std::collections::HashMap;

use tracing::{
    debug,
    trace,
};

use crate::{
    index::Building,
    material::MaterialSlot,
    scene::{
        NodeKey,
        SceneGraph,
    },
};

/// Original materials of one building, by surface.
type Snapshot = HashMap<NodeKey, MaterialSlot>;

/// Keeps a private copy of each building's materials as they were before the
/// first highlight touched them.
///
/// A snapshot is taken at most once per building root and never overwritten,
/// so repeated highlights can't capture an already highlighted material.
#[derive(Debug, Default)]
pub struct MaterialVault {
    snapshots: HashMap<NodeKey, Snapshot>,
}

impl MaterialVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copies the current materials of every surface under `building`.
    /// Returns `false` if a snapshot already exists or the building is gone.
    pub fn snapshot(
        &mut self,
        scene: &SceneGraph,
        building: Building,
    ) -> bool {
        if self.snapshots.contains_key(&building.root) {
            trace!(building = %building.id, "Snapshot already taken");
            return false;
        }
        if scene.node(building.root).is_none() {
            debug!(building = %building.id, "Building no longer in scene, nothing to snapshot");
            return false;
        }

        let mut snapshot = Snapshot::new();
        scene.traverse(building.root, |key, node| {
            if let Some(mesh) = &node.mesh {
                snapshot.insert(key, mesh.material.clone());
            }
        });

        debug!(building = %building.id, surfaces = snapshot.len(), "Materials snapshotted");
        self.snapshots.insert(building.root, snapshot);
        true
    }

    /// Puts a fresh copy of each stored original back on its surface.
    /// Returns how many surfaces were restored, zero without a snapshot.
    pub fn restore(
        &self,
        scene: &mut SceneGraph,
        building: Building,
    ) -> usize {
        let Some(snapshot) = self.snapshots.get(&building.root) else {
            trace!(building = %building.id, "No snapshot to restore");
            return 0;
        };

        let mut restored = 0;
        scene.traverse_mut(building.root, |key, node| {
            let (Some(mesh), Some(original)) = (node.mesh.as_mut(), snapshot.get(&key)) else {
                return;
            };
            mesh.material = original.clone();
            restored += 1;
        });

        debug!(building = %building.id, surfaces = restored, "Materials restored");
        restored
    }

    #[cfg(test)]
    pub fn contains(
        &self,
        building: Building,
    ) -> bool {
        self.snapshots.contains_key(&building.root)
    }

    /// The stored original for one surface of `building`.
    #[cfg(test)]
    pub fn original(
        &self,
        building: Building,
        surface: NodeKey,
    ) -> Option<&MaterialSlot> {
        self.snapshots.get(&building.root)?.get(&surface)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        fixture,
        index::{
            index_buildings,
            BuildingId,
        },
        material::color_from_hex,
    };

    fn surface_material(
        scene: &SceneGraph,
        surface: NodeKey,
    ) -> MaterialSlot {
        scene
            .node(surface)
            .and_then(|node| node.mesh.as_ref())
            .map(|mesh| mesh.material.clone())
            .expect("surface has a mesh")
    }

    fn tint(
        scene: &mut SceneGraph,
        surface: NodeKey,
    ) {
        let mesh = scene
            .node_mut(surface)
            .and_then(|node| node.mesh.as_mut())
            .expect("surface has a mesh");
        for material in mesh.material.iter_mut() {
            if let Some(standard) = material.as_standard_mut() {
                standard.color = color_from_hex(0x00_ff00);
            }
        }
    }

    #[test]
    fn snapshot_is_idempotent() {
        let mut city = fixture::city();
        let index = index_buildings(&mut city.scene);
        let building = index.get(BuildingId::Hyperviseur).expect("indexed");
        let before = surface_material(&city.scene, city.hyperviseur_walls);

        let mut vault = MaterialVault::new();
        assert!(vault.snapshot(&city.scene, building));

        // Mutate, then snapshot again: the stored original must not move
        tint(&mut city.scene, city.hyperviseur_walls);
        assert!(!vault.snapshot(&city.scene, building));

        assert_eq!(vault.len(), 1);
        assert_eq!(vault.original(building, city.hyperviseur_walls), Some(&before));
    }

    #[test]
    fn restore_brings_back_snapshot_time_materials() {
        let mut city = fixture::city();
        let index = index_buildings(&mut city.scene);
        let building = index.get(BuildingId::Laboratoire).expect("indexed");
        let before = surface_material(&city.scene, city.laboratoire_walls);

        let mut vault = MaterialVault::new();
        vault.snapshot(&city.scene, building);
        tint(&mut city.scene, city.laboratoire_walls);
        assert_ne!(surface_material(&city.scene, city.laboratoire_walls), before);

        // Walls and sign
        assert_eq!(vault.restore(&mut city.scene, building), 2);
        assert_eq!(surface_material(&city.scene, city.laboratoire_walls), before);

        // The stored copy is not aliased by what was handed back
        tint(&mut city.scene, city.laboratoire_walls);
        assert_eq!(vault.original(building, city.laboratoire_walls), Some(&before));
    }

    #[test]
    fn restore_without_snapshot_is_a_no_op() {
        let mut city = fixture::city();
        let index = index_buildings(&mut city.scene);
        let building = index.get(BuildingId::Parking).expect("indexed");
        tint(&mut city.scene, city.parking_walls);
        let tinted = surface_material(&city.scene, city.parking_walls);

        let vault = MaterialVault::new();
        assert_eq!(vault.restore(&mut city.scene, building), 0);
        assert_eq!(surface_material(&city.scene, city.parking_walls), tinted);
    }

    #[test]
    fn removed_building_is_not_snapshotted() {
        let mut city = fixture::city();
        let index = index_buildings(&mut city.scene);
        let building = index.get(BuildingId::Parking).expect("indexed");
        city.scene.remove_subtree(building.root);

        let mut vault = MaterialVault::new();
        assert!(!vault.snapshot(&city.scene, building));
        assert!(!vault.contains(building));
        assert_eq!(vault.restore(&mut city.scene, building), 0);
    }
}
