// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

use tracing::{
    debug,
    trace,
};

use crate::{
    config::{
        HIGHLIGHT_COLOR,
        HIGHLIGHT_INTENSITY,
    },
    index::Building,
    material::{
        color_from_hex,
        Color,
        Material,
    },
    scene::SceneGraph,
    vault::MaterialVault,
};

/// Emissive overlay for the selected building. Undoing it is the vault's job.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Highlighter {
    color:     Color,
    intensity: f32,
}

impl Highlighter {
    pub const fn new() -> Self {
        Self {
            color:     color_from_hex(HIGHLIGHT_COLOR),
            intensity: HIGHLIGHT_INTENSITY,
        }
    }

    /// Snapshots `building` if needed, then swaps every emissive capable
    /// material under it for an overlaid copy. Returns the number of
    /// materials overlaid.
    pub fn apply(
        &self,
        vault: &mut MaterialVault,
        scene: &mut SceneGraph,
        building: Building,
    ) -> usize {
        vault.snapshot(scene, building);

        let mut overlaid = 0usize;
        let mut skipped = 0usize;
        scene.traverse_mut(building.root, |key, node| {
            let Some(mesh) = node.mesh.as_mut() else {
                return;
            };
            for material in mesh.material.iter_mut() {
                let Some(standard) = material.as_standard() else {
                    trace!(surface = ?key, name = %node.name, "No emissive channel, left as is");
                    skipped += 1;
                    continue;
                };

                let mut overlay = standard.clone();
                overlay.emissive = self.color;
                overlay.emissive_intensity = self.intensity;
                overlay.version = overlay.version.wrapping_add(1);
                *material = Material::Standard(overlay);
                overlaid += 1;
            }
        });

        debug!(building = %building.id, overlaid, skipped, "Highlight applied");
        overlaid
    }

    /// Whether any material under `building` carries this overlay.
    #[cfg(test)]
    pub fn is_applied(
        &self,
        scene: &SceneGraph,
        building: Building,
    ) -> bool {
        let mut applied = false;
        scene.traverse(building.root, |_, node| {
            applied |= node.mesh.as_ref().is_some_and(|mesh| {
                mesh.material
                    .iter()
                    .filter_map(Material::as_standard)
                    .any(|standard| standard.emissive == self.color)
            });
        });
        applied
    }
}

impl Default for Highlighter {
    fn default() -> Self {
        Self::new()
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
        material::{
            MaterialSlot,
            BLACK,
        },
        scene::NodeKey,
    };

    fn materials(
        scene: &SceneGraph,
        surface: NodeKey,
    ) -> MaterialSlot {
        scene
            .node(surface)
            .and_then(|node| node.mesh.as_ref())
            .map(|mesh| mesh.material.clone())
            .expect("surface has a mesh")
    }

    #[test]
    fn apply_overlays_standard_and_skips_basic() {
        let mut city = fixture::city();
        let index = index_buildings(&mut city.scene);
        let laboratoire = index.get(BuildingId::Laboratoire).expect("indexed");
        let sign_before = materials(&city.scene, city.laboratoire_sign);

        let highlighter = Highlighter::new();
        let mut vault = MaterialVault::new();
        // Walls: one lit, one unlit. Sign: unlit.
        assert_eq!(highlighter.apply(&mut vault, &mut city.scene, laboratoire), 1);

        let MaterialSlot::Multi(walls) = materials(&city.scene, city.laboratoire_walls) else {
            panic!("walls keep their multi slot");
        };
        let lit = walls[0].as_standard().expect("first walls material is lit");
        assert_eq!(lit.emissive, color_from_hex(HIGHLIGHT_COLOR));
        assert!((lit.emissive_intensity - HIGHLIGHT_INTENSITY).abs() < f32::EPSILON);
        assert!(!walls[1].has_emissive());

        assert_eq!(materials(&city.scene, city.laboratoire_sign), sign_before);
        assert!(highlighter.is_applied(&city.scene, laboratoire));
    }

    #[test]
    fn apply_snapshots_before_mutating() {
        let mut city = fixture::city();
        let index = index_buildings(&mut city.scene);
        let hyperviseur = index.get(BuildingId::Hyperviseur).expect("indexed");
        let before = materials(&city.scene, city.hyperviseur_walls);

        let highlighter = Highlighter::new();
        let mut vault = MaterialVault::new();
        highlighter.apply(&mut vault, &mut city.scene, hyperviseur);
        highlighter.apply(&mut vault, &mut city.scene, hyperviseur);

        assert_eq!(vault.original(hyperviseur, city.hyperviseur_walls), Some(&before));
    }

    #[test]
    fn restore_after_apply_is_lossless() {
        let mut city = fixture::city();
        let index = index_buildings(&mut city.scene);
        let highlighter = Highlighter::new();
        let mut vault = MaterialVault::new();

        for building in index.buildings() {
            let mut before = Vec::new();
            city.scene.traverse(building.root, |key, node| {
                if let Some(mesh) = &node.mesh {
                    before.push((key, mesh.material.clone()));
                }
            });

            highlighter.apply(&mut vault, &mut city.scene, building);
            vault.restore(&mut city.scene, building);

            for (key, original) in before {
                let restored = materials(&city.scene, key);
                assert_eq!(restored, original, "{} not restored", building.id);
                for material in restored.iter().filter_map(Material::as_standard) {
                    assert_eq!(material.emissive, BLACK);
                }
            }
            assert!(!highlighter.is_applied(&city.scene, building));
        }
    }

    #[test]
    fn texture_references_survive_the_round_trip() {
        let mut city = fixture::city();
        let index = index_buildings(&mut city.scene);
        let hyperviseur = index.get(BuildingId::Hyperviseur).expect("indexed");

        let highlighter = Highlighter::new();
        let mut vault = MaterialVault::new();
        highlighter.apply(&mut vault, &mut city.scene, hyperviseur);

        let map = |scene: &SceneGraph| {
            materials(scene, city.hyperviseur_walls)
                .get(0)
                .and_then(Material::as_standard)
                .and_then(|standard| standard.map)
        };
        assert_eq!(map(&city.scene), Some(city.brick));
        vault.restore(&mut city.scene, hyperviseur);
        assert_eq!(map(&city.scene), Some(city.brick));
    }
}
