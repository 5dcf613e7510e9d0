// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

use std::{
    collections::{
        btree_map::Entry,
        BTreeMap,
        HashSet,
    },
    fmt,
};

use tracing::{
    debug,
    instrument,
    warn,
};

use crate::{
    material::Wrap,
    scene::{
        NodeKey,
        SceneGraph,
    },
};

/// Older exports of the model name the weather station without the accent.
const LEGACY_METEO: &str = "Meteo";

/// The closed set of selectable buildings.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum BuildingId {
    Hyperviseur,
    Laboratoire,
    Meteo,
    Parking,
}

impl BuildingId {
    pub const ALL: [Self; 4] = [Self::Hyperviseur, Self::Laboratoire, Self::Meteo, Self::Parking];

    /// Canonical node name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Hyperviseur => "Hyperviseur",
            Self::Laboratoire => "Laboratoire",
            Self::Meteo => "Météo",
            Self::Parking => "Parking",
        }
    }

    /// Resolves a node name, accepting the legacy spelling.
    pub fn from_name(name: &str) -> Option<Self> {
        if name == LEGACY_METEO {
            return Some(Self::Meteo);
        }
        Self::ALL.into_iter().find(|id| id.name() == name)
    }
}

impl fmt::Display for BuildingId {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A building root node. The key is generational, so a building from a torn
/// down scene simply stops resolving.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Building {
    pub id:   BuildingId,
    pub root: NodeKey,
}

/// Walks from `node` up through its parents until one is named after a
/// building.
pub fn find_building_root(
    scene: &SceneGraph,
    node: NodeKey,
) -> Option<Building> {
    scene.ancestors(node).find_map(|(root, node)| {
        BuildingId::from_name(&node.name).map(|id| Building { id, root })
    })
}

#[derive(Debug, Default)]
pub struct SceneIndex {
    buildings: BTreeMap<BuildingId, NodeKey>,
}

impl SceneIndex {
    pub fn get(
        &self,
        id: BuildingId,
    ) -> Option<Building> {
        self.buildings
            .get(&id)
            .map(|root| Building { id, root: *root })
    }

    pub fn contains(
        &self,
        building: Building,
    ) -> bool {
        self.buildings.get(&building.id) == Some(&building.root)
    }

    pub fn buildings(&self) -> impl Iterator<Item = Building> + '_ {
        self.buildings
            .iter()
            .map(|(id, root)| Building { id: *id, root: *root })
    }

    pub fn len(&self) -> usize {
        self.buildings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buildings.is_empty()
    }
}

/// Single pass over a freshly loaded scene: collects the building roots
/// (renaming legacy spellings in place) and applies the renderer fix-ups
/// (shadows on every mesh, repeat wrapping on every lit texture).
#[instrument(skip_all, fields(nodes = scene.len()))]
pub fn index_buildings(scene: &mut SceneGraph) -> SceneIndex {
    let mut index = SceneIndex::default();
    let mut textures = HashSet::new();
    let mut meshes = 0usize;

    let root = scene.root();
    scene.traverse_mut(root, |key, node| {
        if let Some(mesh) = node.mesh.as_mut() {
            mesh.cast_shadow = true;
            mesh.receive_shadow = true;
            meshes += 1;

            for material in mesh.material.iter_mut() {
                let Some(standard) = material.as_standard() else {
                    continue;
                };
                textures.extend(standard.textures());
                material.mark_needs_update();
            }
        }

        let Some(id) = BuildingId::from_name(&node.name) else {
            return;
        };
        if node.name != id.name() {
            debug!(legacy = %node.name, building = %id, "Normalizing building name");
            id.name().clone_into(&mut node.name);
        }

        match index.buildings.entry(id) {
            Entry::Vacant(entry) => {
                entry.insert(key);
            },
            Entry::Occupied(_) => warn!(building = %id, "Duplicate building node ignored"),
        }
    });

    for key in &textures {
        let Some(texture) = scene.texture_mut(*key) else {
            continue;
        };
        texture.wrap_s = Wrap::Repeat;
        texture.wrap_t = Wrap::Repeat;
        texture.version = texture.version.wrapping_add(1);
    }

    for id in BuildingId::ALL {
        if !index.buildings.contains_key(&id) {
            warn!(building = %id, "Building missing from scene, it cannot be selected");
        }
    }

    debug!(
        buildings = index.len(),
        meshes,
        textures = textures.len(),
        "Scene indexed"
    );
    index
}
