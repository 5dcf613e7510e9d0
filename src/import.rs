// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

use std::{
    collections::HashMap,
    path::Path,
};

use glam::{
    Affine3A,
    Quat,
    Vec3,
    Vec3A,
};
use gltf::{
    buffer,
    mesh::Mode,
    texture::WrappingMode,
    Document,
};
use rgb::Rgb;
use tracing::{
    debug,
    info,
    instrument,
    warn,
};

use crate::{
    bvh::StaticBuilder,
    material::{
        BasicMaterial,
        Material,
        MaterialSlot,
        StandardMaterial,
        Texture,
        Wrap,
    },
    render::Object,
    scene::{
        Mesh,
        NodeKey,
        SceneGraph,
        TextureKey,
    },
};

/// Imports the glTF file at `path` along with its buffers.
#[instrument]
pub fn load(path: impl AsRef<Path> + std::fmt::Debug) -> gltf::Result<SceneGraph> {
    let begin_time = std::time::Instant::now();
    let (document, buffers, _) = gltf::import(path)?;
    let scene = from_document(&document, &buffers);

    info!(
        nodes = scene.len(),
        elapsed_ms = begin_time.elapsed().as_millis(),
        "Model imported"
    );
    Ok(scene)
}

/// Builds a scene graph from the default scene of `document`, or its first
/// scene when none is marked default.
pub fn from_document(
    document: &Document,
    buffers: &[buffer::Data],
) -> SceneGraph {
    let mut importer = Importer {
        buffers,
        scene: SceneGraph::new(),
        textures: HashMap::new(),
    };

    let Some(scene) = document.default_scene().or_else(|| document.scenes().next()) else {
        warn!("Document has no scene");
        return importer.scene;
    };

    let root = importer.scene.root();
    let mut stack = scene
        .nodes()
        .map(|node| (root, node))
        .collect::<Vec<_>>();
    stack.reverse();

    while let Some((parent, node)) = stack.pop() {
        let Some(key) = importer.node(parent, &node) else {
            continue;
        };
        let children = node.children().collect::<Vec<_>>();
        stack.extend(children.into_iter().rev().map(|child| (key, child)));
    }

    importer.scene
}

struct Importer<'a> {
    buffers:  &'a [buffer::Data],
    scene:    SceneGraph,
    // glTF texture index to the texture it was imported as
    textures: HashMap<usize, TextureKey>,
}

impl Importer<'_> {
    fn node(
        &mut self,
        parent: NodeKey,
        node: &gltf::Node<'_>,
    ) -> Option<NodeKey> {
        let key = self
            .scene
            .add_node(parent, node.name().unwrap_or_default())?;

        let (translation, rotation, scale) = node.transform().decomposed();
        let transform = Affine3A::from_scale_rotation_translation(
            Vec3::from_array(scale),
            Quat::from_array(rotation),
            Vec3::from_array(translation),
        );
        let mesh = node.mesh().and_then(|mesh| self.mesh(&mesh));

        let imported = self.scene.node_mut(key)?;
        imported.transform = transform;
        imported.mesh = mesh;
        Some(key)
    }

    fn mesh(
        &mut self,
        mesh: &gltf::Mesh<'_>,
    ) -> Option<Mesh> {
        let buffers = self.buffers;
        let mut builder = StaticBuilder::new();
        let mut materials = Vec::new();

        for prim in mesh.primitives() {
            if prim.mode() != Mode::Triangles {
                warn!(mesh = mesh.index(), mode = ?prim.mode(), "Skipping non-triangle primitive");
                continue;
            }

            let reader = prim.reader(|buf| buffers.get(buf.index()).map(|d| &*d.0));
            let Some(positions) = reader.read_positions() else {
                warn!(mesh = mesh.index(), "No positions attached to triangle primitive");
                continue;
            };
            let positions = positions.map(Vec3A::from_array).collect::<Vec<_>>();
            let indices = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect::<Vec<_>>(),
                None => (0..u32::try_from(positions.len()).ok()?).collect(),
            };

            let vertex = |index: u32| {
                usize::try_from(index)
                    .ok()
                    .and_then(|index| positions.get(index))
                    .copied()
            };

            let slot = materials.len();
            let mut tris = 0usize;
            for tri in indices.chunks_exact(3) {
                let (Some(a), Some(b), Some(c)) = (vertex(tri[0]), vertex(tri[1]), vertex(tri[2]))
                else {
                    warn!(mesh = mesh.index(), "Triangle indexes past its positions");
                    continue;
                };
                builder.append(Object::Triangle { a, b, c }, slot);
                tris += 1;
            }

            materials.push(self.material(&prim.material()));
            debug!(mesh = mesh.index(), tris, slot, "Added primitive");
        }

        if builder.is_empty() {
            return None;
        }

        let material = match <[Material; 1]>::try_from(materials) {
            Ok([material]) => MaterialSlot::Single(material),
            Err(materials) => MaterialSlot::Multi(materials),
        };
        Some(Mesh::new(builder.build(), material))
    }

    fn material(
        &mut self,
        material: &gltf::Material<'_>,
    ) -> Material {
        if material.index().is_none() {
            return Material::Standard(StandardMaterial::default());
        }

        let name = material.name().map(str::to_owned);
        let pbr = material.pbr_metallic_roughness();
        let [r, g, b, _] = pbr.base_color_factor();
        let map = pbr
            .base_color_texture()
            .map(|info| self.texture(&info.texture()));

        if material.unlit() {
            return Material::Basic(BasicMaterial {
                name,
                color: Rgb::new(r, g, b),
                map,
                version: 0,
            });
        }

        let [er, eg, eb] = material.emissive_factor();
        let metallic_roughness = pbr
            .metallic_roughness_texture()
            .map(|info| self.texture(&info.texture()));
        let normal_map = material
            .normal_texture()
            .map(|normal| self.texture(&normal.texture()));

        Material::Standard(StandardMaterial {
            name,
            color: Rgb::new(r, g, b),
            emissive: Rgb::new(er, eg, eb),
            roughness: pbr.roughness_factor(),
            metalness: pbr.metallic_factor(),
            map,
            normal_map,
            roughness_map: metallic_roughness,
            metalness_map: metallic_roughness,
            ..StandardMaterial::default()
        })
    }

    fn texture(
        &mut self,
        texture: &gltf::Texture<'_>,
    ) -> TextureKey {
        let Self {
            scene, textures, ..
        } = self;
        *textures.entry(texture.index()).or_insert_with(|| {
            let sampler = texture.sampler();
            scene.add_texture(Texture {
                name: texture.name().map(str::to_owned),
                wrap_s: wrap(sampler.wrap_s()),
                wrap_t: wrap(sampler.wrap_t()),
                version: 0,
            })
        })
    }
}

const fn wrap(mode: WrappingMode) -> Wrap {
    match mode {
        WrappingMode::ClampToEdge => Wrap::ClampToEdge,
        WrappingMode::MirroredRepeat => Wrap::MirroredRepeat,
        WrappingMode::Repeat => Wrap::Repeat,
    }
}
