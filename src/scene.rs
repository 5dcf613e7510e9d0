// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

use std::sync::atomic::{
    AtomicU64,
    Ordering,
};

use glam::Affine3A;
use slotmap::SlotMap;

use crate::{
    bvh::Static,
    material::{
        MaterialSlot,
        Texture,
    },
};

slotmap::new_key_type! {
    pub struct NodeKey;
    pub struct TextureKey;
}

pub const ROOT_NAME: &str = "Scene";

static NEXT_SCENE: AtomicU64 = AtomicU64::new(0);

/// Unique per scene graph. Keys from two graphs can be equal, ids never are.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SceneId(u64);

/// A renderable surface. Its identity is the key of the node carrying it.
#[derive(Debug)]
pub struct Mesh {
    pub geometry: Static,
    pub material: MaterialSlot,

    pub cast_shadow:    bool,
    pub receive_shadow: bool,
}

impl Mesh {
    pub fn new(
        geometry: Static,
        material: impl Into<MaterialSlot>,
    ) -> Self {
        Self {
            geometry,
            material: material.into(),
            cast_shadow: false,
            receive_shadow: false,
        }
    }
}

#[derive(Debug)]
pub struct Node {
    pub name:      String,
    pub transform: Affine3A,
    pub visible:   bool,
    pub mesh:      Option<Mesh>,

    parent:   Option<NodeKey>,
    children: Vec<NodeKey>,
}

impl Node {
    fn new(
        name: String,
        parent: Option<NodeKey>,
    ) -> Self {
        Self {
            name,
            transform: Affine3A::IDENTITY,
            visible: true,
            mesh: None,
            parent,
            children: Vec::new(),
        }
    }

    pub const fn parent(&self) -> Option<NodeKey> {
        self.parent
    }

    pub fn children(&self) -> &[NodeKey] {
        &self.children
    }
}

/// Tree of named nodes. Children are owned by the arena and listed on their
/// parent, parents are plain back-links. Keys of removed nodes go stale.
#[derive(Debug)]
pub struct SceneGraph {
    id:       SceneId,
    nodes:    SlotMap<NodeKey, Node>,
    textures: SlotMap<TextureKey, Texture>,
    root:     NodeKey,
}

impl SceneGraph {
    pub fn new() -> Self {
        let mut nodes = SlotMap::with_key();
        let root = nodes.insert(Node::new(ROOT_NAME.to_owned(), None));
        Self {
            id: SceneId(NEXT_SCENE.fetch_add(1, Ordering::Relaxed)),
            nodes,
            textures: SlotMap::with_key(),
            root,
        }
    }

    pub const fn id(&self) -> SceneId {
        self.id
    }

    pub const fn root(&self) -> NodeKey {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn add_node(
        &mut self,
        parent: NodeKey,
        name: impl Into<String>,
    ) -> Option<NodeKey> {
        if !self.nodes.contains_key(parent) {
            return None;
        }
        let key = self.nodes.insert(Node::new(name.into(), Some(parent)));
        self.nodes[parent].children.push(key);
        Some(key)
    }

    pub fn node(
        &self,
        key: NodeKey,
    ) -> Option<&Node> {
        self.nodes.get(key)
    }

    pub fn node_mut(
        &mut self,
        key: NodeKey,
    ) -> Option<&mut Node> {
        self.nodes.get_mut(key)
    }

    pub fn add_texture(
        &mut self,
        texture: Texture,
    ) -> TextureKey {
        self.textures.insert(texture)
    }

    pub fn texture(
        &self,
        key: TextureKey,
    ) -> Option<&Texture> {
        self.textures.get(key)
    }

    pub fn texture_mut(
        &mut self,
        key: TextureKey,
    ) -> Option<&mut Texture> {
        self.textures.get_mut(key)
    }

    /// `key` itself first, then each parent up to the root.
    pub const fn ancestors(
        &self,
        key: NodeKey,
    ) -> Ancestors<'_> {
        Ancestors {
            scene: self,
            next:  Some(key),
        }
    }

    /// Pre-order walk of the subtree under `from`, children in order.
    pub fn traverse(
        &self,
        from: NodeKey,
        mut visit: impl FnMut(NodeKey, &Node),
    ) {
        let mut stack = vec![from];
        while let Some(key) = stack.pop() {
            let Some(node) = self.nodes.get(key) else {
                continue;
            };
            visit(key, node);
            stack.extend(node.children.iter().rev());
        }
    }

    pub fn traverse_mut(
        &mut self,
        from: NodeKey,
        mut visit: impl FnMut(NodeKey, &mut Node),
    ) {
        let mut stack = vec![from];
        while let Some(key) = stack.pop() {
            let Some(node) = self.nodes.get_mut(key) else {
                continue;
            };
            visit(key, node);
            stack.extend(node.children.iter().rev());
        }
    }

    /// First node named `name` in pre-order under `from`.
    pub fn find_by_name(
        &self,
        from: NodeKey,
        name: &str,
    ) -> Option<NodeKey> {
        let mut stack = vec![from];
        while let Some(key) = stack.pop() {
            let Some(node) = self.nodes.get(key) else {
                continue;
            };
            if node.name == name {
                return Some(key);
            }
            stack.extend(node.children.iter().rev());
        }
        None
    }

    pub fn world_transform(
        &self,
        key: NodeKey,
    ) -> Option<Affine3A> {
        self.nodes.get(key)?;
        Some(
            self.ancestors(key)
                .fold(Affine3A::IDENTITY, |child, (_, node)| node.transform * child),
        )
    }

    /// Detaches and frees `key` with everything below it. The root stays.
    pub fn remove_subtree(
        &mut self,
        key: NodeKey,
    ) -> usize {
        if key == self.root {
            return 0;
        }
        let Some(parent) = self.nodes.get(key).and_then(Node::parent) else {
            return 0;
        };
        if let Some(parent) = self.nodes.get_mut(parent) {
            parent.children.retain(|child| *child != key);
        }

        let mut removed = 0;
        let mut stack = vec![key];
        while let Some(next) = stack.pop() {
            if let Some(node) = self.nodes.remove(next) {
                stack.extend(node.children);
                removed += 1;
            }
        }
        removed
    }
}

impl Default for SceneGraph {
    fn default() -> Self {
        Self::new()
    }
}

pub struct Ancestors<'a> {
    scene: &'a SceneGraph,
    next:  Option<NodeKey>,
}

impl<'a> Iterator for Ancestors<'a> {
    type Item = (NodeKey, &'a Node);

    fn next(&mut self) -> Option<Self::Item> {
        let key = self.next?;
        let node = self.scene.nodes.get(key)?;
        self.next = node.parent;
        Some((key, node))
    }
}
