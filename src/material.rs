// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

use rgb::Rgb;

use crate::scene::TextureKey;

pub type Color = Rgb<f32>;

pub const BLACK: Color = Rgb::new(0.0, 0.0, 0.0);
pub const WHITE: Color = Rgb::new(1.0, 1.0, 1.0);

#[allow(clippy::cast_precision_loss)]
pub const fn color_from_hex(hex: u32) -> Color {
    let r = (hex >> 16) & 0xff;
    let g = (hex >> 8) & 0xff;
    let b = hex & 0xff;
    Rgb::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0)
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Wrap {
    #[default]
    ClampToEdge,
    Repeat,
    MirroredRepeat,
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Texture {
    pub name:    Option<String>,
    pub wrap_s:  Wrap,
    pub wrap_t:  Wrap,
    pub version: u32,
}

/// Lit material with an emissive channel.
#[derive(Clone, Debug, PartialEq)]
pub struct StandardMaterial {
    pub name:  Option<String>,
    pub color: Color,

    pub emissive:           Color,
    pub emissive_intensity: f32,

    pub roughness: f32,
    pub metalness: f32,

    pub map:           Option<TextureKey>,
    pub normal_map:    Option<TextureKey>,
    pub roughness_map: Option<TextureKey>,
    pub metalness_map: Option<TextureKey>,

    pub version: u32,
}

impl Default for StandardMaterial {
    fn default() -> Self {
        Self {
            name:               None,
            color:              WHITE,
            emissive:           BLACK,
            emissive_intensity: 1.0,
            roughness:          1.0,
            metalness:          0.0,
            map:                None,
            normal_map:         None,
            roughness_map:      None,
            metalness_map:      None,
            version:            0,
        }
    }
}

impl StandardMaterial {
    pub fn textures(&self) -> impl Iterator<Item = TextureKey> {
        [self.map, self.normal_map, self.roughness_map, self.metalness_map]
            .into_iter()
            .flatten()
    }
}

/// Unlit material, has no emissive channel to highlight with.
#[derive(Clone, Debug, PartialEq)]
pub struct BasicMaterial {
    pub name:    Option<String>,
    pub color:   Color,
    pub map:     Option<TextureKey>,
    pub version: u32,
}

impl Default for BasicMaterial {
    fn default() -> Self {
        Self {
            name:    None,
            color:   WHITE,
            map:     None,
            version: 0,
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Material {
    Standard(StandardMaterial),
    Basic(BasicMaterial),
}

impl Material {
    pub const fn as_standard(&self) -> Option<&StandardMaterial> {
        match self {
            Self::Standard(standard) => Some(standard),
            Self::Basic(_) => None,
        }
    }

    pub fn as_standard_mut(&mut self) -> Option<&mut StandardMaterial> {
        match self {
            Self::Standard(standard) => Some(standard),
            Self::Basic(_) => None,
        }
    }

    pub const fn has_emissive(&self) -> bool {
        matches!(self, Self::Standard(_))
    }

    pub const fn version(&self) -> u32 {
        match self {
            Self::Standard(standard) => standard.version,
            Self::Basic(basic) => basic.version,
        }
    }

    /// Flags the material for re-upload by the renderer.
    pub fn mark_needs_update(&mut self) {
        let version = match self {
            Self::Standard(standard) => &mut standard.version,
            Self::Basic(basic) => &mut basic.version,
        };
        *version = version.wrapping_add(1);
    }

    pub fn textures(&self) -> Vec<TextureKey> {
        match self {
            Self::Standard(standard) => standard.textures().collect(),
            Self::Basic(basic) => basic.map.into_iter().collect(),
        }
    }
}

impl From<StandardMaterial> for Material {
    fn from(value: StandardMaterial) -> Self {
        Self::Standard(value)
    }
}

impl From<BasicMaterial> for Material {
    fn from(value: BasicMaterial) -> Self {
        Self::Basic(value)
    }
}

/// The material(s) bound to one surface. Primitives index into `Multi`.
#[derive(Clone, Debug, PartialEq)]
pub enum MaterialSlot {
    Single(Material),
    Multi(Vec<Material>),
}

impl MaterialSlot {
    pub fn get(
        &self,
        index: usize,
    ) -> Option<&Material> {
        match self {
            Self::Single(material) => (index == 0).then_some(material),
            Self::Multi(materials) => materials.get(index),
        }
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Material> {
        match self {
            Self::Single(material) => std::slice::from_ref(material).iter(),
            Self::Multi(materials) => materials.iter(),
        }
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Material> {
        match self {
            Self::Single(material) => std::slice::from_mut(material).iter_mut(),
            Self::Multi(materials) => materials.iter_mut(),
        }
    }

    pub fn len(&self) -> usize {
        match self {
            Self::Single(_) => 1,
            Self::Multi(materials) => materials.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<Material> for MaterialSlot {
    fn from(value: Material) -> Self {
        Self::Single(value)
    }
}
