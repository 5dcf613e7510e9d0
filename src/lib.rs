// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

//! Building selection for a 3D city scene: hover picking under the pointer,
//! a single emissive highlight on the selected building and a de-duplicated
//! "building selected" notification for the host.

pub mod bvh;
pub mod camera;
pub mod config;
pub mod highlight;
pub mod import;
pub mod index;
pub mod material;
pub mod picking;
pub mod render;
pub mod scene;
pub mod selection;
pub mod vault;
pub mod viewer;

#[cfg(test)]
mod fixture;
