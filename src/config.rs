// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

use glam::Vec3A;

use crate::index::BuildingId;

/// Building selected (and highlighted) once the scene is ready.
pub const DEFAULT_BUILDING: BuildingId = BuildingId::Hyperviseur;

/// Node toggled by live parking occupancy.
pub const OCCUPANCY_MARKER: &str = "placeA1";

pub const HIGHLIGHT_COLOR: u32 = 0x0034_98db;
pub const HIGHLIGHT_INTENSITY: f32 = 0.5;

pub const CAMERA_POSITION: Vec3A = Vec3A::new(0.0, 10.0, 20.0);
pub const CAMERA_TARGET: Vec3A = Vec3A::ZERO;
pub const CAMERA_FOV: f32 = 75.0;

pub const DEFAULT_MODEL: &str = "models/main.gltf";
pub const DEFAULT_OUTPUT: &str = "pickmap.png";

pub const WIDTH: u32 = 800;
pub const HEIGHT: u32 = 600;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ViewerConfig {
    pub occupancy_marker: String,
    /// Occupancy applied to the marker until the host reports otherwise.
    pub occupied:         bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            occupancy_marker: OCCUPANCY_MARKER.to_owned(),
            occupied:         false,
        }
    }
}
