// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

use tracing::{
    debug,
    info,
    trace,
};

use crate::{
    highlight::Highlighter,
    index::{
        Building,
        BuildingId,
        SceneIndex,
    },
    scene::SceneGraph,
    vault::MaterialVault,
};

/// Receives the outward "building changed" event.
pub trait SelectionListener {
    fn on_building_selected(
        &mut self,
        building: BuildingId,
    );
}

impl<F: FnMut(BuildingId)> SelectionListener for F {
    fn on_building_selected(
        &mut self,
        building: BuildingId,
    ) {
        self(building);
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Selection {
    #[default]
    NoSelection,
    Selected(Building),
}

/// Materials the selection machine mutates when it transitions.
pub struct Overlay<'a> {
    pub scene:       &'a mut SceneGraph,
    pub vault:       &'a mut MaterialVault,
    pub highlighter: &'a Highlighter,
}

#[derive(Debug, Default)]
pub struct SelectionState {
    selection:     Selection,
    // Only used to de-duplicate outward events
    last_notified: Option<BuildingId>,
}

impl SelectionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Selects and highlights `initial` if the scene has it. This is not a
    /// change: nothing is notified, and `initial` counts as already notified
    /// since the host starts out showing it.
    pub fn initialize(
        &mut self,
        index: &SceneIndex,
        overlay: Overlay<'_>,
        initial: BuildingId,
    ) -> Selection {
        self.last_notified = Some(initial);
        self.selection = index.get(initial).map_or(Selection::NoSelection, |building| {
            overlay
                .highlighter
                .apply(overlay.vault, overlay.scene, building);
            Selection::Selected(building)
        });

        info!(building = %initial, selection = ?self.selection, "Initial selection");
        self.selection
    }

    /// Commits the hovered building as the selection. Returns the building
    /// the listener was told about, if the commit changed what it last saw.
    pub fn commit(
        &mut self,
        hovered: Option<Building>,
        overlay: Overlay<'_>,
        listener: &mut impl SelectionListener,
    ) -> Option<BuildingId> {
        let Some(next) = hovered else {
            trace!("Click without a hovered building");
            return None;
        };
        if overlay.scene.node(next.root).is_none() {
            debug!(building = %next.id, "Hovered building left the scene, ignoring click");
            return None;
        }

        match self.selection {
            Selection::Selected(current) if current == next => {
                trace!(building = %next.id, "Already selected");
            },
            Selection::Selected(current) => {
                overlay.vault.restore(overlay.scene, current);
                overlay
                    .highlighter
                    .apply(overlay.vault, overlay.scene, next);
            },
            Selection::NoSelection => {
                overlay
                    .highlighter
                    .apply(overlay.vault, overlay.scene, next);
            },
        }
        self.selection = Selection::Selected(next);

        if self.last_notified == Some(next.id) {
            return None;
        }
        self.last_notified = Some(next.id);

        info!(building = %next.id, "Building selected");
        listener.on_building_selected(next.id);
        Some(next.id)
    }

    pub const fn selection(&self) -> Selection {
        self.selection
    }

    pub const fn selected(&self) -> Option<Building> {
        match self.selection {
            Selection::Selected(building) => Some(building),
            Selection::NoSelection => None,
        }
    }

    pub const fn last_notified(&self) -> Option<BuildingId> {
        self.last_notified
    }
}
