// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

use glam::Vec2;
use tracing::{
    debug,
    info,
    instrument,
};

use crate::{
    camera::Camera,
    config::ViewerConfig,
    highlight::Highlighter,
    index::{
        index_buildings,
        Building,
        BuildingId,
        SceneIndex,
    },
    picking::{
        CursorAffordance,
        PickingLoop,
    },
    scene::{
        NodeKey,
        SceneGraph,
        SceneId,
    },
    selection::{
        Overlay,
        Selection,
        SelectionListener,
        SelectionState,
    },
    vault::MaterialVault,
};

/// Everything that lives exactly as long as one loaded scene.
#[derive(Debug)]
struct Session {
    scene:     SceneId,
    index:     SceneIndex,
    vault:     MaterialVault,
    picking:   PickingLoop,
    selection: SelectionState,
    marker:    Option<NodeKey>,
}

impl Session {
    /// Takes the highlight off the current selection when `scene` is the one
    /// this session was made ready with. Other buildings were already
    /// restored when the selection moved off them.
    fn release(
        self,
        scene: &mut SceneGraph,
    ) {
        if self.scene != scene.id() {
            debug!("Previous session belongs to another scene, dropping it");
            return;
        }
        if let Some(selected) = self.selection.selected() {
            let restored = self.vault.restore(scene, selected);
            debug!(building = %selected.id, restored, "Released previous selection");
        }
    }
}

/// Host facing side of the engine.
///
/// The host owns the scene graph and lends it on every call. Until
/// [`scene_ready`](Self::scene_ready) is called (and again after
/// [`teardown`](Self::teardown)) frames and clicks do nothing. The host must
/// stop driving the viewer, or tear it down, before dropping the scene it
/// was made ready with.
pub struct CityViewer<L> {
    config:      ViewerConfig,
    listener:    L,
    highlighter: Highlighter,
    occupied:    bool,
    session:     Option<Session>,
}

impl<L: SelectionListener> CityViewer<L> {
    pub fn new(
        config: ViewerConfig,
        listener: L,
    ) -> Self {
        Self {
            occupied: config.occupied,
            config,
            listener,
            highlighter: Highlighter::new(),
            session: None,
        }
    }

    /// The asset finished loading: index it, show the current occupancy and
    /// select `initial`. Replaces any previous session, restoring its
    /// highlight first if it ran on this same scene.
    #[instrument(skip(self, scene))]
    pub fn scene_ready(
        &mut self,
        scene: &mut SceneGraph,
        initial: BuildingId,
    ) {
        if let Some(previous) = self.session.take() {
            previous.release(scene);
        }

        let index = index_buildings(scene);

        let marker = scene.find_by_name(scene.root(), &self.config.occupancy_marker);
        if marker.is_none() {
            debug!(marker = %self.config.occupancy_marker, "Occupancy marker not in scene");
        }
        apply_occupancy(scene, marker, self.occupied);

        let mut session = Session {
            scene: scene.id(),
            index,
            vault: MaterialVault::new(),
            picking: PickingLoop::new(),
            selection: SelectionState::new(),
            marker,
        };
        session.selection.initialize(
            &session.index,
            Overlay {
                scene,
                vault: &mut session.vault,
                highlighter: &self.highlighter,
            },
            initial,
        );

        info!(buildings = session.index.len(), "Viewer ready");
        self.session = Some(session);
    }

    /// Once per rendered frame. Returns the cursor the host should show.
    /// Buildings the index does not own (an ignored duplicate) are not
    /// hoverable.
    pub fn frame(
        &mut self,
        scene: &SceneGraph,
        camera: &Camera,
        pointer: Vec2,
    ) -> CursorAffordance {
        let Some(session) = self.session.as_mut() else {
            return CursorAffordance::Default;
        };
        let affordance = session.picking.tick(scene, camera, pointer);
        match session.picking.hovered() {
            Some(building) if !session.index.contains(building) => {
                debug!(building = %building.id, "Hovered building is not indexed");
                session.picking.clear();
                session.picking.affordance()
            },
            _ => affordance,
        }
    }

    /// Pointer click. Returns the building the listener was notified of.
    pub fn click(
        &mut self,
        scene: &mut SceneGraph,
    ) -> Option<BuildingId> {
        let session = self.session.as_mut()?;
        session.selection.commit(
            session.picking.hovered(),
            Overlay {
                scene,
                vault: &mut session.vault,
                highlighter: &self.highlighter,
            },
            &mut self.listener,
        )
    }

    /// Live occupancy for the marker node. Applied right away when a scene is
    /// ready and remembered for the next one.
    pub fn set_occupancy(
        &mut self,
        scene: &mut SceneGraph,
        occupied: bool,
    ) {
        self.occupied = occupied;
        if let Some(session) = &self.session {
            apply_occupancy(scene, session.marker, occupied);
        }
    }

    /// Drops everything tied to the current scene. The scene itself is
    /// expected to go away with it, so nothing is restored.
    pub fn teardown(&mut self) {
        if let Some(session) = self.session.take() {
            info!(snapshots = session.vault.len(), "Viewer torn down");
        }
    }

    pub const fn is_ready(&self) -> bool {
        self.session.is_some()
    }

    pub fn hovered(&self) -> Option<Building> {
        self.session
            .as_ref()
            .and_then(|session| session.picking.hovered())
    }

    pub fn selection(&self) -> Selection {
        self.session
            .as_ref()
            .map_or(Selection::NoSelection, |session| session.selection.selection())
    }

    pub fn selected(&self) -> Option<Building> {
        self.session
            .as_ref()
            .and_then(|session| session.selection.selected())
    }

    pub fn index(&self) -> Option<&SceneIndex> {
        self.session.as_ref().map(|session| &session.index)
    }

    pub const fn occupied(&self) -> bool {
        self.occupied
    }

    pub const fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub const fn listener(&self) -> &L {
        &self.listener
    }
}

fn apply_occupancy(
    scene: &mut SceneGraph,
    marker: Option<NodeKey>,
    occupied: bool,
) {
    let Some(marker) = marker else {
        return;
    };
    let Some(node) = scene.node_mut(marker) else {
        return;
    };
    node.visible = occupied;

    scene.traverse_mut(marker, |_, node| {
        let Some(mesh) = node.mesh.as_mut() else {
            return;
        };
        for material in mesh.material.iter_mut() {
            material.mark_needs_update();
        }
    });

    debug!(occupied, "Occupancy marker updated");
}
