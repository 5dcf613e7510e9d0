// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

//! Small city used across the unit tests.
//!
//! Four buildings stand in a row along x, all facing +z, with a ground slab
//! below them. Every building is three units tall.
//!
//! ```text
//!  Hyperviseur   Laboratoire      Météo       Parking
//!     x=-9          x=-3           x=3          x=9
//!                                 kiosk
//! ```
//!
//! Laboratoire nests its walls four levels deep and carries an unlit sign,
//! Météo is exported under its legacy name with a kiosk in front of it, and
//! Parking holds the `placeA1` occupancy marker on its roof.

use glam::{
    Affine3A,
    Vec2,
    Vec3,
    Vec3A,
};

use crate::{
    bvh::Static,
    camera::Camera,
    index::BuildingId,
    material::{
        color_from_hex,
        BasicMaterial,
        Material,
        MaterialSlot,
        StandardMaterial,
        Texture,
    },
    scene::{
        Mesh,
        NodeKey,
        SceneGraph,
        TextureKey,
    },
};

pub struct City {
    pub scene: SceneGraph,

    pub hyperviseur_walls: NodeKey,
    pub laboratoire_walls: NodeKey,
    pub laboratoire_sign:  NodeKey,
    pub meteo_walls:       NodeKey,
    pub parking_walls:     NodeKey,
    pub marker:            NodeKey,

    pub ground: NodeKey,
    pub kiosk:  NodeKey,

    pub brick: TextureKey,
}

pub const fn building_x(id: BuildingId) -> f32 {
    match id {
        BuildingId::Hyperviseur => -9.0,
        BuildingId::Laboratoire => -3.0,
        BuildingId::Meteo => 3.0,
        BuildingId::Parking => 9.0,
    }
}

/// Between Laboratoire and Météo, nothing but sky and ground below.
pub const EMPTY_X: f32 = 0.0;

pub const CENTER: Vec2 = Vec2::ZERO;

/// Camera one unit up looking straight down -z at column `x`. Kept off the
/// height where the wall quads are split into triangles.
pub fn camera_facing(x: f32) -> Camera {
    Camera::new(Vec3A::new(x, 1.0, 20.0), Vec3A::new(x, 1.0, 0.0)).with_fov(45.0)
}

pub fn camera_facing_building(id: BuildingId) -> Camera {
    camera_facing(building_x(id))
}

fn walls() -> Static {
    Static::cuboid(Vec3A::new(-1.0, 0.0, -1.0), Vec3A::new(1.0, 3.0, 1.0), 0)
}

fn lit(hex: u32) -> Material {
    Material::Standard(StandardMaterial {
        color: color_from_hex(hex),
        ..StandardMaterial::default()
    })
}

fn add(
    scene: &mut SceneGraph,
    parent: NodeKey,
    name: &str,
) -> NodeKey {
    scene.add_node(parent, name).expect("fixture parent exists")
}

fn add_building(
    scene: &mut SceneGraph,
    name: &str,
    id: BuildingId,
) -> NodeKey {
    let parent = scene.root();
    let root = add(scene, parent, name);
    scene.node_mut(root).expect("just added").transform =
        Affine3A::from_translation(Vec3::new(building_x(id), 0.0, 0.0));
    root
}

fn set_mesh(
    scene: &mut SceneGraph,
    key: NodeKey,
    mesh: Mesh,
) {
    scene.node_mut(key).expect("fixture node exists").mesh = Some(mesh);
}

pub fn city() -> City {
    let mut scene = SceneGraph::new();
    let root = scene.root();

    let brick = scene.add_texture(Texture {
        name: Some("brick".to_owned()),
        ..Texture::default()
    });

    let ground = add(&mut scene, root, "Ground");
    set_mesh(
        &mut scene,
        ground,
        Mesh::new(
            Static::cuboid(Vec3A::new(-20.0, -1.0, -20.0), Vec3A::new(20.0, 0.0, 20.0), 0),
            lit(0x55_7755),
        ),
    );

    let hyperviseur = add_building(&mut scene, "Hyperviseur", BuildingId::Hyperviseur);
    let hyperviseur_walls = add(&mut scene, hyperviseur, "Walls");
    set_mesh(
        &mut scene,
        hyperviseur_walls,
        Mesh::new(
            walls(),
            Material::Standard(StandardMaterial {
                color: color_from_hex(0xaa_5544),
                map: Some(brick),
                ..StandardMaterial::default()
            }),
        ),
    );

    let laboratoire = add_building(&mut scene, "Laboratoire", BuildingId::Laboratoire);
    let wing = add(&mut scene, laboratoire, "Wing");
    let floor = add(&mut scene, wing, "Floor");
    let room = add(&mut scene, floor, "Room");
    let laboratoire_walls = add(&mut scene, room, "Walls");
    set_mesh(
        &mut scene,
        laboratoire_walls,
        Mesh::new(
            walls(),
            MaterialSlot::Multi(vec![
                lit(0xee_eeee),
                Material::Basic(BasicMaterial {
                    color: color_from_hex(0x22_2222),
                    ..BasicMaterial::default()
                }),
            ]),
        ),
    );
    let laboratoire_sign = add(&mut scene, laboratoire, "Sign");
    set_mesh(
        &mut scene,
        laboratoire_sign,
        Mesh::new(
            Static::cuboid(Vec3A::new(-1.0, 3.0, -0.1), Vec3A::new(1.0, 3.5, 0.1), 0),
            Material::Basic(BasicMaterial::default()),
        ),
    );

    let meteo = add_building(&mut scene, "Meteo", BuildingId::Meteo);
    let meteo_walls = add(&mut scene, meteo, "Walls");
    set_mesh(&mut scene, meteo_walls, Mesh::new(walls(), lit(0x33_66aa)));

    let kiosk = add(&mut scene, root, "Kiosk");
    scene.node_mut(kiosk).expect("just added").transform =
        Affine3A::from_translation(Vec3::new(building_x(BuildingId::Meteo), 0.0, 5.0));
    set_mesh(
        &mut scene,
        kiosk,
        Mesh::new(
            Static::cuboid(Vec3A::new(-0.5, 0.0, -0.5), Vec3A::new(0.5, 3.0, 0.5), 0),
            lit(0x99_9933),
        ),
    );

    let parking = add_building(&mut scene, "Parking", BuildingId::Parking);
    let parking_walls = add(&mut scene, parking, "Lot");
    set_mesh(&mut scene, parking_walls, Mesh::new(walls(), lit(0x44_4444)));
    let marker = add(&mut scene, parking, "placeA1");
    set_mesh(
        &mut scene,
        marker,
        Mesh::new(
            Static::cuboid(Vec3A::new(-0.5, 3.0, -0.5), Vec3A::new(0.5, 3.5, 0.5), 0),
            lit(0xcc_2222),
        ),
    );

    City {
        scene,
        hyperviseur_walls,
        laboratoire_walls,
        laboratoire_sign,
        meteo_walls,
        parking_walls,
        marker,
        ground,
        kiosk,
        brick,
    }
}
