// Copyright (C) 2024 GLStudios
// SPDX-License-Identifier: LGPL-2.1-only

use std::collections::BTreeMap;

use citypick::{
    camera::Camera,
    config::{
        ViewerConfig,
        CAMERA_POSITION,
        CAMERA_TARGET,
        DEFAULT_BUILDING,
        DEFAULT_MODEL,
        DEFAULT_OUTPUT,
        HEIGHT,
        WIDTH,
    },
    import,
    index::BuildingId,
    picking::{
        pick_building,
        Raycaster,
    },
    viewer::CityViewer,
};
use glam::Vec2;
use indicatif::{
    ParallelProgressIterator,
    ProgressBar,
};
use rayon::iter::{
    IndexedParallelIterator,
    IntoParallelRefMutIterator,
    ParallelIterator,
};
use rgb::Rgb;
use tracing::{
    info,
    warn,
};

const UNATTRIBUTED: Rgb<u8> = Rgb::new(0x33, 0x33, 0x33);

const fn building_color(id: BuildingId) -> Rgb<u8> {
    match id {
        BuildingId::Hyperviseur => Rgb::new(0xe7, 0x4c, 0x3c),
        BuildingId::Laboratoire => Rgb::new(0x2e, 0xcc, 0x71),
        BuildingId::Meteo => Rgb::new(0xf1, 0xc4, 0x0f),
        BuildingId::Parking => Rgb::new(0x9b, 0x59, 0xb6),
    }
}

#[allow(clippy::cast_precision_loss)]
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let fmt_subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(fmt_subscriber)?;

    let mut args = std::env::args().skip(1);
    let model = args.next().unwrap_or_else(|| DEFAULT_MODEL.to_owned());
    let output = args.next().unwrap_or_else(|| DEFAULT_OUTPUT.to_owned());

    let mut scene = import::load(&model)?;
    let mut viewer = CityViewer::new(ViewerConfig::default(), |id: BuildingId| {
        info!(building = %id, "onBuildingSelected");
    });
    viewer.scene_ready(&mut scene, DEFAULT_BUILDING);

    let camera =
        Camera::new(CAMERA_POSITION, CAMERA_TARGET).with_aspect(WIDTH as f32 / HEIGHT as f32);
    let size = Vec2::new(WIDTH as f32, HEIGHT as f32);
    let pixel_ndc = |idx: usize| {
        let pixel = Vec2::new((idx % WIDTH as usize) as f32, (idx / WIDTH as usize) as f32);
        Camera::ndc_from_pixel(pixel, size)
    };

    info!(width = WIDTH, height = HEIGHT, "Picking every pixel");
    let begin_time = std::time::Instant::now();

    let mut pick_map = vec![None::<BuildingId>; WIDTH as usize * HEIGHT as usize];
    let bar = ProgressBar::new(u64::from(HEIGHT) * u64::from(WIDTH));
    pick_map
        .par_iter_mut()
        .enumerate()
        .progress_with(bar)
        .for_each_init(Raycaster::new, |raycaster, (idx, px)| {
            let ray = camera.ray_from_ndc(pixel_ndc(idx));
            *px = pick_building(&scene, raycaster, &ray).map(|building| building.id);
        });

    info!(elapsed_s = begin_time.elapsed().as_secs_f32(), "Picked");

    // First pixel and pixel count of every building that shows up
    let mut found = BTreeMap::<BuildingId, (usize, usize)>::new();
    for (idx, id) in pick_map.iter().enumerate() {
        if let Some(id) = id {
            found.entry(*id).or_insert((idx, 0)).1 += 1;
        }
    }
    for (id, (_, pixels)) in &found {
        info!(building = %id, pixels, "Visible");
    }

    let image = pick_map
        .iter()
        .map(|id| id.map_or(UNATTRIBUTED, building_color))
        .collect::<Vec<_>>();

    let mut encoder = png::Encoder::new(std::fs::File::create(&output)?, WIDTH, HEIGHT);
    encoder.set_color(png::ColorType::Rgb);
    encoder.set_depth(png::BitDepth::Eight);
    let mut writer = encoder.write_header()?;
    writer.write_image_data(bytemuck::must_cast_slice::<_, u8>(&image))?;
    writer.finish()?;
    info!(path = %output, "Pick map written");

    // Drive the real viewer over what was found
    for (id, (idx, _)) in found {
        viewer.frame(&scene, &camera, pixel_ndc(idx));
        if viewer.hovered().map(|building| building.id) != Some(id) {
            warn!(building = %id, "Hover disagrees with the pick map");
            continue;
        }
        match viewer.click(&mut scene) {
            Some(notified) => info!(building = %notified, "Selection changed"),
            None => info!(building = %id, "Already selected"),
        }
    }

    viewer.teardown();
    Ok(())
}
