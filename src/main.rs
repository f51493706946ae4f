//! cde2d demo entry point
//!
//! Runs a headless scene (table, rotating fence, free balls) at 20 Hz and
//! prints the final ball states as JSON.
//!
//! Usage: `cde2d [settings.json] [frames]`

#[cfg(not(target_arch = "wasm32"))]
use cde2d::{
    Engine, EngineSettings,
    consts::DEMO_FRAME_TIME,
    sim::{Fence, FreeBall, Shape, Table},
};
#[cfg(not(target_arch = "wasm32"))]
use glam::DVec2;

#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_FRAMES: usize = 200;
#[cfg(not(target_arch = "wasm32"))]
const RANDOM_BALLS: usize = 6;
#[cfg(not(target_arch = "wasm32"))]
const SCENE_SEED: u64 = 0x5eed_cde2;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("cde2d demo starting...");

    let mut args = std::env::args().skip(1);
    let settings = match args.next() {
        Some(path) => match EngineSettings::load(&path) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("{e}");
                std::process::exit(1);
            }
        },
        None => EngineSettings::default(),
    };
    let frames = args
        .next()
        .and_then(|n| n.parse().ok())
        .unwrap_or(DEFAULT_FRAMES);

    let mut engine = match Engine::<Shape>::new(settings) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("{e}");
            std::process::exit(1);
        }
    };
    build_scene(&mut engine, SCENE_SEED);
    log::info!("Scene ready: {} bodies, seed {SCENE_SEED:#x}", engine.len());

    let mut impacts = 0;
    for frame in 0..frames {
        match engine.advance(DEMO_FRAME_TIME) {
            Ok(report) => {
                impacts += report.impacts;
                if report.saturated {
                    log::warn!("Frame {frame} hit the impact cap");
                }
            }
            Err(e) => {
                log::error!("Frame {frame}: {e}");
                std::process::exit(1);
            }
        }
        if (frame + 1) % 20 == 0 {
            log::info!("{:.1}s simulated, {impacts} impacts", (frame + 1) as f64 * DEMO_FRAME_TIME);
        }
    }

    let balls: Vec<&FreeBall> = engine.bodies().filter_map(|(_, body)| body.as_ball()).collect();
    match serde_json::to_string_pretty(&balls) {
        Ok(json) => println!("{json}"),
        Err(e) => log::error!("Failed to serialize balls: {e}"),
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The engine is a library on wasm; there is no demo loop to run
}

/// Table, fence, one launched ball and a few seeded random balls
#[cfg(not(target_arch = "wasm32"))]
fn build_scene(engine: &mut Engine<Shape>, seed: u64) {
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    let table = Table::new(DVec2::new(20.0, 20.0), DVec2::new(380.0, 580.0));
    let fence_center = DVec2::new(200.0, 300.0);
    let fence = Fence::new(fence_center, 140.0, 20.0, 20f64.to_radians(), 0.0);
    let fence_reach = fence.r1.max(fence.r2);

    let mut balls = vec![FreeBall::new(DVec2::new(50.0, 50.0), 10.0, DVec2::new(30.0, 40.0))];

    let mut rng = Pcg32::seed_from_u64(seed);
    let mut attempts = 0;
    while balls.len() < RANDOM_BALLS + 1 && attempts < 1000 {
        attempts += 1;
        let radius = rng.random_range(5.0..12.0);
        let pos = DVec2::new(
            rng.random_range(table.min.x + radius..table.max.x - radius),
            rng.random_range(table.min.y + radius..table.max.y - radius),
        );
        // Keep clear of the fence's sweep and of other balls
        if pos.distance(fence_center) < fence_reach + radius {
            continue;
        }
        if balls.iter().any(|b| b.pos.distance(pos) < b.radius + radius) {
            continue;
        }
        let vel = cde2d::polar_to_cartesian(
            rng.random_range(20.0..80.0),
            rng.random_range(0.0..std::f64::consts::TAU),
        );
        balls.push(FreeBall::new(pos, radius, vel).with_mass(radius * radius));
    }
    if balls.len() < RANDOM_BALLS + 1 {
        log::warn!("Placed {} of {RANDOM_BALLS} random balls", balls.len() - 1);
    }

    engine.register(table.into());
    engine.register(fence.into());
    for ball in balls {
        engine.register(ball.into());
    }
}
