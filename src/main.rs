//! Ball world demo
//!
//! Headless port of the 3D balls demo: a field of trees scattered over rolling
//! hills, fenced by four edges, with bouncing viruses thrown into it. Prints the
//! final snapshot as JSON.
//!
//! Usage: `ballworld-demo [settings.json]`

use glam::{Vec2, Vec3};
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use pixfu_physics::sim::{
    BallWorld, FnTerrain, LineSegment, ObjectAerodynamics, ObjectAnimation, ObjectDb,
    ObjectLocation, ObjectProperties,
};
use pixfu_physics::{PhysicsSettings, Result};

const TREE_SMALL: i32 = 0;
const TREE_BIG: i32 = 1;
const VIRUS: i32 = 2;

const FIELD_WIDTH: f32 = 1700.0;
const FIELD_DEPTH: f32 = 1400.0;
const GRID_STEP: usize = 300;

const SEED: u64 = 0x5EED_BA11;
const VIRUSES: usize = 12;
const FRAMES: usize = 600;
const FRAME_TIME: f32 = 1.0 / 60.0;

fn object_db() -> Result<ObjectDb> {
    let mut db = ObjectDb::new();

    // Trees are drawn twice their size; they collide with the trunk only
    db.insert(
        TREE_SMALL,
        ObjectProperties {
            draw_radius_multiplier: 2.0,
            ..ObjectProperties::fixed("tree", 25.0, 10000.0)
        },
        ObjectLocation::default(),
    )?;
    db.insert(
        TREE_BIG,
        ObjectProperties {
            draw_radius_multiplier: 2.0,
            ..ObjectProperties::fixed("tree", 75.0, 1000.0)
        },
        ObjectLocation::at(Vec3::new(500.0, 0.0, 500.0)),
    )?;
    db.insert(
        VIRUS,
        ObjectProperties {
            elasticity: 0.7,
            crash_efficiency: 1.0,
            aero: ObjectAerodynamics {
                terrain: 0.95,
                air: 1.0,
                ..Default::default()
            },
            animation: ObjectAnimation {
                enabled: true,
                delta_rotation: Vec3::new(0.1, 0.15, 0.2),
                scale_pulse: 0.1,
            },
            ..ObjectProperties::new("virus", 20.0, 50.0)
        },
        ObjectLocation::default(),
    )?;

    Ok(db)
}

/// Rolling hills, gentle enough to be climbed everywhere
fn hills(p: Vec3) -> f32 {
    20.0 * (p.x / 200.0).sin() * (p.z / 200.0).cos() + 20.0
}

fn fence() -> Vec<LineSegment> {
    let corners = [
        Vec2::ZERO,
        Vec2::new(FIELD_WIDTH, 0.0),
        Vec2::new(FIELD_WIDTH, FIELD_DEPTH),
        Vec2::new(0.0, FIELD_DEPTH),
    ];
    (0..corners.len())
        .map(|i| LineSegment::new(corners[i], corners[(i + 1) % corners.len()], 2.0))
        .collect()
}

fn build_world(settings: PhysicsSettings, rng: &mut Pcg32) -> Result<BallWorld> {
    let mut world = BallWorld::new(settings, Box::new(FnTerrain(hills)), object_db()?)?;

    for x in (0..FIELD_WIDTH as usize).step_by(GRID_STEP) {
        for z in (0..FIELD_DEPTH as usize).step_by(GRID_STEP) {
            let oid = if rng.random_bool(0.5) { TREE_SMALL } else { TREE_BIG };
            let position = Vec3::new(
                x as f32 + rng.random_range(0.0..50.0),
                0.0,
                z as f32 + rng.random_range(0.0..50.0),
            );
            world.add_from_db(oid, Some(ObjectLocation::at(position)), true)?;
        }
    }

    for _ in 0..VIRUSES {
        let position = Vec3::new(
            rng.random_range(100.0..FIELD_WIDTH - 100.0),
            0.0,
            rng.random_range(100.0..FIELD_DEPTH - 100.0),
        );
        let heading = rng.random_range(0.0..std::f32::consts::TAU);
        let speed: f32 = rng.random_range(250.0..500.0);
        let velocity = pixfu_physics::heading_vector(heading) * speed;
        world.add_from_db(VIRUS, Some(ObjectLocation::moving(position, velocity)), true)?;
    }

    world.set_edges(fence());
    Ok(world)
}

fn run() -> Result<()> {
    let settings = match std::env::args().nth(1) {
        Some(path) => PhysicsSettings::load(path)?,
        None => PhysicsSettings::default(),
    };

    let mut rng = Pcg32::seed_from_u64(SEED);
    let mut world = build_world(settings, &mut rng)?;
    log::info!("World ready with {} objects (seed {:#x})", world.len(), SEED);

    let mut total = 0;
    for frame in 0..FRAMES {
        let hits = world.tick(FRAME_TIME);
        total += hits;
        if hits > 0 {
            log::debug!(
                "Frame {}: {} collisions, {} near misses",
                frame,
                hits,
                world.future_colliders().len()
            );
        }
    }
    log::info!("Simulated {} frames, {} collisions", FRAMES, total);

    println!("{}", serde_json::to_string_pretty(&world.snapshot())?);
    Ok(())
}

fn main() {
    env_logger::init();
    log::info!("Ball world demo starting...");

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
