//! Rollbug headless demo
//!
//! Builds a bowl-shaped level, lets the autopilot drive the character for a
//! fixed number of 60 Hz ticks and logs what happens.
//!
//! Usage: `rollbug [settings.json] [--overlay rays] [--ticks N] [--seed N]`

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use glam::Vec2;

use rollbug::autopilot::Autopilot;
use rollbug::consts::REFERENCE_FRAME_MS;
use rollbug::scene::{Scene, StepOutcome};
use rollbug::settings::{DebugOverlay, Settings};
use rollbug::sim::{Character, CharacterSprites, FrameHandle, Mask, TerrainMask};

const LEVEL_WIDTH: u32 = 1000;
const LEVEL_HEIGHT: u32 = 600;

#[derive(Parser)]
#[command(name = "rollbug")]
#[command(about = "Headless rolling-character physics demo", long_about = None)]
struct Args {
    /// Settings JSON file (defaults when omitted)
    settings: Option<PathBuf>,
    /// Diagnostics kept per tick: off, rays or full
    #[arg(long)]
    overlay: Option<DebugOverlay>,
    /// Ticks to simulate, overriding the settings file
    #[arg(long)]
    ticks: Option<u32>,
    /// Autopilot seed, overriding the settings file
    #[arg(long)]
    seed: Option<u64>,
}

fn load_settings(args: &Args) -> rollbug::Result<Settings> {
    let mut settings = match &args.settings {
        Some(path) => Settings::load(path)?,
        None => {
            log::info!("No settings file given, using defaults");
            Settings::default()
        }
    };
    if let Some(overlay) = args.overlay {
        settings.debug_overlay = overlay;
    }
    if let Some(ticks) = args.ticks {
        settings.demo_ticks = ticks;
    }
    if let Some(seed) = args.seed {
        settings.demo_seed = seed;
    }
    Ok(settings)
}

fn build_scene(settings: &Settings) -> rollbug::Result<Scene> {
    let bowl = TerrainMask::bowl(LEVEL_WIDTH, LEVEL_HEIGHT, 560.0, 300.0);
    let terrain = TerrainMask::new(bowl.mask().clone(), settings.surface_offset);

    let [w, h] = settings.tuning.draw_size;
    let sprites = CharacterSprites {
        walk: vec![FrameHandle(0), FrameHandle(1)],
        roll: vec![FrameHandle(2)],
        roll_silhouette: Mask::centered_disc(w, h, settings.tuning.radius),
    };
    Scene::new(settings, terrain, Vec2::new(100.0, 200.0), sprites)
}

fn summarize(character: &Character) -> String {
    format!(
        "pos=({:.1}, {:.1}) vel=({:.2}, {:.2}) {:?}{} ground={} spin={:.0}",
        character.position.x,
        character.position.y,
        character.velocity.x,
        character.velocity.y,
        character.state,
        if character.jumping { "+jump" } else { "" },
        character.on_ground,
        character.roll_spin_degrees
    )
}

fn run(args: &Args) -> rollbug::Result<()> {
    let settings = load_settings(args)?;
    let mut scene = build_scene(&settings)?;
    let mut pilot = Autopilot::new(settings.demo_seed);

    log::info!(
        "Running {} ticks with seed {:#x}, overlay {}",
        settings.demo_ticks,
        settings.demo_seed,
        settings.debug_overlay
    );

    let mut grounded_ticks = 0u32;
    for tick in 0..settings.demo_ticks {
        let input = if scene.is_playing() {
            pilot.next_input()
        } else {
            Default::default()
        };
        if scene.step(REFERENCE_FRAME_MS, &input) == StepOutcome::Quit {
            break;
        }
        if scene.character().on_ground {
            grounded_ticks += 1;
        }
        if tick % 60 == 0 && scene.is_playing() {
            log::info!("t={:>5} {}", tick, summarize(scene.character()));
            if let Some(diagnostics) = scene.diagnostics() {
                let hits = diagnostics.rays.iter().filter(|r| r.hit.is_some()).count();
                log::debug!("  rays hit: {}/{}", hits, diagnostics.rays.len());
            }
        }
    }

    log::info!("Final {}", summarize(scene.character()));
    if let Some(pose) = scene.draw_pose() {
        log::info!(
            "Final pose: frame {:?} rot {:.1} flip {} at ({:.1}, {:.1})",
            pose.frame,
            pose.rotation_degrees,
            pose.flip_x,
            pose.blit_position.x,
            pose.blit_position.y
        );
    }
    log::info!(
        "Grounded for {}/{} ticks",
        grounded_ticks,
        scene.time_ticks()
    );
    Ok(())
}

fn main() -> ExitCode {
    let args = Args::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Rollbug demo starting...");

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
