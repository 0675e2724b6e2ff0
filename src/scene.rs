//! Scene orchestration
//!
//! Owns the terrain and the character and feeds them one input snapshot and
//! one elapsed time per frame. Starts with a timed intro card, then hands
//! over to gameplay.

use glam::Vec2;

use crate::error::Result;
use crate::settings::{DebugOverlay, Settings};
use crate::sim::{Character, CharacterSprites, DrawPose, InputSnapshot, TerrainMask, TickDiagnostics};

/// Intro timer drain per elapsed millisecond
const INTRO_DRAIN_PER_MS: f32 = 0.01;

/// Current phase of the scene
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScenePhase {
    /// Title card; gameplay starts when the timer runs out
    Intro { timer: f32 },
    Playing,
}

/// Result of one scene step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    Continue,
    Quit,
}

/// Level state owned by the game loop
#[derive(Debug)]
pub struct Scene {
    phase: ScenePhase,
    terrain: TerrainMask,
    character: Character,
    debug_overlay: DebugOverlay,
    last_diagnostics: Option<TickDiagnostics>,
    time_ticks: u64,
}

impl Scene {
    /// Build a scene with a character spawned at `spawn`
    pub fn new(
        settings: &Settings,
        terrain: TerrainMask,
        spawn: Vec2,
        sprites: CharacterSprites,
    ) -> Result<Self> {
        let character = Character::new(spawn, settings.tuning.clone(), sprites)?;
        let (w, h) = terrain.bounds();
        log::info!(
            "Scene ready: terrain {}x{}, offset {:?}, spawn ({:.0}, {:.0})",
            w,
            h,
            terrain.surface_offset(),
            spawn.x,
            spawn.y
        );
        Ok(Self {
            phase: Self::start_phase(settings.intro_timer),
            terrain,
            character,
            debug_overlay: settings.debug_overlay,
            last_diagnostics: None,
            time_ticks: 0,
        })
    }

    fn start_phase(intro_timer: f32) -> ScenePhase {
        if intro_timer > 0.0 {
            ScenePhase::Intro { timer: intro_timer }
        } else {
            ScenePhase::Playing
        }
    }

    /// Advance one frame
    pub fn step(&mut self, elapsed_ms: f32, input: &InputSnapshot) -> StepOutcome {
        if input.quit {
            log::info!("Quit requested after {} ticks", self.time_ticks);
            return StepOutcome::Quit;
        }
        self.time_ticks += 1;

        match self.phase {
            ScenePhase::Intro { timer } => {
                let timer = timer - INTRO_DRAIN_PER_MS * elapsed_ms.max(0.0);
                self.phase = if timer <= 0.0 {
                    log::info!("Intro finished, starting gameplay");
                    ScenePhase::Playing
                } else {
                    ScenePhase::Intro { timer }
                };
            }
            ScenePhase::Playing => {
                let diagnostics = self.character.update(elapsed_ms, input, &self.terrain);
                self.last_diagnostics = self.filter_diagnostics(diagnostics);
            }
        }
        StepOutcome::Continue
    }

    fn filter_diagnostics(&self, mut diagnostics: TickDiagnostics) -> Option<TickDiagnostics> {
        if !self.debug_overlay.keeps_rays() {
            return None;
        }
        if !self.debug_overlay.keeps_slope_line() {
            diagnostics.slope_line = None;
        }
        Some(diagnostics)
    }

    pub fn phase(&self) -> ScenePhase {
        self.phase
    }

    pub fn is_playing(&self) -> bool {
        self.phase == ScenePhase::Playing
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }

    pub fn character(&self) -> &Character {
        &self.character
    }

    /// Diagnostics of the last gameplay tick, if the overlay keeps them
    pub fn diagnostics(&self) -> Option<&TickDiagnostics> {
        self.last_diagnostics.as_ref()
    }

    /// Character pose while playing; nothing to draw during the intro
    pub fn draw_pose(&self) -> Option<DrawPose> {
        self.is_playing().then(|| self.character.draw_pose())
    }
}
