//! Per-tick character update
//!
//! Velocities are in pixels per tick; the elapsed time only drives timers,
//! spin, animation and render smoothing. Nothing here fails: every degenerate
//! geometric case falls back to a defined value.

use glam::{IVec2, Vec2};

use super::mask::TerrainMask;
use super::sensor::{RayTrace, SlopeLine, closest_hit, collect_hits, slope_from_hits, slope_line};
use super::state::{Character, Facing, InputSnapshot, MovementState};
use crate::consts::{ROLL_EXIT_SPEED, SNAP_EPSILON};
use crate::{slope_tangent, wrap_degrees};

/// Debug output of one tick
#[derive(Debug, Clone, Default)]
pub struct TickDiagnostics {
    /// Empty while the jump overlay suppresses sensing
    pub rays: Vec<RayTrace>,
    pub slope_line: Option<SlopeLine>,
    /// Whether the mask landing check fired this tick
    pub landed: bool,
}

/// Move `current` a fraction of the way toward `target`, never more than
/// `max_step * strength`, landing exactly once within [`SNAP_EPSILON`]
pub fn snap_toward(current: f32, target: f32, strength: f32, max_step: f32) -> f32 {
    let dy = (target - current).clamp(-max_step, max_step);
    let next = current + dy * strength;
    if (target - next).abs() <= SNAP_EPSILON {
        target
    } else {
        next
    }
}

impl Character {
    /// Advance one tick.
    pub fn update(
        &mut self,
        elapsed_ms: f32,
        input: &InputSnapshot,
        terrain: &TerrainMask,
    ) -> TickDiagnostics {
        let elapsed_ms = if elapsed_ms.is_finite() { elapsed_ms.max(0.0) } else { 0.0 };
        let elapsed_s = elapsed_ms / 1000.0;
        let mut diagnostics = TickDiagnostics::default();

        self.apply_input(input);
        self.decay_timers(elapsed_s);

        let traces = if self.jumping {
            Vec::new()
        } else {
            self.sensor.cast_traced(self.position, terrain)
        };
        let slots: Vec<Option<Vec2>> = traces.iter().map(|t| t.hit).collect();
        let hits = collect_hits(&slots);
        diagnostics.rays = traces;

        match closest_hit(&hits) {
            Some(closest) if !self.jumping => {
                let target_y = closest.y - self.tuning.radius;
                if target_y - self.position.y <= self.tuning.ground_grace_px {
                    self.on_ground = true;
                    self.slope_angle = slope_from_hits(&hits);
                    diagnostics.slope_line = slope_line(&hits);
                    self.apply_ground_physics();
                    self.ground_snap(target_y);
                } else {
                    self.go_airborne();
                }
            }
            _ => {
                self.go_airborne();
                if self.jumping {
                    diagnostics.landed = self.check_jump_landing(terrain);
                }
            }
        }

        self.update_roll_spin(elapsed_ms);
        self.drive_animation(elapsed_ms);
        self.update_render_position(elapsed_s);

        log::trace!(
            "tick pos=({:.2}, {:.2}) vel=({:.2}, {:.2}) ground={} slope={:.3}",
            self.position.x,
            self.position.y,
            self.velocity.x,
            self.velocity.y,
            self.on_ground,
            self.slope_angle
        );

        diagnostics
    }

    /// Resolve movement mode, horizontal control and jump launch
    pub fn apply_input(&mut self, input: &InputSnapshot) {
        let previous = self.state;
        if self.on_ground && input.down {
            self.state = MovementState::Rolling;
        } else if !input.down
            && (self.state != MovementState::Rolling || self.velocity.x.abs() < ROLL_EXIT_SPEED)
        {
            self.state = MovementState::Walking;
        }
        if previous != self.state {
            log::debug!("Movement state {:?} -> {:?}", previous, self.state);
        }

        match self.state {
            MovementState::Walking => {
                if input.left {
                    self.velocity.x -= self.tuning.walk_accel;
                    self.facing = Facing::Left;
                } else if input.right {
                    self.velocity.x += self.tuning.walk_accel;
                    self.facing = Facing::Right;
                } else {
                    self.velocity.x *= 1.0 - self.tuning.walk_friction;
                }
                let max = self.tuning.walk_max_speed;
                self.velocity.x = self.velocity.x.clamp(-max, max);
            }
            MovementState::Rolling => {
                self.velocity.x *= 1.0 - self.tuning.roll_friction;
            }
        }

        if self.on_ground && input.jump {
            self.launch_jump();
        }
    }

    /// Push off along the ground normal
    fn launch_jump(&mut self) {
        let (sin, cos) = self.slope_angle.sin_cos();
        let dir = Vec2::new(sin, -cos).try_normalize().unwrap_or(Vec2::NEG_Y);
        self.velocity += dir * self.tuning.jump_pow;

        self.on_ground = false;
        self.jumping = true;
        self.jump_land_ignore_timer = self.tuning.jump_land_ignore_time;
        self.jump_lock_timer = self.tuning.jump_max_lock_time;

        log::debug!(
            "Jump from ({:.1}, {:.1}) dir=({:.2}, {:.2})",
            self.position.x,
            self.position.y,
            dir.x,
            dir.y
        );
    }

    fn decay_timers(&mut self, elapsed_s: f32) {
        if self.jump_land_ignore_timer > 0.0 {
            self.jump_land_ignore_timer -= elapsed_s;
        }
        if self.jump_lock_timer > 0.0 {
            self.jump_lock_timer -= elapsed_s;
            if self.jump_lock_timer <= 0.0 && self.jumping {
                self.jumping = false;
                log::debug!("Jump lock expired");
            }
        }
    }

    fn go_airborne(&mut self) {
        self.on_ground = false;
        self.slope_angle = 0.0;
        self.apply_air_physics();
    }

    /// Constrain velocity to the slope tangent and integrate
    fn apply_ground_physics(&mut self) {
        let tangent = slope_tangent(self.slope_angle);
        let mut speed = self.velocity.dot(tangent);
        if self.state == MovementState::Rolling {
            speed += self.slope_angle.sin() * self.tuning.roll_gravity;
        }
        self.velocity = tangent * speed;
        self.position += self.velocity;
    }

    fn apply_air_physics(&mut self) {
        self.velocity.y += self.tuning.gravity;
        self.position += self.velocity;
    }

    fn ground_snap(&mut self, target_y: f32) {
        self.position.y = snap_toward(
            self.position.y,
            target_y,
            self.tuning.ground_snap_strength,
            self.tuning.max_snap_per_frame,
        );
    }

    /// Top-left world pixel of the silhouette centred on the character
    fn silhouette_origin(&self) -> IVec2 {
        let (w, h) = self.silhouette().bounds();
        IVec2::new(self.position.x as i32, self.position.y as i32)
            .saturating_sub(IVec2::new((w / 2) as i32, (h / 2) as i32))
    }

    /// Land the jump if the rolling silhouette touches terrain, then push the
    /// character up out of it.
    ///
    /// Penetration is resolved 1 px at a time with a fixed budget and may be
    /// left partially unresolved; the ground snap finishes the job.
    pub fn check_jump_landing(&mut self, terrain: &TerrainMask) -> bool {
        if self.jump_land_ignore_timer > 0.0 {
            return false;
        }
        if !terrain.overlaps_at(self.silhouette(), self.silhouette_origin()) {
            return false;
        }

        self.jumping = false;
        self.on_ground = true;
        if self.velocity.y > 0.0 {
            self.velocity.y = 0.0;
        }

        let mut nudges = 0;
        let mut penetrating = true;
        while penetrating && nudges < self.tuning.landing_retries {
            self.position.y -= 1.0;
            nudges += 1;
            penetrating = terrain.overlaps_at(self.silhouette(), self.silhouette_origin());
        }

        log::debug!(
            "Landed at ({:.1}, {:.1}) after {} nudges{}",
            self.position.x,
            self.position.y,
            nudges,
            if penetrating { ", residual penetration" } else { "" }
        );
        true
    }

    fn update_roll_spin(&mut self, elapsed_ms: f32) {
        if self.state != MovementState::Rolling {
            self.roll_spin_degrees = 0.0;
            return;
        }
        let distance = if self.on_ground {
            self.velocity.dot(slope_tangent(self.slope_angle)) * elapsed_ms
        } else {
            self.velocity.x * elapsed_ms
        };
        let circumference = std::f32::consts::TAU * self.tuning.roll_radius_px;
        if circumference > 0.0 {
            self.roll_spin_degrees += distance / circumference * 360.0;
        }
        self.roll_spin_degrees = wrap_degrees(self.roll_spin_degrees);
    }

    fn drive_animation(&mut self, elapsed_ms: f32) {
        let speed = self.velocity.x.abs();
        let scale = self.tuning.anim_speed_scale;
        let anim = self.animations.get_mut(self.state);
        anim.speed = if speed > 0.0 { scale * speed } else { 0.0 };
        anim.advance(elapsed_ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::Tuning;
    use crate::sim::mask::Mask;
    use proptest::prelude::*;

    const DT: f32 = 16.0;
    const GROUND_Y: i32 = 300;

    fn flat() -> TerrainMask {
        TerrainMask::flat(2000, 600, GROUND_Y, IVec2::ZERO)
    }

    fn empty() -> TerrainMask {
        TerrainMask::new(Mask::new(10, 10), IVec2::ZERO)
    }

    /// Ground descending to the right at `drop` pixels per pixel
    fn downhill(drop: f32) -> TerrainMask {
        let mask = Mask::from_fn(2000, 1200, |x, y| y as f32 >= 300.0 + x as f32 * drop);
        TerrainMask::new(mask, IVec2::ZERO)
    }

    fn resting(x: f32) -> Character {
        Character::with_placeholder_sprites(
            Vec2::new(x, GROUND_Y as f32 - 20.0),
            Tuning::default(),
        )
        .unwrap()
    }

    fn held(f: impl FnOnce(&mut InputSnapshot)) -> InputSnapshot {
        let mut input = InputSnapshot::default();
        f(&mut input);
        input
    }

    #[test]
    fn test_rest_on_flat_ground() {
        let terrain = flat();
        let mut c = resting(200.0);
        let start = c.position;
        for _ in 0..60 {
            c.update(DT, &InputSnapshot::default(), &terrain);
        }
        assert_eq!(c.position, start);
        assert!(c.on_ground);
        assert_eq!(c.state, MovementState::Walking);
        assert_eq!(c.slope_angle, 0.0);
    }

    #[test]
    fn test_walk_right_approaches_max_speed() {
        let terrain = flat();
        let mut c = resting(200.0);
        let right = held(|i| i.right = true);
        let mut last = 0.0;
        for _ in 0..100 {
            c.update(DT, &right, &terrain);
            assert!(c.velocity.x <= 5.0);
            assert!(c.velocity.x >= last);
            last = c.velocity.x;
        }
        assert!((c.velocity.x - 5.0).abs() < 1e-4);
        assert_eq!(c.facing, Facing::Right);
        assert!(c.on_ground);
    }

    #[test]
    fn test_walk_friction_decays_speed() {
        let terrain = flat();
        let mut c = resting(200.0);
        c.velocity.x = -4.0;
        c.update(DT, &InputSnapshot::default(), &terrain);
        assert!((c.velocity.x - (-4.0 * 0.88)).abs() < 1e-5);
    }

    #[test]
    fn test_free_fall_accumulates_gravity() {
        let terrain = empty();
        let mut c = Character::with_placeholder_sprites(Vec2::new(500.0, 500.0), Tuning::default())
            .unwrap();
        for _ in 0..10 {
            c.update(DT, &InputSnapshot::default(), &terrain);
        }
        assert_eq!(c.velocity.y, 5.0);
        assert_eq!(c.velocity.x, 0.0);
        assert!(!c.on_ground);
        // 0.5 + 1.0 + ... + 5.0
        assert_eq!(c.position.y, 500.0 + 27.5);
    }

    #[test]
    fn test_jump_from_flat_ground() {
        let terrain = flat();
        let mut c = resting(200.0);
        c.update(DT, &InputSnapshot::default(), &terrain);
        assert!(c.on_ground);

        let before = c.velocity.y;
        c.apply_input(&held(|i| i.jump = true));
        assert_eq!(c.velocity.y, before - 10.0);
        assert_eq!(c.velocity.x, 0.0);
        assert!(!c.on_ground);
        assert!(c.jumping);
        assert_eq!(c.jump_land_ignore_timer, 0.08);
    }

    #[test]
    fn test_jump_suppresses_sensing_and_lands() {
        let terrain = flat();
        let mut c = resting(200.0);
        c.update(DT, &InputSnapshot::default(), &terrain);

        let diag = c.update(DT, &held(|i| i.jump = true), &terrain);
        assert!(diag.rays.is_empty());
        assert!(c.jumping);
        assert_eq!(c.velocity.y, -9.5);
        assert!(c.position.y < 280.0);

        let mut landed = false;
        for _ in 0..80 {
            let diag = c.update(DT, &InputSnapshot::default(), &terrain);
            landed |= diag.landed;
        }
        assert!(landed);
        assert!(!c.jumping);
        assert!(c.on_ground);
        assert!((c.position.y - 280.0).abs() <= SNAP_EPSILON);
        assert_eq!(c.position.x, 200.0);
    }

    #[test]
    fn test_jump_on_slope_follows_normal() {
        let mut c = resting(200.0);
        c.on_ground = true;
        c.slope_angle = 0.3;
        c.apply_input(&held(|i| i.jump = true));
        let expected = Vec2::new(0.3f32.sin(), -0.3f32.cos()) * 10.0;
        assert!((c.velocity - expected).length() < 1e-5);
    }

    #[test]
    fn test_jump_lock_clears_overlay() {
        let tuning = Tuning {
            jump_max_lock_time: 0.05,
            ..Default::default()
        };
        let terrain = flat();
        let mut c =
            Character::with_placeholder_sprites(Vec2::new(200.0, 280.0), tuning).unwrap();
        c.update(DT, &InputSnapshot::default(), &terrain);
        c.update(DT, &held(|i| i.jump = true), &terrain);
        assert!(c.jumping);
        for _ in 0..3 {
            c.update(DT, &InputSnapshot::default(), &terrain);
        }
        // 4 ticks of 16 ms passed the 50 ms lock while still rising
        assert!(!c.jumping);
        assert!(c.velocity.y < 0.0);
    }

    #[test]
    fn test_landing_ignored_while_timer_runs() {
        let terrain = flat();
        let mut c = resting(200.0);
        c.jumping = true;
        c.jump_land_ignore_timer = 0.05;
        c.position.y = 300.0;
        assert!(!c.check_jump_landing(&terrain));
        assert!(c.jumping);
    }

    #[test]
    fn test_landing_budget_may_leave_penetration() {
        let terrain = flat();
        let mut c = resting(200.0);
        c.jumping = true;
        c.velocity.y = 7.0;
        // Disc bottom at row 339: far more than 10 px deep
        c.position.y = 320.0;
        assert!(c.check_jump_landing(&terrain));
        assert_eq!(c.position.y, 310.0);
        assert_eq!(c.velocity.y, 0.0);
        assert!(c.on_ground);
        assert!(!c.jumping);
    }

    #[test]
    fn test_landing_with_surface_offset() {
        let terrain = TerrainMask::flat(2000, 600, GROUND_Y, IVec2::new(0, 40));
        let mut c = resting(200.0);
        c.jumping = true;
        c.velocity.y = 3.0;
        // Disc bottom at row 304, clear again at 280
        c.position.y = 285.0;
        assert!(c.check_jump_landing(&terrain));
        assert_eq!(c.position.y, 280.0);
        assert!(!terrain.overlaps_at(c.silhouette(), c.silhouette_origin()));

        // Same fall through the full update path
        let mut c = resting(200.0);
        c.update(DT, &InputSnapshot::default(), &terrain);
        assert!(c.on_ground);
        c.update(DT, &held(|i| i.jump = true), &terrain);
        let mut landed = false;
        for _ in 0..80 {
            landed |= c.update(DT, &InputSnapshot::default(), &terrain).landed;
        }
        assert!(landed);
        assert!((c.position.y - 280.0).abs() <= SNAP_EPSILON);
    }

    #[test]
    fn test_far_fall_never_panics() {
        let terrain = TerrainMask::flat(400, 400, 300, IVec2::new(0, 10));
        for position in [Vec2::new(200.0, 3.0e9), Vec2::new(-3.0e9, -3.0e9)] {
            let mut c = Character::with_placeholder_sprites(position, Tuning::default()).unwrap();
            let diag = c.update(DT, &InputSnapshot::default(), &terrain);
            assert!(!c.on_ground);
            assert!(diag.rays.iter().all(|r| r.hit.is_none()));

            // Mask landing check at the same spot
            c.jumping = true;
            c.jump_land_ignore_timer = 0.0;
            let diag = c.update(DT, &InputSnapshot::default(), &terrain);
            assert!(!diag.landed);
            assert!(c.jumping);
        }
    }

    #[test]
    fn test_roll_spin_on_ground() {
        let terrain = flat();
        let mut c = resting(200.0);
        c.update(DT, &InputSnapshot::default(), &terrain);
        c.state = MovementState::Rolling;
        c.velocity.x = 4.0;
        c.update(DT, &held(|i| i.down = true), &terrain);

        // 4.0 after 2% roll friction
        assert!((c.velocity.x - 3.92).abs() < 1e-6);
        // 3.92 * 16 px over a 250 px roll radius
        assert!((c.roll_spin_degrees - 14.374).abs() < 1e-3);
        let expected = 3.92 * DT / (std::f32::consts::TAU * 250.0) * 360.0;
        assert!((c.roll_spin_degrees - expected).abs() < 1e-4);
    }

    #[test]
    fn test_roll_spin_in_air_uses_horizontal_speed() {
        let terrain = empty();
        let mut c = Character::with_placeholder_sprites(Vec2::new(500.0, 500.0), Tuning::default())
            .unwrap();
        c.state = MovementState::Rolling;
        c.velocity = Vec2::new(-3.0, 6.0);
        c.update(DT, &held(|i| i.down = true), &terrain);

        assert!(!c.on_ground);
        assert_eq!(c.state, MovementState::Rolling);
        let vx = c.velocity.x;
        assert!((vx - -2.94).abs() < 1e-6);
        // Backward spin wraps below zero into [0, 360)
        let expected = wrap_degrees(vx * DT / (std::f32::consts::TAU * 250.0) * 360.0);
        assert!((c.roll_spin_degrees - expected).abs() < 1e-3);
        assert!(c.roll_spin_degrees > 340.0);
    }

    #[test]
    fn test_down_starts_roll_only_on_ground() {
        let terrain = flat();
        let down = held(|i| i.down = true);

        let mut airborne = Character::with_placeholder_sprites(Vec2::new(200.0, 100.0), Tuning::default())
            .unwrap();
        airborne.update(DT, &down, &terrain);
        assert_eq!(airborne.state, MovementState::Walking);

        let mut c = resting(200.0);
        c.update(DT, &InputSnapshot::default(), &terrain);
        c.update(DT, &down, &terrain);
        assert_eq!(c.state, MovementState::Rolling);
    }

    #[test]
    fn test_fast_roll_persists_after_release() {
        let terrain = flat();
        let mut c = resting(200.0);
        c.update(DT, &InputSnapshot::default(), &terrain);
        c.velocity.x = 4.0;
        c.update(DT, &held(|i| i.down = true), &terrain);
        assert_eq!(c.state, MovementState::Rolling);

        c.update(DT, &InputSnapshot::default(), &terrain);
        assert_eq!(c.state, MovementState::Rolling);
        // Gentle roll friction, no walking control
        c.update(DT, &held(|i| i.left = true), &terrain);
        assert!(c.velocity.x > 3.5);
        assert_eq!(c.facing, Facing::Right);
        assert!(c.roll_spin_degrees > 0.0);

        c.velocity.x = 0.5;
        c.update(DT, &InputSnapshot::default(), &terrain);
        assert_eq!(c.state, MovementState::Walking);
        assert_eq!(c.roll_spin_degrees, 0.0);
    }

    #[test]
    fn test_roll_accelerates_downhill() {
        let terrain = downhill(0.25);
        // Ground under x=400 is at y=400
        let mut c = Character::with_placeholder_sprites(Vec2::new(400.0, 380.0), Tuning::default())
            .unwrap();
        c.update(DT, &InputSnapshot::default(), &terrain);
        assert!(c.on_ground);
        assert!(c.slope_angle > 0.0);

        let down = held(|i| i.down = true);
        for _ in 0..30 {
            c.update(DT, &down, &terrain);
        }
        assert_eq!(c.state, MovementState::Rolling);
        assert!(c.on_ground);
        assert!(c.velocity.x > 1.0);
        assert!(c.position.x > 400.0);
    }

    #[test]
    fn test_far_ground_is_airborne() {
        let terrain = flat();
        // 40 px above the resting height: hit but outside the grace band
        let mut c = Character::with_placeholder_sprites(Vec2::new(200.0, 240.0), Tuning::default())
            .unwrap();
        let diag = c.update(DT, &InputSnapshot::default(), &terrain);
        assert!(!c.on_ground);
        assert_eq!(c.velocity.y, 0.5);
        assert!(diag.rays.iter().all(|r| r.hit.is_some()));
        assert!(diag.slope_line.is_none());
    }

    #[test]
    fn test_snap_toward_clamps_and_lands() {
        // Large gap: clamped to 10 px, scaled by 0.28
        assert!((snap_toward(0.0, 50.0, 0.28, 10.0) - 2.8).abs() < 1e-6);
        assert!((snap_toward(0.0, -50.0, 0.28, 10.0) + 2.8).abs() < 1e-6);
        assert_eq!(snap_toward(9.9, 10.0, 0.28, 10.0), 10.0);
    }

    #[test]
    fn test_animation_speed_follows_velocity() {
        let terrain = flat();
        let mut c = resting(200.0);
        c.update(DT, &InputSnapshot::default(), &terrain);
        assert_eq!(c.current_animation().speed, 0.0);

        c.velocity.x = 5.0;
        c.update(DT, &held(|i| i.right = true), &terrain);
        assert!((c.current_animation().speed - 0.06 * 5.0).abs() < 1e-5);
    }

    proptest! {
        #[test]
        fn prop_ground_snap_contracts(
            start in -200.0f32..200.0,
            target in -200.0f32..200.0,
        ) {
            let mut y = start;
            let mut gap = (target - y).abs();
            let mut settled = false;
            for _ in 0..200 {
                y = snap_toward(y, target, 0.28, 10.0);
                let next_gap = (target - y).abs();
                if settled {
                    prop_assert_eq!(y, target);
                } else {
                    prop_assert!(next_gap < gap || next_gap == 0.0);
                }
                if y == target {
                    settled = true;
                }
                gap = next_gap;
            }
            prop_assert!(settled);
        }

        #[test]
        fn prop_roll_spin_in_range(
            velocities in proptest::collection::vec(-40.0f32..40.0, 1..60),
            dt in 0.0f32..100.0,
        ) {
            let terrain = empty();
            let mut c = Character::with_placeholder_sprites(Vec2::new(0.0, 0.0), Tuning::default())
                .unwrap();
            for vx in velocities {
                c.state = MovementState::Rolling;
                c.velocity = Vec2::new(vx, 0.0);
                c.update(dt, &InputSnapshot::default(), &terrain);
                prop_assert!(c.roll_spin_degrees >= 0.0);
                prop_assert!(c.roll_spin_degrees < 360.0);
            }
        }
    }
}
