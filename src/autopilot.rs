//! Seeded input generator
//!
//! Drives the character without a keyboard: the demo binary uses it as an
//! attract mode and the tests use it to check determinism.

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use crate::sim::InputSnapshot;

/// What the autopilot is currently trying to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Intent {
    Idle,
    WalkLeft,
    WalkRight,
    /// Build speed to the right, then tuck into a roll
    RollRight,
    RollLeft,
    Jump,
}

impl Intent {
    const ALL: [Intent; 6] = [
        Intent::Idle,
        Intent::WalkLeft,
        Intent::WalkRight,
        Intent::RollRight,
        Intent::RollLeft,
        Intent::Jump,
    ];
}

#[derive(Debug, Clone)]
pub struct Autopilot {
    rng: Pcg32,
    intent: Intent,
    ticks_left: u32,
    elapsed: u32,
}

impl Autopilot {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: Pcg32::seed_from_u64(seed),
            intent: Intent::Idle,
            ticks_left: 0,
            elapsed: 0,
        }
    }

    pub fn intent(&self) -> Intent {
        self.intent
    }

    /// Input for the next tick
    pub fn next_input(&mut self) -> InputSnapshot {
        if self.ticks_left == 0 {
            self.intent = Intent::ALL[self.rng.random_range(0..Intent::ALL.len())];
            self.ticks_left = match self.intent {
                Intent::Jump => 1,
                _ => self.rng.random_range(20..90),
            };
            self.elapsed = 0;
            log::trace!("Autopilot intent {:?} for {} ticks", self.intent, self.ticks_left);
        }
        self.ticks_left -= 1;
        self.elapsed += 1;

        let mut input = InputSnapshot::default();
        match self.intent {
            Intent::Idle => {}
            Intent::WalkLeft => input.left = true,
            Intent::WalkRight => input.right = true,
            Intent::RollRight | Intent::RollLeft => {
                // Run up first so the roll has speed to keep
                if self.elapsed < 20 {
                    input.right = self.intent == Intent::RollRight;
                    input.left = self.intent == Intent::RollLeft;
                } else {
                    input.down = true;
                }
            }
            Intent::Jump => input.jump = true,
        }
        input
    }
}
