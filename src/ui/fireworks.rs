/// Bonus-round fireworks: a burst of particles in logical canvas space.
///
/// Particles advance in fixed steps of `STEP_MS` regardless of how often
/// the frame loop runs, so the burst looks the same at any frame rate.

use crossterm::style::Color;
use rand::Rng;

use crate::domain::clock::Millis;
use crate::domain::creature::{LOGICAL_H, LOGICAL_W};

pub const BURST_SIZE: usize = 50;
pub const MAX_SPEED: f32 = 4.0;
pub const GRAVITY: f32 = 0.2;
pub const LIFE_DECAY: f32 = 0.02;
/// One animation step (~60 steps per second).
pub const STEP_MS: Millis = 16;

pub const PALETTE: [Color; 4] = [
    Color::Rgb { r: 168, g: 85, b: 247 },  // purple 500
    Color::Rgb { r: 192, g: 132, b: 252 }, // purple 400
    Color::Rgb { r: 216, g: 180, b: 254 }, // purple 300
    Color::Rgb { r: 255, g: 215, b: 0 },   // gold
];

#[derive(Clone, Debug)]
pub struct Particle {
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub life: f32,
    pub color: Color,
}

impl Particle {
    fn step(&mut self) {
        self.x += self.vx;
        self.y += self.vy;
        self.vy += GRAVITY;
        self.life -= LIFE_DECAY;
    }
}

#[derive(Default)]
pub struct Fireworks {
    particles: Vec<Particle>,
    last_step: Option<Millis>,
}

impl Fireworks {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a burst at the canvas centre.
    pub fn spawn<R: Rng + ?Sized>(&mut self, rng: &mut R, now: Millis) {
        let (cx, cy) = (LOGICAL_W / 2.0, LOGICAL_H / 2.0);
        for _ in 0..BURST_SIZE {
            self.particles.push(Particle {
                x: cx,
                y: cy,
                vx: rng.gen_range(-MAX_SPEED..MAX_SPEED),
                vy: rng.gen_range(-MAX_SPEED..MAX_SPEED),
                life: 1.0,
                color: PALETTE[rng.gen_range(0..PALETTE.len())],
            });
        }
        if self.last_step.is_none() {
            self.last_step = Some(now);
        }
    }

    /// Advance by however many whole steps have passed since the last update.
    pub fn update(&mut self, now: Millis) {
        let Some(last) = self.last_step else { return };
        let steps = now.saturating_sub(last) / STEP_MS;
        for _ in 0..steps {
            for p in &mut self.particles {
                p.step();
            }
        }
        self.last_step = Some(last + steps * STEP_MS);
        self.particles.retain(|p| p.life > 0.0);
        if self.particles.is_empty() {
            self.last_step = None;
        }
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.last_step = None;
    }

    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }
}
