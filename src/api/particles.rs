use std::f64::consts::{FRAC_PI_2, PI};

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::core::{Momentum, PixelPoint};
use crate::render::{CirclePrimitive, Color, RenderFrame};

use super::DegenOptions;

/// Live particle cap.
pub const MAX_PARTICLES: usize = 80;
/// Minimum delay between two bursts.
pub const BURST_COOLDOWN_MS: f64 = 400.0;
/// Swing below which bursts do not fire and the burst streak resets.
pub const MIN_BURST_SWING: f64 = 0.08;
const MAX_BURST_STREAK: u8 = 3;
const STREAK_FALLOFF: [f64; 3] = [1.0, 0.6, 0.35];
const PARTICLE_LIFETIME_SECS: f64 = 1.0;
const VELOCITY_DAMPING: f64 = 0.95;
const SHAKE_DECAY_PER_SEC: f64 = 0.002;
const SHAKE_MIN_AMPLITUDE: f64 = 0.2;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    /// Remaining life in `(0, 1]`.
    pub life: f64,
    pub size: f64,
    pub color: Color,
}

/// Swing observed at the live dot this frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwingEvent {
    pub momentum: Momentum,
    pub origin: PixelPoint,
    pub swing: f64,
    pub accent: Color,
}

/// Fixed-capacity pool of burst particles.
///
/// The backing vector is allocated once; dead particles are swap-removed.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleState {
    particles: Vec<Particle>,
    cooldown_ms: f64,
    burst_count: u8,
}

impl Default for ParticleState {
    fn default() -> Self {
        Self {
            particles: Vec::with_capacity(MAX_PARTICLES),
            cooldown_ms: 0.0,
            burst_count: 0,
        }
    }
}

impl ParticleState {
    #[must_use]
    pub fn len(&self) -> usize {
        self.particles.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    #[must_use]
    pub fn particles(&self) -> &[Particle] {
        &self.particles
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.particles.capacity()
    }

    /// Emits a burst at the live dot on a large swing and returns its
    /// intensity in `[0, 1]`, or `0` when nothing fired.
    ///
    /// Consecutive bursts weaken until the swing calms down again.
    pub fn spawn_on_swing<R: Rng + ?Sized>(
        &mut self,
        event: SwingEvent,
        dt_ms: f64,
        options: DegenOptions,
        rng: &mut R,
    ) -> f64 {
        let SwingEvent {
            momentum,
            origin,
            swing,
            accent,
        } = event;
        self.cooldown_ms = (self.cooldown_ms - dt_ms).max(0.0);
        if momentum == Momentum::Flat || self.cooldown_ms > 0.0 {
            return 0.0;
        }
        if swing < MIN_BURST_SWING {
            self.burst_count = 0;
            return 0.0;
        }
        if momentum == Momentum::Down && !options.down_momentum {
            return 0.0;
        }
        if self.burst_count >= MAX_BURST_STREAK {
            return 0.0;
        }

        self.cooldown_ms = BURST_COOLDOWN_MS;
        let magnitude = (swing * 5.0).min(1.0);
        let falloff = if magnitude > 0.6 {
            1.0
        } else {
            STREAK_FALLOFF
                .get(usize::from(self.burst_count))
                .copied()
                .unwrap_or(0.35)
        };
        self.burst_count += 1;

        let count = ((12.0 + magnitude * 20.0) * options.scale * falloff).round();
        let speed_scale = 1.0 + magnitude * 0.8;
        let heading = if momentum == Momentum::Up {
            -FRAC_PI_2
        } else {
            FRAC_PI_2
        };

        let mut spawned = 0.0;
        while spawned < count && self.particles.len() < MAX_PARTICLES {
            let angle = heading + (rng.random::<f64>() - 0.5) * PI * 1.2;
            let speed = (60.0 + rng.random::<f64>() * 100.0) * speed_scale;
            let x = origin.0 + (rng.random::<f64>() - 0.5) * 24.0;
            let y = origin.1 + (rng.random::<f64>() - 0.5) * 8.0;
            let size = (1.0 + rng.random::<f64>() * 1.2) * options.scale * falloff;
            self.particles.push(Particle {
                x,
                y,
                vx: angle.cos() * speed,
                vy: angle.sin() * speed,
                life: 1.0,
                size,
                color: accent,
            });
            spawned += 1.0;
        }
        falloff
    }

    /// Ages, moves and damps every particle, dropping dead ones.
    pub fn advance(&mut self, dt_ms: f64) {
        let dt_secs = dt_ms / 1000.0;
        let mut index = 0;
        while index < self.particles.len() {
            let particle = &mut self.particles[index];
            particle.life -= dt_secs / PARTICLE_LIFETIME_SECS;
            if particle.life <= 0.0 {
                self.particles.swap_remove(index);
                continue;
            }
            particle.x += particle.vx * dt_secs;
            particle.y += particle.vy * dt_secs;
            particle.vx *= VELOCITY_DAMPING;
            particle.vy *= VELOCITY_DAMPING;
            index += 1;
        }
    }

    pub fn draw(&self, frame: &mut RenderFrame) {
        for particle in &self.particles {
            frame.circle(CirclePrimitive::filled(
                particle.x,
                particle.y,
                particle.size * (0.5 + particle.life * 0.5),
                particle.color.fade(particle.life * 0.55),
            ));
        }
    }
}

/// Whole-scene jitter kicked by particle bursts.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ShakeState {
    pub amplitude: f64,
}

impl ShakeState {
    /// Random translation for this frame; zero once the shake has settled.
    pub fn offset<R: Rng + ?Sized>(&self, rng: &mut R) -> (f64, f64) {
        if self.amplitude <= SHAKE_MIN_AMPLITUDE {
            return (0.0, 0.0);
        }
        let dx = (rng.random::<f64>() - 0.5) * 2.0 * self.amplitude;
        let dy = (rng.random::<f64>() - 0.5) * 2.0 * self.amplitude;
        (dx, dy)
    }

    /// Exponential decay, cut to zero below the visible threshold.
    pub fn decay(&mut self, dt_ms: f64) {
        self.amplitude *= SHAKE_DECAY_PER_SEC.powf(dt_ms / 1000.0);
        if self.amplitude < SHAKE_MIN_AMPLITUDE {
            self.amplitude = 0.0;
        }
    }

    /// Sets the amplitude for a burst of intensity `burst` at `swing`.
    pub fn kick(&mut self, swing: f64, burst: f64) {
        self.amplitude = (3.0 + swing * 4.0) * burst;
    }
}
