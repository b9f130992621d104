use rand::Rng;

use crate::color::hsl;
use crate::surface::Surface;

pub(crate) const ORB_COUNT: usize = 5;
const RING_THRESHOLD: f32 = 0.9;

/// Immortal drifting blob. Never destroyed; edge crossings wrap toroidally.
pub(crate) struct Orb {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) radius: f32,
    pub(crate) hue: f32,
    pub(crate) vx: f32,
    pub(crate) vy: f32,
    pub(crate) phase: f32,
    pub(crate) pulse_speed: f32,
}

impl Orb {
    fn spawn(rng: &mut impl Rng, w: f32, h: f32) -> Self {
        Self {
            x: rng.gen_range(0.0..w.max(1.0)),
            y: rng.gen_range(0.0..h.max(1.0)),
            radius: rng.gen_range(50.0..150.0),
            hue: rng.gen_range(170.0..210.0),
            vx: rng.gen_range(-0.1..0.1),
            vy: rng.gen_range(-0.1..0.1),
            phase: rng.gen_range(0.0..std::f32::consts::TAU),
            pulse_speed: rng.gen_range(0.01..0.03),
        }
    }

    /// Toroidal wrap on both axes: once the orb (center plus radius) has
    /// fully left an edge it re-enters exactly at the opposite boundary.
    pub(crate) fn wrap(&mut self, w: f32, h: f32) {
        if self.x - self.radius > w {
            self.x = -self.radius;
        } else if self.x + self.radius < 0.0 {
            self.x = w + self.radius;
        }
        if self.y - self.radius > h {
            self.y = -self.radius;
        } else if self.y + self.radius < 0.0 {
            self.y = h + self.radius;
        }
    }
}

pub(crate) struct OrbLayer {
    pub(crate) orbs: Vec<Orb>,
}

impl OrbLayer {
    pub(crate) fn new(rng: &mut impl Rng, w: f32, h: f32) -> Self {
        let orbs = (0..ORB_COUNT).map(|_| Orb::spawn(rng, w, h)).collect();
        Self { orbs }
    }

    pub(crate) fn tick(&mut self, w: f32, h: f32) {
        for o in &mut self.orbs {
            o.phase += o.pulse_speed;
            o.x += o.vx;
            o.y += o.vy;
            o.wrap(w, h);
        }
    }

    pub(crate) fn render(&self, s: &mut Surface) {
        for o in &self.orbs {
            let pulse = o.phase.sin();
            // Radius envelope [0.2, 0.8] of the base radius.
            let r = o.radius * (0.5 + 0.3 * pulse);
            let alpha = 0.20 + 0.10 * pulse;
            let core = hsl(o.hue, 0.85, 0.55);
            s.splat(o.x, o.y, r, core, alpha);
            // Rare accent: recomputed from phase every frame, not sticky.
            if pulse > RING_THRESHOLD {
                s.ring(o.x, o.y, r * 0.8, 1.5, hsl(o.hue, 0.9, 0.75), 0.35);
            }
        }
    }
}
