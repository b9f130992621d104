use rand::Rng;

use crate::color::{hsl, Rgb};
use crate::surface::Surface;

const ROLL_INTERVAL: f32 = 8.0;
const ROLL_CHANCE: f64 = 0.3;
const DISPLAY_SECS: f32 = 0.5;
const STEP_MIN: f32 = 30.0;
const STEP_MAX: f32 = 70.0;
const JITTER: f32 = 30.0;

/// One strike: an immutable jagged polyline from the top edge down to a
/// random depth, alive for exactly `DISPLAY_SECS` after `born`.
pub(crate) struct Bolt {
    pub(crate) points: Vec<(f32, f32)>,
    pub(crate) born: f32,
}

/// Walk downward from a random top-edge origin in random vertical steps
/// with horizontal jitter until the target depth is reached. An overshooting
/// final step terminates the path as-is; nothing clamps it back.
pub(crate) fn gen_path(rng: &mut impl Rng, w: f32, h: f32) -> Vec<(f32, f32)> {
    let mut x = rng.gen_range(0.0..w.max(1.0));
    let mut y = 0.0f32;
    let target = h * 0.3 + rng.gen_range(0.0..1.0) * h * 0.4;
    let mut points = vec![(x, y)];
    while y < target {
        y += rng.gen_range(STEP_MIN..STEP_MAX);
        x += rng.gen_range(-JITTER..JITTER);
        points.push((x, y));
    }
    points
}

/// Event-driven layer: a periodic roll may add a bolt; each bolt ages out
/// on its own clock. Bolts never interact.
pub(crate) struct LightningLayer {
    pub(crate) bolts: Vec<Bolt>,
    next_roll: f32,
}

impl LightningLayer {
    pub(crate) fn new() -> Self {
        Self {
            bolts: Vec::new(),
            next_roll: ROLL_INTERVAL,
        }
    }

    /// Unconditional strike, used by the update roll and by tests.
    pub(crate) fn trigger(&mut self, rng: &mut impl Rng, now: f32, w: f32, h: f32) {
        self.bolts.push(Bolt {
            points: gen_path(rng, w, h),
            born: now,
        });
    }

    pub(crate) fn update(&mut self, rng: &mut impl Rng, now: f32, w: f32, h: f32) {
        while now >= self.next_roll {
            self.next_roll += ROLL_INTERVAL;
            if w > 0.0 && h > 0.0 && rng.gen_bool(ROLL_CHANCE) {
                self.trigger(rng, now, w, h);
            }
        }
        self.bolts.retain(|b| now - b.born < DISPLAY_SECS);
    }

    pub(crate) fn render(&self, s: &mut Surface, now: f32, rng: &mut impl Rng) {
        for b in &self.bolts {
            let age = now - b.born;
            // Fade in, hold, fade out across the 500 ms window.
            let a = if age < 0.08 {
                age / 0.08
            } else if age < 0.3 {
                1.0
            } else {
                (1.0 - (age - 0.3) / (DISPLAY_SECS - 0.3)).max(0.0)
            };
            let halo = hsl(205.0, 0.9, 0.75);
            let core = Rgb {
                r: 240,
                g: 248,
                b: 255,
            };
            for seg in b.points.windows(2) {
                let (x0, y0) = seg[0];
                let (x1, y1) = seg[1];
                s.stroke(x0, y0, x1, y1, 2.5, halo, a * 0.10);
                s.stroke(x0, y0, x1, y1, 0.5, core, a);
            }
            // Sparse sparks on a random subset of vertices.
            for &(x, y) in &b.points {
                if rng.gen_bool(0.25) {
                    s.splat(x, y, 1.8, halo, a * 0.5);
                }
            }
        }
    }
}
