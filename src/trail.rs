use rand::Rng;

use crate::color::{hsl, Rgb};
use crate::surface::Surface;

const SAMPLE_MIN_MS: u64 = 16;
const PRIMARY_LIFE: u32 = 30;
const SPARK_LIFE: u32 = 20;
const SPARK_SPEED: f32 = 5.0;
const MAX_SIZE: f32 = 5.0;
const RING_CHANCE: f64 = 0.08;

/// Mortal pointer-trail particle.
pub(crate) struct TrailDot {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) size: f32,
    pub(crate) hue: f32,
    pub(crate) life: u32,
    pub(crate) life0: u32,
}

/// Particles spawned by pointer movement. The mouse listener only ever
/// appends (via `sample`); decrement-and-filter happens once per tick on
/// the frame path, so the collection has a single mutation discipline.
pub(crate) struct TrailLayer {
    pub(crate) dots: Vec<TrailDot>,
    last_sample: Option<(f32, f32, u64)>,
}

impl TrailLayer {
    pub(crate) fn new() -> Self {
        Self {
            dots: Vec::new(),
            last_sample: None,
        }
    }

    /// Offer a pointer sample at `t_ms`. Samples closer than ~16 ms to the
    /// last accepted one are dropped, which both rate-limits emission and
    /// keeps speed estimates frame-aligned. Returns whether it was accepted.
    pub(crate) fn sample(&mut self, rng: &mut impl Rng, x: f32, y: f32, t_ms: u64) -> bool {
        let speed = match self.last_sample {
            Some((_, _, lt)) if t_ms.saturating_sub(lt) < SAMPLE_MIN_MS => return false,
            Some((lx, ly, lt)) => {
                let dist = ((x - lx).powi(2) + (y - ly).powi(2)).sqrt();
                let dt = t_ms.saturating_sub(lt).max(1) as f32;
                // Units per nominal 16 ms sample window.
                dist * SAMPLE_MIN_MS as f32 / dt
            }
            None => 0.0,
        };

        self.dots.push(TrailDot {
            x,
            y,
            size: (1.2 + speed * 0.35).min(MAX_SIZE),
            hue: 185.0 + (speed * 12.0) % 50.0,
            life: PRIMARY_LIFE,
            life0: PRIMARY_LIFE,
        });

        if speed > SPARK_SPEED {
            for _ in 0..2 {
                self.dots.push(TrailDot {
                    x: x + rng.gen_range(-4.0..4.0),
                    y: y + rng.gen_range(-4.0..4.0),
                    size: (0.8 + speed * 0.2).min(MAX_SIZE * 0.6),
                    hue: 185.0 + (speed * 12.0) % 50.0 + rng.gen_range(-20.0..20.0),
                    life: SPARK_LIFE,
                    life0: SPARK_LIFE,
                });
            }
        }

        self.last_sample = Some((x, y, t_ms));
        true
    }

    /// Age every particle by one tick; expiry removes in place.
    pub(crate) fn tick(&mut self) {
        for d in &mut self.dots {
            d.life -= 1;
        }
        self.dots.retain(|d| d.life > 0);
    }

    pub(crate) fn render(&self, s: &mut Surface, rng: &mut impl Rng) {
        let hot = Rgb {
            r: 235,
            g: 245,
            b: 255,
        };
        for d in &self.dots {
            let frac = d.life as f32 / d.life0 as f32;
            // Fresh particles flash toward white, then settle into their hue.
            let core = hsl(d.hue, 0.9, 0.65).lerp(hot, (frac - 0.8).max(0.0) * 3.0);
            s.splat(d.x, d.y, d.size * 1.5, core, 0.8 * frac);
            // Cosmetic flicker: young particles occasionally throw an
            // expanding ring. Pure per-frame coin flip, no state.
            if d.life * 2 > d.life0 && rng.gen_bool(RING_CHANCE) {
                let r = d.size * (1.5 + 2.5 * (1.0 - frac));
                s.ring(d.x, d.y, r, 0.8, hsl(d.hue, 0.9, 0.8), 0.25 * frac);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(0xDEAD)
    }

    #[test]
    fn first_sample_spawns_one_primary() {
        let mut t = TrailLayer::new();
        assert!(t.sample(&mut rng(), 10.0, 10.0, 100));
        assert_eq!(t.dots.len(), 1);
        assert_eq!(t.dots[0].life, PRIMARY_LIFE);
    }

    #[test]
    fn throttle_rejects_sub_16ms_samples() {
        let mut t = TrailLayer::new();
        let mut r = rng();
        assert!(t.sample(&mut r, 0.0, 0.0, 1000));
        assert!(!t.sample(&mut r, 5.0, 5.0, 1010));
        assert_eq!(t.dots.len(), 1);
        assert!(t.sample(&mut r, 5.0, 5.0, 1016));
        assert_eq!(t.dots.len(), 2);
    }

    #[test]
    fn fast_movement_adds_two_sparks() {
        let mut t = TrailLayer::new();
        let mut r = rng();
        t.sample(&mut r, 0.0, 0.0, 0);
        // 200 px in 20 ms is far above the 5 units/sample threshold.
        t.sample(&mut r, 200.0, 0.0, 20);
        assert_eq!(t.dots.len(), 1 + 1 + 2);
        let sparks: Vec<_> = t.dots.iter().filter(|d| d.life0 == SPARK_LIFE).collect();
        assert_eq!(sparks.len(), 2);
    }

    #[test]
    fn slow_movement_spawns_no_sparks() {
        let mut t = TrailLayer::new();
        let mut r = rng();
        t.sample(&mut r, 0.0, 0.0, 0);
        t.sample(&mut r, 1.0, 0.0, 20);
        assert_eq!(t.dots.len(), 2);
    }

    #[test]
    fn life_decrements_by_one_and_expires_exactly_at_zero() {
        let mut t = TrailLayer::new();
        t.sample(&mut rng(), 0.0, 0.0, 0);
        for expected in (0..PRIMARY_LIFE).rev() {
            t.tick();
            if expected == 0 {
                assert!(t.dots.is_empty());
            } else {
                assert_eq!(t.dots.len(), 1);
                assert_eq!(t.dots[0].life, expected);
            }
        }
    }

    #[test]
    fn collection_only_grows_via_accepted_samples() {
        let mut t = TrailLayer::new();
        let mut r = rng();
        t.sample(&mut r, 0.0, 0.0, 0);
        let mut prev = t.dots.len();
        for _ in 0..40 {
            t.tick();
            assert!(t.dots.len() <= prev);
            prev = t.dots.len();
        }
        assert!(t.dots.is_empty());
    }

    #[test]
    fn size_is_clamped() {
        let mut t = TrailLayer::new();
        let mut r = rng();
        t.sample(&mut r, 0.0, 0.0, 0);
        t.sample(&mut r, 100_000.0, 0.0, 16);
        for d in &t.dots {
            assert!(d.size <= MAX_SIZE);
        }
    }
}
