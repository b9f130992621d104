use rand::Rng;

use crate::color::hsl;
use crate::surface::Surface;

pub(crate) const MOTE_COUNT: usize = 100;
const PHASE_STEP: f32 = 0.05;
const RING_THRESHOLD: f32 = 0.95;

/// Small glowing particle drifting upward. Immortal: horizontal edges wrap
/// toroidally, but crossing the top respawns it at the bottom with a fresh
/// random x, so the layer reads as continuous emission rather than a loop.
pub(crate) struct Mote {
    pub(crate) x: f32,
    pub(crate) y: f32,
    pub(crate) size: f32,
    pub(crate) hue: f32,
    pub(crate) base_alpha: f32,
    pub(crate) vx: f32,
    pub(crate) vy: f32,
    pub(crate) phase: f32,
}

impl Mote {
    fn spawn(rng: &mut impl Rng, w: f32, h: f32) -> Self {
        Self {
            x: rng.gen_range(0.0..w.max(1.0)),
            y: rng.gen_range(0.0..h.max(1.0)),
            size: rng.gen_range(1.0..4.0),
            hue: rng.gen_range(180.0..220.0),
            base_alpha: rng.gen_range(0.3..0.8),
            vx: rng.gen_range(-0.3..0.3),
            vy: rng.gen_range(-0.7..-0.2),
            phase: rng.gen_range(0.0..std::f32::consts::TAU),
        }
    }
}

pub(crate) struct MoteLayer {
    pub(crate) motes: Vec<Mote>,
}

impl MoteLayer {
    pub(crate) fn new(rng: &mut impl Rng, w: f32, h: f32) -> Self {
        let motes = (0..MOTE_COUNT).map(|_| Mote::spawn(rng, w, h)).collect();
        Self { motes }
    }

    pub(crate) fn tick(&mut self, rng: &mut impl Rng, w: f32, h: f32) {
        for m in &mut self.motes {
            m.phase += PHASE_STEP;
            m.x += m.vx;
            m.y += m.vy;

            if m.x - m.size > w {
                m.x = -m.size;
            } else if m.x + m.size < 0.0 {
                m.x = w + m.size;
            }
            // Top exit: re-emit from the bottom at a new column.
            if m.y + m.size < 0.0 {
                m.y = h + m.size;
                m.x = rng.gen_range(0.0..w.max(1.0));
            }
        }
    }

    pub(crate) fn render(&self, s: &mut Surface) {
        for m in &self.motes {
            let pulse = m.phase.sin();
            let r = m.size * (1.2 + 0.5 * pulse);
            let alpha = m.base_alpha * (0.7 + 0.3 * pulse);
            s.splat(m.x, m.y, r.max(0.6), hsl(m.hue, 0.85, 0.65), alpha);
            if pulse > RING_THRESHOLD {
                s.ring(m.x, m.y, r * 1.6, 0.8, hsl(m.hue, 0.9, 0.8), 0.3);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn count_is_fixed() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut layer = MoteLayer::new(&mut rng, 160.0, 96.0);
        assert_eq!(layer.motes.len(), MOTE_COUNT);
        for _ in 0..5000 {
            layer.tick(&mut rng, 160.0, 96.0);
        }
        assert_eq!(layer.motes.len(), MOTE_COUNT);
    }

    #[test]
    fn spawn_parameters_in_range() {
        let mut rng = StdRng::seed_from_u64(11);
        let layer = MoteLayer::new(&mut rng, 160.0, 96.0);
        for m in &layer.motes {
            assert!((1.0..4.0).contains(&m.size));
            assert!((180.0..220.0).contains(&m.hue));
            assert!((0.3..0.8).contains(&m.base_alpha));
            assert!((-0.7..-0.2).contains(&m.vy));
        }
    }

    #[test]
    fn horizontal_wrap_is_toroidal() {
        let mut rng = StdRng::seed_from_u64(5);
        let (w, h) = (100.0, 50.0);
        let mut layer = MoteLayer::new(&mut rng, w, h);
        let m = &mut layer.motes[0];
        m.size = 2.0;
        m.x = 103.0;
        m.vx = 0.0;
        m.vy = 0.0;
        layer.tick(&mut rng, w, h);
        assert_eq!(layer.motes[0].x, -2.0);

        layer.motes[0].x = -3.0;
        layer.tick(&mut rng, w, h);
        assert_eq!(layer.motes[0].x, 102.0);
    }

    #[test]
    fn top_exit_respawns_at_bottom_with_new_column() {
        let (w, h) = (100.0, 50.0);
        let mut layer = MoteLayer::new(&mut StdRng::seed_from_u64(5), w, h);
        let m = &mut layer.motes[0];
        m.size = 2.0;
        m.x = 40.0;
        m.y = -3.0;
        m.vx = 0.0;
        m.vy = 0.0;
        // Mote 0 is processed first, so the respawn column is the tick
        // rng's first draw.
        let expected_x = StdRng::seed_from_u64(1).gen_range(0.0..w);
        layer.tick(&mut StdRng::seed_from_u64(1), w, h);
        assert_eq!(layer.motes[0].y, h + 2.0);
        assert_eq!(layer.motes[0].x, expected_x);
    }

    #[test]
    fn phase_outruns_orb_pulse() {
        let mut rng = StdRng::seed_from_u64(8);
        let mut layer = MoteLayer::new(&mut rng, 160.0, 96.0);
        let before = layer.motes[0].phase;
        layer.tick(&mut rng, 160.0, 96.0);
        let after = layer.motes[0].phase;
        assert!((after - before - PHASE_STEP).abs() < 1e-6);
    }
}
