use crate::color::hsl;
use crate::surface::Surface;

const PHASE_STEP: f32 = 0.02;
const LINE_SPACING: f32 = 50.0;
const SAMPLE_STEP: f32 = 20.0;
const GLOW_COUNT: usize = 8;

/// Wave grid backdrop. No entities: everything is a pure function of the
/// accumulated phase, so resize costs nothing and the glows wrap seamlessly
/// by modulo instead of being respawned.
pub(crate) struct GridWave {
    pub(crate) t: f32,
}

impl GridWave {
    pub(crate) fn new() -> Self {
        Self { t: 0.0 }
    }

    pub(crate) fn tick(&mut self) {
        self.t += PHASE_STEP;
    }

    /// Lateral offset for a grid line: a coarse swell on the line position
    /// plus a finer term woven from both coordinates.
    fn weave(&self, along: f32, across: f32) -> f32 {
        let coarse = (self.t + across * 0.02).sin() * 6.0;
        let fine = (self.t * 1.7 + across * 0.01 + along * 0.05).cos() * 2.5;
        coarse + fine
    }

    pub(crate) fn render(&self, s: &mut Surface) {
        let w = s.w as f32;
        let h = s.h as f32;
        if w <= 0.0 || h <= 0.0 {
            return;
        }

        // Slow global brightness pulse on the wireframe.
        let alpha = 0.09 + 0.045 * (self.t * 1.3).sin();
        let line = hsl(187.0, 0.85, 0.55);

        // Vertical lines, displaced horizontally.
        let mut x = 0.0;
        while x <= w {
            let mut prev: Option<(f32, f32)> = None;
            let mut y = 0.0;
            while y <= h {
                let px = x + self.weave(y, x);
                if let Some((ax, ay)) = prev {
                    s.stroke(ax, ay, px, y, 0.5, line, alpha);
                }
                prev = Some((px, y));
                y += SAMPLE_STEP;
            }
            x += LINE_SPACING;
        }

        // Horizontal lines, displaced vertically.
        let mut y = 0.0;
        while y <= h {
            let mut prev: Option<(f32, f32)> = None;
            let mut x = 0.0;
            while x <= w {
                let py = y + self.weave(x, y);
                if let Some((ax, ay)) = prev {
                    s.stroke(ax, ay, x, py, 0.5, line, alpha);
                }
                prev = Some((x, py));
                x += SAMPLE_STEP;
            }
            y += LINE_SPACING;
        }

        // Traveling glow pulses: linear in x wrapping modulo an even division
        // of the width, sinusoidal in y.
        let slot = w / GLOW_COUNT as f32;
        let glow = hsl(180.0, 0.9, 0.65);
        for i in 0..GLOW_COUNT {
            let gx = (self.t * 40.0 + i as f32 * slot).rem_euclid(w);
            let gy = h * 0.5 + (self.t * 0.9 + i as f32 * 1.7).sin() * h * 0.35;
            s.splat(gx, gy, 9.0, glow, 0.35);
        }
    }
}
