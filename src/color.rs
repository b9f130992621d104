#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct Rgb {
    pub(crate) r: u8,
    pub(crate) g: u8,
    pub(crate) b: u8,
}

impl Rgb {
    pub(crate) const BLACK: Rgb = Rgb { r: 0, g: 0, b: 0 };

    pub(crate) fn lerp(self, other: Rgb, t: f32) -> Rgb {
        let t = t.clamp(0.0, 1.0);
        let f = |a: u8, b: u8| -> u8 {
            ((a as f32) + (b as f32 - a as f32) * t)
                .round()
                .clamp(0.0, 255.0) as u8
        };
        Rgb {
            r: f(self.r, other.r),
            g: f(self.g, other.g),
            b: f(self.b, other.b),
        }
    }

    pub(crate) fn scale(self, k: f32) -> Rgb {
        let k = k.max(0.0);
        let f = |a: u8| -> u8 { ((a as f32) * k).round().clamp(0.0, 255.0) as u8 };
        Rgb {
            r: f(self.r),
            g: f(self.g),
            b: f(self.b),
        }
    }
}

/// HSL to RGB. Hue in degrees (wraps), saturation and lightness in [0,1].
/// The effect layers pick colors in narrow hue bands, so this is the one
/// color-space conversion the whole program needs.
pub(crate) fn hsl(hue: f32, sat: f32, light: f32) -> Rgb {
    let h = hue.rem_euclid(360.0);
    let s = sat.clamp(0.0, 1.0);
    let l = light.clamp(0.0, 1.0);

    let c = (1.0 - (2.0 * l - 1.0).abs()) * s;
    let hp = h / 60.0;
    let x = c * (1.0 - (hp % 2.0 - 1.0).abs());
    let (r1, g1, b1) = match hp as u32 {
        0 => (c, x, 0.0),
        1 => (x, c, 0.0),
        2 => (0.0, c, x),
        3 => (0.0, x, c),
        4 => (x, 0.0, c),
        _ => (c, 0.0, x),
    };
    let m = l - c / 2.0;
    let q = |v: f32| -> u8 { ((v + m) * 255.0).round().clamp(0.0, 255.0) as u8 };
    Rgb {
        r: q(r1),
        g: q(g1),
        b: q(b1),
    }
}
