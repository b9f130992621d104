use std::io::{self, Write};

use crossterm::{
    cursor, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{BeginSynchronizedUpdate, EndSynchronizedUpdate},
};

use crate::color::Rgb;

/// Per-layer accumulation raster at braille sub-pixel resolution
/// (cols x 2 wide, rows x 4 tall). Values are linear light, additive,
/// unclamped until composite time. Each layer owns exactly one.
pub(crate) struct Surface {
    pub(crate) w: usize,
    pub(crate) h: usize,
    px: Vec<[f32; 3]>,
}

impl Surface {
    pub(crate) fn new(w: usize, h: usize) -> Self {
        Self {
            w,
            h,
            px: vec![[0.0; 3]; w * h],
        }
    }

    /// Resizing recreates the buffer; never called mid-frame.
    pub(crate) fn resize(&mut self, w: usize, h: usize) {
        self.w = w;
        self.h = h;
        self.px.clear();
        self.px.resize(w * h, [0.0; 3]);
    }

    pub(crate) fn clear(&mut self) {
        for p in &mut self.px {
            *p = [0.0; 3];
        }
    }

    #[inline]
    pub(crate) fn pixel(&self, x: usize, y: usize) -> [f32; 3] {
        self.px[y * self.w + x]
    }

    #[inline]
    pub(crate) fn add(&mut self, x: i32, y: i32, color: Rgb, alpha: f32) {
        if x < 0 || y < 0 || x >= self.w as i32 || y >= self.h as i32 || alpha <= 0.0 {
            return;
        }
        let i = y as usize * self.w + x as usize;
        self.px[i][0] += color.r as f32 / 255.0 * alpha;
        self.px[i][1] += color.g as f32 / 255.0 * alpha;
        self.px[i][2] += color.b as f32 / 255.0 * alpha;
    }

    /// Soft radial gradient blob: full alpha at the center falling off
    /// quadratically to transparent at `radius`.
    pub(crate) fn splat(&mut self, cx: f32, cy: f32, radius: f32, color: Rgb, alpha: f32) {
        if radius <= 0.0 || alpha <= 0.0 {
            return;
        }
        let x0 = (cx - radius).floor().max(0.0) as i32;
        let x1 = (cx + radius).ceil().min(self.w as f32) as i32;
        let y0 = (cy - radius).floor().max(0.0) as i32;
        let y1 = (cy + radius).ceil().min(self.h as f32) as i32;
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let d = (dx * dx + dy * dy).sqrt();
                if d >= radius {
                    continue;
                }
                let fall = 1.0 - d / radius;
                self.add(x, y, color, alpha * fall * fall);
            }
        }
    }

    /// Thin circle outline with a soft edge, for the pulse-accent rings.
    pub(crate) fn ring(
        &mut self,
        cx: f32,
        cy: f32,
        radius: f32,
        thickness: f32,
        color: Rgb,
        alpha: f32,
    ) {
        if radius <= 0.0 || alpha <= 0.0 {
            return;
        }
        let outer = radius + thickness;
        let x0 = (cx - outer).floor().max(0.0) as i32;
        let x1 = (cx + outer).ceil().min(self.w as f32) as i32;
        let y0 = (cy - outer).floor().max(0.0) as i32;
        let y1 = (cy + outer).ceil().min(self.h as f32) as i32;
        for y in y0..y1 {
            for x in x0..x1 {
                let dx = x as f32 + 0.5 - cx;
                let dy = y as f32 + 0.5 - cy;
                let d = (dx * dx + dy * dy).sqrt();
                let band = (d - radius).abs();
                if band >= thickness {
                    continue;
                }
                let fall = 1.0 - band / thickness;
                self.add(x, y, color, alpha * fall);
            }
        }
    }

    /// Stroke a segment by stamping small discs along it. `width` is the
    /// disc radius; a width under ~0.8 degenerates to single pixels, which
    /// is what the crisp lightning core and the grid lines want.
    pub(crate) fn stroke(
        &mut self,
        x0: f32,
        y0: f32,
        x1: f32,
        y1: f32,
        width: f32,
        color: Rgb,
        alpha: f32,
    ) {
        let dx = x1 - x0;
        let dy = y1 - y0;
        let len = (dx * dx + dy * dy).sqrt();
        let steps = (len / 0.5).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let t = i as f32 / steps as f32;
            let x = x0 + dx * t;
            let y = y0 + dy * t;
            if width < 0.8 {
                self.add(x.floor() as i32, y.floor() as i32, color, alpha);
            } else {
                self.splat(x, y, width, color, alpha);
            }
        }
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Rgb,
    bg: Rgb,
}

const BLANK: Cell = Cell {
    ch: ' ',
    fg: Rgb::BLACK,
    bg: Rgb::BLACK,
};

// Braille dot bits for a 2x4 sub-pixel block, (dx, dy) -> bit.
fn braille_bit(dx: usize, dy: usize) -> u8 {
    match (dx, dy) {
        (0, 0) => 0x01,
        (0, 1) => 0x02,
        (0, 2) => 0x04,
        (0, 3) => 0x40,
        (1, 0) => 0x08,
        (1, 1) => 0x10,
        (1, 2) => 0x20,
        (1, 3) => 0x80,
        _ => 0,
    }
}

fn braille_char(mask: u8) -> char {
    char::from_u32(0x2800 + mask as u32).unwrap_or(' ')
}

/// Cell buffer with diff-based flushing. Layer surfaces are summed in depth
/// order and downsampled here: a dot lights when the composited luminance
/// clears a threshold, foreground takes the brightest sub-pixel, background
/// a dimmed block average.
pub(crate) struct Screen {
    pub(crate) cols: u16,
    pub(crate) rows: u16,
    cur: Vec<Cell>,
    last: Vec<Cell>,
    force_full: bool,
}

const DOT_LUM: f32 = 0.055;

impl Screen {
    pub(crate) fn new(cols: u16, rows: u16) -> Self {
        let n = cols as usize * rows as usize;
        Self {
            cols,
            rows,
            cur: vec![BLANK; n],
            last: vec![BLANK; n],
            force_full: true,
        }
    }

    pub(crate) fn resize(&mut self, cols: u16, rows: u16) {
        self.cols = cols;
        self.rows = rows;
        let n = cols as usize * rows as usize;
        self.cur.clear();
        self.cur.resize(n, BLANK);
        self.last.clear();
        self.last.resize(n, BLANK);
        self.force_full = true;
    }

    pub(crate) fn composite(&mut self, layers: &[&Surface]) {
        let cols = self.cols as usize;
        let rows = self.rows as usize;
        for cy in 0..rows {
            for cx in 0..cols {
                let mut mask = 0u8;
                let mut best_lum = -1.0f32;
                let mut best = Rgb::BLACK;
                let mut acc = [0.0f32; 3];

                for dy in 0..4 {
                    for dx in 0..2 {
                        let px = cx * 2 + dx;
                        let py = cy * 4 + dy;
                        let mut p = [0.0f32; 3];
                        for s in layers {
                            if px < s.w && py < s.h {
                                let v = s.pixel(px, py);
                                p[0] += v[0];
                                p[1] += v[1];
                                p[2] += v[2];
                            }
                        }
                        let r = p[0].min(1.0);
                        let g = p[1].min(1.0);
                        let b = p[2].min(1.0);
                        acc[0] += r;
                        acc[1] += g;
                        acc[2] += b;
                        let lum = 0.2126 * r + 0.7152 * g + 0.0722 * b;
                        if lum > DOT_LUM {
                            mask |= braille_bit(dx, dy);
                        }
                        if lum > best_lum {
                            best_lum = lum;
                            best = Rgb {
                                r: (r * 255.0) as u8,
                                g: (g * 255.0) as u8,
                                b: (b * 255.0) as u8,
                            };
                        }
                    }
                }

                let bg = Rgb {
                    r: (acc[0] / 8.0 * 255.0) as u8,
                    g: (acc[1] / 8.0 * 255.0) as u8,
                    b: (acc[2] / 8.0 * 255.0) as u8,
                }
                .scale(0.35);
                let i = cy * cols + cx;
                self.cur[i] = if mask == 0 {
                    Cell {
                        ch: ' ',
                        fg: Rgb::BLACK,
                        bg,
                    }
                } else {
                    Cell {
                        ch: braille_char(mask),
                        fg: best,
                        bg,
                    }
                };
            }
        }
    }

    pub(crate) fn put_text(&mut self, x: usize, y: usize, s: &str, fg: Rgb) {
        let cols = self.cols as usize;
        if y >= self.rows as usize {
            return;
        }
        let mut cx = x;
        for ch in s.chars() {
            if cx >= cols {
                break;
            }
            let i = y * cols + cx;
            self.cur[i] = Cell {
                ch,
                fg,
                bg: Rgb::BLACK,
            };
            cx += 1;
        }
    }

    pub(crate) fn flush(&mut self, out: &mut io::Stdout) -> io::Result<()> {
        let cols = self.cols as usize;
        let rows = self.rows as usize;

        queue!(out, BeginSynchronizedUpdate)?;
        if self.force_full {
            queue!(
                out,
                crossterm::terminal::Clear(crossterm::terminal::ClearType::All)
            )?;
            self.force_full = false;
            for c in &mut self.last {
                *c = Cell {
                    ch: '\0',
                    fg: Rgb::BLACK,
                    bg: Rgb::BLACK,
                };
            }
        }

        for y in 0..rows {
            for x in 0..cols {
                let i = y * cols + x;
                let c = self.cur[i];
                if c == self.last[i] {
                    continue;
                }
                self.last[i] = c;
                queue!(
                    out,
                    cursor::MoveTo(x as u16, y as u16),
                    SetForegroundColor(Color::Rgb {
                        r: c.fg.r,
                        g: c.fg.g,
                        b: c.fg.b
                    }),
                    SetBackgroundColor(Color::Rgb {
                        r: c.bg.r,
                        g: c.bg.g,
                        b: c.bg.b
                    }),
                    Print(c.ch)
                )?;
            }
        }

        queue!(out, ResetColor, EndSynchronizedUpdate)?;
        out.flush()
    }
}
