use std::io::{self, Stdout};
use std::time::{Duration, Instant};

use anyhow::Result;
use crossterm::{
    cursor,
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, KeyModifiers,
        MouseEventKind,
    },
    execute,
    terminal::{
        self, Clear, ClearType, DisableLineWrap, EnableLineWrap, EnterAlternateScreen,
        LeaveAlternateScreen,
    },
};
use rand::{rngs::StdRng, SeedableRng};

use crate::color::Rgb;
use crate::config::{Cli, Settings};
use crate::grid::GridWave;
use crate::lightning::LightningLayer;
use crate::motes::MoteLayer;
use crate::orbs::OrbLayer;
use crate::stats::{self, Device};
use crate::surface::{Screen, Surface};
use crate::trail::TrailLayer;

pub(crate) fn run(cli: Cli) -> Result<()> {
    let mut settings = Settings::from_cli(&cli);

    let mut stdout = io::stdout();
    execute!(
        stdout,
        EnterAlternateScreen,
        DisableLineWrap,
        cursor::Hide,
        EnableMouseCapture,
        Clear(ClearType::All)
    )?;
    terminal::enable_raw_mode()?;

    let res = run_loop(&mut stdout, &mut settings);

    // Teardown runs on every exit path: listeners off, terminal restored.
    let mut out = io::stdout();
    let _ = execute!(
        out,
        DisableMouseCapture,
        crossterm::style::ResetColor,
        Clear(ClearType::All),
        cursor::Show,
        EnableLineWrap,
        LeaveAlternateScreen
    );
    let _ = terminal::disable_raw_mode();
    res
}

// Depth order for compositing, back to front.
struct Layers {
    grid: GridWave,
    orbs: OrbLayer,
    motes: MoteLayer,
    trail: TrailLayer,
    lightning: LightningLayer,
}

struct LayerSurfaces {
    grid: Surface,
    orbs: Surface,
    motes: Surface,
    trail: Surface,
    lightning: Surface,
}

impl LayerSurfaces {
    fn new(pw: usize, ph: usize) -> Self {
        Self {
            grid: Surface::new(pw, ph),
            orbs: Surface::new(pw, ph),
            motes: Surface::new(pw, ph),
            trail: Surface::new(pw, ph),
            lightning: Surface::new(pw, ph),
        }
    }

    fn resize(&mut self, pw: usize, ph: usize) {
        self.grid.resize(pw, ph);
        self.orbs.resize(pw, ph);
        self.motes.resize(pw, ph);
        self.trail.resize(pw, ph);
        self.lightning.resize(pw, ph);
    }

    fn clear(&mut self) {
        self.grid.clear();
        self.orbs.clear();
        self.motes.clear();
        self.trail.clear();
        self.lightning.clear();
    }
}

fn run_loop(stdout: &mut Stdout, settings: &mut Settings) -> Result<()> {
    let (mut cols, mut rows) = terminal::size()?;
    cols = cols.max(1);
    rows = rows.max(1);
    let mut screen = Screen::new(cols, rows);

    let (mut pw, mut ph) = (cols as usize * 2, rows as usize * 4);
    let mut surfaces = LayerSurfaces::new(pw, ph);

    let mut rng = StdRng::seed_from_u64(settings.seed);
    let mut layers = Layers {
        grid: GridWave::new(),
        orbs: OrbLayer::new(&mut rng, pw as f32, ph as f32),
        motes: MoteLayer::new(&mut rng, pw as f32, ph as f32),
        trail: TrailLayer::new(),
        lightning: LightningLayer::new(),
    };

    let devices = stats::demo_fleet();

    let start = Instant::now();
    let mut sim_time = 0.0f32;
    let mut last = Instant::now();
    let frame_dt = Duration::from_secs_f32(1.0 / settings.fps_cap as f32);

    loop {
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Resize(c, r) => {
                    cols = c.max(1);
                    rows = r.max(1);
                    pw = cols as usize * 2;
                    ph = rows as usize * 4;
                    screen.resize(cols, rows);
                    // Surfaces follow the viewport immediately; entities
                    // drift back into view through wraparound.
                    surfaces.resize(pw, ph);
                }
                Event::Mouse(m) if matches!(m.kind, MouseEventKind::Moved | MouseEventKind::Drag(_)) =>
                {
                    if pointer_emission_enabled(settings) {
                        let px = m.column as f32 * 2.0 + 1.0;
                        let py = m.row as f32 * 4.0 + 2.0;
                        let t_ms = start.elapsed().as_millis() as u64;
                        layers.trail.sample(&mut rng, px, py, t_ms);
                    }
                }
                Event::Key(k) if k.kind != KeyEventKind::Release => match k.code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => return Ok(()),
                    KeyCode::Char('c') if k.modifiers.contains(KeyModifiers::CONTROL) => {
                        return Ok(());
                    }
                    KeyCode::Char(' ') => settings.paused = !settings.paused,
                    KeyCode::Char('h') | KeyCode::Char('H') => {
                        settings.show_help = !settings.show_help
                    }
                    KeyCode::Char('s') | KeyCode::Char('S') => {
                        settings.show_stats = !settings.show_stats
                    }
                    KeyCode::Char('1') => settings.grid = !settings.grid,
                    KeyCode::Char('2') => settings.orbs = !settings.orbs,
                    KeyCode::Char('3') => settings.motes = !settings.motes,
                    KeyCode::Char('4') => settings.trail = !settings.trail,
                    KeyCode::Char('5') => settings.lightning = !settings.lightning,
                    KeyCode::Char('r') | KeyCode::Char('R') => {
                        settings.seed = settings.seed.wrapping_add(1);
                        rng = StdRng::seed_from_u64(settings.seed);
                        layers.orbs = OrbLayer::new(&mut rng, pw as f32, ph as f32);
                        layers.motes = MoteLayer::new(&mut rng, pw as f32, ph as f32);
                        layers.trail = TrailLayer::new();
                        layers.lightning = LightningLayer::new();
                        layers.grid = GridWave::new();
                        sim_time = 0.0;
                    }
                    _ => {}
                },
                _ => {}
            }
        }

        let now = Instant::now();
        let dt = (now - last).as_secs_f32().min(0.05);
        last = now;

        let (wf, hf) = (pw as f32, ph as f32);
        if !settings.paused {
            sim_time += dt;
            if settings.grid {
                layers.grid.tick();
            }
            if settings.orbs {
                layers.orbs.tick(wf, hf);
            }
            if settings.motes {
                layers.motes.tick(&mut rng, wf, hf);
            }
            if settings.trail {
                layers.trail.tick();
            }
            if settings.lightning {
                layers.lightning.update(&mut rng, sim_time, wf, hf);
            }
        }

        surfaces.clear();
        if settings.grid {
            layers.grid.render(&mut surfaces.grid);
        }
        if settings.orbs {
            layers.orbs.render(&mut surfaces.orbs);
        }
        if settings.motes {
            layers.motes.render(&mut surfaces.motes);
        }
        if settings.trail {
            layers.trail.render(&mut surfaces.trail, &mut rng);
        }
        if settings.lightning {
            layers
                .lightning
                .render(&mut surfaces.lightning, sim_time, &mut rng);
        }

        screen.composite(&[
            &surfaces.grid,
            &surfaces.orbs,
            &surfaces.motes,
            &surfaces.trail,
            &surfaces.lightning,
        ]);

        if settings.show_help {
            draw_help(&mut screen, settings);
        }
        if settings.show_stats {
            draw_stats(&mut screen, &devices, settings.rate);
        }

        screen.flush(stdout)?;

        let elapsed = now.elapsed();
        if elapsed < frame_dt {
            std::thread::sleep(frame_dt - elapsed);
        }
    }
}

/// Pointer emission obeys the pause gate along with the rest of the sim:
/// while paused nothing decays, so nothing may spawn either, or the trail
/// collection would grow for as long as the mouse keeps moving.
fn pointer_emission_enabled(s: &Settings) -> bool {
    s.trail && !s.paused
}

fn onoff(b: bool) -> &'static str {
    if b {
        "on"
    } else {
        "off"
    }
}

fn draw_help(screen: &mut Screen, s: &Settings) {
    let line1 = format!(
        "driftglow  1 grid:{}  2 orbs:{}  3 motes:{}  4 trail:{}  5 bolts:{}{}",
        onoff(s.grid),
        onoff(s.orbs),
        onoff(s.motes),
        onoff(s.trail),
        onoff(s.lightning),
        if s.paused { "  [paused]" } else { "" },
    );
    let line2 = "Q quit  Space pause  H help  S stats  R reseed  (move the mouse for trails)";
    screen.put_text(
        0,
        0,
        &line1,
        Rgb {
            r: 205,
            g: 215,
            b: 225,
        },
    );
    screen.put_text(
        0,
        1,
        line2,
        Rgb {
            r: 150,
            g: 165,
            b: 185,
        },
    );
}

fn draw_stats(screen: &mut Screen, devices: &[Device], rate: f64) {
    let total = stats::total_active_power(devices);
    let energy = stats::daily_energy_kwh(devices);
    let top = screen.rows.saturating_sub(devices.len() as u16 + 1) as usize;
    let head = format!(
        "load {:.0} W   {:.1} kWh/day   {:.2}/day   {:.2}/mo",
        total,
        energy,
        stats::daily_cost(devices, rate),
        stats::monthly_cost(devices, rate),
    );
    screen.put_text(
        0,
        top,
        &head,
        Rgb {
            r: 220,
            g: 225,
            b: 205,
        },
    );
    for (i, d) in devices.iter().enumerate() {
        let m = stats::maintenance(d);
        let flag = match m.recommendation {
            stats::Recommendation::Healthy => "ok",
            stats::Recommendation::Monitor => "monitor",
            stats::Recommendation::ServiceSoon => "service soon",
        };
        let line = format!(
            "  {:<8} {:>6.0} W  {:<3}  dev {:>4.0}%  {}{}",
            d.name,
            d.power_w,
            if d.is_on { "on" } else { "off" },
            m.deviation * 100.0,
            flag,
            if m.needs_maintenance {
                format!("  ({:.0}% conf)", m.confidence)
            } else {
                String::new()
            },
        );
        screen.put_text(
            0,
            top + 1 + i,
            &line,
            Rgb {
                r: 170,
                g: 180,
                b: 160,
            },
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn settings() -> Settings {
        Settings {
            fps_cap: 60,
            seed: 1,
            rate: stats::DEFAULT_RATE,
            grid: true,
            orbs: true,
            motes: true,
            trail: true,
            lightning: true,
            show_stats: false,
            show_help: true,
            paused: false,
        }
    }

    #[test]
    fn pause_gates_pointer_emission() {
        let mut s = settings();
        assert!(pointer_emission_enabled(&s));
        s.paused = true;
        assert!(!pointer_emission_enabled(&s));
        s.paused = false;
        s.trail = false;
        assert!(!pointer_emission_enabled(&s));
    }

    #[test]
    fn paused_frames_never_grow_the_trail() {
        // Mirror the loop wiring: the mouse path runs through the emission
        // gate, the decay tick only runs unpaused. A paused stretch with
        // constant mouse movement must leave the collection empty.
        let mut s = settings();
        s.paused = true;
        let mut trail = TrailLayer::new();
        let mut rng = StdRng::seed_from_u64(7);
        for i in 0..10_000u64 {
            if pointer_emission_enabled(&s) {
                trail.sample(&mut rng, i as f32, 0.0, i * 16);
            }
            if !s.paused {
                trail.tick();
            }
        }
        assert!(trail.dots.is_empty());

        // Unpausing restores emission and decay; the size stays bounded by
        // the spawn rate times the particle lifetime.
        s.paused = false;
        for i in 0..10_000u64 {
            if pointer_emission_enabled(&s) {
                trail.sample(&mut rng, i as f32, 0.0, 200_000 + i * 16);
            }
            if !s.paused {
                trail.tick();
            }
        }
        assert!(!trail.dots.is_empty());
        assert!(trail.dots.len() <= 3 * 30);
    }
}
