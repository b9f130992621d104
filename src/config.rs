use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "driftglow")]
#[command(about = "Ambient terminal backdrop: wave grid, orbs, motes, pointer trail, lightning. \
Runs hands-off; the runtime keys (pause, layer toggles, reseed) are demo conveniences.")]
pub(crate) struct Cli {
    /// Frame cap (15..240)
    #[arg(long, default_value_t = 60)]
    pub(crate) fps: u32,

    /// Seed for all randomized effect parameters
    #[arg(long, default_value_t = 0xD81F_7610)]
    pub(crate) seed: u64,

    /// Energy price per kWh for the stats panel
    #[arg(long, default_value_t = crate::stats::DEFAULT_RATE)]
    pub(crate) rate: f64,

    /// Disable the wave grid layer
    #[arg(long)]
    pub(crate) no_grid: bool,

    /// Disable the orb layer
    #[arg(long)]
    pub(crate) no_orbs: bool,

    /// Disable the floating mote layer
    #[arg(long)]
    pub(crate) no_motes: bool,

    /// Disable the pointer trail layer
    #[arg(long)]
    pub(crate) no_trail: bool,

    /// Disable the lightning layer
    #[arg(long)]
    pub(crate) no_lightning: bool,

    /// Start with the stats HUD panel open
    #[arg(long)]
    pub(crate) hud: bool,
}

pub(crate) struct Settings {
    pub(crate) fps_cap: u32,
    pub(crate) seed: u64,
    pub(crate) rate: f64,
    pub(crate) grid: bool,
    pub(crate) orbs: bool,
    pub(crate) motes: bool,
    pub(crate) trail: bool,
    pub(crate) lightning: bool,
    pub(crate) show_stats: bool,
    pub(crate) show_help: bool,
    pub(crate) paused: bool,
}

impl Settings {
    pub(crate) fn from_cli(cli: &Cli) -> Self {
        Self {
            fps_cap: cli.fps.clamp(15, 240),
            seed: cli.seed,
            rate: cli.rate,
            grid: !cli.no_grid,
            orbs: !cli.no_orbs,
            motes: !cli.no_motes,
            trail: !cli.no_trail,
            lightning: !cli.no_lightning,
            show_stats: cli.hud,
            show_help: true,
            paused: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_enable_all_layers() {
        let cli = Cli::parse_from(["driftglow"]);
        let s = Settings::from_cli(&cli);
        assert!(s.grid && s.orbs && s.motes && s.trail && s.lightning);
        assert!(!s.show_stats);
        assert_eq!(s.fps_cap, 60);
        assert_eq!(s.rate, crate::stats::DEFAULT_RATE);
    }

    #[test]
    fn hud_flag_opens_stats_panel() {
        let cli = Cli::parse_from(["driftglow", "--hud", "--no-grid"]);
        let s = Settings::from_cli(&cli);
        assert!(s.show_stats);
        assert!(!s.grid);
        assert!(s.orbs);
    }

    #[test]
    fn fps_is_clamped() {
        let cli = Cli::parse_from(["driftglow", "--fps", "1000"]);
        assert_eq!(Settings::from_cli(&cli).fps_cap, 240);
    }
}
