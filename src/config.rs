use clap::{Parser, ValueEnum};

#[derive(Parser, Debug, Clone)]
#[command(name = "tui-sketchbook", version, about = "Gesture-driven generative-art sketchbook for the terminal")]
pub struct Config {
    /// Where landmark frames come from.
    #[arg(long, value_enum, default_value_t = TrackingSource::Synthetic)]
    pub source: TrackingSource,

    /// NDJSON tracking script (required for --source script).
    #[arg(long)]
    pub script: Option<String>,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub script_loop: bool,

    /// Cell renderer; falls back to the saved preference, then half-block.
    #[arg(long, value_enum)]
    pub renderer: Option<RendererMode>,

    #[arg(long, default_value_t = 60)]
    pub fps: u32,

    /// Start on this sketch (substring match against sketch names).
    #[arg(long)]
    pub sketch: Option<String>,

    /// Mirror landmark x so motion feels like a mirror.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub mirror: bool,

    /// Tracking frames older than this fall back to mouse/neutral input.
    #[arg(long, default_value_t = 350.0)]
    pub stale_ms: f32,

    /// Master seed for the sketches' noise and randomness.
    #[arg(long)]
    pub seed: Option<u64>,

    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub sync_updates: bool,

    #[arg(long, default_value_t = false)]
    pub list_sketches: bool,

    /// Load/store last sketch + renderer under the user config dir.
    #[arg(long, default_value_t = true, action = clap::ArgAction::Set)]
    pub prefs: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TrackingSource {
    /// Built-in deterministic gesture generator (no external tracker needed).
    Synthetic,
    /// Replay an NDJSON script recorded from a tracker.
    Script,
    /// Live NDJSON frames piped from an external tracker process.
    Stdin,
    /// No tracker at all; mouse only.
    Off,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum RendererMode {
    #[value(alias = "ansi", alias = "text")]
    Ascii,
    #[value(name = "half-block", alias = "halfblock", alias = "half_block", alias = "hb")]
    HalfBlock,
    #[value(alias = "hires", alias = "dots")]
    Braille,
}

impl RendererMode {
    /// Pixels per terminal cell (width, height) for this backend.
    pub fn cell_pixels(self) -> (usize, usize) {
        match self {
            Self::Ascii => (1, 1),
            Self::HalfBlock => (1, 2),
            Self::Braille => (2, 4),
        }
    }
}
