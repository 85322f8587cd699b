use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{fs, path::Path};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PaletteName {
    Classic,
    Reef,
}

/// Inclusive `[lo, hi]` range a speed is drawn from, in cells per tick.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeedRange {
    pub lo: f32,
    pub hi: f32,
}

impl SpeedRange {
    pub const fn new(lo: f32, hi: f32) -> Self {
        Self { lo, hi }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TankConfig {
    // grid
    pub min_cols: usize,
    pub max_cols: usize,
    pub narrow_below: usize,
    pub rows_wide: usize,
    pub rows_narrow: usize,

    // population density: one entity per `*_divisor` columns, never fewer than `*_min`
    pub weed_divisor: usize,
    pub weed_min: usize,
    pub fish_divisor: usize,
    pub fish_min: usize,
    pub starfish_divisor: usize,
    pub starfish_min: usize,
    pub shark_min_width: usize,
    pub eel_min_width: usize,
    pub chest_at: f32,

    // motion
    pub fish_speed: SpeedRange,
    pub shark_speed: SpeedRange,
    pub crab_speed: SpeedRange,
    pub eel_speed: SpeedRange,
    pub jelly_drift: SpeedRange,

    // bubbles
    pub fish_bubble_chance: f64,
    pub chest_bubble_chance: f64,
    pub bubble_rise: f32,
    pub bubble_jitter: f32,
    pub bubble_drift_damping: f32,

    // presentation
    pub title: String,
    pub palette: PaletteName,
    pub color: bool,
    pub fps: u32,
    pub resize_debounce_ms: u64,
    pub seed: u64,
}

impl Default for TankConfig {
    fn default() -> Self {
        Self {
            min_cols: 30,
            max_cols: 120,
            narrow_below: 50,
            rows_wide: 14,
            rows_narrow: 12,

            weed_divisor: 13,
            weed_min: 2,
            fish_divisor: 17,
            fish_min: 2,
            starfish_divisor: 24,
            starfish_min: 1,
            shark_min_width: 60,
            eel_min_width: 44,
            chest_at: 0.72,

            fish_speed: SpeedRange::new(0.15, 0.45),
            shark_speed: SpeedRange::new(0.30, 0.50),
            crab_speed: SpeedRange::new(0.10, 0.20),
            eel_speed: SpeedRange::new(0.20, 0.30),
            jelly_drift: SpeedRange::new(0.04, 0.10),

            fish_bubble_chance: 0.02,
            chest_bubble_chance: 0.05,
            bubble_rise: 0.25,
            bubble_jitter: 0.15,
            bubble_drift_damping: 0.3,

            title: " ~ tidepool ~ ".to_string(),
            palette: PaletteName::Classic,
            color: true,
            fps: 20,
            resize_debounce_ms: 200,
            seed: 0x5EA_F100D,
        }
    }
}

impl TankConfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = fs::read_to_string(path)
            .with_context(|| format!("reading config {}", path.display()))?;
        let cfg = serde_json::from_str::<TankConfig>(&raw)
            .with_context(|| format!("parsing config {}", path.display()))?;
        Ok(cfg.sanitized())
    }

    /// Repairs inverted, zero or non-finite tunables so later arithmetic and
    /// rng draws never panic.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.min_cols = self.min_cols.max(12);
        self.max_cols = self.max_cols.max(self.min_cols);
        self.rows_narrow = self.rows_narrow.max(8);
        self.rows_wide = self.rows_wide.max(self.rows_narrow);
        self.weed_divisor = self.weed_divisor.max(1);
        self.fish_divisor = self.fish_divisor.max(1);
        self.starfish_divisor = self.starfish_divisor.max(1);
        self.chest_at = finite_or(self.chest_at, defaults.chest_at).clamp(0.0, 1.0);
        for (r, fallback) in [
            (&mut self.fish_speed, defaults.fish_speed),
            (&mut self.shark_speed, defaults.shark_speed),
            (&mut self.crab_speed, defaults.crab_speed),
            (&mut self.eel_speed, defaults.eel_speed),
            (&mut self.jelly_drift, defaults.jelly_drift),
        ] {
            if !(r.lo.is_finite() && r.hi.is_finite()) {
                *r = fallback;
            }
            if r.hi < r.lo {
                std::mem::swap(&mut r.lo, &mut r.hi);
            }
        }
        self.bubble_rise = finite_or(self.bubble_rise, defaults.bubble_rise).max(0.05);
        self.bubble_jitter = finite_or(self.bubble_jitter, defaults.bubble_jitter).max(0.0);
        self.bubble_drift_damping =
            finite_or(self.bubble_drift_damping, defaults.bubble_drift_damping);
        self.fish_bubble_chance = probability(self.fish_bubble_chance);
        self.chest_bubble_chance = probability(self.chest_bubble_chance);
        self.fps = self.fps.clamp(5, 60);
        self
    }
}

fn finite_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value
    } else {
        fallback
    }
}

// `f64::clamp` lets NaN through, and `gen_bool` panics on it.
fn probability(p: f64) -> f64 {
    if p.is_nan() {
        0.0
    } else {
        p.clamp(0.0, 1.0)
    }
}
