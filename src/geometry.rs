use crate::config::TankConfig;

/// What the host tells us about the space the tank may occupy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HostRegion {
    /// Usable width in host units (terminal columns, pixels, ...).
    pub available_width: f32,
    /// Measured advance of one character in the same units.
    pub char_advance: f32,
}

impl HostRegion {
    /// A terminal measures in cells, so one character advances one unit.
    pub fn cells(cols: u16) -> Self {
        Self {
            available_width: cols as f32,
            char_advance: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Geometry {
    pub width: usize,
    pub height: usize,
}

impl Geometry {
    pub fn resolve(host: HostRegion, cfg: &TankConfig) -> Self {
        let cols = host.available_width / host.char_advance;
        let width = if cols.is_finite() && cols > 0.0 {
            (cols.floor() as usize)
                .max(cfg.min_cols)
                .min(cfg.max_cols.max(cfg.min_cols))
        } else {
            tracing::warn!(
                available = host.available_width,
                advance = host.char_advance,
                "degenerate host geometry, using minimum width"
            );
            cfg.min_cols
        };
        let mut geom = Self {
            width,
            height: cfg.rows_wide,
        };
        if geom.is_narrow(cfg) {
            geom.height = cfg.rows_narrow;
        }
        geom
    }

    /// Narrow tanks get `rows_narrow` rows instead of `rows_wide`.
    pub fn is_narrow(&self, cfg: &TankConfig) -> bool {
        self.width < cfg.narrow_below
    }
}
