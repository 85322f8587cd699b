use crate::config::{PaletteName, SpeedRange, TankConfig};
use crate::geometry::Geometry;
use crate::raster::{Grid, Style};
use rand::Rng;
use std::f32::consts::TAU;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Left,
    Right,
}

impl Direction {
    pub fn sign(self) -> f32 {
        match self {
            Direction::Left => -1.0,
            Direction::Right => 1.0,
        }
    }

    pub fn flip(self) -> Self {
        match self {
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    pub fn random(rng: &mut impl Rng) -> Self {
        if rng.gen_bool(0.5) {
            Direction::Right
        } else {
            Direction::Left
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Species {
    Fish,
    Shark,
    Crab,
    Jelly,
    Eel,
}

impl Species {
    /// Directional species swim off one edge and are replaced at the other.
    pub fn is_directional(self) -> bool {
        matches!(self, Species::Fish | Species::Shark | Species::Eel)
    }
}

pub struct Palette {
    fish_right: &'static [&'static str],
    fish_left: &'static [&'static str],
    shark_right: &'static str,
    shark_left: &'static str,
}

static CLASSIC: Palette = Palette {
    fish_right: &["><>", "><(('>", "}-<>", "><{{*>"],
    fish_left: &["<><", "<')><", "<>-{", "<*}}><"],
    shark_right: r"\___/^\_____o>",
    shark_left: r"<o_____/^\___/",
};

static REEF: Palette = Palette {
    fish_right: &["><=>", ">-{{o>", "><))*>", "}}=o>"],
    fish_left: &["<=><", "<o}}-<", "<*((><", "<o={{"],
    shark_right: r"~~\__/^\____=>",
    shark_left: r"<=____/^\__/~~",
};

impl Palette {
    pub fn named(name: PaletteName) -> &'static Palette {
        match name {
            PaletteName::Classic => &CLASSIC,
            PaletteName::Reef => &REEF,
        }
    }

    fn fish(&self, dir: Direction) -> &'static [&'static str] {
        match dir {
            Direction::Right => self.fish_right,
            Direction::Left => self.fish_left,
        }
    }

    fn shark(&self, dir: Direction) -> &'static str {
        match dir {
            Direction::Right => self.shark_right,
            Direction::Left => self.shark_left,
        }
    }
}

const FISH_TINTS: [Style; 3] = [Style::FishGold, Style::FishCoral, Style::FishBlue];

const CRAB_FRAMES: [&str; 2] = ["V(..)V", "v(..)v"];
const CRAB_LEN: usize = 6;
const CRAB_LEFT_WALL: f32 = 2.0;
const CRAB_RIGHT_MARGIN: f32 = 8.0;

const JELLY_FRAMES: [[&str; 2]; 2] = [["{^^}", "/||\\"], ["{^^}", "\\||/"]];
const JELLY_LEN: usize = 4;

const EEL_BODY: usize = 8;
const EEL_LINKS: [char; 2] = ['~', '='];

/// Where a freshly spawned creature appears.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpawnMode {
    /// Anywhere across the full width, random heading.
    Scatter,
    /// Just outside the edge it will swim in from, heading the given way.
    Edge(Direction),
}

#[derive(Clone, Debug, PartialEq)]
pub enum Kind {
    Fish { glyph: &'static str, style: Style },
    Shark { glyph: &'static str },
    Crab,
    Jelly { phase: f32, drift: f32, home_y: f32 },
    Eel { phase: f32 },
}

#[derive(Clone, Debug, PartialEq)]
pub struct Creature {
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    pub speed: f32,
    pub kind: Kind,
}

fn draw(rng: &mut impl Rng, range: SpeedRange) -> f32 {
    if range.hi > range.lo {
        rng.gen_range(range.lo..=range.hi)
    } else {
        range.lo
    }
}

// Random row in `[lo, hi]`, collapsing to `lo` when the band is empty.
fn row_in(rng: &mut impl Rng, lo: usize, hi: usize) -> f32 {
    if hi > lo {
        rng.gen_range(lo..=hi) as f32
    } else {
        lo as f32
    }
}

impl Creature {
    pub fn spawn(
        species: Species,
        mode: SpawnMode,
        geom: Geometry,
        cfg: &TankConfig,
        rng: &mut impl Rng,
    ) -> Self {
        let palette = Palette::named(cfg.palette);
        let h = geom.height;
        let dir = match mode {
            SpawnMode::Scatter => Direction::random(rng),
            SpawnMode::Edge(dir) => dir,
        };

        let (y, speed, kind) = match species {
            Species::Fish => {
                let glyphs = palette.fish(dir);
                let glyph = glyphs[rng.gen_range(0..glyphs.len())];
                let style = if cfg.color {
                    FISH_TINTS[rng.gen_range(0..FISH_TINTS.len())]
                } else {
                    Style::Fish
                };
                let y = row_in(rng, 2, h.saturating_sub(5));
                (y, draw(rng, cfg.fish_speed), Kind::Fish { glyph, style })
            }
            Species::Shark => {
                let y = row_in(rng, 2, h.saturating_sub(6));
                let glyph = palette.shark(dir);
                (y, draw(rng, cfg.shark_speed), Kind::Shark { glyph })
            }
            Species::Crab => (
                h.saturating_sub(3) as f32,
                draw(rng, cfg.crab_speed),
                Kind::Crab,
            ),
            Species::Jelly => {
                let home_y = row_in(rng, 2, h.saturating_sub(6));
                let drift = draw(rng, cfg.jelly_drift) * dir.sign();
                let phase = rng.gen_range(0.0..TAU);
                (home_y, drift.abs(), Kind::Jelly { phase, drift, home_y })
            }
            Species::Eel => {
                let y = row_in(rng, 3, h.saturating_sub(5));
                let phase = rng.gen_range(0.0..TAU);
                (y, draw(rng, cfg.eel_speed), Kind::Eel { phase })
            }
        };

        let mut creature = Self {
            x: 0.0,
            y,
            dir,
            speed,
            kind,
        };
        let len = creature.glyph_len() as f32;
        let w = geom.width as f32;
        creature.x = match (species, mode) {
            (Species::Crab, _) => {
                let hi = (w - CRAB_RIGHT_MARGIN).max(CRAB_LEFT_WALL);
                rng.gen_range(CRAB_LEFT_WALL..=hi)
            }
            (Species::Jelly, _) => rng.gen_range(3.0..=(w - 8.0).max(3.0)),
            (_, SpawnMode::Scatter) => rng.gen_range(0.0..=(w - len).max(0.0)),
            (_, SpawnMode::Edge(Direction::Right)) => -len,
            (_, SpawnMode::Edge(Direction::Left)) => w,
        };
        creature
    }

    pub fn species(&self) -> Species {
        match self.kind {
            Kind::Fish { .. } => Species::Fish,
            Kind::Shark { .. } => Species::Shark,
            Kind::Crab => Species::Crab,
            Kind::Jelly { .. } => Species::Jelly,
            Kind::Eel { .. } => Species::Eel,
        }
    }

    /// Columns the creature occupies starting at `x`.
    pub fn glyph_len(&self) -> usize {
        match self.kind {
            Kind::Fish { glyph, .. } | Kind::Shark { glyph } => glyph.chars().count(),
            Kind::Crab => CRAB_LEN,
            Kind::Jelly { .. } => JELLY_LEN,
            Kind::Eel { .. } => EEL_BODY + 2,
        }
    }

    pub fn advance(&mut self, tick: u64, geom: Geometry) {
        let w = geom.width as f32;
        match &mut self.kind {
            Kind::Fish { .. } | Kind::Shark { .. } | Kind::Eel { .. } => {
                self.x += self.speed * self.dir.sign();
            }
            Kind::Crab => {
                let hi = (w - CRAB_RIGHT_MARGIN).max(CRAB_LEFT_WALL);
                self.x += self.speed * self.dir.sign();
                if self.x <= CRAB_LEFT_WALL {
                    self.x = CRAB_LEFT_WALL;
                    self.dir = Direction::Right;
                } else if self.x >= hi {
                    self.x = hi;
                    self.dir = Direction::Left;
                }
            }
            Kind::Jelly {
                phase,
                drift,
                home_y,
            } => {
                let bob = (tick as f32 * 0.06 + *phase).sin() * 1.5;
                let floor = (geom.height as f32 - 5.0).max(1.0);
                self.y = (*home_y + bob).clamp(1.0, floor);

                self.x += *drift;
                let hi = (w - 8.0).max(3.0);
                if self.x < 3.0 {
                    self.x = 3.0;
                    *drift = drift.abs();
                } else if self.x > hi {
                    self.x = hi;
                    *drift = -drift.abs();
                }
                self.dir = if *drift < 0.0 {
                    Direction::Left
                } else {
                    Direction::Right
                };
            }
        }
    }

    /// True once a directional creature has fully left through its trailing side.
    pub fn has_exited(&self, width: f32) -> bool {
        if !self.species().is_directional() {
            return false;
        }
        match self.dir {
            Direction::Right => self.x > width + 5.0,
            Direction::Left => self.x < -(self.glyph_len() as f32) - 5.0,
        }
    }

    /// Bubble origin for creatures that breathe out: one row up, behind the tail.
    pub fn trailing_edge(&self) -> Option<(f32, f32)> {
        match self.kind {
            Kind::Fish { .. } | Kind::Shark { .. } => {
                let x = match self.dir {
                    Direction::Right => self.x - 1.0,
                    Direction::Left => self.x + self.glyph_len() as f32,
                };
                Some((x, self.y - 1.0))
            }
            _ => None,
        }
    }

    pub fn stamp(&self, grid: &mut Grid, tick: u64) {
        let x = self.x.round() as i32;
        let y = self.y.round() as i32;
        match self.kind {
            Kind::Fish { glyph, style } => grid.stamp_str(x, y, glyph, style),
            Kind::Shark { glyph } => grid.stamp_str(x, y, glyph, Style::Shark),
            Kind::Crab => {
                let frame = CRAB_FRAMES[(tick / 8 % 2) as usize];
                grid.stamp_str(x, y, frame, Style::Crab);
            }
            Kind::Jelly { .. } => {
                let [top, tentacles] = JELLY_FRAMES[(tick / 10 % 2) as usize];
                grid.stamp_str(x, y, top, Style::Jelly);
                grid.stamp_str(x, y + 1, tentacles, Style::Jelly);
            }
            Kind::Eel { phase } => {
                let wobble =
                    |i: f32| ((tick as f32 * 0.25 - i * 0.8 + phase).sin()).round() as i32;
                let sign = self.dir.sign() as i32;
                let head = match self.dir {
                    Direction::Right => x + EEL_BODY as i32,
                    Direction::Left => x + 1,
                };
                for i in 0..EEL_BODY {
                    let col = head - sign * (i as i32 + 1);
                    let link = EEL_LINKS[i % EEL_LINKS.len()];
                    grid.stamp(col, y + wobble(i as f32 + 1.0), link, Style::Eel);
                }
                let (col, glyph) = match self.dir {
                    Direction::Right => (head, ":>"),
                    Direction::Left => (head - 1, "<:"),
                };
                grid.stamp_str(col, y + wobble(0.0), glyph, Style::Eel);
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Weed {
    pub x: i32,
    pub height: usize,
    pub phase: f32,
}

impl Weed {
    pub fn stamp(&self, grid: &mut Grid, tick: u64, base: i32) {
        let sway = (tick as f32 * 0.07 + self.phase).sin();
        for j in 0..self.height {
            let offset = (sway * j as f32 * 0.45).round() as i32;
            let ch = if (j as i32 + self.x).rem_euclid(2) == 0 { '(' } else { ')' };
            grid.stamp(self.x + offset, base - j as i32, ch, Style::Weed);
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Starfish {
    pub x: i32,
}

impl Starfish {
    pub fn stamp(&self, grid: &mut Grid, floor: i32) {
        grid.stamp(self.x, floor, '*', Style::Starfish);
    }
}

const CHEST: [&str; 2] = ["[=$=]", "|___|"];

#[derive(Clone, Debug, PartialEq)]
pub struct Chest {
    pub x: i32,
}

impl Chest {
    pub const WIDTH: i32 = 5;

    pub fn stamp(&self, grid: &mut Grid, floor: i32) {
        grid.stamp_str(self.x, floor - 1, CHEST[0], Style::Chest);
        grid.stamp_str(self.x, floor, CHEST[1], Style::Chest);
    }

    /// Where the lid lets bubbles out.
    pub fn vent(&self, geom: Geometry) -> (f32, f32) {
        ((self.x + 2) as f32, geom.height as f32 - 4.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Bubble {
    pub x: f32,
    pub y: f32,
    pub big: bool,
    pub drift: f32,
}

impl Bubble {
    pub fn new(x: f32, y: f32, rng: &mut impl Rng) -> Self {
        Self {
            x,
            y,
            big: rng.gen_bool(0.3),
            drift: rng.gen_range(-0.3..=0.3),
        }
    }

    pub fn stamp(&self, grid: &mut Grid) {
        let ch = if self.big { 'O' } else { 'o' };
        grid.stamp(self.x.round() as i32, self.y.round() as i32, ch, Style::Bubble);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::{rngs::StdRng, SeedableRng};

    const WIDE: Geometry = Geometry {
        width: 72,
        height: 14,
    };

    #[test]
    fn crab_reflects_exactly_at_patrol_bounds() {
        let cfg = TankConfig::default();
        let mut rng = StdRng::seed_from_u64(3);
        let mut crab = Creature::spawn(Species::Crab, SpawnMode::Scatter, WIDE, &cfg, &mut rng);
        crab.speed = 0.7;
        let hi = WIDE.width as f32 - 8.0;
        let mut flips = 0;
        for tick in 0..2_000 {
            let before = crab.dir;
            crab.advance(tick, WIDE);
            assert!((2.0..=hi).contains(&crab.x), "crab escaped to {}", crab.x);
            if crab.dir != before {
                flips += 1;
                assert!(crab.x == 2.0 || crab.x == hi);
            }
        }
        assert!(flips >= 2);
    }

    #[test]
    fn jelly_bob_stays_in_band_and_drift_reflects() {
        let cfg = TankConfig::default();
        let mut rng = StdRng::seed_from_u64(11);
        let narrow = Geometry {
            width: 30,
            height: 12,
        };
        let mut jelly = Creature::spawn(Species::Jelly, SpawnMode::Scatter, narrow, &cfg, &mut rng);
        let mut seen = (false, false);
        for tick in 0..3_000 {
            jelly.advance(tick, narrow);
            assert!((1.0..=7.0).contains(&jelly.y));
            assert!((3.0..=22.0).contains(&jelly.x));
            match jelly.dir {
                Direction::Left => seen.0 = true,
                Direction::Right => seen.1 = true,
            }
        }
        assert_eq!(seen, (true, true));
    }

    #[test]
    fn edge_spawns_start_just_off_screen() {
        let cfg = TankConfig::default();
        let mut rng = StdRng::seed_from_u64(5);
        for species in [Species::Fish, Species::Shark, Species::Eel] {
            let right = Creature::spawn(species, SpawnMode::Edge(Direction::Right), WIDE, &cfg, &mut rng);
            assert_eq!(right.x, -(right.glyph_len() as f32));
            assert_eq!(right.dir, Direction::Right);
            let left = Creature::spawn(species, SpawnMode::Edge(Direction::Left), WIDE, &cfg, &mut rng);
            assert_eq!(left.x, WIDE.width as f32);
            assert!(!right.has_exited(72.0) && !left.has_exited(72.0));
        }
    }

    #[test]
    fn exit_only_on_trailing_side() {
        let cfg = TankConfig::default();
        let mut rng = StdRng::seed_from_u64(9);
        let mut fish = Creature::spawn(Species::Fish, SpawnMode::Edge(Direction::Left), WIDE, &cfg, &mut rng);
        fish.x = 90.0;
        assert!(!fish.has_exited(72.0));
        fish.x = -(fish.glyph_len() as f32) - 5.5;
        assert!(fish.has_exited(72.0));

        fish.dir = Direction::Right;
        assert!(!fish.has_exited(72.0));
        fish.x = 77.5;
        assert!(fish.has_exited(72.0));
    }

    #[test]
    fn fish_glyph_faces_its_heading() {
        let cfg = TankConfig::default();
        let mut rng = StdRng::seed_from_u64(1);
        for _ in 0..50 {
            let fish = Creature::spawn(Species::Fish, SpawnMode::Scatter, WIDE, &cfg, &mut rng);
            let Kind::Fish { glyph, style } = fish.kind else {
                panic!("spawned {:?}", fish.kind)
            };
            let pool = Palette::named(cfg.palette).fish(fish.dir);
            assert!(pool.contains(&glyph));
            assert!(FISH_TINTS.contains(&style));
        }
    }

    #[test]
    fn uncolored_fish_use_the_plain_tag() {
        let cfg = TankConfig {
            color: false,
            ..TankConfig::default()
        };
        let mut rng = StdRng::seed_from_u64(2);
        let fish = Creature::spawn(Species::Fish, SpawnMode::Scatter, WIDE, &cfg, &mut rng);
        assert!(matches!(fish.kind, Kind::Fish { style: Style::Fish, .. }));
    }

    #[test]
    fn eel_wobble_stays_within_one_row() {
        let cfg = TankConfig::default();
        let mut rng = StdRng::seed_from_u64(4);
        let mut eel = Creature::spawn(Species::Eel, SpawnMode::Scatter, WIDE, &cfg, &mut rng);
        eel.x = 20.0;
        let y = eel.y.round() as usize;
        for tick in 0..40 {
            let mut grid = Grid::new(WIDE.width, WIDE.height);
            eel.stamp(&mut grid, tick);
            let mut stamped = 0;
            for (row, cells) in grid.rows().enumerate() {
                let n = cells.iter().filter(|c| c.style == Some(Style::Eel)).count();
                if n > 0 {
                    assert!(row + 1 >= y && row <= y + 1, "eel row {row} vs {y}");
                }
                stamped += n;
            }
            assert_eq!(stamped, eel.glyph_len());
        }
    }
}
