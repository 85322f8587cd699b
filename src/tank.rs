use crate::config::TankConfig;
use crate::entity::{Bubble, Chest, Creature, SpawnMode, Species, Starfish, Weed};
use crate::geometry::Geometry;
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f32::consts::TAU;

/// Live population counts. The tank always holds exactly one chest, so it
/// has no count here.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Census {
    pub fish: usize,
    pub sharks: usize,
    pub crabs: usize,
    pub jellies: usize,
    pub eels: usize,
    pub weeds: usize,
    pub starfish: usize,
    pub bubbles: usize,
}

/// Complete simulation state of one aquarium.
pub struct Tank {
    pub(crate) geom: Geometry,
    pub(crate) tick: u64,
    pub(crate) creatures: Vec<Creature>,
    pub(crate) weeds: Vec<Weed>,
    pub(crate) starfish: Vec<Starfish>,
    pub(crate) chest: Chest,
    pub(crate) bubbles: Vec<Bubble>,
    pub(crate) cfg: TankConfig,
    pub(crate) rng: StdRng,
}

impl Tank {
    pub fn new(geom: Geometry, cfg: TankConfig) -> Self {
        let cfg = cfg.sanitized();
        let rng = StdRng::seed_from_u64(cfg.seed);
        let mut tank = Self {
            geom,
            tick: 0,
            creatures: Vec::new(),
            weeds: Vec::new(),
            starfish: Vec::new(),
            chest: Chest { x: 1 },
            bubbles: Vec::new(),
            cfg,
            rng,
        };
        tank.populate();
        tank
    }

    /// Throws away every entity and repopulates for a new geometry.
    pub fn reseed(&mut self, geom: Geometry) {
        let before = self.geom;
        self.geom = geom;
        self.populate();
        tracing::info!(
            from = ?before,
            to = ?geom,
            narrow = geom.is_narrow(&self.cfg),
            census = ?self.census(),
            "tank reseeded"
        );
    }

    fn populate(&mut self) {
        self.creatures.clear();
        self.weeds.clear();
        self.starfish.clear();
        self.bubbles.clear();

        let Geometry { width, height } = self.geom;
        let cfg = &self.cfg;
        let fish = (width / cfg.fish_divisor).max(cfg.fish_min);
        let weeds = (width / cfg.weed_divisor).max(cfg.weed_min);
        let starfish = (width / cfg.starfish_divisor).max(cfg.starfish_min);
        let shark = width >= cfg.shark_min_width;
        let eel = width >= cfg.eel_min_width;

        for _ in 0..fish {
            self.spawn(Species::Fish, SpawnMode::Scatter);
        }
        self.spawn(Species::Crab, SpawnMode::Scatter);
        self.spawn(Species::Jelly, SpawnMode::Scatter);
        if shark {
            self.spawn(Species::Shark, SpawnMode::Scatter);
        }
        if eel {
            self.spawn(Species::Eel, SpawnMode::Scatter);
        }

        let max_x = width as i32 - 2;
        let tallest = height.saturating_sub(6).clamp(2, 6);
        for _ in 0..weeds {
            let weed = Weed {
                x: self.rng.gen_range(1..=max_x.max(1)),
                height: self.rng.gen_range(2..=tallest),
                phase: self.rng.gen_range(0.0..TAU),
            };
            self.weeds.push(weed);
        }
        for _ in 0..starfish {
            let x = self.rng.gen_range(2..=(max_x - 1).max(2));
            self.starfish.push(Starfish { x });
        }

        let chest_x = (width as f32 * self.cfg.chest_at) as i32;
        self.chest = Chest {
            x: chest_x.clamp(1, (width as i32 - 1 - Chest::WIDTH).max(1)),
        };
    }

    pub(crate) fn spawn(&mut self, species: Species, mode: SpawnMode) {
        let creature = Creature::spawn(species, mode, self.geom, &self.cfg, &mut self.rng);
        self.creatures.push(creature);
    }

    pub fn geometry(&self) -> Geometry {
        self.geom
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn config(&self) -> &TankConfig {
        &self.cfg
    }

    pub fn creatures(&self) -> &[Creature] {
        &self.creatures
    }

    pub fn weeds(&self) -> &[Weed] {
        &self.weeds
    }

    pub fn starfish(&self) -> &[Starfish] {
        &self.starfish
    }

    pub fn chest(&self) -> &Chest {
        &self.chest
    }

    pub fn bubbles(&self) -> &[Bubble] {
        &self.bubbles
    }

    pub fn count(&self, species: Species) -> usize {
        self.creatures
            .iter()
            .filter(|c| c.species() == species)
            .count()
    }

    pub fn census(&self) -> Census {
        Census {
            fish: self.count(Species::Fish),
            sharks: self.count(Species::Shark),
            crabs: self.count(Species::Crab),
            jellies: self.count(Species::Jelly),
            eels: self.count(Species::Eel),
            weeds: self.weeds.len(),
            starfish: self.starfish.len(),
            bubbles: self.bubbles.len(),
        }
    }
}
