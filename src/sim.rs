use crate::entity::{Bubble, SpawnMode};
use crate::tank::Tank;
use rand::Rng;

impl Tank {
    /// Advances every entity by one tick.
    pub fn step(&mut self) {
        self.tick += 1;
        let tick = self.tick;
        let geom = self.geom;

        for creature in &mut self.creatures {
            creature.advance(tick, geom);
        }

        // Rising is strictly monotonic, so every bubble eventually clears the top.
        let cfg = &self.cfg;
        for bubble in &mut self.bubbles {
            bubble.y -= cfg.bubble_rise + self.rng.gen::<f32>() * cfg.bubble_jitter;
            bubble.x += bubble.drift * cfg.bubble_drift_damping;
        }
        self.bubbles.retain(|b| b.y >= 1.0);

        for creature in &self.creatures {
            if let Some((x, y)) = creature.trailing_edge() {
                if self.rng.gen_bool(cfg.fish_bubble_chance) {
                    self.bubbles.push(Bubble::new(x, y, &mut self.rng));
                }
            }
        }
        if self.rng.gen_bool(cfg.chest_bubble_chance) {
            let (x, y) = self.chest.vent(geom);
            self.bubbles.push(Bubble::new(x, y, &mut self.rng));
        }

        let width = geom.width as f32;
        let mut departed = Vec::new();
        self.creatures.retain(|c| {
            if c.has_exited(width) {
                departed.push((c.species(), c.dir));
                false
            } else {
                true
            }
        });
        for (species, dir) in departed {
            tracing::debug!(?species, ?dir, tick, "respawning at opposite edge");
            self.spawn(species, SpawnMode::Edge(dir));
        }
    }
}
