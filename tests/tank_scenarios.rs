use pretty_assertions::assert_eq;
use std::io;
use std::time::{Duration, Instant};
use tidepool::entity::{Chest, Species};
use tidepool::serialize::{decode_markup, to_markup, to_plain};
use tidepool::sink::FrameSink;
use tidepool::{
    rasterize, Cell, FrameOutcome, Geometry, Grid, HostRegion, Lifecycle, Scheduler, Tank,
    TankConfig,
};

struct Counter(u64);

impl FrameSink for Counter {
    fn present(&mut self, _grid: &Grid) -> io::Result<()> {
        self.0 += 1;
        Ok(())
    }
}

fn resolved(cols: u16) -> Geometry {
    Geometry::resolve(HostRegion::cells(cols), &TankConfig::default())
}

#[test]
fn wide_tank_has_the_full_cast() {
    let geom = resolved(72);
    assert_eq!(geom, Geometry { width: 72, height: 14 });

    let tank = Tank::new(geom, TankConfig::default());
    let census = tank.census();
    assert!(census.fish >= 3, "{census:?}");
    assert_eq!(census.crabs, 1);
    assert_eq!(census.jellies, 1);
    assert_eq!(census.sharks, 1);
    assert_eq!(census.eels, 1);
    assert!(census.weeds >= 4, "{census:?}");
    assert!(census.starfish >= 1);
    let chest = tank.chest();
    assert!(chest.x >= 1 && chest.x + Chest::WIDTH <= 71, "{chest:?}");
}

#[test]
fn narrow_tank_leaves_out_shark_and_eel() {
    let geom = resolved(34);
    assert_eq!(geom.width, 34);
    assert!(geom.height < resolved(72).height);

    let tank = Tank::new(geom, TankConfig::default());
    assert_eq!(tank.count(Species::Shark), 0);
    assert_eq!(tank.count(Species::Eel), 0);
    assert_eq!(tank.count(Species::Crab), 1);
    assert_eq!(tank.count(Species::Jelly), 1);
}

#[test]
fn mid_width_gets_an_eel_but_no_shark() {
    let tank = Tank::new(resolved(50), TankConfig::default());
    assert_eq!(tank.count(Species::Shark), 0);
    assert_eq!(tank.count(Species::Eel), 1);
}

#[test]
fn reduced_motion_renders_exactly_once() {
    let host = || Some(HostRegion::cells(72));
    let mut s = Scheduler::start(TankConfig::default(), &host, Counter(0), Lifecycle::Static).unwrap();
    let t0 = Instant::now();
    for minutes in 0..120 {
        assert_eq!(
            s.frame(t0 + Duration::from_secs(60 * minutes)).unwrap(),
            FrameOutcome::Idle
        );
    }
    assert_eq!(s.sink().0, 1);
    assert_eq!(s.tick(), 0);
}

#[test]
fn population_is_stable_over_a_long_run_and_everything_stays_on_grid() {
    for cols in [30u16, 44, 60, 72, 120] {
        let mut tank = Tank::new(resolved(cols), TankConfig::default());
        let start = tank.census();
        for _ in 0..1_500 {
            tank.step();
            let grid = rasterize(&tank);
            let geom = tank.geometry();
            assert_eq!((grid.width(), grid.height()), (geom.width, geom.height));
            assert_eq!(grid.rows().count(), geom.height);
            assert!(grid.get(geom.width, 0).is_none());
        }
        let end = tank.census();
        assert_eq!(
            (end.fish, end.sharks, end.crabs, end.jellies, end.eels),
            (start.fish, start.sharks, start.crabs, start.jellies, start.eels)
        );
        for bubble in tank.bubbles() {
            assert!(bubble.y >= 1.0);
        }
    }
}

#[test]
fn plain_and_markup_describe_the_same_frame() {
    let mut tank = Tank::new(resolved(80), TankConfig::default());
    for _ in 0..90 {
        tank.step();
    }
    let grid = rasterize(&tank);
    let decoded = decode_markup(&to_markup(&grid)).unwrap();

    let from_markup: Vec<String> = decoded
        .iter()
        .map(|row| row.iter().map(|c: &Cell| c.ch).collect())
        .collect();
    let plain: Vec<String> = to_plain(&grid).lines().map(str::to_string).collect();
    assert_eq!(from_markup, plain);
}
