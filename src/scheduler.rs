use crate::config::TankConfig;
use crate::error::TankError;
use crate::geometry::{Geometry, HostRegion};
use crate::raster::rasterize;
use crate::sink::FrameSink;
use crate::tank::Tank;
use std::env;
use std::time::{Duration, Instant};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Lifecycle {
    /// Tick and render every frame until shut down.
    Animated,
    /// Render once, never tick.
    Static,
}

impl Lifecycle {
    /// `--reduced-motion` wins; otherwise the `REDUCE_MOTION` variable decides.
    pub fn detect(reduced_motion_flag: bool) -> Self {
        if reduced_motion_flag {
            return Lifecycle::Static;
        }
        match env::var("REDUCE_MOTION") {
            Ok(value) => Self::from_preference(&value),
            Err(_) => Lifecycle::Animated,
        }
    }

    pub fn from_preference(value: &str) -> Self {
        match value.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "reduced" | "none" | "static" | "off" => Lifecycle::Static,
            _ => Lifecycle::Animated,
        }
    }
}

/// Anything that can say how much room the tank has.
pub trait Host {
    fn region(&self) -> Option<HostRegion>;
}

impl<F: Fn() -> Option<HostRegion>> Host for F {
    fn region(&self) -> Option<HostRegion> {
        self()
    }
}

/// Coalesces bursts of values into the last one, released after a quiet period.
#[derive(Debug)]
pub struct Debouncer<T> {
    quiet: Duration,
    pending: Option<(Instant, T)>,
}

impl<T> Debouncer<T> {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            pending: None,
        }
    }

    pub fn push(&mut self, now: Instant, value: T) {
        if self.pending.is_some() {
            tracing::debug!("coalescing resize burst");
        }
        self.pending = Some((now + self.quiet, value));
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.pending.as_ref().map(|(at, _)| *at)
    }

    pub fn take_ready(&mut self, now: Instant) -> Option<T> {
        match self.pending {
            Some((at, _)) if now >= at => self.pending.take().map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameOutcome {
    Rendered,
    Idle,
    Stopped,
}

/// Owns the tank and drives step, rasterize and present, one frame at a time.
pub struct Scheduler<S: FrameSink> {
    tank: Tank,
    sink: S,
    lifecycle: Lifecycle,
    resize: Debouncer<HostRegion>,
    renders: u64,
    stopped: bool,
}

impl<S: FrameSink> Scheduler<S> {
    /// Sizes the tank, populates it and presents the first frame before returning.
    pub fn start(
        cfg: TankConfig,
        host: &impl Host,
        sink: S,
        lifecycle: Lifecycle,
    ) -> Result<Self, TankError> {
        let cfg = cfg.sanitized();
        let region = host.region().ok_or(TankError::NoHostRegion)?;
        let geom = Geometry::resolve(region, &cfg);
        tracing::info!(?geom, ?lifecycle, seed = cfg.seed, "starting tank");

        let quiet = Duration::from_millis(cfg.resize_debounce_ms);
        let mut scheduler = Self {
            tank: Tank::new(geom, cfg),
            sink,
            lifecycle,
            resize: Debouncer::new(quiet),
            renders: 0,
            stopped: false,
        };
        scheduler.render()?;
        Ok(scheduler)
    }

    pub fn on_resize(&mut self, now: Instant, region: HostRegion) {
        if !self.stopped {
            self.resize.push(now, region);
        }
    }

    /// Runs one frame. Pending resizes take priority over ticking.
    pub fn frame(&mut self, now: Instant) -> Result<FrameOutcome, TankError> {
        if self.stopped {
            return Ok(FrameOutcome::Stopped);
        }
        if let Some(region) = self.resize.take_ready(now) {
            let geom = Geometry::resolve(region, self.tank.config());
            self.tank.reseed(geom);
            self.render()?;
            return Ok(FrameOutcome::Rendered);
        }
        match self.lifecycle {
            Lifecycle::Static => Ok(FrameOutcome::Idle),
            Lifecycle::Animated => {
                self.tank.step();
                self.render()?;
                Ok(FrameOutcome::Rendered)
            }
        }
    }

    fn render(&mut self) -> Result<(), TankError> {
        let grid = rasterize(&self.tank);
        self.sink.present(&grid)?;
        self.renders += 1;
        Ok(())
    }

    /// Stops all further frames and drops any pending resize.
    pub fn shutdown(&mut self) {
        self.stopped = true;
        self.resize.cancel();
    }

    pub fn pending_resize(&self) -> Option<Instant> {
        self.resize.deadline()
    }

    pub fn lifecycle(&self) -> Lifecycle {
        self.lifecycle
    }

    pub fn tick(&self) -> u64 {
        self.tank.tick()
    }

    pub fn renders(&self) -> u64 {
        self.renders
    }

    pub fn geometry(&self) -> Geometry {
        self.tank.geometry()
    }

    pub fn tank(&self) -> &Tank {
        &self.tank
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }
}
