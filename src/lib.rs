pub mod app;
pub mod config;
pub mod entity;
pub mod error;
pub mod geometry;
pub mod raster;
pub mod scheduler;
pub mod serialize;
pub mod sim;
pub mod sink;
pub mod tank;

pub use config::{PaletteName, TankConfig};
pub use error::TankError;
pub use geometry::{Geometry, HostRegion};
pub use raster::{rasterize, Cell, Grid, Style};
pub use scheduler::{FrameOutcome, Lifecycle, Scheduler};
pub use tank::{Census, Tank};
