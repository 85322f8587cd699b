use crate::config::{PaletteName, TankConfig};
use crate::geometry::HostRegion;
use crate::scheduler::{FrameOutcome, Lifecycle, Scheduler};
use crate::serialize::Format;
use crate::sink::{restore_terminal, TerminalSink, WriterSink};
use anyhow::{Context, Result};
use clap::Parser;
use crossterm::{
    event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    terminal,
};
use std::{
    fs::File,
    io, panic,
    path::{Path, PathBuf},
    sync::Mutex,
    time::{Duration, Instant},
};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "tidepool", about = "A character-cell aquarium for your terminal")]
pub struct Args {
    /// JSON file with tank tunables; missing keys keep their defaults
    #[arg(long)]
    config: Option<PathBuf>,

    /// rng seed
    #[arg(long)]
    seed: Option<u64>,

    /// target frames per second
    #[arg(long)]
    fps: Option<u32>,

    #[arg(long, value_enum)]
    palette: Option<PaletteName>,

    /// draw all fish in a single color
    #[arg(long)]
    no_color: bool,

    /// render one still frame and never animate (also REDUCE_MOTION=1)
    #[arg(long)]
    reduced_motion: bool,

    #[arg(long, value_enum, default_value_t = Format::Ansi)]
    format: Format,

    /// frames to emit in plain/markup formats
    #[arg(long, default_value_t = 1)]
    frames: u64,

    /// columns available to plain/markup output (defaults to the terminal width)
    #[arg(long)]
    cols: Option<u16>,

    /// write logs here; full-screen mode logs nowhere otherwise
    #[arg(long)]
    log_file: Option<PathBuf>,
}

impl Args {
    fn tank_config(&self) -> Result<TankConfig> {
        let mut cfg = match &self.config {
            Some(path) => TankConfig::load(path)?,
            None => TankConfig::default(),
        };
        if let Some(seed) = self.seed {
            cfg.seed = seed;
        }
        if let Some(fps) = self.fps {
            cfg.fps = fps;
        }
        if let Some(palette) = self.palette {
            cfg.palette = palette;
        }
        if self.no_color {
            cfg.color = false;
        }
        Ok(cfg.sanitized())
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    let cfg = args.tank_config()?;
    let lifecycle = Lifecycle::detect(args.reduced_motion);

    match args.format {
        Format::Ansi => {
            init_logging(args.log_file.as_deref(), false)?;
            run_terminal(cfg, lifecycle)
        }
        format => {
            init_logging(args.log_file.as_deref(), true)?;
            run_text(cfg, lifecycle, format, args.frames, args.cols)
        }
    }
}

fn init_logging(log_file: Option<&Path>, stderr_fallback: bool) -> Result<()> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("tidepool=info"));
    if let Some(path) = log_file {
        let file = File::create(path)
            .with_context(|| format!("creating log file {}", path.display()))?;
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_writer(Mutex::new(file))
            .init();
    } else if stderr_fallback {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(io::stderr)
            .init();
    }
    Ok(())
}

fn terminal_region() -> Option<HostRegion> {
    terminal::size()
        .ok()
        .filter(|(cols, _)| *cols > 0)
        .map(|(cols, _)| HostRegion::cells(cols))
}

fn run_terminal(cfg: TankConfig, lifecycle: Lifecycle) -> Result<()> {
    let frame_dt = Duration::from_secs_f32(1.0 / cfg.fps as f32);
    let sink = TerminalSink::begin(cfg.palette)?;

    let original_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        restore_terminal();
        original_hook(info);
    }));

    let mut tank = Scheduler::start(cfg, &terminal_region, sink, lifecycle)?;
    let mut next_frame = Instant::now() + frame_dt;

    loop {
        let now = Instant::now();
        let wake = match tank.lifecycle() {
            Lifecycle::Animated => next_frame,
            Lifecycle::Static => tank
                .pending_resize()
                .unwrap_or(now + Duration::from_millis(250)),
        };

        if event::poll(wake.saturating_duration_since(now))? {
            match event::read()? {
                Event::Resize(cols, _) => tank.on_resize(Instant::now(), HostRegion::cells(cols)),
                Event::Key(KeyEvent {
                    code,
                    modifiers,
                    kind,
                    ..
                }) if kind == KeyEventKind::Press => match code {
                    KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc => break,
                    KeyCode::Char('c') if modifiers.contains(KeyModifiers::CONTROL) => break,
                    _ => {}
                },
                _ => {}
            }
            continue;
        }

        let now = Instant::now();
        tank.frame(now)?;
        next_frame += frame_dt;
        if next_frame < now {
            next_frame = now + frame_dt;
        }
    }

    tank.shutdown();
    tracing::info!(ticks = tank.tick(), renders = tank.renders(), "tank closed");
    Ok(())
}

fn run_text(
    cfg: TankConfig,
    lifecycle: Lifecycle,
    format: Format,
    frames: u64,
    cols: Option<u16>,
) -> Result<()> {
    let frame_dt = Duration::from_secs_f32(1.0 / cfg.fps as f32);
    let host = move || cols.map(HostRegion::cells).or_else(terminal_region);
    let sink = WriterSink::new(io::stdout().lock(), format);

    let mut tank = Scheduler::start(cfg, &host, sink, lifecycle)
        .context("pass --cols when stdout is not a terminal")?;
    for _ in 1..frames {
        std::thread::sleep(frame_dt);
        if tank.frame(Instant::now())? != FrameOutcome::Rendered {
            break;
        }
    }
    tank.shutdown();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::fs;

    struct TempConfig(PathBuf);

    impl TempConfig {
        fn new(name: &str, body: &str) -> Self {
            let path = std::env::temp_dir()
                .join(format!("tidepool-{}-{name}.json", std::process::id()));
            fs::write(&path, body).unwrap();
            Self(path)
        }

        fn path(&self) -> &str {
            self.0.to_str().unwrap()
        }
    }

    impl Drop for TempConfig {
        fn drop(&mut self) {
            let _ = fs::remove_file(&self.0);
        }
    }

    const FILE: &str =
        r#"{ "seed": 1, "fps": 10, "palette": "classic", "color": true, "max_cols": 80 }"#;

    fn config_from(argv: &[&str]) -> Result<TankConfig> {
        let args = Args::try_parse_from(std::iter::once("tidepool").chain(argv.iter().copied()))?;
        args.tank_config()
    }

    #[test]
    fn file_values_apply_when_no_flags_are_given() {
        let file = TempConfig::new("file-only", FILE);
        let cfg = config_from(&["--config", file.path()]).unwrap();
        assert_eq!(cfg.seed, 1);
        assert_eq!(cfg.fps, 10);
        assert_eq!(cfg.palette, PaletteName::Classic);
        assert!(cfg.color);
        assert_eq!(cfg.max_cols, 80);
    }

    #[test]
    fn cli_flags_override_the_config_file() {
        let file = TempConfig::new("overrides", FILE);
        let cfg = config_from(&[
            "--config",
            file.path(),
            "--seed",
            "7",
            "--fps",
            "30",
            "--palette",
            "reef",
            "--no-color",
        ])
        .unwrap();
        assert_eq!(cfg.seed, 7);
        assert_eq!(cfg.fps, 30);
        assert_eq!(cfg.palette, PaletteName::Reef);
        assert!(!cfg.color);
        assert_eq!(cfg.max_cols, 80);
    }

    #[test]
    fn cli_values_are_sanitized_too() {
        let file = TempConfig::new("sanitized", FILE);
        let cfg = config_from(&["--config", file.path(), "--fps", "500"]).unwrap();
        assert_eq!(cfg.fps, 60);
        assert_eq!(config_from(&["--fps", "1"]).unwrap().fps, 5);
    }

    #[test]
    fn malformed_config_is_a_startup_error() {
        let file = TempConfig::new("malformed", r#"{ "seed": "#);
        let err = config_from(&["--config", file.path()]).unwrap_err();
        assert!(format!("{err:#}").contains("parsing config"), "{err:#}");
    }

    #[test]
    fn unknown_palette_is_rejected_by_the_parser() {
        assert!(Args::try_parse_from(["tidepool", "--palette", "neon"]).is_err());
    }
}
