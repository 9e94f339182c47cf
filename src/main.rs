//! `gravfield` binary: run the field in a window, or render it headless.
//!
//! ```text
//! gravfield [--config FILE]
//! gravfield --snapshot OUT.png [--frames N] [--size WxH] [--scale S]
//!           [--pointer X,Y] [--seed N] [--config FILE]
//! gravfield --write-config FILE
//! ```
//!
//! Set `RUST_LOG=info` (or `debug`) for lifecycle and GPU logging.

use std::path::PathBuf;

use gravfield::headless::{render_snapshot, SnapshotOptions};
use gravfield::{FieldConfig, RunError, Vec2, Viewport};

const USAGE: &str = "usage:
  gravfield [--config FILE]
  gravfield --snapshot OUT.png [--frames N] [--size WxH] [--scale S] [--pointer X,Y] [--seed N] [--config FILE]
  gravfield --write-config FILE";

#[derive(Debug, PartialEq)]
enum Command {
    Window,
    Snapshot { out: PathBuf, options: SnapshotOptions },
    WriteConfig(PathBuf),
    Help,
}

#[derive(Debug, PartialEq)]
struct Args {
    command: Command,
    config: Option<PathBuf>,
    seed: Option<u64>,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

fn run() -> Result<(), RunError> {
    let args = parse_args(std::env::args().skip(1))?;

    let mut config = match &args.config {
        Some(path) => FieldConfig::load(path)?,
        None => FieldConfig::default(),
    };
    if args.seed.is_some() {
        config.seed = args.seed;
    }

    match args.command {
        Command::Help => {
            println!("{}", USAGE);
            Ok(())
        }
        Command::WriteConfig(path) => {
            config.save(&path)?;
            log::info!("wrote {}", path.display());
            Ok(())
        }
        Command::Snapshot { out, options } => {
            let image = render_snapshot(config, &options)?;
            image.save(&out)?;
            log::info!("wrote {}", out.display());
            Ok(())
        }
        Command::Window => gravfield::window::run(config),
    }
}

fn parse_args(mut args: impl Iterator<Item = String>) -> Result<Args, RunError> {
    let mut config = None;
    let mut seed = None;
    let mut snapshot = None;
    let mut write_config = None;
    let mut options = SnapshotOptions::default();
    let (mut width, mut height) = (options.viewport.width, options.viewport.height);
    let mut scale = options.viewport.scale_factor;

    while let Some(flag) = args.next() {
        let mut value = |name: &str| {
            args.next()
                .ok_or_else(|| RunError::Usage(format!("{} needs a value\n{}", name, USAGE)))
        };
        match flag.as_str() {
            "-h" | "--help" => {
                return Ok(Args { command: Command::Help, config, seed });
            }
            "--config" => config = Some(PathBuf::from(value("--config")?)),
            "--snapshot" => snapshot = Some(PathBuf::from(value("--snapshot")?)),
            "--write-config" => write_config = Some(PathBuf::from(value("--write-config")?)),
            "--frames" => options.frames = parse_number(&value("--frames")?, "--frames")?,
            "--seed" => seed = Some(parse_number(&value("--seed")?, "--seed")?),
            "--scale" => scale = parse_number(&value("--scale")?, "--scale")?,
            "--size" => {
                let raw = value("--size")?;
                let (w, h) = split_pair(&raw, 'x', "--size")?;
                width = w;
                height = h;
            }
            "--pointer" => {
                let raw = value("--pointer")?;
                let (x, y) = split_pair(&raw, ',', "--pointer")?;
                options.pointer = Some(Vec2::new(x, y));
            }
            other => {
                return Err(RunError::Usage(format!("unknown argument `{}`\n{}", other, USAGE)));
            }
        }
    }

    options.viewport = Viewport::new(width, height, scale);
    if options.viewport.is_degenerate() {
        return Err(RunError::Usage(format!(
            "size {}x{} at scale {} is not drawable",
            width, height, scale
        )));
    }

    let command = match (snapshot, write_config) {
        (Some(_), Some(_)) => {
            return Err(RunError::Usage("--snapshot and --write-config are exclusive".into()));
        }
        (Some(out), None) => Command::Snapshot { out, options },
        (None, Some(path)) => Command::WriteConfig(path),
        (None, None) => Command::Window,
    };
    Ok(Args { command, config, seed })
}

fn parse_number<T: std::str::FromStr>(raw: &str, flag: &str) -> Result<T, RunError> {
    raw.parse()
        .map_err(|_| RunError::Usage(format!("{} got `{}`, expected a number", flag, raw)))
}

fn split_pair(raw: &str, sep: char, flag: &str) -> Result<(f32, f32), RunError> {
    let (a, b) = raw
        .split_once(sep)
        .ok_or_else(|| RunError::Usage(format!("{} expects A{}B, got `{}`", flag, sep, raw)))?;
    Ok((parse_number(a.trim(), flag)?, parse_number(b.trim(), flag)?))
}
