use std::path::PathBuf;

use serde_json::json;
use tracing::{info, Level};

use chromatap::{DualModeEngine, EngineConfig, EngineError, SegmentationMode, SegmentationResult};

struct CliArgs {
    path: PathBuf,
    mode: SegmentationMode,
    seed: Option<(u32, u32)>,
    sensitivity: u8,
    radius: u32,
}

fn init_logging() {
    tracing_subscriber::fmt().with_max_level(Level::INFO).init();
}

fn print_usage() {
    eprintln!(
        "Usage: chromatap <image> [--mode streaming|precision] [--seed X,Y] [--sensitivity N] [--radius N]"
    );
}

fn parse_args() -> Option<CliArgs> {
    let defaults = EngineConfig::default();
    let mut path = None;
    let mut mode = defaults.mode;
    let mut seed = None;
    let mut sensitivity = defaults.sensitivity;
    let mut radius = 4;

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--mode" => {
                mode = match args.next()?.as_str() {
                    "streaming" => SegmentationMode::Streaming,
                    "precision" => SegmentationMode::Precision,
                    _ => return None,
                };
            }
            "--seed" => {
                let value = args.next()?;
                let (x, y) = value.split_once(',')?;
                seed = Some((x.trim().parse().ok()?, y.trim().parse().ok()?));
            }
            "--sensitivity" => {
                sensitivity = args.next()?.parse().ok()?;
            }
            "--radius" => {
                radius = args.next()?.parse().ok()?;
            }
            other if path.is_none() && !other.starts_with("--") => {
                path = Some(PathBuf::from(other));
            }
            _ => return None,
        }
    }

    Some(CliArgs {
        path: path?,
        mode,
        seed,
        sensitivity,
        radius,
    })
}

fn main() -> Result<(), EngineError> {
    let Some(args) = parse_args() else {
        print_usage();
        std::process::exit(2);
    };
    init_logging();

    let image = image::open(&args.path)?.to_rgb8();
    info!(
        "Loaded {} ({}x{})",
        args.path.display(),
        image.width(),
        image.height()
    );

    let config = EngineConfig {
        mode: args.mode,
        ..EngineConfig::default()
    };
    let mut engine = DualModeEngine::new(config);

    match args.seed {
        Some((x, y)) => {
            let segment = engine.segment_at(&image, x, y, args.sensitivity);
            let analysis = engine.analyze_color(&image, x, y, args.radius);
            let report = json!({ "segment": segment, "analysis": analysis });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        None => match engine.segment(&image) {
            Ok(result) => println!("{}", serde_json::to_string_pretty(result.as_ref())?),
            Err(err) => {
                let failed = SegmentationResult::failed(err.to_string(), args.mode);
                println!("{}", serde_json::to_string_pretty(&failed)?);
            }
        },
    }

    Ok(())
}
