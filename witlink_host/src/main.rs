use log::{error, info};
use std::fs::File;
use std::io::BufReader;
use std::process::ExitCode;
use witlink_common::Sample;
use witlink_host::replay::replay;
use witlink_host::{Pipeline, SampleStore, SessionConfig};

const USAGE: &str = "usage: witlink-replay <capture.hex> [config.json]";

/// Replays a hex capture through the decoder and prints one JSON object per
/// decoded sample.
fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args: Vec<String> = std::env::args().collect();
    let capture_path = match args.get(1) {
        Some(p) => p,
        None => {
            eprintln!("{USAGE}");
            return ExitCode::from(2);
        }
    };

    let config = match args.get(2) {
        Some(path) => match SessionConfig::from_file(path) {
            Ok(c) => c,
            Err(e) => {
                error!("Could not load config {}: {}", path, e);
                return ExitCode::FAILURE;
            }
        },
        None => SessionConfig::default(),
    };
    info!("Accel unit: {:?}", config.accel_unit);

    let file = match File::open(capture_path) {
        Ok(f) => f,
        Err(e) => {
            error!("Could not open {}: {}", capture_path, e);
            return ExitCode::FAILURE;
        }
    };

    let mut pipeline = Pipeline::new(
        config.decoder_config(),
        Box::new(|_: &SampleStore, sample: &Sample| {
            match serde_json::to_string(sample) {
                Ok(s) => println!("{s}"),
                Err(e) => error!("Error serializing sample {:?}: {}", sample, e),
            }
        }),
    )
    .with_plausibility_check(config.plausibility_check);

    match replay(BufReader::new(file), &mut pipeline) {
        Ok(stats) => {
            info!(
                "frames={} resync_drops={} unrecognized={} implausible={}",
                stats.frames, stats.resync_drops, stats.unrecognized, stats.implausible
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            error!("Replay failed: {e}");
            ExitCode::FAILURE
        }
    }
}
