// src/main.rs

use std::backtrace::Backtrace;
use std::panic;

use log::{error, info, LevelFilter};

use watch_viewer::{DisplayMode, ViewerConfig};

fn main() {
    setup_diagnostics();

    let config = parse_config();
    info!("starting watch viewer ({:?} screen)", config.mode);

    if let Err(err) = watch_viewer::run_native(config) {
        error!("viewer terminated: {err}");
        std::process::exit(1);
    }
}

/// Resolve startup options from the command line, then the environment.
/// `--screen uv` (or WATCH_SCREEN=uv) selects the UV calibration screen;
/// anything else shows the time. `--model <path>` overrides the model file.
fn parse_config() -> ViewerConfig {
    let mut config = ViewerConfig::default();
    let mut screen_param = std::env::var("WATCH_SCREEN").ok();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--screen" => screen_param = args.next(),
            "--model" => {
                if let Some(path) = args.next() {
                    config.model_path = path.into();
                }
            }
            "--assets" => {
                if let Some(dir) = args.next() {
                    config.assets_dir = dir.into();
                }
            }
            other => {
                log::warn!("ignoring unknown argument {other:?}");
            }
        }
    }

    config.mode = DisplayMode::from_param(screen_param.as_deref());
    config
}

fn setup_diagnostics() {
    env_logger::Builder::new()
        .filter_level(if cfg!(debug_assertions) {
            LevelFilter::Debug
        } else {
            LevelFilter::Info
        })
        .format_timestamp_millis()
        .format_target(false)
        .parse_default_env()
        .init();

    panic::set_hook(Box::new(|panic_info| {
        let backtrace = Backtrace::force_capture();
        let location = panic_info
            .location()
            .map_or("unknown location".to_string(), |loc| {
                format!("{}:{}", loc.file(), loc.line())
            });
        eprintln!("panic at {location}: {panic_info}\n{backtrace}");
    }));
}
