use bevy::log::LogPlugin;
use bevy::prelude::*;
use bevy::window::WindowResolution;
use std::fs;
use std::path::{Path, PathBuf};
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use tileroute::game::GamePlugin;

const LOG_DIR: &str = "logs";
const LOG_PREFIX: &str = "tileroute";
const LOGS_TO_KEEP: usize = 25;

/// Install stdout + per-run file logging. Returns the log file path.
fn init_logging() -> PathBuf {
    let log_dir = PathBuf::from(LOG_DIR);
    if let Err(e) = fs::create_dir_all(&log_dir) {
        eprintln!("Could not create {}: {}", log_dir.display(), e);
    }
    prune_logs(&log_dir, LOGS_TO_KEEP);

    let file_name = format!("{}_{}.log", LOG_PREFIX, chrono::Local::now().format("%Y%m%d_%H%M%S"));
    // One file per run; never rotate mid-session.
    let file_appender = RollingFileAppender::new(Rotation::NEVER, &log_dir, &file_name);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new("wgpu=error,naga=warn,bevy_render=info,bevy_ecs=info,tileroute=info")
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(file_appender).with_ansi(false))
        .with(fmt::layer().with_writer(std::io::stdout).with_target(false))
        .init();

    log_dir.join(file_name)
}

/// Delete the oldest run logs so at most `keep` remain.
fn prune_logs(log_dir: &Path, keep: usize) {
    let Ok(entries) = fs::read_dir(log_dir) else {
        return;
    };
    let mut logs: Vec<_> = entries
        .filter_map(|e| e.ok())
        .filter(|e| {
            e.file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(LOG_PREFIX) && name.ends_with(".log"))
        })
        .collect();
    if logs.len() <= keep {
        return;
    }
    logs.sort_by_key(|e| e.metadata().ok().and_then(|m| m.modified().ok()));
    for entry in &logs[..logs.len() - keep] {
        let _ = fs::remove_file(entry.path());
    }
}

fn main() {
    let log_file = init_logging();
    println!("Tileroute: logging to {}", log_file.display());
    println!("WASD to move the viewer, scroll to zoom, right click to route a path");

    App::new()
        .add_plugins(
            DefaultPlugins
                .set(WindowPlugin {
                    primary_window: Some(Window {
                        title: "Tileroute".into(),
                        resolution: WindowResolution::new(1280, 720),
                        resizable: true,
                        ..default()
                    }),
                    ..default()
                })
                .build()
                // The subscriber above replaces Bevy's logger.
                .disable::<LogPlugin>(),
        )
        .add_plugins(GamePlugin)
        .run();
}
