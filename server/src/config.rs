//! Environment configuration for the console host.
//!
//! Values come from the process environment, optionally seeded from a
//! `.env` file by `dotenvy` before [`Settings::from_env`] runs.

use std::env;

use board_core::types::{InvasionType, ProgressFlags, TilePos, WorldProgress};
use log::LevelFilter;

use crate::memory_world::{cell_count, MAX_WORLD_CELLS};

const DEFAULT_LOG_FILE: &str = "signboard.log";
const DEFAULT_WORLD_WIDTH: i32 = 200;
const DEFAULT_WORLD_HEIGHT: i32 = 120;
const DEFAULT_SPAWN_Y: i32 = 60;

pub fn parse_log_level(value: &str) -> Option<LevelFilter> {
    match value.to_lowercase().as_str() {
        "off" => Some(LevelFilter::Off),
        "error" => Some(LevelFilter::Error),
        "warn" | "warning" => Some(LevelFilter::Warn),
        "info" => Some(LevelFilter::Info),
        "debug" => Some(LevelFilter::Debug),
        "trace" => Some(LevelFilter::Trace),
        _ => None,
    }
}

fn resolve_log_level() -> LevelFilter {
    env::var("SIGNBOARD_LOG_LEVEL")
        .ok()
        .as_deref()
        .and_then(parse_log_level)
        .unwrap_or(LevelFilter::Info)
}

fn resolve_log_file() -> Option<String> {
    match env::var("SIGNBOARD_LOG_FILE") {
        Ok(value) => {
            let trimmed = value.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("none") {
                None
            } else {
                Some(trimmed.to_string())
            }
        }
        Err(_) => Some(DEFAULT_LOG_FILE.to_string()),
    }
}

fn resolve_i32(key: &str, default: i32) -> Result<i32, String> {
    match env::var(key) {
        Ok(value) => value
            .trim()
            .parse::<i32>()
            .map_err(|err| format!("{key}={value} is not a number: {err}")),
        Err(_) => Ok(default),
    }
}

fn resolve_progress() -> Result<WorldProgress, String> {
    let flags = match env::var("SIGNBOARD_PROGRESS") {
        Ok(value) => value.parse::<ProgressFlags>()?,
        Err(_) => ProgressFlags::empty(),
    };
    let invasion = match env::var("SIGNBOARD_INVASION") {
        Ok(value) => value.parse::<InvasionType>()?,
        Err(_) => InvasionType::None,
    };
    Ok(WorldProgress::new(flags, invasion))
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub log_level: LevelFilter,
    pub log_file: Option<String>,
    pub world_width: i32,
    pub world_height: i32,
    pub spawn: TilePos,
    pub progress: WorldProgress,
}

impl Settings {
    pub fn from_env() -> Result<Self, String> {
        let world_width = resolve_i32("SIGNBOARD_WORLD_WIDTH", DEFAULT_WORLD_WIDTH)?;
        let world_height = resolve_i32("SIGNBOARD_WORLD_HEIGHT", DEFAULT_WORLD_HEIGHT)?;
        if world_width <= 0 || world_height <= 0 {
            return Err(format!(
                "World size must be positive, got {world_width}x{world_height}"
            ));
        }
        if cell_count(world_width, world_height).is_none() {
            return Err(format!(
                "World size {world_width}x{world_height} exceeds {MAX_WORLD_CELLS} cells"
            ));
        }

        let spawn = TilePos::new(
            resolve_i32("SIGNBOARD_SPAWN_X", world_width / 2)?,
            resolve_i32("SIGNBOARD_SPAWN_Y", DEFAULT_SPAWN_Y.min(world_height - 1))?,
        );

        Ok(Self {
            log_level: resolve_log_level(),
            log_file: resolve_log_file(),
            world_width,
            world_height,
            spawn,
            progress: resolve_progress()?,
        })
    }
}
