use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use log::LevelFilter;

use crate::settings::TerrainVariant;

/// Log levels accepted on the command line
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::Error,
            LogLevel::Warn => LevelFilter::Warn,
            LogLevel::Info => LevelFilter::Info,
            LogLevel::Debug => LevelFilter::Debug,
            LogLevel::Trace => LevelFilter::Trace,
        }
    }
}

/// Command line arguments. Flags override values from the settings file.
#[derive(Debug, Parser)]
#[command(name = "strata", version)]
#[command(about = "Render the Strata demo scene to a TGA image")]
pub struct Args {
    /// Logging level; RUST_LOG takes precedence when set
    #[arg(long, value_enum, default_value = "info")]
    pub log_level: LogLevel,

    /// JSON settings file
    #[arg(short, long)]
    pub settings: Option<PathBuf>,

    /// Image width in pixels
    #[arg(long)]
    pub width: Option<u32>,

    /// Image height in pixels
    #[arg(long)]
    pub height: Option<u32>,

    /// Jittered rays per pixel (random multisampling)
    #[arg(long, conflicts_with = "grid")]
    pub samples: Option<u32>,

    /// Direction jitter used with --samples
    #[arg(long, default_value_t = 0.001)]
    pub jitter: f32,

    /// Subpixel grid size (uniform multisampling)
    #[arg(long)]
    pub grid: Option<u32>,

    /// Demo camera index
    #[arg(short, long)]
    pub camera: Option<usize>,

    /// Terrain variant placed in the scene
    #[arg(long, value_enum)]
    pub terrain: Option<TerrainVariant>,

    /// Use an orthographic projection
    #[arg(long)]
    pub orthographic: bool,

    /// Overlay the terrain octree's node boxes
    #[arg(long)]
    pub show_debug: bool,

    /// Output gamma
    #[arg(long)]
    pub gamma: Option<f32>,

    /// Directory holding the demo textures and heightmap
    #[arg(short, long)]
    pub resources: Option<PathBuf>,

    /// Extra OBJ model to place in the scene
    #[arg(long)]
    pub obj: Option<PathBuf>,

    /// Output TGA path
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
