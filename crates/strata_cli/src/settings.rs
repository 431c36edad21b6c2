//! Render settings, read from JSON and overridden by command line flags.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use strata_renderer::{RenderConfig, Sampler};

use crate::cli::Args;

/// Which terrain shape the demo scene uses.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum TerrainVariant {
    None,
    /// Triangles in one flat bounding shape
    Flat,
    /// Triangles in an octree
    #[default]
    Octree,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub render: RenderConfig,
    pub camera: usize,
    pub terrain: TerrainVariant,
    pub orthographic: bool,
    pub show_debug: bool,
    pub resources: PathBuf,
    pub obj: Option<PathBuf>,
    pub output: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            render: RenderConfig::default(),
            camera: 0,
            terrain: TerrainVariant::default(),
            orthographic: false,
            show_debug: false,
            resources: PathBuf::from("resources"),
            obj: None,
            output: PathBuf::from("render.tga"),
        }
    }
}

impl Settings {
    pub fn load(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read settings file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("Failed to parse settings file {}", path.display()))
    }

    /// Settings from the optional file, then command line overrides.
    pub fn from_args(args: &Args) -> Result<Self> {
        let mut settings = match &args.settings {
            Some(path) => Self::load(path)?,
            None => Self::default(),
        };
        settings.apply(args);
        settings.validate()?;
        Ok(settings)
    }

    /// Reject values the renderer cannot work with.
    pub fn validate(&self) -> Result<()> {
        let render = &self.render;
        if render.width == 0 || render.height == 0 {
            bail!(
                "Image size must be non-zero, got {}x{}",
                render.width,
                render.height
            );
        }
        match render.sampler {
            Sampler::Uniform { grid: 0 } => bail!("Sampling grid must be at least 1"),
            Sampler::Random { samples: 0, .. } => bail!("Sample count must be at least 1"),
            _ => {}
        }
        if render.bucket_size == 0 {
            bail!("Bucket size must be at least 1");
        }
        if render.gamma.is_nan() || render.gamma <= 0.0 {
            bail!("Gamma must be positive, got {}", render.gamma);
        }
        Ok(())
    }

    fn apply(&mut self, args: &Args) {
        let render = &mut self.render;
        if let Some(width) = args.width {
            render.width = width;
        }
        if let Some(height) = args.height {
            render.height = height;
        }
        if let Some(samples) = args.samples {
            render.sampler = Sampler::Random {
                samples,
                jitter: args.jitter,
            };
        }
        if let Some(grid) = args.grid {
            render.sampler = Sampler::Uniform { grid };
        }
        if let Some(gamma) = args.gamma {
            render.gamma = gamma;
        }
        if let Some(camera) = args.camera {
            self.camera = camera;
        }
        if let Some(terrain) = args.terrain {
            self.terrain = terrain;
        }
        self.orthographic |= args.orthographic;
        self.show_debug |= args.show_debug;
        if let Some(resources) = &args.resources {
            self.resources = resources.clone();
        }
        if let Some(obj) = &args.obj {
            self.obj = Some(obj.clone());
        }
        if let Some(output) = &args.output {
            self.output = output.clone();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_defaults_without_file() {
        let args = Args::parse_from(["strata"]);
        let settings = Settings::from_args(&args).unwrap();

        assert_eq!(settings, Settings::default());
    }

    #[test]
    fn test_flags_override_file() {
        let path = std::env::temp_dir()
            .join(format!("strata_settings_test_{}.json", std::process::id()));
        fs::write(
            &path,
            r#"{"render": {"width": 320, "height": 240}, "camera": 2, "terrain": "flat"}"#,
        )
        .unwrap();

        let args = Args::parse_from([
            "strata",
            "--settings",
            path.to_str().unwrap(),
            "--height",
            "100",
            "--samples",
            "4",
            "--orthographic",
        ]);
        let settings = Settings::from_args(&args).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(settings.render.width, 320);
        assert_eq!(settings.render.height, 100);
        assert_eq!(settings.camera, 2);
        assert_eq!(settings.terrain, TerrainVariant::Flat);
        assert!(settings.orthographic);
        assert_eq!(
            settings.render.sampler,
            Sampler::Random {
                samples: 4,
                jitter: 0.001
            }
        );
    }

    #[test]
    fn test_missing_file_is_error() {
        let args = Args::parse_from(["strata", "--settings", "/nonexistent/strata.json"]);
        let err = Settings::from_args(&args).unwrap_err();

        assert!(err.to_string().contains("Failed to read settings file"));
    }

    fn rejected(flags: &[&str]) -> String {
        let args = Args::parse_from(std::iter::once("strata").chain(flags.iter().copied()));
        Settings::from_args(&args).unwrap_err().to_string()
    }

    #[test]
    fn test_zero_size_is_rejected() {
        assert!(rejected(&["--width", "0"]).contains("Image size"));
        assert!(rejected(&["--height", "0"]).contains("Image size"));
    }

    #[test]
    fn test_zero_samples_is_rejected() {
        assert!(rejected(&["--samples", "0"]).contains("Sample count"));
    }

    #[test]
    fn test_zero_grid_is_rejected() {
        assert!(rejected(&["--grid", "0"]).contains("Sampling grid"));
    }

    #[test]
    fn test_non_positive_gamma_is_rejected() {
        assert!(rejected(&["--gamma", "0"]).contains("Gamma"));
        assert!(rejected(&["--gamma=-2.2"]).contains("Gamma"));
    }

    #[test]
    fn test_zero_bucket_size_is_rejected() {
        let mut settings = Settings::default();
        settings.render.bucket_size = 0;

        let err = settings.validate().unwrap_err();

        assert!(err.to_string().contains("Bucket size"));
    }

    #[test]
    fn test_file_values_are_validated() {
        let path = std::env::temp_dir()
            .join(format!("strata_settings_invalid_{}.json", std::process::id()));
        fs::write(&path, r#"{"render": {"bucket_size": 0}}"#).unwrap();

        let args = Args::parse_from(["strata", "--settings", path.to_str().unwrap()]);
        let result = Settings::from_args(&args);
        fs::remove_file(&path).ok();

        assert!(result.unwrap_err().to_string().contains("Bucket size"));
    }
}
