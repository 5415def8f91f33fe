//! Configuration for the demo.
//!
//! Settings come from an optional TOML file and are then overridden by
//! command line flags. Every field has a default so an empty file (or no
//! file at all) yields a runnable configuration.

use std::path::{Path, PathBuf};

use clap::Parser;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::math::FitMode;

/// Configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Parse error
    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Unsupported format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),
}

/// Which renderer is attached to the window.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SceneKind {
    /// Flat-coloured triangle.
    Triangle,
    /// Image on a full-viewport quad.
    #[default]
    Texture,
}

/// When frames are drawn.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum RenderMode {
    /// Only after the surface changes or new content is set.
    #[default]
    WhenDirty,
    /// Every iteration of the event loop.
    Continuous,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "lumen".to_string(),
            width: 1280,
            height: 720,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriangleConfig {
    /// RGBA fill colour.
    pub color: [f32; 4],
    /// Apply the perspective camera instead of drawing in clip space.
    pub perspective: bool,
}

impl Default for TriangleConfig {
    fn default() -> Self {
        Self {
            color: [1.0, 1.0, 0.0, 1.0],
            perspective: false,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TextureConfig {
    /// Image to display. A generated checkerboard is used when unset.
    pub image: Option<PathBuf>,
    pub fit: FitMode,
}

/// Top-level demo configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub scene: SceneKind,
    pub render_mode: RenderMode,
    pub clear_color: [f32; 4],
    pub window: WindowConfig,
    pub triangle: TriangleConfig,
    pub texture: TextureConfig,
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            scene: SceneKind::default(),
            render_mode: RenderMode::default(),
            clear_color: [0.0, 0.0, 0.0, 0.0],
            window: WindowConfig::default(),
            triangle: TriangleConfig::default(),
            texture: TextureConfig::default(),
        }
    }
}

impl DemoConfig {
    /// Load configuration from a `.toml` file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if path.extension().and_then(|ext| ext.to_str()) != Some("toml") {
            return Err(ConfigError::UnsupportedFormat(path.display().to_string()));
        }

        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(contents)?)
    }

    /// Builds the effective configuration: file (if any) first, then flags.
    pub fn resolve(args: &CliArgs) -> Result<Self, ConfigError> {
        let mut config = match &args.config {
            Some(path) => Self::load_from_file(path)?,
            None => Self::default(),
        };
        config.apply_cli(args);
        Ok(config)
    }

    fn apply_cli(&mut self, args: &CliArgs) {
        if let Some(scene) = args.scene {
            self.scene = scene;
        }
        if let Some(image) = &args.image {
            self.texture.image = Some(image.clone());
        }
        if let Some(fit) = args.fit {
            self.texture.fit = fit;
        }
        if args.continuous {
            self.render_mode = RenderMode::Continuous;
        }
        if args.perspective {
            self.triangle.perspective = true;
        }
    }
}

/// Command line arguments.
#[derive(Parser, Debug, Default)]
#[command(name = "lumen")]
#[command(about = "Renders a triangle or a textured quad with wgpu")]
#[command(version)]
pub struct CliArgs {
    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Scene to render
    #[arg(short, long, value_enum)]
    pub scene: Option<SceneKind>,

    /// Image shown by the texture scene
    #[arg(short, long)]
    pub image: Option<PathBuf>,

    /// How the image is fitted to the window
    #[arg(long, value_enum)]
    pub fit: Option<FitMode>,

    /// Redraw every frame instead of only when the surface changes
    #[arg(long)]
    pub continuous: bool,

    /// Draw the triangle through the perspective camera
    #[arg(long)]
    pub perspective: bool,

    /// Log level (error, warn, info, debug, trace); RUST_LOG takes precedence
    #[arg(long, default_value = "info")]
    pub log_level: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn empty_file_yields_defaults() {
        let config = DemoConfig::from_toml("").unwrap();
        assert_eq!(config, DemoConfig::default());
        assert_eq!(config.scene, SceneKind::Texture);
        assert_eq!(config.render_mode, RenderMode::WhenDirty);
        assert_eq!(config.triangle.color, [1.0, 1.0, 0.0, 1.0]);
    }

    #[test]
    fn partial_file_keeps_unset_defaults() {
        let config = DemoConfig::from_toml(
            r#"
            scene = "triangle"
            render_mode = "continuous"

            [window]
            width = 640

            [texture]
            fit = "cover"
            "#,
        )
        .unwrap();

        assert_eq!(config.scene, SceneKind::Triangle);
        assert_eq!(config.render_mode, RenderMode::Continuous);
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 720);
        assert_eq!(config.texture.fit, FitMode::Cover);
        assert_eq!(config.texture.image, None);
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = DemoConfig::from_toml("scene = \"hexagon\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn load_from_file_reads_toml() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "clear_color = [0.1, 0.2, 0.3, 1.0]").unwrap();

        let config = DemoConfig::load_from_file(file.path()).unwrap();
        assert_eq!(config.clear_color, [0.1, 0.2, 0.3, 1.0]);
    }

    #[test]
    fn load_from_file_rejects_other_extensions() {
        let file = tempfile::Builder::new().suffix(".ron").tempfile().unwrap();
        let err = DemoConfig::load_from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedFormat(_)));
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = DemoConfig::load_from_file(dir.path().join("absent.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }

    #[test]
    fn cli_flags_override_file_values() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "scene = \"texture\"\n[texture]\nfit = \"contain\"").unwrap();

        let args = CliArgs::try_parse_from([
            "lumen",
            "--config",
            file.path().to_str().unwrap(),
            "--scene",
            "triangle",
            "--fit",
            "stretch",
            "--image",
            "photo.png",
            "--continuous",
        ])
        .unwrap();

        let config = DemoConfig::resolve(&args).unwrap();
        assert_eq!(config.scene, SceneKind::Triangle);
        assert_eq!(config.texture.fit, FitMode::Stretch);
        assert_eq!(config.texture.image, Some(PathBuf::from("photo.png")));
        assert_eq!(config.render_mode, RenderMode::Continuous);
        assert!(!config.triangle.perspective);
    }

    #[test]
    fn no_flags_means_defaults() {
        let args = CliArgs::try_parse_from(["lumen"]).unwrap();
        assert_eq!(args.log_level, "info");
        assert_eq!(DemoConfig::resolve(&args).unwrap(), DemoConfig::default());
    }
}
