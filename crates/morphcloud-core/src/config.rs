//! Startup configuration: particle count, template order and the animation
//! constants, loadable from TOML.

use std::path::{Path, PathBuf};

use glam::{Mat4, Vec3};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::info;

use crate::template::TemplateKind;

pub const DEFAULT_PARTICLE_COUNT: usize = 8000;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("particle count must be positive")]
    ZeroParticles,
    #[error("template list is empty")]
    NoTemplates,
    #[error("{name} must be in (0, 1], got {value}")]
    RateOutOfRange { name: &'static str, value: f32 },
}

/// Per-frame rates of the exponential smoothers and the blend step.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Smoothing {
    pub expansion_rate: f32,
    pub hue_rate: f32,
    /// Applied once per missed detection, not per frame.
    pub decay_rate: f32,
    pub blend_step: f32,
}

impl Default for Smoothing {
    fn default() -> Self {
        Self {
            expansion_rate: 0.08,
            hue_rate: 0.06,
            decay_rate: 0.02,
            blend_step: 0.06,
        }
    }
}

/// Live hue overlay mixed into every particle color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HueOverlay {
    pub weight: f32,
    pub saturation: f32,
    pub lightness: f32,
    pub shift_gain: f32,
    pub offset_modulus: usize,
    pub offset_step: f32,
}

impl Default for HueOverlay {
    fn default() -> Self {
        Self {
            weight: 0.4,
            saturation: 0.7,
            lightness: 0.7,
            shift_gain: 0.3,
            offset_modulus: 100,
            offset_step: 0.0001,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub fov_y_degrees: f32,
    pub near: f32,
    pub far: f32,
    pub distance: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            fov_y_degrees: 60.0,
            near: 0.1,
            far: 100.0,
            distance: 1.8,
        }
    }
}

impl CameraConfig {
    /// Perspective camera on the +Z axis looking at the origin.
    pub fn view_projection(&self, aspect: f32) -> Mat4 {
        let projection =
            Mat4::perspective_rh_gl(self.fov_y_degrees.to_radians(), aspect, self.near, self.far);
        let view = Mat4::look_at_rh(Vec3::new(0.0, 0.0, self.distance), Vec3::ZERO, Vec3::Y);
        projection * view
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub particle_count: usize,
    pub templates: Vec<TemplateKind>,
    pub smoothing: Smoothing,
    pub overlay: HueOverlay,
    /// Radians per second about the Y axis.
    pub rotation_speed: f32,
    pub camera: CameraConfig,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            particle_count: DEFAULT_PARTICLE_COUNT,
            templates: TemplateKind::ALL.to_vec(),
            smoothing: Smoothing::default(),
            overlay: HueOverlay::default(),
            rotation_speed: 0.15,
            camera: CameraConfig::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&text)?;
        info!(
            "loaded config from {}: {} particles, {} templates",
            path.display(),
            config.particle_count,
            config.templates.len()
        );
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.particle_count == 0 {
            return Err(ConfigError::ZeroParticles);
        }
        if self.templates.is_empty() {
            return Err(ConfigError::NoTemplates);
        }
        let rates = [
            ("smoothing.expansion_rate", self.smoothing.expansion_rate),
            ("smoothing.hue_rate", self.smoothing.hue_rate),
            ("smoothing.decay_rate", self.smoothing.decay_rate),
            ("smoothing.blend_step", self.smoothing.blend_step),
        ];
        for (name, value) in rates {
            if !(value > 0.0 && value <= 1.0) {
                return Err(ConfigError::RateOutOfRange { name, value });
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_document_is_default() {
        assert_eq!(EngineConfig::from_toml_str("").unwrap(), EngineConfig::default());
    }

    #[test]
    fn partial_sections_keep_defaults() {
        let config = EngineConfig::from_toml_str(
            r#"
            particle_count = 1200
            templates = ["Stars", "Saturn"]

            [smoothing]
            hue_rate = 0.1
            "#,
        )
        .unwrap();
        assert_eq!(config.particle_count, 1200);
        assert_eq!(config.templates, vec![TemplateKind::Stars, TemplateKind::Saturn]);
        assert_eq!(config.smoothing.hue_rate, 0.1);
        assert_eq!(config.smoothing.expansion_rate, 0.08);
        assert_eq!(config.overlay, HueOverlay::default());
    }

    #[test]
    fn rejects_bad_values() {
        assert!(matches!(
            EngineConfig::from_toml_str("particle_count = 0"),
            Err(ConfigError::ZeroParticles)
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("templates = []"),
            Err(ConfigError::NoTemplates)
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("[smoothing]\nblend_step = 1.5"),
            Err(ConfigError::RateOutOfRange { name: "smoothing.blend_step", .. })
        ));
        assert!(matches!(
            EngineConfig::from_toml_str("templates = [\"Comets\"]"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn demo_config_matches_defaults() {
        let config = EngineConfig::from_toml_str(include_str!("../../../demos/morphcloud.toml")).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn missing_file_reports_path() {
        let err = EngineConfig::load(Path::new("/nonexistent/morphcloud.toml")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/morphcloud.toml"));
    }

    #[test]
    fn origin_projects_to_screen_center() {
        let clip = CameraConfig::default().view_projection(16.0 / 9.0) * glam::Vec4::W;
        assert!(clip.x.abs() < 1e-6 && clip.y.abs() < 1e-6);
        assert!(clip.w > 0.0);
    }
}
