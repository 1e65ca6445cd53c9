//! morphcloud core engine: platform-agnostic templates, gesture mapping and
//! per-frame particle animation.
//!
//! Data flows one way each frame: a [`DetectionResult`] (or a [`KeyCommand`])
//! writes targets into the [`ControlState`], then [`AnimationEngine::tick`]
//! smooths the state and rewrites the caller's [`FrameBuffers`].

pub mod catalog;
pub mod color;
pub mod config;
pub mod detection;
pub mod engine;
pub mod gesture;
pub mod keyboard;
pub mod state;
pub mod template;

pub use catalog::TemplateCatalog;
pub use color::hsl_to_rgb;
pub use config::{CameraConfig, ConfigError, EngineConfig, HueOverlay, Smoothing};
pub use detection::{DetectionFault, DetectionResult};
pub use engine::{AnimationEngine, DirtyFlags, FrameBuffers};
pub use gesture::{GestureMapper, GestureTargets, Landmark, LandmarkSet};
pub use keyboard::KeyCommand;
pub use state::ControlState;
pub use template::{Template, TemplateKind};
