//! Platform abstraction traits so `morphcloud-core` stays free of camera,
//! detector and GPU specifics.

use glam::Mat4;
use morphcloud_core::{FrameBuffers, KeyCommand, LandmarkSet};
use thiserror::Error;

mod driver;

pub use driver::{FrameDriver, FrameReport, TrackingInput, KEYBOARD_HINT};

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Startup failure to obtain the detector or its video input. Not retried;
/// the driver falls back to keyboard control.
#[derive(Debug, Error)]
pub enum AcquisitionError {
    #[error("hand model failed to load: {0}")]
    ModelLoad(String),
    #[error("camera permission denied")]
    PermissionDenied,
    #[error("no video device available: {0}")]
    DeviceUnavailable(String),
}

/// One video frame as handed to the detector.
#[derive(Debug, Clone, Copy)]
pub struct VideoFrame<'a> {
    /// Source timestamp in seconds. Equal timestamps mean the same frame.
    pub timestamp: f64,
    pub width: u32,
    pub height: u32,
    pub pixels: &'a [u8],
}

/// Camera or other image stream.
pub trait VideoSource: Send {
    fn start(&mut self) -> Result<()>;
    /// Latest frame, or `None` while the stream is not ready.
    fn current_frame(&mut self) -> Option<VideoFrame<'_>>;
}

/// Hand-pose estimator. Returns at most one hand per frame.
pub trait HandDetector: Send {
    fn detect(&mut self, frame: &VideoFrame<'_>, now: f64) -> Result<Option<LandmarkSet>>;
}

/// Discrete key presses, polled without blocking.
pub trait KeySource: Send {
    fn start(&mut self) -> Result<()>;
    fn stop(&mut self) -> Result<()>;
    fn poll_key(&mut self) -> Option<KeyCommand>;
}

/// Point renderer fed from [`FrameBuffers`].
pub trait ParticleRenderer {
    fn init(&mut self, buffers: &FrameBuffers) -> Result<()>;
    /// Draws one frame. Implementations re-upload whatever
    /// [`FrameBuffers::take_dirty`] reports as changed.
    fn render_frame(
        &mut self,
        buffers: &mut FrameBuffers,
        model: Mat4,
        view_projection: Mat4,
    ) -> Result<()>;
    fn resize(&mut self, _width: u32, _height: u32) -> Result<()> {
        Ok(())
    }
}
