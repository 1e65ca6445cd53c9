use std::time::Duration;

use glam::Mat4;
use morphcloud_core::{
    AnimationEngine, DetectionFault, DetectionResult, FrameBuffers, GestureMapper, KeyCommand,
    TemplateKind,
};
use tracing::{debug, info, warn};

use crate::{AcquisitionError, HandDetector, KeySource, ParticleRenderer, Result, VideoSource};

pub const KEYBOARD_HINT: &str = "use keys 1-5, Up/Down, Q/W if no camera";
const TRACKING_READY: &str = "Show your hand to control particles";

/// A started video source paired with the detector that reads it.
pub struct TrackingInput {
    pub source: Box<dyn VideoSource>,
    pub detector: Box<dyn HandDetector>,
}

/// What happened during one [`FrameDriver::frame`] call.
#[derive(Debug, Clone, PartialEq)]
pub struct FrameReport {
    /// `None` when no detection ran (no tracking, stream not ready, or the
    /// frame timestamp was already processed).
    pub detection: Option<DetectionResult>,
    pub snapped: Option<TemplateKind>,
}

/// Single-threaded frame loop body: at most one detection per new video
/// frame, then one engine tick and one draw.
pub struct FrameDriver {
    engine: AnimationEngine,
    mapper: GestureMapper,
    buffers: FrameBuffers,
    tracking: Option<TrackingInput>,
    last_timestamp: Option<f64>,
    view_projection: Mat4,
    status: String,
}

impl FrameDriver {
    /// Seeds `buffers` with the first template so the opening frame is not blank.
    pub fn new(
        engine: AnimationEngine,
        mut buffers: FrameBuffers,
        mapper: GestureMapper,
        view_projection: Mat4,
    ) -> Self {
        buffers.fill_from(&engine.catalog()[0]);
        Self {
            engine,
            mapper,
            buffers,
            tracking: None,
            last_timestamp: None,
            view_projection,
            status: format!("Waiting for hand tracking ({KEYBOARD_HINT})"),
        }
    }

    /// Installs hand tracking, or records why it is unavailable. Either way
    /// the keyboard keeps working.
    pub fn attach_tracking(
        &mut self,
        acquired: std::result::Result<TrackingInput, AcquisitionError>,
    ) -> bool {
        let mut input = match acquired {
            Ok(input) => input,
            Err(e) => {
                warn!("hand tracking unavailable: {e}");
                self.set_status(format!("Camera/hand error: {e}"));
                return false;
            }
        };
        if let Err(e) = input.source.start() {
            warn!("video source failed to start: {e}");
            self.set_status(format!("Camera/hand error: {e}"));
            return false;
        }
        self.tracking = Some(input);
        self.last_timestamp = None;
        self.set_status(TRACKING_READY.to_string());
        true
    }

    pub fn is_tracking(&self) -> bool {
        self.tracking.is_some()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    fn set_status(&mut self, status: String) {
        info!("status: {status}");
        self.status = status;
    }

    pub fn engine(&self) -> &AnimationEngine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut AnimationEngine {
        &mut self.engine
    }

    pub fn buffers(&self) -> &FrameBuffers {
        &self.buffers
    }

    pub fn set_view_projection(&mut self, view_projection: Mat4) {
        self.view_projection = view_projection;
    }

    pub fn init_renderer<R: ParticleRenderer + ?Sized>(&self, renderer: &mut R) -> Result<()> {
        renderer.init(&self.buffers)
    }

    pub fn handle_key(&mut self, command: KeyCommand) -> bool {
        let applied = command.apply(self.engine.state_mut());
        if !applied {
            debug!("ignored key command {command:?}");
        }
        applied
    }

    /// Applies every pending key press. Returns how many were read.
    pub fn drain_keys<K: KeySource + ?Sized>(&mut self, keys: &mut K) -> usize {
        let mut count = 0;
        while let Some(command) = keys.poll_key() {
            self.handle_key(command);
            count += 1;
        }
        count
    }

    /// Runs the detector if the video source has a frame that was not
    /// processed yet, and feeds the outcome to the gesture mapper.
    pub fn poll_detection(&mut self, now: f64) -> Option<DetectionResult> {
        let tracking = self.tracking.as_mut()?;
        let frame = tracking.source.current_frame()?;
        if self.last_timestamp == Some(frame.timestamp) {
            return None;
        }
        self.last_timestamp = Some(frame.timestamp);

        let result = match tracking.detector.detect(&frame, now) {
            Ok(found) => DetectionResult::from(found),
            Err(e) => {
                debug!("detector fault at t={:.3}: {e}", frame.timestamp);
                DetectionResult::Fault(DetectionFault::new(e.to_string()))
            }
        };
        self.mapper.apply(self.engine.state_mut(), &result);
        Some(result)
    }

    /// One full frame: detection, engine tick, draw.
    pub fn frame<R: ParticleRenderer + ?Sized>(
        &mut self,
        elapsed: Duration,
        renderer: &mut R,
    ) -> Result<FrameReport> {
        let detection = self.poll_detection(elapsed.as_secs_f64());
        let snapped = self.engine.tick(&mut self.buffers);
        if let Some(kind) = snapped {
            info!("template: {kind}");
        }
        let model = self.engine.rotation(elapsed);
        renderer.render_frame(&mut self.buffers, model, self.view_projection)?;
        Ok(FrameReport { detection, snapped })
    }
}
