//! Recorded landmark streams standing in for a camera and hand tracker.

use std::path::Path;
use std::time::Instant;

use morphcloud_core::LandmarkSet;
use morphcloud_platform::{AcquisitionError, HandDetector, TrackingInput, VideoFrame, VideoSource};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplayEntry {
    Hand(LandmarkSet),
    Empty,
    Fault(String),
}

/// JSON recording: `{"frame_rate": 30, "frames": [{"hand": [...]}, "empty", {"fault": "..."}]}`.
#[derive(Debug, Clone, Deserialize)]
pub struct Recording {
    #[serde(default = "default_frame_rate")]
    pub frame_rate: f64,
    pub frames: Vec<ReplayEntry>,
}

fn default_frame_rate() -> f64 {
    30.0
}

impl Recording {
    pub fn from_json(text: &str) -> Result<Self, AcquisitionError> {
        let recording: Self = serde_json::from_str(text)
            .map_err(|e| AcquisitionError::ModelLoad(format!("bad recording: {e}")))?;
        if recording.frames.is_empty() {
            return Err(AcquisitionError::ModelLoad("recording has no frames".into()));
        }
        if !(recording.frame_rate > 0.0) {
            return Err(AcquisitionError::ModelLoad(format!(
                "frame rate must be positive, got {}",
                recording.frame_rate
            )));
        }
        Ok(recording)
    }

    pub fn load(path: &Path) -> Result<Self, AcquisitionError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| AcquisitionError::ModelLoad(format!("{}: {e}", path.display())))?;
        let recording = Self::from_json(&text)?;
        info!(
            "replaying {} landmark frames at {} fps from {}",
            recording.frames.len(),
            recording.frame_rate,
            path.display()
        );
        Ok(recording)
    }

    pub fn into_tracking(self) -> TrackingInput {
        TrackingInput {
            source: Box::new(ReplayCamera::new(self.frame_rate)),
            detector: Box::new(ReplayDetector::new(self.frames)),
        }
    }
}

/// Acquires the replay tracker, or explains why there is none.
pub fn acquire(path: Option<&Path>) -> Result<TrackingInput, AcquisitionError> {
    let Some(path) = path else {
        return Err(AcquisitionError::DeviceUnavailable(
            "no landmark recording given (--replay)".into(),
        ));
    };
    Ok(Recording::load(path)?.into_tracking())
}

/// Emits wall-clock timestamps quantized to the recording frame rate, so
/// several render frames can share one source frame.
pub struct ReplayCamera {
    frame_rate: f64,
    started: Option<Instant>,
    pixels: Vec<u8>,
}

impl ReplayCamera {
    pub fn new(frame_rate: f64) -> Self {
        Self {
            frame_rate,
            started: None,
            pixels: Vec::new(),
        }
    }
}

impl VideoSource for ReplayCamera {
    fn start(&mut self) -> morphcloud_platform::Result<()> {
        self.started = Some(Instant::now());
        Ok(())
    }

    fn current_frame(&mut self) -> Option<VideoFrame<'_>> {
        let started = self.started?;
        let index = (started.elapsed().as_secs_f64() * self.frame_rate).floor();
        Some(VideoFrame {
            timestamp: index / self.frame_rate,
            width: 0,
            height: 0,
            pixels: &self.pixels,
        })
    }
}

/// Returns the next recorded entry on every call, looping at the end.
pub struct ReplayDetector {
    frames: Vec<ReplayEntry>,
    cursor: usize,
}

impl ReplayDetector {
    pub fn new(frames: Vec<ReplayEntry>) -> Self {
        Self { frames, cursor: 0 }
    }
}

impl HandDetector for ReplayDetector {
    fn detect(
        &mut self,
        _frame: &VideoFrame<'_>,
        _now: f64,
    ) -> morphcloud_platform::Result<Option<LandmarkSet>> {
        if self.frames.is_empty() {
            return Ok(None);
        }
        let entry = &self.frames[self.cursor % self.frames.len()];
        self.cursor += 1;
        match entry {
            ReplayEntry::Hand(set) => Ok(Some(*set)),
            ReplayEntry::Empty => Ok(None),
            ReplayEntry::Fault(message) => Err(message.clone().into()),
        }
    }
}
