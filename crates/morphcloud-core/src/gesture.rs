//! Hand landmarks and the mapping from hand pose to control targets.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::detection::DetectionResult;
use crate::state::ControlState;

// ============================================================================
// HAND LANDMARK INDICES
// ============================================================================

pub const WRIST: usize = 0;
pub const THUMB_CMC: usize = 1;
pub const THUMB_MCP: usize = 2;
pub const THUMB_IP: usize = 3;
pub const THUMB_TIP: usize = 4;
pub const INDEX_MCP: usize = 5;
pub const INDEX_PIP: usize = 6;
pub const INDEX_DIP: usize = 7;
pub const INDEX_TIP: usize = 8;
pub const MIDDLE_MCP: usize = 9;
pub const MIDDLE_PIP: usize = 10;
pub const MIDDLE_DIP: usize = 11;
pub const MIDDLE_TIP: usize = 12;
pub const RING_MCP: usize = 13;
pub const RING_PIP: usize = 14;
pub const RING_DIP: usize = 15;
pub const RING_TIP: usize = 16;
pub const PINKY_MCP: usize = 17;
pub const PINKY_PIP: usize = 18;
pub const PINKY_DIP: usize = 19;
pub const PINKY_TIP: usize = 20;

/// (tip, second joint) per finger, thumb first. The thumb has no PIP, so its
/// IP joint stands in.
const FINGER_JOINTS: [(usize, usize); 5] = [
    (THUMB_TIP, THUMB_IP),
    (INDEX_TIP, INDEX_PIP),
    (MIDDLE_TIP, MIDDLE_PIP),
    (RING_TIP, RING_PIP),
    (PINKY_TIP, PINKY_PIP),
];

const MAX_SPREAD: f32 = 2.0;

// ============================================================================
// DATA STRUCTURES
// ============================================================================

/// One landmark in normalized image coordinates; smaller `y` is higher up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f32,
    pub y: f32,
    #[serde(default)]
    pub z: f32,
}

impl Landmark {
    pub fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    fn xy(&self) -> Vec2 {
        Vec2::new(self.x, self.y)
    }

    pub fn distance_2d(&self, other: &Landmark) -> f32 {
        self.xy().distance(other.xy())
    }
}

/// A single detected hand: exactly 21 landmarks in MediaPipe order.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LandmarkSet {
    points: [Landmark; LandmarkSet::LEN],
}

impl LandmarkSet {
    pub const LEN: usize = 21;

    pub fn new(points: [Landmark; Self::LEN]) -> Self {
        Self { points }
    }

    /// Returns `None` unless `points` holds exactly 21 landmarks.
    pub fn from_slice(points: &[Landmark]) -> Option<Self> {
        let points: [Landmark; Self::LEN] = points.try_into().ok()?;
        Some(Self { points })
    }

    pub fn point(&self, index: usize) -> &Landmark {
        &self.points[index]
    }

    pub fn points(&self) -> &[Landmark; Self::LEN] {
        &self.points
    }

    /// Fingers whose tip sits above its second joint, in `[0, 5]`.
    pub fn extended_fingers(&self) -> usize {
        FINGER_JOINTS
            .iter()
            .filter(|(tip, pip)| self.points[*tip].y < self.points[*pip].y)
            .count()
    }

    /// Rough openness of the palm, capped at 2.
    pub fn palm_spread(&self) -> f32 {
        let length = self.points[WRIST].distance_2d(&self.points[MIDDLE_MCP]);
        let width = self.points[INDEX_MCP].distance_2d(&self.points[RING_MCP]);
        ((length + width * 2.0) * 2.0).min(MAX_SPREAD)
    }

    /// Mean image height of the wrist and the index/middle knuckles.
    pub fn palm_height(&self) -> f32 {
        (self.points[WRIST].y + self.points[INDEX_MCP].y + self.points[MIDDLE_MCP].y) / 3.0
    }
}

/// Control targets derived from one landmark set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureTargets {
    pub template: usize,
    pub expansion: f32,
    pub hue: f32,
}

impl GestureTargets {
    pub fn from_landmarks(set: &LandmarkSet) -> Self {
        Self {
            template: set.extended_fingers(),
            expansion: 0.3 + set.palm_spread() * 0.5,
            hue: set.palm_height(),
        }
    }
}

// ============================================================================
// MAPPER
// ============================================================================

/// Writes detection outcomes into the target side of a [`ControlState`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureMapper {
    decay_rate: f32,
}

impl GestureMapper {
    pub fn new(decay_rate: f32) -> Self {
        Self { decay_rate }
    }

    pub fn on_landmarks(&self, state: &mut ControlState, set: &LandmarkSet) -> GestureTargets {
        let targets = GestureTargets::from_landmarks(set);
        state.set_target_template(targets.template);
        state.set_target_expansion(targets.expansion);
        state.set_target_hue(targets.hue);
        targets
    }

    pub fn on_no_detection(&self, state: &mut ControlState) {
        state.decay_targets(self.decay_rate);
    }

    /// Faults fall through to the same decay as an empty frame.
    pub fn apply(&self, state: &mut ControlState, result: &DetectionResult) {
        match result {
            DetectionResult::Landmarks(set) => {
                self.on_landmarks(state, set);
            }
            DetectionResult::NoHand | DetectionResult::Fault(_) => self.on_no_detection(state),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::detection::DetectionFault;

    /// Upright hand with the wrist at the bottom; `extended[i]` raises finger
    /// `i` (thumb first) above its second joint.
    pub(crate) fn hand(extended: [bool; 5]) -> LandmarkSet {
        let mut points = [Landmark::default(); LandmarkSet::LEN];
        points[WRIST] = Landmark::new(0.5, 0.8, 0.0);

        points[THUMB_CMC] = Landmark::new(0.40, 0.75, 0.0);
        points[THUMB_MCP] = Landmark::new(0.35, 0.68, 0.0);
        points[THUMB_IP] = Landmark::new(0.32, 0.62, 0.0);
        let thumb_tip_y = if extended[0] { 0.55 } else { 0.66 };
        points[THUMB_TIP] = Landmark::new(0.30, thumb_tip_y, 0.0);

        let fingers = [
            (INDEX_MCP, 0.42),
            (MIDDLE_MCP, 0.48),
            (RING_MCP, 0.54),
            (PINKY_MCP, 0.60),
        ];
        for (i, (mcp, x)) in fingers.into_iter().enumerate() {
            points[mcp] = Landmark::new(x, 0.6, 0.0);
            points[mcp + 1] = Landmark::new(x, 0.5, 0.0);
            if extended[i + 1] {
                points[mcp + 2] = Landmark::new(x, 0.44, 0.0);
                points[mcp + 3] = Landmark::new(x, 0.38, 0.0);
            } else {
                points[mcp + 2] = Landmark::new(x, 0.55, 0.0);
                points[mcp + 3] = Landmark::new(x, 0.58, 0.0);
            }
        }
        LandmarkSet::new(points)
    }

    #[test]
    fn closed_fist_counts_zero() {
        let fist = hand([false; 5]);
        assert_eq!(fist.extended_fingers(), 0);

        let mut state = ControlState::new(5);
        state.set_target_template(3);
        let targets = GestureMapper::new(0.02).on_landmarks(&mut state, &fist);
        assert_eq!(targets.template, 0);
        assert_eq!(state.target_template_index(), 0);
    }

    #[test]
    fn counts_each_raised_finger() {
        assert_eq!(hand([true; 5]).extended_fingers(), 5);
        assert_eq!(hand([false, true, true, false, false]).extended_fingers(), 2);
        assert_eq!(hand([true, false, false, false, true]).extended_fingers(), 2);
    }

    #[test]
    fn open_hand_clamps_to_last_template() {
        let mut state = ControlState::new(5);
        GestureMapper::new(0.02).on_landmarks(&mut state, &hand([true; 5]));
        assert_eq!(state.target_template_index(), 4);
    }

    #[test]
    fn spread_and_height_feed_expansion_and_hue() {
        let set = hand([true; 5]);
        // wrist->middle MCP: (0.02, 0.2); index->ring MCP: 0.12 wide.
        let length = (0.02f32 * 0.02 + 0.2 * 0.2).sqrt();
        let spread = (length + 0.12 * 2.0) * 2.0;
        assert!((set.palm_spread() - spread).abs() < 1e-5);

        let targets = GestureTargets::from_landmarks(&set);
        assert!((targets.expansion - (0.3 + spread * 0.5)).abs() < 1e-5);
        assert!((targets.hue - (0.8 + 0.6 + 0.6) / 3.0).abs() < 1e-6);
    }

    #[test]
    fn spread_is_capped() {
        let mut points = *hand([true; 5]).points();
        points[MIDDLE_MCP] = Landmark::new(0.5, 0.0, 0.0);
        points[INDEX_MCP] = Landmark::new(0.0, 0.5, 0.0);
        points[RING_MCP] = Landmark::new(1.0, 0.5, 0.0);
        assert_eq!(LandmarkSet::new(points).palm_spread(), 2.0);
    }

    #[test]
    fn from_slice_requires_21_points() {
        let points = [Landmark::default(); 21];
        assert!(LandmarkSet::from_slice(&points).is_some());
        assert!(LandmarkSet::from_slice(&points[..20]).is_none());
    }

    #[test]
    fn fault_decays_like_no_hand() {
        let mapper = GestureMapper::new(0.02);
        let mut faulted = ControlState::new(5);
        let mut empty = ControlState::new(5);
        for state in [&mut faulted, &mut empty] {
            state.set_target_expansion(1.8);
            state.set_target_hue(0.2);
        }
        mapper.apply(&mut faulted, &DetectionResult::Fault(DetectionFault::new("boom")));
        mapper.apply(&mut empty, &DetectionResult::NoHand);
        assert_eq!(faulted, empty);
        assert!(faulted.target_expansion() < 1.8);
    }

    #[test]
    fn landmark_set_parses_as_plain_list() {
        #[derive(Deserialize)]
        struct Doc {
            hand: LandmarkSet,
        }
        let rows: Vec<String> = hand([false; 5])
            .points()
            .iter()
            .map(|p| format!("{{ x = {}, y = {} }}", p.x, p.y))
            .collect();
        let doc: Doc = toml::from_str(&format!("hand = [{}]", rows.join(", "))).unwrap();
        assert_eq!(doc.hand, hand([false; 5]));

        let short: Result<Doc, _> = toml::from_str("hand = [{ x = 0.1, y = 0.2 }]");
        assert!(short.is_err());
    }
}
