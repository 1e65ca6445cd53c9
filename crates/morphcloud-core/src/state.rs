use crate::config::Smoothing;

pub const EXPANSION_MIN: f32 = 0.3;
pub const EXPANSION_MAX: f32 = 2.0;
pub const REST_EXPANSION: f32 = 1.0;
pub const REST_HUE: f32 = 0.95;

/// Smoothed control parameters and the current/target template blend.
///
/// Input handlers only write the `target_*` side. [`ControlState::advance`]
/// moves the live values toward their targets once per frame.
#[derive(Debug, Clone, PartialEq)]
pub struct ControlState {
    expansion: f32,
    target_expansion: f32,
    hue: f32,
    target_hue: f32,
    template_index: usize,
    target_template_index: usize,
    blend_progress: f32,
    template_count: usize,
}

impl ControlState {
    pub fn new(template_count: usize) -> Self {
        Self {
            expansion: REST_EXPANSION,
            target_expansion: REST_EXPANSION,
            hue: REST_HUE,
            target_hue: REST_HUE,
            template_index: 0,
            target_template_index: 0,
            blend_progress: 0.0,
            template_count: template_count.max(1),
        }
    }

    pub fn expansion(&self) -> f32 {
        self.expansion
    }

    pub fn target_expansion(&self) -> f32 {
        self.target_expansion
    }

    pub fn hue(&self) -> f32 {
        self.hue
    }

    pub fn target_hue(&self) -> f32 {
        self.target_hue
    }

    pub fn template_index(&self) -> usize {
        self.template_index
    }

    pub fn target_template_index(&self) -> usize {
        self.target_template_index
    }

    pub fn blend_progress(&self) -> f32 {
        self.blend_progress
    }

    pub fn is_blending(&self) -> bool {
        self.blend_progress > 0.0
    }

    pub fn template_count(&self) -> usize {
        self.template_count
    }

    pub fn set_target_expansion(&mut self, value: f32) {
        self.target_expansion = value;
    }

    pub fn set_target_hue(&mut self, value: f32) {
        self.target_hue = value;
    }

    /// Requests a template; out-of-range selectors clamp to the last entry.
    pub fn set_target_template(&mut self, index: usize) {
        self.target_template_index = index.min(self.template_count - 1);
    }

    /// Pulls both continuous targets toward their rest values.
    pub fn decay_targets(&mut self, rate: f32) {
        self.target_expansion += (REST_EXPANSION - self.target_expansion) * rate;
        self.target_hue += (REST_HUE - self.target_hue) * rate;
    }

    /// Advances one frame. Returns the new template index when a transition
    /// completed on this frame.
    pub fn advance(&mut self, smoothing: &Smoothing) -> Option<usize> {
        self.expansion += (self.target_expansion - self.expansion) * smoothing.expansion_rate;
        self.hue += (self.target_hue - self.hue) * smoothing.hue_rate;

        if self.target_template_index == self.template_index {
            // Target moved back mid-blend; nothing left to blend toward.
            self.blend_progress = 0.0;
            return None;
        }

        self.blend_progress += smoothing.blend_step;
        if self.blend_progress >= 1.0 {
            self.blend_progress = 0.0;
            self.template_index = self.target_template_index;
            return Some(self.template_index);
        }
        None
    }
}
