//! Manual override of the control targets. Gesture updates overwrite these on
//! the next detection.

use crate::state::{ControlState, EXPANSION_MAX, EXPANSION_MIN};

const EXPANSION_STEP: f32 = 0.15;
const HUE_STEP: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyCommand {
    ExpandUp,
    ExpandDown,
    HueDown,
    HueUp,
    /// Zero-based template index.
    SelectTemplate(usize),
}

impl KeyCommand {
    /// Maps a key name to a command: arrows (`ArrowUp` or `up`), `q`/`w` for
    /// hue, and digits `1`-`9` for templates.
    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "ArrowUp" | "up" => Some(KeyCommand::ExpandUp),
            "ArrowDown" | "down" => Some(KeyCommand::ExpandDown),
            "q" => Some(KeyCommand::HueDown),
            "w" => Some(KeyCommand::HueUp),
            _ => {
                let mut chars = key.chars();
                let digit = chars.next()?.to_digit(10)?;
                if chars.next().is_some() || digit == 0 {
                    return None;
                }
                Some(KeyCommand::SelectTemplate(digit as usize - 1))
            }
        }
    }

    /// Returns false when the command had nothing to act on (unknown template).
    pub fn apply(self, state: &mut ControlState) -> bool {
        match self {
            KeyCommand::ExpandUp => {
                let value = state.target_expansion() + EXPANSION_STEP;
                state.set_target_expansion(value.min(EXPANSION_MAX));
            }
            KeyCommand::ExpandDown => {
                let value = state.target_expansion() - EXPANSION_STEP;
                state.set_target_expansion(value.max(EXPANSION_MIN));
            }
            KeyCommand::HueDown => state.set_target_hue((state.target_hue() - HUE_STEP).max(0.0)),
            KeyCommand::HueUp => state.set_target_hue((state.target_hue() + HUE_STEP).min(1.0)),
            KeyCommand::SelectTemplate(index) => {
                if index >= state.template_count() {
                    return false;
                }
                state.set_target_template(index);
            }
        }
        true
    }
}
