//! Per-frame animation: smoothing, template blending and buffer fill.

use std::time::Duration;

use glam::{Mat4, Vec3};
use rand::Rng;
use tracing::debug;

use crate::catalog::TemplateCatalog;
use crate::color::hsl_to_rgb;
use crate::config::{EngineConfig, HueOverlay, Smoothing};
use crate::state::ControlState;
use crate::template::{Template, TemplateKind};

/// Which buffers changed since the renderer last looked.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirtyFlags {
    pub positions: bool,
    pub colors: bool,
}

/// Output buffers owned by the caller and overwritten in place every frame.
#[derive(Debug, Clone)]
pub struct FrameBuffers {
    positions: Vec<Vec3>,
    colors: Vec<Vec3>,
    sizes: Vec<f32>,
    dirty: DirtyFlags,
}

impl FrameBuffers {
    /// Allocates buffers for `count` particles with per-particle sizes drawn
    /// from `[0.8, 1.2)`. Sizes never change afterwards.
    pub fn new<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Self {
        Self {
            positions: vec![Vec3::ZERO; count],
            colors: vec![Vec3::ZERO; count],
            sizes: (0..count).map(|_| 0.8 + rng.random::<f32>() * 0.4).collect(),
            dirty: DirtyFlags::default(),
        }
    }

    /// Copies a template verbatim, used to seed the first frame.
    pub fn fill_from(&mut self, template: &Template) {
        let n = self.len().min(template.len());
        self.positions[..n].copy_from_slice(&template.positions()[..n]);
        self.colors[..n].copy_from_slice(&template.colors()[..n]);
        self.mark_dirty();
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn colors(&self) -> &[Vec3] {
        &self.colors
    }

    pub fn sizes(&self) -> &[f32] {
        &self.sizes
    }

    pub fn flat_positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    pub fn flat_colors(&self) -> &[f32] {
        bytemuck::cast_slice(&self.colors)
    }

    pub fn dirty(&self) -> DirtyFlags {
        self.dirty
    }

    /// Returns the pending flags and clears them.
    pub fn take_dirty(&mut self) -> DirtyFlags {
        std::mem::take(&mut self.dirty)
    }

    fn mark_dirty(&mut self) {
        self.dirty = DirtyFlags {
            positions: true,
            colors: true,
        };
    }
}

/// Owns the catalog and control state and turns them into frame buffers.
#[derive(Debug, Clone)]
pub struct AnimationEngine {
    catalog: TemplateCatalog,
    state: ControlState,
    smoothing: Smoothing,
    overlay: HueOverlay,
    rotation_speed: f32,
}

impl AnimationEngine {
    pub fn new(catalog: TemplateCatalog, config: &EngineConfig) -> Self {
        let state = ControlState::new(catalog.len());
        Self {
            catalog,
            state,
            smoothing: config.smoothing,
            overlay: config.overlay,
            rotation_speed: config.rotation_speed,
        }
    }

    pub fn catalog(&self) -> &TemplateCatalog {
        &self.catalog
    }

    pub fn state(&self) -> &ControlState {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ControlState {
        &mut self.state
    }

    pub fn current_kind(&self) -> Option<TemplateKind> {
        self.catalog.kind(self.state.template_index())
    }

    /// Advances the control state one frame and rewrites `buffers`. Returns the
    /// template a transition finished on, if any.
    pub fn tick(&mut self, buffers: &mut FrameBuffers) -> Option<TemplateKind> {
        let snapped = self
            .state
            .advance(&self.smoothing)
            .and_then(|index| self.catalog.kind(index));
        if let Some(kind) = snapped {
            debug!("template transition finished on {kind}");
        }
        self.write_frame(buffers);
        snapped
    }

    /// Fills `buffers` from the current state without advancing it.
    pub fn write_frame(&self, buffers: &mut FrameBuffers) {
        let state = &self.state;
        let current = &self.catalog[state.template_index()];
        let t = state.blend_progress();
        let blending = t > 0.0;
        let next = if blending {
            &self.catalog[state.target_template_index()]
        } else {
            current
        };

        let expansion = state.expansion();
        let hue = state.hue() + (state.hue() - 0.5) * self.overlay.shift_gain;
        let overlay = self.overlay;
        let modulus = overlay.offset_modulus.max(1);

        let n = buffers.len().min(current.len());
        debug_assert_eq!(buffers.len(), current.len());
        let (positions, colors) = (&mut buffers.positions[..n], &mut buffers.colors[..n]);
        let (from_pos, to_pos) = (current.positions(), next.positions());
        let (from_col, to_col) = (current.colors(), next.colors());

        for i in 0..n {
            let (mut position, mut base) = (from_pos[i], from_col[i]);
            if blending {
                position = position.lerp(to_pos[i], t);
                base = base.lerp(to_col[i], t);
            }
            positions[i] = position * expansion;

            let h = (hue + (i % modulus) as f32 * overlay.offset_step).rem_euclid(1.0);
            let shifted = hsl_to_rgb(h, overlay.saturation, overlay.lightness);
            colors[i] = base * (1.0 - overlay.weight) + shifted * overlay.weight;
        }
        buffers.mark_dirty();
    }

    /// Rigid Y rotation for the whole cloud, applied by the renderer.
    pub fn rotation(&self, elapsed: Duration) -> Mat4 {
        Mat4::from_rotation_y(elapsed.as_secs_f32() * self.rotation_speed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gesture::tests::hand;
    use crate::gesture::GestureMapper;
    use rand::SeedableRng;
    use rand_pcg::Pcg64;

    const COUNT: usize = 257;

    fn engine() -> (AnimationEngine, FrameBuffers) {
        let mut rng = Pcg64::seed_from_u64(11);
        let config = EngineConfig {
            particle_count: COUNT,
            ..EngineConfig::default()
        };
        let catalog = TemplateCatalog::generate(&config.templates, COUNT, &mut rng).unwrap();
        let buffers = FrameBuffers::new(COUNT, &mut rng);
        (AnimationEngine::new(catalog, &config), buffers)
    }

    #[test]
    fn sizes_are_fixed_at_startup() {
        let (mut engine, mut buffers) = engine();
        assert!(buffers.sizes().iter().all(|s| (0.8..1.2).contains(s)));
        let before = buffers.sizes().to_vec();
        engine.tick(&mut buffers);
        assert_eq!(buffers.sizes(), &before[..]);
    }

    #[test]
    fn unblended_frame_is_scaled_template() {
        let (mut engine, mut buffers) = engine();
        engine.state_mut().set_target_expansion(1.7);
        for _ in 0..10 {
            engine.tick(&mut buffers);
        }
        let expansion = engine.state().expansion();
        assert!(!engine.state().is_blending());
        for (out, raw) in buffers.positions().iter().zip(engine.catalog()[0].positions()) {
            assert_eq!(*out, *raw * expansion);
        }
    }

    #[test]
    fn blend_midway_interpolates() {
        let (mut engine, mut buffers) = engine();
        engine.state_mut().set_target_template(2);
        for _ in 0..8 {
            engine.tick(&mut buffers);
        }
        let t = engine.state().blend_progress();
        assert!(t > 0.0 && t < 1.0);
        let from = engine.catalog()[0].positions()[5];
        let to = engine.catalog()[2].positions()[5];
        let expected = from.lerp(to, t) * engine.state().expansion();
        assert!((buffers.positions()[5] - expected).length() < 1e-6);
    }

    #[test]
    fn completed_transition_leaves_no_residual_blend() {
        let (mut engine, mut buffers) = engine();
        engine.state_mut().set_target_template(4);
        let mut snapped = None;
        for _ in 0..40 {
            snapped = snapped.or(engine.tick(&mut buffers));
        }
        assert_eq!(snapped, Some(TemplateKind::Stars));
        assert_eq!(engine.current_kind(), Some(TemplateKind::Stars));
        let expansion = engine.state().expansion();
        for (out, raw) in buffers.positions().iter().zip(engine.catalog()[4].positions()) {
            assert_eq!(*out, *raw * expansion);
        }
    }

    #[test]
    fn colors_mix_template_with_overlay() {
        let (mut engine, mut buffers) = engine();
        engine.tick(&mut buffers);
        let state = engine.state();
        let hue = state.hue() + (state.hue() - 0.5) * 0.3;
        let i = 130;
        let overlay = hsl_to_rgb((hue + 30.0 * 0.0001).rem_euclid(1.0), 0.7, 0.7);
        let expected = engine.catalog()[0].colors()[i] * 0.6 + overlay * 0.4;
        assert!((buffers.colors()[i] - expected).length() < 1e-5);
        assert!(buffers.flat_colors().iter().all(|c| (0.0..=1.0).contains(c)));
    }

    #[test]
    fn dirty_flags_set_every_frame() {
        let (mut engine, mut buffers) = engine();
        engine.tick(&mut buffers);
        assert_eq!(buffers.take_dirty(), DirtyFlags { positions: true, colors: true });
        assert_eq!(buffers.dirty(), DirtyFlags::default());
        engine.tick(&mut buffers);
        assert!(buffers.dirty().positions && buffers.dirty().colors);
    }

    #[test]
    fn gesture_drives_template_change() {
        let (mut engine, mut buffers) = engine();
        let mapper = GestureMapper::new(0.02);
        let three = hand([false, true, true, true, false]);
        for _ in 0..30 {
            mapper.on_landmarks(engine.state_mut(), &three);
            engine.tick(&mut buffers);
        }
        assert_eq!(engine.current_kind(), Some(TemplateKind::Fireworks));
    }

    #[test]
    fn rotation_is_slow_about_y() {
        let (engine, _) = engine();
        let m = engine.rotation(Duration::from_secs(10));
        let expected = Mat4::from_rotation_y(1.5);
        assert!(m.abs_diff_eq(expected, 1e-6));
        assert_eq!(m.transform_point3(Vec3::Y), Vec3::Y);
    }

    #[test]
    fn seeding_copies_template() {
        let (engine, mut buffers) = engine();
        buffers.fill_from(&engine.catalog()[1]);
        assert_eq!(buffers.positions(), engine.catalog()[1].positions());
        assert!(buffers.dirty().positions);
    }
}
