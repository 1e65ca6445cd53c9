use glam::{Mat4, Vec3};
use morphcloud_core::FrameBuffers;
use morphcloud_platform::{ParticleRenderer, Result};
use tracing::info;

/// Headless renderer: consumes the buffers like a GPU backend would and logs
/// a summary of the cloud every `report_every` frames.
pub struct LogRenderer {
    report_every: u64,
    frame: u64,
    uploads: u64,
}

impl LogRenderer {
    pub fn new(report_every: u64) -> Self {
        Self {
            report_every: report_every.max(1),
            frame: 0,
            uploads: 0,
        }
    }
}

impl ParticleRenderer for LogRenderer {
    fn init(&mut self, buffers: &FrameBuffers) -> Result<()> {
        let (min, max) = buffers
            .sizes()
            .iter()
            .fold((f32::MAX, f32::MIN), |(lo, hi), &s| (lo.min(s), hi.max(s)));
        info!(
            "renderer ready: {} particles, point sizes {min:.2}..{max:.2}",
            buffers.len()
        );
        Ok(())
    }

    fn render_frame(
        &mut self,
        buffers: &mut FrameBuffers,
        model: Mat4,
        view_projection: Mat4,
    ) -> Result<()> {
        let dirty = buffers.take_dirty();
        if dirty.positions || dirty.colors {
            self.uploads += 1;
        }
        self.frame += 1;
        if self.frame % self.report_every != 0 || buffers.is_empty() {
            return Ok(());
        }

        let n = buffers.len() as f32;
        let centroid = buffers.positions().iter().copied().sum::<Vec3>() / n;
        let radius = buffers
            .positions()
            .iter()
            .map(|p| p.distance(centroid))
            .fold(0.0, f32::max);
        let color = buffers.colors().iter().copied().sum::<Vec3>() / n;
        let screen = view_projection.project_point3(model.transform_point3(centroid));
        info!(
            "frame {}: centroid {centroid:.3} (ndc {:.2}, {:.2}), radius {radius:.3}, mean color {color:.2}, uploads {}",
            self.frame, screen.x, screen.y, self.uploads
        );
        Ok(())
    }
}
