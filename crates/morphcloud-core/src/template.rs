//! Procedural point-cloud templates.
//!
//! Every generator returns exactly the requested number of particles. Shapes
//! are fixed; only the jitter terms draw from the supplied RNG.

use std::f32::consts::{PI, TAU};
use std::fmt;

use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::color::hsl_to_rgb;

/// Named template shapes, in their default catalog order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TemplateKind {
    Hearts,
    Flowers,
    Saturn,
    Fireworks,
    Stars,
}

impl TemplateKind {
    pub const ALL: [TemplateKind; 5] = [
        TemplateKind::Hearts,
        TemplateKind::Flowers,
        TemplateKind::Saturn,
        TemplateKind::Fireworks,
        TemplateKind::Stars,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TemplateKind::Hearts => "Hearts",
            TemplateKind::Flowers => "Flowers",
            TemplateKind::Saturn => "Saturn",
            TemplateKind::Fireworks => "Fireworks",
            TemplateKind::Stars => "Stars",
        }
    }

    /// Builds this shape with `count` particles.
    pub fn generate<R: Rng + ?Sized>(self, count: usize, rng: &mut R) -> Template {
        match self {
            TemplateKind::Hearts => hearts(count, rng),
            TemplateKind::Flowers => flowers(count, rng),
            TemplateKind::Saturn => saturn(count, rng),
            TemplateKind::Fireworks => fireworks(count, rng),
            TemplateKind::Stars => stars(count, rng),
        }
    }
}

impl fmt::Display for TemplateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Immutable per-particle positions and colors. Index `i` is the same particle
/// in both arrays.
#[derive(Debug, Clone, PartialEq)]
pub struct Template {
    positions: Vec<Vec3>,
    colors: Vec<Vec3>,
}

impl Template {
    fn with_capacity(count: usize) -> Self {
        Self {
            positions: Vec::with_capacity(count),
            colors: Vec::with_capacity(count),
        }
    }

    fn push(&mut self, position: Vec3, color: Vec3) {
        self.positions.push(position);
        self.colors.push(color);
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

    /// Positions as `[x0, y0, z0, x1, ...]`, length `3 * len()`.
    pub fn flat_positions(&self) -> &[f32] {
        bytemuck::cast_slice(&self.positions)
    }

    /// Colors as `[r0, g0, b0, r1, ...]`, length `3 * len()`.
    pub fn flat_colors(&self) -> &[f32] {
        bytemuck::cast_slice(&self.colors)
    }
}

fn centered<R: Rng + ?Sized>(rng: &mut R, span: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * span
}

fn scatter<R: Rng + ?Sized>(rng: &mut R, extent: Vec3) -> Vec3 {
    Vec3::new(
        centered(rng, extent.x),
        centered(rng, extent.y),
        centered(rng, extent.z),
    )
}

/// Uniform direction on the unit sphere. `acos(2u - 1)` for the polar angle
/// keeps the poles from bunching up.
fn random_direction<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let theta = rng.random::<f32>() * TAU;
    let phi = (2.0 * rng.random::<f32>() - 1.0).acos();
    Vec3::new(
        phi.sin() * theta.cos(),
        phi.sin() * theta.sin(),
        phi.cos(),
    )
}

fn hearts<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Template {
    const SCALE: f32 = 0.35;
    const SHRINK: f32 = 0.08;
    const WRAPS: f32 = 4.0;

    let mut out = Template::with_capacity(count);
    for i in 0..count {
        let f = i as f32 / count as f32;
        let t = f * TAU * WRAPS;
        let x = SCALE * 16.0 * t.sin().powi(3);
        let y = SCALE
            * (13.0 * t.cos() - 5.0 * (2.0 * t).cos() - 2.0 * (3.0 * t).cos() - (4.0 * t).cos());
        let z = centered(rng, SCALE * 4.0);
        out.push(
            Vec3::new(x * SHRINK, y * SHRINK, z),
            hsl_to_rgb(0.95 + f * 0.05, 0.8, 0.7),
        );
    }
    out
}

fn flowers<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Template {
    const PETALS: usize = 8;
    const RINGS: usize = 5;
    const MIN_PER_PETAL: usize = 20;

    let per_petal = (count / RINGS / PETALS).max(MIN_PER_PETAL);
    let mut out = Template::with_capacity(count);

    'rings: for ring in 0..RINGS {
        let r0 = 0.05 + ring as f32 * 0.12;
        let color = hsl_to_rgb(0.08 + (ring as f32 / RINGS as f32) * 0.1, 0.85, 0.6);
        for petal in 0..PETALS {
            let a0 = (petal as f32 / PETALS as f32) * TAU;
            for k in 0..per_petal {
                if out.len() == count {
                    break 'rings;
                }
                let t = k as f32 / per_petal as f32;
                let a = a0 + t * (PI / PETALS as f32);
                let r = r0 * (0.7 + 0.3 * (t * PI).sin());
                let y = centered(rng, 0.05);
                out.push(Vec3::new(r * a.cos(), y, r * a.sin()), color);
            }
        }
    }

    let filler = hsl_to_rgb(0.1, 0.8, 0.65);
    while out.len() < count {
        out.push(scatter(rng, Vec3::new(0.3, 0.1, 0.3)), filler);
    }
    out
}

fn saturn<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Template {
    const RING_INNER: f32 = 0.22;
    const RING_OUTER: f32 = 0.38;
    const RING_WRAPS: f32 = 3.0;

    let body = count * 2 / 5;
    let ring = count - body;
    let mut out = Template::with_capacity(count);

    let body_color = hsl_to_rgb(0.12, 0.7, 0.75);
    for _ in 0..body {
        let dir = random_direction(rng);
        let r = 0.15 * (0.85 + rng.random::<f32>() * 0.3);
        out.push(dir * r, body_color);
    }

    let ring_color = hsl_to_rgb(0.14, 0.6, 0.8);
    for i in 0..ring {
        let a = (i as f32 / ring as f32) * TAU * RING_WRAPS;
        let r = RING_INNER + (RING_OUTER - RING_INNER) * rng.random::<f32>();
        let y = centered(rng, 0.02);
        out.push(Vec3::new(r * a.cos(), y, r * a.sin()), ring_color);
    }
    out
}

fn fireworks<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Template {
    const BURST_HUES: [f32; 5] = [0.0, 0.05, 0.55, 0.95, 0.7];

    let per_burst = count / BURST_HUES.len();
    let mut out = Template::with_capacity(count);

    for hue in BURST_HUES {
        let origin = scatter(rng, Vec3::new(0.4, 0.2, 0.4));
        for _ in 0..per_burst {
            let speed = 0.08 + rng.random::<f32>() * 0.15;
            let position = origin + random_direction(rng) * speed;
            out.push(position, hsl_to_rgb(hue, 0.9, 0.5 + rng.random::<f32>() * 0.4));
        }
    }

    let spark = Vec3::new(1.0, 0.9, 0.3);
    while out.len() < count {
        out.push(scatter(rng, Vec3::splat(0.5)), spark);
    }
    out
}

fn stars<R: Rng + ?Sized>(count: usize, rng: &mut R) -> Template {
    let mut out = Template::with_capacity(count);
    for _ in 0..count {
        let position = scatter(rng, Vec3::splat(1.2));
        let base = if rng.random_bool(0.5) { 0.1 } else { 0.55 };
        let h = base + rng.random::<f32>() * 0.05;
        let l = 0.85 + rng.random::<f32>() * 0.15;
        out.push(position, hsl_to_rgb(h, 0.3, l));
    }
    out
}
