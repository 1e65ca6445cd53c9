//! HSL to RGB conversion shared by the template generators and the live hue overlay.

use glam::Vec3;

/// Converts hue/saturation/lightness into an RGB triple.
///
/// `h` wraps around, so any finite hue is accepted. `s` and `l` are used as
/// given; callers keep them in `[0, 1]`.
pub fn hsl_to_rgb(h: f32, s: f32, l: f32) -> Vec3 {
    if s == 0.0 {
        return Vec3::splat(l);
    }
    let q = if l < 0.5 { l * (1.0 + s) } else { l + s - l * s };
    let p = 2.0 * l - q;
    Vec3::new(
        hue_to_channel(p, q, h + 1.0 / 3.0),
        hue_to_channel(p, q, h),
        hue_to_channel(p, q, h - 1.0 / 3.0),
    )
}

fn hue_to_channel(p: f32, q: f32, t: f32) -> f32 {
    let t = t.rem_euclid(1.0);
    if t < 1.0 / 6.0 {
        p + (q - p) * 6.0 * t
    } else if t < 0.5 {
        q
    } else if t < 2.0 / 3.0 {
        p + (q - p) * (2.0 / 3.0 - t) * 6.0
    } else {
        p
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Vec3, b: Vec3) -> bool {
        (a - b).abs().max_element() < 1e-5
    }

    #[test]
    fn zero_saturation_is_grey() {
        for h in [0.0, 0.3, 0.77, 1.0] {
            assert_eq!(hsl_to_rgb(h, 0.0, 0.42), Vec3::splat(0.42));
        }
    }

    #[test]
    fn primaries() {
        assert!(close(hsl_to_rgb(0.0, 1.0, 0.5), Vec3::new(1.0, 0.0, 0.0)));
        assert!(close(hsl_to_rgb(1.0 / 3.0, 1.0, 0.5), Vec3::new(0.0, 1.0, 0.0)));
        assert!(close(hsl_to_rgb(2.0 / 3.0, 1.0, 0.5), Vec3::new(0.0, 0.0, 1.0)));
    }

    #[test]
    fn channels_stay_in_unit_range() {
        let steps = 24;
        for hi in 0..=steps {
            for si in 0..=steps {
                for li in 0..=steps {
                    let rgb = hsl_to_rgb(
                        hi as f32 / steps as f32,
                        si as f32 / steps as f32,
                        li as f32 / steps as f32,
                    );
                    assert!(rgb.min_element() >= -1e-6, "{rgb:?}");
                    assert!(rgb.max_element() <= 1.0 + 1e-6, "{rgb:?}");
                }
            }
        }
    }

    #[test]
    fn hue_wraps() {
        assert!(close(hsl_to_rgb(0.2, 0.7, 0.6), hsl_to_rgb(1.2, 0.7, 0.6)));
        assert!(close(hsl_to_rgb(-0.1, 0.7, 0.6), hsl_to_rgb(0.9, 0.7, 0.6)));
    }
}
