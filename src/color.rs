//! Color math for the filter stack
//!
//! This module implements the per-pixel part of each stackable filter,
//! following the Filter Effects definitions browsers use for the CSS
//! `filter` property:
//! - Matrix filters (saturate, grayscale, sepia) as 3x3 color matrices
//! - Component transfers (invert, brightness, contrast) as per-channel lines
//! - Opacity as an alpha multiplier
//!
//! All functions work on normalized channels (0.0 to 1.0) and clamp their
//! output, so a chain of them stays in range.

use cgmath::{Matrix3, Vector3};

/// Rec. 709 luma weights used by the saturate and grayscale matrices
const LUMA: [f32; 3] = [0.2126, 0.7152, 0.0722];

/// Sepia tone matrix at full strength (row-major)
const SEPIA: [[f32; 3]; 3] = [
    [0.393, 0.769, 0.189],
    [0.349, 0.686, 0.168],
    [0.272, 0.534, 0.131],
];

/// Normalized RGBA color
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rgba {
    pub rgb: Vector3<f32>,
    pub alpha: f32,
}

impl Rgba {
    /// Convert 8-bit channels to normalized floats
    pub fn from_bytes([r, g, b, a]: [u8; 4]) -> Self {
        Self {
            rgb: Vector3::new(r as f32, g as f32, b as f32) / 255.0,
            alpha: a as f32 / 255.0,
        }
    }

    /// Convert back to 8-bit channels, rounding and saturating
    pub fn to_bytes(self) -> [u8; 4] {
        [
            to_byte(self.rgb.x),
            to_byte(self.rgb.y),
            to_byte(self.rgb.z),
            to_byte(self.alpha),
        ]
    }
}

/// A single color operation of the filter stack
///
/// Blur is not listed here: it needs neighboring pixels and lives in the
/// bake pipeline instead.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ColorOp {
    /// 3x3 matrix applied to RGB
    Matrix(Matrix3<f32>),
    /// `c * slope + intercept` on each RGB channel
    Linear { slope: f32, intercept: f32 },
    /// Multiply alpha
    Alpha(f32),
}

impl ColorOp {
    /// Invert at the given strength (0.0 to 1.0, capped)
    pub fn invert(amount: f32) -> Self {
        let amount = amount.clamp(0.0, 1.0);
        ColorOp::Linear {
            slope: 1.0 - 2.0 * amount,
            intercept: amount,
        }
    }

    /// Opacity (0.0 to 1.0, capped)
    pub fn opacity(amount: f32) -> Self {
        ColorOp::Alpha(amount.clamp(0.0, 1.0))
    }

    /// Saturation (1.0 = unchanged, not capped)
    pub fn saturate(amount: f32) -> Self {
        let s = amount.max(0.0);
        let [lr, lg, lb] = LUMA;
        ColorOp::Matrix(from_rows([
            [lr + (1.0 - lr) * s, lg - lg * s, lb - lb * s],
            [lr - lr * s, lg + (1.0 - lg) * s, lb - lb * s],
            [lr - lr * s, lg - lg * s, lb + (1.0 - lb) * s],
        ]))
    }

    /// Brightness (1.0 = unchanged, not capped)
    pub fn brightness(amount: f32) -> Self {
        ColorOp::Linear {
            slope: amount.max(0.0),
            intercept: 0.0,
        }
    }

    /// Contrast around mid-gray (1.0 = unchanged, not capped)
    pub fn contrast(amount: f32) -> Self {
        let amount = amount.max(0.0);
        ColorOp::Linear {
            slope: amount,
            intercept: 0.5 - 0.5 * amount,
        }
    }

    /// Grayscale mix (0.0 to 1.0, capped)
    pub fn grayscale(amount: f32) -> Self {
        // Full grayscale is saturate(0); partial amounts interpolate
        ColorOp::saturate(1.0 - amount.clamp(0.0, 1.0))
    }

    /// Sepia mix (0.0 to 1.0, capped)
    pub fn sepia(amount: f32) -> Self {
        let keep = 1.0 - amount.clamp(0.0, 1.0);
        let mut rows = SEPIA;
        for (i, row) in rows.iter_mut().enumerate() {
            for (j, value) in row.iter_mut().enumerate() {
                let identity = if i == j { 1.0 } else { 0.0 };
                *value += (identity - *value) * keep;
            }
        }
        ColorOp::Matrix(from_rows(rows))
    }

    /// Apply this operation to one color, clamping the result
    pub fn apply(&self, color: Rgba) -> Rgba {
        match *self {
            ColorOp::Matrix(matrix) => Rgba {
                rgb: clamp_rgb(matrix * color.rgb),
                alpha: color.alpha,
            },
            ColorOp::Linear { slope, intercept } => Rgba {
                rgb: clamp_rgb(color.rgb.map(|c| c * slope + intercept)),
                alpha: color.alpha,
            },
            ColorOp::Alpha(factor) => Rgba {
                rgb: color.rgb,
                alpha: (color.alpha * factor).clamp(0.0, 1.0),
            },
        }
    }
}

/// Build a cgmath matrix from row-major values
///
/// cgmath stores matrices column-major, so rows become columns here.
fn from_rows(rows: [[f32; 3]; 3]) -> Matrix3<f32> {
    Matrix3::new(
        rows[0][0], rows[1][0], rows[2][0], // Column 0
        rows[0][1], rows[1][1], rows[2][1], // Column 1
        rows[0][2], rows[1][2], rows[2][2], // Column 2
    )
}

fn clamp_rgb(rgb: Vector3<f32>) -> Vector3<f32> {
    rgb.map(|c| c.clamp(0.0, 1.0))
}

fn to_byte(value: f32) -> u8 {
    (value * 255.0).round().clamp(0.0, 255.0) as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(op: ColorOp, pixel: [u8; 4]) -> [u8; 4] {
        op.apply(Rgba::from_bytes(pixel)).to_bytes()
    }

    #[test]
    fn test_byte_round_trip() {
        for value in [0u8, 1, 127, 128, 254, 255] {
            let pixel = [value, value, value, value];
            assert_eq!(Rgba::from_bytes(pixel).to_bytes(), pixel);
        }
    }

    #[test]
    fn test_identity_amounts() {
        let pixel = [12, 200, 97, 255];
        assert_eq!(run(ColorOp::invert(0.0), pixel), pixel);
        assert_eq!(run(ColorOp::saturate(1.0), pixel), pixel);
        assert_eq!(run(ColorOp::brightness(1.0), pixel), pixel);
        assert_eq!(run(ColorOp::contrast(1.0), pixel), pixel);
        assert_eq!(run(ColorOp::grayscale(0.0), pixel), pixel);
        assert_eq!(run(ColorOp::sepia(0.0), pixel), pixel);
        assert_eq!(run(ColorOp::opacity(1.0), pixel), pixel);
    }

    #[test]
    fn test_full_invert() {
        assert_eq!(run(ColorOp::invert(1.0), [0, 100, 255, 200]), [255, 155, 0, 200]);
        // Half inversion lands everything on mid-gray
        assert_eq!(run(ColorOp::invert(0.5), [0, 100, 255, 255]), [128, 128, 128, 255]);
    }

    #[test]
    fn test_grayscale_equalizes_channels() {
        let [r, g, b, a] = run(ColorOp::grayscale(1.0), [255, 0, 0, 255]);
        assert_eq!(r, g);
        assert_eq!(g, b);
        assert_eq!(r, 54); // 0.2126 * 255
        assert_eq!(a, 255);
    }

    #[test]
    fn test_full_sepia_white_saturates() {
        assert_eq!(run(ColorOp::sepia(1.0), [255, 255, 255, 255]), [255, 255, 239, 255]);
    }

    #[test]
    fn test_brightness_and_contrast() {
        assert_eq!(run(ColorOp::brightness(2.0), [100, 200, 0, 255]), [200, 255, 0, 255]);
        assert_eq!(run(ColorOp::brightness(0.0), [100, 200, 50, 255]), [0, 0, 0, 255]);
        assert_eq!(run(ColorOp::contrast(0.0), [10, 240, 90, 255]), [128, 128, 128, 255]);
    }

    #[test]
    fn test_opacity_only_touches_alpha() {
        assert_eq!(run(ColorOp::opacity(0.5), [10, 20, 30, 255]), [10, 20, 30, 128]);
        // Above 100% is capped
        assert_eq!(run(ColorOp::opacity(2.0), [10, 20, 30, 100]), [10, 20, 30, 100]);
    }

    #[test]
    fn test_oversaturation_stays_in_range() {
        let [r, g, b, _] = run(ColorOp::saturate(2.0), [250, 10, 10, 255]);
        assert_eq!(r, 255);
        assert_eq!(g, 0);
        assert_eq!(b, 0);
    }
}
