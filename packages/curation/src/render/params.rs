//! Linear maps from camera-setting ranges to processing parameters.
//!
//! Every map clamps its output to a documented range, so a setting at
//! either extreme (or beyond, if a caller skipped normalization)
//! produces a bounded operation parameter.

/// White-balance channel gain for a shift in [-9, 9]:
/// `1.0 + (shift / 9) * 0.4`, clamped to [0.6, 1.4].
pub fn white_balance_gain(shift: i32) -> f32 {
    (1.0 + (shift as f32 / 9.0) * 0.4).clamp(0.6, 1.4)
}

/// Highlight-recovery gamma for a highlight value in [-2, 4]:
/// `2.2 + value * 0.2`, clamped to [1.8, 2.8].
///
/// The neutral value 0 maps to 2.2, which the engine treats as a
/// no-op exponent.
pub fn highlight_gamma(value: i32) -> f32 {
    (2.2 + value as f32 * 0.2).clamp(1.8, 2.8)
}

/// Shadow-lift brightness multiplier for a shadow value in [-2, 4]:
/// `1.0 + value * 0.2`, clamped to [0.7, 2.0].
pub fn shadow_brightness(value: i32) -> f32 {
    (1.0 + value as f32 * 0.2).clamp(0.7, 2.0)
}

/// Saturation multiplier for a color value in [-4, 4]:
/// `1.0 + value * 0.25`, clamped to [0.5, 2.2].
pub fn saturation_multiplier(value: i32) -> f32 {
    (1.0 + value as f32 * 0.25).clamp(0.5, 2.2)
}

/// Unsharp-mask sigma for a positive sharpness value:
/// `1.0 + value * 0.25`, clamped to [0.5, 2.0]. `None` when the value
/// does not call for sharpening.
pub fn sharpen_sigma(value: i32) -> Option<f32> {
    if value > 0 {
        Some((1.0 + value as f32 * 0.25).clamp(0.5, 2.0))
    } else {
        None
    }
}

/// Gentle-blur radius for a negative sharpness value:
/// `|value| * 0.2`, clamped to [0.0, 1.0]. `None` when the value does
/// not call for blurring.
pub fn blur_radius(value: i32) -> Option<f32> {
    if value < 0 {
        Some((value.unsigned_abs() as f32 * 0.2).clamp(0.0, 1.0))
    } else {
        None
    }
}

/// Smoothing window for a positive noise-reduction value:
/// `3 + value`, clamped to at most 7. `None` for zero or negative
/// values (no-op).
pub fn noise_window(value: i32) -> Option<u32> {
    if value > 0 {
        Some(((3 + value) as u32).min(7))
    } else {
        None
    }
}
