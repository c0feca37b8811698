//! Deterministic numeric-to-visual transform pipeline.
//!
//! [`params`] holds the documented linear maps from camera-setting
//! ranges to processing-operation ranges; [`engine`] applies them to
//! pixels in a fixed order and renders the before/after previews.

pub mod engine;
pub mod params;

pub use engine::{
    apply_settings, render_preview, RenderOptions, TransformRenderer,
};
pub use params::{
    blur_radius, highlight_gamma, noise_window, saturation_multiplier, shadow_brightness,
    sharpen_sigma, white_balance_gain,
};
