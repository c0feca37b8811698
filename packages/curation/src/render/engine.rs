//! Preview rendering: decode, transform chain, encode.
//!
//! The operation order is fixed: white balance, highlight gamma,
//! shadow lift, saturation, contrast normalization, sharpness, noise
//! reduction, then optional monochrome conversion. Every operation is
//! a pure per-pixel/per-channel map over the working buffer, so a
//! given `(source bytes, settings)` pair always renders byte-identical
//! output.

use std::io::Cursor;
use std::sync::Arc;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use image::imageops::{self, FilterType};
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use tracing::{debug, warn};

use crate::error::{CurationError, Result};
use crate::render::params;
use crate::traits::{PreviewRenderer, PreviewSet, SampleImageProvider};
use crate::types::RecipeSettings;

/// Gamma at the neutral highlight value; the exponent applied to
/// pixels is `gamma / NEUTRAL_GAMMA`, so highlight 0 is a no-op.
const NEUTRAL_GAMMA: f32 = 2.2;

/// Percentile bounds for contrast normalization.
const CONTRAST_LOW_PERCENTILE: f32 = 0.01;
const CONTRAST_HIGH_PERCENTILE: f32 = 0.99;

/// Unsharp-mask amount is fixed; only sigma tracks the setting.
const UNSHARP_THRESHOLD: i32 = 0;

/// Output sizing and encoding knobs.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Longest output edge; larger sources are scaled down.
    pub max_edge: u32,

    /// JPEG quality for encoded previews.
    pub jpeg_quality: u8,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            max_edge: 640,
            jpeg_quality: 85,
        }
    }
}

/// ITU-R BT.601 luminance of one pixel.
fn luma(pixel: &Rgb<u8>) -> f32 {
    0.299 * pixel.0[0] as f32 + 0.587 * pixel.0[1] as f32 + 0.114 * pixel.0[2] as f32
}

fn clamp_u8(value: f32) -> u8 {
    value.round().clamp(0.0, 255.0) as u8
}

/// Independent R/B channel gains; G stays at 1.0.
fn apply_white_balance(img: &mut RgbImage, red_gain: f32, blue_gain: f32) {
    for pixel in img.pixels_mut() {
        pixel.0[0] = clamp_u8(pixel.0[0] as f32 * red_gain);
        pixel.0[2] = clamp_u8(pixel.0[2] as f32 * blue_gain);
    }
}

/// Power curve with exponent `gamma / NEUTRAL_GAMMA`: above-neutral
/// gamma compresses highlights, below-neutral lifts them.
fn apply_highlight_gamma(img: &mut RgbImage, gamma: f32) {
    let exponent = gamma / NEUTRAL_GAMMA;
    if (exponent - 1.0).abs() < 1e-3 {
        return;
    }

    // 256-entry lookup keeps the per-pixel cost flat.
    let mut table = [0u8; 256];
    for (i, slot) in table.iter_mut().enumerate() {
        *slot = clamp_u8(255.0 * (i as f32 / 255.0).powf(exponent));
    }

    for pixel in img.pixels_mut() {
        for channel in &mut pixel.0 {
            *channel = table[*channel as usize];
        }
    }
}

/// Luminance-weighted brightness: the multiplier applies fully in the
/// deepest shadows and fades to nothing in the highlights.
fn apply_shadow_lift(img: &mut RgbImage, multiplier: f32) {
    if (multiplier - 1.0).abs() < 1e-3 {
        return;
    }

    for pixel in img.pixels_mut() {
        let weight = 1.0 - luma(pixel) / 255.0;
        let factor = 1.0 + (multiplier - 1.0) * weight;
        for channel in &mut pixel.0 {
            *channel = clamp_u8(*channel as f32 * factor);
        }
    }
}

/// Scale chroma around per-pixel luminance.
fn apply_saturation(img: &mut RgbImage, multiplier: f32) {
    if (multiplier - 1.0).abs() < 1e-3 {
        return;
    }

    for pixel in img.pixels_mut() {
        let gray = luma(pixel);
        for channel in &mut pixel.0 {
            *channel = clamp_u8(gray + (*channel as f32 - gray) * multiplier);
        }
    }
}

/// Linear stretch between the 1st and 99th luminance percentiles.
/// Always applied; flat images (bounds collapse) pass through.
fn normalize_contrast(img: &mut RgbImage) {
    let mut histogram = [0u32; 256];
    for pixel in img.pixels() {
        histogram[luma(pixel) as usize] += 1;
    }

    let total: u32 = histogram.iter().sum();
    if total == 0 {
        return;
    }

    let low_count = (total as f32 * CONTRAST_LOW_PERCENTILE) as u32;
    let high_count = (total as f32 * CONTRAST_HIGH_PERCENTILE) as u32;

    let mut cumulative = 0u32;
    let mut low = 0u8;
    let mut high = 255u8;
    let mut low_set = false;
    for (value, count) in histogram.iter().enumerate() {
        cumulative += count;
        if !low_set && cumulative > low_count {
            low = value as u8;
            low_set = true;
        }
        if cumulative >= high_count {
            high = value as u8;
            break;
        }
    }

    if high <= low {
        return;
    }

    let scale = 255.0 / (high - low) as f32;
    let mut table = [0u8; 256];
    for (i, slot) in table.iter_mut().enumerate() {
        *slot = clamp_u8((i as f32 - low as f32) * scale);
    }

    for pixel in img.pixels_mut() {
        for channel in &mut pixel.0 {
            *channel = table[*channel as usize];
        }
    }
}

/// Positive sharpness runs an unsharp mask; negative blends toward a
/// gentle gaussian blur; zero passes through.
fn apply_sharpness(img: RgbImage, value: i32) -> RgbImage {
    if let Some(sigma) = params::sharpen_sigma(value) {
        return imageops::unsharpen(&img, sigma, UNSHARP_THRESHOLD);
    }

    if let Some(radius) = params::blur_radius(value) {
        if radius > 0.0 {
            return imageops::blur(&img, radius);
        }
    }

    img
}

/// Median-style smoothing over a square neighborhood.
/// Window sizes map to neighborhood radius `window / 2`.
fn apply_noise_reduction(img: RgbImage, value: i32) -> RgbImage {
    let Some(window) = params::noise_window(value) else {
        return img;
    };
    let radius = (window / 2) as i64;

    let (w, h) = (img.width(), img.height());
    let mut output = RgbImage::new(w, h);
    let mut neighborhood: Vec<u8> = Vec::with_capacity(((2 * radius + 1) * (2 * radius + 1)) as usize);

    for y in 0..h {
        for x in 0..w {
            let mut out = [0u8; 3];
            for (c, slot) in out.iter_mut().enumerate() {
                neighborhood.clear();
                for dy in -radius..=radius {
                    for dx in -radius..=radius {
                        let ny = (y as i64 + dy).clamp(0, h as i64 - 1) as u32;
                        let nx = (x as i64 + dx).clamp(0, w as i64 - 1) as u32;
                        neighborhood.push(img.get_pixel(nx, ny).0[c]);
                    }
                }
                neighborhood.sort_unstable();
                *slot = neighborhood[neighborhood.len() / 2];
            }
            output.put_pixel(x, y, Rgb(out));
        }
    }

    output
}

/// BT.601 grayscale, kept in RGB layout for uniform encoding.
fn to_monochrome(img: &mut RgbImage) {
    for pixel in img.pixels_mut() {
        let gray = clamp_u8(luma(pixel));
        pixel.0 = [gray, gray, gray];
    }
}

/// Apply the full settings chain in its fixed order.
///
/// Settings are normalized first, so out-of-range inputs behave the
/// same as their clamped equivalents.
pub fn apply_settings(img: RgbImage, settings: &RecipeSettings) -> RgbImage {
    let settings = settings.clone().normalized();
    let mut img = img;

    apply_white_balance(
        &mut img,
        params::white_balance_gain(settings.wb_shift_red),
        params::white_balance_gain(settings.wb_shift_blue),
    );
    apply_highlight_gamma(&mut img, params::highlight_gamma(settings.highlight));
    apply_shadow_lift(&mut img, params::shadow_brightness(settings.shadow));
    apply_saturation(&mut img, params::saturation_multiplier(settings.color));
    normalize_contrast(&mut img);

    let img = apply_sharpness(img, settings.sharpness);
    apply_noise_reduction(img, settings.noise_reduction)
}

/// Scale down so the longest edge fits `max_edge`. Never upscales.
fn resize_to_fit(img: RgbImage, max_edge: u32) -> RgbImage {
    let (w, h) = (img.width(), img.height());
    let largest = w.max(h);
    if largest <= max_edge {
        return img;
    }

    let scale = max_edge as f32 / largest as f32;
    let new_w = ((w as f32 * scale).round() as u32).max(1);
    let new_h = ((h as f32 * scale).round() as u32).max(1);
    imageops::resize(&img, new_w, new_h, FilterType::CatmullRom)
}

/// Encode an RGB image as JPEG bytes.
fn encode_jpeg(img: RgbImage, quality: u8) -> Result<Vec<u8>> {
    let dynamic = DynamicImage::ImageRgb8(img);
    let mut cursor = Cursor::new(Vec::new());
    dynamic
        .write_to(&mut cursor, ImageOutputFormat::Jpeg(quality))
        .map_err(|e| CurationError::Render(format!("JPEG encoding failed: {e}")))?;
    Ok(cursor.into_inner())
}

/// Render one preview from raw sample bytes.
///
/// With `settings`, the full transform chain runs and `monochrome`
/// optionally converts last; without, the sample is only resized.
pub fn render_preview(
    bytes: &[u8],
    settings: Option<&RecipeSettings>,
    monochrome: bool,
    options: &RenderOptions,
) -> Result<Vec<u8>> {
    let decoded = image::load_from_memory(bytes)
        .map_err(|e| CurationError::Render(format!("failed to decode sample image: {e}")))?;

    let mut img = resize_to_fit(decoded.to_rgb8(), options.max_edge);

    if let Some(settings) = settings {
        img = apply_settings(img, settings);
        if monochrome {
            to_monochrome(&mut img);
        }
    }

    encode_jpeg(img, options.jpeg_quality)
}

/// JPEG bytes as a `data:` URL ready for a JSON payload.
pub fn to_data_url(bytes: &[u8]) -> String {
    format!("data:image/jpeg;base64,{}", BASE64.encode(bytes))
}

/// Production renderer over a sample-image provider.
///
/// The two previews run concurrently on blocking threads over the same
/// source bytes and are awaited jointly. Failures degrade: whichever
/// preview fails is simply absent from the result.
pub struct TransformRenderer {
    provider: Arc<dyn SampleImageProvider>,
    sample_name: String,
    options: RenderOptions,
}

impl TransformRenderer {
    pub fn new(provider: Arc<dyn SampleImageProvider>, sample_name: impl Into<String>) -> Self {
        Self {
            provider,
            sample_name: sample_name.into(),
            options: RenderOptions::default(),
        }
    }

    pub fn with_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }
}

#[async_trait]
impl PreviewRenderer for TransformRenderer {
    async fn render(&self, settings: Option<&RecipeSettings>, monochrome: bool) -> PreviewSet {
        let bytes: Arc<Vec<u8>> = match self.provider.fetch(&self.sample_name).await {
            Ok(bytes) => Arc::new(bytes),
            Err(e) => {
                warn!(sample = %self.sample_name, error = %e, "sample image unavailable; skipping previews");
                return PreviewSet::default();
            }
        };

        let source_bytes = Arc::clone(&bytes);
        let source_options = self.options.clone();
        let source_task = tokio::task::spawn_blocking(move || {
            render_preview(&source_bytes, None, false, &source_options)
        });

        let retouched_task = settings.cloned().map(|settings| {
            let bytes = Arc::clone(&bytes);
            let options = self.options.clone();
            tokio::task::spawn_blocking(move || {
                render_preview(&bytes, Some(&settings), monochrome, &options)
            })
        });

        let (source, retouched) = match retouched_task {
            Some(task) => {
                let (source, retouched) = tokio::join!(source_task, task);
                (source, Some(retouched))
            }
            None => (source_task.await, None),
        };

        let source = unwrap_render("source", source);
        let retouched = retouched.and_then(|r| unwrap_render("retouched", r));

        debug!(
            source = source.is_some(),
            retouched = retouched.is_some(),
            "previews rendered"
        );

        PreviewSet { source, retouched }
    }
}

/// Collapse a blocking-task result into an optional data URL, logging
/// the failure that made it absent.
fn unwrap_render(
    which: &str,
    result: std::result::Result<Result<Vec<u8>>, tokio::task::JoinError>,
) -> Option<String> {
    match result {
        Ok(Ok(bytes)) => Some(to_data_url(&bytes)),
        Ok(Err(e)) => {
            warn!(preview = which, error = %e, "preview render failed; degrading response");
            None
        }
        Err(e) => {
            warn!(preview = which, error = %e, "preview render task panicked; degrading response");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MemorySampleProvider;
    use crate::types::FilmSimulation;

    /// Encode a small gradient PNG so every transform has dynamic
    /// range to work with.
    fn sample_png(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            let v = ((x * 13 + y * 7) % 256) as u8;
            Rgb([v, v.wrapping_add(40), v.wrapping_add(90)])
        });
        let mut cursor = Cursor::new(Vec::new());
        DynamicImage::ImageRgb8(img)
            .write_to(&mut cursor, ImageOutputFormat::Png)
            .unwrap();
        cursor.into_inner()
    }

    fn warm_settings() -> RecipeSettings {
        RecipeSettings {
            film_simulation: FilmSimulation::ClassicChrome,
            wb_shift_red: 6,
            wb_shift_blue: -4,
            highlight: 2,
            shadow: 2,
            color: 3,
            sharpness: 2,
            noise_reduction: 1,
            ..Default::default()
        }
    }

    #[test]
    fn test_white_balance_scales_channels() {
        let mut img = RgbImage::from_pixel(4, 4, Rgb([100, 100, 100]));
        apply_white_balance(&mut img, 1.4, 0.6);

        let pixel = img.get_pixel(0, 0);
        assert_eq!(pixel.0[0], 140);
        assert_eq!(pixel.0[1], 100);
        assert_eq!(pixel.0[2], 60);
    }

    #[test]
    fn test_highlight_gamma_neutral_is_noop() {
        let mut img = RgbImage::from_pixel(4, 4, Rgb([37, 120, 200]));
        let before = img.clone();
        apply_highlight_gamma(&mut img, NEUTRAL_GAMMA);
        assert_eq!(img, before);
    }

    #[test]
    fn test_highlight_gamma_above_neutral_darkens() {
        let mut img = RgbImage::from_pixel(4, 4, Rgb([200, 200, 200]));
        apply_highlight_gamma(&mut img, 2.8);
        assert!(img.get_pixel(0, 0).0[0] < 200);
    }

    #[test]
    fn test_shadow_lift_favors_dark_pixels() {
        let mut img = RgbImage::new(2, 1);
        img.put_pixel(0, 0, Rgb([20, 20, 20]));
        img.put_pixel(1, 0, Rgb([220, 220, 220]));
        apply_shadow_lift(&mut img, 1.8);

        let dark_gain = img.get_pixel(0, 0).0[0] as f32 / 20.0;
        let bright_gain = img.get_pixel(1, 0).0[0] as f32 / 220.0;
        assert!(dark_gain > bright_gain);
    }

    #[test]
    fn test_saturation_mutes_toward_gray() {
        let mut img = RgbImage::from_pixel(2, 2, Rgb([200, 50, 50]));
        apply_saturation(&mut img, 0.5);

        let pixel = img.get_pixel(0, 0);
        assert!(pixel.0[0] < 200);
        assert!(pixel.0[1] > 50);
    }

    #[test]
    fn test_contrast_normalization_stretches_range() {
        let mut img = RgbImage::from_fn(16, 16, |x, _| {
            let v = 100 + (x as u8 % 50);
            Rgb([v, v, v])
        });
        normalize_contrast(&mut img);

        let min = img.pixels().map(|p| p.0[0]).min().unwrap();
        let max = img.pixels().map(|p| p.0[0]).max().unwrap();
        assert!(min < 20);
        assert!(max > 235);
    }

    #[test]
    fn test_contrast_normalization_flat_image_passthrough() {
        let mut img = RgbImage::from_pixel(8, 8, Rgb([128, 128, 128]));
        let before = img.clone();
        normalize_contrast(&mut img);
        assert_eq!(img, before);
    }

    #[test]
    fn test_noise_reduction_removes_salt_pixel() {
        let mut img = RgbImage::from_pixel(9, 9, Rgb([50, 50, 50]));
        img.put_pixel(4, 4, Rgb([255, 255, 255]));

        let smoothed = apply_noise_reduction(img, 2);
        assert_eq!(smoothed.get_pixel(4, 4).0[0], 50);
    }

    #[test]
    fn test_monochrome_output_is_gray() {
        let mut img = RgbImage::from_pixel(4, 4, Rgb([200, 90, 30]));
        to_monochrome(&mut img);

        let pixel = img.get_pixel(0, 0);
        assert_eq!(pixel.0[0], pixel.0[1]);
        assert_eq!(pixel.0[1], pixel.0[2]);
    }

    #[test]
    fn test_render_preview_is_deterministic() {
        let bytes = sample_png(64, 48);
        let options = RenderOptions::default();
        let settings = warm_settings();

        let first = render_preview(&bytes, Some(&settings), false, &options).unwrap();
        let second = render_preview(&bytes, Some(&settings), false, &options).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_render_preview_resizes_to_max_edge() {
        let bytes = sample_png(200, 100);
        let options = RenderOptions {
            max_edge: 50,
            jpeg_quality: 85,
        };

        let jpeg = render_preview(&bytes, None, false, &options).unwrap();
        let decoded = image::load_from_memory(&jpeg).unwrap();
        assert_eq!(decoded.width(), 50);
        assert_eq!(decoded.height(), 25);
    }

    #[test]
    fn test_render_preview_rejects_garbage_bytes() {
        let result = render_preview(&[0xDE, 0xAD, 0xBE, 0xEF], None, false, &RenderOptions::default());
        assert!(matches!(result, Err(CurationError::Render(_))));
    }

    #[test]
    fn test_retouched_differs_from_source() {
        let bytes = sample_png(64, 64);
        let options = RenderOptions::default();

        let source = render_preview(&bytes, None, false, &options).unwrap();
        let retouched = render_preview(&bytes, Some(&warm_settings()), false, &options).unwrap();
        assert_ne!(source, retouched);
    }

    #[tokio::test]
    async fn test_renderer_produces_both_previews() {
        let provider = Arc::new(MemorySampleProvider::new("sample", sample_png(32, 32)));
        let renderer = TransformRenderer::new(provider, "sample");

        let settings = warm_settings();
        let previews = renderer.render(Some(&settings), false).await;

        assert!(previews.source.is_some());
        assert!(previews.retouched.is_some());
        assert!(previews
            .source
            .unwrap()
            .starts_with("data:image/jpeg;base64,"));
    }

    #[tokio::test]
    async fn test_renderer_without_settings_skips_retouched() {
        let provider = Arc::new(MemorySampleProvider::new("sample", sample_png(32, 32)));
        let renderer = TransformRenderer::new(provider, "sample");

        let previews = renderer.render(None, false).await;
        assert!(previews.source.is_some());
        assert!(previews.retouched.is_none());
    }

    #[tokio::test]
    async fn test_renderer_degrades_on_missing_sample() {
        let provider = Arc::new(MemorySampleProvider::new("other", vec![]));
        let renderer = TransformRenderer::new(provider, "sample");

        let previews = renderer.render(None, false).await;
        assert!(previews.source.is_none());
        assert!(previews.retouched.is_none());
    }
}
