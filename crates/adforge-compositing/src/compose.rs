//! Compositor: cover crop + text overlay + logo placement + PNG encode.

use std::time::Instant;

use ab_glyph::{FontArc, PxScale};
use image::codecs::png::PngEncoder;
use image::{imageops, DynamicImage, ExtendedColorType, GenericImageView, ImageEncoder, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use tracing::{info, warn};

use adforge_core::models::{AspectRatio, CropStrategy};

use crate::error::CompositeError;
use crate::fonts::FontCatalog;
use crate::logo::{overlay_logo, LogoCorner};
use crate::script::Script;

const TEXT_PADDING: u32 = 50;
const MIN_FONT_SIZE: f32 = 16.0;
const LINE_SPACING: f32 = 1.2;
const LOGO_PADDING: u32 = 30;

/// Offsets for the drop-shadow pass drawn beneath the message.
const SHADOW_OFFSETS: [(i32, i32); 8] = [
    (-2, -2),
    (0, -2),
    (2, -2),
    (-2, 0),
    (2, 0),
    (-2, 2),
    (0, 2),
    (2, 2),
];

/// Produces one output image from a resolved hero: cover-crops to the
/// ratio's canonical dimensions, renders the localized message in the brand
/// color with script-appropriate wrapping, and places the logo if supplied.
pub struct Compositor {
    fonts: FontCatalog,
    logo_corner: LogoCorner,
}

impl Compositor {
    pub fn new(fonts: FontCatalog) -> Self {
        Self {
            fonts,
            logo_corner: LogoCorner::TopLeft,
        }
    }

    pub fn with_logo_corner(mut self, corner: LogoCorner) -> Self {
        self.logo_corner = corner;
        self
    }

    /// Compose one creative. Output is PNG bytes at the ratio's exact
    /// canonical pixel dimensions regardless of source dimensions.
    pub fn compose(
        &self,
        source: &DynamicImage,
        ratio: AspectRatio,
        message: &str,
        brand_rgb: (u8, u8, u8),
        logo: Option<&DynamicImage>,
    ) -> Result<Vec<u8>, CompositeError> {
        let start = Instant::now();

        let mut canvas = cover_crop(source, ratio)?;
        self.overlay_message(&mut canvas, message, brand_rgb);
        if let Some(logo) = logo {
            overlay_logo(&mut canvas, logo, self.logo_corner, LOGO_PADDING);
        }
        let bytes = encode_png(&canvas)?;

        info!(
            ratio = %ratio,
            source_dims = ?source.dimensions(),
            output_bytes = bytes.len(),
            duration_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Composited creative"
        );
        Ok(bytes)
    }

    fn overlay_message(&self, canvas: &mut RgbaImage, message: &str, brand_rgb: (u8, u8, u8)) {
        if message.trim().is_empty() {
            return;
        }
        let script = Script::classify(message);
        let Some(font) = self.fonts.resolve(script) else {
            warn!(
                script = ?script,
                "No font available at all, rendering contrast band without glyphs"
            );
            draw_backing_band(canvas);
            return;
        };

        let (width, height) = canvas.dimensions();
        let max_width = width.saturating_sub(2 * TEXT_PADDING).max(1);
        let height_budget = height / 4;

        let (size, lines) = fit_text(message, script, &font, max_width, height_budget, width);
        let scale = PxScale::from(size);
        let line_height = (size * LINE_SPACING).round() as u32;
        let total_height = lines.len() as u32 * line_height;

        // Anchored near the lower third: block bottom sits one padding above
        // the frame edge.
        let mut y = height.saturating_sub(total_height + TEXT_PADDING) as i32;
        let fill = Rgba([brand_rgb.0, brand_rgb.1, brand_rgb.2, 255]);
        let shadow = Rgba([0, 0, 0, 255]);

        for line in &lines {
            let (line_width, _) = text_size(scale, &font, line);
            let x = (width.saturating_sub(line_width) / 2) as i32;
            for (dx, dy) in SHADOW_OFFSETS {
                draw_text_mut(canvas, shadow, x + dx, y + dy, scale, &font, line);
            }
            draw_text_mut(canvas, fill, x, y, scale, &font, line);
            y += line_height as i32;
        }
    }
}

/// Scale so the target is fully covered, then crop to exact dimensions.
/// Never letterboxes; aspect is preserved through the uniform scale.
fn cover_crop(source: &DynamicImage, ratio: AspectRatio) -> Result<RgbaImage, CompositeError> {
    let (target_w, target_h) = ratio.dimensions();
    let (orig_w, orig_h) = source.dimensions();
    if orig_w == 0 || orig_h == 0 {
        return Err(CompositeError::EmptySource);
    }

    let scale = (target_w as f32 / orig_w as f32).max(target_h as f32 / orig_h as f32);
    let new_w = ((orig_w as f32 * scale).ceil() as u32).max(target_w);
    let new_h = ((orig_h as f32 * scale).ceil() as u32).max(target_h);

    let filter = select_filter(orig_w, orig_h, new_w, new_h);
    let resized = source.resize_exact(new_w, new_h, filter);

    let x = (new_w - target_w) / 2;
    let y = match ratio.crop_strategy() {
        CropStrategy::Center => (new_h - target_h) / 2,
        CropStrategy::UpperWeighted => smart_vertical_offset(&resized, target_h),
    };

    Ok(imageops::crop_imm(&resized, x, y, target_w, target_h).to_image())
}

/// Select a resampling filter based on how aggressive the resize is.
fn select_filter(orig_w: u32, orig_h: u32, new_w: u32, new_h: u32) -> imageops::FilterType {
    let width_ratio = orig_w as f32 / new_w as f32;
    let height_ratio = orig_h as f32 / new_h as f32;
    let max_ratio = width_ratio.max(height_ratio);

    if max_ratio > 2.0 {
        imageops::FilterType::Triangle
    } else if max_ratio > 1.5 {
        imageops::FilterType::CatmullRom
    } else {
        imageops::FilterType::Lanczos3
    }
}

/// Choose the vertical crop offset for widescreen outputs.
///
/// Row energy (gradient magnitude over the center half of columns, computed
/// on a downscaled grayscale copy) locates the visual center of interest;
/// rows in the upper two thirds carry full weight so faces near the top are
/// preferred over busy foregrounds. The crop window is centered on the
/// weighted centroid, clamped to the frame.
fn smart_vertical_offset(img: &DynamicImage, target_h: u32) -> u32 {
    let (width, height) = img.dimensions();
    let excess = height.saturating_sub(target_h);
    if excess == 0 {
        return 0;
    }

    let gray = img.to_luma8();
    let scale = 4u32;
    let small_w = (width / scale).max(3);
    let small_h = (height / scale).max(3);
    let small = imageops::resize(&gray, small_w, small_h, imageops::FilterType::Triangle);

    let x0 = small_w / 4;
    let x1 = (3 * small_w / 4).min(small_w - 1).max(x0 + 1);

    let mut energy = vec![0.0f32; small_h as usize];
    for y in 1..small_h - 1 {
        let mut row = 0.0f32;
        for x in x0..x1 {
            let right = small.get_pixel(x + 1, y)[0] as i32;
            let left = small.get_pixel(x.saturating_sub(1), y)[0] as i32;
            let below = small.get_pixel(x, y + 1)[0] as i32;
            let above = small.get_pixel(x, y - 1)[0] as i32;
            let gx = (right - left).abs();
            let gy = (below - above).abs();
            row += ((gx * gx + gy * gy) as f32).sqrt();
        }
        energy[y as usize] = row;
    }

    let cutoff = small_h * 2 / 3;
    let mut weighted_sum = 0.0f32;
    let mut weight_total = 0.0f32;
    for (y, e) in energy.iter().enumerate() {
        let weight = if (y as u32) < cutoff { 1.0 } else { 0.5 };
        let v = e * weight;
        weighted_sum += y as f32 * v;
        weight_total += v;
    }

    let centroid_small = if weight_total > 0.0 {
        weighted_sum / weight_total
    } else {
        // Featureless source: fall back to an upper-third bias.
        small_h as f32 / 3.0
    };

    let centroid = centroid_small * (height as f32 / small_h as f32);
    (centroid - target_h as f32 / 2.0)
        .round()
        .clamp(0.0, excess as f32) as u32
}

/// Shrink the font until the wrapped message fits the horizontal margin and
/// the vertical budget, flooring at a minimum legible size.
fn fit_text(
    message: &str,
    script: Script,
    font: &FontArc,
    max_width: u32,
    height_budget: u32,
    canvas_width: u32,
) -> (f32, Vec<String>) {
    let mut size = (canvas_width as f32 * 0.05).max(32.0);
    loop {
        let scale = PxScale::from(size);
        let lines = wrap_text(message, script, font, scale, max_width);
        let fits_width = lines
            .iter()
            .all(|l| text_size(scale, font, l).0 <= max_width);
        let fits_height = lines.len() as f32 * size * LINE_SPACING <= height_budget as f32;
        if (fits_width && fits_height) || size <= MIN_FONT_SIZE {
            return (size, lines);
        }
        size *= 0.9;
    }
}

/// Greedy wrapping: on whitespace for space-delimited scripts, per character
/// for scripts without word spacing.
fn wrap_text(
    message: &str,
    script: Script,
    font: &FontArc,
    scale: PxScale,
    max_width: u32,
) -> Vec<String> {
    let (tokens, separator): (Vec<String>, &str) = if script.word_delimited() {
        (message.split_whitespace().map(str::to_string).collect(), " ")
    } else {
        (
            message.chars().filter(|c| !c.is_whitespace()).map(String::from).collect(),
            "",
        )
    };

    let mut lines: Vec<String> = Vec::new();
    let mut current = String::new();
    for token in tokens {
        let candidate = if current.is_empty() {
            token.clone()
        } else {
            format!("{current}{separator}{token}")
        };
        if text_size(scale, font, &candidate).0 <= max_width || current.is_empty() {
            current = candidate;
        } else {
            lines.push(std::mem::take(&mut current));
            current = token;
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

/// Fontless degradation: a semi-transparent band over the message area so
/// the output still carries the contrast treatment.
fn draw_backing_band(canvas: &mut RgbaImage) {
    let (width, height) = canvas.dimensions();
    let band_h = height / 4;
    let y0 = height - band_h;
    for y in y0..height {
        for x in 0..width {
            let px = canvas.get_pixel_mut(x, y);
            for c in 0..3 {
                px.0[c] = (px.0[c] as f32 * 0.45) as u8;
            }
        }
    }
}

/// Decode image bytes into a DynamicImage.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage, CompositeError> {
    image::load_from_memory(bytes).map_err(|e| CompositeError::Decode(e.to_string()))
}

/// Encode an RGBA canvas as PNG bytes.
pub fn encode_png(img: &RgbaImage) -> Result<Vec<u8>, CompositeError> {
    let mut out = Vec::new();
    PngEncoder::new(&mut out)
        .write_image(
            img.as_raw(),
            img.width(),
            img.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| CompositeError::Encode(e.to_string()))?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_compositor() -> Compositor {
        let dir = tempfile::tempdir().unwrap();
        Compositor::new(FontCatalog::new(dir.path()))
    }

    fn solid(w: u32, h: u32, rgba: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba(rgba)))
    }

    #[test]
    fn test_compose_yields_canonical_dimensions() {
        let compositor = test_compositor();
        let source = solid(800, 600, [10, 120, 200, 255]);
        for ratio in AspectRatio::ALL {
            let bytes = compositor
                .compose(&source, ratio, "Summer Sale", (255, 255, 255), None)
                .unwrap();
            let decoded = decode_image(&bytes).unwrap();
            assert_eq!(decoded.dimensions(), ratio.dimensions());
        }
    }

    #[test]
    fn test_compose_upscales_small_sources() {
        let compositor = test_compositor();
        let source = solid(64, 64, [200, 40, 40, 255]);
        let bytes = compositor
            .compose(&source, AspectRatio::Story, "Hi", (255, 255, 255), None)
            .unwrap();
        let decoded = decode_image(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), AspectRatio::Story.dimensions());
    }

    #[test]
    fn test_compose_with_logo_keeps_dimensions() {
        let compositor = test_compositor();
        let source = solid(1600, 1600, [0, 0, 0, 255]);
        let logo = solid(300, 120, [255, 255, 255, 255]);
        let bytes = compositor
            .compose(&source, AspectRatio::Wide, "Brand", (255, 200, 0), Some(&logo))
            .unwrap();
        let decoded = decode_image(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), AspectRatio::Wide.dimensions());
    }

    #[test]
    fn test_cover_crop_exact_fit_is_identity_sized() {
        let source = solid(1920, 1080, [1, 2, 3, 255]);
        let out = cover_crop(&source, AspectRatio::Wide).unwrap();
        assert_eq!(out.dimensions(), (1920, 1080));
    }

    #[test]
    fn test_cover_crop_rejects_empty_source() {
        let source = DynamicImage::ImageRgba8(RgbaImage::new(0, 0));
        assert!(matches!(
            cover_crop(&source, AspectRatio::Square),
            Err(CompositeError::EmptySource)
        ));
    }

    #[test]
    fn test_smart_offset_flat_image_biases_upward() {
        let img = solid(1920, 2160, [128, 128, 128, 255]);
        let offset = smart_vertical_offset(&img, 1080);
        let center = (2160 - 1080) / 2;
        assert!(offset <= center, "flat image should not crop below center");
    }

    #[test]
    fn test_smart_offset_tracks_detail_region() {
        // Busy band near the top third; crop window should cover it.
        let mut img = RgbaImage::from_pixel(1920, 3240, Rgba([20, 20, 20, 255]));
        for y in 400..700 {
            for x in 0..1920 {
                let v = if (x / 8 + y / 8) % 2 == 0 { 255 } else { 0 };
                img.put_pixel(x, y, Rgba([v, v, v, 255]));
            }
        }
        let offset = smart_vertical_offset(&DynamicImage::ImageRgba8(img), 1080);
        assert!(offset < 700, "crop window must include the detailed band");
    }

    #[test]
    fn test_encode_decode_png_roundtrip() {
        let img = RgbaImage::from_pixel(8, 8, Rgba([9, 8, 7, 255]));
        let bytes = encode_png(&img).unwrap();
        let decoded = decode_image(&bytes).unwrap();
        assert_eq!(decoded.dimensions(), (8, 8));
    }

    #[test]
    fn test_decode_rejects_garbage() {
        assert!(decode_image(b"not an image").is_err());
    }
}
