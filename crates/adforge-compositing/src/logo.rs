//! Logo overlay: proportional sizing, corner placement, and white-background
//! knockout so square logos on white blend instead of showing a box.

use image::{imageops, DynamicImage, GenericImageView, RgbaImage};
use tracing::debug;

/// Corner the logo is anchored to, inset by the configured padding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogoCorner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

/// Logo width as a share of the output width, bounded so tiny outputs still
/// get a visible mark and huge outputs are not dominated.
const LOGO_WIDTH_RATIO: f32 = 0.15;
const LOGO_MIN_WIDTH: u32 = 64;
/// Channel threshold above which a pixel counts as background white.
const WHITE_THRESHOLD: u8 = 240;

pub fn overlay_logo(base: &mut RgbaImage, logo: &DynamicImage, corner: LogoCorner, padding: u32) {
    let (base_w, base_h) = base.dimensions();
    let (logo_w, logo_h) = logo.dimensions();
    if logo_w == 0 || logo_h == 0 {
        return;
    }

    let max_width = base_w / 3;
    let target_w = ((base_w as f32 * LOGO_WIDTH_RATIO) as u32)
        .clamp(LOGO_MIN_WIDTH.min(max_width), max_width.max(1));
    let target_h = ((target_w as f32 / logo_w as f32) * logo_h as f32).round() as u32;
    let target_h = target_h.clamp(1, base_h / 3);

    let mut scaled = logo
        .resize_exact(target_w, target_h, imageops::FilterType::Lanczos3)
        .to_rgba8();
    knock_out_white_background(&mut scaled);

    let (x, y) = match corner {
        LogoCorner::TopLeft => (padding, padding),
        LogoCorner::TopRight => (base_w.saturating_sub(target_w + padding), padding),
        LogoCorner::BottomLeft => (padding, base_h.saturating_sub(target_h + padding)),
        LogoCorner::BottomRight => (
            base_w.saturating_sub(target_w + padding),
            base_h.saturating_sub(target_h + padding),
        ),
    };

    imageops::overlay(base, &DynamicImage::ImageRgba8(scaled), x as i64, y as i64);
    debug!(
        corner = ?corner,
        logo_size = ?(target_w, target_h),
        at = ?(x, y),
        "Placed logo overlay"
    );
}

/// Flood-fill from each corner, turning connected near-white pixels
/// transparent. Only runs when the top-left corner pixel itself is
/// near-white; interior white detail stays opaque.
fn knock_out_white_background(logo: &mut RgbaImage) {
    let (w, h) = logo.dimensions();
    let near_white = |px: &image::Rgba<u8>| {
        px.0[3] > 0 && px.0[0] >= WHITE_THRESHOLD && px.0[1] >= WHITE_THRESHOLD && px.0[2] >= WHITE_THRESHOLD
    };

    if !near_white(logo.get_pixel(0, 0)) {
        return;
    }

    let mut visited = vec![false; (w * h) as usize];
    let mut stack: Vec<(u32, u32)> = [(0, 0), (w - 1, 0), (0, h - 1), (w - 1, h - 1)]
        .into_iter()
        .filter(|&(x, y)| near_white(logo.get_pixel(x, y)))
        .collect();

    while let Some((x, y)) = stack.pop() {
        let idx = (y * w + x) as usize;
        if visited[idx] {
            continue;
        }
        visited[idx] = true;
        if !near_white(logo.get_pixel(x, y)) {
            continue;
        }
        logo.get_pixel_mut(x, y).0[3] = 0;

        if x > 0 {
            stack.push((x - 1, y));
        }
        if x + 1 < w {
            stack.push((x + 1, y));
        }
        if y > 0 {
            stack.push((x, y - 1));
        }
        if y + 1 < h {
            stack.push((x, y + 1));
        }
    }
}
