//! Deterministic placeholder rendering for the provider chain's terminal
//! stage. Font-free by construction so it can never fail.

use std::hash::{Hash, Hasher};

use image::{Rgba, RgbaImage};

pub const PLACEHOLDER_SIZE: u32 = 1024;

/// Fixed palette; the prompt hash picks the base color so the same prompt
/// always renders the same placeholder.
const PALETTE: [(u8, u8, u8); 5] = [
    (255, 99, 71),
    (70, 130, 180),
    (144, 238, 144),
    (255, 215, 0),
    (218, 112, 214),
];

fn prompt_hash(prompt: &str) -> u64 {
    // DefaultHasher::new() takes no random state, so equal prompts pick the
    // same palette entry within a process.
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    prompt.hash(&mut hasher);
    hasher.finish()
}

/// Render a patterned solid-color placeholder as PNG bytes.
pub fn render_placeholder(prompt: &str) -> Vec<u8> {
    let (r, g, b) = PALETTE[(prompt_hash(prompt) % PALETTE.len() as u64) as usize];
    let lighter = |c: u8| c.saturating_add(40);

    let mut img = RgbaImage::from_pixel(
        PLACEHOLDER_SIZE,
        PLACEHOLDER_SIZE,
        Rgba([r, g, b, 255]),
    );

    // Diagonal stripes plus a center band: unmistakably synthetic without
    // needing any font resource.
    let band_top = PLACEHOLDER_SIZE * 2 / 5;
    let band_bottom = PLACEHOLDER_SIZE * 3 / 5;
    for y in 0..PLACEHOLDER_SIZE {
        for x in 0..PLACEHOLDER_SIZE {
            let in_band = y >= band_top && y < band_bottom;
            let on_stripe = (x + y) % 128 < 16;
            if in_band {
                img.put_pixel(x, y, Rgba([lighter(r), lighter(g), lighter(b), 255]));
            } else if on_stripe {
                let px = img.get_pixel_mut(x, y);
                for c in 0..3 {
                    px.0[c] = (px.0[c] as f32 * 0.85) as u8;
                }
            }
        }
    }

    // Encoding an in-memory RGBA buffer to a Vec cannot fail.
    crate::compose::encode_png(&img).expect("in-memory PNG encode")
}
