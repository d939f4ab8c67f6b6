//! Deterministic screenshot rendering from `data-box` geometry.
//!
//! Every boxed element is painted in document order with a texture seeded by
//! its tag and text, so an element that only moved renders identical pixels at
//! its new position.

use image::{Rgba, RgbaImage};
use scraper::Html;

use crate::select::{all_elements, bounding_box, collapsed_text};

const BACKGROUND: Rgba<u8> = Rgba([255, 255, 255, 255]);
const BORDER: Rgba<u8> = Rgba([24, 24, 24, 255]);
const CELL: u32 = 3;

pub(crate) fn render(html: &Html, width: u32, height: u32) -> RgbaImage {
    let mut canvas = RgbaImage::from_pixel(width, height, BACKGROUND);
    for el in all_elements(html) {
        let Some(bbox) = bounding_box(el) else {
            continue;
        };
        if bbox.is_empty() {
            continue;
        }
        let seed = fnv1a(format!("{}|{}", el.value().name(), collapsed_text(el)).as_bytes());
        paint(&mut canvas, bbox.x, bbox.y, bbox.width, bbox.height, seed);
    }
    canvas
}

fn paint(canvas: &mut RgbaImage, x: f64, y: f64, width: f64, height: f64, seed: u64) {
    let x0 = x.round() as i64;
    let y0 = y.round() as i64;
    let w = width.round() as i64;
    let h = height.round() as i64;
    let fg = Rgba([
        (seed & 0xff) as u8,
        ((seed >> 8) & 0xff) as u8,
        ((seed >> 16) & 0xff) as u8,
        255,
    ]);
    let bg = Rgba([
        255 - fg[0] / 2,
        255 - fg[1] / 2,
        255 - fg[2] / 2,
        255,
    ]);

    // Only the part of the box inside the canvas is visited.
    let cols = x0.max(0)..(x0 + w).min(i64::from(canvas.width()));
    let rows = y0.max(0)..(y0 + h).min(i64::from(canvas.height()));
    for py in rows {
        let dy = py - y0;
        for px in cols.clone() {
            let dx = px - x0;
            let color = if dx == 0 || dy == 0 || dx == w - 1 || dy == h - 1 {
                BORDER
            } else {
                let cell = (dx as u64 / u64::from(CELL)) * 7 + (dy as u64 / u64::from(CELL)) * 13;
                if seed.rotate_left((cell % 64) as u32) & 1 == 1 {
                    fg
                } else {
                    bg
                }
            };
            canvas.put_pixel(px as u32, py as u32, color);
        }
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    let mut hash: u64 = 0xcbf2_9ce4_8422_2325;
    for byte in bytes {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(0x0100_0000_01b3);
    }
    hash
}
