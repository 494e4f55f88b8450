// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Raster preview of a part model's plan view
//!
//! The preview is scaled independently of the vector drawing so the longer
//! side lands near [`TARGET_PX`]. It always carries a caption, and states
//! "No geometry" explicitly rather than producing a blank canvas.

use crate::error::{DrawingError, Result};
use ab_glyph::{FontRef, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{draw_hollow_circle_mut, draw_line_segment_mut, draw_text_mut};
use sketchpart_model::PartModel;
use sketchpart_vision::Point2D;
use std::path::Path;
use tracing::debug;

pub const TARGET_PX: f64 = 1200.0;
pub const MIN_SCALE: f64 = 1.0;
pub const MAX_SCALE: f64 = 6.0;
pub const MARGIN_PX: f64 = 20.0;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const INK: Rgb<u8> = Rgb([0, 0, 0]);
const CAPTION: Rgb<u8> = Rgb([60, 60, 60]);
const NOTICE: Rgb<u8> = Rgb([80, 80, 80]);
const CAPTION_PX: f32 = 16.0;
const CAPTION_PITCH: f64 = 20.0;
const NOTICE_PX: f32 = 24.0;

/// DejaVu Sans Mono, see `assets/DejaVuSansMono-LICENSE.txt`
const FONT_BYTES: &[u8] = include_bytes!("../assets/DejaVuSansMono.ttf");

fn caption_font() -> Result<FontRef<'static>> {
    FontRef::try_from_slice(FONT_BYTES).map_err(|e| DrawingError::Font(e.to_string()))
}

/// Bounding box of everything the preview draws, in millimeters
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PreviewBounds {
    pub min: Point2D,
    pub max: Point2D,
}

impl PreviewBounds {
    /// Outline points, hole boxes and bend endpoints; 100x100 when empty
    pub fn of(model: &PartModel) -> Self {
        let geometry = &model.geometry;
        let mut points: Vec<Point2D> = geometry.outline.points_mm.clone();
        for hole in &geometry.holes {
            if let Some(r) = hole.radius_mm().filter(|r| *r > 0.0) {
                let c = hole.center_mm;
                points.push(Point2D::new(c.x - r, c.y - r));
                points.push(Point2D::new(c.x + r, c.y + r));
            }
        }
        if let Some(bend) = &geometry.bend {
            points.extend(bend.line_mm.iter().copied());
        }

        if points.is_empty() {
            return Self {
                min: Point2D::new(0.0, 0.0),
                max: Point2D::new(100.0, 100.0),
            };
        }
        let (mut min, mut max) = (points[0], points[0]);
        for p in &points[1..] {
            min.x = min.x.min(p.x);
            min.y = min.y.min(p.y);
            max.x = max.x.max(p.x);
            max.y = max.y.max(p.y);
        }
        Self { min, max }
    }

    /// Width and height, each floored to 1 mm when degenerate
    pub fn size(&self) -> (f64, f64) {
        let w = self.max.x - self.min.x;
        let h = self.max.y - self.min.y;
        (if w > 0.0 { w } else { 1.0 }, if h > 0.0 { h } else { 1.0 })
    }
}

/// Maps millimeters to pixels with y flipped
#[derive(Debug, Clone, Copy)]
struct PixelMap {
    bounds: PreviewBounds,
    scale: f64,
}

impl PixelMap {
    fn to_px(&self, p: &Point2D) -> (f32, f32) {
        let x = ((p.x - self.bounds.min.x) * self.scale + MARGIN_PX).round();
        let y = ((self.bounds.max.y - p.y) * self.scale + MARGIN_PX).round();
        (x as f32, y as f32)
    }
}

/// Pixels per millimeter for a model
pub fn preview_scale(bounds: &PreviewBounds) -> f64 {
    let (w, h) = bounds.size();
    (TARGET_PX / w.max(h)).clamp(MIN_SCALE, MAX_SCALE)
}

pub fn render_preview(model: &PartModel) -> Result<RgbImage> {
    let font = caption_font()?;
    let bounds = PreviewBounds::of(model);
    let scale = preview_scale(&bounds);
    let (w_mm, h_mm) = bounds.size();
    let width = (w_mm * scale + 2.0 * MARGIN_PX).round() as u32;
    let height = (h_mm * scale + 2.0 * MARGIN_PX).round() as u32;
    let map = PixelMap { bounds, scale };

    let mut canvas = RgbImage::from_pixel(width, height, WHITE);
    let geometry = &model.geometry;

    let outline: Vec<(f32, f32)> = geometry.outline.points_mm.iter().map(|p| map.to_px(p)).collect();
    if outline.len() >= 2 {
        for i in 0..outline.len() {
            thick_segment(&mut canvas, outline[i], outline[(i + 1) % outline.len()]);
        }
    }

    for hole in &geometry.holes {
        let Some(r) = hole.radius_mm() else {
            continue;
        };
        let radius_px = (r * scale).round() as i32;
        if radius_px <= 0 {
            continue;
        }
        let (cx, cy) = map.to_px(&hole.center_mm);
        let center = (cx as i32, cy as i32);
        draw_hollow_circle_mut(&mut canvas, center, radius_px, INK);
        if radius_px > 1 {
            draw_hollow_circle_mut(&mut canvas, center, radius_px - 1, INK);
        }
    }

    if let Some(bend) = &geometry.bend {
        draw_line_segment_mut(
            &mut canvas,
            map.to_px(&bend.line_mm[0]),
            map.to_px(&bend.line_mm[1]),
            INK,
        );
    }

    let part = if model.part.trim().is_empty() { "Part" } else { model.part.as_str() };
    let captions = [format!("PART: {part}"), format!("HOLES: {}", geometry.holes.len())];
    for (i, caption) in captions.iter().enumerate() {
        let top = height as f64 - MARGIN_PX - CAPTION_PX as f64 - 4.0 - i as f64 * CAPTION_PITCH;
        draw_text_mut(
            &mut canvas,
            CAPTION,
            MARGIN_PX as i32,
            top.round() as i32,
            PxScale::from(CAPTION_PX),
            &font,
            caption,
        );
    }

    if geometry.outline.points_mm.is_empty() && geometry.holes.is_empty() && geometry.bend.is_none() {
        let top = (MARGIN_PX + 8.0) as i32;
        draw_text_mut(&mut canvas, NOTICE, MARGIN_PX as i32, top, PxScale::from(NOTICE_PX), &font, "No geometry");
    }

    debug!(width, height, scale, "preview rendered");
    Ok(canvas)
}

/// Render and write the preview as PNG
pub fn save_preview(model: &PartModel, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    render_preview(model)?.save_with_format(path, image::ImageFormat::Png)?;
    Ok(())
}

/// Two-pixel line: the segment plus a copy shifted across its minor axis
fn thick_segment(canvas: &mut RgbImage, a: (f32, f32), b: (f32, f32)) {
    draw_line_segment_mut(canvas, a, b, INK);
    let (dx, dy) = ((b.0 - a.0).abs(), (b.1 - a.1).abs());
    let (ox, oy) = if dx >= dy { (0.0, 1.0) } else { (1.0, 0.0) };
    draw_line_segment_mut(canvas, (a.0 + ox, a.1 + oy), (b.0 + ox, b.1 + oy), INK);
}
