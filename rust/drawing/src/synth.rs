// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Part model to multi-view drawing sheet

use crate::layout::ViewLayout;
use crate::sheet::{DrawingSheet, Layer};
use sketchpart_model::PartModel;
use sketchpart_vision::Point2D;
use tracing::debug;

pub const TEXT_HEIGHT: f64 = 3.0;
/// Centerline overshoot beyond the hole radius
const CENTERLINE_OVERSHOOT: f64 = 3.0;
const LABEL_OFFSET: f64 = 6.0;
const ANNOTATION_LINE_PITCH: f64 = 5.0;

/// Builds the Top/Front/Right views plus the annotation block
#[derive(Debug, Clone, Copy, Default)]
pub struct DrawingSynthesizer;

impl DrawingSynthesizer {
    pub fn synthesize(&self, model: &PartModel) -> DrawingSheet {
        let layout = ViewLayout::for_model(model);
        let mut sheet = DrawingSheet::new();

        self.top_view(model, &layout, &mut sheet);
        self.front_view(model, &layout, &mut sheet);
        self.right_view(model, &layout, &mut sheet);
        self.view_frames(&layout, &mut sheet);
        self.annotations(model, &layout, &mut sheet);

        debug!(
            entities = sheet.entities().len(),
            width = layout.width,
            depth = layout.depth,
            thickness = layout.thickness,
            "drawing synthesized"
        );
        sheet
    }

    fn top_view(&self, model: &PartModel, layout: &ViewLayout, sheet: &mut DrawingSheet) {
        let geometry = &model.geometry;
        sheet.closed_polyline(
            Layer::Outline,
            geometry.outline.points_mm.iter().map(|p| layout.to_top(p)).collect(),
        );

        for hole in &geometry.holes {
            let Some(r) = hole.radius_mm().filter(|r| *r > 0.0) else {
                continue;
            };
            let c = layout.to_top(&hole.center_mm);
            sheet.circle(Layer::Holes, c, r);
            let reach = r + CENTERLINE_OVERSHOOT;
            sheet.line(
                Layer::Center,
                Point2D::new(c.x - reach, c.y),
                Point2D::new(c.x + reach, c.y),
            );
            sheet.line(
                Layer::Center,
                Point2D::new(c.x, c.y - reach),
                Point2D::new(c.x, c.y + reach),
            );
        }

        // Bends only show in plan
        if let Some(bend) = &geometry.bend {
            sheet.line(
                Layer::Bend,
                layout.to_top(&bend.line_mm[0]),
                layout.to_top(&bend.line_mm[1]),
            );
        }
    }

    fn front_view(&self, model: &PartModel, layout: &ViewLayout, sheet: &mut DrawingSheet) {
        let o = layout.front_origin;
        sheet.rectangle(Layer::Outline, o, layout.width, layout.thickness);
        for hole in &model.geometry.holes {
            let Some(r) = hole.radius_mm().filter(|r| *r > 0.0) else {
                continue;
            };
            let cx = layout.front_x(hole.center_mm.x);
            hidden_pair(sheet, o, cx, r, layout.thickness);
        }
    }

    fn right_view(&self, model: &PartModel, layout: &ViewLayout, sheet: &mut DrawingSheet) {
        let o = layout.right_origin;
        sheet.rectangle(Layer::Outline, o, layout.depth, layout.thickness);
        for hole in &model.geometry.holes {
            let Some(r) = hole.radius_mm().filter(|r| *r > 0.0) else {
                continue;
            };
            let cx = layout.right_x(hole.center_mm.y);
            hidden_pair(sheet, o, cx, r, layout.thickness);
        }
    }

    fn view_frames(&self, layout: &ViewLayout, sheet: &mut DrawingSheet) {
        sheet.rectangle(Layer::ViewFrame, layout.top_origin, layout.width, layout.depth);
        sheet.rectangle(Layer::ViewFrame, layout.front_origin, layout.width, layout.thickness);
        sheet.rectangle(Layer::ViewFrame, layout.right_origin, layout.depth, layout.thickness);

        let label = |o: Point2D, h: f64| Point2D::new(o.x, o.y + h + LABEL_OFFSET);
        sheet.text(label(layout.top_origin, layout.depth), TEXT_HEIGHT, "TOP VIEW");
        sheet.text(label(layout.front_origin, layout.thickness), TEXT_HEIGHT, "FRONT VIEW");
        sheet.text(label(layout.right_origin, layout.thickness), TEXT_HEIGHT, "RIGHT VIEW");
    }

    fn annotations(&self, model: &PartModel, layout: &ViewLayout, sheet: &mut DrawingSheet) {
        let origin = layout.annotation_origin();
        for (i, line) in annotation_lines(model, layout).into_iter().enumerate() {
            let at = Point2D::new(origin.x, origin.y - ANNOTATION_LINE_PITCH * i as f64);
            sheet.text(at, TEXT_HEIGHT, line);
        }
    }
}

/// Part name, material, size, holes and bend, one entry per text line
pub fn annotation_lines(model: &PartModel, layout: &ViewLayout) -> Vec<String> {
    let t = layout.thickness;
    let mut lines = vec![
        format!("PART: {}", model.part),
        format!("MAT: {} t={}", model.material.name, t),
        format!(
            "SIZE: W={:.2} D={:.2} T={:.2}",
            layout.width, layout.depth, t
        ),
    ];

    let holes = &model.geometry.holes;
    let standard = holes.first().map(|h| h.standard.as_str()).unwrap_or("-");
    lines.push(format!("HOLES: {}x {}", holes.len(), standard));

    if let Some(bend) = &model.geometry.bend {
        lines.push(format!(
            "BEND: {}deg R={}",
            bend.angle_deg, bend.inner_radius_mm
        ));
    }
    lines
}

/// Two dashed verticals at the hole edges, through the full thickness
fn hidden_pair(sheet: &mut DrawingSheet, origin: Point2D, cx: f64, r: f64, thickness: f64) {
    for x in [cx - r, cx + r] {
        sheet.line(
            Layer::Hidden,
            Point2D::new(x, origin.y),
            Point2D::new(x, origin.y + thickness),
        );
    }
}
