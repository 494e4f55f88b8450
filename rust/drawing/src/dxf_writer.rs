// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! DXF export (R2010, millimeters)

use crate::error::{DrawingError, Result};
use crate::sheet::{DrawingSheet, Layer, LineStyle, Shape};
use dxf::entities::{Circle, Entity, EntityType, Line, LwPolyline, Text};
use dxf::enums::{AcadVersion, Units};
use dxf::tables::LineType;
use dxf::{Color, Drawing, LwPolylineVertex, Point};
use std::path::Path;

/// Convert a sheet into a DXF drawing with the full layer table
pub fn to_dxf(sheet: &DrawingSheet) -> Drawing {
    let mut drawing = Drawing::new();
    drawing.header.version = AcadVersion::R2010;
    drawing.header.default_drawing_units = Units::Millimeters;

    for style in [LineStyle::Center, LineStyle::Hidden] {
        let Some(pattern) = style.pattern() else {
            continue;
        };
        let mut line_type = LineType::default();
        line_type.name = style.name().to_string();
        line_type.description = style.description().to_string();
        line_type.total_pattern_length = pattern.iter().map(|v| v.abs()).sum();
        line_type.dash_dot_space_lengths = pattern.to_vec();
        drawing.add_line_type(line_type);
    }

    // Every layer is declared, used or not
    for layer in Layer::ALL {
        let mut dxf_layer = dxf::tables::Layer::default();
        dxf_layer.name = layer.name().to_string();
        dxf_layer.color = Color::from_index(layer.color_index());
        dxf_layer.line_type_name = layer.line_style().name().to_string();
        drawing.add_layer(dxf_layer);
    }

    for entity in sheet.entities() {
        let specific = match &entity.shape {
            Shape::Line { from, to } => {
                let mut line = Line::default();
                line.p1 = Point::new(from.x, from.y, 0.0);
                line.p2 = Point::new(to.x, to.y, 0.0);
                EntityType::Line(line)
            }
            Shape::Circle { center, radius } => {
                let mut circle = Circle::default();
                circle.center = Point::new(center.x, center.y, 0.0);
                circle.radius = *radius;
                EntityType::Circle(circle)
            }
            Shape::Polyline { points, closed } => {
                let mut poly = LwPolyline::default();
                poly.set_is_closed(*closed);
                poly.vertices = points
                    .iter()
                    .map(|p| {
                        let mut vertex = LwPolylineVertex::default();
                        vertex.x = p.x;
                        vertex.y = p.y;
                        vertex
                    })
                    .collect();
                EntityType::LwPolyline(poly)
            }
            Shape::Text { at, height, value } => {
                let mut text = Text::default();
                text.location = Point::new(at.x, at.y, 0.0);
                text.text_height = *height;
                text.value = value.clone();
                EntityType::Text(text)
            }
        };

        let mut dxf_entity = Entity::new(specific);
        dxf_entity.common.layer = entity.layer.name().to_string();
        drawing.add_entity(dxf_entity);
    }

    drawing
}

/// Write the sheet as a DXF file, creating parent directories
pub fn write_dxf(sheet: &DrawingSheet, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    to_dxf(sheet)
        .save_file(path)
        .map_err(|e| DrawingError::Dxf(e.to_string()))
}
