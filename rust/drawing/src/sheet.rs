// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Backend-neutral drawing sheet: layered 2D entities in millimeters

use sketchpart_vision::Point2D;

/// Drawing layers, in declaration order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Layer {
    Outline,
    Holes,
    Bend,
    Center,
    Hidden,
    Text,
    ViewFrame,
}

/// Dash pattern of a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineStyle {
    Continuous,
    Center,
    Hidden,
}

impl LineStyle {
    pub fn name(&self) -> &'static str {
        match self {
            LineStyle::Continuous => "CONTINUOUS",
            LineStyle::Center => "CENTER",
            LineStyle::Hidden => "HIDDEN",
        }
    }

    /// Dash/space lengths (negative = gap), `None` for solid lines
    pub fn pattern(&self) -> Option<&'static [f64]> {
        match self {
            LineStyle::Continuous => None,
            LineStyle::Center => Some(&[10.0, -2.0, 2.0, -2.0]),
            LineStyle::Hidden => Some(&[6.0, -3.0]),
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            LineStyle::Continuous => "Solid line",
            LineStyle::Center => "Center ____ _ ____ _ ____",
            LineStyle::Hidden => "Hidden __ __ __ __",
        }
    }
}

impl Layer {
    pub const ALL: [Layer; 7] = [
        Layer::Outline,
        Layer::Holes,
        Layer::Bend,
        Layer::Center,
        Layer::Hidden,
        Layer::Text,
        Layer::ViewFrame,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Layer::Outline => "OUTLINE",
            Layer::Holes => "HOLES",
            Layer::Bend => "BEND",
            Layer::Center => "CENTER",
            Layer::Hidden => "HIDDEN",
            Layer::Text => "TEXT",
            Layer::ViewFrame => "VIEW_FRAME",
        }
    }

    /// AutoCAD color index
    pub fn color_index(&self) -> u8 {
        match self {
            Layer::Bend => 2,
            Layer::Center => 3,
            Layer::Hidden | Layer::ViewFrame => 8,
            Layer::Outline | Layer::Holes | Layer::Text => 7,
        }
    }

    pub fn line_style(&self) -> LineStyle {
        match self {
            Layer::Bend | Layer::Center => LineStyle::Center,
            Layer::Hidden => LineStyle::Hidden,
            _ => LineStyle::Continuous,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Shape {
    Line { from: Point2D, to: Point2D },
    Circle { center: Point2D, radius: f64 },
    Polyline { points: Vec<Point2D>, closed: bool },
    Text { at: Point2D, height: f64, value: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Entity {
    pub layer: Layer,
    pub shape: Shape,
}

/// Ordered list of entities making up one drawing
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawingSheet {
    entities: Vec<Entity>,
}

impl DrawingSheet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, layer: Layer, shape: Shape) {
        self.entities.push(Entity { layer, shape });
    }

    pub fn line(&mut self, layer: Layer, from: Point2D, to: Point2D) {
        self.push(layer, Shape::Line { from, to });
    }

    pub fn circle(&mut self, layer: Layer, center: Point2D, radius: f64) {
        self.push(layer, Shape::Circle { center, radius });
    }

    /// Closed polyline; fewer than three points draws nothing
    pub fn closed_polyline(&mut self, layer: Layer, points: Vec<Point2D>) {
        if points.len() >= 3 {
            self.push(layer, Shape::Polyline { points, closed: true });
        }
    }

    pub fn rectangle(&mut self, layer: Layer, origin: Point2D, width: f64, height: f64) {
        self.closed_polyline(
            layer,
            vec![
                origin,
                Point2D::new(origin.x + width, origin.y),
                Point2D::new(origin.x + width, origin.y + height),
                Point2D::new(origin.x, origin.y + height),
            ],
        );
    }

    pub fn text(&mut self, at: Point2D, height: f64, value: impl Into<String>) {
        self.push(
            Layer::Text,
            Shape::Text {
                at,
                height,
                value: value.into(),
            },
        );
    }

    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    pub fn on_layer(&self, layer: Layer) -> impl Iterator<Item = &Entity> {
        self.entities.iter().filter(move |e| e.layer == layer)
    }

    /// Text values in insertion order
    pub fn texts(&self) -> Vec<&str> {
        self.entities
            .iter()
            .filter_map(|e| match &e.shape {
                Shape::Text { value, .. } => Some(value.as_str()),
                _ => None,
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_table() {
        let names: Vec<_> = Layer::ALL.iter().map(Layer::name).collect();
        assert_eq!(
            names,
            ["OUTLINE", "HOLES", "BEND", "CENTER", "HIDDEN", "TEXT", "VIEW_FRAME"]
        );
        assert_eq!(Layer::Hidden.line_style(), LineStyle::Hidden);
        assert_eq!(Layer::Bend.line_style().pattern(), Some(&[10.0, -2.0, 2.0, -2.0][..]));
    }

    #[test]
    fn test_degenerate_polyline_skipped() {
        let mut sheet = DrawingSheet::new();
        sheet.closed_polyline(Layer::Outline, vec![Point2D::new(0.0, 0.0), Point2D::new(1.0, 0.0)]);
        assert!(sheet.is_empty());
        sheet.rectangle(Layer::ViewFrame, Point2D::new(0.0, 0.0), 10.0, 5.0);
        assert_eq!(sheet.on_layer(Layer::ViewFrame).count(), 1);
    }
}
