// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Sketch feature extraction
//!
//! Turns a raster sketch or photo of a flat part into pixel-space features:
//! 1. Preprocessing (blur, inverse Otsu threshold, closing, Canny)
//! 2. Outline as the largest external contour
//! 3. Holes through an ordered chain of detection strategies
//! 4. Bend lines as long straight segments inside the outline
//!
//! # Usage
//!
//! ```rust,ignore
//! use sketchpart_vision::{FeatureExtractor, FeatureNormalizer};
//!
//! let raw = FeatureExtractor::default().extract_path("bracket.png")?;
//! let features = FeatureNormalizer.normalize_raw(&raw);
//! println!("{} holes", features.holes().len());
//! ```

pub mod circle_ops;
pub mod contour_ops;
pub mod error;
pub mod hole_detector;
pub mod image_ops;
pub mod line_ops;
pub mod normalize;
pub mod types;

pub use error::{Result, VisionError};
pub use hole_detector::{HoleDetection, HoleDetector, HoleStrategy, HoleTier};
pub use normalize::{CanonicalFeatureSet, FeatureNormalizer};
pub use types::{
    BendLine, DetectionConfig, Hole, Outline, OutlineKind, Point2D, RawFeatureSet,
};

use contour_ops::{resample_uniform, ContourSet};
use hole_detector::HoleContext;
use image::DynamicImage;
use std::path::Path;
use tracing::{debug, info};

/// Raster image to [`RawFeatureSet`]
#[derive(Debug, Clone, Default)]
pub struct FeatureExtractor {
    config: DetectionConfig,
}

impl FeatureExtractor {
    pub fn new(config: DetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectionConfig {
        &self.config
    }

    /// Decode a PNG, JPEG or BMP file and extract its features
    ///
    /// Fails only when the file cannot be read or decoded.
    pub fn extract_path(&self, path: impl AsRef<Path>) -> Result<RawFeatureSet> {
        let path = path.as_ref();
        let decode_error = |message: String| VisionError::ImageDecode {
            path: path.to_path_buf(),
            message,
        };

        let image = image::ImageReader::open(path)?
            .with_guessed_format()?
            .decode()
            .map_err(|e| decode_error(e.to_string()))?;

        info!(
            path = %path.display(),
            width = image.width(),
            height = image.height(),
            "decoded sketch"
        );
        Ok(self.extract(&image))
    }

    /// Extract features from an already decoded image
    pub fn extract(&self, image: &DynamicImage) -> RawFeatureSet {
        let pre = image_ops::preprocess(image, &self.config);
        let contours = ContourSet::trace(&pre.binary);

        let outline_points = contours
            .largest(&contours.top_level())
            .map(|i| contours.get(i).points.clone())
            .filter(|points| points.len() >= 3)
            .map(|points| resample_uniform(&points, self.config.outline_max_points))
            .unwrap_or_default();

        let outline = Outline {
            kind: OutlineKind::from_point_count(outline_points.len()),
            points: outline_points.iter().map(Point2D::from_nalgebra).collect(),
        };

        let ctx = HoleContext {
            gray: &pre.gray,
            contours: &contours,
            config: &self.config,
        };
        let holes = HoleDetector::default().detect(&ctx).into_holes();

        let bend_lines = line_ops::detect_bend_lines(&pre.edges, &outline_points, &self.config);

        debug!(
            outline_points = outline.points.len(),
            holes = holes.len(),
            bend_lines = bend_lines.len(),
            "features extracted"
        );

        RawFeatureSet {
            outline,
            holes,
            bend_lines,
            ..Default::default()
        }
    }
}
