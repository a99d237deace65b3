// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Document boundary detection.
//
// Detection runs on a downscaled working image. Each strategy proposes
// quadrilaterals in working coordinates; proposals are gated and scored
// uniformly, and the single best one is mapped back to the full image.

pub mod contour;
pub mod lines;
pub mod prepare;
pub mod score;

use docscan_core::config::DetectorConfig;
use docscan_core::error::Result;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::geometry::Quadrilateral;
use crate::image::RasterImage;

pub use contour::ContourStrategy;
pub use lines::HoughLineStrategy;
pub use prepare::PreparedImage;
pub use score::{ScoreBreakdown, score_proposal};

/// A detected document boundary, not yet confirmed by the user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectionCandidate {
    /// Boundary in full-resolution pixel space.
    pub quad: Quadrilateral,
    /// Composite plausibility in `[0, 1]`.
    pub score: f64,
    pub source_width: u32,
    pub source_height: u32,
    /// Name of the strategy that proposed it.
    pub strategy: String,
}

/// A way of proposing document boundaries from a prepared image.
pub trait DetectionStrategy: Send + Sync {
    fn name(&self) -> &'static str;

    /// Candidate quadrilaterals in working coordinates. Proposals need not be
    /// plausible; the detector gates and scores them.
    fn propose(&self, prepared: &PreparedImage, cfg: &DetectorConfig) -> Result<Vec<Quadrilateral>>;
}

/// Anything that can look for a document in an image.
///
/// `Ok(None)` means no plausible boundary, which is not an error.
pub trait QuadDetector: Send + Sync {
    fn detect(&self, image: &RasterImage) -> Result<Option<DetectionCandidate>>;
}

/// Runs every strategy and keeps the best-scoring proposal.
pub struct DocumentDetector {
    config: DetectorConfig,
    strategies: Vec<Box<dyn DetectionStrategy>>,
}

impl DocumentDetector {
    /// Contour tracing first, Hough lines as the fallback.
    pub fn new(config: DetectorConfig) -> Self {
        Self {
            config,
            strategies: vec![Box::new(ContourStrategy), Box::new(HoughLineStrategy)],
        }
    }

    /// A detector with an explicit strategy list.
    pub fn with_strategies(config: DetectorConfig, strategies: Vec<Box<dyn DetectionStrategy>>) -> Self {
        Self { config, strategies }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    pub fn strategy_names(&self) -> Vec<&'static str> {
        self.strategies.iter().map(|s| s.name()).collect()
    }
}

impl Default for DocumentDetector {
    fn default() -> Self {
        Self::new(DetectorConfig::default())
    }
}

impl QuadDetector for DocumentDetector {
    #[instrument(skip_all, fields(width = image.width(), height = image.height()))]
    fn detect(&self, image: &RasterImage) -> Result<Option<DetectionCandidate>> {
        image.validate()?;
        let prepared = PreparedImage::new(image, &self.config);

        let mut best: Option<(Quadrilateral, ScoreBreakdown, &'static str)> = None;
        for strategy in &self.strategies {
            let proposals = match strategy.propose(&prepared, &self.config) {
                Ok(p) => p,
                Err(err) => {
                    warn!(strategy = strategy.name(), error = %err, "Detection strategy failed; skipping");
                    continue;
                }
            };

            let total = proposals.len();
            let mut accepted = 0usize;
            for quad in proposals {
                let Some(score) = score_proposal(&quad, &prepared, &self.config) else {
                    continue;
                };
                accepted += 1;
                if best.as_ref().is_none_or(|(_, b, _)| score.total > b.total) {
                    best = Some((quad, score, strategy.name()));
                }
            }
            debug!(strategy = strategy.name(), total, accepted, "Proposals scored");
        }

        let Some((quad, score, strategy)) = best else {
            info!("No document boundary found");
            return Ok(None);
        };
        if score.total < self.config.min_score {
            info!(score = score.total, min_score = self.config.min_score, "Best boundary below threshold");
            return Ok(None);
        }

        let quad = quad.scaled(prepared.scale);
        // Scaling keeps the shape; the frame check guards the area floor.
        if quad.validate_for(image.width(), image.height()).is_err() {
            return Ok(None);
        }

        info!(
            score = score.total,
            strategy,
            corners = ?quad.to_array(),
            "Document boundary detected"
        );
        Ok(Some(DetectionCandidate {
            quad,
            score: score.total,
            source_width: image.width(),
            source_height: image.height(),
            strategy: strategy.to_owned(),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docscan_core::error::ScanError;
    use image::{DynamicImage, GrayImage, Luma, Rgb, RgbImage};
    use imageproc::drawing::draw_polygon_mut;
    use imageproc::point::Point;
    use rand::prelude::*;

    struct Failing;

    impl DetectionStrategy for Failing {
        fn name(&self) -> &'static str {
            "failing"
        }

        fn propose(&self, _: &PreparedImage, _: &DetectorConfig) -> Result<Vec<Quadrilateral>> {
            Err(ScanError::Internal("boom".into()))
        }
    }

    fn page_photo(w: u32, h: u32, poly: &[Point<i32>]) -> RasterImage {
        let mut img = RgbImage::from_pixel(w, h, Rgb([45, 50, 60]));
        draw_polygon_mut(&mut img, poly, Rgb([235, 232, 225]));
        RasterImage::from_dynamic(DynamicImage::ImageRgb8(img)).unwrap()
    }

    #[test]
    fn detects_page_in_large_photo() {
        let poly = [
            Point::new(150, 190),
            Point::new(1060, 170),
            Point::new(1080, 1430),
            Point::new(130, 1410),
        ];
        let image = page_photo(1200, 1600, &poly);
        let candidate = DocumentDetector::default().detect(&image).unwrap().unwrap();

        assert!(candidate.score >= 0.5);
        assert_eq!((candidate.source_width, candidate.source_height), (1200, 1600));
        for ((x, y), p) in candidate.quad.to_array().iter().zip(poly.iter()) {
            assert!((x - p.x as f64).abs() < 12.0, "x {x} vs {}", p.x);
            assert!((y - p.y as f64).abs() < 12.0, "y {y} vs {}", p.y);
        }
    }

    #[test]
    fn uniform_image_has_no_candidate() {
        let image = RasterImage::from_dynamic(DynamicImage::ImageLuma8(GrayImage::from_pixel(
            640,
            480,
            Luma([180u8]),
        )))
        .unwrap();
        assert!(DocumentDetector::default().detect(&image).unwrap().is_none());
    }

    #[test]
    fn failing_strategy_does_not_stop_the_others() {
        let poly = [
            Point::new(40, 40),
            Point::new(260, 50),
            Point::new(250, 340),
            Point::new(30, 330),
        ];
        let image = page_photo(300, 380, &poly);
        let detector = DocumentDetector::with_strategies(
            DetectorConfig::default(),
            vec![Box::new(Failing), Box::new(ContourStrategy)],
        );
        let candidate = detector.detect(&image).unwrap().unwrap();
        assert_eq!(candidate.strategy, "contour");
    }

    #[test]
    fn only_failing_strategies_mean_no_candidate() {
        let image = page_photo(
            200,
            200,
            &[Point::new(20, 20), Point::new(180, 20), Point::new(180, 180), Point::new(20, 180)],
        );
        let detector = DocumentDetector::with_strategies(DetectorConfig::default(), vec![Box::new(Failing)]);
        assert!(detector.detect(&image).unwrap().is_none());
    }

    /// Random polygons on random backgrounds, sprinkled with impulse noise.
    fn cluttered_photo(rng: &mut StdRng) -> RasterImage {
        let (w, h) = (rng.gen_range(160..360u32), rng.gen_range(160..360u32));
        let background = rng.gen_range(0..=255u8);
        let mut img = GrayImage::from_pixel(w, h, Luma([background]));

        for _ in 0..rng.gen_range(0..=3) {
            let mut poly: Vec<Point<i32>> = (0..rng.gen_range(3..=7))
                .map(|_| Point::new(rng.gen_range(0..w as i32), rng.gen_range(0..h as i32)))
                .collect();
            poly.dedup();
            if poly.len() < 3 {
                continue;
            }
            if poly[0] == poly[poly.len() - 1] {
                poly.pop();
            }
            draw_polygon_mut(&mut img, &poly, Luma([rng.gen_range(0..=255u8)]));
        }

        for _ in 0..(w * h / 50) {
            let (x, y) = (rng.gen_range(0..w), rng.gen_range(0..h));
            img.put_pixel(x, y, Luma([rng.gen_range(0..=255u8)]));
        }
        RasterImage::from_dynamic(DynamicImage::ImageLuma8(img)).unwrap()
    }

    #[test]
    fn never_returns_a_degenerate_quad() {
        let detector = DocumentDetector::default();
        let mut rng = StdRng::seed_from_u64(20_261_019);

        for round in 0..24 {
            let image = cluttered_photo(&mut rng);
            let (w, h) = (image.width(), image.height());
            let Some(candidate) = detector.detect(&image).unwrap() else {
                continue;
            };
            let quad = &candidate.quad;
            assert!(quad.is_convex(), "round {round}: {quad:?}");
            assert!(quad.validate_for(w, h).is_ok(), "round {round}: {quad:?} in {w}x{h}");
            assert!(candidate.score >= detector.config().min_score, "round {round}");
        }
    }

    #[test]
    fn default_strategy_order() {
        assert_eq!(DocumentDetector::default().strategy_names(), vec!["contour", "hough"]);
    }
}
