//! Template matching of a captured element image against a screenshot
use crate::{codec, errors::VisualError, models::*};
use image::{imageops, GrayImage, Luma};
use imageproc::definitions::Image;
use imageproc::integral_image::{integral_image, integral_squared_image, sum_image_pixels};
use imageproc::template_matching::{match_template, MatchTemplateMethod};
use selfheal_core_types::BoundingBox;

/// Optional vision capability consumed by the visual healing strategy
pub trait VisionBackend: Send + Sync {
    /// Backend name for logs
    fn name(&self) -> &'static str;

    /// Best location of `template` inside `haystack`, both encoded images.
    ///
    /// Returns `Ok(None)` when no placement is possible (template larger than
    /// the screenshot, empty template).
    fn locate(&self, haystack: &[u8], template: &[u8]) -> Result<Option<VisualMatch>, VisualError>;
}

/// Grayscale zero-mean normalized cross-correlation matcher.
///
/// Both the template and every screenshot window have their mean removed
/// before normalizing, so flat or uniformly light regions score near zero
/// instead of near one.
#[derive(Debug, Clone, Default)]
pub struct TemplateMatcher {
    options: MatcherOptions,
}

impl TemplateMatcher {
    pub fn new(options: MatcherOptions) -> Self {
        Self { options }
    }

    fn downscale(&self, img: GrayImage) -> GrayImage {
        let factor = self.options.downscale.max(1);
        if factor == 1 {
            return img;
        }
        let width = (img.width() / factor).max(1);
        let height = (img.height() / factor).max(1);
        imageops::resize(&img, width, height, imageops::FilterType::Triangle)
    }
}

impl VisionBackend for TemplateMatcher {
    fn name(&self) -> &'static str {
        "template-ncc"
    }

    fn locate(&self, haystack: &[u8], template: &[u8]) -> Result<Option<VisualMatch>, VisualError> {
        let haystack = self.downscale(codec::decode(haystack)?.to_luma8());
        let template = self.downscale(codec::decode(template)?.to_luma8());

        if template.width() == 0
            || template.height() == 0
            || template.width() > haystack.width()
            || template.height() > haystack.height()
        {
            tracing::debug!(
                "Template {}x{} cannot be placed in {}x{} screenshot",
                template.width(),
                template.height(),
                haystack.width(),
                haystack.height()
            );
            return Ok(None);
        }

        let Some((x, y, confidence)) = best_zero_mean_match(&haystack, &template) else {
            return Ok(None);
        };
        if !confidence.is_finite() {
            return Err(VisualError::MatchFailed(
                "correlation produced a non-finite score".to_string(),
            ));
        }

        let scale = f64::from(self.options.downscale.max(1));
        let found = VisualMatch {
            bounding_box: BoundingBox::new(
                f64::from(x) * scale,
                f64::from(y) * scale,
                f64::from(template.width()) * scale,
                f64::from(template.height()) * scale,
            ),
            confidence: confidence.clamp(0.0, 1.0),
        };
        tracing::debug!(
            "Template best match at ({}, {}) confidence {:.3}",
            found.bounding_box.x,
            found.bounding_box.y,
            found.confidence
        );
        Ok(Some(found))
    }
}

/// Best placement by zero-mean NCC: `(x, y, score)`, score in [-1, 1].
///
/// The raw correlation sum comes from `match_template`; window sums and
/// squared sums come from integral images.
fn best_zero_mean_match(haystack: &GrayImage, template: &GrayImage) -> Option<(u32, u32, f64)> {
    let (tw, th) = template.dimensions();
    let n = f64::from(tw) * f64::from(th);

    let (t_sum, t_sq) = template.pixels().fold((0.0, 0.0), |(sum, sq), p| {
        let v = f64::from(p[0]);
        (sum + v, sq + v * v)
    });
    let t_var = t_sq - t_sum * t_sum / n;

    let raw = match_template(haystack, template, MatchTemplateMethod::CrossCorrelation);
    let sums: Image<Luma<i64>> = integral_image::<_, i64>(haystack);
    let squares: Image<Luma<i64>> = integral_squared_image::<_, i64>(haystack);

    let mut best: Option<(u32, u32, f64)> = None;
    for (x, y, cross) in raw.enumerate_pixels() {
        let (right, bottom) = (x + tw - 1, y + th - 1);
        let w_sum = sum_image_pixels(&sums, x, y, right, bottom)[0] as f64;
        let w_sq = sum_image_pixels(&squares, x, y, right, bottom)[0] as f64;
        let w_var = w_sq - w_sum * w_sum / n;

        let denom = (t_var * w_var).sqrt();
        // A flat template or window carries no pattern to correlate.
        let score = if denom > 1e-6 {
            ((f64::from(cross[0]) - t_sum * w_sum / n) / denom).clamp(-1.0, 1.0)
        } else {
            0.0
        };
        if best.map_or(true, |(_, _, top)| score > top) {
            best = Some((x, y, score));
        }
    }
    best
}
