use anyhow::{Context, Result};
use cardscan_capture::PixelRegion;
use image::{GrayImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, info, warn};

use crate::classifier::SymbolRecognizer;

/// Result of matching a symbol area against the templates
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchResult {
    pub label: String,
    /// Sum of absolute gray-level differences to the template
    pub distance: u64,
}

/// Black/white template of one class
struct SymbolTemplate {
    label: String,
    image: GrayImage,
}

/// Nearest-template matcher over binarized averaged samples.
///
/// Templates only come from averaging labeled training crops; there is no
/// way to render them from a font or glyph set.
pub struct TemplateMatcher {
    templates: Vec<SymbolTemplate>,
}

impl TemplateMatcher {
    /// Build one template per class by averaging its sample crops
    /// pixel-wise and binarizing the average.
    pub fn from_samples(groups: &BTreeMap<String, Vec<RgbaImage>>) -> Self {
        let templates = groups
            .iter()
            .filter_map(|(label, samples)| {
                let averaged = average_gray(samples)?;
                Some(SymbolTemplate {
                    label: label.clone(),
                    image: binarize_midpoint(&averaged),
                })
            })
            .collect::<Vec<_>>();

        info!("Built {} averaged template(s)", templates.len());
        Self { templates }
    }

    /// Load `<label>.png` templates from a directory. A missing directory
    /// gives an empty matcher.
    pub fn load(dir: &Path) -> Result<Self> {
        if !dir.exists() {
            warn!("No templates at {}", dir.display());
            return Ok(Self {
                templates: Vec::new(),
            });
        }

        let mut templates = Vec::new();
        for path in cardscan_capture::list_screenshots(dir)? {
            let Some(label) = path.file_stem().map(|s| s.to_string_lossy().to_string()) else {
                continue;
            };
            let img = image::open(&path)
                .with_context(|| format!("Failed to open {}", path.display()))?;
            templates.push(SymbolTemplate {
                label,
                image: img.to_luma8(),
            });
        }

        info!(
            "TemplateMatcher loaded {} templates from {}",
            templates.len(),
            dir.display()
        );
        Ok(Self { templates })
    }

    /// Write every template as `<label>.png`
    pub fn save(&self, dir: &Path) -> Result<()> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create {}", dir.display()))?;
        for tmpl in &self.templates {
            let path = dir.join(format!("{}.png", tmpl.label));
            tmpl.image
                .save(&path)
                .with_context(|| format!("Failed to write {}", path.display()))?;
        }
        debug!("Saved {} template(s) to {}", self.templates.len(), dir.display());
        Ok(())
    }

    /// Closest template to a cropped symbol area, lowest label on ties
    pub fn match_symbol(&self, crop: &RgbaImage) -> Option<MatchResult> {
        let query = binarize_midpoint(&image::imageops::grayscale(crop));

        let mut best: Option<MatchResult> = None;
        for tmpl in &self.templates {
            let distance = l1_distance(&query, &tmpl.image);
            let better = match &best {
                None => true,
                Some(b) => distance < b.distance || (distance == b.distance && tmpl.label < b.label),
            };
            if better {
                best = Some(MatchResult {
                    label: tmpl.label.clone(),
                    distance,
                });
            }
        }
        best
    }

    pub fn template_count(&self) -> usize {
        self.templates.len()
    }
}

impl SymbolRecognizer for TemplateMatcher {
    fn recognize(&self, frame: &RgbaImage, region: &PixelRegion, _threshold: u8) -> Option<String> {
        let crop = cardscan_capture::crop_region(frame, region);
        self.match_symbol(&crop).map(|m| m.label)
    }
}

/// Pixel-wise mean luma of same-sized samples; None for no samples
fn average_gray(samples: &[RgbaImage]) -> Option<GrayImage> {
    let first = samples.first()?;
    let (w, h) = first.dimensions();
    let grays: Vec<GrayImage> = samples
        .iter()
        .filter(|s| s.dimensions() == (w, h))
        .map(image::imageops::grayscale)
        .collect();
    let n = grays.len() as u64;

    Some(GrayImage::from_fn(w, h, |x, y| {
        let sum: u64 = grays.iter().map(|g| g.get_pixel(x, y)[0] as u64).sum();
        image::Luma([(sum / n) as u8])
    }))
}

/// Black below the midpoint of the darkest and brightest value, white otherwise
fn binarize_midpoint(gray: &GrayImage) -> GrayImage {
    let min = gray.pixels().map(|p| p[0]).min().unwrap_or(0) as u16;
    let max = gray.pixels().map(|p| p[0]).max().unwrap_or(0) as u16;
    let mid = ((min + max) / 2) as u8;

    GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
        if gray.get_pixel(x, y)[0] < mid {
            image::Luma([0u8])
        } else {
            image::Luma([255u8])
        }
    })
}

/// Sum of absolute differences. The query is resized to the template first
/// when their sizes differ.
fn l1_distance(query: &GrayImage, tmpl: &GrayImage) -> u64 {
    let resized;
    let query = if query.dimensions() == tmpl.dimensions() {
        query
    } else {
        resized = image::imageops::resize(
            query,
            tmpl.width(),
            tmpl.height(),
            image::imageops::FilterType::Nearest,
        );
        &resized
    };

    query
        .pixels()
        .zip(tmpl.pixels())
        .map(|(a, b)| a[0].abs_diff(b[0]) as u64)
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// White 6x6 area with a dark vertical or horizontal bar
    fn bar(vertical: bool, shade: u8) -> RgbaImage {
        RgbaImage::from_fn(6, 6, |x, y| {
            let on = if vertical { x == 2 || x == 3 } else { y == 2 || y == 3 };
            if on {
                image::Rgba([shade, shade, shade, 255])
            } else {
                image::Rgba([240, 240, 240, 255])
            }
        })
    }

    fn matcher() -> TemplateMatcher {
        let mut groups = BTreeMap::new();
        groups.insert("v".to_string(), vec![bar(true, 10), bar(true, 40)]);
        groups.insert("h".to_string(), vec![bar(false, 20)]);
        TemplateMatcher::from_samples(&groups)
    }

    #[test]
    fn test_binarize_midpoint() {
        let img = GrayImage::from_fn(3, 1, |x, _| image::Luma([[10u8, 100, 200][x as usize]]));
        let bin = binarize_midpoint(&img);
        assert_eq!(bin.get_pixel(0, 0)[0], 0);
        assert_eq!(bin.get_pixel(1, 0)[0], 0);
        assert_eq!(bin.get_pixel(2, 0)[0], 255);
    }

    #[test]
    fn test_average_gray() {
        let avg = average_gray(&[bar(true, 10), bar(true, 40)]).unwrap();
        assert_eq!(avg.get_pixel(2, 0)[0], 25);
        assert!(average_gray(&[]).is_none());
    }

    #[test]
    fn test_match_nearest() {
        let m = matcher();
        assert_eq!(m.template_count(), 2);

        let result = m.match_symbol(&bar(true, 90)).unwrap();
        assert_eq!(result.label, "v");
        assert_eq!(result.distance, 0);
        assert_eq!(m.match_symbol(&bar(false, 0)).unwrap().label, "h");
    }

    #[test]
    fn test_empty_matcher_returns_none() {
        let m = TemplateMatcher::from_samples(&BTreeMap::new());
        assert!(m.match_symbol(&bar(true, 0)).is_none());
    }

    #[test]
    fn test_recognize_region() {
        let m = matcher();
        let mut frame = RgbaImage::from_pixel(20, 20, image::Rgba([240, 240, 240, 255]));
        image::imageops::replace(&mut frame, &bar(false, 30), 7, 9);
        let region = PixelRegion::new(7, 9, 6, 6);
        assert_eq!(m.recognize(&frame, &region, 120), Some("h".to_string()));
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        matcher().save(dir.path()).unwrap();
        let loaded = TemplateMatcher::load(dir.path()).unwrap();
        assert_eq!(loaded.template_count(), 2);
        assert_eq!(loaded.match_symbol(&bar(true, 0)).unwrap().label, "v");
    }

    #[test]
    fn test_load_missing_dir() {
        let m = TemplateMatcher::load(Path::new("/nonexistent/templates")).unwrap();
        assert_eq!(m.template_count(), 0);
    }
}
