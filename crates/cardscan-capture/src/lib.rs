use anyhow::{bail, Context, Result};
use image::RgbaImage;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

pub const LAYOUT_FILE: &str = "layout.json";

/// Pixel rectangle inside a screenshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelRegion {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl PixelRegion {
    pub const fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Same rectangle moved right by `dx` pixels
    pub fn shifted(&self, dx: u32) -> Self {
        Self {
            x: self.x + dx,
            ..*self
        }
    }

    /// True when the whole rectangle lies inside a `width` x `height` frame
    pub fn fits(&self, width: u32, height: u32) -> bool {
        self.x as u64 + self.width as u64 <= width as u64
            && self.y as u64 + self.height as u64 <= height as u64
    }
}

/// Single pixel position inside a screenshot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PixelPoint {
    pub x: u32,
    pub y: u32,
}

/// Fixed geometry of the card table in a screenshot.
///
/// Every card slot shares the same rank/suit areas, shifted horizontally
/// by the slot's entry in `card_offsets_x`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableLayout {
    pub card_offsets_x: Vec<u32>,
    pub rank_area: PixelRegion,
    pub suit_area: PixelRegion,
    /// Dark here means the slot (and every slot after it) is empty
    pub background_probe: PixelPoint,
    /// Blue channel values strictly below this count as ink
    pub ink_threshold: u8,
}

impl Default for TableLayout {
    fn default() -> Self {
        Self {
            card_offsets_x: vec![0, 72, 143, 215, 287],
            rank_area: PixelRegion::new(148, 590, 30, 25),
            suit_area: PixelRegion::new(170, 633, 30, 35),
            background_probe: PixelPoint { x: 153, y: 650 },
            ink_threshold: 120,
        }
    }
}

impl TableLayout {
    /// Read a layout from a JSON file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let layout: TableLayout = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        if layout.card_offsets_x.is_empty() {
            bail!("{} defines no card slots", path.display());
        }
        Ok(layout)
    }

    /// Load `layout.json` from the data directory, or the default table layout
    pub fn load_or_default(data_dir: &Path) -> Result<Self> {
        let path = data_dir.join(LAYOUT_FILE);
        if path.exists() {
            let layout = Self::load(&path)?;
            info!(
                "Loaded table layout with {} slot(s) from {}",
                layout.card_offsets_x.len(),
                path.display()
            );
            Ok(layout)
        } else {
            warn!("No layout at {}. Using default table layout", path.display());
            Ok(Self::default())
        }
    }

    pub fn slot_count(&self) -> usize {
        self.card_offsets_x.len()
    }

    /// Rank area of the given slot, or None past the last slot
    pub fn rank_region(&self, slot: usize) -> Option<PixelRegion> {
        self.card_offsets_x
            .get(slot)
            .map(|&dx| self.rank_area.shifted(dx))
    }

    /// Suit area of the given slot, or None past the last slot
    pub fn suit_region(&self, slot: usize) -> Option<PixelRegion> {
        self.card_offsets_x
            .get(slot)
            .map(|&dx| self.suit_area.shifted(dx))
    }

    /// Background probe of the given slot, or None past the last slot
    pub fn background_point(&self, slot: usize) -> Option<PixelPoint> {
        self.card_offsets_x.get(slot).map(|&dx| PixelPoint {
            x: self.background_probe.x + dx,
            y: self.background_probe.y,
        })
    }

    /// Fail unless every slot's rank area, suit area and background probe
    /// lies inside the frame.
    pub fn check_frame(&self, frame: &RgbaImage) -> Result<()> {
        let (w, h) = frame.dimensions();
        for slot in 0..self.slot_count() {
            for (kind, region) in [("rank", self.rank_region(slot)), ("suit", self.suit_region(slot))] {
                if let Some(r) = region.filter(|r| !r.fits(w, h)) {
                    bail!(
                        "Frame is {}x{} but slot {} {} area is {}x{} at ({}, {})",
                        w,
                        h,
                        slot,
                        kind,
                        r.width,
                        r.height,
                        r.x,
                        r.y
                    );
                }
            }
            if let Some(p) = self.background_point(slot).filter(|p| p.x >= w || p.y >= h) {
                bail!(
                    "Frame is {}x{} but slot {} background probe is at ({}, {})",
                    w,
                    h,
                    slot,
                    p.x,
                    p.y
                );
            }
        }
        Ok(())
    }
}

/// Open a screenshot as RGBA
pub fn load_screenshot(path: &Path) -> Result<RgbaImage> {
    let img = image::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    Ok(img.to_rgba8())
}

/// All `.png` files in a directory, sorted by file name
pub fn list_screenshots(dir: &Path) -> Result<Vec<PathBuf>> {
    let entries =
        std::fs::read_dir(dir).with_context(|| format!("Failed to list {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .with_context(|| format!("Failed to read entry in {}", dir.display()))?
            .path();
        let is_png = path
            .extension()
            .map_or(false, |ext| ext.eq_ignore_ascii_case("png"));
        if path.is_file() && is_png {
            files.push(path);
        }
    }
    files.sort();

    debug!("Found {} screenshot(s) in {}", files.len(), dir.display());
    Ok(files)
}

/// Crop a pixel region from a screenshot
pub fn crop_region(frame: &RgbaImage, region: &PixelRegion) -> RgbaImage {
    let (w, h) = (frame.width(), frame.height());

    // Clamp to image bounds
    let x = region.x.min(w.saturating_sub(1));
    let y = region.y.min(h.saturating_sub(1));
    let rw = region.width.min(w - x);
    let rh = region.height.min(h - y);

    image::imageops::crop_imm(frame, x, y, rw, rh).to_image()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slot_regions() {
        let layout = TableLayout::default();
        assert_eq!(layout.slot_count(), 5);
        assert_eq!(
            layout.rank_region(1),
            Some(PixelRegion::new(220, 590, 30, 25))
        );
        assert_eq!(
            layout.suit_region(4),
            Some(PixelRegion::new(457, 633, 30, 35))
        );
        assert_eq!(layout.background_point(2), Some(PixelPoint { x: 296, y: 650 }));
        assert!(layout.rank_region(5).is_none());
    }

    #[test]
    fn test_crop_region() {
        let img = RgbaImage::from_fn(40, 30, |x, y| image::Rgba([x as u8, y as u8, 0, 255]));
        let cropped = crop_region(&img, &PixelRegion::new(10, 5, 8, 4));
        assert_eq!(cropped.dimensions(), (8, 4));
        assert_eq!(cropped.get_pixel(0, 0)[0], 10);
        assert_eq!(cropped.get_pixel(7, 3)[1], 8);
    }

    #[test]
    fn test_crop_region_clamped() {
        let img = RgbaImage::new(20, 20);
        let cropped = crop_region(&img, &PixelRegion::new(15, 15, 10, 10));
        assert_eq!(cropped.dimensions(), (5, 5));
    }

    #[test]
    fn test_layout_load_or_default() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            TableLayout::load_or_default(dir.path()).unwrap(),
            TableLayout::default()
        );

        let custom = TableLayout {
            card_offsets_x: vec![0, 50],
            ink_threshold: 90,
            ..TableLayout::default()
        };
        std::fs::write(
            dir.path().join(LAYOUT_FILE),
            serde_json::to_string(&custom).unwrap(),
        )
        .unwrap();
        assert_eq!(TableLayout::load_or_default(dir.path()).unwrap(), custom);
    }

    #[test]
    fn test_check_frame() {
        let layout = TableLayout::default();
        assert!(layout.check_frame(&RgbaImage::new(640, 700)).is_ok());

        let err = layout.check_frame(&RgbaImage::new(100, 100)).unwrap_err();
        assert!(err.to_string().contains("100x100"), "{}", err);

        // Last slot's suit area ends at x=487
        assert!(layout.check_frame(&RgbaImage::new(486, 700)).is_err());
        assert!(layout.check_frame(&RgbaImage::new(487, 700)).is_ok());
    }

    #[test]
    fn test_region_fits() {
        let region = PixelRegion::new(2, 3, 4, 5);
        assert!(region.fits(6, 8));
        assert!(!region.fits(5, 8));
        assert!(!region.fits(6, 7));
    }

    #[test]
    fn test_layout_without_slots_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let empty = TableLayout {
            card_offsets_x: vec![],
            ..TableLayout::default()
        };
        let path = dir.path().join(LAYOUT_FILE);
        std::fs::write(&path, serde_json::to_string(&empty).unwrap()).unwrap();
        assert!(TableLayout::load(&path).is_err());
    }

    #[test]
    fn test_list_screenshots_sorted() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["b.png", "a.PNG", "notes.txt"] {
            std::fs::write(dir.path().join(name), b"").unwrap();
        }
        let files = list_screenshots(dir.path()).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["a.PNG", "b.png"]);
    }
}
