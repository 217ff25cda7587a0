use image::{GrayImage, RgbaImage};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Width and height of a symbol area. Pixels are addressed row-major:
/// `index = y * width + x`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MaskShape {
    pub width: u32,
    pub height: u32,
}

impl MaskShape {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn len(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn index(&self, x: u32, y: u32) -> usize {
        y as usize * self.width as usize + x as usize
    }

    pub fn coords(&self, index: usize) -> (u32, u32) {
        let w = self.width.max(1) as usize;
        ((index % w) as u32, (index / w) as u32)
    }

    /// True when `index` is the last pixel of its row
    pub fn ends_row(&self, index: usize) -> bool {
        let w = self.width.max(1) as usize;
        index % w == w - 1
    }
}

impl fmt::Display for MaskShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Ink/background bitmap of one symbol area
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelMask {
    shape: MaskShape,
    ink: Vec<bool>,
}

impl PixelMask {
    /// Threshold a cropped area: ink where the blue channel is below `threshold`.
    /// Card symbols are red or black on white, and both are dark in blue.
    pub fn from_rgba(image: &RgbaImage, threshold: u8) -> Self {
        let shape = MaskShape::new(image.width(), image.height());
        let ink = image.pixels().map(|p| p[2] < threshold).collect();
        Self { shape, ink }
    }

    /// Build a mask with ink at the given indices. Out-of-range indices are ignored.
    pub fn from_indices(shape: MaskShape, indices: impl IntoIterator<Item = usize>) -> Self {
        let mut ink = vec![false; shape.len()];
        for i in indices {
            if let Some(px) = ink.get_mut(i) {
                *px = true;
            }
        }
        Self { shape, ink }
    }

    pub fn shape(&self) -> MaskShape {
        self.shape
    }

    pub fn is_ink(&self, index: usize) -> bool {
        self.ink.get(index).copied().unwrap_or(false)
    }

    /// Indices of all ink pixels, ascending
    pub fn ink_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.ink
            .iter()
            .enumerate()
            .filter_map(|(i, &ink)| ink.then_some(i))
    }

    pub fn ink_count(&self) -> usize {
        self.ink.iter().filter(|&&ink| ink).count()
    }

    /// Render ink black on white, for debugging
    pub fn to_image(&self) -> GrayImage {
        GrayImage::from_fn(self.shape.width, self.shape.height, |x, y| {
            if self.is_ink(self.shape.index(x, y)) {
                image::Luma([0u8])
            } else {
                image::Luma([255u8])
            }
        })
    }
}

/// Test a single screenshot pixel for ink. Out-of-bounds pixels are not ink.
pub fn probe_ink(frame: &RgbaImage, x: u32, y: u32, threshold: u8) -> bool {
    frame
        .get_pixel_checked(x, y)
        .map_or(false, |p| p[2] < threshold)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rgba_uses_blue_channel() {
        let img = RgbaImage::from_fn(3, 2, |x, y| match (x, y) {
            (0, 0) => image::Rgba([255, 20, 20, 255]), // red symbol
            (2, 1) => image::Rgba([10, 10, 10, 255]),  // black symbol
            (1, 0) => image::Rgba([0, 0, 200, 255]),   // blue is background
            _ => image::Rgba([250, 250, 250, 255]),
        });
        let mask = PixelMask::from_rgba(&img, 120);
        assert_eq!(mask.shape(), MaskShape::new(3, 2));
        assert_eq!(mask.ink_indices().collect::<Vec<_>>(), vec![0, 5]);
    }

    #[test]
    fn test_threshold_is_strict() {
        let img = RgbaImage::from_pixel(1, 1, image::Rgba([0, 0, 120, 255]));
        assert_eq!(PixelMask::from_rgba(&img, 120).ink_count(), 0);
        assert_eq!(PixelMask::from_rgba(&img, 121).ink_count(), 1);
    }

    #[test]
    fn test_from_indices_ignores_out_of_range() {
        let mask = PixelMask::from_indices(MaskShape::new(2, 2), [1, 3, 9]);
        assert_eq!(mask.ink_indices().collect::<Vec<_>>(), vec![1, 3]);
        assert!(!mask.is_ink(9));
    }

    #[test]
    fn test_shape_coords() {
        let shape = MaskShape::new(30, 25);
        assert_eq!(shape.len(), 750);
        assert_eq!(shape.index(21, 5), 171);
        assert_eq!(shape.coords(171), (21, 5));
        assert!(shape.ends_row(29));
        assert!(!shape.ends_row(30));
    }

    #[test]
    fn test_to_image() {
        let mask = PixelMask::from_indices(MaskShape::new(2, 1), [1]);
        let img = mask.to_image();
        assert_eq!(img.get_pixel(0, 0)[0], 255);
        assert_eq!(img.get_pixel(1, 0)[0], 0);
    }

    #[test]
    fn test_probe_ink_out_of_bounds() {
        let img = RgbaImage::from_pixel(4, 4, image::Rgba([0, 0, 0, 255]));
        assert!(probe_ink(&img, 3, 3, 120));
        assert!(!probe_ink(&img, 4, 0, 120));
    }
}
