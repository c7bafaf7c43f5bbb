use image::{GrayImage, Luma, RgbaImage};
use rayon::prelude::*;

use crate::error::{EditorError, Result};

/// Upper bound on surface allocation (~256 megapixels, the practical limit
/// for keeping full-surface history snapshots in memory).
pub const MAX_SURFACE_PIXELS: u64 = 256_000_000;

/// Mask value for a fully included (kept) pixel.
pub const MASK_INCLUDED: u8 = 255;
/// Mask value for a fully excluded pixel.
pub const MASK_EXCLUDED: u8 = 0;

// ============================================================================
// CANVAS STATE - the two-surface raster model
// ============================================================================

/// Owns the source image surface and the selection (mask) surface.
///
/// Both buffers are allocated together from the upstream segmentation result
/// and always share identical dimensions; there is no resize path, so the
/// invariant cannot be broken after construction. All mask mutation flows
/// through the brush compositor, the magic wand, `fill_mask`, or history
/// restoration.
pub struct CanvasState {
    pub width: u32,
    pub height: u32,
    image: RgbaImage,
    mask: GrayImage,
}

impl CanvasState {
    /// Build the surface pair from a decoded upstream image. The mask starts
    /// fully included — the segmentation stage hands over an image whose
    /// visible pixels are all "kept" until the user refines them.
    ///
    /// Fails if the image is empty or larger than the allocation budget, so
    /// the caller can e.g. request a downscaled source instead of silently
    /// corrupting surface dimensions.
    pub fn from_image(image: RgbaImage) -> Result<Self> {
        let (width, height) = image.dimensions();
        validate_dimensions(width, height)?;

        let mask = GrayImage::from_pixel(width, height, Luma([MASK_INCLUDED]));
        log::info!("canvas: allocated {}×{} surface pair", width, height);
        Ok(Self {
            width,
            height,
            image,
            mask,
        })
    }

    // ---- surface access -----------------------------------------------------

    pub fn image(&self) -> &RgbaImage {
        &self.image
    }

    pub fn mask(&self) -> &GrayImage {
        &self.mask
    }

    /// Mutable mask access for the compositing paths. Callers must not
    /// replace the buffer with one of different dimensions.
    pub fn mask_mut(&mut self) -> &mut GrayImage {
        &mut self.mask
    }

    /// Selection strength of a pixel, normalized to 0.0 (excluded) – 1.0
    /// (fully included). Out-of-bounds reads return 0.0.
    pub fn mask_strength(&self, x: u32, y: u32) -> f32 {
        if x >= self.width || y >= self.height {
            return 0.0;
        }
        self.mask.get_pixel(x, y).0[0] as f32 / 255.0
    }

    /// Fill the entire mask with one value.
    pub fn fill_mask(&mut self, value: u8) {
        for px in self.mask.pixels_mut() {
            px.0[0] = value;
        }
    }

    /// Return the mask to its initial fully-included state.
    pub fn reset_mask(&mut self) {
        self.fill_mask(MASK_INCLUDED);
    }

    /// Overwrite both surfaces from a snapshot. Restoration is a full copy,
    /// not an incremental diff.
    pub(crate) fn restore(&mut self, image: &RgbaImage, mask: &GrayImage) {
        self.image.clone_from(image);
        self.mask.clone_from(mask);
    }

    // ---- composite ----------------------------------------------------------

    /// The "current composite" the downstream steps preview and export:
    /// each output pixel keeps the source color with its alpha multiplied by
    /// the mask strength (0 ⇒ fully transparent, 255 ⇒ source alpha kept).
    pub fn composite(&self) -> RgbaImage {
        let w = self.width as usize;
        let src = self.image.as_raw();
        let mask = self.mask.as_raw();
        let mut out = vec![0u8; src.len()];

        out.par_chunks_mut(w * 4)
            .zip(src.par_chunks(w * 4))
            .zip(mask.par_chunks(w))
            .for_each(|((dst_row, src_row), mask_row)| {
                for x in 0..w {
                    let s = &src_row[x * 4..x * 4 + 4];
                    let d = &mut dst_row[x * 4..x * 4 + 4];
                    d[0] = s[0];
                    d[1] = s[1];
                    d[2] = s[2];
                    // Rounded (a * m) / 255
                    d[3] = ((s[3] as u16 * mask_row[x] as u16 + 127) / 255) as u8;
                }
            });

        RgbaImage::from_raw(self.width, self.height, out).unwrap()
    }

    /// Approximate heap footprint of both surfaces.
    pub fn memory_bytes(&self) -> usize {
        self.image.as_raw().len() + self.mask.as_raw().len()
    }
}

/// Guard run before allocating the mask (and, later, history snapshots)
/// alongside the already-decoded image.
fn validate_dimensions(width: u32, height: u32) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(EditorError::EmptySurface { width, height });
    }
    if width as u64 * height as u64 > MAX_SURFACE_PIXELS {
        return Err(EditorError::SurfaceTooLarge {
            width,
            height,
            max_pixels: MAX_SURFACE_PIXELS,
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgba;

    #[test]
    fn mask_starts_fully_included() {
        let canvas = CanvasState::from_image(RgbaImage::new(8, 6)).unwrap();
        assert_eq!(canvas.width, 8);
        assert_eq!(canvas.height, 6);
        assert!(canvas.mask().pixels().all(|p| p.0[0] == MASK_INCLUDED));
    }

    #[test]
    fn empty_image_is_rejected() {
        let err = CanvasState::from_image(RgbaImage::new(0, 10)).err().unwrap();
        assert!(matches!(err, EditorError::EmptySurface { .. }));
    }

    #[test]
    fn oversized_dimensions_are_rejected() {
        let err = validate_dimensions(20_000, 20_000).unwrap_err();
        assert!(matches!(err, EditorError::SurfaceTooLarge { .. }));
        validate_dimensions(4_096, 4_096).unwrap();
    }

    #[test]
    fn composite_scales_alpha_by_mask() {
        let img = RgbaImage::from_pixel(4, 4, Rgba([10, 20, 30, 200]));
        let mut canvas = CanvasState::from_image(img).unwrap();
        canvas.fill_mask(128);

        let out = canvas.composite();
        let px = out.get_pixel(1, 1);
        assert_eq!([px.0[0], px.0[1], px.0[2]], [10, 20, 30]);
        // 200 * 128 / 255 rounded
        assert_eq!(px.0[3], ((200u16 * 128 + 127) / 255) as u8);
    }

    #[test]
    fn composite_mask_extremes() {
        let img = RgbaImage::from_pixel(3, 3, Rgba([1, 2, 3, 255]));
        let mut canvas = CanvasState::from_image(img).unwrap();

        assert_eq!(canvas.composite().get_pixel(0, 0).0[3], 255);
        canvas.fill_mask(MASK_EXCLUDED);
        assert_eq!(canvas.composite().get_pixel(0, 0).0[3], 0);
    }
}
