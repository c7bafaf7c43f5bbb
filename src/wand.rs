use std::collections::VecDeque;

use image::Rgba;

use crate::canvas::{CanvasState, MASK_INCLUDED};

/// Magic-wand selection: breadth-first flood fill from the seed pixel over
/// 4-connected neighbors, marking every reached pixel fully included.
///
/// `tolerance` is 0–100. It maps to a max-component RGBA distance threshold,
/// so tolerance 0 selects only exactly-matching contiguous pixels and
/// tolerance 100 always selects the entire surface. Deterministic for a
/// given surface, seed, and tolerance. Out-of-bounds seeds are a no-op.
///
/// Returns the number of pixels selected.
pub fn select_by_color(canvas: &mut CanvasState, seed_x: u32, seed_y: u32, tolerance: f32) -> usize {
    let (width, height) = (canvas.width, canvas.height);
    if seed_x >= width || seed_y >= height {
        log::debug!("wand: seed ({}, {}) outside surface, ignored", seed_x, seed_y);
        return 0;
    }

    let threshold = (tolerance.clamp(0.0, 100.0) / 100.0) * 255.0;
    let target = *canvas.image().get_pixel(seed_x, seed_y);

    let w = width as usize;
    let mut visited = vec![false; w * height as usize];
    let mut queue = VecDeque::new();
    let mut selected = 0usize;

    queue.push_back((seed_x, seed_y));
    visited[seed_y as usize * w + seed_x as usize] = true;

    while let Some((x, y)) = queue.pop_front() {
        canvas.mask_mut().put_pixel(x, y, image::Luma([MASK_INCLUDED]));
        selected += 1;

        let neighbors = [
            (x.wrapping_sub(1), y),
            (x + 1, y),
            (x, y.wrapping_sub(1)),
            (x, y + 1),
        ];
        for (nx, ny) in neighbors {
            if nx >= width || ny >= height {
                continue;
            }
            let vi = ny as usize * w + nx as usize;
            if visited[vi] {
                continue;
            }
            visited[vi] = true;

            if colors_match(&target, canvas.image().get_pixel(nx, ny), threshold) {
                queue.push_back((nx, ny));
            }
        }
    }

    log::debug!(
        "wand: selected {} pixels from seed ({}, {}) at tolerance {}",
        selected,
        seed_x,
        seed_y,
        tolerance
    );
    selected
}

/// Color similarity by maximum component distance over RGBA. Two fully
/// transparent pixels always match; a transparent/opaque pair matches only
/// when the tolerance covers the alpha gap.
fn colors_match(a: &Rgba<u8>, b: &Rgba<u8>, threshold: f32) -> bool {
    if a.0[3] == 0 && b.0[3] == 0 {
        return true;
    }
    if a.0[3] == 0 || b.0[3] == 0 {
        let alpha_diff = (a.0[3] as f32 - b.0[3] as f32).abs();
        return alpha_diff <= threshold;
    }

    let dist = (0..4)
        .map(|i| (a.0[i] as f32 - b.0[i] as f32).abs())
        .fold(0.0f32, f32::max);
    dist <= threshold
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::MASK_EXCLUDED;
    use image::{Rgba, RgbaImage};

    /// 8×8 surface: left half red, right half blue, all opaque.
    fn two_tone_canvas() -> CanvasState {
        let mut img = RgbaImage::new(8, 8);
        for (x, _, px) in img.enumerate_pixels_mut() {
            *px = if x < 4 {
                Rgba([255, 0, 0, 255])
            } else {
                Rgba([0, 0, 255, 255])
            };
        }
        let mut canvas = CanvasState::from_image(img).unwrap();
        canvas.fill_mask(MASK_EXCLUDED);
        canvas
    }

    #[test]
    fn zero_tolerance_selects_exact_contiguous_region() {
        let mut canvas = two_tone_canvas();
        let selected = select_by_color(&mut canvas, 0, 0, 0.0);

        assert_eq!(selected, 32);
        assert_eq!(canvas.mask().get_pixel(3, 7).0[0], MASK_INCLUDED);
        assert_eq!(canvas.mask().get_pixel(4, 0).0[0], MASK_EXCLUDED);
    }

    #[test]
    fn full_tolerance_selects_entire_surface() {
        let mut canvas = two_tone_canvas();
        let selected = select_by_color(&mut canvas, 0, 0, 100.0);

        assert_eq!(selected, 64);
        assert!(canvas.mask().pixels().all(|p| p.0[0] == MASK_INCLUDED));
    }

    #[test]
    fn fill_does_not_cross_a_separating_band() {
        // Red region split in two by a green column: flood from the left
        // must not reach the right.
        let mut img = RgbaImage::from_pixel(9, 3, Rgba([255, 0, 0, 255]));
        for y in 0..3 {
            img.put_pixel(4, y, Rgba([0, 255, 0, 255]));
        }
        let mut canvas = CanvasState::from_image(img).unwrap();
        canvas.fill_mask(MASK_EXCLUDED);

        let selected = select_by_color(&mut canvas, 0, 1, 10.0);
        assert_eq!(selected, 12);
        assert_eq!(canvas.mask().get_pixel(8, 1).0[0], MASK_EXCLUDED);
    }

    #[test]
    fn selection_is_deterministic() {
        let mut a = two_tone_canvas();
        let mut b = two_tone_canvas();
        select_by_color(&mut a, 6, 3, 30.0);
        select_by_color(&mut b, 6, 3, 30.0);
        assert_eq!(a.mask().as_raw(), b.mask().as_raw());
    }

    #[test]
    fn out_of_bounds_seed_is_a_no_op() {
        let mut canvas = two_tone_canvas();
        assert_eq!(select_by_color(&mut canvas, 99, 0, 50.0), 0);
        assert!(canvas.mask().pixels().all(|p| p.0[0] == MASK_EXCLUDED));
    }

    #[test]
    fn transparent_pixels_flood_together() {
        let mut img = RgbaImage::from_pixel(4, 1, Rgba([0, 0, 0, 0]));
        img.put_pixel(3, 0, Rgba([5, 5, 5, 255]));
        let mut canvas = CanvasState::from_image(img).unwrap();
        canvas.fill_mask(MASK_EXCLUDED);

        assert_eq!(select_by_color(&mut canvas, 0, 0, 0.0), 3);
        assert_eq!(canvas.mask().get_pixel(3, 0).0[0], MASK_EXCLUDED);
    }
}
