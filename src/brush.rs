use image::GrayImage;

pub const MIN_BRUSH_SIZE: f32 = 5.0;
pub const MAX_BRUSH_SIZE: f32 = 100.0;

/// Whether a stroke grows or shrinks the selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BrushMode {
    /// Blend strength into the mask, saturating at fully included.
    Include,
    /// Subtract strength from the mask, saturating at fully excluded.
    Exclude,
}

impl BrushMode {
    pub fn label(&self) -> &'static str {
        match self {
            BrushMode::Include => "Add",
            BrushMode::Exclude => "Remove",
        }
    }
}

/// Session-scoped brush settings, mutated by tool-panel controls and read by
/// the compositor at stroke time. Not part of history.
#[derive(Clone, Debug)]
pub struct BrushProperties {
    size: f32,
    hardness: f32,
    opacity: f32,
    pub mode: BrushMode,
}

impl Default for BrushProperties {
    fn default() -> Self {
        Self {
            size: 25.0,
            hardness: 0.75,
            opacity: 1.0,
            mode: BrushMode::Include,
        }
    }
}

impl BrushProperties {
    /// Brush diameter in surface pixels.
    pub fn size(&self) -> f32 {
        self.size
    }

    pub fn set_size(&mut self, size: f32) {
        self.size = size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE);
    }

    /// Falloff control: 1.0 is a hard disc, 0.0 fades across the full radius.
    pub fn hardness(&self) -> f32 {
        self.hardness
    }

    pub fn set_hardness(&mut self, hardness: f32) {
        self.hardness = hardness.clamp(0.0, 1.0);
    }

    /// Per-stroke contribution multiplier.
    pub fn opacity(&self) -> f32 {
        self.opacity
    }

    pub fn set_opacity(&mut self, opacity: f32) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    /// Selection strength at `dist` pixels from the dab center: 1.0 from the
    /// center out to `hardness × radius`, smoothstep down to exactly 0.0 at
    /// the outer radius. Monotonically non-increasing in `dist`.
    fn falloff(&self, dist: f32, radius: f32) -> f32 {
        // Clamp so the fade width stays positive; 0.99 is visually a hard edge.
        let hardness = self.hardness.min(0.99);
        let solid = radius * hardness;

        if dist <= solid {
            return 1.0;
        }
        if dist >= radius {
            return 0.0;
        }

        // Smoothstep across the fade band, 1.0 at the solid edge → 0.0 at the rim.
        let x = 1.0 - (dist - solid) / (radius - solid);
        x * x * (3.0 - 2.0 * x)
    }
}

// ============================================================================
// COMPOSITOR - rasterizes soft-edged dabs onto the mask surface
// ============================================================================

/// Apply one brush dab centered at `(cx, cy)` (surface coordinates, may be
/// fractional or outside the surface — the affected region is clamped).
///
/// Include mode accumulates with an alpha-over rule, `a′ = a + s·(1−a)`;
/// exclude mode drives strength toward zero with `a′ = a·(1−s)`. Both keep
/// every pixel inside [0, 255] and leave saturated pixels in place, so
/// repeated identical dabs never overshoot.
pub fn stamp(mask: &mut GrayImage, cx: f32, cy: f32, props: &BrushProperties) {
    let (w, h) = mask.dimensions();
    let radius = props.size / 2.0;
    if w == 0 || h == 0 || radius <= 0.0 {
        return;
    }
    // Entirely off-surface dabs touch nothing.
    if cx + radius < 0.0 || cy + radius < 0.0 {
        return;
    }

    let x0 = (cx - radius).floor().max(0.0) as u32;
    let y0 = (cy - radius).floor().max(0.0) as u32;
    let x1 = ((cx + radius).ceil() as u32).min(w.saturating_sub(1));
    let y1 = ((cy + radius).ceil() as u32).min(h.saturating_sub(1));
    if x0 > x1 || y0 > y1 {
        return;
    }

    let opacity = props.opacity;
    for y in y0..=y1 {
        for x in x0..=x1 {
            let dx = x as f32 - cx;
            let dy = y as f32 - cy;
            let dist = (dx * dx + dy * dy).sqrt();

            let strength = props.falloff(dist, radius) * opacity;
            if strength <= 0.0 {
                continue;
            }

            let px = mask.get_pixel_mut(x, y);
            let a = px.0[0] as f32 / 255.0;
            let blended = match props.mode {
                BrushMode::Include => a + strength * (1.0 - a),
                BrushMode::Exclude => a * (1.0 - strength),
            };
            px.0[0] = (blended * 255.0).round() as u8;
        }
    }
}

/// Stamp along the segment from `start` to `end`, filling the gaps a fast
/// pointer leaves between sampled input points. Dense ≤1 px stepping keeps
/// the stroke continuous at any drag speed.
pub fn stamp_line(
    mask: &mut GrayImage,
    start: (f32, f32),
    end: (f32, f32),
    props: &BrushProperties,
) {
    let dx = end.0 - start.0;
    let dy = end.1 - start.1;
    let distance = (dx * dx + dy * dy).sqrt();

    if distance < 0.1 {
        stamp(mask, start.0, start.1, props);
        return;
    }

    let steps = distance.ceil() as usize;
    for i in 0..=steps {
        let t = i as f32 / steps as f32;
        stamp(mask, start.0 + dx * t, start.1 + dy * t, props);
    }
}
