/// Zoom bounds as scale factors (25%–400%).
pub const MIN_ZOOM: f32 = 0.25;
pub const MAX_ZOOM: f32 = 4.0;
/// Step used by the zoom-in/zoom-out controls.
pub const ZOOM_STEP: f32 = 0.25;

/// The display-space rectangle the host gives the canvas to render into.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DisplayRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl DisplayRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width / 2.0, self.y + self.height / 2.0)
    }
}

// ============================================================================
// VIEWPORT - zoom/pan state and the display ↔ surface mapping
// ============================================================================

/// Pure rendering/input state: a clamped zoom factor and an accumulated pan
/// offset in display pixels. Never touches surface content and never enters
/// history.
///
/// The render transform is scale-then-translate: the surface is drawn at
/// `zoom` scale, centered in the display area, shifted by the pan offset.
/// `display_to_surface` is the exact inverse, so a brush applied at the
/// mapped coordinate lands under the cursor at any zoom/pan.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    zoom: f32,
    pan: (f32, f32),
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            zoom: 1.0,
            pan: (0.0, 0.0),
        }
    }
}

impl Viewport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zoom(&self) -> f32 {
        self.zoom
    }

    pub fn set_zoom(&mut self, zoom: f32) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - ZOOM_STEP);
    }

    pub fn pan(&self) -> (f32, f32) {
        self.pan
    }

    /// Accumulate a drag delta while the pan tool is active.
    pub fn pan_by(&mut self, dx: f32, dy: f32) {
        self.pan.0 += dx;
        self.pan.1 += dy;
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Display-space rectangle a `surface_w × surface_h` surface occupies
    /// within `area` under the current zoom and pan.
    pub fn image_rect(&self, area: DisplayRect, surface_w: u32, surface_h: u32) -> DisplayRect {
        let width = surface_w as f32 * self.zoom;
        let height = surface_h as f32 * self.zoom;
        let (cx, cy) = area.center();
        DisplayRect::new(
            cx + self.pan.0 - width / 2.0,
            cy + self.pan.1 - height / 2.0,
            width,
            height,
        )
    }

    /// Map a pointer position in display coordinates to surface pixel
    /// coordinates. Pure; the result may lie outside the surface bounds.
    pub fn display_to_surface(
        &self,
        pos: (f32, f32),
        area: DisplayRect,
        surface_w: u32,
        surface_h: u32,
    ) -> (f32, f32) {
        let rect = self.image_rect(area, surface_w, surface_h);
        ((pos.0 - rect.x) / self.zoom, (pos.1 - rect.y) / self.zoom)
    }

    /// Forward render transform: surface pixel coordinates to display space.
    pub fn surface_to_display(
        &self,
        pos: (f32, f32),
        area: DisplayRect,
        surface_w: u32,
        surface_h: u32,
    ) -> (f32, f32) {
        let rect = self.image_rect(area, surface_w, surface_h);
        (rect.x + pos.0 * self.zoom, rect.y + pos.1 * self.zoom)
    }
}
