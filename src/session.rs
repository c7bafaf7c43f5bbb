use image::RgbaImage;

use crate::brush::{self, BrushMode, BrushProperties};
use crate::canvas::CanvasState;
use crate::error::Result;
use crate::history::{EntryKind, HistoryStack, HistorySummary};
use crate::viewport::{DisplayRect, Viewport};
use crate::wand;

pub const DEFAULT_WAND_TOLERANCE: f32 = 50.0;

/// Active editing tool, selected from the tool panel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Tool {
    /// Brush that grows the selection.
    AddBrush,
    /// Brush that shrinks the selection.
    RemoveBrush,
    /// Flood-select by color from the clicked pixel.
    MagicWand,
    /// Drag to pan the viewport.
    Pan,
}

/// In-flight pointer gesture. A brush gesture pins a copy of the brush
/// settings so mid-drag parameter changes don't mix into one stroke.
enum Gesture {
    Stroke {
        last: (f32, f32),
        props: BrushProperties,
    },
    Pan {
        last: (f32, f32),
    },
}

// ============================================================================
// EDITOR SESSION - one context object for the whole editing step
// ============================================================================

/// The mask-editing session: surfaces, brush settings, viewport, history,
/// and the in-progress gesture, consolidated behind one API.
///
/// All mutation is synchronous and single-threaded; pointer events arrive as
/// discrete `pointer_*` calls already translated from the host's input
/// layer. Invalid input (editing before an image loads, navigating mid-
/// stroke) is a silent no-op, never an error.
pub struct EditorSession {
    canvas: Option<CanvasState>,
    brush: BrushProperties,
    wand_tolerance: f32,
    tool: Tool,
    viewport: Viewport,
    history: HistoryStack,
    gesture: Option<Gesture>,
}

impl Default for EditorSession {
    fn default() -> Self {
        Self::new()
    }
}

impl EditorSession {
    pub fn new() -> Self {
        Self {
            canvas: None,
            brush: BrushProperties::default(),
            wand_tolerance: DEFAULT_WAND_TOLERANCE,
            tool: Tool::AddBrush,
            viewport: Viewport::new(),
            history: HistoryStack::default(),
            gesture: None,
        }
    }

    // ---- lifecycle ----------------------------------------------------------

    /// Accept the segmentation stage's rendered image and build the surface
    /// pair (mask fully included). Resets the viewport and starts history
    /// from this pristine state.
    pub fn load_image(&mut self, image: RgbaImage) -> Result<()> {
        let canvas = CanvasState::from_image(image)?;
        self.history.set_baseline(&canvas);
        self.canvas = Some(canvas);
        self.viewport.reset();
        self.gesture = None;
        Ok(())
    }

    /// Tear the session down (the workflow's "start over"). Surfaces and
    /// history entries are dropped; tool settings persist.
    pub fn reset(&mut self) {
        self.canvas = None;
        self.history = HistoryStack::default();
        self.viewport.reset();
        self.gesture = None;
        log::info!("session: reset");
    }

    // ---- accessors ----------------------------------------------------------

    pub fn canvas(&self) -> Option<&CanvasState> {
        self.canvas.as_ref()
    }

    pub fn brush(&self) -> &BrushProperties {
        &self.brush
    }

    pub fn brush_mut(&mut self) -> &mut BrushProperties {
        &mut self.brush
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn tool(&self) -> Tool {
        self.tool
    }

    /// Switch tools. An unfinished brush gesture is flushed first so no
    /// stroke is left dangling.
    pub fn set_tool(&mut self, tool: Tool) {
        if self.stroke_in_progress() {
            self.finish_stroke();
        }
        self.gesture = None;
        self.tool = tool;
    }

    pub fn wand_tolerance(&self) -> f32 {
        self.wand_tolerance
    }

    pub fn set_wand_tolerance(&mut self, tolerance: f32) {
        self.wand_tolerance = tolerance.clamp(0.0, 100.0);
    }

    pub fn stroke_in_progress(&self) -> bool {
        matches!(self.gesture, Some(Gesture::Stroke { .. }))
    }

    /// Blend of image × mask for preview/export. `None` before an image
    /// loads.
    pub fn composite(&self) -> Option<RgbaImage> {
        self.canvas.as_ref().map(CanvasState::composite)
    }

    pub fn history_summary(&self) -> HistorySummary {
        self.history.summary()
    }

    // ---- pointer dispatch ---------------------------------------------------

    /// Pointer pressed at `pos` (display coordinates) over the canvas area.
    pub fn pointer_pressed(&mut self, pos: (f32, f32), area: DisplayRect) {
        match self.tool {
            Tool::AddBrush | Tool::RemoveBrush => self.begin_stroke(pos, area),
            Tool::MagicWand => self.wand_select(pos, area),
            Tool::Pan => self.gesture = Some(Gesture::Pan { last: pos }),
        }
    }

    /// Pointer moved while pressed. Brush gestures stamp the interpolated
    /// segment since the previous sample; pan gestures accumulate the delta.
    pub fn pointer_moved(&mut self, pos: (f32, f32), area: DisplayRect) {
        match &mut self.gesture {
            Some(Gesture::Stroke { last, props }) => {
                let Some(canvas) = self.canvas.as_mut() else {
                    return;
                };
                let (w, h) = (canvas.width, canvas.height);
                let from = *last;
                let to = self.viewport.display_to_surface(pos, area, w, h);
                brush::stamp_line(canvas.mask_mut(), from, to, props);
                *last = to;
            }
            Some(Gesture::Pan { last }) => {
                self.viewport.pan_by(pos.0 - last.0, pos.1 - last.1);
                *last = pos;
            }
            None => {}
        }
    }

    /// Pointer released — anywhere, including outside the drawable area. A
    /// brush gesture is composited up to the release point and flushed as
    /// exactly one history entry.
    pub fn pointer_released(&mut self, pos: (f32, f32), area: DisplayRect) {
        if self.stroke_in_progress() {
            self.pointer_moved(pos, area);
            self.finish_stroke();
        } else {
            self.gesture = None;
        }
    }

    fn begin_stroke(&mut self, pos: (f32, f32), area: DisplayRect) {
        let Some(canvas) = self.canvas.as_mut() else {
            log::debug!("session: brush before image load, ignored");
            return;
        };
        let mut props = self.brush.clone();
        props.mode = match self.tool {
            Tool::RemoveBrush => BrushMode::Exclude,
            _ => BrushMode::Include,
        };

        let (w, h) = (canvas.width, canvas.height);
        let surface = self.viewport.display_to_surface(pos, area, w, h);
        brush::stamp(canvas.mask_mut(), surface.0, surface.1, &props);
        self.gesture = Some(Gesture::Stroke {
            last: surface,
            props,
        });
    }

    /// Flush the active stroke into history. Called exactly once per
    /// gesture; the `Option::take` makes a second call harmless.
    fn finish_stroke(&mut self) {
        let Some(Gesture::Stroke { props, .. }) = self.gesture.take() else {
            return;
        };
        let Some(canvas) = self.canvas.as_ref() else {
            return;
        };
        let description = format!("{} Brush Stroke", props.mode.label());
        self.history
            .record(canvas, EntryKind::BrushStroke, description);
    }

    fn wand_select(&mut self, pos: (f32, f32), area: DisplayRect) {
        let Some(canvas) = self.canvas.as_mut() else {
            return;
        };
        let (w, h) = (canvas.width, canvas.height);
        let surface = self.viewport.display_to_surface(pos, area, w, h);
        if surface.0 < 0.0 || surface.1 < 0.0 {
            return;
        }

        let selected = wand::select_by_color(
            canvas,
            surface.0.floor() as u32,
            surface.1.floor() as u32,
            self.wand_tolerance,
        );
        if selected > 0 {
            let description = format!("Magic Wand ({} px)", selected);
            self.history.record(canvas, EntryKind::Selection, description);
        }
    }

    // ---- discrete operations ------------------------------------------------

    /// Return the mask to full inclusion and record the step. No-op before
    /// an image loads or while a stroke is active.
    pub fn reset_mask(&mut self) {
        if self.stroke_in_progress() {
            return;
        }
        let Some(canvas) = self.canvas.as_mut() else {
            return;
        };
        canvas.reset_mask();
        self.history.record(canvas, EntryKind::Adjustment, "Reset Mask");
    }

    // ---- history navigation -------------------------------------------------
    //
    // Navigation is a no-op while a stroke is in progress: restoring over a
    // partially-drawn, unsaved stroke would corrupt the gesture.

    pub fn undo(&mut self) -> Option<String> {
        if self.stroke_in_progress() {
            return None;
        }
        let canvas = self.canvas.as_mut()?;
        self.history.undo(canvas)
    }

    pub fn redo(&mut self) -> Option<String> {
        if self.stroke_in_progress() {
            return None;
        }
        let canvas = self.canvas.as_mut()?;
        self.history.redo(canvas)
    }

    pub fn jump_to(&mut self, index: usize) -> bool {
        if self.stroke_in_progress() {
            return false;
        }
        let Some(canvas) = self.canvas.as_mut() else {
            return false;
        };
        self.history.jump_to(index, canvas)
    }

    pub fn clear_history(&mut self) {
        if self.stroke_in_progress() {
            return;
        }
        self.history.clear();
    }
}
