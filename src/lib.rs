//! Interactive mask-editing core for the MagicBrush photo workflow.
//!
//! The crate models the editing step of a background-removal workflow: a
//! two-surface raster model (source image + selection mask), a brush
//! compositor with soft-edge falloff, a magic-wand flood fill, a pan/zoom
//! viewport decoupled from surface coordinates, and a bounded, navigable
//! undo/redo history built from full-surface snapshots.
//!
//! # Quick Start
//!
//! ```ignore
//! use magicbrush::{DisplayRect, EditorSession, Tool};
//!
//! // The segmentation stage hands over a decoded image; the mask starts
//! // fully included.
//! let mut session = EditorSession::new();
//! session.load_image(segmented_image)?;
//!
//! // Pointer events arrive in display coordinates; the session maps them
//! // through the viewport and composites the stroke onto the mask.
//! let area = DisplayRect::new(0.0, 0.0, 800.0, 600.0);
//! session.set_tool(Tool::RemoveBrush);
//! session.pointer_pressed((400.0, 300.0), area);
//! session.pointer_moved((420.0, 310.0), area);
//! session.pointer_released((440.0, 315.0), area);   // one history entry
//!
//! session.undo();
//!
//! // Blend of image × mask for preview or export.
//! let preview = session.composite().unwrap();
//! ```
//!
//! Upload/validation, the segmentation stage itself, export encoding, and
//! all visual chrome live outside this crate; the session API is the
//! boundary.

pub mod brush;
pub mod canvas;
pub mod error;
pub mod history;
pub mod session;
pub mod viewport;
pub mod wand;

pub use brush::{BrushMode, BrushProperties, MAX_BRUSH_SIZE, MIN_BRUSH_SIZE};
pub use canvas::{CanvasState, MASK_EXCLUDED, MASK_INCLUDED, MAX_SURFACE_PIXELS};
pub use error::{EditorError, Result};
pub use history::{
    DEFAULT_HISTORY_CAP, EntryKind, HistoryItem, HistoryStack, HistorySummary, Snapshot,
};
pub use session::{DEFAULT_WAND_TOLERANCE, EditorSession, Tool};
pub use viewport::{DisplayRect, MAX_ZOOM, MIN_ZOOM, Viewport, ZOOM_STEP};
pub use wand::select_by_color;
