use thiserror::Error;

/// Failures the editing core reports to its caller.
///
/// Only *resource* problems surface as errors; invalid input (a brush before
/// any surface exists, an out-of-range jump index, undo on an empty history)
/// is handled as a silent no-op at the call site because it stems from
/// ordinary UI race conditions.
#[derive(Debug, Error)]
pub enum EditorError {
    #[error("surface dimensions {width}×{height} are empty")]
    EmptySurface { width: u32, height: u32 },

    #[error("surface dimensions {width}×{height} exceed the {max_pixels}-pixel allocation budget")]
    SurfaceTooLarge {
        width: u32,
        height: u32,
        max_pixels: u64,
    },
}

pub type Result<T> = std::result::Result<T, EditorError>;
