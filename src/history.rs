use std::collections::VecDeque;
use std::time::{SystemTime, UNIX_EPOCH};

use image::{GrayImage, RgbaImage};
use serde::Serialize;
use uuid::Uuid;

use crate::canvas::CanvasState;

/// Default cap on recorded entries. When exceeded the oldest entry is
/// evicted and the cursor shifts so its position relative to "now" holds.
pub const DEFAULT_HISTORY_CAP: usize = 20;

// ============================================================================
// ENTRIES & SNAPSHOTS
// ============================================================================

/// What kind of completed gesture an entry records.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EntryKind {
    BrushStroke,
    Selection,
    Transform,
    Adjustment,
}

/// Immutable deep copy of both surfaces at a point in time.
#[derive(Clone)]
pub struct Snapshot {
    image: RgbaImage,
    mask: GrayImage,
}

impl Snapshot {
    pub fn capture(canvas: &CanvasState) -> Self {
        Self {
            image: canvas.image().clone(),
            mask: canvas.mask().clone(),
        }
    }

    pub fn restore_into(&self, canvas: &mut CanvasState) {
        canvas.restore(&self.image, &self.mask);
    }

    fn memory_bytes(&self) -> usize {
        self.image.as_raw().len() + self.mask.as_raw().len()
    }
}

/// One recorded step. Snapshots are private to the core; display layers only
/// ever see the [`HistoryItem`] projection.
pub struct HistoryEntry {
    pub id: Uuid,
    pub kind: EntryKind,
    pub description: String,
    /// Unix epoch milliseconds at record time.
    pub timestamp_ms: u64,
    snapshot: Snapshot,
}

/// Display projection of an entry — no snapshot payload.
#[derive(Clone, Debug, Serialize)]
pub struct HistoryItem {
    pub kind: EntryKind,
    pub description: String,
    pub timestamp_ms: u64,
}

/// Ordered entry list plus the cursor, for history-panel rendering.
#[derive(Clone, Debug, Serialize)]
pub struct HistorySummary {
    pub entries: Vec<HistoryItem>,
    /// Index of the entry the live surfaces reflect; −1 means the pristine
    /// initial state.
    pub cursor: isize,
}

// ============================================================================
// HISTORY STACK - linear undo/redo with direct jumps
// ============================================================================

/// Bounded, navigable history built from full-surface snapshots.
///
/// The live surfaces always equal the snapshot at the cursor (or the
/// baseline captured at load when the cursor is −1) after any navigation
/// call. Recording while the cursor sits mid-sequence prunes the redo
/// branch, classic linear-history semantics.
pub struct HistoryStack {
    entries: VecDeque<HistoryEntry>,
    /// −1 = baseline (pristine), otherwise an index into `entries`.
    cursor: isize,
    /// Pristine state captured when the surfaces were created. Undoing the
    /// first entry restores this.
    baseline: Option<Snapshot>,
    max_entries: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(DEFAULT_HISTORY_CAP)
    }
}

impl HistoryStack {
    pub fn new(max_entries: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: -1,
            baseline: None,
            max_entries: max_entries.max(1),
        }
    }

    /// Capture the pristine state of freshly created surfaces. Discards any
    /// previous session's entries.
    pub fn set_baseline(&mut self, canvas: &CanvasState) {
        self.entries.clear();
        self.cursor = -1;
        self.baseline = Some(Snapshot::capture(canvas));
    }

    /// Record the surfaces as they stand after a completed gesture. Entries
    /// past the cursor are discarded first; the oldest entry is evicted once
    /// the cap is exceeded.
    pub fn record(&mut self, canvas: &CanvasState, kind: EntryKind, description: impl Into<String>) {
        // Prune the redo branch.
        while self.entries.len() as isize > self.cursor + 1 {
            self.entries.pop_back();
        }

        let description = description.into();
        log::debug!("history: record {:?} \"{}\"", kind, description);
        self.entries.push_back(HistoryEntry {
            id: Uuid::new_v4(),
            kind,
            description,
            timestamp_ms: now_ms(),
            snapshot: Snapshot::capture(canvas),
        });
        self.cursor += 1;

        // Cap eviction keeps the cursor's distance to the tail intact.
        while self.entries.len() > self.max_entries {
            self.entries.pop_front();
            self.cursor -= 1;
        }
    }

    /// Step back one entry and restore it. Restoring past the first entry
    /// lands on the baseline. Returns the undone entry's description, or
    /// `None` when there is nothing before the current state.
    pub fn undo(&mut self, canvas: &mut CanvasState) -> Option<String> {
        if self.cursor < 0 {
            return None;
        }
        if self.cursor == 0 && self.baseline.is_none() {
            return None;
        }

        let undone = self.entries[self.cursor as usize].description.clone();
        self.cursor -= 1;
        self.restore_cursor(canvas);
        Some(undone)
    }

    /// Step forward one entry and restore it. Returns the redone entry's
    /// description, or `None` at the tail.
    pub fn redo(&mut self, canvas: &mut CanvasState) -> Option<String> {
        if self.cursor + 1 >= self.entries.len() as isize {
            return None;
        }
        self.cursor += 1;
        self.restore_cursor(canvas);
        Some(self.entries[self.cursor as usize].description.clone())
    }

    /// Jump straight to `index` and restore it — history-panel navigation,
    /// not just adjacent stepping. Out-of-range indices are a no-op.
    pub fn jump_to(&mut self, index: usize, canvas: &mut CanvasState) -> bool {
        if index >= self.entries.len() {
            return false;
        }
        self.cursor = index as isize;
        self.restore_cursor(canvas);
        true
    }

    /// Drop every entry and reset the cursor. Live surfaces are untouched;
    /// the baseline survives so a later record/undo pair still works.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = -1;
    }

    fn restore_cursor(&self, canvas: &mut CanvasState) {
        if self.cursor < 0 {
            if let Some(baseline) = &self.baseline {
                baseline.restore_into(canvas);
            }
        } else {
            self.entries[self.cursor as usize].snapshot.restore_into(canvas);
        }
    }

    // ---- queries ------------------------------------------------------------

    pub fn cursor(&self) -> isize {
        self.cursor
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn can_undo(&self) -> bool {
        self.cursor >= 0 && (self.cursor > 0 || self.baseline.is_some())
    }

    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.entries.len() as isize
    }

    /// Ordered `{kind, description, timestamp}` projection plus the cursor,
    /// for display purposes. Snapshot payloads never leave the core.
    pub fn summary(&self) -> HistorySummary {
        HistorySummary {
            entries: self
                .entries
                .iter()
                .map(|e| HistoryItem {
                    kind: e.kind,
                    description: e.description.clone(),
                    timestamp_ms: e.timestamp_ms,
                })
                .collect(),
            cursor: self.cursor,
        }
    }

    /// Bytes held by all snapshots, baseline included.
    pub fn memory_usage(&self) -> usize {
        self.entries
            .iter()
            .map(|e| e.snapshot.memory_bytes())
            .sum::<usize>()
            + self.baseline.as_ref().map_or(0, Snapshot::memory_bytes)
    }
}

fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbaImage;

    fn canvas(w: u32, h: u32) -> CanvasState {
        CanvasState::from_image(RgbaImage::new(w, h)).unwrap()
    }

    fn stack_with_baseline(canvas: &CanvasState) -> HistoryStack {
        let mut history = HistoryStack::default();
        history.set_baseline(canvas);
        history
    }

    #[test]
    fn record_advances_cursor_to_tail() {
        let mut c = canvas(4, 4);
        let mut history = stack_with_baseline(&c);

        history.record(&c, EntryKind::BrushStroke, "A");
        c.fill_mask(10);
        history.record(&c, EntryKind::BrushStroke, "B");

        assert_eq!(history.len(), 2);
        assert_eq!(history.cursor(), 1);
        assert!(history.can_undo());
        assert!(!history.can_redo());
    }

    #[test]
    fn recording_mid_history_prunes_redo_branch() {
        let mut c = canvas(4, 4);
        let mut history = stack_with_baseline(&c);

        for desc in ["A", "B", "C"] {
            history.record(&c, EntryKind::BrushStroke, desc);
        }
        history.undo(&mut c);
        history.undo(&mut c);
        history.record(&c, EntryKind::BrushStroke, "D");

        let summary = history.summary();
        let descriptions: Vec<_> = summary.entries.iter().map(|e| e.description.as_str()).collect();
        assert_eq!(descriptions, ["A", "D"]);
        assert_eq!(summary.cursor, 1);
    }

    #[test]
    fn cap_eviction_preserves_relative_cursor() {
        let mut c = canvas(4, 4);
        let mut history = stack_with_baseline(&c);

        for i in 0..21 {
            history.record(&c, EntryKind::BrushStroke, format!("step {}", i));
        }

        assert_eq!(history.len(), DEFAULT_HISTORY_CAP);
        assert_eq!(history.cursor(), 19);
        let summary = history.summary();
        assert_eq!(summary.entries[0].description, "step 1");
        assert_eq!(summary.entries[19].description, "step 20");
    }

    #[test]
    fn undo_restores_snapshot_contents() {
        let mut c = canvas(4, 4);
        let mut history = stack_with_baseline(&c);

        c.fill_mask(10);
        history.record(&c, EntryKind::Adjustment, "fill 10");
        c.fill_mask(200);
        history.record(&c, EntryKind::Adjustment, "fill 200");

        assert_eq!(history.undo(&mut c).as_deref(), Some("fill 200"));
        assert!(c.mask().pixels().all(|p| p.0[0] == 10));
        assert_eq!(history.redo(&mut c).as_deref(), Some("fill 200"));
        assert!(c.mask().pixels().all(|p| p.0[0] == 200));
    }

    #[test]
    fn undo_past_first_entry_restores_baseline() {
        let mut c = canvas(4, 4);
        let mut history = stack_with_baseline(&c);

        c.fill_mask(33);
        history.record(&c, EntryKind::Adjustment, "fill 33");

        assert!(history.undo(&mut c).is_some());
        assert_eq!(history.cursor(), -1);
        assert!(c.mask().pixels().all(|p| p.0[0] == 255));
        // Nothing before the baseline.
        assert!(history.undo(&mut c).is_none());
    }

    #[test]
    fn jump_is_idempotent_and_bounds_checked() {
        let mut c = canvas(4, 4);
        let mut history = stack_with_baseline(&c);

        for v in [10u8, 20, 30] {
            c.fill_mask(v);
            history.record(&c, EntryKind::Adjustment, format!("fill {}", v));
        }

        assert!(history.jump_to(0, &mut c));
        let first = c.mask().as_raw().clone();
        let len = history.len();
        assert!(history.jump_to(0, &mut c));
        assert_eq!(c.mask().as_raw(), &first);
        assert_eq!(history.len(), len);

        assert!(!history.jump_to(3, &mut c));
        assert_eq!(history.cursor(), 0);
    }

    #[test]
    fn clear_empties_entries_without_touching_surfaces() {
        let mut c = canvas(4, 4);
        let mut history = stack_with_baseline(&c);

        c.fill_mask(99);
        history.record(&c, EntryKind::Adjustment, "fill 99");
        history.clear();

        assert!(history.is_empty());
        assert_eq!(history.cursor(), -1);
        assert!(c.mask().pixels().all(|p| p.0[0] == 99));
        assert!(history.undo(&mut c).is_none());
    }

    #[test]
    fn summary_serializes_kind_as_kebab_case() {
        let json = serde_json::to_string(&EntryKind::BrushStroke).unwrap();
        assert_eq!(json, "\"brush-stroke\"");
    }
}
