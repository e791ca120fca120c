use serde::{Deserialize, Serialize};

/// The content of one lane cell within a row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum NoteType {
    #[default]
    Empty,
    Normal,
    HoldHead,
    HoldBody,
    HoldTail,
}

impl NoteType {
    /// Whether this cell demands a key press (taps and hold heads).
    pub fn requires_hit(self) -> bool {
        matches!(self, NoteType::Normal | NoteType::HoldHead)
    }

    /// Whether this cell demands a key release.
    pub fn requires_release(self) -> bool {
        self == NoteType::HoldTail
    }
}

/// A snapshot of which lanes carry an event at one chart time.
///
/// Fixed length equal to the chart's key count; lane 0 is leftmost.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRow(Box<[NoteType]>);

impl NoteRow {
    pub fn empty(keys: u8) -> Self {
        NoteRow(vec![NoteType::Empty; keys as usize].into_boxed_slice())
    }

    /// Builder-style lane assignment, for chart construction and tests.
    pub fn with(mut self, lane: usize, ty: NoteType) -> Self {
        self.0[lane] = ty;
        self
    }

    pub fn from_cells(cells: Vec<NoteType>) -> Self {
        NoteRow(cells.into_boxed_slice())
    }

    pub fn keys(&self) -> usize {
        self.0.len()
    }

    pub fn cell(&self, lane: usize) -> NoteType {
        self.0[lane]
    }

    pub fn is_empty_row(&self) -> bool {
        self.0.iter().all(|&c| c == NoteType::Empty)
    }

    /// Iterate `(lane, cell)` pairs in ascending lane order.
    pub fn iter_lanes(&self) -> impl Iterator<Item = (usize, NoteType)> + '_ {
        self.0.iter().copied().enumerate()
    }
}
