use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::note::{NoteRow, NoteType};
use crate::time::Time;
use crate::{MAX_KEYS, MIN_KEYS};

/// A note row together with its chart time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedRow {
    pub time: Time,
    pub row: NoteRow,
}

#[derive(Debug, Error)]
pub enum ChartError {
    #[error("key count {0} outside supported range {MIN_KEYS}..={MAX_KEYS}")]
    KeyCountOutOfRange(u8),

    #[error("chart has no rows")]
    NoRows,

    #[error("row {index} at {time} is not after the previous row")]
    RowsOutOfOrder { index: usize, time: Time },

    #[error("row {index} has a wrong lane count (expected {expected}, got {got})")]
    RowWidthMismatch {
        index: usize,
        expected: usize,
        got: usize,
    },

    #[error("row {index} is entirely empty")]
    EmptyRow { index: usize },

    #[error("hold head on lane {lane} at row {index} has no matching tail")]
    UnmatchedHoldHead { lane: usize, index: usize },

    #[error("stray {cell:?} on lane {lane} at row {index} outside a hold")]
    StrayHoldCell {
        cell: NoteType,
        lane: usize,
        index: usize,
    },

    #[error("lane {lane} at row {index} interrupts an open hold")]
    BrokenHold { lane: usize, index: usize },
}

/// A validated chart: time-ordered note rows over a fixed lane count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    keys: u8,
    rows: Vec<TimedRow>,
}

impl Chart {
    /// Build a chart, enforcing the structural invariants:
    /// key count in range, at least one row, strictly increasing times,
    /// no all-empty rows, and well-formed hold head/body/tail runs per lane.
    pub fn new(keys: u8, rows: Vec<TimedRow>) -> Result<Self, ChartError> {
        if !(MIN_KEYS..=MAX_KEYS).contains(&keys) {
            return Err(ChartError::KeyCountOutOfRange(keys));
        }
        if rows.is_empty() {
            return Err(ChartError::NoRows);
        }

        let mut prev_time: Option<Time> = None;
        for (index, timed) in rows.iter().enumerate() {
            if timed.row.keys() != keys as usize {
                return Err(ChartError::RowWidthMismatch {
                    index,
                    expected: keys as usize,
                    got: timed.row.keys(),
                });
            }
            if timed.row.is_empty_row() {
                return Err(ChartError::EmptyRow { index });
            }
            if let Some(prev) = prev_time
                && timed.time <= prev
            {
                return Err(ChartError::RowsOutOfOrder {
                    index,
                    time: timed.time,
                });
            }
            prev_time = Some(timed.time);
        }

        // Per-lane hold pairing: head opens, bodies continue, tail closes.
        for lane in 0..keys as usize {
            let mut open_head: Option<usize> = None;
            for (index, timed) in rows.iter().enumerate() {
                match (timed.row.cell(lane), open_head) {
                    (NoteType::HoldHead, None) => open_head = Some(index),
                    (NoteType::HoldHead, Some(_)) | (NoteType::Normal, Some(_)) => {
                        return Err(ChartError::BrokenHold { lane, index });
                    }
                    (NoteType::HoldTail, Some(_)) => open_head = None,
                    (NoteType::HoldBody, Some(_)) => {}
                    (NoteType::HoldBody | NoteType::HoldTail, None) => {
                        return Err(ChartError::StrayHoldCell {
                            cell: timed.row.cell(lane),
                            lane,
                            index,
                        });
                    }
                    (NoteType::Normal | NoteType::Empty, _) => {}
                }
            }
            if let Some(index) = open_head {
                return Err(ChartError::UnmatchedHoldHead { lane, index });
            }
        }

        Ok(Chart { keys, rows })
    }

    pub fn keys(&self) -> u8 {
        self.keys
    }

    pub fn rows(&self) -> &[TimedRow] {
        &self.rows
    }

    pub fn first_note_time(&self) -> Time {
        self.rows[0].time
    }

    pub fn end_time(&self) -> Time {
        self.rows[self.rows.len() - 1].time
    }

    /// Chart duration: last row time minus first row time.
    pub fn duration(&self) -> Time {
        self.end_time() - self.first_note_time()
    }

    /// `(taps, holds)`: count of normal notes and of hold head/tail pairs.
    pub fn note_counts(&self) -> (usize, usize) {
        let mut taps = 0;
        let mut holds = 0;
        for timed in &self.rows {
            for (_, cell) in timed.row.iter_lanes() {
                match cell {
                    NoteType::Normal => taps += 1,
                    NoteType::HoldHead => holds += 1,
                    _ => {}
                }
            }
        }
        (taps, holds)
    }

    /// Upper bound on combo: every tap, hold head and hold tail is one
    /// opportunity to extend it.
    pub fn max_possible_combo(&self) -> u32 {
        let (taps, holds) = self.note_counts();
        (taps + 2 * holds) as u32
    }
}
