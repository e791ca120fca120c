use serde::{Deserialize, Serialize};
use vsrg_model::{Chart, NoteType, Time};

/// Per-(row, lane) scoring status.
///
/// `HoldBodyRequired` is informational: input never matches it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum HitStatus {
    #[default]
    Nothing,
    HitRequired,
    HoldHeadRequired,
    HoldBodyRequired,
    ReleaseRequired,
    HitAccepted,
    ReleaseAccepted,
}

/// One row of the scoring ledger: recorded deltas and per-lane status.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitRow {
    pub time: Time,
    /// Rate-divided input deltas; the miss window until input arrives.
    pub deltas: Box<[Time]>,
    pub status: Box<[HitStatus]>,
}

/// The single source of truth for what the player still has to do:
/// one entry per chart row, strictly time-ordered.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitData {
    rows: Vec<HitRow>,
    keys: u8,
}

impl HitData {
    /// Seed the ledger from a chart: statuses mirror the note cells, deltas
    /// start at the miss-window sentinel ("no input associated yet").
    pub fn from_chart(chart: &Chart, miss_window: Time) -> Self {
        let keys = chart.keys();
        let rows = chart
            .rows()
            .iter()
            .map(|timed| {
                let status: Box<[HitStatus]> = timed
                    .row
                    .iter_lanes()
                    .map(|(_, cell)| match cell {
                        NoteType::Normal => HitStatus::HitRequired,
                        NoteType::HoldHead => HitStatus::HoldHeadRequired,
                        NoteType::HoldBody => HitStatus::HoldBodyRequired,
                        NoteType::HoldTail => HitStatus::ReleaseRequired,
                        NoteType::Empty => HitStatus::Nothing,
                    })
                    .collect();
                HitRow {
                    time: timed.time,
                    deltas: vec![miss_window; keys as usize].into_boxed_slice(),
                    status,
                }
            })
            .collect();
        HitData { rows, keys }
    }

    pub fn rows(&self) -> &[HitRow] {
        &self.rows
    }

    pub fn rows_mut(&mut self) -> &mut [HitRow] {
        &mut self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn keys(&self) -> u8 {
        self.keys
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsrg_model::{NoteRow, TimedRow};

    fn chart_with_hold() -> Chart {
        Chart::new(
            4,
            vec![
                TimedRow {
                    time: Time(1000.0),
                    row: NoteRow::empty(4)
                        .with(0, NoteType::Normal)
                        .with(1, NoteType::HoldHead),
                },
                TimedRow {
                    time: Time(1250.0),
                    row: NoteRow::empty(4).with(1, NoteType::HoldBody),
                },
                TimedRow {
                    time: Time(1500.0),
                    row: NoteRow::empty(4).with(1, NoteType::HoldTail),
                },
            ],
        )
        .unwrap()
    }

    #[test]
    fn statuses_mirror_note_cells() {
        let data = HitData::from_chart(&chart_with_hold(), Time(180.0));
        assert_eq!(data.len(), 3);
        assert_eq!(data.rows()[0].status[0], HitStatus::HitRequired);
        assert_eq!(data.rows()[0].status[1], HitStatus::HoldHeadRequired);
        assert_eq!(data.rows()[0].status[2], HitStatus::Nothing);
        assert_eq!(data.rows()[1].status[1], HitStatus::HoldBodyRequired);
        assert_eq!(data.rows()[2].status[1], HitStatus::ReleaseRequired);
    }

    #[test]
    fn deltas_seed_with_miss_window() {
        let data = HitData::from_chart(&chart_with_hold(), Time(180.0));
        for row in data.rows() {
            for &d in row.deltas.iter() {
                assert_eq!(d, Time(180.0));
            }
        }
    }

    #[test]
    fn entries_stay_time_ordered() {
        let data = HitData::from_chart(&chart_with_hold(), Time(180.0));
        for pair in data.rows().windows(2) {
            assert!(pair[0].time < pair[1].time);
        }
    }
}
