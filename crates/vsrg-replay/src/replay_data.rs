use serde::{Deserialize, Serialize};
use thiserror::Error;
use vsrg_model::{Chart, NoteType, Time};

use crate::key_bits::KeyBits;

/// How long a synthesized tap is held down, when the chart leaves room.
const SYNTH_TAP_MS: f32 = 25.0;

/// One key-state snapshot: the full bitmask at a chart time.
///
/// Consecutive frames encode edges; a frame equal to its predecessor is legal
/// but carries no information.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReplayFrame {
    pub time: Time,
    pub keys: KeyBits,
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("replay frame {index} at {time} precedes previous frame at {prev}")]
    OutOfOrder {
        index: usize,
        time: Time,
        prev: Time,
    },
}

/// An owned, time-ordered replay frame sequence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplayData {
    frames: Vec<ReplayFrame>,
}

impl ReplayData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a frame, enforcing non-decreasing time.
    pub fn push(&mut self, frame: ReplayFrame) -> Result<(), ReplayError> {
        if let Some(last) = self.frames.last()
            && frame.time < last.time
        {
            return Err(ReplayError::OutOfOrder {
                index: self.frames.len(),
                time: frame.time,
                prev: last.time,
            });
        }
        self.frames.push(frame);
        Ok(())
    }

    pub fn from_frames(frames: Vec<ReplayFrame>) -> Result<Self, ReplayError> {
        let mut data = Self::new();
        for frame in frames {
            data.push(frame)?;
        }
        Ok(data)
    }

    pub fn frames(&self) -> &[ReplayFrame] {
        &self.frames
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn is_empty(&self) -> bool {
        self.frames.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ReplayFrame> {
        self.frames.iter()
    }

    /// Synthesize the replay that hits every note exactly on time.
    ///
    /// Taps are held briefly (shortened when the next note on the lane is
    /// close); holds are pressed at the head and released at the tail.
    pub fn perfect(chart: &Chart) -> Self {
        // (time, lane, pressed) edges, gathered per lane
        let mut edges: Vec<(Time, usize, bool)> = Vec::new();

        for lane in 0..chart.keys() as usize {
            let onsets: Vec<(Time, NoteType)> = chart
                .rows()
                .iter()
                .filter_map(|r| {
                    let cell = r.row.cell(lane);
                    (cell != NoteType::Empty && cell != NoteType::HoldBody)
                        .then_some((r.time, cell))
                })
                .collect();

            for (i, &(time, cell)) in onsets.iter().enumerate() {
                match cell {
                    NoteType::Normal => {
                        edges.push((time, lane, true));
                        let release = match onsets.get(i + 1) {
                            Some(&(next, _)) => {
                                (time + Time(SYNTH_TAP_MS)).min((time + next) / 2.0)
                            }
                            None => time + Time(SYNTH_TAP_MS),
                        };
                        edges.push((release, lane, false));
                    }
                    NoteType::HoldHead => edges.push((time, lane, true)),
                    NoteType::HoldTail => edges.push((time, lane, false)),
                    NoteType::Empty | NoteType::HoldBody => unreachable!(),
                }
            }
        }

        edges.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut data = Self::new();
        let mut bits = KeyBits::EMPTY;
        let mut i = 0;
        while i < edges.len() {
            let time = edges[i].0;
            while i < edges.len() && edges[i].0 == time {
                let (_, lane, pressed) = edges[i];
                bits = if pressed {
                    bits.with(lane)
                } else {
                    bits.without(lane)
                };
                i += 1;
            }
            data.frames.push(ReplayFrame { time, keys: bits });
        }
        data
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use vsrg_model::{NoteRow, TimedRow};

    fn frame(time: f32, bits: u16) -> ReplayFrame {
        ReplayFrame {
            time: Time(time),
            keys: KeyBits(bits),
        }
    }

    #[test]
    fn push_accepts_monotone_frames() {
        let mut data = ReplayData::new();
        data.push(frame(0.0, 0b01)).unwrap();
        data.push(frame(10.0, 0b11)).unwrap();
        data.push(frame(10.0, 0b10)).unwrap();
        assert_eq!(data.len(), 3);
    }

    #[test]
    fn push_rejects_backwards_frame() {
        let mut data = ReplayData::new();
        data.push(frame(100.0, 0)).unwrap();
        let err = data.push(frame(50.0, 1)).unwrap_err();
        assert!(matches!(err, ReplayError::OutOfOrder { index: 1, .. }));
    }

    #[test]
    fn perfect_replay_presses_every_tap() {
        let chart = Chart::new(
            4,
            vec![
                TimedRow {
                    time: Time(1000.0),
                    row: NoteRow::empty(4).with(0, NoteType::Normal),
                },
                TimedRow {
                    time: Time(1500.0),
                    row: NoteRow::empty(4).with(1, NoteType::Normal),
                },
            ],
        )
        .unwrap();

        let data = ReplayData::perfect(&chart);
        assert_eq!(data.frames()[0], frame(1000.0, 0b01));
        assert!(data.frames().iter().any(|f| f.keys == KeyBits::EMPTY));
        assert!(
            data.frames()
                .iter()
                .any(|f| f.time == Time(1500.0) && f.keys.has(1))
        );
    }

    #[test]
    fn perfect_replay_shortens_taps_in_jacks() {
        // Two taps 20ms apart on the same lane: release must land between them.
        let chart = Chart::new(
            4,
            vec![
                TimedRow {
                    time: Time(1000.0),
                    row: NoteRow::empty(4).with(0, NoteType::Normal),
                },
                TimedRow {
                    time: Time(1020.0),
                    row: NoteRow::empty(4).with(0, NoteType::Normal),
                },
            ],
        )
        .unwrap();

        let data = ReplayData::perfect(&chart);
        let release = data
            .frames()
            .iter()
            .find(|f| !f.keys.has(0) && f.time > Time(1000.0))
            .unwrap();
        assert!(release.time < Time(1020.0));
    }

    #[test]
    fn perfect_replay_holds_until_tail() {
        let chart = Chart::new(
            4,
            vec![
                TimedRow {
                    time: Time(1000.0),
                    row: NoteRow::empty(4).with(2, NoteType::HoldHead),
                },
                TimedRow {
                    time: Time(1400.0),
                    row: NoteRow::empty(4).with(2, NoteType::HoldBody),
                },
                TimedRow {
                    time: Time(1800.0),
                    row: NoteRow::empty(4).with(2, NoteType::HoldTail),
                },
            ],
        )
        .unwrap();

        let data = ReplayData::perfect(&chart);
        assert_eq!(data.frames().len(), 2);
        assert_eq!(data.frames()[0], frame(1000.0, 0b100));
        assert_eq!(data.frames()[1], frame(1800.0, 0));
    }

    #[test]
    fn serde_round_trip() {
        let data = ReplayData::from_frames(vec![frame(0.0, 1), frame(5.0, 0)]).unwrap();
        let json = serde_json::to_string(&data).unwrap();
        let back: ReplayData = serde_json::from_str(&json).unwrap();
        assert_eq!(data, back);
    }
}
