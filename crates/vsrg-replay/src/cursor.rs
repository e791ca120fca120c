use vsrg_model::Time;

use crate::key_bits::KeyBits;
use crate::replay_data::{ReplayData, ReplayError};

/// Receiver for key edges decoded from a replay stream.
///
/// One method per event kind; the consumer drives these in frame order,
/// lane-ascending within a frame.
pub trait KeySink {
    fn key_down(&mut self, time: Time, lane: usize);
    fn key_up(&mut self, time: Time, lane: usize);
}

/// A monotonically advancing cursor over a replay frame stream.
///
/// `advance_to` consumes frames up to the given chart time and dispatches the
/// press/release edges between consecutive bitmasks to a [`KeySink`]. Frames
/// must be time-nondecreasing; the cursor does not reorder input.
#[derive(Debug, Clone)]
pub struct ReplayCursor {
    data: ReplayData,
    pos: usize,
    last: KeyBits,
    last_time: Time,
}

impl ReplayCursor {
    pub fn new(data: ReplayData) -> Self {
        ReplayCursor {
            data,
            pos: 0,
            last: KeyBits::EMPTY,
            last_time: Time(f32::NEG_INFINITY),
        }
    }

    /// The bitmask of the most recently consumed frame.
    pub fn current_keys(&self) -> KeyBits {
        self.last
    }

    /// True once every frame has been consumed.
    pub fn exhausted(&self) -> bool {
        self.pos >= self.data.len()
    }

    /// Consume frames with `frame.time <= time`, dispatching each frame's
    /// edges in a single ascending-lane pass over the union of presses and
    /// releases, so the overall dispatch order is `(frame time, lane)`.
    pub fn advance_to(&mut self, time: Time, sink: &mut impl KeySink) -> Result<(), ReplayError> {
        while let Some(frame) = self.data.frames().get(self.pos) {
            if frame.time > time {
                break;
            }
            if frame.time < self.last_time {
                return Err(ReplayError::OutOfOrder {
                    index: self.pos,
                    time: frame.time,
                    prev: self.last_time,
                });
            }

            let pressed = frame.keys.just_pressed(self.last);
            let released = frame.keys.just_released(self.last);
            for lane in pressed.union(released).lanes() {
                if pressed.has(lane) {
                    sink.key_down(frame.time, lane);
                } else {
                    sink.key_up(frame.time, lane);
                }
            }

            self.last = frame.keys;
            self.last_time = frame.time;
            self.pos += 1;
        }
        Ok(())
    }
}
