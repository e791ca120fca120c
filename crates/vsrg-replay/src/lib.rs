// Replay input: per-lane key bitmasks, frame streams, edge dispatch

mod cursor;
mod key_bits;
mod replay_data;

pub use cursor::{KeySink, ReplayCursor};
pub use key_bits::KeyBits;
pub use replay_data::{ReplayData, ReplayError, ReplayFrame};
