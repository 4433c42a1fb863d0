//! Built-in CTC decoders.

mod beam_search;
mod greedy;

pub use beam_search::{BeamSearchDecoder, DEFAULT_BEAM_WIDTH, Hypothesis};
pub use greedy::GreedyDecoder;
