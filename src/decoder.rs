use serde::Serialize;

use crate::Result;
use crate::emission::Emission;

/// A CTC decoder.
///
/// A decoder turns one [`Emission`] into one [`Decoded`] sequence. Implementations hold only
/// immutable configuration, so a single decoder can serve many threads at once; every call is
/// independent of every other call.
pub trait Decoder: Send + Sync {
    /// Short name used in logs and results.
    fn name(&self) -> &'static str;

    /// Class index treated as the CTC blank.
    fn blank_index(&self) -> usize;

    /// Decode one utterance.
    ///
    /// An emission with no timesteps decodes to an empty sequence with score `0.0`.
    fn decode(&self, emission: &Emission) -> Result<Decoded>;
}

impl<D: Decoder + ?Sized> Decoder for Box<D> {
    fn name(&self) -> &'static str {
        (**self).name()
    }

    fn blank_index(&self) -> usize {
        (**self).blank_index()
    }

    fn decode(&self, emission: &Emission) -> Result<Decoded> {
        (**self).decode(emission)
    }
}

/// The result of decoding one emission matrix.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Decoded {
    /// Collapsed, blank-free label indices.
    pub labels: Vec<usize>,

    /// The raw per-timestep path the decoder chose, before collapsing.
    pub path: Vec<usize>,

    /// Sum of log-probabilities along `path`.
    ///
    /// This is a path score: other raw paths that collapse to the same `labels` are not
    /// summed in.
    pub score: f64,
}

impl Decoded {
    pub(crate) fn empty() -> Self {
        Self {
            labels: Vec::new(),
            path: Vec::new(),
            score: 0.0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}
