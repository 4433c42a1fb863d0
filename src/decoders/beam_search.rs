//! Path-level CTC beam search.
//!
//! We keep at most `beam_width` raw (uncollapsed) label paths. At every timestep each path is
//! extended by the `expand_width` most likely labels of that timestep, and only the best
//! `beam_width` candidates survive. Collapsing happens once, on the winner.
//!
//! Hypotheses that collapse to the same label sequence are *not* merged, so the reported score
//! is the score of one path rather than the probability of a label sequence.

use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

use ndarray::ArrayView1;
use serde::Serialize;

use crate::collapse::collapse;
use crate::decoder::{Decoded, Decoder};
use crate::emission::Emission;
use crate::error::{Error, Result};
use crate::labels::DEFAULT_BLANK_INDEX;

/// Default number of hypotheses kept per timestep.
pub const DEFAULT_BEAM_WIDTH: usize = 3;

/// Marks the virtual root of every path in the back-pointer arena.
const ROOT: usize = usize::MAX;

/// A raw label path and its cumulative log score.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Hypothesis {
    pub path: Vec<usize>,
    pub score: f64,
}

impl Hypothesis {
    /// Collapsed, blank-free labels of this path.
    pub fn labels(&self, blank: usize) -> Vec<usize> {
        collapse(&self.path, blank)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeamSearchDecoder {
    blank_index: usize,
    beam_width: usize,
    expand_width: usize,
}

impl BeamSearchDecoder {
    /// Create a decoder; both widths must be at least 1.
    pub fn new(blank_index: usize, beam_width: usize, expand_width: usize) -> Result<Self> {
        if beam_width == 0 {
            return Err(Error::InvalidWidth {
                name: "beam width",
                value: beam_width,
            });
        }
        if expand_width == 0 {
            return Err(Error::InvalidWidth {
                name: "expand width",
                value: expand_width,
            });
        }

        Ok(Self {
            blank_index,
            beam_width,
            expand_width,
        })
    }

    /// Blank at index 0 and an expand width equal to the beam width.
    pub fn with_beam_width(beam_width: usize) -> Result<Self> {
        Self::new(DEFAULT_BLANK_INDEX, beam_width, beam_width)
    }

    pub fn beam_width(&self) -> usize {
        self.beam_width
    }

    pub fn expand_width(&self) -> usize {
        self.expand_width
    }

    /// Run the search and return the final beam, best hypothesis first.
    ///
    /// The beam is never empty: an emission without timesteps yields the single empty path.
    pub fn decode_beams(&self, emission: &Emission) -> Result<Vec<Hypothesis>> {
        emission.check_blank(self.blank_index)?;

        let t_len = emission.num_timesteps();
        let mut arena: Vec<Node> = Vec::with_capacity(t_len * self.beam_width);
        let mut beam = vec![Entry {
            node: ROOT,
            score: 0.0,
        }];
        let mut heap = BinaryHeap::with_capacity(self.beam_width);
        let mut labels = Vec::with_capacity(emission.num_classes());

        for (t, row) in emission.rows().enumerate() {
            top_labels(row, self.expand_width, &mut labels);

            for (b, entry) in beam.iter().enumerate() {
                for &label in &labels {
                    let candidate = Candidate {
                        score: entry.score + f64::from(row[label]),
                        beam: b,
                        label,
                    };
                    push_bounded(&mut heap, candidate, self.beam_width);
                }
            }

            // Ascending `Reverse` order is best-first.
            let survivors = std::mem::take(&mut heap).into_sorted_vec();
            let mut next = Vec::with_capacity(survivors.len());
            for Reverse(candidate) in survivors {
                arena.push(Node {
                    parent: beam[candidate.beam].node,
                    label: candidate.label,
                });
                next.push(Entry {
                    node: arena.len() - 1,
                    score: candidate.score,
                });
            }
            beam = next;

            tracing::trace!(t, beam = beam.len(), best = beam[0].score, "beam step");
        }

        Ok(beam
            .iter()
            .map(|entry| Hypothesis {
                path: backtrack(&arena, entry.node, t_len),
                score: entry.score,
            })
            .collect())
    }
}

impl Default for BeamSearchDecoder {
    fn default() -> Self {
        Self {
            blank_index: DEFAULT_BLANK_INDEX,
            beam_width: DEFAULT_BEAM_WIDTH,
            expand_width: DEFAULT_BEAM_WIDTH,
        }
    }
}

impl Decoder for BeamSearchDecoder {
    fn name(&self) -> &'static str {
        "beam"
    }

    fn blank_index(&self) -> usize {
        self.blank_index
    }

    fn decode(&self, emission: &Emission) -> Result<Decoded> {
        let Some(best) = self.decode_beams(emission)?.into_iter().next() else {
            return Ok(Decoded::empty());
        };

        let labels = best.labels(self.blank_index);
        tracing::debug!(
            decoder = self.name(),
            beam_width = self.beam_width,
            expand_width = self.expand_width,
            timesteps = best.path.len(),
            labels = labels.len(),
            score = best.score,
            "decoded"
        );

        Ok(Decoded {
            labels,
            path: best.path,
            score: best.score,
        })
    }
}

/// One step of a path: the label emitted and the node it extends.
struct Node {
    parent: usize,
    label: usize,
}

/// A live hypothesis: the arena node ending its path and its cumulative score.
struct Entry {
    node: usize,
    score: f64,
}

/// An extension of beam entry `beam` by `label`.
///
/// Ordered so that greater means better: higher score, then lower beam index, then lower
/// label index. `-inf` sorts below every finite score.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    score: f64,
    beam: usize,
    label: usize,
}

impl Ord for Candidate {
    fn cmp(&self, other: &Self) -> Ordering {
        self.score
            .total_cmp(&other.score)
            .then_with(|| other.beam.cmp(&self.beam))
            .then_with(|| other.label.cmp(&self.label))
    }
}

impl PartialOrd for Candidate {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl PartialEq for Candidate {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Candidate {}

/// Keep only the `capacity` best candidates; the heap top is the current worst.
fn push_bounded(heap: &mut BinaryHeap<Reverse<Candidate>>, candidate: Candidate, capacity: usize) {
    if heap.len() < capacity {
        heap.push(Reverse(candidate));
        return;
    }

    if let Some(mut worst) = heap.peek_mut() {
        if candidate > worst.0 {
            *worst = Reverse(candidate);
        }
    }
}

/// Fill `out` with the `k` most likely labels of `row`, best first, lower index on ties.
fn top_labels(row: ArrayView1<'_, f32>, k: usize, out: &mut Vec<usize>) {
    out.clear();
    out.extend(0..row.len());

    let by_rank = |a: &usize, b: &usize| row[*b].total_cmp(&row[*a]).then(a.cmp(b));
    if k < out.len() {
        out.select_nth_unstable_by(k - 1, by_rank);
        out.truncate(k);
    }
    out.sort_unstable_by(by_rank);
}

fn backtrack(arena: &[Node], mut node: usize, len: usize) -> Vec<usize> {
    let mut path = Vec::with_capacity(len);
    while node != ROOT {
        path.push(arena[node].label);
        node = arena[node].parent;
    }
    path.reverse();
    path
}
