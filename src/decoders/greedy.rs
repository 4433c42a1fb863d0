use ndarray_stats::QuantileExt;

use crate::collapse::collapse;
use crate::decoder::{Decoded, Decoder};
use crate::emission::Emission;
use crate::error::{Error, Result};
use crate::labels::DEFAULT_BLANK_INDEX;

/// Best-path decoder: arg-max per timestep, then collapse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GreedyDecoder {
    blank_index: usize,
}

impl GreedyDecoder {
    pub fn new(blank_index: usize) -> Self {
        Self { blank_index }
    }
}

impl Default for GreedyDecoder {
    fn default() -> Self {
        Self::new(DEFAULT_BLANK_INDEX)
    }
}

impl Decoder for GreedyDecoder {
    fn name(&self) -> &'static str {
        "greedy"
    }

    fn blank_index(&self) -> usize {
        self.blank_index
    }

    fn decode(&self, emission: &Emission) -> Result<Decoded> {
        if emission.is_empty() {
            return Ok(Decoded::empty());
        }
        emission.check_blank(self.blank_index)?;

        let mut path = Vec::with_capacity(emission.num_timesteps());
        let mut score = 0.0f64;

        for (t, row) in emission.rows().enumerate() {
            // First maximum wins on ties.
            let best = row
                .argmax()
                .map_err(|err| Error::msg(format!("arg-max failed at timestep {t}: {err}")))?;
            score += f64::from(row[best]);
            path.push(best);
        }

        let labels = collapse(&path, self.blank_index);
        tracing::debug!(
            decoder = self.name(),
            timesteps = path.len(),
            labels = labels.len(),
            score,
            "decoded"
        );

        Ok(Decoded {
            labels,
            path,
            score,
        })
    }
}
