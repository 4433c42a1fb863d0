//! Typed emission matrices.
//!
//! An [`Emission`] is a `T × C` row-major matrix: one row per timestep, one column per class
//! (the blank included). Callers declare which [`Domain`] their numbers are in; we validate
//! every value at construction and store log-probabilities internally, so decoders only ever
//! add scores and never multiply probabilities that would underflow over long inputs.

use std::fmt;

use ndarray::{Array2, ArrayView1, Axis};
use serde::Deserialize;

use crate::error::{Error, Result};

/// Smallest probability we take the logarithm of.
///
/// Zero probabilities are floored here so `ln` never yields `-inf` or NaN for
/// probability-domain input.
pub const PROB_FLOOR: f32 = f32::MIN_POSITIVE;

/// Slack allowed above 1.0 (probabilities) or 0.0 (log-probabilities) for rounding noise.
const DOMAIN_TOLERANCE: f32 = 1e-4;

/// The numeric domain of an emission matrix as handed to us.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum Domain {
    /// Natural probabilities in `[0, 1]`.
    Probability,

    /// Log-probabilities (`<= 0`, `-inf` allowed).
    #[default]
    LogProbability,

    /// Unnormalized scores; rows go through a log-softmax.
    Logits,
}

impl fmt::Display for Domain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Domain::Probability => "probability",
            Domain::LogProbability => "log-probability",
            Domain::Logits => "logits",
        };
        f.write_str(name)
    }
}

/// A validated `T × C` matrix of per-timestep log-probabilities.
#[derive(Debug, Clone, PartialEq)]
pub struct Emission {
    log_probs: Array2<f32>,
}

impl Emission {
    /// Build an emission from a matrix in the given domain.
    ///
    /// A matrix with zero rows is valid and decodes to an empty sequence. A matrix with rows
    /// but no columns is rejected.
    pub fn new(matrix: Array2<f32>, domain: Domain) -> Result<Self> {
        if matrix.nrows() > 0 && matrix.ncols() == 0 {
            return Err(Error::InvalidShape(format!(
                "{} timesteps with no classes",
                matrix.nrows()
            )));
        }

        validate(&matrix, domain)?;

        let log_probs = match domain {
            Domain::Probability => matrix.mapv_into(|p| p.max(PROB_FLOOR).ln()),
            Domain::LogProbability => matrix,
            Domain::Logits => log_softmax(matrix),
        };

        Ok(Self { log_probs })
    }

    /// Build an emission from one `Vec` per timestep.
    pub fn from_rows(rows: &[Vec<f32>], domain: Domain) -> Result<Self> {
        let classes = rows.first().map_or(0, Vec::len);
        let mut flat = Vec::with_capacity(rows.len() * classes);

        for (t, row) in rows.iter().enumerate() {
            if row.len() != classes {
                return Err(Error::InvalidShape(format!(
                    "row {t} has {} classes, expected {classes}",
                    row.len()
                )));
            }
            flat.extend_from_slice(row);
        }

        let matrix = Array2::from_shape_vec((rows.len(), classes), flat)?;
        Self::new(matrix, domain)
    }

    /// Number of timesteps (`T`).
    pub fn num_timesteps(&self) -> usize {
        self.log_probs.nrows()
    }

    /// Number of classes per timestep (`C`), blank included.
    pub fn num_classes(&self) -> usize {
        self.log_probs.ncols()
    }

    pub fn is_empty(&self) -> bool {
        self.num_timesteps() == 0
    }

    /// Log-probabilities of timestep `t`.
    ///
    /// Panics if `t` is out of range.
    pub fn row(&self, t: usize) -> ArrayView1<'_, f32> {
        self.log_probs.row(t)
    }

    pub fn rows(&self) -> impl ExactSizeIterator<Item = ArrayView1<'_, f32>> {
        self.log_probs.outer_iter()
    }

    /// The full log-probability matrix.
    pub fn log_probs(&self) -> &Array2<f32> {
        &self.log_probs
    }

    /// Ensure `blank` addresses a column. Empty matrices accept any blank.
    pub(crate) fn check_blank(&self, blank: usize) -> Result<()> {
        if !self.is_empty() && blank >= self.num_classes() {
            return Err(Error::BlankOutOfRange {
                blank,
                classes: self.num_classes(),
            });
        }
        Ok(())
    }
}

fn validate(matrix: &Array2<f32>, domain: Domain) -> Result<()> {
    for ((row, col), &value) in matrix.indexed_iter() {
        let ok = match domain {
            Domain::Probability => {
                value.is_finite() && (0.0..=1.0 + DOMAIN_TOLERANCE).contains(&value)
            }
            Domain::LogProbability => !value.is_nan() && value <= DOMAIN_TOLERANCE,
            Domain::Logits => value.is_finite(),
        };

        if !ok {
            return Err(Error::InvalidValue {
                row,
                col,
                value,
                domain,
            });
        }
    }
    Ok(())
}

/// Row-wise log-softmax with max subtraction for stability.
fn log_softmax(mut logits: Array2<f32>) -> Array2<f32> {
    for mut row in logits.axis_iter_mut(Axis(0)) {
        let max = row.fold(f32::NEG_INFINITY, |acc, &v| acc.max(v));
        let log_sum = row.iter().map(|&v| (v - max).exp()).sum::<f32>().ln() + max;
        row.mapv_inplace(|v| v - log_sum);
    }
    logits
}
