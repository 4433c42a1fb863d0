use std::io::Read;

use serde::{Deserialize, Serialize};

use crate::score::CharErrors;
use crate::{Error, Result};

/// One utterance to decode: an emission matrix produced elsewhere, plus optional ground truth.
#[derive(Debug, Clone, Deserialize)]
pub struct Utterance {
    /// Identifier carried through to the result (typically the source audio file name).
    pub file: String,

    /// One row per timestep, one column per class.
    pub emission: Vec<Vec<f32>>,

    /// Ground-truth transcript, when known.
    #[serde(default)]
    pub text: Option<String>,
}

/// Read a JSON array of utterances.
pub fn read_utterances<R: Read>(reader: R) -> Result<Vec<Utterance>> {
    Ok(serde_json::from_reader(reader)?)
}

/// The outcome of decoding one utterance.
///
/// A failed utterance carries `error` and no score; it is never scored against ground truth.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UtteranceResult {
    pub file: String,

    /// Rendered prediction; empty when decoding failed.
    pub pred: String,

    /// Path score of the winning hypothesis.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub edit_dist: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gt_len: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl UtteranceResult {
    pub fn new(file: impl Into<String>, pred: String, score: f64, errors: Option<CharErrors>) -> Self {
        Self {
            file: file.into(),
            pred,
            score: Some(score),
            edit_dist: errors.map(|e| e.edit_dist),
            gt_len: errors.map(|e| e.gt_len),
            error: None,
        }
    }

    /// A result for an utterance that could not be decoded.
    pub fn failed(file: impl Into<String>, err: &Error) -> Self {
        Self {
            file: file.into(),
            pred: String::new(),
            score: None,
            edit_dist: None,
            gt_len: None,
            error: Some(err.root().to_string()),
        }
    }

    pub fn is_failed(&self) -> bool {
        self.error.is_some()
    }

    pub fn errors(&self) -> Option<CharErrors> {
        Some(CharErrors {
            edit_dist: self.edit_dist?,
            gt_len: self.gt_len?,
        })
    }
}
