//! `ctc-decode` — CTC decoding of per-timestep label distributions.
//!
//! This crate provides:
//! - A typed, validated emission matrix (`Emission`) in probability, log-probability, or
//!   logit form
//! - Greedy (best-path) and path-level beam-search decoders behind one `Decoder` trait
//! - A label table mapping class indices to symbols, with the blank reserved
//! - Batch decoding across worker threads
//! - An evaluation driver that renders predictions, scores them against ground truth,
//!   and streams results as JSON or text
//!
//! Decoding is pure and synchronous: one emission in, one label sequence and path score out,
//! with no state shared between calls.

// Core types and decoding.
pub mod collapse;
pub mod decoder;
pub mod decoders;
pub mod emission;
pub mod labels;

// Configuration.
pub mod opts;
pub mod output_type;

// Batch decoding and evaluation.
pub mod batch;
pub mod evaluate;
pub mod score;
pub mod utterance;

// Output encoders that serialize results into various formats.
pub mod json_array_encoder;
pub mod result_encoder;
pub mod text_encoder;

// Logging configuration.
#[cfg(feature = "logging")]
pub mod logging;

mod error;

pub use collapse::collapse;
pub use decoder::{Decoded, Decoder};
pub use decoders::{BeamSearchDecoder, GreedyDecoder, Hypothesis};
pub use emission::{Domain, Emission};
pub use error::{Error, Result};
pub use evaluate::Evaluator;
pub use labels::LabelTable;
pub use opts::{DecoderKind, Opts};
