//! High-level API for decoding and scoring a set of utterances.
//!
//! An [`Evaluator`] owns the long-lived pieces (the label table and a configured decoder) and
//! can be reused across many runs. A run:
//! - reads utterances (emission matrices plus optional ground truth)
//! - checks every matrix's column count against the alphabet before any decoding starts
//! - decodes all utterances in parallel
//! - renders, scores, and streams each result through the selected encoder, in input order
//!
//! Failure model:
//! - An alphabet mismatch means the label table and the model disagree, so the whole run fails
//!   before anything is written.
//! - Anything else (out-of-domain values, ragged rows, an index the table cannot render) fails
//!   only its own utterance. That utterance is streamed with an `error` and no score, left out
//!   of the CER, and the run continues.

use std::io::{BufWriter, Read, Write};

use crate::batch::map_parallel;
use crate::decoder::{Decoded, Decoder};
use crate::emission::Emission;
use crate::error::{Error, Result};
use crate::json_array_encoder::JsonArrayEncoder;
use crate::labels::LabelTable;
use crate::opts::Opts;
use crate::output_type::OutputType;
use crate::result_encoder::ResultEncoder;
use crate::score::{CharErrors, Summary};
use crate::text_encoder::TextEncoder;
use crate::utterance::{Utterance, UtteranceResult, read_utterances};

/// Decodes utterances with one configured decoder and scores them against ground truth.
///
/// Design:
/// - The label table and decoder are built once and only borrowed during a run, so a single
///   evaluator can serve any number of runs (and threads, since both are `Sync`).
/// - Output goes through a `ResultEncoder`; `evaluate` picks one from `Opts::output_type`,
///   while `evaluate_utterances` accepts any caller-supplied encoder.
pub struct Evaluator {
    labels: LabelTable,
    decoder: Box<dyn Decoder>,
    opts: Opts,
}

impl Evaluator {
    /// Build an evaluator from a label table and options.
    ///
    /// We fail fast on inconsistent configuration: the decoder's blank must be the table's
    /// blank, and the decoder widths must be valid.
    pub fn new(labels: LabelTable, opts: Opts) -> Result<Self> {
        if opts.blank_index != labels.blank_index() {
            return Err(Error::msg(format!(
                "decoder blank index {} differs from label table blank index {}",
                opts.blank_index,
                labels.blank_index()
            )));
        }

        let decoder = opts.build_decoder()?;
        Ok(Self {
            labels,
            decoder,
            opts,
        })
    }

    pub fn labels(&self) -> &LabelTable {
        &self.labels
    }

    pub fn decoder(&self) -> &dyn Decoder {
        self.decoder.as_ref()
    }

    pub fn opts(&self) -> &Opts {
        &self.opts
    }

    /// Read a JSON array of utterances from `r`, decode and score them, and write results to `w`.
    pub fn evaluate<R, W>(&self, r: R, w: W) -> Result<Summary>
    where
        R: Read,
        W: Write,
    {
        let utterances = read_utterances(r)?;

        let writer = BufWriter::new(w);
        match self.opts.output_type {
            OutputType::Json => {
                let mut encoder = JsonArrayEncoder::new(writer);
                let run_res = self.evaluate_utterances(&utterances, &mut encoder);
                merge_run_and_close(run_res, encoder.close())
            }
            OutputType::Text => {
                let mut encoder = TextEncoder::new(writer);
                let run_res = self.evaluate_utterances(&utterances, &mut encoder);
                merge_run_and_close(run_res, encoder.close())
            }
        }
    }

    /// Decode and score already-parsed utterances, streaming results into `encoder`.
    ///
    /// Returns `Err` only for run-level failures (alphabet mismatch, encoder I/O). Callers own
    /// the encoder lifecycle; we never call `encoder.close()`.
    pub fn evaluate_utterances(
        &self,
        utterances: &[Utterance],
        encoder: &mut dyn ResultEncoder,
    ) -> Result<Summary> {
        for utterance in utterances {
            self.check_alphabet(utterance)?;
        }

        let outcomes = map_parallel(utterances, self.opts.workers(), |utterance| {
            self.decode_utterance(utterance)
        });

        let mut summary = Summary::default();
        for (utterance, outcome) in utterances.iter().zip(outcomes) {
            let result = match outcome {
                Ok((decoded, pred)) => {
                    let errors = utterance
                        .text
                        .as_deref()
                        .map(|truth| CharErrors::measure(&pred, truth));
                    summary.record(errors);
                    UtteranceResult::new(utterance.file.as_str(), pred, decoded.score, errors)
                }
                Err(err) => {
                    tracing::warn!(error = %err, "utterance failed");
                    summary.record_failure();
                    UtteranceResult::failed(utterance.file.as_str(), &err)
                }
            };
            encoder.write_result(&result)?;
        }

        tracing::info!(
            decoder = self.decoder.name(),
            utterances = summary.utterances,
            scored = summary.scored,
            failed = summary.failed,
            cer = summary.cer(),
            "evaluation finished"
        );

        Ok(summary)
    }

    /// Decode one utterance and render its prediction.
    ///
    /// Errors keep their variant and are attributed to the utterance (`Error::Utterance`);
    /// use [`Error::root`] to match on the cause.
    pub fn decode_utterance(&self, utterance: &Utterance) -> Result<(Decoded, String)> {
        let attribute = |err: Error| Error::in_utterance(&utterance.file, err);

        self.check_alphabet(utterance)?;
        let emission = Emission::from_rows(&utterance.emission, self.opts.domain).map_err(attribute)?;
        let decoded = self.decoder.decode(&emission).map_err(attribute)?;
        let pred = self.labels.render(&decoded.labels).map_err(attribute)?;

        Ok((decoded, pred))
    }

    /// The first row's width must match the alphabet. Later ragged rows are a shape error of
    /// that utterance alone.
    fn check_alphabet(&self, utterance: &Utterance) -> Result<()> {
        let Some(first) = utterance.emission.first() else {
            return Ok(());
        };

        if first.len() != self.labels.num_classes() {
            return Err(Error::in_utterance(
                &utterance.file,
                Error::AlphabetMismatch {
                    expected: self.labels.num_classes(),
                    got: first.len(),
                },
            ));
        }
        Ok(())
    }
}

/// Prefer the run error; a close failure after a failed run is only logged.
fn merge_run_and_close(run_res: Result<Summary>, close_res: Result<()>) -> Result<Summary> {
    match (run_res, close_res) {
        (Ok(summary), Ok(())) => Ok(summary),
        (Ok(_), Err(close_err)) => Err(close_err),
        (Err(err), Ok(())) => Err(err),
        (Err(err), Err(close_err)) => {
            tracing::warn!(error = %close_err, "failed to close encoder after run error");
            Err(err)
        }
    }
}
