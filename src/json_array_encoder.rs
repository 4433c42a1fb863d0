use std::io::Write;

use crate::Result;
use crate::result_encoder::ResultEncoder;
use crate::utterance::UtteranceResult;

/// A `ResultEncoder` that streams results as one JSON array, one element per line.
///
/// Design:
/// - Each result is serialized straight into the writer as it arrives; a long run never holds
///   its output in memory.
/// - We flush after every element so a consumer reading a pipe sees each utterance as soon as
///   it is scored.
/// - The opening bracket is deferred, so a run that fails before its first result still
///   closes to a valid `[]`.
/// - Failed utterances are ordinary elements with an `error` field; the array stays valid.
///
/// Example output:
/// ```json
/// [
/// {"file":"a.wav","pred":"hello","score":-3.2,"edit_dist":0,"gt_len":5},
/// {"file":"b.wav","pred":"world","score":-4.1}
/// ]
/// ```
pub struct JsonArrayEncoder<W: Write> {
    w: W,
    state: State,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    /// Nothing written; `[` is deferred until the first result or close.
    Pending,
    /// `[` written, no elements yet.
    Open,
    /// At least one element written; the next needs a separator.
    Filled,
    Closed,
}

impl<W: Write> JsonArrayEncoder<W> {
    pub fn new(w: W) -> Self {
        Self {
            w,
            state: State::Pending,
        }
    }

    fn open(&mut self) -> Result<()> {
        if self.state == State::Pending {
            self.w.write_all(b"[\n")?;
            self.state = State::Open;
        }
        Ok(())
    }
}

impl<W: Write> ResultEncoder for JsonArrayEncoder<W> {
    fn write_result(&mut self, result: &UtteranceResult) -> Result<()> {
        if self.state == State::Closed {
            return Err(crate::Error::msg(
                "cannot write result: encoder is already closed",
            ));
        }

        self.open()?;
        if self.state == State::Filled {
            self.w.write_all(b",\n")?;
        }

        serde_json::to_writer(&mut self.w, result)?;
        self.w.flush()?;
        self.state = State::Filled;

        Ok(())
    }

    /// Terminate the array and flush. Idempotent; an encoder closed before any write emits `[]`.
    fn close(&mut self) -> Result<()> {
        match self.state {
            State::Closed => return Ok(()),
            State::Pending => self.w.write_all(b"[]\n")?,
            State::Open | State::Filled => self.w.write_all(b"\n]\n")?,
        }
        self.w.flush()?;

        self.state = State::Closed;
        Ok(())
    }
}
