use crate::Result;
use crate::utterance::UtteranceResult;

/// Streams per-utterance results to some output format.
pub trait ResultEncoder {
    fn write_result(&mut self, result: &UtteranceResult) -> Result<()>;
    fn close(&mut self) -> Result<()>;
}
