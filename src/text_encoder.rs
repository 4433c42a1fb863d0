use std::io::Write;

use crate::Result;
use crate::result_encoder::ResultEncoder;
use crate::utterance::UtteranceResult;

/// A `ResultEncoder` that writes one `file<TAB>prediction` line per utterance.
///
/// Failed utterances get a third column with the error and an empty prediction:
/// `file<TAB><TAB>error`. Tabs and newlines inside fields are escaped so every result stays
/// on one line.
pub struct TextEncoder<W: Write> {
    w: W,
    closed: bool,
}

impl<W: Write> TextEncoder<W> {
    pub fn new(w: W) -> Self {
        Self { w, closed: false }
    }
}

impl<W: Write> ResultEncoder for TextEncoder<W> {
    fn write_result(&mut self, result: &UtteranceResult) -> Result<()> {
        if self.closed {
            return Err(crate::Error::msg(
                "cannot write result: encoder is already closed",
            ));
        }

        write!(
            &mut self.w,
            "{}\t{}",
            escape(&result.file),
            escape(&result.pred)
        )?;
        if let Some(error) = &result.error {
            write!(&mut self.w, "\t{}", escape(error))?;
        }
        self.w.write_all(b"\n")?;
        self.w.flush()?;

        Ok(())
    }

    /// Flush the underlying writer. Idempotent.
    fn close(&mut self) -> Result<()> {
        if self.closed {
            return Ok(());
        }

        self.w.flush()?;
        self.closed = true;

        Ok(())
    }
}

fn escape(text: &str) -> String {
    text.replace('\\', "\\\\")
        .replace('\t', "\\t")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn writes_one_line_per_result() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = TextEncoder::new(&mut out);

        enc.write_result(&UtteranceResult::new("a.wav", "hi there".into(), -1.0, None))?;
        enc.write_result(&UtteranceResult::new("b.wav", "".into(), 0.0, None))?;
        enc.close()?;

        assert_eq!(std::str::from_utf8(&out)?, "a.wav\thi there\nb.wav\t\n");
        Ok(())
    }

    #[test]
    fn escapes_control_characters() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = TextEncoder::new(&mut out);

        enc.write_result(&UtteranceResult::new("a.wav", "x\ty\nz".into(), -1.0, None))?;
        assert_eq!(std::str::from_utf8(&out)?, "a.wav\tx\\ty\\nz\n");
        Ok(())
    }

    #[test]
    fn failed_results_get_an_error_column() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = TextEncoder::new(&mut out);

        let err = crate::Error::InvalidShape("row 1 has 2 classes,\texpected 3".into());
        enc.write_result(&UtteranceResult::failed("a.wav", &err))?;
        assert_eq!(
            std::str::from_utf8(&out)?,
            "a.wav\t\tinvalid emission shape: row 1 has 2 classes,\\texpected 3\n"
        );
        Ok(())
    }

    #[test]
    fn write_after_close_errors() -> anyhow::Result<()> {
        let mut out = Vec::new();
        let mut enc = TextEncoder::new(&mut out);
        enc.close()?;
        enc.close()?;
        let res = enc.write_result(&UtteranceResult::new("a.wav", "x".into(), 0.0, None));
        assert!(res.is_err());
        Ok(())
    }
}
