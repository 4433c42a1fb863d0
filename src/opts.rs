use serde::Deserialize;

use crate::Result;
use crate::decoder::Decoder;
use crate::decoders::{BeamSearchDecoder, DEFAULT_BEAM_WIDTH, GreedyDecoder};
use crate::emission::Domain;
use crate::labels::DEFAULT_BLANK_INDEX;
use crate::output_type::OutputType;

/// Which decoding algorithm to run.
///
/// Both variants produce the same `Decoded` shape; `Beam` with a beam width of 1 and an
/// expand width of 1 returns exactly what `Greedy` does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum DecoderKind {
    /// Arg-max per timestep.
    Greedy,

    /// Path-level beam search.
    #[default]
    Beam,
}

/// Options that control how emissions are decoded and reported.
///
/// This is library-level configuration, not a mirror of the CLI:
/// - it deserializes from a kebab-case JSON object in which every field is optional
/// - the `ctc-decode` binary builds the same struct from its flags
/// - tests and embedding code construct it directly with struct-update syntax
///
/// Nothing is validated until [`Opts::build_decoder`], which is where zero widths are
/// rejected. The blank index is checked against the label table by the evaluator.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct Opts {
    pub decoder: DecoderKind,

    /// Class index treated as the CTC blank.
    pub blank_index: usize,

    /// Maximum number of hypotheses kept per timestep (beam search only).
    pub beam_width: usize,

    /// Labels explored per hypothesis per timestep (beam search only).
    ///
    /// When `None`, we use `beam_width`.
    pub expand_width: Option<usize>,

    /// Domain of the emission matrices we are handed.
    pub domain: Domain,

    /// Number of worker threads for batch decoding. `None` means one per CPU.
    pub workers: Option<usize>,

    pub output_type: OutputType,
}

impl Default for Opts {
    fn default() -> Self {
        Self {
            decoder: DecoderKind::default(),
            blank_index: DEFAULT_BLANK_INDEX,
            beam_width: DEFAULT_BEAM_WIDTH,
            expand_width: None,
            domain: Domain::default(),
            workers: None,
            output_type: OutputType::default(),
        }
    }
}

impl Opts {
    /// Parse options from JSON; missing fields take their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn expand_width(&self) -> usize {
        self.expand_width.unwrap_or(self.beam_width)
    }

    pub fn workers(&self) -> usize {
        self.workers.unwrap_or_else(num_cpus::get).max(1)
    }

    /// Validate the options and construct the selected decoder.
    pub fn build_decoder(&self) -> Result<Box<dyn Decoder>> {
        let decoder: Box<dyn Decoder> = match self.decoder {
            DecoderKind::Greedy => Box::new(GreedyDecoder::new(self.blank_index)),
            DecoderKind::Beam => Box::new(BeamSearchDecoder::new(
                self.blank_index,
                self.beam_width,
                self.expand_width(),
            )?),
        };
        Ok(decoder)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn defaults_match_the_documented_values() {
        let opts = Opts::default();
        assert_eq!(opts.decoder, DecoderKind::Beam);
        assert_eq!(opts.blank_index, 0);
        assert_eq!(opts.beam_width, 3);
        assert_eq!(opts.expand_width(), 3);
        assert_eq!(opts.domain, Domain::LogProbability);
        assert!(opts.workers() >= 1);
    }

    #[test]
    fn parses_partial_json() -> anyhow::Result<()> {
        let opts = Opts::from_json(
            r#"{ "decoder": "greedy", "blank-index": 2, "domain": "probability" }"#,
        )?;
        assert_eq!(opts.decoder, DecoderKind::Greedy);
        assert_eq!(opts.blank_index, 2);
        assert_eq!(opts.domain, Domain::Probability);
        assert_eq!(opts.beam_width, 3);
        Ok(())
    }

    #[test]
    fn expand_width_overrides_beam_width() {
        let opts = Opts {
            beam_width: 8,
            expand_width: Some(2),
            ..Opts::default()
        };
        assert_eq!(opts.expand_width(), 2);
    }

    #[test]
    fn builds_the_selected_decoder() -> anyhow::Result<()> {
        let beam = Opts::default().build_decoder()?;
        assert_eq!(beam.name(), "beam");

        let greedy = Opts {
            decoder: DecoderKind::Greedy,
            blank_index: 4,
            ..Opts::default()
        }
        .build_decoder()?;
        assert_eq!(greedy.name(), "greedy");
        assert_eq!(greedy.blank_index(), 4);
        Ok(())
    }

    #[test]
    fn zero_beam_width_fails_before_decoding() {
        let opts = Opts {
            beam_width: 0,
            ..Opts::default()
        };
        assert!(matches!(
            opts.build_decoder(),
            Err(Error::InvalidWidth { value: 0, .. })
        ));
    }
}
