use anyhow::{Context, Result};
use clap::Parser;

use std::fs::File;
use std::io::{self, BufReader, Read};
use std::path::PathBuf;

use ctc_decode::emission::Domain;
use ctc_decode::labels::{DEFAULT_BLANK_INDEX, LabelTable};
use ctc_decode::logging;
use ctc_decode::opts::{DecoderKind, Opts};
use ctc_decode::output_type::OutputType;
use ctc_decode::{Evaluator, decoders::DEFAULT_BEAM_WIDTH};

fn main() -> Result<()> {
    let params = Params::parse();
    logging::init(logging::level_for_verbosity(params.verbose));

    let labels = LabelTable::from_json_file(&params.labels_path, params.blank_index)?;
    let evaluator = Evaluator::new(labels, params.to_opts())?;

    let input = open_input(&params.input_path)?;
    let stdout = io::stdout();
    let summary = evaluator.evaluate(input, stdout.lock())?;

    if summary.failed > 0 {
        eprintln!(
            "{} of {} utterances could not be decoded",
            summary.failed, summary.utterances
        );
    }
    if let Some(cer) = summary.cer() {
        eprintln!("Character Error Rate is {:.2}%", cer * 100.0);
    }

    Ok(())
}

#[derive(Parser, Debug)]
#[command(name = "ctc-decode")]
#[command(about = "Decode CTC emission matrices and score them against ground truth")]
#[command(version)]
struct Params {
    /// JSON array of label symbols (blank excluded)
    #[arg(short = 'l', long = "labels")]
    pub labels_path: PathBuf,

    /// JSON array of utterances; `-` reads stdin
    #[arg(short = 'i', long = "input", default_value = "-")]
    pub input_path: String,

    #[arg(short = 'd', long = "decoder", value_enum, default_value_t = DecoderKind::Beam)]
    pub decoder: DecoderKind,

    #[arg(short = 'k', long = "beam-width", default_value_t = DEFAULT_BEAM_WIDTH)]
    pub beam_width: usize,

    /// Labels explored per hypothesis per step (defaults to the beam width)
    #[arg(long = "expand-width")]
    pub expand_width: Option<usize>,

    #[arg(short = 'b', long = "blank-index", default_value_t = DEFAULT_BLANK_INDEX)]
    pub blank_index: usize,

    #[arg(long = "domain", value_enum, default_value_t = Domain::LogProbability)]
    pub domain: Domain,

    #[arg(short = 'o', long = "output-type", value_enum, default_value_t = OutputType::Json)]
    pub output_type: OutputType,

    /// Worker threads (defaults to one per CPU)
    #[arg(short = 'w', long = "workers")]
    pub workers: Option<usize>,

    /// Log more to stderr; repeat for more detail (`CTC_DECODE_LOG` overrides)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,
}

impl Params {
    fn to_opts(&self) -> Opts {
        Opts {
            decoder: self.decoder,
            blank_index: self.blank_index,
            beam_width: self.beam_width,
            expand_width: self.expand_width,
            domain: self.domain,
            workers: self.workers,
            output_type: self.output_type,
        }
    }
}

fn open_input(path: &str) -> Result<Box<dyn Read>> {
    if path == "-" {
        return Ok(Box::new(io::stdin().lock()));
    }

    let file = File::open(path).with_context(|| format!("failed to open input '{path}'"))?;
    Ok(Box::new(BufReader::new(file)))
}
