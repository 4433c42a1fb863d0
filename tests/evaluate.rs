use std::io::Write;

use ctc_decode::batch::decode_batch;
use ctc_decode::output_type::OutputType;
use ctc_decode::{DecoderKind, Domain, Emission, Evaluator, LabelTable, Opts};

fn write_labels(symbols: &[&str]) -> anyhow::Result<tempfile::NamedTempFile> {
    let mut file = tempfile::NamedTempFile::new()?;
    serde_json::to_writer(&mut file, symbols)?;
    file.flush()?;
    Ok(file)
}

const INPUT: &str = r#"[
    {
        "file": "hello.wav",
        "emission": [
            [0.1, 0.8, 0.05, 0.05],
            [0.1, 0.8, 0.05, 0.05],
            [0.7, 0.1, 0.1, 0.1],
            [0.1, 0.1, 0.1, 0.7],
            [0.1, 0.1, 0.7, 0.1]
        ],
        "text": "h i"
    },
    {
        "file": "silence.wav",
        "emission": [[0.9, 0.05, 0.025, 0.025], [0.9, 0.05, 0.025, 0.025]],
        "text": "h"
    }
]"#;

#[test]
fn evaluates_against_labels_loaded_from_disk() -> anyhow::Result<()> {
    let labels_file = write_labels(&["h", "i", " "])?;
    let labels = LabelTable::from_json_file(labels_file.path(), 0)?;
    assert_eq!(labels.num_classes(), 4);

    let opts = Opts {
        domain: Domain::Probability,
        ..Opts::default()
    };
    let evaluator = Evaluator::new(labels, opts)?;

    let mut out = Vec::new();
    let summary = evaluator.evaluate(INPUT.as_bytes(), &mut out)?;

    let results: serde_json::Value = serde_json::from_slice(&out)?;
    let results = results.as_array().expect("expected JSON array");
    assert_eq!(results.len(), 2);

    // `h h - <space> i` collapses to `h <space> i`; spaces do not count against the score.
    assert_eq!(results[0]["file"], "hello.wav");
    assert_eq!(results[0]["pred"], "h i");
    assert_eq!(results[0]["edit_dist"], 0);
    assert_eq!(results[0]["gt_len"], 2);

    assert_eq!(results[1]["pred"], "");
    assert_eq!(results[1]["edit_dist"], 1);

    assert_eq!(summary.scored, 2);
    assert_eq!(summary.cer(), Some(1.0 / 3.0));
    Ok(())
}

#[test]
fn greedy_and_beam_agree_on_clear_input() -> anyhow::Result<()> {
    let labels = LabelTable::new(["h", "i", " "], 0)?;
    let mut outputs = Vec::new();

    for decoder in [DecoderKind::Greedy, DecoderKind::Beam] {
        let opts = Opts {
            decoder,
            domain: Domain::Probability,
            output_type: OutputType::Text,
            ..Opts::default()
        };
        let evaluator = Evaluator::new(labels.clone(), opts)?;

        let mut out = Vec::new();
        evaluator.evaluate(INPUT.as_bytes(), &mut out)?;
        outputs.push(String::from_utf8(out)?);
    }

    assert_eq!(outputs[0], "hello.wav\th i\nsilence.wav\t\n");
    assert_eq!(outputs[0], outputs[1]);
    Ok(())
}

#[test]
fn batch_decoding_through_configured_decoder() -> anyhow::Result<()> {
    let opts = Opts {
        beam_width: 2,
        ..Opts::default()
    };
    let decoder = opts.build_decoder()?;

    let emissions = vec![
        Emission::from_rows(&[vec![0.1, 0.9], vec![0.9, 0.1]], Domain::Probability)?,
        Emission::from_rows(&[vec![0.9, 0.1]], Domain::Probability)?,
    ];
    let results = decode_batch(decoder.as_ref(), &emissions, opts.workers());

    let labels: Vec<Vec<usize>> = results
        .into_iter()
        .map(|r| r.map(|d| d.labels))
        .collect::<Result<_, _>>()?;
    assert_eq!(labels, vec![vec![1], vec![]]);
    Ok(())
}

#[test]
fn missing_label_file_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    let missing = dir.path().join("labels.json");
    assert!(LabelTable::from_json_file(&missing, 0).is_err());
}
