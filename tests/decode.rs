use ctc_decode::{BeamSearchDecoder, Decoder, Domain, Emission, GreedyDecoder, LabelTable};
use ndarray::array;

fn alphabet() -> LabelTable {
    LabelTable::new(["a", "b"], 0).expect("valid table")
}

fn both_decoders(beam_width: usize) -> anyhow::Result<Vec<Box<dyn Decoder>>> {
    Ok(vec![
        Box::new(GreedyDecoder::default()),
        Box::new(BeamSearchDecoder::with_beam_width(beam_width)?),
    ])
}

/// Runs of one label merge; a blank between runs keeps them apart.
#[test]
fn repeated_label_runs_collapse_around_blanks() -> anyhow::Result<()> {
    let emission = Emission::new(
        array![
            [0.05, 0.9, 0.05],
            [0.05, 0.9, 0.05],
            [0.05, 0.9, 0.05],
            [0.9, 0.05, 0.05],
            [0.05, 0.9, 0.05],
        ],
        Domain::Probability,
    )?;
    let labels = alphabet();

    // Rows 0-2 repeat `a`, row 3 is blank, row 4 is `a` again: two runs, two labels.
    for decoder in both_decoders(1)? {
        let decoded = decoder.decode(&emission)?;
        assert_eq!(decoded.labels, vec![1, 1], "{}", decoder.name());
        assert_eq!(labels.render(&decoded.labels)?, "aa");
    }

    let emission = Emission::new(
        array![
            [0.05, 0.9, 0.05],
            [0.05, 0.9, 0.05],
            [0.05, 0.9, 0.05],
            [0.9, 0.05, 0.05],
            [0.9, 0.05, 0.05],
        ],
        Domain::Probability,
    )?;
    for decoder in both_decoders(1)? {
        let decoded = decoder.decode(&emission)?;
        assert_eq!(labels.render(&decoded.labels)?, "a", "{}", decoder.name());
    }
    Ok(())
}

#[test]
fn all_blank_emission_decodes_to_nothing() -> anyhow::Result<()> {
    let rows = vec![vec![0.999_f32, 0.0005, 0.0005]; 6];
    let emission = Emission::from_rows(&rows, Domain::Probability)?;

    for decoder in both_decoders(3)? {
        let decoded = decoder.decode(&emission)?;
        assert!(decoded.labels.is_empty(), "{}", decoder.name());
        assert_eq!(decoded.path, vec![0; 6]);
    }
    Ok(())
}

#[test]
fn single_timestep_decodes_to_at_most_one_label() -> anyhow::Result<()> {
    for row in [[0.7_f32, 0.2, 0.1], [0.1, 0.2, 0.7], [1.0 / 3.0, 1.0 / 3.0, 1.0 / 3.0]] {
        let emission = Emission::from_rows(&[row.to_vec()], Domain::Probability)?;
        for decoder in both_decoders(3)? {
            let decoded = decoder.decode(&emission)?;
            assert!(decoded.labels.len() <= 1);
            assert_eq!(decoded.path.len(), 1);
        }
    }
    Ok(())
}

#[test]
fn empty_emission_is_not_an_error() -> anyhow::Result<()> {
    let emission = Emission::from_rows(&[], Domain::LogProbability)?;
    for decoder in both_decoders(3)? {
        let decoded = decoder.decode(&emission)?;
        assert!(decoded.is_empty());
        assert_eq!(decoded.score, 0.0);
    }
    Ok(())
}

/// Several raw paths collapse to the same labels; the decoder returns the top path and the
/// rest of the beam keeps its documented order.
#[test]
fn beam_returns_top_path_among_equivalent_collapses() -> anyhow::Result<()> {
    let emission = Emission::new(
        array![[0.3, 0.6, 0.1], [0.5, 0.4, 0.1], [0.2, 0.3, 0.5]],
        Domain::Probability,
    )?;
    let decoder = BeamSearchDecoder::new(0, 3, 3)?;

    let beams = decoder.decode_beams(&emission)?;
    assert_eq!(beams.len(), 3);
    for pair in beams.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }

    // Best path `a - b`; runner-up `a a b` collapses to the same `a b`.
    assert_eq!(beams[0].path, vec![1, 0, 2]);
    assert_eq!(beams[1].path, vec![1, 1, 2]);
    assert_eq!(beams[0].labels(0), beams[1].labels(0));
    assert!(beams[0].score > beams[1].score);

    let decoded = decoder.decode(&emission)?;
    assert_eq!(decoded.path, beams[0].path);
    assert_eq!(decoded.score, beams[0].score);
    assert_eq!(alphabet().render(&decoded.labels)?, "ab");
    Ok(())
}

#[test]
fn log_probability_input_matches_probability_input() -> anyhow::Result<()> {
    let probs = array![[0.2, 0.5, 0.3], [0.6, 0.3, 0.1], [0.1, 0.1, 0.8]];
    let logs = probs.mapv(|p: f32| p.ln());

    let from_probs = Emission::new(probs, Domain::Probability)?;
    let from_logs = Emission::new(logs, Domain::LogProbability)?;
    let decoder = BeamSearchDecoder::with_beam_width(3)?;

    assert_eq!(decoder.decode(&from_probs)?, decoder.decode(&from_logs)?);
    Ok(())
}

#[test]
fn logits_decode_like_their_softmax() -> anyhow::Result<()> {
    let logits = array![[2.0, 5.0, 1.0], [4.0, 0.5, 0.5], [0.0, 1.0, 3.0]];
    let emission = Emission::new(logits, Domain::Logits)?;

    let decoded = GreedyDecoder::default().decode(&emission)?;
    assert_eq!(decoded.path, vec![1, 0, 2]);
    assert_eq!(alphabet().render(&decoded.labels)?, "ab");
    Ok(())
}

#[test]
fn long_low_probability_inputs_keep_a_ranking() -> anyhow::Result<()> {
    // Products of these probabilities underflow f32 long before the end; log scores do not.
    let rows: Vec<Vec<f32>> = (0..400)
        .map(|t| {
            if t % 2 == 0 {
                vec![0.2, 0.45, 0.35]
            } else {
                vec![0.5, 0.3, 0.2]
            }
        })
        .collect();
    let emission = Emission::from_rows(&rows, Domain::Probability)?;

    let beams = BeamSearchDecoder::with_beam_width(4)?.decode_beams(&emission)?;
    assert!(beams.iter().all(|h| h.score.is_finite()));
    assert!(beams[0].score > beams[beams.len() - 1].score);
    Ok(())
}
