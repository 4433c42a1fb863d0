//! Character-level scoring of predictions against ground truth.

use serde::Serialize;

/// Levenshtein distance between two strings, counted in `char`s.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.chars().enumerate() {
        curr[0] = i + 1;
        for (j, &cb) in b.iter().enumerate() {
            let substitution = prev[j] + usize::from(ca != cb);
            curr[j + 1] = substitution.min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }

    prev[b.len()]
}

/// Drop spaces; character error rate ignores word boundaries.
pub fn strip_spaces(text: &str) -> String {
    text.chars().filter(|&c| c != ' ').collect()
}

/// Edit distance and reference length for one scored utterance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CharErrors {
    pub edit_dist: usize,
    pub gt_len: usize,
}

impl CharErrors {
    /// Compare a prediction against ground truth, both with spaces removed.
    pub fn measure(prediction: &str, truth: &str) -> Self {
        let truth = strip_spaces(truth);
        Self {
            edit_dist: edit_distance(&strip_spaces(prediction), &truth),
            gt_len: truth.chars().count(),
        }
    }
}

/// Aggregate over a run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Summary {
    pub utterances: usize,
    pub scored: usize,
    /// Utterances that could not be decoded; they never count towards the CER.
    pub failed: usize,
    pub total_edit_dist: usize,
    pub total_gt_len: usize,
}

impl Summary {
    pub fn record(&mut self, errors: Option<CharErrors>) {
        self.utterances += 1;
        if let Some(errors) = errors {
            self.scored += 1;
            self.total_edit_dist += errors.edit_dist;
            self.total_gt_len += errors.gt_len;
        }
    }

    pub fn record_failure(&mut self) {
        self.utterances += 1;
        self.failed += 1;
    }

    /// Character error rate, or `None` when nothing had ground truth to compare against.
    pub fn cer(&self) -> Option<f64> {
        (self.total_gt_len > 0).then(|| self.total_edit_dist as f64 / self.total_gt_len as f64)
    }
}
