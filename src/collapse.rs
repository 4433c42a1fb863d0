//! CTC path collapsing.

/// Collapse a raw CTC path into a label sequence.
///
/// Runs of equal indices are merged first, then every blank is dropped. The order matters:
/// `a - a` collapses to `a a`, while `a a` collapses to `a`.
pub fn collapse(path: &[usize], blank: usize) -> Vec<usize> {
    let mut out = Vec::with_capacity(path.len());
    let mut prev = None;

    for &index in path {
        if prev != Some(index) && index != blank {
            out.push(index);
        }
        prev = Some(index);
    }

    out
}
