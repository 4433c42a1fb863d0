//! Decode many independent utterances on a pool of worker threads.
//!
//! Each utterance is decoded exactly once by exactly one worker. Decoders are `Sync` and hold
//! no per-call state, so workers share one decoder by reference without locking; the only
//! shared mutable state is the atomic cursor handing out work.

use std::panic;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::thread;

use crate::Result;
use crate::decoder::{Decoded, Decoder};
use crate::emission::Emission;

/// Decode `emissions` with up to `workers` threads, returning results in input order.
///
/// A failing utterance yields an `Err` in its slot and does not affect the others.
pub fn decode_batch<D>(decoder: &D, emissions: &[Emission], workers: usize) -> Vec<Result<Decoded>>
where
    D: Decoder + ?Sized,
{
    map_parallel(emissions, workers, |emission| decoder.decode(emission))
}

/// Apply `f` to every item on up to `workers` scoped threads, preserving input order.
///
/// Every output is tagged with the index of its input and placed by that index. A panic in `f`
/// is re-raised on the calling thread once all workers have stopped.
pub(crate) fn map_parallel<T, R, F>(items: &[T], workers: usize, f: F) -> Vec<R>
where
    T: Sync,
    R: Send,
    F: Fn(&T) -> R + Sync,
{
    let workers = workers.clamp(1, items.len().max(1));
    if workers == 1 {
        return items.iter().map(f).collect();
    }

    tracing::debug!(items = items.len(), workers, "decoding batch");

    let next = AtomicUsize::new(0);
    let mut tagged: Vec<(usize, R)> = thread::scope(|scope| {
        let handles: Vec<_> = (0..workers)
            .map(|_| {
                scope.spawn(|| {
                    let mut done = Vec::new();
                    loop {
                        let i = next.fetch_add(1, Ordering::Relaxed);
                        let Some(item) = items.get(i) else {
                            break;
                        };
                        done.push((i, f(item)));
                    }
                    done
                })
            })
            .collect();

        let mut tagged = Vec::with_capacity(items.len());
        let mut panicked = None;
        for handle in handles {
            match handle.join() {
                Ok(done) => tagged.extend(done),
                Err(payload) => panicked = panicked.or(Some(payload)),
            }
        }
        if let Some(payload) = panicked {
            panic::resume_unwind(payload);
        }
        tagged
    });

    // Indices are handed out once each, so sorting restores input order with no gaps.
    tagged.sort_unstable_by_key(|(i, _)| *i);
    debug_assert!(tagged.iter().enumerate().all(|(pos, (i, _))| pos == *i));
    tagged.into_iter().map(|(_, out)| out).collect()
}
