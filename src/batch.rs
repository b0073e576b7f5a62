//! Code length extraction for many blocks at once.
//!
//! Each histogram is independent, so blocks are spread over a pool of scoped worker threads:
//! - Dispatcher thread: sends one job per block
//! - Worker pool: extracts code lengths
//! - Calling thread: collects results and restores block order

use crossbeam::channel::{bounded, Receiver, Sender};

use crate::codelens::{prepare_checked, CodeLengths};
use crate::error::{Error, Result};
use crate::histogram::Histogram;
use crate::ExtractConfig;

/// Upper bound on worker threads
const MAX_THREADS: usize = 32;

/// A job for extracting a single block
struct ExtractJob<'a> {
    /// Position of the block in the input
    block_id: usize,
    histogram: &'a Histogram,
}

/// Result of extracting a single block
struct ExtractedBlock {
    block_id: usize,
    result: Result<CodeLengths>,
}

/// Extract code lengths for every histogram, returned in input order.
///
/// When `config.validate` is set every block is checked, and the error of the earliest
/// failing block is returned.
pub fn prepare_batch(
    histograms: &[Histogram],
    config: &ExtractConfig,
) -> Result<Vec<CodeLengths>> {
    let num_threads = effective_threads(config.num_threads, histograms.len());

    if num_threads == 1 {
        return histograms.iter().map(|histogram| prepare_checked(histogram, config)).collect();
    }

    prepare_parallel(histograms, config, num_threads)
}

/// Resolve the requested thread count (0 = one per CPU), never exceeding the block count
fn effective_threads(requested: usize, blocks: usize) -> usize {
    let threads = match requested {
        0 => num_cpus::get().clamp(1, MAX_THREADS),
        n => n.clamp(1, MAX_THREADS),
    };
    threads.min(blocks.max(1))
}

fn prepare_parallel(
    histograms: &[Histogram],
    config: &ExtractConfig,
    num_threads: usize,
) -> Result<Vec<CodeLengths>> {
    let channel_capacity = num_threads * 4;

    let (job_tx, job_rx): (Sender<ExtractJob<'_>>, Receiver<ExtractJob<'_>>) =
        bounded(channel_capacity);
    let (result_tx, result_rx): (Sender<ExtractedBlock>, Receiver<ExtractedBlock>) =
        bounded(channel_capacity);

    let result = crossbeam::scope(|scope| {
        for _ in 0..num_threads {
            let job_rx = job_rx.clone();
            let result_tx = result_tx.clone();

            scope.spawn(move |_| {
                worker_thread(job_rx, result_tx, config);
            });
        }

        // Drop our copies of the channels that workers use
        drop(job_rx);
        drop(result_tx);

        scope.spawn(move |_| {
            for (block_id, histogram) in histograms.iter().enumerate() {
                if job_tx.send(ExtractJob { block_id, histogram }).is_err() {
                    break;
                }
            }
        });

        collect_in_order(result_rx, histograms.len())
    });

    result.map_err(|_| Error::Internal("Thread panicked".to_string()))?
}

/// Worker thread function: extracts code lengths until the job channel closes
fn worker_thread(
    job_rx: Receiver<ExtractJob<'_>>,
    result_tx: Sender<ExtractedBlock>,
    config: &ExtractConfig,
) {
    while let Ok(job) = job_rx.recv() {
        let result = prepare_checked(job.histogram, config);

        if result_tx.send(ExtractedBlock { block_id: job.block_id, result }).is_err() {
            break;
        }
    }
}

fn collect_in_order(
    result_rx: Receiver<ExtractedBlock>,
    total: usize,
) -> Result<Vec<CodeLengths>> {
    let mut slots: Vec<Option<CodeLengths>> = (0..total).map(|_| None).collect();
    let mut first_error: Option<(usize, Error)> = None;

    for block in result_rx.iter() {
        match block.result {
            Ok(lengths) => slots[block.block_id] = Some(lengths),
            Err(e) => {
                let earlier = match &first_error {
                    Some((failed_id, _)) => block.block_id < *failed_id,
                    None => true,
                };
                if earlier {
                    first_error = Some((block.block_id, e));
                }
            }
        }
    }

    if let Some((_, e)) = first_error {
        return Err(e);
    }

    slots
        .into_iter()
        .enumerate()
        .map(|(block_id, slot)| {
            slot.ok_or_else(|| Error::Internal(format!("No result for block {}", block_id)))
        })
        .collect()
}
