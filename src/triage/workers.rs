use std::sync::Arc;
use tokio::sync::{mpsc, oneshot, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, info, trace, warn};

use crate::triage::config::TriageConfig;
use crate::triage::models::{EmailRequest, EmailResponse, TriageJob};
use crate::triage::processor::EmailTriage;
use crate::triage::TriageError;

/// Starts worker tasks draining the triage job queue
///
/// All workers share one receiver. Masking is CPU bound, so each job runs on
/// the blocking pool; workers exit once the queue is closed and empty.
///
/// # Arguments
/// * `job_rx` - Receiving end of the job queue
/// * `triage` - Shared pipeline
/// * `workers` - Number of workers to spawn
pub fn start_workers(
    job_rx: mpsc::Receiver<TriageJob>,
    triage: Arc<EmailTriage>,
    workers: usize,
) -> Vec<JoinHandle<()>> {
    let job_rx = Arc::new(Mutex::new(job_rx));

    info!("Spawning {} triage workers", workers);
    (0..workers)
        .map(|worker_id| {
            let triage = triage.clone();
            let job_rx = job_rx.clone();

            tokio::spawn(async move {
                debug!("Worker {} started", worker_id);
                loop {
                    trace!("Worker {} waiting for job", worker_id);
                    let job_opt = { job_rx.lock().await.recv().await };

                    let Some(job) = job_opt else {
                        debug!("Worker {} shutting down - queue closed", worker_id);
                        break;
                    };

                    let index = job.index;
                    debug!("Worker {} processing request {}", worker_id, index);
                    let triage = triage.clone();
                    let request = job.request;
                    let result = tokio::task::spawn_blocking(move || triage.process(&request))
                        .await
                        .unwrap_or_else(|e| {
                            Err(TriageError::WorkerFailed { index, message: e.to_string() })
                        });

                    match &result {
                        Ok(_) => trace!("Worker {} completed request {}", worker_id, index),
                        Err(e) => warn!("Worker {} request {} failed: {}", worker_id, index, e),
                    }

                    if job.response_tx.send(result).is_err() {
                        warn!("Worker {} failed to send response - receiver dropped", worker_id);
                    }
                }
            })
        })
        .collect()
}

/// Triages a batch of emails on a worker pool.
///
/// Results come back in the order of `requests`. A failure for one email
/// does not affect the others. An invalid `config` (no workers or an empty
/// queue) rejects the whole batch before any worker starts.
pub async fn process_batch(
    triage: Arc<EmailTriage>,
    requests: Vec<EmailRequest>,
    config: &TriageConfig,
) -> Result<Vec<Result<EmailResponse, TriageError>>, TriageError> {
    config.validate().map_err(|e| {
        warn!("Rejecting batch: {}", e);
        TriageError::InvalidConfig { message: e.to_string() }
    })?;

    info!("Processing batch of {} emails", requests.len());
    debug!("Creating job queue with capacity: {}", config.queue_size);
    let (job_tx, job_rx) = mpsc::channel::<TriageJob>(config.queue_size);
    let handles = start_workers(job_rx, triage, config.workers);

    let mut pending = Vec::with_capacity(requests.len());
    for (index, request) in requests.into_iter().enumerate() {
        let (response_tx, response_rx) = oneshot::channel();
        let job = TriageJob { index, request, response_tx };
        match job_tx.send(job).await {
            Ok(()) => pending.push(Ok(response_rx)),
            Err(_) => {
                warn!("Job queue closed, rejecting request {}", index);
                pending.push(Err(TriageError::QueueClosed { index }));
            }
        }
    }
    // closing the queue lets idle workers exit
    drop(job_tx);

    let mut results = Vec::with_capacity(pending.len());
    for (index, entry) in pending.into_iter().enumerate() {
        let result = match entry {
            Ok(response_rx) => response_rx
                .await
                .unwrap_or(Err(TriageError::WorkerDropped { index })),
            Err(e) => Err(e),
        };
        results.push(result);
    }

    for handle in handles {
        if let Err(e) = handle.await {
            warn!("Worker task ended abnormally: {}", e);
        }
    }

    info!("Batch complete");
    Ok(results)
}
