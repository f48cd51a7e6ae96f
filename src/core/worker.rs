//! Serialised batch processing.
//!
//! Fix batches may arrive from several producers; one consumer task owns
//! the [`Engine`] and handles them strictly one after another, so no two
//! batches ever read-modify-write the same job concurrently.

use crate::core::engine::{BatchReport, Engine};
use crate::core::fulfiller::Fulfilment;
use crate::errors::{AppError, AppResult};
use crate::models::fix::LocationFix;
use chrono::{DateTime, Utc};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

const QUEUE_DEPTH: usize = 64;

enum Request {
    Batch {
        fixes: Vec<LocationFix>,
        now: Option<DateTime<Utc>>,
        reply: oneshot::Sender<AppResult<BatchReport>>,
    },
    Sweep {
        now: Option<DateTime<Utc>>,
        reply: oneshot::Sender<AppResult<Vec<Fulfilment>>>,
    },
}

/// Cloneable handle to the single batch consumer.
#[derive(Clone)]
pub struct BatchQueue {
    tx: mpsc::Sender<Request>,
}

impl BatchQueue {
    /// Start the consumer on a blocking thread.
    ///
    /// The consumer stops once every handle is dropped; the join handle
    /// then yields the engine back.
    pub fn spawn(engine: Engine) -> (Self, JoinHandle<Engine>) {
        let (tx, mut rx) = mpsc::channel::<Request>(QUEUE_DEPTH);

        let handle = tokio::task::spawn_blocking(move || {
            let mut engine = engine;
            while let Some(req) = rx.blocking_recv() {
                match req {
                    Request::Batch { fixes, now, reply } => {
                        let now = now.unwrap_or_else(Utc::now);
                        let res = engine.process_batch(&fixes, now);
                        if let Err(e) = &res {
                            tracing::warn!(error = %e, "batch failed");
                        }
                        if reply.send(res).is_err() {
                            tracing::debug!("batch submitter went away");
                        }
                    }
                    Request::Sweep { now, reply } => {
                        let res = engine.sweep(now.unwrap_or_else(Utc::now));
                        if reply.send(res).is_err() {
                            tracing::debug!("sweep requester went away");
                        }
                    }
                }
            }
            tracing::debug!("batch queue closed");
            engine
        });

        (Self { tx }, handle)
    }

    /// Queue a batch stamped with the wall clock when it is dequeued.
    pub async fn submit(&self, fixes: Vec<LocationFix>) -> AppResult<BatchReport> {
        self.request_batch(fixes, None).await
    }

    /// Queue a batch processed as of `now`.
    pub async fn submit_at(
        &self,
        fixes: Vec<LocationFix>,
        now: DateTime<Utc>,
    ) -> AppResult<BatchReport> {
        self.request_batch(fixes, Some(now)).await
    }

    /// Run the fulfiller on the consumer, in order with queued batches.
    pub async fn sweep(&self, now: Option<DateTime<Utc>>) -> AppResult<Vec<Fulfilment>> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Sweep { now, reply })
            .await
            .map_err(|_| AppError::Queue("consumer stopped".into()))?;
        rx.await
            .map_err(|_| AppError::Queue("consumer dropped the reply".into()))?
    }

    async fn request_batch(
        &self,
        fixes: Vec<LocationFix>,
        now: Option<DateTime<Utc>>,
    ) -> AppResult<BatchReport> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(Request::Batch { fixes, now, reply })
            .await
            .map_err(|_| AppError::Queue("consumer stopped".into()))?;
        rx.await
            .map_err(|_| AppError::Queue("consumer dropped the reply".into()))?
    }
}
