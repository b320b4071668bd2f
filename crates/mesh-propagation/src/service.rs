//! # Propagation Dispatcher
//!
//! The main service of the propagation subsystem: a bounded task queue
//! drained by a pool of tokio workers.
//!
//! ## Processing Model
//!
//! Workers share one receiver; each takes the next task, then processes it
//! outside the receiver lock, so the pool runs `workers` pushes
//! concurrently. For each task the worker:
//!
//! 1. looks up the site entry (missing, inactive, or credential-less
//!    entries dead-letter as configuration errors without touching the
//!    network);
//! 2. reads the CURRENT on-hand for the SKU;
//! 3. resolves the remote product reference (unmapped SKUs dead-letter as
//!    permanent failures);
//! 4. pushes with a per-attempt timeout.
//!
//! Transient failures burn an attempt and back off exponentially; when the
//! attempt budget is exhausted, exactly one dead letter is written with
//! the accumulated attempt count and the last error.
//!
//! ## Thread Safety
//!
//! The dispatcher is shared across tasks via `Arc`. Enqueue operations are
//! synchronous and lock-free apart from a short sender-handle lock;
//! `shutdown` drops the sender so workers drain the queue and exit.

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};
use uuid::Uuid;

use shared_types::{Clock, Site, SiteId, Sku};

use crate::domain::entities::{PropagationFailure, PropagationTask};
use crate::domain::errors::{PropagationError, PushError};
use crate::domain::value_objects::{backoff_delay, PropagationConfig};
use crate::ports::inbound::{DeadLetterApi, PropagationApi};
use crate::ports::outbound::{
    FailureStore, MappingLookup, RemoteStockWriter, SiteDirectory, StockReader,
};

/// Why a task reached the dead-letter store.
enum FailureCause {
    Transient,
    Permanent,
    Configuration,
}

impl FailureCause {
    fn as_str(&self) -> &'static str {
        match self {
            FailureCause::Transient => "transient",
            FailureCause::Permanent => "permanent",
            FailureCause::Configuration => "configuration",
        }
    }
}

/// The propagation dispatcher service.
pub struct PropagationDispatcher<W, R, M, D, F, C>
where
    W: RemoteStockWriter,
    R: StockReader,
    M: MappingLookup,
    D: SiteDirectory,
    F: FailureStore,
    C: Clock,
{
    config: PropagationConfig,
    writer: Arc<W>,
    stock: Arc<R>,
    mappings: Arc<M>,
    directory: Arc<D>,
    failures: Arc<F>,
    clock: Arc<C>,
    /// Sender handle; `None` after shutdown.
    tx: parking_lot::Mutex<Option<mpsc::Sender<PropagationTask>>>,
    /// Receiver shared by the worker pool.
    rx: Arc<tokio::sync::Mutex<mpsc::Receiver<PropagationTask>>>,
}

impl<W, R, M, D, F, C> PropagationDispatcher<W, R, M, D, F, C>
where
    W: RemoteStockWriter + 'static,
    R: StockReader + 'static,
    M: MappingLookup + 'static,
    D: SiteDirectory + 'static,
    F: FailureStore + 'static,
    C: Clock + 'static,
{
    pub fn new(
        config: PropagationConfig,
        writer: Arc<W>,
        stock: Arc<R>,
        mappings: Arc<M>,
        directory: Arc<D>,
        failures: Arc<F>,
        clock: Arc<C>,
    ) -> Self {
        let (tx, rx) = mpsc::channel(config.queue_capacity);
        Self {
            config,
            writer,
            stock,
            mappings,
            directory,
            failures,
            clock,
            tx: parking_lot::Mutex::new(Some(tx)),
            rx: Arc::new(tokio::sync::Mutex::new(rx)),
        }
    }

    pub fn config(&self) -> &PropagationConfig {
        &self.config
    }

    /// Start the worker pool. Workers run until `shutdown` and an empty
    /// queue.
    pub fn spawn_workers(self: &Arc<Self>) -> Vec<JoinHandle<()>> {
        (0..self.config.workers)
            .map(|worker| {
                let dispatcher = Arc::clone(self);
                tokio::spawn(async move {
                    debug!(worker, "propagation worker started");
                    loop {
                        let task = {
                            let mut rx = dispatcher.rx.lock().await;
                            rx.recv().await
                        };
                        match task {
                            Some(task) => dispatcher.process_task(task).await,
                            None => break,
                        }
                    }
                    debug!(worker, "propagation worker stopped");
                })
            })
            .collect()
    }

    /// Stop accepting tasks. Workers exit once the queue drains.
    pub fn shutdown(&self) {
        self.tx.lock().take();
    }

    fn enqueue_task(&self, task: PropagationTask) -> Result<(), PropagationError> {
        let guard = self.tx.lock();
        let tx = guard.as_ref().ok_or(PropagationError::Closed)?;
        tx.try_send(task).map_err(|err| match err {
            TrySendError::Full(task) => {
                warn!(
                    site = %task.site_id,
                    sku = %task.sku,
                    "propagation queue full, rejecting enqueue"
                );
                PropagationError::QueueFull {
                    capacity: self.config.queue_capacity,
                }
            }
            TrySendError::Closed(_) => PropagationError::Closed,
        })
    }

    /// Process one task to completion: success or dead letter.
    async fn process_task(&self, mut task: PropagationTask) {
        let site = match self.directory.site(&task.site_id) {
            Some(site) if site.active => site,
            Some(_) => {
                self.dead_letter(&task, "site is inactive", FailureCause::Configuration);
                return;
            }
            None => {
                self.dead_letter(&task, "site not in registry", FailureCause::Configuration);
                return;
            }
        };
        if site.api_key.is_empty() || site.api_secret.is_empty() {
            self.dead_letter(&task, "site credentials missing", FailureCause::Configuration);
            return;
        }

        let mut last_error = String::new();

        while task.attempts < self.config.max_attempts {
            task.attempts += 1;

            match self.attempt_push(&site, &task).await {
                Ok(()) => {
                    debug!(
                        site = %task.site_id,
                        sku = %task.sku,
                        attempt = task.attempts,
                        "propagated stock update"
                    );
                    return;
                }
                Err(PushError::Permanent(message)) => {
                    self.dead_letter(&task, &message, FailureCause::Permanent);
                    return;
                }
                Err(PushError::Transient(message)) => {
                    warn!(
                        site = %task.site_id,
                        sku = %task.sku,
                        attempt = task.attempts,
                        max = self.config.max_attempts,
                        error = %message,
                        "propagation attempt failed"
                    );
                    last_error = message;
                }
            }

            if task.attempts < self.config.max_attempts {
                tokio::time::sleep(backoff_delay(&self.config, task.attempts)).await;
            }
        }

        self.dead_letter(&task, &last_error, FailureCause::Transient);
    }

    /// One push attempt. Reads the current on-hand so the remote always
    /// receives the present truth, then resolves and pushes under the
    /// per-attempt timeout.
    async fn attempt_push(&self, site: &Site, task: &PropagationTask) -> Result<(), PushError> {
        let quantity = match self.stock.on_hand(&task.sku) {
            Ok(Some(current)) => current,
            // Never mutated since enqueue: fall back to the captured value.
            Ok(None) => task.quantity,
            Err(e) => return Err(PushError::Transient(e.to_string())),
        };

        let remote = match self.mappings.resolve(&task.site_id, &task.sku) {
            Ok(Some(remote)) => remote,
            Ok(None) => {
                return Err(PushError::Permanent(format!(
                    "sku {} not mapped for site {}",
                    task.sku, task.site_id
                )))
            }
            Err(e) => return Err(PushError::Transient(e.to_string())),
        };

        let push = self.writer.set_stock(site, &remote, quantity);
        match tokio::time::timeout(
            std::time::Duration::from_millis(self.config.push_timeout_ms),
            push,
        )
        .await
        {
            Ok(result) => result,
            Err(_) => Err(PushError::Transient(format!(
                "push timed out after {}ms",
                self.config.push_timeout_ms
            ))),
        }
    }

    fn dead_letter(&self, task: &PropagationTask, message: &str, cause: FailureCause) {
        let now = self.clock.now_ms();
        let failure = PropagationFailure {
            id: Uuid::new_v4(),
            site_id: task.site_id.clone(),
            sku: task.sku.clone(),
            quantity: task.quantity,
            error: message.to_string(),
            attempts: task.attempts,
            created_at: now,
            last_tried: now,
        };

        error!(
            site = %task.site_id,
            sku = %task.sku,
            attempts = task.attempts,
            cause = cause.as_str(),
            error = %message,
            "propagation dead-lettered"
        );

        if let Err(e) = self.failures.append(&failure) {
            // The task is gone either way; all that is left is to shout.
            error!(
                site = %task.site_id,
                sku = %task.sku,
                error = %e,
                "failed to record dead letter"
            );
        }
    }
}

impl<W, R, M, D, F, C> PropagationApi for PropagationDispatcher<W, R, M, D, F, C>
where
    W: RemoteStockWriter + 'static,
    R: StockReader + 'static,
    M: MappingLookup + 'static,
    D: SiteDirectory + 'static,
    F: FailureStore + 'static,
    C: Clock + 'static,
{
    fn enqueue_fanout(
        &self,
        origin: &SiteId,
        sku: &Sku,
        quantity: i64,
    ) -> Result<usize, PropagationError> {
        let mut enqueued = 0;
        for site in self.directory.active_sites() {
            if &site.site_id == origin {
                continue;
            }
            self.enqueue_task(PropagationTask::new(
                site.site_id.clone(),
                sku.clone(),
                quantity,
            ))?;
            enqueued += 1;
        }
        info!(sku = %sku, origin = %origin, tasks = enqueued, "propagation fan-out enqueued");
        Ok(enqueued)
    }

    fn enqueue_for_site(
        &self,
        site_id: &SiteId,
        sku: &Sku,
        quantity: i64,
    ) -> Result<(), PropagationError> {
        self.enqueue_task(PropagationTask::new(site_id.clone(), sku.clone(), quantity))
    }
}

impl<W, R, M, D, F, C> DeadLetterApi for PropagationDispatcher<W, R, M, D, F, C>
where
    W: RemoteStockWriter + 'static,
    R: StockReader + 'static,
    M: MappingLookup + 'static,
    D: SiteDirectory + 'static,
    F: FailureStore + 'static,
    C: Clock + 'static,
{
    fn failures(&self) -> Result<Vec<PropagationFailure>, PropagationError> {
        self.failures.list()
    }

    fn retry_failure(&self, id: &Uuid) -> Result<(), PropagationError> {
        let failure = self
            .failures
            .get(id)?
            .ok_or(PropagationError::UnknownFailure(*id))?;

        self.enqueue_task(PropagationTask::new(
            failure.site_id.clone(),
            failure.sku.clone(),
            failure.quantity,
        ))?;
        self.failures.remove(id)?;
        info!(id = %id, site = %failure.site_id, sku = %failure.sku, "dead letter re-enqueued");
        Ok(())
    }

    fn purge_failure(&self, id: &Uuid) -> Result<(), PropagationError> {
        self.failures
            .get(id)?
            .ok_or(PropagationError::UnknownFailure(*id))?;
        self.failures.remove(id)?;
        info!(id = %id, "dead letter purged");
        Ok(())
    }
}
