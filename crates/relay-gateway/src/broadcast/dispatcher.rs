//! Broadcast dispatcher
//!
//! Fans stored messages out to every present session through a fixed pool
//! of delivery workers sharing one unbounded queue.

use crate::session::{Session, SessionRegistry};
use parking_lot::Mutex;
use relay_core::{Message, UserStore};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex as AsyncMutex};
use tokio::task::JoinHandle;

/// Default number of delivery workers
pub const DEFAULT_WORKERS: usize = 50;

/// One message for one session
#[derive(Debug, Clone)]
pub struct DeliveryTask {
    pub session: Arc<Session>,
    pub message: Arc<Message>,
}

/// Configuration for the broadcast dispatcher
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Number of delivery workers
    pub workers: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self {
            workers: DEFAULT_WORKERS,
        }
    }
}

/// State shared by all workers
struct WorkerContext {
    registry: Arc<SessionRegistry>,
    users: Arc<dyn UserStore>,
    queue: AsyncMutex<mpsc::UnboundedReceiver<DeliveryTask>>,
}

/// Worker pool delivering broadcast messages
pub struct BroadcastDispatcher {
    config: DispatcherConfig,
    registry: Arc<SessionRegistry>,
    /// Task queue; `None` once shut down
    sender: Mutex<Option<mpsc::UnboundedSender<DeliveryTask>>>,
    context: Arc<WorkerContext>,
    workers: Mutex<Vec<JoinHandle<()>>>,
    running: AtomicBool,
}

impl BroadcastDispatcher {
    /// Create a new dispatcher; call `start` to spawn the workers
    pub fn new(
        config: DispatcherConfig,
        registry: Arc<SessionRegistry>,
        users: Arc<dyn UserStore>,
    ) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();

        Self {
            config,
            registry: registry.clone(),
            sender: Mutex::new(Some(sender)),
            context: Arc::new(WorkerContext {
                registry,
                users,
                queue: AsyncMutex::new(receiver),
            }),
            workers: Mutex::new(Vec::new()),
            running: AtomicBool::new(false),
        }
    }

    /// Spawn the worker pool
    pub fn start(&self) {
        if self.running.swap(true, Ordering::SeqCst) {
            tracing::warn!("Broadcast dispatcher is already running");
            return;
        }

        let mut workers = self.workers.lock();
        for worker_id in 0..self.config.workers {
            let context = self.context.clone();
            workers.push(tokio::spawn(run_worker(worker_id, context)));
        }

        tracing::info!(workers = self.config.workers, "Broadcast dispatcher started");
    }

    /// Queue one delivery per present session
    ///
    /// Never blocks. Returns the number of deliveries queued.
    pub fn broadcast(&self, message: Arc<Message>) -> usize {
        let Some(sender) = self.sender.lock().clone() else {
            tracing::warn!(message_id = message.id, "Broadcast after dispatcher shutdown");
            return 0;
        };

        let mut queued = 0;
        for session in self.registry.list_present() {
            let task = DeliveryTask {
                session,
                message: message.clone(),
            };
            if sender.send(task).is_err() {
                tracing::warn!(message_id = message.id, "Delivery queue closed");
                break;
            }
            queued += 1;
        }

        tracing::debug!(
            message_id = message.id,
            author = %message.author,
            recipients = queued,
            "Message queued for broadcast"
        );

        queued
    }

    /// Close the queue and wait for the workers to drain it
    pub async fn shutdown(&self) {
        self.sender.lock().take();
        let workers = std::mem::take(&mut *self.workers.lock());

        for worker in workers {
            if let Err(e) = worker.await {
                tracing::error!(error = %e, "Delivery worker panicked");
            }
        }

        self.running.store(false, Ordering::SeqCst);
        tracing::info!("Broadcast dispatcher stopped");
    }

    /// Check if the workers are running
    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl std::fmt::Debug for BroadcastDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BroadcastDispatcher")
            .field("config", &self.config)
            .field("running", &self.is_running())
            .finish()
    }
}

impl Drop for BroadcastDispatcher {
    fn drop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Worker loop: take tasks until the queue is closed and empty
async fn run_worker(worker_id: usize, context: Arc<WorkerContext>) {
    loop {
        let task = context.queue.lock().await.recv().await;
        let Some(task) = task else {
            break;
        };
        deliver(&context, task).await;
    }

    tracing::trace!(worker_id, "Delivery worker exited");
}

/// Deliver one task; a failed session is evicted, never retried
async fn deliver(context: &WorkerContext, task: DeliveryTask) {
    let DeliveryTask { session, message } = task;

    if let Err(e) = session.deliver(message.clone()) {
        tracing::warn!(
            session_id = %session.id(),
            user = %session.user(),
            message_id = message.id,
            error = %e,
            "Delivery failed, evicting session"
        );
        context.registry.remove(&session);
        session.stop();
        return;
    }

    if let Err(e) = context
        .users
        .update_last_activity(session.user().id, message.created_at)
        .await
    {
        tracing::error!(
            user = %session.user(),
            error = %e,
            "Failed to update last activity"
        );
    }
}
