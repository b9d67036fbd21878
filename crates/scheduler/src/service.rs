//! Deletion scheduler: intake, dispatcher loop, delete execution.

use std::{sync::Arc, time::Duration};

use {
    autodelete_channels::{ChannelGateway, DeleteError},
    autodelete_common::{MessageEvent, SelfIdentity, now_ms},
    autodelete_policy::PolicyStore,
    tokio::{
        sync::{Mutex, Notify, RwLock, Semaphore},
        task::JoinHandle,
        time::Instant,
    },
    tracing::{debug, info, warn},
};

#[cfg(feature = "metrics")]
use autodelete_metrics::{counter, gauge, histogram, labels, scheduler as scheduler_metrics};

use crate::{
    Result,
    queue::DeletionQueue,
    store::PendingDeletionStore,
    types::{PendingDeletion, ScheduleOutcome, ScheduledDeletion, SchedulerOptions, SchedulerStatus},
};

/// Schedules and performs delayed message deletions.
pub struct DeletionScheduler {
    policies: Arc<dyn PolicyStore>,
    gateway: Arc<dyn ChannelGateway>,
    pending_store: Option<Arc<dyn PendingDeletionStore>>,
    identity: SelfIdentity,
    options: SchedulerOptions,
    queue: Arc<Mutex<DeletionQueue>>,
    dispatcher: Mutex<Option<JoinHandle<()>>>,
    wake_notify: Arc<Notify>,
    running: RwLock<bool>,
    delete_permits: Arc<Semaphore>,
}

impl DeletionScheduler {
    pub fn new(
        policies: Arc<dyn PolicyStore>,
        gateway: Arc<dyn ChannelGateway>,
        identity: SelfIdentity,
    ) -> Arc<Self> {
        Self::with_options(policies, gateway, identity, None, SchedulerOptions::default())
    }

    pub fn with_options(
        policies: Arc<dyn PolicyStore>,
        gateway: Arc<dyn ChannelGateway>,
        identity: SelfIdentity,
        pending_store: Option<Arc<dyn PendingDeletionStore>>,
        options: SchedulerOptions,
    ) -> Arc<Self> {
        let permits = options.max_concurrent_deletes.max(1);
        Arc::new(Self {
            policies,
            gateway,
            pending_store,
            identity,
            options,
            queue: Arc::new(Mutex::new(DeletionQueue::new())),
            dispatcher: Mutex::new(None),
            wake_notify: Arc::new(Notify::new()),
            running: RwLock::new(false),
            delete_permits: Arc::new(Semaphore::new(permits)),
        })
    }

    /// Replay persisted deletions (if enabled) and start the dispatcher loop.
    pub async fn start(self: &Arc<Self>) {
        {
            let mut running = self.running.write().await;
            if *running {
                return;
            }
            *running = true;
        }

        if self.options.replay_pending {
            self.replay_pending().await;
        }

        let svc = Arc::clone(self);
        let handle = tokio::spawn(async move {
            svc.dispatcher_loop().await;
        });
        *self.dispatcher.lock().await = Some(handle);

        info!(
            max_concurrent_deletes = self.options.max_concurrent_deletes,
            "deletion scheduler started"
        );
    }

    /// Stop the dispatcher loop. Deletes already in flight run to completion;
    /// queued deletions stay queued until the next `start`.
    pub async fn stop(&self) {
        *self.running.write().await = false;
        self.wake_notify.notify_one();

        if let Some(handle) = self.dispatcher.lock().await.take() {
            handle.abort();
        }
        info!("deletion scheduler stopped");
    }

    /// Decide whether a newly created message should be deleted later, and
    /// queue it if so. Never waits for the delay itself.
    ///
    /// Fails only when the policy store cannot be read.
    pub async fn on_message_created(&self, event: &MessageEvent) -> Result<ScheduleOutcome> {
        if self.identity.is_self(&event.author_id) {
            return Ok(ScheduleOutcome::FromSelf);
        }
        if self.is_control_command(&event.text) {
            return Ok(ScheduleOutcome::ControlCommand);
        }

        let Some(policy) = self.policies.get(&event.channel_id).await? else {
            return Ok(ScheduleOutcome::NoPolicy);
        };
        if !policy.enabled {
            return Ok(ScheduleOutcome::Disabled);
        }

        let delay = policy.delay();
        let deletion = ScheduledDeletion::for_event(event, delay);

        if !self.enqueue(Instant::now() + delay, deletion.clone()).await {
            return Ok(ScheduleOutcome::AlreadyPending);
        }

        if let Some(store) = &self.pending_store {
            let store = Arc::clone(store);
            let queue = Arc::clone(&self.queue);
            let record = PendingDeletion::new(&deletion, event);
            tokio::spawn(async move {
                if let Err(e) = store.insert(&record).await {
                    warn!(
                        message_id = %record.message_id,
                        error = %e,
                        "failed to persist pending deletion"
                    );
                    return;
                }
                // Cancelled or dispatched while the insert was in flight.
                let still_queued = queue.lock().await.contains(&record.message_id);
                if !still_queued && let Err(e) = store.remove(&record.message_id).await {
                    warn!(
                        message_id = %record.message_id,
                        error = %e,
                        "failed to clear stale pending deletion record"
                    );
                }
            });
        }

        debug!(
            message_id = %deletion.message_id,
            channel_id = %deletion.channel_id,
            delay_secs = delay.as_secs(),
            "deletion scheduled"
        );
        Ok(ScheduleOutcome::Scheduled(deletion))
    }

    /// Queue an explicit deletion at its `fire_at_ms`. Overdue deletions run
    /// on the next dispatcher pass.
    ///
    /// Returns `false` if the message is already queued.
    pub async fn schedule(&self, deletion: ScheduledDeletion) -> bool {
        let remaining = Duration::from_millis(deletion.fire_at_ms.saturating_sub(now_ms()));
        self.enqueue(Instant::now() + remaining, deletion).await
    }

    /// Drop every queued deletion for `channel_id`, along with any persisted
    /// records. Returns the number of queued deletions removed.
    pub async fn cancel_channel(&self, channel_id: &str) -> usize {
        let removed = {
            let mut queue = self.queue.lock().await;
            let removed = queue.remove_channel(channel_id);
            #[cfg(feature = "metrics")]
            gauge!(scheduler_metrics::DELETIONS_PENDING).set(queue.len() as f64);
            removed.len()
        };

        if let Some(store) = &self.pending_store
            && let Err(e) = store.remove_channel(channel_id).await
        {
            warn!(channel_id, error = %e, "failed to drop persisted deletions");
        }

        #[cfg(feature = "metrics")]
        counter!(scheduler_metrics::DELETIONS_CANCELLED_TOTAL).increment(removed as u64);

        if removed > 0 {
            info!(channel_id, count = removed, "cancelled queued deletions");
        }
        self.wake_notify.notify_one();
        removed
    }

    pub async fn status(&self) -> SchedulerStatus {
        let running = *self.running.read().await;
        let queue = self.queue.lock().await;

        #[cfg(feature = "metrics")]
        gauge!(scheduler_metrics::DELETIONS_PENDING).set(queue.len() as f64);

        SchedulerStatus {
            running,
            pending: queue.len(),
            next_fire_at_ms: queue.peek().map(|d| d.fire_at_ms),
        }
    }

    // ── Internal ────────────────────────────────────────────────────────

    fn is_control_command(&self, text: &str) -> bool {
        self.options
            .control_prefix
            .as_deref()
            .is_some_and(|prefix| text.split_whitespace().next() == Some(prefix))
    }

    async fn enqueue(&self, deadline: Instant, deletion: ScheduledDeletion) -> bool {
        {
            let mut queue = self.queue.lock().await;
            if !queue.push(deadline, deletion) {
                return false;
            }
            #[cfg(feature = "metrics")]
            gauge!(scheduler_metrics::DELETIONS_PENDING).set(queue.len() as f64);
        }

        #[cfg(feature = "metrics")]
        counter!(scheduler_metrics::DELETIONS_SCHEDULED_TOTAL).increment(1);

        self.wake_notify.notify_one();
        true
    }

    async fn replay_pending(&self) {
        let Some(store) = &self.pending_store else {
            return;
        };
        let records = match store.list().await {
            Ok(records) => records,
            Err(e) => {
                warn!(error = %e, "failed to load pending deletions, skipping replay");
                return;
            },
        };

        let now = now_ms();
        let overdue = records.iter().filter(|r| r.fire_at_ms <= now).count();
        let mut queued = 0usize;
        for record in &records {
            if self.schedule(record.to_scheduled()).await {
                queued += 1;
            }
        }
        info!(queued, overdue, "replayed pending deletions");
    }

    async fn dispatcher_loop(self: &Arc<Self>) {
        loop {
            if !*self.running.read().await {
                break;
            }

            let next = self.queue.lock().await.next_deadline();
            let wake_at = next.unwrap_or_else(|| Instant::now() + self.options.idle_poll);

            if wake_at > Instant::now() {
                let notify = Arc::clone(&self.wake_notify);
                tokio::select! {
                    () = tokio::time::sleep_until(wake_at) => {},
                    () = notify.notified() => {
                        debug!("dispatcher woken by notify");
                        continue;
                    },
                }
            }

            if !*self.running.read().await {
                break;
            }

            self.dispatch_due().await;
        }
    }

    /// Hand due deletions to delete tasks, one permit at a time.
    ///
    /// A deletion leaves the queue only once a permit is held, so aborting
    /// the dispatcher while it waits for a permit loses nothing.
    async fn dispatch_due(self: &Arc<Self>) {
        loop {
            let Ok(permit) = Arc::clone(&self.delete_permits).acquire_owned().await else {
                warn!("delete semaphore closed, leaving due deletions queued");
                return;
            };

            let next = {
                let mut queue = self.queue.lock().await;
                let next = queue.pop_due(Instant::now());
                #[cfg(feature = "metrics")]
                gauge!(scheduler_metrics::DELETIONS_PENDING).set(queue.len() as f64);
                next
            };
            let Some((deadline, deletion)) = next else {
                return;
            };

            let svc = Arc::clone(self);
            tokio::spawn(async move {
                svc.execute_deletion(deadline, &deletion).await;
                drop(permit);
            });
        }
    }

    async fn execute_deletion(&self, deadline: Instant, deletion: &ScheduledDeletion) {
        #[cfg(feature = "metrics")]
        histogram!(scheduler_metrics::DISPATCH_LAG_SECONDS)
            .record(Instant::now().saturating_duration_since(deadline).as_secs_f64());
        #[cfg(not(feature = "metrics"))]
        let _ = deadline;

        match self
            .gateway
            .delete_message(&deletion.channel_id, &deletion.message_id)
            .await
        {
            Ok(()) => {
                info!(
                    message_id = %deletion.message_id,
                    channel_id = %deletion.channel_id,
                    "message deleted"
                );
                #[cfg(feature = "metrics")]
                counter!(scheduler_metrics::DELETIONS_SUCCEEDED_TOTAL).increment(1);
            },
            Err(e) => {
                match &e {
                    DeleteError::NotFound => debug!(
                        message_id = %deletion.message_id,
                        channel_id = %deletion.channel_id,
                        "message already gone"
                    ),
                    _ => warn!(
                        message_id = %deletion.message_id,
                        channel_id = %deletion.channel_id,
                        reason = e.reason(),
                        error = %e,
                        "failed to delete message"
                    ),
                }
                #[cfg(feature = "metrics")]
                counter!(scheduler_metrics::DELETIONS_FAILED_TOTAL, labels::REASON => e.reason())
                    .increment(1);
            },
        }

        if let Some(store) = &self.pending_store
            && let Err(e) = store.remove(&deletion.message_id).await
        {
            warn!(
                message_id = %deletion.message_id,
                error = %e,
                "failed to clear pending deletion record"
            );
        }
    }
}
