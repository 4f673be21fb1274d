//! Real-time scheduler backed by tokio tasks.
//!
//! Each timer is a task that sleeps and then sends its event over a flume
//! channel. Repeating timers run a `tokio::time::interval` in their task
//! instead. Cancel aborts the task, but an event that was already sent stays
//! in the channel, so owners still need their generation check.

use std::collections::HashMap;
use std::time::Duration;

use flume::{Receiver, Sender};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, trace};

use super::scheduler::{Scheduler, TimerId, MIN_PERIOD};
use crate::error::{CarouselError, Result};

pub struct TokioScheduler<E> {
    runtime: Handle,
    events_tx: Sender<E>,
    tasks: HashMap<TimerId, JoinHandle<()>>,
    next_id: u64,
}

impl<E: Send + 'static> TokioScheduler<E> {
    /// Creates a scheduler on the current tokio runtime.
    ///
    /// Returns the receiver on which fired events arrive.
    pub fn new() -> Result<(Self, Receiver<E>)> {
        let runtime = Handle::try_current().map_err(|_| CarouselError::NoRuntime)?;
        let (events_tx, events_rx) = flume::unbounded();
        let scheduler = Self {
            runtime,
            events_tx,
            tasks: HashMap::new(),
            next_id: 0,
        };
        Ok((scheduler, events_rx))
    }

    fn reap_finished(&mut self) {
        self.tasks.retain(|_, task| !task.is_finished());
    }

    fn next_id(&mut self) -> TimerId {
        self.reap_finished();
        let id = TimerId(self.next_id);
        self.next_id += 1;
        id
    }
}

impl<E: Send + 'static> Scheduler<E> for TokioScheduler<E> {
    fn schedule(&mut self, delay: Duration, event: E) -> TimerId {
        let id = self.next_id();

        let tx = self.events_tx.clone();
        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            if tx.send_async(event).await.is_err() {
                trace!(timer = id.0, "Timer receiver dropped before delivery");
            }
        });
        self.tasks.insert(id, task);
        id
    }

    fn schedule_repeating(&mut self, period: Duration, event: E) -> TimerId
    where
        E: Clone,
    {
        let id = self.next_id();
        let period = period.max(MIN_PERIOD);

        let first = Instant::now() + period;
        let tx = self.events_tx.clone();
        let task = self.runtime.spawn(async move {
            let mut ticker = interval_at(first, period);
            // Deadlines stay on the start + k * period grid even when a tick is late.
            ticker.set_missed_tick_behavior(MissedTickBehavior::Burst);
            loop {
                ticker.tick().await;
                if tx.send_async(event.clone()).await.is_err() {
                    trace!(timer = id.0, "Timer receiver dropped, stopping interval");
                    break;
                }
            }
        });
        self.tasks.insert(id, task);
        id
    }

    fn cancel(&mut self, id: TimerId) {
        if let Some(task) = self.tasks.remove(&id) {
            task.abort();
        }
    }

    fn live_timers(&self) -> usize {
        self.tasks.values().filter(|task| !task.is_finished()).count()
    }
}

impl<E> Drop for TokioScheduler<E> {
    fn drop(&mut self) {
        if !self.tasks.is_empty() {
            debug!(pending = self.tasks.len(), "Aborting timers on scheduler drop");
        }
        for (_, task) in self.tasks.drain() {
            task.abort();
        }
    }
}
