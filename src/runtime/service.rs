//! Async carousel service.
//!
//! - Owns one `FocusCarouselController` on a tokio task with real timers
//! - Applies commands in arrival order, ahead of timers ready at the same time
//! - Publishes snapshots on a watch channel and to registered callbacks

use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::carousel::{CarouselSnapshot, CarouselTimer, FocusCarouselController};
use crate::config::CarouselConfig;
use crate::error::{CarouselError, Result};
use crate::layout::closest_index;
use crate::models::CardDeck;
use crate::timers::TokioScheduler;

/// Input delivered to the service task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CarouselCommand {
    /// (Re)mount with the given initial focus.
    Initialize(i64),
    Scroll { offset: f64, card_pitch: f64 },
    Focus(i64),
    /// Unmount: cancel all timers and go idle.
    Dispose,
}

/// Callback type for snapshot change notifications.
pub type SnapshotCallback = Box<dyn Fn(&CarouselSnapshot) + Send + Sync>;

type Controller = FocusCarouselController<TokioScheduler<CarouselTimer>>;

/// Handle to a running carousel service.
pub struct CarouselHandle {
    command_tx: mpsc::UnboundedSender<CarouselCommand>,
    snapshot_rx: watch::Receiver<CarouselSnapshot>,
    callbacks: Arc<Mutex<Vec<SnapshotCallback>>>,
    task: JoinHandle<()>,
}

/// Spawns the service on the current tokio runtime, mounted at `initial_index`.
///
/// # Errors
/// `NoRuntime` when called outside a tokio runtime.
pub fn spawn_carousel(
    config: CarouselConfig,
    deck: &CardDeck,
    initial_index: i64,
) -> Result<CarouselHandle> {
    let (scheduler, timer_rx) = TokioScheduler::new()?;
    let mut controller = FocusCarouselController::new(config, scheduler).with_deck(deck);
    controller.initialize(initial_index);

    let (snapshot_tx, snapshot_rx) = watch::channel(controller.snapshot());
    let (command_tx, command_rx) = mpsc::unbounded_channel();
    let callbacks: Arc<Mutex<Vec<SnapshotCallback>>> = Arc::new(Mutex::new(Vec::new()));

    let task = tokio::spawn(run_service(
        controller,
        command_rx,
        timer_rx,
        snapshot_tx,
        Arc::clone(&callbacks),
    ));

    debug!(initial_index, cards = deck.len(), "Carousel service started");

    Ok(CarouselHandle {
        command_tx,
        snapshot_rx,
        callbacks,
        task,
    })
}

impl CarouselHandle {
    /// Sends a scroll sample.
    ///
    /// # Errors
    /// `InvalidArgument` for a bad pitch or offset (nothing is sent),
    /// `ServiceStopped` if the task has exited.
    pub fn scroll(&self, offset: f64, card_pitch: f64) -> Result<()> {
        closest_index(offset, card_pitch)?;
        self.send(CarouselCommand::Scroll { offset, card_pitch })
    }

    pub fn focus(&self, index: i64) -> Result<()> {
        self.send(CarouselCommand::Focus(index))
    }

    pub fn initialize(&self, index: i64) -> Result<()> {
        self.send(CarouselCommand::Initialize(index))
    }

    pub fn dispose(&self) -> Result<()> {
        self.send(CarouselCommand::Dispose)
    }

    /// Latest published snapshot.
    pub fn snapshot(&self) -> CarouselSnapshot {
        *self.snapshot_rx.borrow()
    }

    /// Receiver that is notified on every published snapshot.
    pub fn subscribe(&self) -> watch::Receiver<CarouselSnapshot> {
        self.snapshot_rx.clone()
    }

    /// Registers a callback run on the service task after every change.
    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn(&CarouselSnapshot) + Send + Sync + 'static,
    {
        self.callbacks.lock().push(Box::new(callback));
    }

    /// Disposes the controller, stops the task and returns the final snapshot.
    pub async fn shutdown(self) -> Result<CarouselSnapshot> {
        let Self {
            command_tx,
            snapshot_rx,
            task,
            ..
        } = self;
        drop(command_tx);
        task.await.map_err(|e| {
            warn!(error = ?e, "Carousel service task failed");
            CarouselError::ServiceStopped
        })?;
        let snapshot = *snapshot_rx.borrow();
        Ok(snapshot)
    }

    fn send(&self, command: CarouselCommand) -> Result<()> {
        self.command_tx
            .send(command)
            .map_err(|_| CarouselError::ServiceStopped)
    }
}

async fn run_service(
    mut controller: Controller,
    mut command_rx: mpsc::UnboundedReceiver<CarouselCommand>,
    timer_rx: flume::Receiver<CarouselTimer>,
    snapshot_tx: watch::Sender<CarouselSnapshot>,
    callbacks: Arc<Mutex<Vec<SnapshotCallback>>>,
) {
    let mut published = controller.revision();

    loop {
        tokio::select! {
            biased;
            command = command_rx.recv() => match command {
                Some(command) => apply_command(&mut controller, command),
                None => break,
            },
            Ok(timer) = timer_rx.recv_async() => {
                controller.on_timer(timer);
            }
        }

        if controller.revision() != published {
            published = controller.revision();
            publish(&controller, &snapshot_tx, &callbacks);
        }
    }

    controller.dispose();
    if controller.revision() != published {
        publish(&controller, &snapshot_tx, &callbacks);
    }
    debug!("Carousel service stopped");
}

fn apply_command(controller: &mut Controller, command: CarouselCommand) {
    match command {
        CarouselCommand::Initialize(index) => controller.initialize(index),
        CarouselCommand::Scroll { offset, card_pitch } => {
            if let Err(e) = controller.on_scroll(offset, card_pitch) {
                warn!(error = %e, "Rejected scroll sample");
            }
        }
        CarouselCommand::Focus(index) => controller.focus_change(index),
        CarouselCommand::Dispose => controller.dispose(),
    }
}

fn publish(
    controller: &Controller,
    snapshot_tx: &watch::Sender<CarouselSnapshot>,
    callbacks: &Mutex<Vec<SnapshotCallback>>,
) {
    let snapshot = controller.snapshot();
    snapshot_tx.send_replace(snapshot);
    for callback in callbacks.lock().iter() {
        callback(&snapshot);
    }
}
