//! The governance node: a single task that owns the engine.
//!
//! Requests arrive over an mpsc queue and are applied one at a time, so
//! every mutation completes before the next is admitted. After each request
//! the task publishes a fresh [`GovernanceView`] on a watch channel and fans
//! the request's events out to the [`EventBus`] and to broadcast
//! subscribers.

use std::sync::Arc;

use quorum_governance::{ActionExecutor, GovernanceEngine, GovernanceError, Outcome, Request};
use quorum_types::EventRecord;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::config::GovernorConfig;
use crate::event_bus::EventBus;
use crate::view::GovernanceView;
use crate::NodeError;

struct Envelope {
    request: Request,
    reply: oneshot::Sender<Result<Outcome, GovernanceError>>,
}

/// Cloneable client of a running node.
#[derive(Clone)]
pub struct NodeHandle {
    commands: mpsc::Sender<Envelope>,
    view: watch::Receiver<Arc<GovernanceView>>,
    events: broadcast::Sender<EventRecord>,
}

impl NodeHandle {
    /// Queue a request and wait for its outcome.
    pub async fn submit(&self, request: Request) -> Result<Outcome, NodeError> {
        let (reply, outcome) = oneshot::channel();
        self.commands
            .send(Envelope { request, reply })
            .await
            .map_err(|_| NodeError::Stopped)?;
        let outcome = outcome.await.map_err(|_| NodeError::Stopped)?;
        Ok(outcome?)
    }

    /// The most recently published view.
    pub fn view(&self) -> Arc<GovernanceView> {
        Arc::clone(&self.view.borrow())
    }

    /// Wait for the next published view.
    pub async fn next_view(&mut self) -> Result<Arc<GovernanceView>, NodeError> {
        self.view.changed().await.map_err(|_| NodeError::Stopped)?;
        Ok(Arc::clone(&self.view.borrow_and_update()))
    }

    /// Receive every event recorded from now on.
    pub fn subscribe(&self) -> broadcast::Receiver<EventRecord> {
        self.events.subscribe()
    }
}

pub struct GovernanceNode<X> {
    handle: NodeHandle,
    /// Dropping or firing this stops the loop.
    stop: oneshot::Sender<()>,
    task: JoinHandle<GovernanceEngine<X>>,
}

impl<X: ActionExecutor + Send + 'static> GovernanceNode<X> {
    /// Start the command loop on the current tokio runtime.
    pub fn spawn(
        engine: GovernanceEngine<X>,
        bus: EventBus,
        command_buffer: usize,
        event_buffer: usize,
    ) -> Self {
        let (commands, rx) = mpsc::channel(command_buffer.max(1));
        let (view_tx, view) = watch::channel(Arc::new(GovernanceView::capture(&engine)));
        let (events, _) = broadcast::channel(event_buffer.max(1));
        let (stop, stopped) = oneshot::channel();

        let task = tokio::spawn(run(
            engine,
            rx,
            view_tx,
            events.clone(),
            bus,
            stopped,
        ));
        info!(command_buffer, event_buffer, "governance node started");

        Self {
            handle: NodeHandle {
                commands,
                view,
                events,
            },
            stop,
            task,
        }
    }

    /// [`spawn`](Self::spawn) with the buffer sizes from `config`.
    pub fn spawn_with_config(engine: GovernanceEngine<X>, bus: EventBus, config: &GovernorConfig) -> Self {
        Self::spawn(engine, bus, config.command_buffer, config.event_buffer)
    }

    pub fn handle(&self) -> NodeHandle {
        self.handle.clone()
    }

    /// Stop the loop and hand back the engine. Requests still queued are
    /// dropped and their submitters see [`NodeError::Stopped`].
    pub async fn shutdown(self) -> Result<GovernanceEngine<X>, NodeError> {
        // Fails only when the loop has already exited.
        let _ = self.stop.send(());
        let engine = self.task.await.map_err(|e| NodeError::Join(e.to_string()))?;
        info!(next_seq = engine.next_seq(), "governance node stopped");
        Ok(engine)
    }
}

async fn run<X: ActionExecutor>(
    mut engine: GovernanceEngine<X>,
    mut rx: mpsc::Receiver<Envelope>,
    view_tx: watch::Sender<Arc<GovernanceView>>,
    events: broadcast::Sender<EventRecord>,
    bus: EventBus,
    mut stopped: oneshot::Receiver<()>,
) -> GovernanceEngine<X> {
    loop {
        let envelope = tokio::select! {
            _ = &mut stopped => break,
            next = rx.recv() => match next {
                Some(envelope) => envelope,
                None => break,
            },
        };

        let op = envelope.request.command.name();
        let at = envelope.request.at;
        let result = engine.apply(envelope.request);
        match &result {
            Ok(_) => debug!(op, at = %at, "request applied"),
            Err(e) => warn!(op, at = %at, error = %e, "request rejected"),
        }

        if result.is_ok() {
            view_tx.send_replace(Arc::new(GovernanceView::capture(&engine)));
        }
        for record in engine.drain_events() {
            bus.emit(&record);
            // No receivers is fine.
            let _ = events.send(record);
        }

        if envelope.reply.send(result).is_err() {
            debug!(op, "submitter went away before the reply");
        }
    }
    engine
}
