//! Channel-backed event routing off the hot path.
//!
//! Routers turn the engine's synchronous [`EventListener`] callback into a
//! queue consumed on a dedicated worker, with a [`EventMask`] deciding which
//! events are forwarded at all. Two flavors are provided: standard library
//! channels with a thread worker, and Tokio channels with a task worker.

use crate::engine::events::{EngineEvent, EventListener, EventMask};
use std::sync::Arc;
use tracing::{error, info};

/// Event router using standard library mpsc channels.
pub struct EventRouterStd {
    mask: EventMask,
    sender: std::sync::mpsc::Sender<EngineEvent>,
    receiver: Option<std::sync::mpsc::Receiver<EngineEvent>>,
}

impl EventRouterStd {
    /// Create a router forwarding the events selected by `mask`.
    pub fn new(mask: EventMask) -> Self {
        let (sender, receiver) = std::sync::mpsc::channel();
        Self {
            mask,
            sender,
            receiver: Some(receiver),
        }
    }

    /// A listener suitable for [`crate::Engine::with_event_listener`].
    /// Events outside the mask are dropped at the source.
    #[must_use]
    pub fn listener(&self) -> EventListener {
        let sender = self.sender.clone();
        let mask = self.mask;
        Arc::new(move |event: &EngineEvent| {
            if !mask.contains(event.mask()) {
                return;
            }
            if let Err(err) = sender.send(event.clone()) {
                error!("Failed to route event {}: {}", event.name(), err);
            }
        })
    }

    /// Start the worker thread, handing each routed event to `handler`.
    pub fn start<F>(&mut self, handler: F) -> std::thread::JoinHandle<()>
    where
        F: Fn(EngineEvent) + Send + 'static,
    {
        let receiver = self
            .receiver
            .take()
            .expect("Event router already started");

        std::thread::spawn(move || {
            info!("Event router started");
            while let Ok(event) = receiver.recv() {
                info!("Routing event {}", event.name());
                handler(event);
            }
            info!("Event router stopped");
        })
    }
}

/// Event router using Tokio mpsc channels.
pub struct EventRouterTokio {
    mask: EventMask,
    sender: tokio::sync::mpsc::UnboundedSender<EngineEvent>,
    receiver: Option<tokio::sync::mpsc::UnboundedReceiver<EngineEvent>>,
}

impl EventRouterTokio {
    /// Create a router forwarding the events selected by `mask`.
    pub fn new(mask: EventMask) -> Self {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        Self {
            mask,
            sender,
            receiver: Some(receiver),
        }
    }

    /// A listener suitable for [`crate::Engine::with_event_listener`].
    /// Events outside the mask are dropped at the source.
    #[must_use]
    pub fn listener(&self) -> EventListener {
        let sender = self.sender.clone();
        let mask = self.mask;
        Arc::new(move |event: &EngineEvent| {
            if !mask.contains(event.mask()) {
                return;
            }
            if let Err(err) = sender.send(event.clone()) {
                error!("Failed to route event {}: {}", event.name(), err);
            }
        })
    }

    /// Start the worker task, handing each routed event to `handler`.
    ///
    /// Returns a JoinHandle for the spawned task.
    pub fn start<F>(&mut self, handler: F) -> tokio::task::JoinHandle<()>
    where
        F: Fn(EngineEvent) + Send + 'static,
    {
        let mut receiver = self
            .receiver
            .take()
            .expect("Event router already started");

        tokio::spawn(async move {
            info!("Event router started (Tokio)");
            while let Some(event) = receiver.recv().await {
                info!("Routing event {}", event.name());
                handler(event);
            }
            info!("Event router stopped (Tokio)");
        })
    }
}
