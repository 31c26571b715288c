//! Native counterpart of the browser Web Worker
//!
//! A dedicated thread owns an [`Engine`] and answers JSON messages in order.
//! Responses arrive on a channel; hosts match them by `requestId`.

use crate::error::{EngineError, Result};
use crate::protocol::{Engine, Request};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};
use tracing::{debug, trace};

pub struct PaginationWorker {
    requests: Option<Sender<String>>,
    thread: Option<JoinHandle<()>>,
}

impl PaginationWorker {
    /// Start the worker thread. The receiver yields one JSON response per
    /// posted message.
    pub fn spawn() -> Result<(Self, Receiver<String>)> {
        let (request_tx, request_rx) = mpsc::channel::<String>();
        let (response_tx, response_rx) = mpsc::channel::<String>();

        let thread = thread::Builder::new()
            .name("script-pager".to_string())
            .spawn(move || {
                let mut engine = Engine::new();
                for message in request_rx {
                    trace!(bytes = message.len(), "message received");
                    let reply = engine.handle_json(&message);
                    if response_tx.send(reply).is_err() {
                        break;
                    }
                }
                debug!("pagination worker stopped");
            })
            .map_err(|err| EngineError::internal(format!("cannot start worker: {}", err)))?;

        Ok((
            Self {
                requests: Some(request_tx),
                thread: Some(thread),
            },
            response_rx,
        ))
    }

    /// Queue a raw JSON message
    pub fn post(&self, message: impl Into<String>) -> Result<()> {
        let sender = self
            .requests
            .as_ref()
            .ok_or_else(|| EngineError::internal("worker is shut down"))?;
        sender
            .send(message.into())
            .map_err(|_| EngineError::internal("worker thread has exited"))
    }

    pub fn post_request(&self, request: &Request) -> Result<()> {
        let message = serde_json::to_string(request)?;
        self.post(message)
    }
}

impl Drop for PaginationWorker {
    fn drop(&mut self) {
        // Closing the channel ends the thread's loop
        self.requests.take();
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}
