// src/browser.rs
// =============================================================================
// Runs the controller against a real backend.
//
// How it works:
// 1. load_repository / select_file dispatch to the controller
// 2. If the controller hands back a request, a tokio task executes it
//    against the backend and sends the finished Action back on a channel
// 3. next_response() receives one finished Action and dispatches it
// 4. After every dispatch the new snapshot is published on a watch channel
//
// Only the owner of the Browser mutates state; backend tasks just send
// messages. Requests are never cancelled, a superseded one simply finishes
// and is discarded by the controller's epoch check.
//
// Rust concepts:
// - Arc: the backend is shared between the browser and every request task
// - mpsc: many request tasks -> one browser
// - watch: one browser -> any number of UI observers, latest value only
// =============================================================================

use crate::backend::RepoBackend;
use crate::controller::{Action, BrowserController, BrowserSnapshot, Request};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::debug;

pub struct Browser<B> {
    controller: BrowserController,
    backend: Arc<B>,
    completions_tx: mpsc::UnboundedSender<Action>,
    completions_rx: mpsc::UnboundedReceiver<Action>,
    state: watch::Sender<BrowserSnapshot>,
    in_flight: usize,
}

impl<B: RepoBackend + 'static> Browser<B> {
    pub fn new(backend: B) -> Self {
        let (completions_tx, completions_rx) = mpsc::unbounded_channel();
        let (state, _) = watch::channel(BrowserSnapshot::default());

        Self {
            controller: BrowserController::new(),
            backend: Arc::new(backend),
            completions_tx,
            completions_rx,
            state,
            in_flight: 0,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn controller(&self) -> &BrowserController {
        &self.controller
    }

    pub fn snapshot(&self) -> BrowserSnapshot {
        self.controller.snapshot()
    }

    /// Observe state changes; the receiver always holds the latest snapshot.
    pub fn subscribe(&self) -> watch::Receiver<BrowserSnapshot> {
        self.state.subscribe()
    }

    /// Backend requests issued and not yet applied (stale ones included).
    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    /// Must be called from within a Tokio runtime.
    pub fn load_repository(&mut self, url: &str) {
        self.apply(Action::LoadRepository(url.to_string()));
    }

    /// Must be called from within a Tokio runtime.
    pub fn select_file(&mut self, path: &str) {
        self.apply(Action::SelectFile(path.to_string()));
    }

    /// Waits for the next backend response and applies it.
    ///
    /// Pends forever when nothing is in flight, which makes it safe to use as
    /// one branch of a `tokio::select!`.
    pub async fn next_response(&mut self) {
        // We hold a sender ourselves, so recv() never yields None
        if let Some(action) = self.completions_rx.recv().await {
            self.in_flight = self.in_flight.saturating_sub(1);
            self.apply(action);
        }
    }

    /// Applies responses until no request is outstanding.
    pub async fn settle(&mut self) {
        while self.in_flight > 0 {
            self.next_response().await;
        }
    }

    fn apply(&mut self, action: Action) {
        if let Some(request) = self.controller.dispatch(action) {
            self.spawn(request);
        }
        self.state.send_replace(self.controller.snapshot());
    }

    fn spawn(&mut self, request: Request) {
        let backend = Arc::clone(&self.backend);
        let completions = self.completions_tx.clone();
        self.in_flight += 1;

        tokio::spawn(async move {
            let action = match request {
                Request::Tree(request) => {
                    let result = backend.tree(&request.locator).await;
                    Action::TreeLoaded { request, result }
                }
                Request::Content(request) => {
                    let result = backend.file_content(&request.locator, &request.path).await;
                    Action::ContentLoaded { request, result }
                }
            };

            if completions.send(action).is_err() {
                debug!("browser dropped before the response arrived");
            }
        });
    }
}
