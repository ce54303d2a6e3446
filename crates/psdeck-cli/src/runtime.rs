use std::sync::mpsc;

use psdeck_core::actions::RuntimeAction;
use psdeck_core::actions::SessionAction;
use psdeck_core::reducer::reduce;
use psdeck_core::reducer::SessionEffect;
use psdeck_core::state::SessionState;
use psdeck_exec::Dispatcher;

/// Owns the session and serializes every completion back onto the thread
/// that calls [`Runtime::apply`] / [`Runtime::drain`].
pub struct Runtime {
    pub state: SessionState,
    dispatcher: Dispatcher,
    tx: mpsc::Sender<SessionAction>,
    rx: mpsc::Receiver<SessionAction>,
}

impl Runtime {
    pub fn new(state: SessionState, dispatcher: Dispatcher) -> Self {
        let (tx, rx) = mpsc::channel();
        Self {
            state,
            dispatcher,
            tx,
            rx,
        }
    }

    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Reduces one action and starts its effects. Returns `true` when the
    /// screen needs to be redrawn.
    pub fn apply(&mut self, action: SessionAction) -> bool {
        let effects = reduce(&mut self.state, action);
        self.perform(effects)
    }

    fn perform(&self, effects: Vec<SessionEffect>) -> bool {
        let mut redraw = false;
        for effect in effects {
            match effect {
                SessionEffect::RequestFrame => redraw = true,
                SessionEffect::FetchCatalog { request_id } => {
                    let tx = self.tx.clone();
                    self.dispatcher.fetch_catalog(request_id, move |request_id, result| {
                        let _ = tx.send(SessionAction::Runtime(RuntimeAction::CatalogLoaded {
                            request_id,
                            result,
                        }));
                    });
                }
                SessionEffect::Submit(submission) => {
                    let tx = self.tx.clone();
                    self.dispatcher.submit(submission, move |ticket, outcome| {
                        let _ = tx.send(SessionAction::Runtime(RuntimeAction::RunCompleted {
                            ticket,
                            outcome,
                        }));
                    });
                }
            }
        }
        redraw
    }

    /// Applies every completion that has arrived so far without blocking.
    pub fn drain(&mut self) -> bool {
        let mut redraw = false;
        while let Ok(action) = self.rx.try_recv() {
            redraw |= self.apply(action);
        }
        redraw
    }

    /// Blocks on completions until `done` holds.
    pub fn wait_until(&mut self, done: impl Fn(&SessionState) -> bool) -> anyhow::Result<()> {
        while !done(&self.state) {
            let action = self.rx.recv()?;
            self.apply(action);
        }
        Ok(())
    }
}
