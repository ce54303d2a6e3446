use std::sync::Arc;
use std::thread;

use psdeck_core::CatalogUnavailable;
use psdeck_core::RunOutcome;
use psdeck_core::RunRequest;
use psdeck_core::RunTicket;
use psdeck_core::ScriptDescriptor;
use psdeck_core::Submission;

use crate::catalog::fetch_catalog;
use crate::contracts::CommandRequest;
use crate::contracts::ExecuteRequest;
use crate::service::RemoteService;

const LOST_WORKER: &str = "request worker stopped before the service replied";

/// Sends one request and normalizes whatever happens into an outcome.
pub fn run_request(service: &dyn RemoteService, request: &RunRequest) -> RunOutcome {
    let reply = match request {
        RunRequest::Script {
            script_name,
            parameters,
        } => service.execute_script(&ExecuteRequest {
            script_name: script_name.clone(),
            parameters: parameters.clone(),
        }),
        RunRequest::Command { text } => service.execute_command(&CommandRequest {
            command: text.clone(),
        }),
    };
    match reply {
        Ok(response) => response.into_outcome(),
        Err(err) => {
            tracing::warn!(request = request.summary(), error = %err, "transport failure");
            RunOutcome::transport_failure(err.to_string())
        }
    }
}

/// Hands its outcome over exactly once. Dropped undelivered (worker panic,
/// spawn failure) it reports a transport failure instead.
struct Delivery<F>
where
    F: FnOnce(RunTicket, RunOutcome),
{
    ticket: RunTicket,
    deliver: Option<F>,
}

impl<F> Delivery<F>
where
    F: FnOnce(RunTicket, RunOutcome),
{
    fn new(ticket: RunTicket, deliver: F) -> Self {
        Self {
            ticket,
            deliver: Some(deliver),
        }
    }

    fn send(mut self, outcome: RunOutcome) {
        if let Some(deliver) = self.deliver.take() {
            deliver(self.ticket, outcome);
        }
    }
}

impl<F> Drop for Delivery<F>
where
    F: FnOnce(RunTicket, RunOutcome),
{
    fn drop(&mut self) {
        if let Some(deliver) = self.deliver.take() {
            tracing::error!(
                slot = self.ticket.slot.label(),
                ticket = self.ticket.seq,
                "{LOST_WORKER}"
            );
            deliver(self.ticket, RunOutcome::transport_failure(LOST_WORKER));
        }
    }
}

/// Runs submissions off the caller's thread. Completions come back through
/// the `deliver` callback, which is expected to forward them to the thread
/// that owns the session.
#[derive(Clone)]
pub struct Dispatcher {
    service: Arc<dyn RemoteService>,
}

impl Dispatcher {
    pub fn new(service: Arc<dyn RemoteService>) -> Self {
        Self { service }
    }

    pub fn service(&self) -> &dyn RemoteService {
        self.service.as_ref()
    }

    pub fn submit<F>(&self, submission: Submission, deliver: F)
    where
        F: FnOnce(RunTicket, RunOutcome) + Send + 'static,
    {
        let Submission { ticket, request } = submission;
        let delivery = Delivery::new(ticket, deliver);
        let service = Arc::clone(&self.service);
        let spawned = thread::Builder::new()
            .name(format!("psdeck-{}-{}", ticket.slot.label(), ticket.seq))
            .spawn(move || {
                let outcome = run_request(service.as_ref(), &request);
                tracing::debug!(
                    ticket = ticket.seq,
                    success = outcome.success,
                    "request finished"
                );
                delivery.send(outcome);
            });
        if let Err(err) = spawned {
            // The closure and its delivery were dropped with the failed spawn.
            tracing::error!(ticket = ticket.seq, error = %err, "could not spawn request worker");
        }
    }

    pub fn fetch_catalog<F>(&self, request_id: u64, deliver: F)
    where
        F: FnOnce(u64, Result<Vec<ScriptDescriptor>, CatalogUnavailable>) + Send + 'static,
    {
        let service = Arc::clone(&self.service);
        let spawned = thread::Builder::new()
            .name(format!("psdeck-catalog-{request_id}"))
            .spawn(move || deliver(request_id, fetch_catalog(service.as_ref())));
        if let Err(err) = spawned {
            tracing::error!(request_id, error = %err, "could not spawn catalog worker");
        }
    }
}
