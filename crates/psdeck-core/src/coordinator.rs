use thiserror::Error;

use super::outcome::RunRequest;
use super::outcome::Slot;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RunTicket {
    pub slot: Slot,
    pub seq: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum CoordinatorError {
    #[error("{} slot already has an outstanding request (ticket {})", .slot.label(), .outstanding.seq)]
    SlotBusy { slot: Slot, outstanding: RunTicket },
}

/// A request accepted by the coordinator, ready to hand to a dispatcher.
#[derive(Debug, Clone, PartialEq)]
pub struct Submission {
    pub ticket: RunTicket,
    pub request: RunRequest,
}

/// Bookkeeping half of run execution: at most one outstanding ticket per
/// slot. Completions are only accepted for the ticket a slot is waiting on.
#[derive(Debug, Clone)]
pub struct ExecutionCoordinator {
    script: Option<RunTicket>,
    terminal: Option<RunTicket>,
    next_seq: u64,
}

impl Default for ExecutionCoordinator {
    fn default() -> Self {
        Self {
            script: None,
            terminal: None,
            next_seq: 1,
        }
    }
}

impl ExecutionCoordinator {
    fn lane(&mut self, slot: Slot) -> &mut Option<RunTicket> {
        match slot {
            Slot::Script => &mut self.script,
            Slot::Terminal => &mut self.terminal,
        }
    }

    pub fn outstanding(&self, slot: Slot) -> Option<RunTicket> {
        match slot {
            Slot::Script => self.script,
            Slot::Terminal => self.terminal,
        }
    }

    pub fn is_busy(&self, slot: Slot) -> bool {
        self.outstanding(slot).is_some()
    }

    pub fn submit(&mut self, request: RunRequest) -> Result<Submission, CoordinatorError> {
        let slot = request.slot();
        if let Some(outstanding) = self.outstanding(slot) {
            return Err(CoordinatorError::SlotBusy { slot, outstanding });
        }
        let ticket = RunTicket {
            slot,
            seq: self.next_seq,
        };
        self.next_seq += 1;
        *self.lane(slot) = Some(ticket);
        Ok(Submission { ticket, request })
    }

    /// Releases the slot if `ticket` is the one it is waiting on. Returns
    /// `false` for abandoned or unknown tickets.
    pub fn complete(&mut self, ticket: RunTicket) -> bool {
        let lane = self.lane(ticket.slot);
        if *lane == Some(ticket) {
            *lane = None;
            true
        } else {
            false
        }
    }

    /// Stops waiting on a slot; its eventual completion will be rejected.
    pub fn abandon(&mut self, slot: Slot) -> Option<RunTicket> {
        self.lane(slot).take()
    }
}
