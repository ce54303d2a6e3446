use chrono::DateTime;
use chrono::Utc;

use super::outcome::RunOutcome;

/// Identity of a ledger entry. Carries the ledger generation it was issued
/// in, so a handle from before a `clear()` can never address a newer entry
/// that happens to sit at the same index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntryHandle {
    generation: u64,
    index: usize,
}

impl EntryHandle {
    pub fn index(self) -> usize {
        self.index
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub command: String,
    pub outcome: Option<RunOutcome>,
    pub submitted_at: DateTime<Utc>,
}

impl HistoryEntry {
    pub fn is_pending(&self) -> bool {
        self.outcome.is_none()
    }
}

/// Shell-style recall position: an index into the submitted commands, or
/// "at end" (a blank input line).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct HistoryCursor(Option<usize>);

impl HistoryCursor {
    pub const AT_END: Self = Self(None);

    pub fn position(self) -> Option<usize> {
        self.0
    }

    pub fn is_at_end(self) -> bool {
        self.0.is_none()
    }

    pub fn reset(&mut self) {
        self.0 = None;
    }
}

#[derive(Debug, Clone, Default)]
pub struct HistoryLedger {
    generation: u64,
    entries: Vec<HistoryEntry>,
}

impl HistoryLedger {
    pub fn append(&mut self, command: impl Into<String>) -> EntryHandle {
        self.append_at(command, Utc::now())
    }

    pub fn append_at(
        &mut self,
        command: impl Into<String>,
        submitted_at: DateTime<Utc>,
    ) -> EntryHandle {
        let index = self.entries.len();
        self.entries.push(HistoryEntry {
            command: command.into(),
            outcome: None,
            submitted_at,
        });
        EntryHandle {
            generation: self.generation,
            index,
        }
    }

    /// Sets the outcome of a pending entry. Returns `false` without touching
    /// anything when the handle predates a `clear()` or the entry already has
    /// its outcome.
    pub fn resolve(&mut self, handle: EntryHandle, outcome: RunOutcome) -> bool {
        if handle.generation != self.generation {
            return false;
        }
        match self.entries.get_mut(handle.index) {
            Some(entry) if entry.outcome.is_none() => {
                entry.outcome = Some(outcome);
                true
            }
            _ => false,
        }
    }

    pub fn clear(&mut self) {
        if self.entries.is_empty() {
            return;
        }
        self.entries.clear();
        self.generation += 1;
    }

    pub fn get(&self, handle: EntryHandle) -> Option<&HistoryEntry> {
        if handle.generation != self.generation {
            return None;
        }
        self.entries.get(handle.index)
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Moves `cursor` one step toward the oldest command and returns the
    /// command text at the new position. `None` when there is nothing to
    /// recall.
    pub fn recall_previous(&self, cursor: &mut HistoryCursor) -> Option<&str> {
        if self.entries.is_empty() {
            return None;
        }
        let last = self.entries.len() - 1;
        let next = match cursor.0 {
            Some(idx) if idx <= last => idx.saturating_sub(1),
            _ => last,
        };
        cursor.0 = Some(next);
        Some(self.entries[next].command.as_str())
    }

    /// Moves `cursor` one step toward the newest command. Stepping past the
    /// newest command returns `Some("")` and leaves the cursor at end; a
    /// cursor already at end is left alone and `None` is returned.
    pub fn recall_next(&self, cursor: &mut HistoryCursor) -> Option<&str> {
        let idx = cursor.0?;
        if idx + 1 < self.entries.len() {
            cursor.0 = Some(idx + 1);
            Some(self.entries[idx + 1].command.as_str())
        } else {
            cursor.0 = None;
            Some("")
        }
    }
}
