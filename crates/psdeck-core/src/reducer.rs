use super::actions::RuntimeAction;
use super::actions::SessionAction;
use super::actions::UserAction;
use super::catalog::ParameterKind;
use super::coordinator::RunTicket;
use super::coordinator::Submission;
use super::outcome::FailureKind;
use super::outcome::RunOutcome;
use super::outcome::RunRequest;
use super::outcome::Slot;
use super::params::coerce_input;
use super::params::ParameterValue;
use super::state::InFlightCommand;
use super::state::ResultsView;
use super::state::Screen;
use super::state::ScriptSelection;
use super::state::SessionState;

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEffect {
    RequestFrame,
    FetchCatalog { request_id: u64 },
    Submit(Submission),
}

/// Applies one trigger to the session. An empty effect list means the
/// trigger is not valid for the current screen and nothing changed.
pub fn reduce(state: &mut SessionState, action: SessionAction) -> Vec<SessionEffect> {
    match action {
        SessionAction::User(user) => reduce_user(state, user),
        SessionAction::Runtime(runtime) => reduce_runtime(state, runtime),
    }
}

fn enter(state: &mut SessionState, screen: Screen) {
    tracing::debug!(from = state.screen.label(), to = screen.label(), "screen transition");
    state.screen = screen;
}

fn reduce_user(state: &mut SessionState, action: UserAction) -> Vec<SessionEffect> {
    match (state.screen, action) {
        (Screen::Catalog, UserAction::RefreshCatalog) => {
            let request_id = state.catalog.begin_fetch();
            vec![
                SessionEffect::FetchCatalog { request_id },
                SessionEffect::RequestFrame,
            ]
        }
        (Screen::Catalog, UserAction::CatalogMoveUp) => {
            if !state.catalog.is_ready() || state.catalog.scripts.is_empty() {
                return Vec::new();
            }
            state.catalog.move_up();
            vec![SessionEffect::RequestFrame]
        }
        (Screen::Catalog, UserAction::CatalogMoveDown) => {
            if !state.catalog.is_ready() || state.catalog.scripts.is_empty() {
                return Vec::new();
            }
            state.catalog.move_down();
            vec![SessionEffect::RequestFrame]
        }
        (Screen::Catalog, UserAction::SelectHighlighted) => {
            let index = state.catalog.highlighted;
            select_script(state, index)
        }
        (Screen::Catalog, UserAction::SelectScript(index)) => select_script(state, index),
        (Screen::Catalog, UserAction::OpenTerminal) => {
            if !state.settings.retain_terminal_history {
                state.terminal.ledger.clear();
            }
            state.terminal.reset_input();
            enter(state, Screen::Terminal);
            vec![SessionEffect::RequestFrame]
        }

        (Screen::ScriptDetail, UserAction::Back) => {
            state.discard_selection();
            enter(state, Screen::Catalog);
            vec![SessionEffect::RequestFrame]
        }
        (Screen::Executing, UserAction::Back) => {
            if let Some(ticket) = state.coordinator.abandon(Slot::Script) {
                tracing::info!(ticket = ticket.seq, "abandoned script run");
            }
            state.running = None;
            state.discard_selection();
            enter(state, Screen::Catalog);
            vec![SessionEffect::RequestFrame]
        }
        (Screen::Results, UserAction::Back) => {
            state.results = None;
            state.discard_selection();
            enter(state, Screen::Catalog);
            vec![SessionEffect::RequestFrame]
        }
        (Screen::Terminal, UserAction::Back) => {
            if !state.settings.retain_terminal_history {
                state.terminal.ledger.clear();
            }
            state.terminal.reset_input();
            enter(state, Screen::Catalog);
            vec![SessionEffect::RequestFrame]
        }

        (Screen::ScriptDetail, UserAction::FocusNextParameter) => {
            let Some(selection) = state.selection.as_mut() else {
                return Vec::new();
            };
            let count = selection.script.parameters.len();
            if count == 0 {
                return Vec::new();
            }
            selection.focused = (selection.focused + 1) % count;
            vec![SessionEffect::RequestFrame]
        }
        (Screen::ScriptDetail, UserAction::FocusPrevParameter) => {
            let Some(selection) = state.selection.as_mut() else {
                return Vec::new();
            };
            let count = selection.script.parameters.len();
            if count == 0 {
                return Vec::new();
            }
            selection.focused = if selection.focused == 0 {
                count - 1
            } else {
                selection.focused - 1
            };
            vec![SessionEffect::RequestFrame]
        }
        (Screen::ScriptDetail, UserAction::ParameterInput(ch)) => {
            edit_focused_parameter(state, |raw| raw.push(ch))
        }
        (Screen::ScriptDetail, UserAction::ParameterBackspace) => {
            edit_focused_parameter(state, |raw| {
                raw.pop();
            })
        }
        (Screen::ScriptDetail, UserAction::ToggleSwitch) => {
            let Some(param) = state
                .selection
                .as_ref()
                .and_then(ScriptSelection::focused_parameter)
            else {
                return Vec::new();
            };
            if param.kind != ParameterKind::Flag {
                return Vec::new();
            }
            let name = param.name.clone();
            let enabled = state.params.get(&name).is_some_and(ParameterValue::is_enabled);
            state.params.set(name, ParameterValue::Flag(!enabled));
            vec![SessionEffect::RequestFrame]
        }
        (Screen::ScriptDetail, UserAction::SetParameter { name, value }) => {
            match value {
                Some(value) => state.params.set(name, value),
                None => {
                    state.params.unset(&name);
                }
            }
            vec![SessionEffect::RequestFrame]
        }
        (Screen::ScriptDetail, UserAction::Execute) => {
            let Some(selection) = state.selection.as_ref() else {
                return Vec::new();
            };
            let request = RunRequest::Script {
                script_name: selection.script.name.clone(),
                parameters: state.params.snapshot(),
            };
            match state.coordinator.submit(request) {
                Ok(submission) => {
                    tracing::info!(
                        ticket = submission.ticket.seq,
                        script = submission.request.summary(),
                        "submitting script run"
                    );
                    state.running = Some(submission.ticket);
                    enter(state, Screen::Executing);
                    vec![
                        SessionEffect::Submit(submission),
                        SessionEffect::RequestFrame,
                    ]
                }
                Err(err) => {
                    tracing::error!(error = %err, "script submission rejected");
                    Vec::new()
                }
            }
        }

        (Screen::Terminal, UserAction::CommandInput(ch)) => {
            if state.terminal_busy() {
                return Vec::new();
            }
            state.terminal.input.push(ch);
            vec![SessionEffect::RequestFrame]
        }
        (Screen::Terminal, UserAction::CommandBackspace) => {
            if state.terminal_busy() || state.terminal.input.pop().is_none() {
                return Vec::new();
            }
            vec![SessionEffect::RequestFrame]
        }
        (Screen::Terminal, UserAction::CommandPaste(text)) => {
            if state.terminal_busy() {
                return Vec::new();
            }
            let single_line = text.replace(['\r', '\n'], " ");
            state.terminal.input.push_str(&single_line);
            vec![SessionEffect::RequestFrame]
        }
        (Screen::Terminal, UserAction::ClearCommandInput) => {
            state.terminal.reset_input();
            vec![SessionEffect::RequestFrame]
        }
        (Screen::Terminal, UserAction::SubmitCommand) => submit_command(state),
        (Screen::Terminal, UserAction::RecallPrevious) => {
            if state.terminal_busy() {
                return Vec::new();
            }
            let terminal = &mut state.terminal;
            match terminal.ledger.recall_previous(&mut terminal.cursor) {
                Some(text) => {
                    terminal.input = text.to_string();
                    vec![SessionEffect::RequestFrame]
                }
                None => Vec::new(),
            }
        }
        (Screen::Terminal, UserAction::RecallNext) => {
            if state.terminal_busy() {
                return Vec::new();
            }
            let terminal = &mut state.terminal;
            match terminal.ledger.recall_next(&mut terminal.cursor) {
                Some(text) => {
                    terminal.input = text.to_string();
                    vec![SessionEffect::RequestFrame]
                }
                None => Vec::new(),
            }
        }
        (Screen::Terminal, UserAction::ClearHistory) => {
            state.terminal.ledger.clear();
            state.terminal.reset_input();
            vec![SessionEffect::RequestFrame]
        }

        (screen, action) => {
            tracing::trace!(screen = screen.label(), ?action, "ignored trigger");
            Vec::new()
        }
    }
}

fn select_script(state: &mut SessionState, index: usize) -> Vec<SessionEffect> {
    if !state.catalog.is_ready() {
        return Vec::new();
    }
    let Some(script) = state.catalog.scripts.get(index).cloned() else {
        return Vec::new();
    };
    state.catalog.highlighted = index;
    state.params.select(&script);
    state.selection = Some(ScriptSelection { script, focused: 0 });
    enter(state, Screen::ScriptDetail);
    vec![SessionEffect::RequestFrame]
}

fn edit_focused_parameter(
    state: &mut SessionState,
    edit: impl FnOnce(&mut String),
) -> Vec<SessionEffect> {
    let Some(param) = state
        .selection
        .as_ref()
        .and_then(ScriptSelection::focused_parameter)
    else {
        return Vec::new();
    };
    if param.kind == ParameterKind::Flag {
        return Vec::new();
    }
    let (name, kind) = (param.name.clone(), param.kind);

    let mut raw = state
        .params
        .get(&name)
        .map(ParameterValue::as_input_text)
        .unwrap_or_default();
    edit(&mut raw);

    match coerce_input(kind, &raw) {
        Some(value) => state.params.set(name, value),
        None => {
            state.params.unset(&name);
        }
    }
    vec![SessionEffect::RequestFrame]
}

fn submit_command(state: &mut SessionState) -> Vec<SessionEffect> {
    if state.terminal.input.trim().is_empty() || state.terminal_busy() {
        return Vec::new();
    }
    let text = std::mem::take(&mut state.terminal.input);
    let request = RunRequest::Command { text: text.clone() };
    let submission = match state.coordinator.submit(request) {
        Ok(submission) => submission,
        Err(err) => {
            tracing::error!(error = %err, "command submission rejected");
            state.terminal.input = text;
            return Vec::new();
        }
    };
    let entry = state.terminal.ledger.append(text);
    state.terminal.cursor.reset();
    state.terminal.in_flight = Some(InFlightCommand {
        ticket: submission.ticket,
        entry,
    });
    tracing::info!(
        ticket = submission.ticket.seq,
        entry = entry.index(),
        "submitting terminal command"
    );
    vec![
        SessionEffect::Submit(submission),
        SessionEffect::RequestFrame,
    ]
}

fn reduce_runtime(state: &mut SessionState, action: RuntimeAction) -> Vec<SessionEffect> {
    match action {
        RuntimeAction::SessionStarted => {
            if state.catalog.pending_request.is_some() {
                return Vec::new();
            }
            let request_id = state.catalog.begin_fetch();
            vec![
                SessionEffect::FetchCatalog { request_id },
                SessionEffect::RequestFrame,
            ]
        }
        RuntimeAction::CatalogLoaded { request_id, result } => {
            if let Err(err) = &result {
                tracing::warn!(request_id, error = %err, "catalog fetch failed");
            }
            if state.catalog.finish_fetch(request_id, result) {
                vec![SessionEffect::RequestFrame]
            } else {
                tracing::debug!(request_id, "dropping superseded catalog result");
                Vec::new()
            }
        }
        RuntimeAction::RunCompleted { ticket, outcome } => {
            if !state.coordinator.complete(ticket) {
                tracing::warn!(
                    slot = ticket.slot.label(),
                    ticket = ticket.seq,
                    "discarding completion for a run nobody is waiting on"
                );
                return Vec::new();
            }
            tracing::debug!(
                slot = ticket.slot.label(),
                ticket = ticket.seq,
                failure = outcome.failure_kind().map(FailureKind::label),
                "run completed"
            );
            match ticket.slot {
                Slot::Script => complete_script_run(state, ticket, outcome),
                Slot::Terminal => complete_command(state, ticket, outcome),
            }
        }
    }
}

fn complete_script_run(
    state: &mut SessionState,
    ticket: RunTicket,
    outcome: RunOutcome,
) -> Vec<SessionEffect> {
    if state.screen != Screen::Executing || state.running != Some(ticket) {
        tracing::warn!(ticket = ticket.seq, "script outcome arrived after navigation");
        return Vec::new();
    }
    let script_name = state
        .selected_script()
        .map(|script| script.name.clone())
        .unwrap_or_default();
    state.running = None;
    state.results = Some(ResultsView {
        script_name,
        outcome,
    });
    enter(state, Screen::Results);
    vec![SessionEffect::RequestFrame]
}

fn complete_command(
    state: &mut SessionState,
    ticket: RunTicket,
    outcome: RunOutcome,
) -> Vec<SessionEffect> {
    let in_flight = match state.terminal.in_flight {
        Some(in_flight) if in_flight.ticket == ticket => in_flight,
        _ => return Vec::new(),
    };
    state.terminal.in_flight = None;
    if !state.terminal.ledger.resolve(in_flight.entry, outcome) {
        tracing::debug!(
            entry = in_flight.entry.index(),
            "history was cleared before the command finished"
        );
    }
    vec![SessionEffect::RequestFrame]
}

#[cfg(test)]
mod tests;
