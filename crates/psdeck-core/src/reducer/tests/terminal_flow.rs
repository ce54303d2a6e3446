use super::*;
use pretty_assertions::assert_eq;

fn submit(state: &mut SessionState, text: &str) -> Submission {
    type_command(state, text);
    let effects = user(state, UserAction::SubmitCommand);
    submission(&effects)
}

#[test]
fn failed_command_resolves_its_own_entry() {
    let mut state = in_terminal();
    let submission = submit(&mut state, "Get-Date");

    assert_eq!(
        submission.request,
        RunRequest::Command {
            text: "Get-Date".to_string()
        }
    );
    assert_eq!(state.terminal.ledger.len(), 1);
    assert!(state.terminal.ledger.entries()[0].is_pending());
    assert_eq!(state.terminal.input, "");
    let entry = state.terminal.in_flight.expect("in flight").entry;

    complete(
        &mut state,
        submission.ticket,
        RunOutcome::remote_failure("", Some("not found".to_string()), None),
    );

    assert_eq!(state.terminal.ledger.len(), 1);
    let resolved = state.terminal.ledger.get(entry).expect("entry");
    assert_eq!(resolved.command, "Get-Date");
    let outcome = resolved.outcome.as_ref().expect("outcome");
    assert!(!outcome.success);
    assert_eq!(outcome.output, "");
    assert_eq!(outcome.error_message(), Some("not found"));
    assert_eq!(outcome.failure_kind(), Some(FailureKind::Remote));
    assert!(state.terminal.in_flight.is_none());
}

#[test]
fn blank_input_is_not_submitted() {
    let mut state = in_terminal();
    type_command(&mut state, "   ");

    assert!(user(&mut state, UserAction::SubmitCommand).is_empty());
    assert!(state.terminal.ledger.is_empty());
}

#[test]
fn input_is_gated_while_a_command_runs() {
    let mut state = in_terminal();
    let first = submit(&mut state, "Get-Process");

    assert!(user(&mut state, UserAction::CommandInput('x')).is_empty());
    assert!(user(&mut state, UserAction::SubmitCommand).is_empty());
    assert!(user(&mut state, UserAction::RecallPrevious).is_empty());
    assert_eq!(state.terminal.ledger.len(), 1);

    complete(&mut state, first.ticket, RunOutcome::succeeded("pwsh", Some(0.2)));
    let second = submit(&mut state, "Get-Date");
    assert_ne!(first.ticket, second.ticket);
    assert_eq!(state.terminal.ledger.len(), 2);
}

#[test]
fn recall_walks_history_and_returns_to_blank() {
    let mut state = in_terminal();
    for command in ["one", "two"] {
        let ticket = submit(&mut state, command).ticket;
        complete(&mut state, ticket, RunOutcome::succeeded("", None));
    }

    user(&mut state, UserAction::RecallPrevious);
    assert_eq!(state.terminal.input, "two");
    user(&mut state, UserAction::RecallPrevious);
    assert_eq!(state.terminal.input, "one");
    user(&mut state, UserAction::RecallPrevious);
    assert_eq!(state.terminal.input, "one");

    user(&mut state, UserAction::RecallNext);
    assert_eq!(state.terminal.input, "two");
    user(&mut state, UserAction::RecallNext);
    assert_eq!(state.terminal.input, "");
    assert!(state.terminal.cursor.is_at_end());
    assert!(user(&mut state, UserAction::RecallNext).is_empty());
}

#[test]
fn escape_clears_input_and_cursor() {
    let mut state = in_terminal();
    let ticket = submit(&mut state, "Get-Service").ticket;
    complete(&mut state, ticket, RunOutcome::succeeded("", None));
    user(&mut state, UserAction::RecallPrevious);

    user(&mut state, UserAction::ClearCommandInput);
    assert_eq!(state.terminal.input, "");
    assert!(state.terminal.cursor.is_at_end());
    assert_eq!(state.terminal.ledger.len(), 1);
}

#[test]
fn clear_history_drops_entries_and_orphans_in_flight_command() {
    let mut state = in_terminal();
    let pending = submit(&mut state, "Start-Sleep 5");

    let effects = user(&mut state, UserAction::ClearHistory);
    assert_eq!(effects, vec![SessionEffect::RequestFrame]);
    assert!(state.terminal.ledger.is_empty());

    // Still gated until the orphaned command comes back.
    assert!(state.terminal_busy());
    complete(&mut state, pending.ticket, RunOutcome::succeeded("done", None));
    assert!(state.terminal.ledger.is_empty());
    assert!(!state.terminal_busy());

    let fresh = submit(&mut state, "Get-Date");
    complete(&mut state, fresh.ticket, RunOutcome::succeeded("today", None));
    assert_eq!(state.terminal.ledger.len(), 1);
    assert_eq!(
        state.terminal.ledger.entries()[0].outcome,
        Some(RunOutcome::succeeded("today", None))
    );
}

#[test]
fn leaving_terminal_discards_history_by_default() {
    let mut state = in_terminal();
    let ticket = submit(&mut state, "Get-Date").ticket;
    complete(&mut state, ticket, RunOutcome::succeeded("now", None));

    user(&mut state, UserAction::Back);
    assert_eq!(state.screen, Screen::Catalog);
    assert!(state.terminal.ledger.is_empty());

    user(&mut state, UserAction::OpenTerminal);
    assert!(state.terminal.ledger.is_empty());
}

#[test]
fn retained_history_survives_navigation() {
    let mut state = SessionState::new(SessionSettings {
        retain_terminal_history: true,
    });
    user(&mut state, UserAction::OpenTerminal);
    let ticket = submit(&mut state, "Get-Date").ticket;
    complete(&mut state, ticket, RunOutcome::succeeded("now", None));

    user(&mut state, UserAction::Back);
    user(&mut state, UserAction::OpenTerminal);
    assert_eq!(state.terminal.ledger.len(), 1);
    assert_eq!(state.terminal.input, "");
}

#[test]
fn command_finishing_after_leaving_terminal_is_dropped() {
    let mut state = in_terminal();
    let pending = submit(&mut state, "Get-ChildItem");

    user(&mut state, UserAction::Back);
    user(&mut state, UserAction::OpenTerminal);
    assert!(state.terminal_busy());

    let effects = complete(&mut state, pending.ticket, RunOutcome::succeeded("files", None));
    assert_eq!(effects, vec![SessionEffect::RequestFrame]);
    assert!(state.terminal.ledger.is_empty());
    assert!(!state.terminal_busy());
}

#[test]
fn terminal_and_script_slots_run_side_by_side() {
    let mut state = loaded_state(two_scripts());
    user(&mut state, UserAction::OpenTerminal);
    let command = submit(&mut state, "Get-Date");
    user(&mut state, UserAction::Back);

    user(&mut state, UserAction::SelectScript(0));
    let run = submission(&user(&mut state, UserAction::Execute));
    assert!(state.coordinator.is_busy(Slot::Terminal));
    assert!(state.coordinator.is_busy(Slot::Script));

    complete(&mut state, command.ticket, RunOutcome::succeeded("date", None));
    assert_eq!(state.screen, Screen::Executing);
    complete(&mut state, run.ticket, RunOutcome::succeeded("OK", None));
    assert_eq!(state.screen, Screen::Results);
}

#[test]
fn paste_is_flattened_to_one_line() {
    let mut state = in_terminal();
    user(
        &mut state,
        UserAction::CommandPaste("Get-Process |\nSort-Object CPU".to_string()),
    );
    assert_eq!(state.terminal.input, "Get-Process | Sort-Object CPU");
}
