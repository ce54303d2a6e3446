use pretty_assertions::assert_eq;

pub(super) use super::reduce;
pub(super) use crate::actions::RuntimeAction;
pub(super) use crate::actions::SessionAction;
pub(super) use crate::actions::UserAction;
pub(super) use crate::catalog::CatalogStatus;
pub(super) use crate::catalog::CatalogUnavailable;
pub(super) use crate::catalog::ParameterDescriptor;
pub(super) use crate::catalog::ParameterKind;
pub(super) use crate::catalog::ScriptDescriptor;
pub(super) use crate::coordinator::RunTicket;
pub(super) use crate::coordinator::Submission;
pub(super) use crate::outcome::FailureKind;
pub(super) use crate::outcome::RunOutcome;
pub(super) use crate::outcome::RunRequest;
pub(super) use crate::outcome::Slot;
pub(super) use crate::params::ParameterValue;
pub(super) use crate::reducer::SessionEffect;
pub(super) use crate::state::Screen;
pub(super) use crate::state::SessionSettings;
pub(super) use crate::state::SessionState;

mod catalog_flow;
mod terminal_flow;

fn state() -> SessionState {
    SessionState::new(SessionSettings::default())
}

fn param(name: &str, kind: ParameterKind, mandatory: bool) -> ParameterDescriptor {
    ParameterDescriptor {
        name: name.to_string(),
        kind,
        mandatory,
        default_value: None,
        description: format!("{name} parameter"),
    }
}

fn script(id: &str, parameters: Vec<ParameterDescriptor>) -> ScriptDescriptor {
    ScriptDescriptor {
        id: id.to_string(),
        name: format!("{id}.ps1"),
        description: format!("{id} description"),
        parameters,
    }
}

fn two_scripts() -> Vec<ScriptDescriptor> {
    vec![
        script(
            "Get-FileList",
            vec![
                param("Path", ParameterKind::Text, true),
                param("Recurse", ParameterKind::Flag, false),
            ],
        ),
        script(
            "Test-NetworkConnection",
            vec![
                param("ComputerName", ParameterKind::Text, true),
                param("Port", ParameterKind::Integer, false),
            ],
        ),
    ]
}

fn user(state: &mut SessionState, action: UserAction) -> Vec<SessionEffect> {
    reduce(state, SessionAction::User(action))
}

fn runtime(state: &mut SessionState, action: RuntimeAction) -> Vec<SessionEffect> {
    reduce(state, SessionAction::Runtime(action))
}

fn fetch_id(effects: &[SessionEffect]) -> u64 {
    effects
        .iter()
        .find_map(|effect| match effect {
            SessionEffect::FetchCatalog { request_id } => Some(*request_id),
            _ => None,
        })
        .expect("fetch effect")
}

fn submission(effects: &[SessionEffect]) -> Submission {
    effects
        .iter()
        .find_map(|effect| match effect {
            SessionEffect::Submit(submission) => Some(submission.clone()),
            _ => None,
        })
        .expect("submit effect")
}

/// Starts a session and answers its first catalog fetch.
fn loaded_state(scripts: Vec<ScriptDescriptor>) -> SessionState {
    let mut state = state();
    let effects = runtime(&mut state, RuntimeAction::SessionStarted);
    let request_id = fetch_id(&effects);
    let effects = runtime(
        &mut state,
        RuntimeAction::CatalogLoaded {
            request_id,
            result: Ok(scripts),
        },
    );
    assert_eq!(effects, vec![SessionEffect::RequestFrame]);
    assert_eq!(state.catalog.status, CatalogStatus::Ready);
    state
}

fn type_command(state: &mut SessionState, text: &str) {
    for ch in text.chars() {
        user(state, UserAction::CommandInput(ch));
    }
}

fn in_terminal() -> SessionState {
    let mut state = loaded_state(two_scripts());
    user(&mut state, UserAction::OpenTerminal);
    assert_eq!(state.screen, Screen::Terminal);
    state
}

fn complete(state: &mut SessionState, ticket: RunTicket, outcome: RunOutcome) -> Vec<SessionEffect> {
    runtime(state, RuntimeAction::RunCompleted { ticket, outcome })
}
