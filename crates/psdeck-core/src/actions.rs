use super::catalog::CatalogUnavailable;
use super::catalog::ScriptDescriptor;
use super::coordinator::RunTicket;
use super::outcome::RunOutcome;
use super::params::ParameterValue;

#[derive(Debug, Clone)]
pub enum SessionAction {
    User(UserAction),
    Runtime(RuntimeAction),
}

#[derive(Debug, Clone, PartialEq)]
pub enum UserAction {
    // Catalog
    RefreshCatalog,
    CatalogMoveUp,
    CatalogMoveDown,
    SelectHighlighted,
    SelectScript(usize),
    OpenTerminal,

    Back,

    // Script detail
    FocusNextParameter,
    FocusPrevParameter,
    ParameterInput(char),
    ParameterBackspace,
    ToggleSwitch,
    SetParameter {
        name: String,
        value: Option<ParameterValue>,
    },
    Execute,

    // Terminal
    CommandInput(char),
    CommandBackspace,
    CommandPaste(String),
    ClearCommandInput,
    SubmitCommand,
    RecallPrevious,
    RecallNext,
    ClearHistory,
}

#[derive(Debug, Clone)]
pub enum RuntimeAction {
    SessionStarted,
    CatalogLoaded {
        request_id: u64,
        result: Result<Vec<ScriptDescriptor>, CatalogUnavailable>,
    },
    RunCompleted {
        ticket: RunTicket,
        outcome: RunOutcome,
    },
}
