use super::catalog::CatalogView;
use super::catalog::ParameterDescriptor;
use super::catalog::ScriptDescriptor;
use super::config::Config;
use super::coordinator::ExecutionCoordinator;
use super::coordinator::RunTicket;
use super::history::EntryHandle;
use super::history::HistoryCursor;
use super::history::HistoryLedger;
use super::outcome::RunOutcome;
use super::outcome::Slot;
use super::params::ParameterStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Screen {
    Catalog,
    ScriptDetail,
    Executing,
    Results,
    Terminal,
}

impl Screen {
    pub fn label(self) -> &'static str {
        match self {
            Self::Catalog => "Catalog",
            Self::ScriptDetail => "Script detail",
            Self::Executing => "Executing",
            Self::Results => "Results",
            Self::Terminal => "Terminal",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SessionSettings {
    pub retain_terminal_history: bool,
}

impl From<&Config> for SessionSettings {
    fn from(config: &Config) -> Self {
        Self {
            retain_terminal_history: config.terminal.retain_history,
        }
    }
}

#[derive(Debug, Clone)]
pub struct ScriptSelection {
    pub script: ScriptDescriptor,
    pub focused: usize,
}

impl ScriptSelection {
    pub fn focused_parameter(&self) -> Option<&ParameterDescriptor> {
        self.script.parameters.get(self.focused)
    }
}

#[derive(Debug, Clone)]
pub struct ResultsView {
    pub script_name: String,
    pub outcome: RunOutcome,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InFlightCommand {
    pub ticket: RunTicket,
    pub entry: EntryHandle,
}

#[derive(Debug, Clone, Default)]
pub struct TerminalState {
    pub ledger: HistoryLedger,
    pub cursor: HistoryCursor,
    pub input: String,
    pub in_flight: Option<InFlightCommand>,
}

impl TerminalState {
    pub fn reset_input(&mut self) {
        self.input.clear();
        self.cursor.reset();
    }
}

#[derive(Debug, Clone)]
pub struct SessionState {
    pub screen: Screen,
    pub settings: SessionSettings,
    pub catalog: CatalogView,
    pub selection: Option<ScriptSelection>,
    pub params: ParameterStore,
    pub running: Option<RunTicket>,
    pub results: Option<ResultsView>,
    pub terminal: TerminalState,
    pub coordinator: ExecutionCoordinator,
}

impl SessionState {
    pub fn new(settings: SessionSettings) -> Self {
        Self {
            screen: Screen::Catalog,
            settings,
            catalog: CatalogView::default(),
            selection: None,
            params: ParameterStore::default(),
            running: None,
            results: None,
            terminal: TerminalState::default(),
            coordinator: ExecutionCoordinator::default(),
        }
    }

    pub fn selected_script(&self) -> Option<&ScriptDescriptor> {
        self.selection.as_ref().map(|selection| &selection.script)
    }

    /// Terminal input is gated while a command is outstanding.
    pub fn terminal_busy(&self) -> bool {
        self.coordinator.is_busy(Slot::Terminal)
    }

    pub(crate) fn discard_selection(&mut self) {
        self.selection = None;
        self.params.discard();
    }
}
