use std::sync::Arc;

use thiserror::Error;

/// Type tag of a script parameter as declared by the remote catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParameterKind {
    Text,
    Integer,
    Flag,
}

impl ParameterKind {
    /// Maps the catalog's wire tag (`String`, `Int32`, `Switch`). Unknown tags
    /// are treated as free text.
    pub fn from_wire(tag: &str) -> Self {
        match tag {
            "Int32" => Self::Integer,
            "Switch" => Self::Flag,
            _ => Self::Text,
        }
    }

    pub fn wire_tag(self) -> &'static str {
        match self {
            Self::Text => "String",
            Self::Integer => "Int32",
            Self::Flag => "Switch",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterDescriptor {
    pub name: String,
    pub kind: ParameterKind,
    pub mandatory: bool,
    pub default_value: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScriptDescriptor {
    pub id: String,
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParameterDescriptor>,
}

impl ScriptDescriptor {
    pub fn parameter(&self, name: &str) -> Option<&ParameterDescriptor> {
        self.parameters.iter().find(|param| param.name == name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("script catalog unavailable: {cause}")]
pub struct CatalogUnavailable {
    pub cause: Arc<str>,
}

impl CatalogUnavailable {
    pub fn new(cause: impl Into<Arc<str>>) -> Self {
        Self {
            cause: cause.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogStatus {
    Loading,
    Ready,
    Unavailable(CatalogUnavailable),
}

impl CatalogStatus {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Unavailable(_) => "unavailable",
        }
    }
}

/// Catalog as seen by the catalog screen. `scripts` holds the last successful
/// fetch in the order the service returned it and is replaced wholesale.
#[derive(Debug, Clone)]
pub struct CatalogView {
    pub status: CatalogStatus,
    pub scripts: Arc<[ScriptDescriptor]>,
    pub highlighted: usize,
    pub pending_request: Option<u64>,
    pub next_request_id: u64,
}

impl Default for CatalogView {
    fn default() -> Self {
        Self {
            status: CatalogStatus::Loading,
            scripts: Arc::from(Vec::new()),
            highlighted: 0,
            pending_request: None,
            next_request_id: 1,
        }
    }
}

impl CatalogView {
    /// Reserves the id for a new fetch. Any earlier outstanding fetch becomes
    /// stale.
    pub fn begin_fetch(&mut self) -> u64 {
        let request_id = self.next_request_id;
        self.next_request_id += 1;
        self.pending_request = Some(request_id);
        self.status = CatalogStatus::Loading;
        request_id
    }

    /// Applies a fetch result if it belongs to the newest outstanding fetch.
    pub fn finish_fetch(
        &mut self,
        request_id: u64,
        result: Result<Vec<ScriptDescriptor>, CatalogUnavailable>,
    ) -> bool {
        if self.pending_request != Some(request_id) {
            return false;
        }
        self.pending_request = None;
        match result {
            Ok(scripts) => {
                self.scripts = Arc::from(scripts);
                self.status = CatalogStatus::Ready;
                if self.highlighted >= self.scripts.len() {
                    self.highlighted = 0;
                }
            }
            Err(err) => {
                self.status = CatalogStatus::Unavailable(err);
            }
        }
        true
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.status, CatalogStatus::Ready)
    }

    pub fn move_up(&mut self) {
        if self.scripts.is_empty() {
            return;
        }
        if self.highlighted == 0 {
            self.highlighted = self.scripts.len() - 1;
        } else {
            self.highlighted -= 1;
        }
    }

    pub fn move_down(&mut self) {
        if self.scripts.is_empty() {
            return;
        }
        self.highlighted = (self.highlighted + 1) % self.scripts.len();
    }
}
