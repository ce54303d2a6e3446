use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use thiserror::Error;

use super::catalog::ParameterKind;
use super::catalog::ScriptDescriptor;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ParameterValue {
    Flag(bool),
    Integer(i64),
    Text(String),
}

impl ParameterValue {
    /// Text shown in an input field while editing the value.
    pub fn as_input_text(&self) -> String {
        match self {
            Self::Flag(value) => value.to_string(),
            Self::Integer(value) => value.to_string(),
            Self::Text(value) => value.clone(),
        }
    }

    pub fn is_enabled(&self) -> bool {
        matches!(self, Self::Flag(true))
    }
}

pub type ParameterValues = BTreeMap<String, ParameterValue>;

/// Parameter mapping for the currently selected script. A plain state
/// container: nothing here checks values against the script's schema.
#[derive(Debug, Clone, Default)]
pub struct ParameterStore {
    script_id: Option<String>,
    values: ParameterValues,
}

impl ParameterStore {
    pub fn select(&mut self, script: &ScriptDescriptor) {
        self.script_id = Some(script.id.clone());
        self.values.clear();
    }

    pub fn discard(&mut self) {
        self.script_id = None;
        self.values.clear();
    }

    pub fn set(&mut self, name: impl Into<String>, value: ParameterValue) {
        self.values.insert(name.into(), value);
    }

    pub fn unset(&mut self, name: &str) -> Option<ParameterValue> {
        self.values.remove(name)
    }

    pub fn get(&self, name: &str) -> Option<&ParameterValue> {
        self.values.get(name)
    }

    pub fn script_id(&self) -> Option<&str> {
        self.script_id.as_deref()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Owned copy for a run request; later edits never reach a submitted run.
    pub fn snapshot(&self) -> ParameterValues {
        self.values.clone()
    }
}

/// Converts raw operator input into a value for a parameter of `kind`.
/// Empty input means "unset". Input that does not parse for its kind is kept
/// as text so it can be reported by [`validate`].
pub fn coerce_input(kind: ParameterKind, raw: &str) -> Option<ParameterValue> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    let value = match kind {
        ParameterKind::Text => ParameterValue::Text(raw.to_string()),
        ParameterKind::Integer => trimmed
            .parse::<i64>()
            .map(ParameterValue::Integer)
            .unwrap_or_else(|_| ParameterValue::Text(raw.to_string())),
        ParameterKind::Flag => match trimmed.to_ascii_lowercase().as_str() {
            "true" | "yes" | "on" | "1" => ParameterValue::Flag(true),
            "false" | "no" | "off" | "0" => ParameterValue::Flag(false),
            _ => ParameterValue::Text(raw.to_string()),
        },
    };
    Some(value)
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParameterIssue {
    #[error("parameter `{0}` is mandatory")]
    Missing(String),
    #[error("parameter `{0}` must be an integer")]
    NotAnInteger(String),
    #[error("parameter `{0}` must be true or false")]
    NotASwitch(String),
    #[error("script has no parameter named `{0}`")]
    Unknown(String),
}

/// Caller-side check run before asking the session to execute a script.
pub fn validate(script: &ScriptDescriptor, values: &ParameterValues) -> Vec<ParameterIssue> {
    let mut issues = Vec::new();
    for param in &script.parameters {
        match (values.get(&param.name), param.kind) {
            (None, _) => {
                if param.mandatory {
                    issues.push(ParameterIssue::Missing(param.name.clone()));
                }
            }
            (Some(ParameterValue::Text(_)), ParameterKind::Integer) => {
                issues.push(ParameterIssue::NotAnInteger(param.name.clone()));
            }
            (Some(ParameterValue::Text(_)), ParameterKind::Flag) => {
                issues.push(ParameterIssue::NotASwitch(param.name.clone()));
            }
            (Some(ParameterValue::Text(text)), ParameterKind::Text) if text.trim().is_empty() => {
                if param.mandatory {
                    issues.push(ParameterIssue::Missing(param.name.clone()));
                }
            }
            _ => {}
        }
    }
    for name in values.keys() {
        if script.parameter(name).is_none() {
            issues.push(ParameterIssue::Unknown(name.clone()));
        }
    }
    issues
}
