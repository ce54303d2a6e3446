use serde::Deserialize;
use serde::Serialize;

use psdeck_core::ParameterDescriptor;
use psdeck_core::ParameterKind;
use psdeck_core::ParameterValues;
use psdeck_core::RunOutcome;
use psdeck_core::ScriptDescriptor;

/// Normalizes a configured backend URL into the API root: a trailing `/` is
/// dropped and `/api` is appended unless already present.
pub fn api_base_url(raw: &str) -> String {
    let trimmed = raw.trim();
    let base = trimmed.strip_suffix('/').unwrap_or(trimmed);
    if base.ends_with("/api") {
        base.to_string()
    } else {
        format!("{base}/api")
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireParameter {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub mandatory: bool,
    #[serde(rename = "defaultValue", default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<String>,
    #[serde(default)]
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WireScript {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub parameters: Vec<WireParameter>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptListResponse {
    pub scripts: Vec<WireScript>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteRequest {
    pub script_name: String,
    pub parameters: ParameterValues,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandRequest {
    pub command: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub success: bool,
    #[serde(default)]
    pub output: String,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(default)]
    pub execution_time: Option<f64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: String,
    #[serde(default)]
    pub service: String,
    #[serde(default)]
    pub timestamp: String,
    #[serde(default)]
    pub database: String,
}

impl HealthReport {
    pub fn is_ok(&self) -> bool {
        self.status.eq_ignore_ascii_case("ok")
    }
}

impl From<WireParameter> for ParameterDescriptor {
    fn from(wire: WireParameter) -> Self {
        Self {
            kind: ParameterKind::from_wire(&wire.kind),
            name: wire.name,
            mandatory: wire.mandatory,
            default_value: wire.default_value,
            description: wire.description,
        }
    }
}

impl From<WireScript> for ScriptDescriptor {
    fn from(wire: WireScript) -> Self {
        Self {
            id: wire.id,
            name: wire.name,
            description: wire.description,
            parameters: wire.parameters.into_iter().map(Into::into).collect(),
        }
    }
}

impl ExecuteResponse {
    /// Maps a well-formed reply onto a run outcome. `success=false` always
    /// counts as a remote-reported failure.
    pub fn into_outcome(self) -> RunOutcome {
        if self.success {
            RunOutcome::succeeded(self.output, self.execution_time)
        } else {
            RunOutcome::remote_failure(self.output, self.error, self.execution_time)
        }
    }
}
