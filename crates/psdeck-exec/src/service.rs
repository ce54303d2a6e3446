use std::thread;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;

use psdeck_core::ParameterDescriptor;
use psdeck_core::ParameterKind;
use psdeck_core::ParameterValues;
use psdeck_core::ScriptDescriptor;

use crate::contracts::api_base_url;
use crate::contracts::CommandRequest;
use crate::contracts::ExecuteRequest;
use crate::contracts::ExecuteResponse;
use crate::contracts::HealthReport;
use crate::contracts::ScriptListResponse;
use crate::error::TransportError;

/// The remote execution service. Implementations block the calling thread;
/// the dispatcher is what keeps them off the UI thread.
pub trait RemoteService: Send + Sync {
    fn describe(&self) -> String;

    fn list_scripts(&self) -> Result<Vec<ScriptDescriptor>, TransportError>;

    fn execute_script(&self, request: &ExecuteRequest) -> Result<ExecuteResponse, TransportError>;

    fn execute_command(&self, request: &CommandRequest)
        -> Result<ExecuteResponse, TransportError>;

    fn health(&self) -> Result<HealthReport, TransportError>;
}

#[derive(Debug, Clone)]
pub struct HttpService {
    base: String,
    agent: ureq::Agent,
}

impl HttpService {
    /// `timeout` of `None` leaves requests unbounded.
    pub fn new(backend_url: &str, timeout: Option<Duration>) -> Self {
        let config = ureq::Agent::config_builder()
            .timeout_global(timeout)
            .build();
        Self {
            base: api_base_url(backend_url),
            agent: ureq::Agent::new_with_config(config),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.base, path)
    }

    fn get_json<T: DeserializeOwned>(&self, path: &str) -> Result<T, TransportError> {
        let url = self.endpoint(path);
        tracing::debug!(%url, "GET");
        let response = self.agent.get(url.as_str()).call()?;
        response
            .into_body()
            .read_json::<T>()
            .map_err(|err| TransportError::Malformed(err.to_string()))
    }

    fn post_json<B: Serialize, T: DeserializeOwned>(
        &self,
        path: &str,
        body: &B,
    ) -> Result<T, TransportError> {
        let url = self.endpoint(path);
        tracing::debug!(%url, "POST");
        let response = self.agent.post(url.as_str()).send_json(body)?;
        response
            .into_body()
            .read_json::<T>()
            .map_err(|err| TransportError::Malformed(err.to_string()))
    }
}

impl RemoteService for HttpService {
    fn describe(&self) -> String {
        self.base.clone()
    }

    fn list_scripts(&self) -> Result<Vec<ScriptDescriptor>, TransportError> {
        let response: ScriptListResponse = self.get_json("scripts")?;
        Ok(response.scripts.into_iter().map(Into::into).collect())
    }

    fn execute_script(&self, request: &ExecuteRequest) -> Result<ExecuteResponse, TransportError> {
        self.post_json("execute", request)
    }

    fn execute_command(
        &self,
        request: &CommandRequest,
    ) -> Result<ExecuteResponse, TransportError> {
        self.post_json("execute-command", request)
    }

    fn health(&self) -> Result<HealthReport, TransportError> {
        self.get_json("health")
    }
}

/// In-process stand-in for the backend: a fixed catalog and canned,
/// deterministic outputs.
#[derive(Debug, Clone)]
pub struct SimulatedService {
    scripts: Vec<ScriptDescriptor>,
    latency: Duration,
}

impl Default for SimulatedService {
    fn default() -> Self {
        Self {
            scripts: simulated_catalog(),
            latency: Duration::ZERO,
        }
    }
}

impl SimulatedService {
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    fn pause(&self) {
        if !self.latency.is_zero() {
            thread::sleep(self.latency);
        }
    }
}

impl RemoteService for SimulatedService {
    fn describe(&self) -> String {
        "simulated backend".to_string()
    }

    fn list_scripts(&self) -> Result<Vec<ScriptDescriptor>, TransportError> {
        self.pause();
        Ok(self.scripts.clone())
    }

    fn execute_script(&self, request: &ExecuteRequest) -> Result<ExecuteResponse, TransportError> {
        self.pause();
        let Some(output) = simulated_script_output(&request.script_name, &request.parameters)
        else {
            return Ok(ExecuteResponse {
                success: false,
                output: String::new(),
                error: Some(format!("Script not found: {}", request.script_name)),
                execution_time: Some(0.0),
            });
        };
        Ok(ExecuteResponse {
            success: true,
            output,
            error: None,
            execution_time: Some(0.42),
        })
    }

    fn execute_command(
        &self,
        request: &CommandRequest,
    ) -> Result<ExecuteResponse, TransportError> {
        self.pause();
        Ok(simulated_command(request.command.trim()))
    }

    fn health(&self) -> Result<HealthReport, TransportError> {
        Ok(HealthReport {
            status: "ok".to_string(),
            service: "PSWeb API (simulated)".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
            database: "not configured".to_string(),
        })
    }
}

fn simulated_param(
    name: &str,
    kind: ParameterKind,
    mandatory: bool,
    default_value: Option<&str>,
    description: &str,
) -> ParameterDescriptor {
    ParameterDescriptor {
        name: name.to_string(),
        kind,
        mandatory,
        default_value: default_value.map(str::to_string),
        description: description.to_string(),
    }
}

fn simulated_script(
    id: &str,
    name: &str,
    description: &str,
    parameters: Vec<ParameterDescriptor>,
) -> ScriptDescriptor {
    ScriptDescriptor {
        id: id.to_string(),
        name: name.to_string(),
        description: description.to_string(),
        parameters,
    }
}

pub fn simulated_catalog() -> Vec<ScriptDescriptor> {
    use ParameterKind::*;
    vec![
        simulated_script(
            "1",
            "Get-SystemInfo.ps1",
            "Retrieves detailed system information",
            vec![
                simulated_param("ComputerName", Text, false, Some("localhost"), "Target computer name"),
                simulated_param("IncludeDisk", Flag, false, None, "Include disk information"),
            ],
        ),
        simulated_script(
            "2",
            "Get-FileList.ps1",
            "Lists files in a directory with filters",
            vec![
                simulated_param("Path", Text, true, None, "Directory path to scan"),
                simulated_param("Filter", Text, false, Some("*.*"), "File filter pattern"),
                simulated_param("Recurse", Flag, false, None, "Search subdirectories"),
            ],
        ),
        simulated_script(
            "3",
            "Test-NetworkConnection.ps1",
            "Tests network connectivity to hosts",
            vec![
                simulated_param("HostName", Text, true, None, "Target hostname or IP"),
                simulated_param("Port", Integer, false, Some("80"), "Target port number"),
                simulated_param("Timeout", Integer, false, Some("5000"), "Timeout in milliseconds"),
            ],
        ),
        simulated_script(
            "4",
            "Export-UserReport.ps1",
            "Generates user activity report",
            vec![
                simulated_param("UserName", Text, true, None, "Username to report on"),
                simulated_param("Days", Integer, false, Some("30"), "Number of days to analyze"),
                simulated_param("Format", Text, false, Some("HTML"), "Output format (HTML/CSV/JSON)"),
            ],
        ),
        simulated_script(
            "5",
            "Clear-TempFiles.ps1",
            "Cleans temporary files from system",
            vec![
                simulated_param("OlderThanDays", Integer, false, Some("7"), "Delete files older than N days"),
                simulated_param("WhatIf", Flag, false, None, "Preview without deleting"),
            ],
        ),
    ]
}

fn text_or(params: &ParameterValues, name: &str, fallback: &str) -> String {
    params
        .get(name)
        .map(|value| value.as_input_text())
        .filter(|text| !text.is_empty())
        .unwrap_or_else(|| fallback.to_string())
}

fn flag(params: &ParameterValues, name: &str) -> bool {
    params.get(name).is_some_and(|value| value.is_enabled())
}

fn banner(title: &str) -> String {
    let rule = "=".repeat(64);
    format!("{rule}\n{title:^64}\n{rule}\n")
}

fn simulated_script_output(script_name: &str, params: &ParameterValues) -> Option<String> {
    let output = match script_name {
        "Get-SystemInfo.ps1" => {
            let mut out = banner("SYSTEM INFORMATION REPORT");
            out.push_str(&format!(
                "\nComputer Name    : {}\nOS Version       : Microsoft Windows 11 Pro\n\
                 Processor        : Intel(R) Core(TM) i7-11800H @ 2.30GHz\n\
                 Total Memory     : 16.0 GB\nAvailable Memory : 8.4 GB\n",
                text_or(params, "ComputerName", "localhost")
            ));
            if flag(params, "IncludeDisk") {
                out.push_str(
                    "\n[DISK INFORMATION]\nDrive C: - Total: 512 GB | Free: 145 GB | Used: 72%\n",
                );
            }
            out.push_str("\n[SUCCESS] System information retrieved successfully.\n");
            out
        }
        "Get-FileList.ps1" => {
            let mut out = banner("FILE LIST REPORT");
            out.push_str(&format!(
                "\nScanning Path: {}\nFilter: {}\nRecursive: {}\n\n\
                 document.txt        2.5 KB   2024-01-15 10:30\n\
                 report.pdf          1.2 MB   2024-01-14 15:22\n\
                 data.xlsx           856 KB   2024-01-12 14:45\n\n\
                 Total Files: 3\n\n[SUCCESS] File listing completed.\n",
                text_or(params, "Path", ""),
                text_or(params, "Filter", "*.*"),
                if flag(params, "Recurse") { "YES" } else { "NO" }
            ));
            out
        }
        "Test-NetworkConnection.ps1" => {
            let port = text_or(params, "Port", "80");
            let mut out = banner("NETWORK CONNECTION TEST");
            out.push_str(&format!(
                "\nTarget Host: {}\nPort: {port}\nTimeout: {}ms\n\n\
                 [OK] Resolved to: 172.217.164.46\n[OK] Port {port} is open\n\
                 Average response: 44.67ms\n\nCONNECTION STATUS: SUCCESSFUL\n",
                text_or(params, "HostName", ""),
                text_or(params, "Timeout", "5000"),
            ));
            out
        }
        "Export-UserReport.ps1" => {
            let user = text_or(params, "UserName", "");
            let format = text_or(params, "Format", "HTML");
            let mut out = banner("USER ACTIVITY REPORT");
            out.push_str(&format!(
                "\nUser: {user}\nPeriod: Last {} days\nFormat: {format}\n\n\
                 [OK] Found 87 login events\n\
                 [OK] Report created: C:\\Reports\\{user}_Report.{}\n\n\
                 [SUCCESS] User report exported successfully.\n",
                text_or(params, "Days", "30"),
                format.to_lowercase(),
            ));
            out
        }
        "Clear-TempFiles.ps1" => {
            let preview = flag(params, "WhatIf");
            let mut out = banner("TEMP FILES CLEANUP");
            out.push_str(&format!(
                "\nCriteria: Files older than {} days\nMode: {}\n\n[FOUND] 4,779 files (8.1 GB)\n",
                text_or(params, "OlderThanDays", "7"),
                if preview { "PREVIEW (WhatIf)" } else { "EXECUTE" }
            ));
            if preview {
                out.push_str("\nPREVIEW MODE - No files were deleted\nWould free: 8.1 GB\n");
            } else {
                out.push_str("\nDeleted: 4,779 files\nFreed: 8.1 GB\n");
            }
            out.push_str("\n[SUCCESS] Cleanup operation completed.\n");
            out
        }
        _ => return None,
    };
    Some(output)
}

fn simulated_command(command: &str) -> ExecuteResponse {
    let reply = |output: String| ExecuteResponse {
        success: true,
        output,
        error: None,
        execution_time: Some(0.05),
    };
    let verb = command.split_whitespace().next().unwrap_or_default();
    let rest = command[verb.len()..].trim();
    match verb.to_ascii_lowercase().as_str() {
        "" => ExecuteResponse {
            success: false,
            output: String::new(),
            error: Some("Command cannot be empty".to_string()),
            execution_time: Some(0.0),
        },
        "get-date" => reply("Monday, January 15, 2024 10:30:00 AM\n".to_string()),
        "hostname" => reply("PSDECK-SIM\n".to_string()),
        "get-location" | "pwd" => reply("\nPath\n----\nC:\\Users\\operator\n".to_string()),
        "write-output" | "echo" => reply(format!("{}\n", rest.trim_matches(['"', '\'']))),
        "throw" => ExecuteResponse {
            success: false,
            output: format!("Exception: {}\n", rest.trim_matches(['"', '\''])),
            error: Some("Command exited with code 1".to_string()),
            execution_time: Some(0.05),
        },
        _ => ExecuteResponse {
            success: false,
            output: format!(
                "{verb}: The term '{verb}' is not recognized as a name of a cmdlet, function, script file, or executable program.\n"
            ),
            error: Some("Command exited with code 1".to_string()),
            execution_time: Some(0.05),
        },
    }
}
