use super::params::ParameterValues;

/// Execution lane. Script runs and terminal commands never share a lane.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Script,
    Terminal,
}

impl Slot {
    pub fn label(self) -> &'static str {
        match self {
            Self::Script => "script",
            Self::Terminal => "terminal",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RunRequest {
    Script {
        script_name: String,
        parameters: ParameterValues,
    },
    Command {
        text: String,
    },
}

impl RunRequest {
    pub fn slot(&self) -> Slot {
        match self {
            Self::Script { .. } => Slot::Script,
            Self::Command { .. } => Slot::Terminal,
        }
    }

    pub fn summary(&self) -> &str {
        match self {
            Self::Script { script_name, .. } => script_name,
            Self::Command { text } => text,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// The service ran the request and reported that it failed.
    Remote,
    /// The service could not be reached or answered with something unusable.
    Transport,
}

impl FailureKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Remote => "remote",
            Self::Transport => "transport",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFailure {
    pub kind: FailureKind,
    /// The service's own `error` text for remote failures, as received.
    pub message: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RunOutcome {
    pub success: bool,
    pub output: String,
    pub error: Option<RunFailure>,
    pub duration_seconds: Option<f64>,
}

const UNKNOWN_REMOTE_ERROR: &str = "Unknown error";

impl RunOutcome {
    pub fn succeeded(output: impl Into<String>, duration_seconds: Option<f64>) -> Self {
        Self {
            success: true,
            output: output.into(),
            error: None,
            duration_seconds,
        }
    }

    pub fn remote_failure(
        output: impl Into<String>,
        error: Option<String>,
        duration_seconds: Option<f64>,
    ) -> Self {
        Self {
            success: false,
            output: output.into(),
            error: Some(RunFailure {
                kind: FailureKind::Remote,
                message: error,
            }),
            duration_seconds,
        }
    }

    pub fn transport_failure(message: impl Into<String>) -> Self {
        Self {
            success: false,
            output: String::new(),
            error: Some(RunFailure {
                kind: FailureKind::Transport,
                message: Some(message.into()),
            }),
            duration_seconds: None,
        }
    }

    pub fn failure_kind(&self) -> Option<FailureKind> {
        self.error.as_ref().map(|failure| failure.kind)
    }

    pub fn is_transport_failure(&self) -> bool {
        self.failure_kind() == Some(FailureKind::Transport)
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error
            .as_ref()
            .and_then(|failure| failure.message.as_deref())
    }

    /// Text for the results screen after a script run.
    pub fn render_script(&self) -> String {
        match &self.error {
            None => self.output.clone(),
            Some(RunFailure {
                kind: FailureKind::Remote,
                message,
            }) => {
                let message = message
                    .as_deref()
                    .filter(|message| !message.trim().is_empty())
                    .unwrap_or(UNKNOWN_REMOTE_ERROR);
                format!(
                    "[ERROR] Script execution failed\n\n{message}\n\n{}",
                    self.output
                )
            }
            Some(RunFailure {
                kind: FailureKind::Transport,
                message,
            }) => format!(
                "[ERROR] Failed to execute script\n\n{}",
                message.as_deref().unwrap_or_default()
            ),
        }
    }

    /// Text for a terminal history entry.
    pub fn render_command(&self) -> String {
        match &self.error {
            None => self.output.clone(),
            Some(RunFailure {
                kind: FailureKind::Remote,
                message,
            }) => match message.as_deref().filter(|message| !message.trim().is_empty()) {
                None => self.output.clone(),
                Some(message) if self.output.trim().is_empty() => format!("[ERROR] {message}"),
                Some(message) => format!("{}\n[ERROR] {message}", self.output.trim_end()),
            },
            Some(RunFailure {
                kind: FailureKind::Transport,
                message,
            }) => format!(
                "[ERROR] Failed to execute command\n\n{}",
                message.as_deref().unwrap_or_default()
            ),
        }
    }

    pub fn duration_label(&self) -> Option<String> {
        self.duration_seconds
            .map(|seconds| format!("[Executed in {seconds}s]"))
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn remote_and_transport_failures_render_differently() {
        let remote = RunOutcome::remote_failure("partial", Some("exit code 1".to_string()), None);
        let transport = RunOutcome::transport_failure("connection refused");

        assert_eq!(
            remote.render_script(),
            "[ERROR] Script execution failed\n\nexit code 1\n\npartial"
        );
        assert_eq!(
            transport.render_script(),
            "[ERROR] Failed to execute script\n\nconnection refused"
        );
        assert!(!remote.is_transport_failure());
        assert!(transport.is_transport_failure());
    }

    #[test]
    fn missing_remote_error_is_kept_absent_and_filled_in_when_rendered() {
        let outcome = RunOutcome::remote_failure("partial", None, Some(0.2));
        assert_eq!(outcome.error_message(), None);
        assert_eq!(outcome.failure_kind(), Some(FailureKind::Remote));
        assert_eq!(
            outcome.render_script(),
            "[ERROR] Script execution failed\n\nUnknown error\n\npartial"
        );
        assert_eq!(outcome.render_command(), "partial");
        assert_eq!(outcome.duration_label().as_deref(), Some("[Executed in 0.2s]"));
    }

    #[test]
    fn remote_error_text_is_stored_as_received() {
        let outcome = RunOutcome::remote_failure("", Some(String::new()), None);
        assert_eq!(outcome.error_message(), Some(""));
        assert!(outcome.render_script().contains("Unknown error"));
    }

    #[test]
    fn request_kind_selects_slot() {
        let script = RunRequest::Script {
            script_name: "Get-SystemInfo.ps1".to_string(),
            parameters: ParameterValues::new(),
        };
        let command = RunRequest::Command {
            text: "Get-Date".to_string(),
        };
        assert_eq!(script.slot(), Slot::Script);
        assert_eq!(command.slot(), Slot::Terminal);
        assert_eq!(command.summary(), "Get-Date");
    }
}
