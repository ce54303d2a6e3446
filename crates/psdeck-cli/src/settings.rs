use std::env;
use std::fs;
use std::path::Path;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use psdeck_core::config::BackendConfig;
use psdeck_core::config::Config;
use psdeck_exec::HttpService;
use psdeck_exec::RemoteService;
use psdeck_exec::SimulatedService;

pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("psdeck").join("config.toml"))
}

pub fn log_dir() -> PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(env::temp_dir)
        .join("psdeck")
}

/// An explicit path must exist; the default location is optional.
pub fn load_config(explicit: Option<&Path>) -> anyhow::Result<Config> {
    if let Some(path) = explicit {
        return read_config(path);
    }
    match default_config_path() {
        Some(path) if path.is_file() => read_config(&path),
        _ => Ok(Config::default()),
    }
}

pub fn read_config(path: &Path) -> anyhow::Result<Config> {
    let raw = fs::read_to_string(path)
        .with_context(|| format!("reading config file {}", path.display()))?;
    toml::from_str(&raw).with_context(|| format!("parsing config file {}", path.display()))
}

/// Values from the command line (and `PSDECK_BACKEND_URL`, which clap folds
/// into `backend_url`). Unset fields keep the file's value.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub backend_url: Option<String>,
    pub timeout_secs: Option<u64>,
    pub simulated: bool,
    pub retain_history: bool,
}

impl Overrides {
    pub fn apply(&self, config: &mut Config) {
        if let Some(url) = &self.backend_url {
            config.backend.url = url.clone();
        }
        if let Some(timeout) = self.timeout_secs {
            config.backend.timeout_secs = timeout;
        }
        if self.simulated {
            config.backend.simulated = true;
        }
        if self.retain_history {
            config.terminal.retain_history = true;
        }
    }
}

/// `interactive` adds a short artificial delay to the simulated backend so
/// the executing screen is visible.
pub fn build_service(backend: &BackendConfig, interactive: bool) -> Arc<dyn RemoteService> {
    if backend.simulated {
        let latency = if interactive {
            Duration::from_millis(400)
        } else {
            Duration::ZERO
        };
        tracing::info!("using simulated backend");
        return Arc::new(SimulatedService::default().with_latency(latency));
    }
    let timeout = (backend.timeout_secs > 0).then(|| Duration::from_secs(backend.timeout_secs));
    let service = HttpService::new(&backend.url, timeout);
    tracing::info!(base = service.base_url(), ?timeout, "using HTTP backend");
    Arc::new(service)
}
