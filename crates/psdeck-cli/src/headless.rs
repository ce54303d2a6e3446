use std::process::ExitCode;

use anyhow::bail;
use psdeck_core::actions::RuntimeAction;
use psdeck_core::actions::SessionAction;
use psdeck_core::actions::UserAction;
use psdeck_core::catalog::CatalogStatus;
use psdeck_core::catalog::ScriptDescriptor;
use psdeck_core::params::coerce_input;
use psdeck_core::params::validate;
use psdeck_core::params::ParameterValue;
use psdeck_core::state::Screen;

use crate::runtime::Runtime;

fn user(runtime: &mut Runtime, action: UserAction) {
    runtime.apply(SessionAction::User(action));
}

fn load_catalog(runtime: &mut Runtime) -> anyhow::Result<()> {
    runtime.apply(SessionAction::Runtime(RuntimeAction::SessionStarted));
    runtime.wait_until(|state| state.catalog.status != CatalogStatus::Loading)?;
    if let CatalogStatus::Unavailable(err) = &runtime.state.catalog.status {
        bail!("{err}");
    }
    Ok(())
}

/// Accepts the catalog name, the name without `.ps1`, or the script id.
pub fn find_script(scripts: &[ScriptDescriptor], wanted: &str) -> Option<usize> {
    scripts.iter().position(|script| {
        script.id == wanted
            || script.name.eq_ignore_ascii_case(wanted)
            || script
                .name
                .strip_suffix(".ps1")
                .is_some_and(|stem| stem.eq_ignore_ascii_case(wanted))
    })
}

/// Splits `NAME=VALUE`; a bare `NAME` means an enabled switch.
pub fn parse_assignment(raw: &str) -> Result<(String, String), String> {
    let (name, value) = raw.split_once('=').unwrap_or((raw, "true"));
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("expected NAME=VALUE, got `{raw}`"));
    }
    Ok((name.to_string(), value.to_string()))
}

pub fn list_scripts(runtime: &mut Runtime) -> anyhow::Result<ExitCode> {
    load_catalog(runtime)?;
    let scripts = &runtime.state.catalog.scripts;
    if scripts.is_empty() {
        println!("No PowerShell scripts found");
        return Ok(ExitCode::SUCCESS);
    }
    for script in scripts.iter() {
        println!("{}  {}", script.name, script.description);
        for param in &script.parameters {
            let mut line = format!("    -{} <{}>", param.name, param.kind.wire_tag());
            if param.mandatory {
                line.push_str(" (required)");
            }
            if let Some(default) = &param.default_value {
                line.push_str(&format!(" [default: {default}]"));
            }
            if !param.description.is_empty() {
                line.push_str(&format!("  {}", param.description));
            }
            println!("{line}");
        }
    }
    Ok(ExitCode::SUCCESS)
}

pub fn run_script(
    runtime: &mut Runtime,
    script: &str,
    assignments: &[(String, String)],
) -> anyhow::Result<ExitCode> {
    load_catalog(runtime)?;
    let Some(index) = find_script(&runtime.state.catalog.scripts, script) else {
        bail!("no script named `{script}` in the catalog");
    };
    user(runtime, UserAction::SelectScript(index));
    let Some(selected) = runtime.state.selected_script().cloned() else {
        bail!("could not select `{script}`");
    };

    for (name, raw) in assignments {
        let value = match selected.parameter(name) {
            Some(param) => coerce_input(param.kind, raw),
            None => Some(ParameterValue::Text(raw.clone())),
        };
        user(
            runtime,
            UserAction::SetParameter {
                name: name.clone(),
                value,
            },
        );
    }

    let issues = validate(&selected, &runtime.state.params.snapshot());
    if !issues.is_empty() {
        for issue in &issues {
            eprintln!("psdeck: {issue}");
        }
        return Ok(ExitCode::from(2));
    }

    tracing::info!(script = %selected.name, "running script");
    user(runtime, UserAction::Execute);
    runtime.wait_until(|state| state.screen != Screen::Executing)?;
    let Some(results) = runtime.state.results.as_ref() else {
        bail!("script run ended without an outcome");
    };
    println!("{}", results.outcome.render_script());
    if let Some(duration) = results.outcome.duration_label() {
        println!("{duration}");
    }
    Ok(if results.outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

pub fn exec_command(runtime: &mut Runtime, command: &str) -> anyhow::Result<ExitCode> {
    if command.trim().is_empty() {
        bail!("command is empty");
    }
    user(runtime, UserAction::OpenTerminal);
    user(runtime, UserAction::CommandPaste(command.to_string()));
    user(runtime, UserAction::SubmitCommand);
    runtime.wait_until(|state| !state.terminal_busy())?;

    let Some(outcome) = runtime
        .state
        .terminal
        .ledger
        .entries()
        .last()
        .and_then(|entry| entry.outcome.as_ref())
    else {
        bail!("command finished without an outcome");
    };
    println!("{}", outcome.render_command());
    if let Some(duration) = outcome.duration_label() {
        println!("{duration}");
    }
    Ok(if outcome.success {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

pub fn health(runtime: &Runtime) -> anyhow::Result<ExitCode> {
    let service = runtime.dispatcher().service();
    let report = service.health()?;
    println!("service:   {}", report.service);
    println!("status:    {}", report.status);
    println!("database:  {}", report.database);
    println!("timestamp: {}", report.timestamp);
    println!("endpoint:  {}", service.describe());
    Ok(if report.is_ok() {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use pretty_assertions::assert_eq;

    use super::*;
    use psdeck_core::state::SessionSettings;
    use psdeck_core::state::SessionState;
    use psdeck_exec::simulated_catalog;
    use psdeck_exec::Dispatcher;
    use psdeck_exec::SimulatedService;

    fn runtime() -> Runtime {
        Runtime::new(
            SessionState::new(SessionSettings::default()),
            Dispatcher::new(Arc::new(SimulatedService::default())),
        )
    }

    #[test]
    fn scripts_are_found_by_name_stem_or_id() {
        let catalog = simulated_catalog();
        assert_eq!(find_script(&catalog, "Get-FileList.ps1"), Some(1));
        assert_eq!(find_script(&catalog, "get-filelist"), Some(1));
        assert_eq!(find_script(&catalog, "5"), Some(4));
        assert_eq!(find_script(&catalog, "Remove-Item"), None);
    }

    #[test]
    fn assignments_default_to_enabled_switch() {
        assert_eq!(
            parse_assignment("Path=C:\\Temp=old"),
            Ok(("Path".to_string(), "C:\\Temp=old".to_string()))
        );
        assert_eq!(
            parse_assignment("Recurse"),
            Ok(("Recurse".to_string(), "true".to_string()))
        );
        assert!(parse_assignment("=x").is_err());
    }

    #[test]
    fn run_reaches_results_with_coerced_parameters() {
        let mut runtime = runtime();
        let code = run_script(
            &mut runtime,
            "Test-NetworkConnection",
            &[
                ("HostName".to_string(), "srv01".to_string()),
                ("Port".to_string(), "443".to_string()),
            ],
        )
        .expect("run");

        assert_eq!(code, ExitCode::SUCCESS);
        assert_eq!(runtime.state.screen, Screen::Results);
        let output = &runtime.state.results.as_ref().expect("results").outcome.output;
        assert!(output.contains("Port: 443"));
    }

    #[test]
    fn run_stops_before_execute_when_mandatory_value_missing() {
        let mut runtime = runtime();
        let code = run_script(&mut runtime, "Get-FileList", &[]).expect("validation");

        assert_eq!(code, ExitCode::from(2));
        assert_eq!(runtime.state.screen, Screen::ScriptDetail);
        assert!(runtime.state.results.is_none());
    }
}
