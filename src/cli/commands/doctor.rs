//! Doctor command - verify credentials and configuration.

use crate::cli::{mask_secret, Output};
use crate::config::Settings;
use console::style;
use std::time::Duration;

/// Check result for a single item.
#[derive(Debug)]
pub struct CheckResult {
    pub name: String,
    pub status: CheckStatus,
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, PartialEq)]
pub enum CheckStatus {
    Ok,
    Warning,
    Error,
}

impl CheckResult {
    fn ok(name: &str, message: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Ok,
            message: message.to_string(),
            hint: None,
        }
    }

    fn warning(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Warning,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn error(name: &str, message: &str, hint: &str) -> Self {
        Self {
            name: name.to_string(),
            status: CheckStatus::Error,
            message: message.to_string(),
            hint: Some(hint.to_string()),
        }
    }

    fn print(&self) {
        let icon = match self.status {
            CheckStatus::Ok => style("✓").green(),
            CheckStatus::Warning => style("!").yellow(),
            CheckStatus::Error => style("✗").red(),
        };

        println!("  {} {} - {}", icon, style(&self.name).bold(), self.message);

        if let Some(hint) = &self.hint {
            println!("    {} {}", style("→").dim(), style(hint).dim());
        }
    }
}

/// Run all diagnostic checks.
pub fn run_doctor(settings: &Settings) -> anyhow::Result<()> {
    Output::header("Vidu MCP Doctor");
    println!();

    let sections = [
        ("API Configuration", vec![check_api_key(settings), check_api_host(settings)]),
        ("Polling", vec![check_polling(settings)]),
        ("Configuration", vec![check_config_file()]),
    ];

    let mut errors = 0;
    let mut warnings = 0;
    for (title, checks) in &sections {
        println!("{}", style(title).bold());
        for check in checks {
            check.print();
            match check.status {
                CheckStatus::Error => errors += 1,
                CheckStatus::Warning => warnings += 1,
                CheckStatus::Ok => {}
            }
        }
        println!();
    }

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Please fix them before starting the server.",
            errors
        ));
        std::process::exit(1);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! The server is ready to use.");
    }

    Ok(())
}

fn check_api_key(settings: &Settings) -> CheckResult {
    match settings.api.api_key.as_deref().map(str::trim) {
        Some(key) if !key.is_empty() => {
            CheckResult::ok("VIDU_API_KEY", &format!("configured ({})", mask_secret(key)))
        }
        Some(_) => CheckResult::error(
            "VIDU_API_KEY",
            "empty",
            "Set with: export VIDU_API_KEY='...'",
        ),
        None => CheckResult::error(
            "VIDU_API_KEY",
            "not set",
            "Set with: export VIDU_API_KEY='...' or [api] api_key in the config file",
        ),
    }
}

fn check_api_host(settings: &Settings) -> CheckResult {
    let hint = "Set with: export VIDU_API_HOST='https://api.vidu.com'";
    let host = match settings.api.api_host.as_deref().map(str::trim) {
        Some(host) if !host.is_empty() => host,
        _ => return CheckResult::error("VIDU_API_HOST", "not set", hint),
    };

    match url::Url::parse(host) {
        Ok(url) if url.scheme() == "https" => CheckResult::ok("VIDU_API_HOST", host),
        Ok(url) if url.scheme() == "http" => CheckResult::warning(
            "VIDU_API_HOST",
            &format!("{} (plain http)", host),
            "The API key is sent with every request; prefer https",
        ),
        Ok(url) => CheckResult::error(
            "VIDU_API_HOST",
            &format!("unsupported scheme '{}'", url.scheme()),
            hint,
        ),
        Err(e) => CheckResult::error("VIDU_API_HOST", &format!("invalid URL: {}", e), hint),
    }
}

fn check_polling(settings: &Settings) -> CheckResult {
    let config = settings.poll_config();
    if config.max_attempts == 0 {
        return CheckResult::error(
            "Polling budget",
            "max_attempts is 0, every task would time out",
            "Set [polling] max_attempts to at least 1",
        );
    }

    let budget = config.interval * config.max_attempts.saturating_sub(1);
    let message = format!(
        "{} attempts every {}s (up to {})",
        config.max_attempts,
        config.interval.as_secs(),
        format_duration(budget)
    );

    if budget < Duration::from_secs(60) {
        CheckResult::warning(
            "Polling budget",
            &message,
            "Generation usually takes minutes; short budgets time out",
        )
    } else {
        CheckResult::ok("Polling budget", &message)
    }
}

fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults and environment",
            &format!("Optionally create {}", config_path.display()),
        )
    }
}

/// Format a duration as a human-readable string.
fn format_duration(duration: Duration) -> String {
    let total = duration.as_secs();
    let mins = total / 60;
    let secs = total % 60;

    if mins > 0 {
        format!("{}m {}s", mins, secs)
    } else {
        format!("{}s", secs)
    }
}
