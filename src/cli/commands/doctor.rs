//! Doctor command - verify credentials and configuration.

use crate::cli::preflight::{check_credential, check_output_dir, required_credentials};
use crate::cli::Output;
use crate::config::Settings;
use console::style;

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
    Output::header("studyforge Doctor");
    println!();
    println!("Checking credentials and configuration...\n");

    let mut checks = Vec::new();

    println!("{}", style("Credentials").bold());
    for name in required_credentials(settings) {
        let check = credential_check(&name);
        check.print();
        checks.push(check);
    }

    println!();

    println!("{}", style("Providers").bold());
    let provider_checks = check_stage_providers(settings);
    for check in &provider_checks {
        check.print();
    }
    checks.extend(provider_checks);

    println!();

    println!("{}", style("Output").bold());
    let output_check = output_dir_check(settings);
    output_check.print();
    checks.push(output_check);

    let config_check = check_config_file();
    config_check.print();
    checks.push(config_check);

    println!();

    let errors = checks.iter().filter(|c| c.status == CheckStatus::Error).count();
    let warnings = checks.iter().filter(|c| c.status == CheckStatus::Warning).count();

    if errors > 0 {
        Output::error(&format!(
            "{} error(s) found. Requests will fail until they are fixed.",
            errors
        ));
        anyhow::bail!("doctor found {} error(s)", errors);
    } else if warnings > 0 {
        Output::warning(&format!("All checks passed with {} warning(s).", warnings));
    } else {
        Output::success("All checks passed! studyforge is ready to use.");
    }

    Ok(())
}

fn credential_check(name: &str) -> CheckResult {
    match check_credential(name) {
        Ok(()) => CheckResult::ok(name, "set"),
        Err(_) => CheckResult::error(
            name,
            "not set",
            &format!("Set it with: export {}='...' (or add it to .env)", name),
        ),
    }
}

/// Every stage must name a configured provider.
fn check_stage_providers(settings: &Settings) -> Vec<CheckResult> {
    let stages = &settings.pipeline.stages;
    [
        ("search", &stages.search),
        ("scrape", &stages.scrape),
        ("synthesize", &stages.synthesize),
        ("format", &stages.format),
    ]
    .into_iter()
    .map(|(stage, provider)| match settings.providers.get(provider) {
        Ok(config) => CheckResult::ok(stage, &format!("{} ({})", provider, config.model)),
        Err(e) => CheckResult::error(stage, &e.to_string(), "Add it under [providers] in the config"),
    })
    .collect()
}

fn output_dir_check(settings: &Settings) -> CheckResult {
    let dir = settings.output_dir();
    match check_output_dir(&dir) {
        Ok(()) => CheckResult::ok("Output directory", &format!("{} (writable)", dir.display())),
        Err(e) => CheckResult::error(
            "Output directory",
            &e.to_string(),
            "Create it or change general.output_dir",
        ),
    }
}

/// Check if config file exists.
fn check_config_file() -> CheckResult {
    let config_path = Settings::default_config_path();
    if config_path.exists() {
        CheckResult::ok("Config file", &format!("{}", config_path.display()))
    } else {
        CheckResult::warning(
            "Config file",
            "using defaults",
            &format!("Create {} to override defaults", config_path.display()),
        )
    }
}
