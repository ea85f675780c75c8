//! Credential and environment checks.
//!
//! Nothing here runs automatically: missing credentials surface on first use.
//! The `doctor` command uses these checks to report problems up front.

use crate::config::Settings;
use crate::error::{Result, StudyError};
use std::path::Path;

/// Environment variables the configured pipeline will read, in stage order,
/// without duplicates.
pub fn required_credentials(settings: &Settings) -> Vec<String> {
    let stages = &settings.pipeline.stages;
    let mut names = Vec::new();

    for provider in [&stages.search, &stages.scrape, &stages.synthesize, &stages.format] {
        if let Ok(config) = settings.providers.get(provider) {
            if !names.contains(&config.api_key_env) {
                names.push(config.api_key_env.clone());
            }
        }
    }
    if !names.contains(&settings.search.api_key_env) {
        names.push(settings.search.api_key_env.clone());
    }
    names
}

/// Check that an environment variable is set and non-empty.
pub fn check_credential(name: &str) -> Result<()> {
    match std::env::var(name) {
        Ok(value) if !value.is_empty() => Ok(()),
        _ => Err(StudyError::MissingCredential(name.to_string())),
    }
}

/// Check that the output directory exists and accepts new files.
pub fn check_output_dir(dir: &Path) -> Result<()> {
    if !dir.is_dir() {
        return Err(StudyError::Config(format!(
            "Output directory {} does not exist",
            dir.display()
        )));
    }

    let probe = dir.join(".studyforge_write_probe");
    std::fs::write(&probe, b"")?;
    std::fs::remove_file(&probe)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_credentials() {
        let names = required_credentials(&Settings::default());
        assert_eq!(names, vec!["GEMINI_API_KEY", "SERPER_API_KEY"]);
    }

    #[test]
    fn test_credentials_follow_stage_providers() {
        let mut settings = Settings::default();
        settings.pipeline.stages.format = "groq".to_string();
        let names = required_credentials(&settings);
        assert_eq!(names, vec!["GEMINI_API_KEY", "GROQ_API_KEY", "SERPER_API_KEY"]);
    }

    #[test]
    fn test_unset_credential() {
        let err = check_credential("STUDYFORGE_TEST_UNSET_CREDENTIAL").unwrap_err();
        assert!(err.to_string().contains("STUDYFORGE_TEST_UNSET_CREDENTIAL"));
    }

    #[test]
    fn test_output_dir_checks() {
        let dir = tempfile::tempdir().unwrap();
        assert!(check_output_dir(dir.path()).is_ok());
        assert!(check_output_dir(&dir.path().join("missing")).is_err());
    }
}
