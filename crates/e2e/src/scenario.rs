//! Declarative YAML scenario specifications
//!
//! A scenario names reusable step definitions executed in order against
//! one shared browser session. The step vocabulary mirrors the two
//! operations the login workflow decomposes into.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{E2eError, E2eResult};

/// A complete scenario parsed from YAML
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioSpec {
    /// Unique name for this scenario
    pub name: String,

    /// Human-readable description
    #[serde(default)]
    pub description: String,

    /// Tags for filtering scenarios
    #[serde(default)]
    pub tags: Vec<String>,

    /// Steps to execute in order
    pub steps: Vec<ScenarioStep>,
}

/// Reusable step definitions shared across scenarios
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", rename_all = "snake_case")]
pub enum ScenarioStep {
    /// Open the staging site's landing page
    NavigateToSite,

    /// Complete the Login.gov flow and verify the authenticated state
    EnsureLoggedIn,
}

impl ScenarioStep {
    pub fn name(&self) -> &'static str {
        match self {
            ScenarioStep::NavigateToSite => "navigate_to_site",
            ScenarioStep::EnsureLoggedIn => "ensure_logged_in",
        }
    }
}

impl ScenarioSpec {
    /// Parse a scenario from a YAML string
    pub fn from_yaml(yaml: &str) -> E2eResult<Self> {
        serde_yaml::from_str(yaml).map_err(E2eError::from)
    }

    /// Parse a scenario from a YAML file
    pub fn from_file(path: &Path) -> E2eResult<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Load all scenarios from a directory.
    ///
    /// An unreadable directory or one containing no specs is an error; a
    /// login gate must never pass by running nothing.
    pub fn load_all(dir: &Path) -> E2eResult<Vec<Self>> {
        let mut specs = Vec::new();

        for entry in walkdir::WalkDir::new(dir) {
            let entry = entry.map_err(|e| {
                E2eError::SpecParse(format!("cannot read specs dir {}: {e}", dir.display()))
            })?;
            let is_yaml = entry
                .path()
                .extension()
                .map(|ext| ext == "yaml" || ext == "yml")
                .unwrap_or(false);
            if !is_yaml {
                continue;
            }
            specs.push(Self::from_file(entry.path())?);
        }

        if specs.is_empty() {
            return Err(E2eError::SpecParse(format!(
                "no scenario specs found in {}",
                dir.display()
            )));
        }

        Ok(specs)
    }

    /// Filter scenarios by tag
    pub fn filter_by_tag<'a>(specs: &'a [Self], tag: &str) -> Vec<&'a Self> {
        specs
            .iter()
            .filter(|s| s.tags.contains(&tag.to_string()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_login_scenario() {
        let yaml = r#"
name: login-gov-mfa
description: Sign in through Login.gov with TOTP MFA
tags:
  - auth
  - smoke
steps:
  - step: navigate_to_site
  - step: ensure_logged_in
"#;
        let spec = ScenarioSpec::from_yaml(yaml).unwrap();
        assert_eq!(spec.name, "login-gov-mfa");
        assert_eq!(
            spec.steps,
            vec![ScenarioStep::NavigateToSite, ScenarioStep::EnsureLoggedIn]
        );
    }

    #[test]
    fn unknown_step_fails_to_parse() {
        let yaml = r#"
name: bad
steps:
  - step: reticulate_splines
"#;
        assert!(ScenarioSpec::from_yaml(yaml).is_err());
    }

    #[test]
    fn filters_by_tag() {
        let yaml_smoke = r#"
name: smoke-login
tags: [smoke]
steps:
  - step: navigate_to_site
"#;
        let yaml_other = r#"
name: full-login
tags: [auth]
steps:
  - step: navigate_to_site
  - step: ensure_logged_in
"#;
        let specs = vec![
            ScenarioSpec::from_yaml(yaml_smoke).unwrap(),
            ScenarioSpec::from_yaml(yaml_other).unwrap(),
        ];
        let smoke = ScenarioSpec::filter_by_tag(&specs, "smoke");
        assert_eq!(smoke.len(), 1);
        assert_eq!(smoke[0].name, "smoke-login");
    }

    #[test]
    fn missing_specs_dir_is_an_error() {
        let err = ScenarioSpec::load_all(Path::new("no/such/dir")).unwrap_err();
        assert!(matches!(err, E2eError::SpecParse(_)));
    }

    #[test]
    fn empty_specs_dir_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = ScenarioSpec::load_all(dir.path()).unwrap_err();
        assert!(err.to_string().contains("no scenario specs"));
    }

    #[test]
    fn loads_specs_from_directory() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("login.yaml"),
            "name: login-gov-mfa\nsteps:\n  - step: navigate_to_site\n",
        )
        .unwrap();

        let specs = ScenarioSpec::load_all(dir.path()).unwrap();
        assert_eq!(specs.len(), 1);
        assert_eq!(specs[0].name, "login-gov-mfa");
    }

    #[test]
    fn step_names_are_stable() {
        assert_eq!(ScenarioStep::NavigateToSite.name(), "navigate_to_site");
        assert_eq!(ScenarioStep::EnsureLoggedIn.name(), "ensure_logged_in");
    }
}
