//! Scenario runner orchestrating session lifecycle and step execution

use std::path::PathBuf;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, warn};

use crate::browser::PageSession;
use crate::config::{E2eConfig, RunnerConfig};
use crate::error::{E2eError, E2eResult};
use crate::login;
use crate::scenario::{ScenarioSpec, ScenarioStep};

/// How long the reachability preflight keeps polling the base URL
const PREFLIGHT_TIMEOUT: Duration = Duration::from_secs(30);

/// Outcome of one executed step
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StepReport {
    pub step: String,
    pub success: bool,
    pub duration_ms: u64,
    pub error: Option<String>,
}

/// Outcome of one scenario
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScenarioResult {
    pub name: String,
    pub success: bool,
    pub duration_ms: u64,
    pub steps: Vec<StepReport>,
    pub error: Option<String>,
}

/// Outcome of a whole run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SuiteResult {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub duration_ms: u64,
    pub finished_at: chrono::DateTime<chrono::Utc>,
    pub results: Vec<ScenarioResult>,
}

impl SuiteResult {
    /// Tally a set of scenario results into a suite summary.
    pub fn summarize(results: Vec<ScenarioResult>, duration_ms: u64) -> Self {
        let passed = results.iter().filter(|r| r.success).count();
        let failed = results.len() - passed;
        Self {
            total: results.len(),
            passed,
            failed,
            duration_ms,
            finished_at: chrono::Utc::now(),
            results,
        }
    }
}

/// Per-scenario state shared across step definitions.
///
/// Every scenario owns exactly one session; nothing is shared across
/// scenarios. Replaces the module-level browser handles the original
/// step definitions leaned on.
struct ScenarioWorld {
    session: PageSession,
}

/// Main scenario runner
pub struct ScenarioRunner {
    env: E2eConfig,
    config: RunnerConfig,
}

impl ScenarioRunner {
    pub fn new(env: E2eConfig, config: RunnerConfig) -> Self {
        Self { env, config }
    }

    /// Run all scenarios in the specs directory
    pub async fn run_all(&self) -> E2eResult<SuiteResult> {
        let specs = ScenarioSpec::load_all(&self.config.specs_dir)?;
        self.run_specs(&specs).await
    }

    /// Run scenarios matching a tag
    pub async fn run_tagged(&self, tag: &str) -> E2eResult<SuiteResult> {
        let specs = ScenarioSpec::load_all(&self.config.specs_dir)?;
        let filtered: Vec<ScenarioSpec> = specs
            .into_iter()
            .filter(|s| s.tags.contains(&tag.to_string()))
            .collect();
        self.run_specs(&filtered).await
    }

    /// Run a specific scenario by name
    pub async fn run_scenario_named(&self, name: &str) -> E2eResult<ScenarioResult> {
        let specs = ScenarioSpec::load_all(&self.config.specs_dir)?;
        let spec = specs
            .into_iter()
            .find(|s| s.name == name)
            .ok_or_else(|| E2eError::SpecParse(format!("Scenario not found: {name}")))?;

        if self.config.preflight {
            self.preflight().await?;
        }
        self.run_scenario(&spec).await
    }

    /// Run a list of scenarios sequentially
    pub async fn run_specs(&self, specs: &[ScenarioSpec]) -> E2eResult<SuiteResult> {
        let start = Instant::now();

        if self.config.preflight {
            self.preflight().await?;
        }

        info!("Running {} scenario(s)...", specs.len());

        let mut results = Vec::new();
        for spec in specs {
            match self.run_scenario(spec).await {
                Ok(result) => {
                    if result.success {
                        info!("✓ {} ({} ms)", result.name, result.duration_ms);
                    } else {
                        error!(
                            "✗ {} - {}",
                            result.name,
                            result.error.as_deref().unwrap_or("unknown error")
                        );
                    }
                    results.push(result);
                }
                Err(e) => {
                    error!("✗ {} - {}", spec.name, e);
                    results.push(ScenarioResult {
                        name: spec.name.clone(),
                        success: false,
                        duration_ms: 0,
                        steps: vec![],
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let suite = SuiteResult::summarize(results, start.elapsed().as_millis() as u64);

        info!("");
        info!(
            "Scenario results: {} passed, {} failed ({} ms)",
            suite.passed, suite.failed, suite.duration_ms
        );

        Ok(suite)
    }

    /// Run a single scenario: launch a fresh session, execute its steps,
    /// stop on the first failure, and always close the session.
    pub async fn run_scenario(&self, spec: &ScenarioSpec) -> E2eResult<ScenarioResult> {
        let start = Instant::now();
        debug!("Running scenario: {}", spec.name);

        let session = PageSession::launch(&self.config.browser).await?;
        let mut world = ScenarioWorld { session };

        let mut reports = Vec::new();
        let mut scenario_error: Option<String> = None;

        for step in &spec.steps {
            let step_start = Instant::now();
            let outcome = self.execute_step(&mut world, step).await;
            let duration_ms = step_start.elapsed().as_millis() as u64;

            match outcome {
                Ok(()) => reports.push(StepReport {
                    step: step.name().to_string(),
                    success: true,
                    duration_ms,
                    error: None,
                }),
                Err(e) => {
                    let failure = E2eError::StepFailed {
                        step: step.name().to_string(),
                        reason: e.to_string(),
                    };
                    reports.push(StepReport {
                        step: step.name().to_string(),
                        success: false,
                        duration_ms,
                        error: Some(e.to_string()),
                    });
                    scenario_error = Some(failure.to_string());
                    break; // Stop on first failure
                }
            }
        }

        // Scoped release: the browser never outlives its scenario.
        if let Err(e) = world.session.close().await {
            warn!("Session close failed: {}", e);
        }

        Ok(ScenarioResult {
            name: spec.name.clone(),
            success: scenario_error.is_none(),
            duration_ms: start.elapsed().as_millis() as u64,
            steps: reports,
            error: scenario_error,
        })
    }

    /// Dispatch a step definition against the scenario's session.
    async fn execute_step(&self, world: &mut ScenarioWorld, step: &ScenarioStep) -> E2eResult<()> {
        match step {
            ScenarioStep::NavigateToSite => {
                info!("Navigating to {}", self.env.base_url);
                world
                    .session
                    .goto(&self.env.base_url, self.config.step_timeout)
                    .await
            }
            ScenarioStep::EnsureLoggedIn => {
                login::complete_login(
                    &mut world.session,
                    &self.env.credentials,
                    self.config.step_timeout,
                )
                .await
            }
        }
    }

    /// Check the staging site answers HTTP at all before paying for a
    /// browser launch.
    async fn preflight(&self) -> E2eResult<()> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(5))
            .build()?;

        let start = Instant::now();
        let mut attempts = 0;

        while start.elapsed() < PREFLIGHT_TIMEOUT {
            attempts += 1;

            match client.get(&self.env.base_url).send().await {
                Ok(resp) if resp.status().is_success() || resp.status().is_redirection() => {
                    debug!("Preflight OK: {} -> {}", self.env.base_url, resp.status());
                    return Ok(());
                }
                Ok(resp) => {
                    warn!("Preflight returned {}", resp.status());
                }
                Err(e) => {
                    if attempts == 1 {
                        info!("Waiting for {} to answer...", self.env.base_url);
                    }
                    if !e.is_connect() && !e.is_timeout() {
                        warn!("Preflight error: {}", e);
                    }
                }
            }

            tokio::time::sleep(Duration::from_millis(500)).await;
        }

        Err(E2eError::Unreachable(format!(
            "{} after {} attempts",
            self.env.base_url, attempts
        )))
    }

    /// Write suite results to a JSON file in the output directory.
    pub fn write_results(&self, results: &SuiteResult) -> E2eResult<PathBuf> {
        std::fs::create_dir_all(&self.config.output_dir)?;

        let path = self.config.output_dir.join("test-results.json");
        let json = serde_json::to_string_pretty(results)?;
        std::fs::write(&path, json)?;

        info!("Results written to: {}", path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result(name: &str, success: bool) -> ScenarioResult {
        ScenarioResult {
            name: name.to_string(),
            success,
            duration_ms: 10,
            steps: vec![],
            error: if success {
                None
            } else {
                Some("Timed out after 30000 ms waiting for: text=Sign In".to_string())
            },
        }
    }

    #[test]
    fn summarize_tallies_pass_and_fail() {
        let suite = SuiteResult::summarize(
            vec![result("a", true), result("b", false), result("c", true)],
            42,
        );
        assert_eq!(suite.total, 3);
        assert_eq!(suite.passed, 2);
        assert_eq!(suite.failed, 1);
        assert_eq!(suite.duration_ms, 42);
    }

    #[test]
    fn suite_result_serializes_round_trip() {
        let suite = SuiteResult::summarize(vec![result("login-gov-mfa", false)], 7);
        let json = serde_json::to_string(&suite).unwrap();
        let back: SuiteResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back.failed, 1);
        assert_eq!(back.results[0].name, "login-gov-mfa");
        assert!(back.results[0]
            .error
            .as_deref()
            .unwrap()
            .contains("text=Sign In"));
    }
}
