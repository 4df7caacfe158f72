//! E2E scenario harness entry point
//!
//! This file is the test binary that runs login scenarios from YAML specs.
//! Run with: cargo test --package authflow-e2e --test e2e
//!
//! Requires LOGIN_EMAIL, LOGIN_PASSWORD, LOGIN_MFA_KEY and STAGING_BASE_URL
//! in the environment, plus a local Playwright install.

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use authflow_e2e::browser::{Browser, BrowserConfig};
use authflow_e2e::config::{E2eConfig, RunnerConfig};
use authflow_e2e::runner::{ScenarioRunner, SuiteResult};
use authflow_e2e::E2eResult;

#[derive(Parser, Debug)]
#[command(name = "authflow-e2e")]
#[command(about = "Login.gov E2E scenario runner for the staging site")]
struct Args {
    /// Path to scenario specs directory
    #[arg(short, long, default_value = "scenarios")]
    specs: PathBuf,

    /// Run only scenarios matching this tag
    #[arg(short, long)]
    tag: Option<String>,

    /// Run only a specific scenario by name
    #[arg(short, long)]
    name: Option<String>,

    /// Browser to use (chromium, firefox, webkit)
    #[arg(long, default_value = "chromium")]
    browser: String,

    /// Run the browser headless
    #[arg(long, default_value = "true")]
    headless: bool,

    /// Viewport width
    #[arg(long, default_value = "1280")]
    viewport_width: u32,

    /// Viewport height
    #[arg(long, default_value = "720")]
    viewport_height: u32,

    /// Per-step wait bound in seconds
    #[arg(long, default_value = "30")]
    step_timeout_secs: u64,

    /// Skip the HTTP reachability preflight
    #[arg(long)]
    no_preflight: bool,

    /// Output directory for results
    #[arg(short, long, default_value = "test-results")]
    output: PathBuf,
}

fn main() {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse().unwrap()))
        .init();

    let args = Args::parse();

    // Run async main
    let rt = tokio::runtime::Runtime::new().expect("Failed to create tokio runtime");
    let result = rt.block_on(async_main(args));

    match result {
        Ok(success) => {
            if success {
                std::process::exit(0);
            } else {
                std::process::exit(1);
            }
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(2);
        }
    }
}

async fn async_main(args: Args) -> E2eResult<bool> {
    // Fail fast on missing environment before any browser work.
    let env = E2eConfig::from_env()?;

    let browser = match args.browser.as_str() {
        "firefox" => Browser::Firefox,
        "webkit" => Browser::Webkit,
        _ => Browser::Chromium,
    };

    let config = RunnerConfig {
        browser: BrowserConfig {
            browser,
            headless: args.headless,
            viewport_width: args.viewport_width,
            viewport_height: args.viewport_height,
        },
        step_timeout: Duration::from_secs(args.step_timeout_secs),
        preflight: !args.no_preflight,
        specs_dir: args.specs,
        output_dir: args.output,
    };

    let runner = ScenarioRunner::new(env, config);

    let results = if let Some(name) = args.name {
        let result = runner.run_scenario_named(&name).await?;
        let duration_ms = result.duration_ms;
        SuiteResult::summarize(vec![result], duration_ms)
    } else if let Some(tag) = args.tag {
        runner.run_tagged(&tag).await?
    } else {
        runner.run_all().await?
    };

    runner.write_results(&results)?;

    Ok(results.failed == 0)
}
