//! Playwright sidecar browser automation
//!
//! Spawns one long-lived `node` process running a generated Playwright
//! driver script and drives it over newline-delimited JSON on stdin/stdout
//! (request `{id, cmd, ...}`, response `{id, ok, value?, error?, timeout?}`).
//! One sidecar owns one browser/context/page for the life of a scenario.

use std::process::{Command as StdCommand, Stdio};
use std::time::Duration;

use serde::Deserialize;
use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, ChildStdin, ChildStdout, Command};
use tracing::{debug, trace, warn};

use crate::error::{E2eError, E2eResult};

/// How long the sidecar may take to launch the browser and report ready
const LAUNCH_TIMEOUT: Duration = Duration::from_secs(60);

/// Slack added on top of a step's own bound for the protocol round trip
const PROTOCOL_GRACE: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Browser {
    #[default]
    Chromium,
    Firefox,
    Webkit,
}

impl Browser {
    fn as_str(&self) -> &'static str {
        match self {
            Browser::Chromium => "chromium",
            Browser::Firefox => "firefox",
            Browser::Webkit => "webkit",
        }
    }
}

/// Configuration for the browser sidecar
#[derive(Debug, Clone)]
pub struct BrowserConfig {
    pub browser: Browser,
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
}

impl Default for BrowserConfig {
    fn default() -> Self {
        Self {
            browser: Browser::Chromium,
            headless: true,
            viewport_width: 1280,
            viewport_height: 720,
        }
    }
}

/// One response line from the driver script
#[derive(Debug, Deserialize)]
struct DriverResponse {
    #[serde(default)]
    id: Option<u64>,
    #[serde(default)]
    ready: bool,
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    value: Option<String>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    timeout: bool,
}

/// Handle to one browser/context/page, shared across a scenario's steps.
///
/// Created once per scenario and closed explicitly at scenario end; the
/// spawned child is killed on drop if `close` was skipped.
pub struct PageSession {
    child: Child,
    stdin: ChildStdin,
    stdout: BufReader<ChildStdout>,
    next_id: u64,
    // Keeps the generated driver script alive for the child's lifetime.
    _script_dir: Option<tempfile::TempDir>,
}

impl PageSession {
    /// Launch the sidecar: write the driver script, spawn node, wait for
    /// the browser context to come up.
    pub async fn launch(config: &BrowserConfig) -> E2eResult<Self> {
        check_playwright_installed()?;

        let script_dir = tempfile::tempdir()?;
        let script_path = script_dir.path().join("driver.js");
        std::fs::write(&script_path, build_driver_script(config))?;

        debug!("Launching Playwright sidecar: {}", script_path.display());

        let mut cmd = Command::new("node");
        cmd.arg(&script_path);

        let session = Self::launch_command(cmd, Some(script_dir)).await?;
        debug!("Playwright sidecar ready ({})", config.browser.as_str());
        Ok(session)
    }

    /// Spawn a driver process speaking the sidecar protocol and wait for
    /// its ready greeting. Tests use this directly with scripted stand-ins
    /// for the generated Playwright script.
    pub(crate) async fn launch_command(
        mut cmd: Command,
        script_dir: Option<tempfile::TempDir>,
    ) -> E2eResult<Self> {
        let mut child = cmd
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| E2eError::Browser(format!("failed to spawn driver: {e}")))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| E2eError::Browser("sidecar stdin unavailable".to_string()))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| E2eError::Browser("sidecar stdout unavailable".to_string()))?;

        // Drain stderr for the life of the child. Left unread, a chatty
        // sidecar fills the pipe buffer and blocks mid-command.
        if let Some(stderr) = child.stderr.take() {
            tokio::spawn(async move {
                let mut lines = BufReader::new(stderr).lines();
                while let Ok(Some(line)) = lines.next_line().await {
                    trace!("sidecar stderr: {}", line);
                }
            });
        }

        let mut session = Self {
            child,
            stdin,
            stdout: BufReader::new(stdout),
            next_id: 0,
            _script_dir: script_dir,
        };

        let greeting = tokio::time::timeout(LAUNCH_TIMEOUT, session.read_response())
            .await
            .map_err(|_| E2eError::Browser("sidecar did not become ready".to_string()))??;
        if !greeting.ready {
            return Err(E2eError::Browser(format!(
                "unexpected sidecar greeting: {:?}",
                greeting
            )));
        }

        Ok(session)
    }

    /// Navigate the page to an absolute URL.
    pub async fn goto(&mut self, url: &str, timeout: Duration) -> E2eResult<()> {
        self.request(json!({ "cmd": "goto", "url": url }), None, timeout)
            .await?;
        Ok(())
    }

    /// Click the first element matching the selector once it is actionable.
    pub async fn click(&mut self, selector: &str, timeout: Duration) -> E2eResult<()> {
        self.request(
            json!({ "cmd": "click", "selector": selector }),
            Some(selector),
            timeout,
        )
        .await?;
        Ok(())
    }

    /// Fill an input field with a value.
    pub async fn fill(&mut self, selector: &str, value: &str, timeout: Duration) -> E2eResult<()> {
        self.request(
            json!({ "cmd": "fill", "selector": selector, "value": value }),
            Some(selector),
            timeout,
        )
        .await?;
        Ok(())
    }

    /// Block until the selector is visible, within the bound.
    pub async fn wait_for_visible(&mut self, selector: &str, timeout: Duration) -> E2eResult<()> {
        self.request(
            json!({ "cmd": "wait_for_visible", "selector": selector }),
            Some(selector),
            timeout,
        )
        .await?;
        Ok(())
    }

    /// Block until an element matching the selector contains the literal
    /// text and is visible.
    pub async fn wait_for_text_visible(
        &mut self,
        selector: &str,
        text: &str,
        timeout: Duration,
    ) -> E2eResult<()> {
        let combined = text_within(selector, text);
        self.wait_for_visible(&combined, timeout).await
    }

    /// Visible text content of the first element matching the selector.
    pub async fn inner_text(&mut self, selector: &str, timeout: Duration) -> E2eResult<String> {
        let resp = self
            .request(
                json!({ "cmd": "inner_text", "selector": selector }),
                Some(selector),
                timeout,
            )
            .await?;
        Ok(resp.value.unwrap_or_default())
    }

    /// Shut the sidecar down: ask it to close the browser, then wait for
    /// the child to exit.
    pub async fn close(mut self) -> E2eResult<()> {
        // Best effort: the child replies and then exits on its own.
        if let Err(e) = self
            .request(json!({ "cmd": "close" }), None, Duration::from_secs(10))
            .await
        {
            warn!("Sidecar close command failed: {}", e);
        }

        match tokio::time::timeout(Duration::from_secs(5), self.child.wait()).await {
            Ok(Ok(status)) => debug!("Playwright sidecar exited: {}", status),
            Ok(Err(e)) => warn!("Failed to reap sidecar: {}", e),
            Err(_) => {
                warn!("Sidecar did not exit in time; killing");
                let _ = self.child.kill().await;
            }
        }

        Ok(())
    }

    /// Send one command and wait for its id-matched response.
    async fn request(
        &mut self,
        mut cmd: serde_json::Value,
        selector: Option<&str>,
        timeout: Duration,
    ) -> E2eResult<DriverResponse> {
        self.next_id += 1;
        let id = self.next_id;
        let timeout_ms = timeout.as_millis() as u64;
        cmd["id"] = json!(id);
        cmd["timeout_ms"] = json!(timeout_ms);

        let line = serde_json::to_string(&cmd)?;
        trace!("driver command: {}", line);

        self.stdin.write_all(line.as_bytes()).await?;
        self.stdin.write_all(b"\n").await?;
        self.stdin.flush().await?;

        // One deadline for the whole exchange; stale replies must not
        // extend the step's bound.
        let deadline = tokio::time::Instant::now() + timeout + PROTOCOL_GRACE;
        let resp = loop {
            let resp = tokio::time::timeout_at(deadline, self.read_response())
                .await
                .map_err(|_| match selector {
                    Some(s) => E2eError::Timeout {
                        selector: s.to_string(),
                        timeout_ms,
                    },
                    None => E2eError::Browser("driver response timed out".to_string()),
                })??;

            // Skip stale responses from earlier commands.
            match resp.id {
                Some(resp_id) if resp_id != id => {
                    warn!("Ignoring stale driver response id {}", resp_id);
                }
                _ => break resp,
            }
        };

        if resp.ok {
            return Ok(resp);
        }
        Err(response_error(&resp, selector, timeout_ms))
    }

    /// Read the next parseable response line, skipping sidecar noise.
    async fn read_response(&mut self) -> E2eResult<DriverResponse> {
        loop {
            let mut line = String::new();
            let n = self.stdout.read_line(&mut line).await?;
            if n == 0 {
                return Err(E2eError::Browser(
                    "sidecar exited unexpectedly".to_string(),
                ));
            }

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }
            trace!("driver response: {}", trimmed);

            match serde_json::from_str::<DriverResponse>(trimmed) {
                Ok(resp) => return Ok(resp),
                Err(e) => warn!("Unparseable driver output ({}): {}", e, trimmed),
            }
        }
    }
}

/// Playwright chained selector matching `selector` elements that contain
/// the literal `text`.
pub fn text_within(selector: &str, text: &str) -> String {
    format!("{selector} >> text={text}")
}

/// Map a failed driver response to the error taxonomy. Playwright timeout
/// errors become [`E2eError::Timeout`] carrying the selector and bound.
fn response_error(resp: &DriverResponse, selector: Option<&str>, timeout_ms: u64) -> E2eError {
    if resp.timeout {
        if let Some(s) = selector {
            return E2eError::Timeout {
                selector: s.to_string(),
                timeout_ms,
            };
        }
    }
    E2eError::Browser(
        resp.error
            .clone()
            .unwrap_or_else(|| "driver reported failure".to_string()),
    )
}

/// Check if Playwright is installed
fn check_playwright_installed() -> E2eResult<()> {
    let output = StdCommand::new("npx")
        .args(["playwright", "--version"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status();

    match output {
        Ok(status) if status.success() => Ok(()),
        _ => Err(E2eError::PlaywrightNotFound),
    }
}

/// Generate the driver script the sidecar runs: launch one browser/context/
/// page, then serve line-delimited JSON commands until `close`.
fn build_driver_script(config: &BrowserConfig) -> String {
    format!(
        r#"const {{ chromium, firefox, webkit }} = require('playwright');
const readline = require('readline');

(async () => {{
  const browser = await {browser}.launch({{ headless: {headless} }});
  const context = await browser.newContext({{
    viewport: {{ width: {width}, height: {height} }}
  }});
  const page = await context.newPage();

  const reply = (msg) => process.stdout.write(JSON.stringify(msg) + '\n');
  const rl = readline.createInterface({{ input: process.stdin }});

  reply({{ ready: true }});

  for await (const line of rl) {{
    let req;
    try {{
      req = JSON.parse(line);
    }} catch (err) {{
      reply({{ id: null, ok: false, error: 'bad request: ' + err.message }});
      continue;
    }}
    try {{
      switch (req.cmd) {{
        case 'goto': {{
          await page.goto(req.url, {{ timeout: req.timeout_ms }});
          reply({{ id: req.id, ok: true }});
          break;
        }}
        case 'click': {{
          await page.click(req.selector, {{ timeout: req.timeout_ms }});
          reply({{ id: req.id, ok: true }});
          break;
        }}
        case 'fill': {{
          await page.fill(req.selector, req.value, {{ timeout: req.timeout_ms }});
          reply({{ id: req.id, ok: true }});
          break;
        }}
        case 'wait_for_visible': {{
          await page.waitForSelector(req.selector, {{ state: 'visible', timeout: req.timeout_ms }});
          reply({{ id: req.id, ok: true }});
          break;
        }}
        case 'inner_text': {{
          const text = await page.innerText(req.selector, {{ timeout: req.timeout_ms }});
          reply({{ id: req.id, ok: true, value: text }});
          break;
        }}
        case 'close': {{
          reply({{ id: req.id, ok: true }});
          await browser.close();
          process.exit(0);
        }}
        default:
          reply({{ id: req.id, ok: false, error: 'unknown command: ' + req.cmd }});
      }}
    }} catch (err) {{
      reply({{ id: req.id, ok: false, error: err.message, timeout: err.name === 'TimeoutError' }});
    }}
  }}

  await browser.close();
}})();
"#,
        browser = config.browser.as_str(),
        headless = config.headless,
        width = config.viewport_width,
        height = config.viewport_height,
    )
}
