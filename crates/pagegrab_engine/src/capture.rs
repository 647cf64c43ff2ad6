use std::path::{Path, PathBuf};
use std::time::Duration;

use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig, HeadlessMode};
use chromiumoxide::page::ScreenshotParams;
use chromiumoxide_cdp::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide_cdp::cdp::browser_protocol::page::CaptureScreenshotFormat;
use futures::StreamExt;
use pagegrab_core::BatchItem;
use tokio::task::JoinHandle;
use tokio::time::sleep;

use crate::batch::BatchAction;
use crate::persist::ensure_output_dir;
use crate::types::{ActionError, CaptureError, CaptureFailureKind};

/// Externally supplied capture prerequisites. Injected at construction,
/// never read from global state at call time.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    /// Automation driver executable configured by the host; validated
    /// alongside the browser even though the CDP client launches the
    /// browser itself.
    pub driver_path: PathBuf,
    pub browser_path: PathBuf,
    /// Fixed wait for dynamic content after navigation and after resize.
    pub settle_delay: Duration,
    pub viewport_width: u32,
}

impl CaptureConfig {
    pub fn new(driver_path: PathBuf, browser_path: PathBuf) -> Self {
        Self {
            driver_path,
            browser_path,
            settle_delay: Duration::from_secs(2),
            viewport_width: 1920,
        }
    }

    /// Both executables must be configured and exist on disk. Runs before
    /// any browser process is spawned.
    pub fn validate(&self) -> Result<(), CaptureError> {
        validate_executable(&self.driver_path, "automation driver")?;
        validate_executable(&self.browser_path, "browser")?;
        Ok(())
    }
}

fn validate_executable(path: &Path, role: &str) -> Result<(), CaptureError> {
    if path.as_os_str().is_empty() {
        return Err(CaptureError::new(
            CaptureFailureKind::ConfigInvalid,
            format!("{role} path is not configured"),
        ));
    }
    if !path.exists() {
        return Err(CaptureError::new(
            CaptureFailureKind::ConfigInvalid,
            format!("{role} not found at {}", path.display()),
        ));
    }
    Ok(())
}

/// Render-and-capture: open a fresh headless browser session per item,
/// capture the full page height, tear the session down on every exit path.
pub struct CaptureAction {
    config: CaptureConfig,
    output_dir: PathBuf,
}

impl CaptureAction {
    pub fn new(config: CaptureConfig, output_dir: PathBuf) -> Self {
        Self { config, output_dir }
    }
}

#[async_trait]
impl BatchAction for CaptureAction {
    fn describe(&self) -> &str {
        "capture"
    }

    async fn run(&self, item: &BatchItem) -> Result<PathBuf, ActionError> {
        self.config.validate().map_err(ActionError::Capture)?;
        ensure_output_dir(&self.output_dir).map_err(|err| ActionError::Persist(err.to_string()))?;

        let url = item
            .resolved_url
            .as_deref()
            .ok_or(ActionError::MissingTarget)?;
        let target = self
            .output_dir
            .join(format!("screenshot_{}.png", item.index + 1));

        let session = BrowserSession::launch(&self.config)
            .await
            .map_err(ActionError::Capture)?;
        // Shutdown must run whether the capture succeeded or not; a leaked
        // browser process per item would accumulate across the batch.
        let captured = capture_page(&session.browser, url, &target, &self.config).await;
        session.shutdown().await;
        captured.map_err(ActionError::Capture)?;
        Ok(target)
    }
}

/// A launched browser plus the task draining its CDP event stream. The
/// handler task must be aborted once the browser is gone or it runs
/// forever.
struct BrowserSession {
    browser: Browser,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    async fn launch(config: &CaptureConfig) -> Result<Self, CaptureError> {
        let browser_config = BrowserConfig::builder()
            .chrome_executable(config.browser_path.clone())
            .window_size(config.viewport_width, 1080)
            .headless_mode(HeadlessMode::default())
            .arg("--no-sandbox")
            .build()
            .map_err(|err| CaptureError::new(CaptureFailureKind::ConfigInvalid, err))?;

        let (browser, mut handler) = Browser::launch(browser_config).await.map_err(|err| {
            CaptureError::new(
                CaptureFailureKind::NavigationFailed,
                format!("browser launch failed: {err}"),
            )
        })?;

        let handler_task = tokio::task::spawn(async move {
            while let Some(event) = handler.next().await {
                if event.is_err() {
                    break;
                }
            }
        });

        Ok(Self {
            browser,
            handler: handler_task,
        })
    }

    async fn shutdown(mut self) {
        if let Err(err) = self.browser.close().await {
            log::debug!("browser close: {err}");
        }
        if let Err(err) = self.browser.wait().await {
            log::debug!("browser wait: {err}");
        }
        self.handler.abort();
    }
}

async fn capture_page(
    browser: &Browser,
    url: &str,
    target: &Path,
    config: &CaptureConfig,
) -> Result<(), CaptureError> {
    let page = browser.new_page(url).await.map_err(|err| {
        CaptureError::new(CaptureFailureKind::NavigationFailed, err.to_string())
    })?;
    page.wait_for_navigation().await.map_err(|err| {
        CaptureError::new(CaptureFailureKind::NavigationFailed, err.to_string())
    })?;
    sleep(config.settle_delay).await;

    let height: f64 = page
        .evaluate("document.body.scrollHeight")
        .await
        .map_err(|err| {
            CaptureError::new(
                CaptureFailureKind::CaptureFailed,
                format!("scroll height query failed: {err}"),
            )
        })?
        .into_value()
        .map_err(|err| {
            CaptureError::new(
                CaptureFailureKind::CaptureFailed,
                format!("scroll height is not a number: {err}"),
            )
        })?;

    // Grow the emulated viewport to the full scroll height so one capture
    // covers the whole document.
    let metrics = SetDeviceMetricsOverrideParams::builder()
        .width(i64::from(config.viewport_width))
        .height(height.max(1.0) as i64)
        .device_scale_factor(1.0)
        .mobile(false)
        .build()
        .map_err(|err| CaptureError::new(CaptureFailureKind::CaptureFailed, err))?;
    page.execute(metrics).await.map_err(|err| {
        CaptureError::new(
            CaptureFailureKind::CaptureFailed,
            format!("viewport resize failed: {err}"),
        )
    })?;
    sleep(config.settle_delay).await;

    page.save_screenshot(
        ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build(),
        target,
    )
    .await
    .map_err(|err| CaptureError::new(CaptureFailureKind::CaptureFailed, err.to_string()))?;
    Ok(())
}
