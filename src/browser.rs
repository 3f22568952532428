use chromiumoxide::browser::{Browser as CrBrowser, BrowserConfig as CrBrowserConfig};
use chromiumoxide::handler::viewport::Viewport;
use futures::StreamExt;
use tracing::{debug, warn};

use crate::config::ScannerConfig;
use crate::error::{Error, Result};
use crate::page::Page;

/// Chrome flags applied to every scan session.
/// chromiumoxide adds the `--` prefix, so keys must NOT include it.
const LAUNCH_ARGS: &[&str] = &[
    "disable-gpu",
    "disable-extensions",
    "mute-audio",
    "no-first-run",
    "no-default-browser-check",
];

/// A single headless Chrome session owned by one scan.
pub struct ScanBrowser {
    browser: CrBrowser,
    handler_task: tokio::task::JoinHandle<()>,
}

impl ScanBrowser {
    /// Launch Chrome with the scan configuration.
    pub async fn launch(config: &ScannerConfig) -> Result<Self> {
        let mut builder = CrBrowserConfig::builder();

        if config.headless {
            builder = builder.new_headless_mode().no_sandbox();
        } else {
            builder = builder.with_head().no_sandbox();
        }

        for arg in LAUNCH_ARGS {
            builder = builder.arg(*arg);
        }
        builder = builder.arg(("user-agent", config.user_agent.as_str()));

        if let Some(ref path) = config.chrome_path {
            builder = builder.chrome_executable(path);
        }

        builder = builder
            .request_timeout(config.request_timeout)
            .window_size(config.viewport_width, config.viewport_height)
            .viewport(Viewport {
                width: config.viewport_width,
                height: config.viewport_height,
                device_scale_factor: None,
                emulating_mobile: false,
                is_landscape: false,
                has_touch: false,
            });

        let cr_config = builder.build().map_err(Error::LaunchError)?;

        let (browser, mut handler) = CrBrowser::launch(cr_config)
            .await
            .map_err(|e| Error::LaunchError(e.to_string()))?;

        let handler_task = tokio::spawn(async move {
            while let Some(_event) = handler.next().await {}
        });

        debug!(headless = config.headless, "browser launched");

        Ok(Self {
            browser,
            handler_task,
        })
    }

    /// Open a blank tab. Navigation is left to the caller so it can be timed.
    pub async fn new_page(&self) -> Result<Page> {
        let cr_page = self
            .browser
            .new_page("about:blank")
            .await
            .map_err(|e| Error::NavigationError(e.to_string()))?;
        Ok(Page::new(cr_page))
    }

    /// Close the browser and wait for the child process to exit.
    /// If Chrome does not acknowledge the close, the process is killed first.
    pub async fn close(mut self) -> Result<()> {
        let closed = self.browser.close().await;
        if let Err(ref e) = closed {
            warn!(error = %e, "browser did not close cleanly, killing it");
            if let Some(Err(e)) = self.browser.kill().await {
                warn!(error = %e, "failed to kill browser process");
            }
        }
        let waited = self.browser.wait().await;
        self.handler_task.abort();
        closed?;
        waited?;
        debug!("browser closed");
        Ok(())
    }
}
