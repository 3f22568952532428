use std::time::Duration;

use crate::scan::Scanner;

/// Desktop Chrome user-agent sent instead of the headless default.
pub const DESKTOP_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
    AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";

/// How long the page is given to render after navigation in the default mode.
pub const DEFAULT_SETTLE: Duration = Duration::from_secs(3);

/// Headroom kept between the in-page DOM-quiet cap and the browser request
/// timeout, so the page gives up before the CDP call does.
pub const READY_TIMEOUT_MARGIN: Duration = Duration::from_millis(500);

/// Decides when a freshly navigated page is considered settled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadyCondition {
    /// Sleep unconditionally.
    Fixed(Duration),
    /// Wait until the DOM has gone `quiet` without mutations, giving up after `timeout`.
    DomQuiet { quiet: Duration, timeout: Duration },
    /// Nothing beyond the navigation's own load event.
    Load,
}

impl Default for ReadyCondition {
    fn default() -> Self {
        ReadyCondition::Fixed(DEFAULT_SETTLE)
    }
}

pub struct ScannerConfig {
    pub headless: bool,
    pub viewport_width: u32,
    pub viewport_height: u32,
    pub chrome_path: Option<String>,
    pub user_agent: String,
    /// Browser request timeout; bounds navigation (default: 30s).
    pub request_timeout: Duration,
    pub ready: ReadyCondition,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            headless: true,
            viewport_width: 1920,
            viewport_height: 1080,
            chrome_path: None,
            user_agent: DESKTOP_USER_AGENT.to_string(),
            request_timeout: Duration::from_secs(30),
            ready: ReadyCondition::default(),
        }
    }
}

impl ScannerConfig {
    /// The ready condition as run against this browser: a DOM-quiet cap never
    /// reaches the request timeout.
    pub fn ready_condition(&self) -> ReadyCondition {
        match self.ready {
            ReadyCondition::DomQuiet { quiet, timeout } => {
                let ceiling = self.request_timeout.saturating_sub(READY_TIMEOUT_MARGIN);
                ReadyCondition::DomQuiet {
                    quiet,
                    timeout: timeout.min(ceiling),
                }
            }
            other => other,
        }
    }
}

pub struct ScannerBuilder {
    config: ScannerConfig,
}

impl ScannerBuilder {
    pub fn new() -> Self {
        Self {
            config: ScannerConfig::default(),
        }
    }

    pub fn headless(mut self, headless: bool) -> Self {
        self.config.headless = headless;
        self
    }

    pub fn viewport(mut self, width: u32, height: u32) -> Self {
        self.config.viewport_width = width;
        self.config.viewport_height = height;
        self
    }

    pub fn chrome_path(mut self, path: impl Into<String>) -> Self {
        self.config.chrome_path = Some(path.into());
        self
    }

    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Set the browser request timeout, which also bounds navigation.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.request_timeout = timeout;
        self
    }

    /// Set the condition that ends the post-navigation wait.
    pub fn ready(mut self, ready: ReadyCondition) -> Self {
        self.config.ready = ready;
        self
    }

    pub fn build_config(self) -> ScannerConfig {
        self.config
    }

    pub fn build(self) -> Scanner {
        Scanner::new(self.build_config())
    }
}

impl Default for ScannerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
