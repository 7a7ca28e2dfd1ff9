use crate::scanner::config::ScanConfig;
use crate::scanner::error::ScanError;
use headless_chrome::{Browser, LaunchOptions, Tab};
use std::sync::Arc;
use tracing::info;

/// A launched browser scoped to one run.
///
/// The underlying Chrome process is closed when this is dropped, so the
/// session is released whether the run passes, fails or aborts.
pub struct BrowserSession {
    browser: Browser,
}

impl BrowserSession {
    /// Launch Chrome with the run configuration.
    pub fn launch(config: &ScanConfig) -> Result<Self, ScanError> {
        info!("Launching headless Chrome...");

        let options = LaunchOptions::default_builder()
            .headless(config.headless)
            .window_size(Some(config.window_size))
            .build()
            .map_err(|e| ScanError::Launch(e.to_string()))?;

        let browser = Browser::new(options).map_err(|e| ScanError::Launch(e.to_string()))?;

        Ok(Self { browser })
    }

    /// Open the tab every scan in this run shares.
    pub fn new_tab(&self) -> Result<Arc<Tab>, ScanError> {
        self.browser
            .new_tab()
            .map_err(|e| ScanError::Launch(e.to_string()))
    }
}
