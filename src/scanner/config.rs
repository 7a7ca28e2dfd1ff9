use std::time::Duration;

/// Configuration for a scan run.
#[derive(Debug, Clone)]
pub struct ScanConfig {
    /// Lodging page opened before each scan
    pub start_url: String,

    /// Run browser in headless mode
    pub headless: bool,

    /// Browser window size
    pub window_size: (u32, u32),

    /// Bounded wait for any element, in seconds
    pub timeout_secs: u64,

    /// Settle delay after navigation and between month pages, in milliseconds
    pub settle_ms: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            start_url: "https://www.rockharborlodge.com/lodging/rock-harbor-lodge/#rooms"
                .to_string(),
            headless: true,
            window_size: (1920, 1080),
            timeout_secs: 30,
            settle_ms: 2_000,
        }
    }
}

impl ScanConfig {
    /// Get the element wait timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get the settle delay as Duration
    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }
}
