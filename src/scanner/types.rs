use serde::{Deserialize, Serialize};

/// Parameters for one availability scan
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanParams {
    /// Number of adults entered before opening the calendar
    pub adults: u8,
    /// Number of children entered before opening the calendar
    pub children: u8,
    /// How many consecutive month pages to scan
    pub month_pages: u32,
}

impl Default for ScanParams {
    fn default() -> Self {
        Self {
            adults: 1,
            children: 0,
            month_pages: 8,
        }
    }
}
