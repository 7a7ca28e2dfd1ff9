/// Errors that abort a scan. Every variant is fatal: there is no retry
/// path and no partial result once one of these surfaces.
#[derive(Debug, thiserror::Error)]
pub enum ScanError {
    #[error("browser launch failed: {0}")]
    Launch(String),

    #[error("navigation failed: {0}")]
    Navigation(String),

    /// A required control or container was absent at the point of use.
    /// Bounded waits that time out land here too.
    #[error("element not found: {0}")]
    ElementNotFound(String),

    #[error("option {value:?} not offered by {control}")]
    OptionNotFound { control: String, value: String },

    #[error("javascript execution failed: {0}")]
    JavaScript(String),

    #[error("unexpected month value: {0}")]
    UnexpectedMonth(String),
}
