use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A lodging product on the target site.
///
/// `name` is the exact option value in the lodging dropdown and `label` is
/// the short form used in findings. The site can add products at any time,
/// so this stays an open set of strings rather than a closed enum.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Lodge {
    pub name: String,
    pub label: String,
}

impl Lodge {
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
        }
    }

    /// Hotel rooms at Rock Harbor
    pub fn rock_harbor() -> Self {
        Self::new("Rock Harbor Lodge", "Rock Harbor")
    }

    /// Camper cabins at Washington Harbor
    pub fn washington_harbor() -> Self {
        Self::new("Washington Harbor Camper Cabins", "Washington Harbor")
    }
}

/// A bookable day spotted in the calendar
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Finding {
    pub lodge: String,
    pub month: String,
    pub day: String,
    pub observed_at: DateTime<Utc>,
}

impl Finding {
    pub fn new(lodge: &str, month: &str, day: &str) -> Self {
        Self {
            lodge: lodge.to_string(),
            month: month.to_string(),
            day: day.to_string(),
            observed_at: Utc::now(),
        }
    }
}

impl fmt::Display for Finding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} on {} {} is available", self.lodge, self.month, self.day)
    }
}

/// Result of scanning one lodge across its month pages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum ScanOutcome {
    /// No bookable day on any scanned page
    Clear { months_scanned: u32 },
    /// A bookable day was found; scanning stopped at the first one
    Available(Finding),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finding_reads_naturally() {
        let finding = Finding::new("Rock Harbor", "Sep", "15");
        assert_eq!(finding.to_string(), "Rock Harbor on Sep 15 is available");
    }

    #[test]
    fn known_lodges() {
        assert_eq!(Lodge::rock_harbor().name, "Rock Harbor Lodge");
        assert_eq!(Lodge::rock_harbor().label, "Rock Harbor");
        assert_eq!(
            Lodge::washington_harbor().name,
            "Washington Harbor Camper Cabins"
        );
    }

    #[test]
    fn outcome_serializes_tagged() {
        let json = serde_json::to_string(&ScanOutcome::Clear { months_scanned: 8 }).unwrap();
        assert!(json.contains("\"outcome\":\"clear\""));

        let json = serde_json::to_string(&ScanOutcome::Available(Finding::new(
            "Rock Harbor",
            "Sep",
            "15",
        )))
        .unwrap();
        assert!(json.contains("\"outcome\":\"available\""));
        assert!(json.contains("\"day\":\"15\""));
    }
}
