use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Risk tier assigned by the bloom-prediction model.
#[derive(Debug, PartialEq, Eq, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum WarningLevel {
    Red,
    Orange,
    Green,
}

impl WarningLevel {
    /// Whether the tier calls for operator attention. Green is the all-clear.
    pub fn is_risk(&self) -> bool {
        !matches!(self, WarningLevel::Green)
    }

    /// Wire spelling of the level, matching its serialized form.
    pub fn as_str(&self) -> &'static str {
        match self {
            WarningLevel::Red => "RED",
            WarningLevel::Orange => "ORANGE",
            WarningLevel::Green => "GREEN",
        }
    }
}

/// Outcome of one prediction run for a single zone.
#[derive(Debug, PartialEq, Clone, Serialize, Deserialize)]
pub struct WarningResult {
    pub level: WarningLevel,
    pub zone_name: String,
    pub message: String,
    pub timestamp: NaiveDateTime,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn levels_round_trip_as_uppercase_strings() {
        assert_eq!(serde_json::to_string(&WarningLevel::Red).unwrap(), "\"RED\"");
        let level: WarningLevel = serde_json::from_str("\"ORANGE\"").unwrap();
        assert_eq!(level, WarningLevel::Orange);
    }

    #[test]
    fn lowercase_level_is_rejected() {
        assert!(serde_json::from_str::<WarningLevel>("\"green\"").is_err());
    }

    #[test]
    fn only_green_is_safe() {
        assert!(WarningLevel::Red.is_risk());
        assert!(WarningLevel::Orange.is_risk());
        assert!(!WarningLevel::Green.is_risk());
    }

    #[test]
    fn deserializes_prediction_payload() {
        let json = r#"{
            "level": "RED",
            "zone_name": "Qingdao offshore",
            "message": "High density of Aurelia aurita detected",
            "timestamp": "2026-03-01T12:30:00"
        }"#;
        let result: WarningResult = serde_json::from_str(json).unwrap();
        assert_eq!(result.level, WarningLevel::Red);
        assert!(result.level.is_risk());
    }
}
