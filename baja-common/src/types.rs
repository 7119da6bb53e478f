use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// JSON keys the backend is asked to fill, in prompt order.
pub const FIELD_NAMES: [&str; 9] = [
    "temperature",
    "windSpeed",
    "waterLevel",
    "sunrise",
    "sunset",
    "moonrise",
    "moonset",
    "moonPhase",
    "nextFullMoon",
];

/// Literal the backend is told to use when it cannot determine a value ("no data").
pub const NO_DATA: &str = "Nincs adat";

/// Shown instead of a missing or blank value.
pub const PLACEHOLDER: &str = "--";

/// The nine backend-sourced readings, verbatim.
///
/// A field the backend left out stays `None`; substitution happens only in the view.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Readings {
    /// e.g. "21", "23.5°C approx"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<String>,
    /// km/h, free-form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wind_speed: Option<String>,
    /// Danube level in cm, free-form
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub water_level: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunrise: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sunset: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moonrise: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moonset: Option<String>,
    /// Hungarian phase name, e.g. "Első negyed"
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub moon_phase: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_full_moon: Option<String>,
}

impl Readings {
    /// Look up a reading by its JSON key.
    pub fn get(&self, field: &str) -> Option<&str> {
        self.slot(field).and_then(|v| v.as_deref())
    }

    /// Set a reading by its JSON key. Returns `false` for an unknown key.
    pub fn set(&mut self, field: &str, value: Option<String>) -> bool {
        match self.slot_mut(field) {
            Some(slot) => {
                *slot = value;
                true
            }
            None => false,
        }
    }

    /// Number of readings the backend actually supplied.
    pub fn present_count(&self) -> usize {
        FIELD_NAMES.iter().filter(|f| self.get(f).is_some()).count()
    }

    fn slot(&self, field: &str) -> Option<&Option<String>> {
        Some(match field {
            "temperature" => &self.temperature,
            "windSpeed" => &self.wind_speed,
            "waterLevel" => &self.water_level,
            "sunrise" => &self.sunrise,
            "sunset" => &self.sunset,
            "moonrise" => &self.moonrise,
            "moonset" => &self.moonset,
            "moonPhase" => &self.moon_phase,
            "nextFullMoon" => &self.next_full_moon,
            _ => return None,
        })
    }

    fn slot_mut(&mut self, field: &str) -> Option<&mut Option<String>> {
        Some(match field {
            "temperature" => &mut self.temperature,
            "windSpeed" => &mut self.wind_speed,
            "waterLevel" => &mut self.water_level,
            "sunrise" => &mut self.sunrise,
            "sunset" => &mut self.sunset,
            "moonrise" => &mut self.moonrise,
            "moonset" => &mut self.moonset,
            "moonPhase" => &mut self.moon_phase,
            "nextFullMoon" => &mut self.next_full_moon,
            _ => return None,
        })
    }
}

/// One accepted backend answer plus the local moment it was accepted.
///
/// Built once by the fetcher and never mutated afterwards; a newer fetch
/// produces a new `Snapshot`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Snapshot {
    #[serde(flatten)]
    pub readings: Readings,
    /// Local time of day, "HH:MM:SS"
    pub last_updated: String,
    /// Same capture as `last_updated`, as an instant
    pub fetched_at: DateTime<Utc>,
}

/// Coarse lifecycle state exposed to the page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ViewStatus {
    Loading,
    Ready,
    Failed,
}

/// One rendered card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    /// JSON key of the reading, e.g. "windSpeed"
    pub field: String,
    /// Hungarian card title, e.g. "Szélerősség"
    pub title: String,
    /// Display value, never empty (placeholder when unknown)
    pub value: String,
    /// Unit suffix, omitted when `value` is the placeholder
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<String>,
}

/// Everything the page needs to draw itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub status: ViewStatus,
    pub refreshing: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<String>,
    /// Temperature, wind, river level
    pub environment: Vec<Card>,
    /// Sun and moon times, moon phase, next full moon
    pub astronomy: Vec<Card>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_readings_get_set_by_key() {
        let mut readings = Readings::default();
        assert!(readings.set("windSpeed", Some("12".to_string())));
        assert!(readings.set("nextFullMoon", Some("2026-03-14".to_string())));
        assert!(!readings.set("lastUpdated", Some("x".to_string())));

        assert_eq!(readings.wind_speed.as_deref(), Some("12"));
        assert_eq!(readings.get("nextFullMoon"), Some("2026-03-14"));
        assert_eq!(readings.get("temperature"), None);
        assert_eq!(readings.get("bogus"), None);
        assert_eq!(readings.present_count(), 2);
    }

    #[test]
    fn test_every_field_name_has_a_slot() {
        let mut readings = Readings::default();
        for field in FIELD_NAMES {
            assert!(readings.set(field, Some(field.to_string())), "{}", field);
        }
        assert_eq!(readings.present_count(), FIELD_NAMES.len());
    }

    #[test]
    fn test_snapshot_json_uses_camel_case_and_skips_missing() {
        let snapshot = Snapshot {
            readings: Readings {
                temperature: Some("21".to_string()),
                moon_phase: Some("Első negyed".to_string()),
                ..Default::default()
            },
            last_updated: "14:05:09".to_string(),
            fetched_at: DateTime::parse_from_rfc3339("2026-03-01T13:05:09Z")
                .unwrap()
                .with_timezone(&Utc),
        };

        let json = serde_json::to_value(&snapshot).unwrap();
        assert_eq!(json["temperature"], "21");
        assert_eq!(json["moonPhase"], "Első negyed");
        assert_eq!(json["lastUpdated"], "14:05:09");
        assert!(json.get("windSpeed").is_none());
        assert!(json.get("readings").is_none());
    }

    #[test]
    fn test_view_status_serializes_lowercase() {
        assert_eq!(serde_json::to_string(&ViewStatus::Failed).unwrap(), "\"failed\"");
    }
}
