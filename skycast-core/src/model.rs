use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

/// Where the caller wants weather for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LocationQuery {
    /// Free-text place name, e.g. "Shanghai".
    Name(String),
    /// Raw coordinates; the place name is resolved by the model.
    Coordinates { latitude: f64, longitude: f64 },
}

impl LocationQuery {
    pub fn name(name: impl Into<String>) -> Self {
        LocationQuery::Name(name.into())
    }

    pub fn coordinates(latitude: f64, longitude: f64) -> Self {
        LocationQuery::Coordinates { latitude, longitude }
    }

    pub fn is_coordinates(&self) -> bool {
        matches!(self, LocationQuery::Coordinates { .. })
    }
}

impl fmt::Display for LocationQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LocationQuery::Name(name) => f.write_str(name),
            LocationQuery::Coordinates { latitude, longitude } => {
                write!(f, "{latitude}, {longitude}")
            }
        }
    }
}

/// Time resolution of a forecast.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Granularity {
    /// Next seven days, one point per day.
    #[default]
    Week,
    /// Current calendar month, one point per sampled day.
    Month,
    /// Twelve monthly climate averages.
    Year,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Week => "week",
            Granularity::Month => "month",
            Granularity::Year => "year",
        }
    }

    pub const fn all() -> &'static [Granularity] {
        &[Granularity::Week, Granularity::Month, Granularity::Year]
    }
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Unknown granularity '{0}'. Supported values: week, month, year.")]
pub struct UnknownGranularity(pub String);

impl FromStr for Granularity {
    type Err = UnknownGranularity;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_lowercase().as_str() {
            "week" => Ok(Granularity::Week),
            "month" => Ok(Granularity::Month),
            "year" => Ok(Granularity::Year),
            _ => Err(UnknownGranularity(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct WeatherRequest {
    pub location: LocationQuery,
    pub granularity: Granularity,
}

/// One time bucket: a day for week/month views, a month for the year view.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherDataPoint {
    /// Calendar date ("2024-10-27") or period identifier ("January").
    pub date: String,
    pub label: String,
    pub temp_high: f64,
    pub temp_low: f64,
    /// Millimeters. `None` means not reported, not zero.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub precipitation: Option<f64>,
    pub condition: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub humidity: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String")]
pub enum AlertLevel {
    Yellow,
    Orange,
    Red,
    #[default]
    Unknown,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::Yellow => "Yellow",
            AlertLevel::Orange => "Orange",
            AlertLevel::Red => "Red",
            AlertLevel::Unknown => "Unknown",
        }
    }
}

impl From<&str> for AlertLevel {
    /// Lenient: anything outside the known levels is `Unknown`.
    fn from(value: &str) -> Self {
        let value = value.trim();
        match value.to_lowercase().as_str() {
            "yellow" | "黄色" => AlertLevel::Yellow,
            "orange" | "橙色" => AlertLevel::Orange,
            "red" | "红色" => AlertLevel::Red,
            _ => AlertLevel::Unknown,
        }
    }
}

impl From<String> for AlertLevel {
    fn from(value: String) -> Self {
        AlertLevel::from(value.as_str())
    }
}

impl fmt::Display for AlertLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub title: String,
    pub level: AlertLevel,
    pub description: String,
}

/// A web page the model cited while answering.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingSource {
    pub uri: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl GroundingSource {
    /// Text to show for this source: the title, or the URI when there is none.
    pub fn display_text(&self) -> &str {
        self.title.as_deref().unwrap_or(&self.uri)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeatherResponse {
    pub location: String,
    pub summary: String,
    /// `None` means no alerts are known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alerts: Option<Vec<WeatherAlert>>,
    /// Never empty; chronological as emitted by the model.
    pub data: Vec<WeatherDataPoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub grounding_sources: Option<Vec<GroundingSource>>,
}

impl WeatherResponse {
    pub fn has_alerts(&self) -> bool {
        self.alerts.as_ref().is_some_and(|alerts| !alerts.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn granularity_as_str_roundtrip() {
        for g in Granularity::all() {
            let parsed: Granularity = g.as_str().parse().expect("roundtrip should succeed");
            assert_eq!(*g, parsed);
        }
    }

    #[test]
    fn granularity_parse_is_case_insensitive() {
        assert_eq!("YEAR".parse::<Granularity>().unwrap(), Granularity::Year);
        assert_eq!(" Month ".parse::<Granularity>().unwrap(), Granularity::Month);
    }

    #[test]
    fn unknown_granularity_error() {
        let err = "decade".parse::<Granularity>().unwrap_err();
        assert!(err.to_string().contains("Unknown granularity 'decade'"));
    }

    #[test]
    fn has_alerts_needs_a_non_empty_list() {
        let mut response = WeatherResponse {
            location: "Oslo".into(),
            summary: String::new(),
            alerts: None,
            data: Vec::new(),
            grounding_sources: None,
        };
        assert!(!response.has_alerts());

        response.alerts = Some(Vec::new());
        assert!(!response.has_alerts());

        response.alerts = Some(vec![WeatherAlert {
            title: "Gale".into(),
            level: AlertLevel::Yellow,
            description: "Strong wind".into(),
        }]);
        assert!(response.has_alerts());
    }

    #[test]
    fn alert_level_known_values() {
        assert_eq!(AlertLevel::from("Red"), AlertLevel::Red);
        assert_eq!(AlertLevel::from("orange"), AlertLevel::Orange);
        assert_eq!(AlertLevel::from(" YELLOW "), AlertLevel::Yellow);
        assert_eq!(AlertLevel::from("红色"), AlertLevel::Red);
    }

    #[test]
    fn alert_level_unrecognized_is_unknown() {
        assert_eq!(AlertLevel::from("Severe"), AlertLevel::Unknown);
        assert_eq!(AlertLevel::from("Red/Orange"), AlertLevel::Unknown);
        assert_eq!(AlertLevel::from(""), AlertLevel::Unknown);
    }

    #[test]
    fn alert_level_deserializes_leniently() {
        let alert: WeatherAlert = serde_json::from_value(serde_json::json!({
            "title": "Typhoon",
            "level": "Purple",
            "description": "Stay indoors"
        }))
        .unwrap();
        assert_eq!(alert.level, AlertLevel::Unknown);
    }

    #[test]
    fn grounding_source_display_falls_back_to_uri() {
        let titled = GroundingSource { uri: "https://a.example".into(), title: Some("A".into()) };
        let bare = GroundingSource { uri: "https://b.example".into(), title: None };
        assert_eq!(titled.display_text(), "A");
        assert_eq!(bare.display_text(), "https://b.example");
    }

    #[test]
    fn response_serializes_with_wire_field_names() {
        let response = WeatherResponse {
            location: "Beijing".into(),
            summary: "Dry".into(),
            alerts: None,
            data: vec![WeatherDataPoint {
                date: "2024-10-27".into(),
                label: "Sun".into(),
                temp_high: 18.0,
                temp_low: 7.0,
                precipitation: None,
                condition: "Clear".into(),
                humidity: None,
                description: None,
            }],
            grounding_sources: None,
        };

        let value = serde_json::to_value(&response).unwrap();
        assert_eq!(value["data"][0]["tempHigh"], 18.0);
        assert!(value.get("alerts").is_none());
        assert!(value["data"][0].get("precipitation").is_none());
    }

    #[test]
    fn location_query_display() {
        assert_eq!(LocationQuery::name("Paris").to_string(), "Paris");
        assert_eq!(LocationQuery::coordinates(39.9, 116.4).to_string(), "39.9, 116.4");
    }
}
