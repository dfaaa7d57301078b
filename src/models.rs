use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// The point the user is asking about. Owned by the map controller.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedLocation {
    pub lat: f64,
    pub lon: f64,
    pub name: String,
}

/// Weather category used for both alert boxes and history row colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    #[default]
    Normal,
    Success,
    Info,
    Secondary,
    Warning,
    Danger,
    #[serde(other)]
    Other,
}

/// A server value kept exactly as the server wrote it.
///
/// The analysis server sends its averages either as JSON numbers or as
/// preformatted strings such as `"18.0"`. Either way the client only ever
/// displays them, so the verbatim text is all we keep.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reading(String);

impl Reading {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Reading {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Reading {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl<'de> Deserialize<'de> for Reading {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = match serde_json::Value::deserialize(deserializer)? {
            serde_json::Value::String(s) => s,
            serde_json::Value::Null => String::new(),
            other => other.to_string(),
        };
        Ok(Self(text))
    }
}

impl Serialize for Reading {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherAlert {
    pub title: String,
    pub recommendation: String,
    #[serde(rename = "type", default)]
    pub category: Category,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub pleasant_score: Reading,
    pub avg_temp_max: Reading,
    pub historical_min_temp: Reading,
    pub historical_max_temp: Reading,
    pub avg_precip: Reading,
    pub avg_wind: Reading,
    #[serde(default)]
    pub alert: Option<WeatherAlert>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryLocation {
    pub lat: f64,
    pub lon: f64,
    #[serde(default)]
    pub name: String,
}

/// One past query as stored by the server.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    pub title: String,
    pub date: String,
    pub location: HistoryLocation,
    #[serde(default)]
    pub status_color: Option<Category>,
    #[serde(default)]
    pub results: Option<AnalysisResult>,
}

/// Body of `POST /api/historical_averages`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisRequest {
    pub lat: f64,
    pub lon: f64,
    pub date: String,
    pub title: String,
    #[serde(rename = "locationName")]
    pub location_name: String,
}

/// Body the server sends alongside a non-2xx status.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorPayload {
    #[serde(default)]
    pub error: Option<String>,
}

/// Nominatim's reverse lookup response; only the display name matters here.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReverseGeocodeResponse {
    #[serde(default)]
    pub display_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn readings_keep_numbers_and_strings_verbatim() {
        let raw = r#"{
            "pleasant_score": 82,
            "avg_temp_max": "18.0",
            "historical_min_temp": 2,
            "historical_max_temp": 24,
            "avg_precip": 0.5,
            "avg_wind": "10.3",
            "alert": null
        }"#;
        let result: AnalysisResult = serde_json::from_str(raw).unwrap();
        assert_eq!(result.pleasant_score.as_str(), "82");
        assert_eq!(result.avg_temp_max.as_str(), "18.0");
        assert_eq!(result.avg_precip.as_str(), "0.5");
        assert_eq!(result.avg_wind.as_str(), "10.3");
        assert!(result.alert.is_none());
    }

    #[test]
    fn alert_type_maps_to_category() {
        let raw = r#"{"title":"HOT","recommendation":"Drink water","type":"danger"}"#;
        let alert: WeatherAlert = serde_json::from_str(raw).unwrap();
        assert_eq!(alert.category, Category::Danger);

        let raw = r#"{"title":"?","recommendation":"?","type":"purple"}"#;
        let alert: WeatherAlert = serde_json::from_str(raw).unwrap();
        assert_eq!(alert.category, Category::Other);
    }

    #[test]
    fn history_item_without_status_color() {
        let raw = r#"[{
            "title": "Posada",
            "date": "2025-12-25",
            "location": {"lat": 28.6329, "lon": -106.0691, "name": "Chihuahua"}
        }]"#;
        let items: Vec<HistoryItem> = serde_json::from_str(raw).unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].status_color, None);
        assert_eq!(items[0].location.name, "Chihuahua");
    }

    #[test]
    fn request_uses_camel_case_location_name() {
        let req = AnalysisRequest {
            lat: 1.0,
            lon: 2.0,
            date: "2025-12-25".into(),
            title: "Posada".into(),
            location_name: "Chihuahua".into(),
        };
        let json = serde_json::to_value(&req).unwrap();
        assert_eq!(json["locationName"], "Chihuahua");
        assert!(json.get("location_name").is_none());
    }
}
