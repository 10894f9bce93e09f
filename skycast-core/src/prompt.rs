//! Prompt construction for the upstream model.

use chrono::NaiveDate;

use crate::model::{Granularity, LocationQuery};

pub const DEFAULT_LANGUAGE: &str = "Chinese";

/// Builds the instruction text sent to the model.
///
/// The output schema and units are fixed; only the language of the
/// human-readable fields varies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptBuilder {
    language: String,
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_LANGUAGE)
    }
}

impl PromptBuilder {
    pub fn new(language: impl Into<String>) -> Self {
        Self { language: language.into() }
    }

    pub fn build(
        &self,
        location: &LocationQuery,
        granularity: Granularity,
        current_date: NaiveDate,
    ) -> String {
        let location_context = location_context(location);
        let schema = self.schema();
        let date = current_date.format("%Y-%m-%d");

        match granularity {
            Granularity::Week => format!(
                "Current Date: {date}.\n\
                 I need the weather forecast for: {location_context}.\n\
                 Target: Next 7 days, one entry per day.\n\
                 Please use Google Search to find the most accurate up-to-date forecast.\n\
                 IMPORTANT: Check for any active SEVERE WEATHER ALERTS (Typhoon, Heatwave, Blizzard, Heavy Rain, etc.) \
                 and include them in the 'alerts' field only if they exist.\n\
                 Include precipitation amounts (mm).\n\
                 \n{schema}"
            ),
            Granularity::Month => format!(
                "Current Date: {date}.\n\
                 I need weather data for: {location_context}.\n\
                 Target: Current calendar month (forecast for upcoming days, observed weather for days already passed).\n\
                 If daily data is sparse, provide a representative sample of at least 15-20 days.\n\
                 Please use Google Search.\n\
                 IMPORTANT: Check for any active SEVERE WEATHER ALERTS (Typhoon, Heatwave, Blizzard, Heavy Rain, etc.) \
                 and include them in the 'alerts' field only if they exist.\n\
                 Include precipitation amounts (mm).\n\
                 \n{schema}"
            ),
            Granularity::Year => format!(
                "I need typical yearly climate data (monthly averages) for: {location_context}.\n\
                 Target: 12 months, one entry per month with average high and low temperatures.\n\
                 Use Google Search to ensure accuracy.\n\
                 IMPORTANT: Check for any active SEVERE WEATHER ALERTS (Typhoon, Heatwave, Blizzard, Heavy Rain, etc.) \
                 and include them in the 'alerts' field only if they exist.\n\
                 Include average precipitation (mm) for each month.\n\
                 \n{schema}"
            ),
        }
    }

    fn schema(&self) -> String {
        let language = &self.language;
        format!(
            r#"Return a VALID JSON object in the following format inside a ```json markdown code block:
{{
  "location": "City Name (e.g. Beijing)",
  "summary": "A brief summary in {language}.",
  "alerts": [
    {{
      "title": "Alert Title (e.g. Typhoon Warning)",
      "level": "Red" | "Orange" | "Yellow" | "Unknown",
      "description": "Short impact description in {language}"
    }}
  ] (Optional, only if active alerts exist),
  "data": [
    {{
      "date": "YYYY-MM-DD (or month name for yearly data)",
      "label": "Short display label",
      "tempHigh": number (Celsius),
      "tempLow": number (Celsius),
      "precipitation": number (Precipitation in mm, estimate if needed),
      "humidity": number (Relative humidity in %, optional),
      "condition": "Short condition in {language}",
      "description": "Short tip in {language}"
    }}
  ]
}}"#
        )
    }
}

/// Prompt in the default language.
pub fn build_prompt(
    location: &LocationQuery,
    granularity: Granularity,
    current_date: NaiveDate,
) -> String {
    PromptBuilder::default().build(location, granularity, current_date)
}

fn location_context(location: &LocationQuery) -> String {
    match location {
        LocationQuery::Name(name) => format!("Location: {}", name.trim()),
        LocationQuery::Coordinates { latitude, longitude } => format!(
            "Latitude: {latitude}, Longitude: {longitude} \
             (Identify the city name automatically and use it as the 'location' field)"
        ),
    }
}
