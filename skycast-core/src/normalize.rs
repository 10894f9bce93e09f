//! Turns free-form model output into a [`WeatherResponse`].
//!
//! The model is asked to answer with a JSON object inside a fenced code
//! block, but it does not always comply. Extraction is an ordered list of
//! strategies; the first one that yields a JSON object wins. The object is
//! then repaired field by field: unusable data points and alerts are
//! dropped, unknown alert levels become [`AlertLevel::Unknown`].

use std::sync::OnceLock;

use regex::Regex;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::{
    error::ParseError,
    model::{AlertLevel, GroundingSource, WeatherAlert, WeatherDataPoint, WeatherResponse},
    provider::RawCitation,
};

type Object = Map<String, Value>;

static TAGGED_FENCE_RE: OnceLock<Regex> = OnceLock::new();
static ANY_FENCE_RE: OnceLock<Regex> = OnceLock::new();

// Fences only open and close at the start of a line; inline ``` in prose is text.
fn tagged_fence_regex() -> &'static Regex {
    TAGGED_FENCE_RE.get_or_init(|| {
        Regex::new(r"(?ims)^[ \t]*```json[ \t]*\r?\n(.*?)^[ \t]*```")
            .expect("Failed to compile tagged fence regex")
    })
}

fn any_fence_regex() -> &'static Regex {
    ANY_FENCE_RE.get_or_init(|| {
        Regex::new(r"(?ms)^[ \t]*```[^\n`]*\r?\n(.*?)^[ \t]*```")
            .expect("Failed to compile fence regex")
    })
}

/// Where in the raw text the payload was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extraction {
    /// A ```json fenced block.
    TaggedFence,
    /// Any fenced block.
    AnyFence,
    /// The whole text is the payload.
    WholeText,
}

impl Extraction {
    pub const ORDER: [Extraction; 3] =
        [Extraction::TaggedFence, Extraction::AnyFence, Extraction::WholeText];

    fn extract(self, text: &str) -> Option<Object> {
        match self {
            Extraction::TaggedFence => first_object_in_fences(tagged_fence_regex(), text),
            Extraction::AnyFence => first_object_in_fences(any_fence_regex(), text),
            Extraction::WholeText => parse_object(text),
        }
    }
}

fn first_object_in_fences(re: &Regex, text: &str) -> Option<Object> {
    re.captures_iter(text)
        .filter_map(|caps| caps.get(1))
        .find_map(|body| parse_object(body.as_str()))
}

fn parse_object(candidate: &str) -> Option<Object> {
    match serde_json::from_str::<Value>(candidate.trim()) {
        Ok(Value::Object(object)) => Some(object),
        Ok(other) => {
            debug!(kind = value_kind(&other), "candidate payload is not a JSON object");
            None
        }
        Err(err) => {
            debug!(error = %err, "candidate payload is not valid JSON");
            None
        }
    }
}

/// Locate the structured payload in `raw_text`.
pub fn extract_payload(raw_text: &str) -> Result<(Extraction, Object), ParseError> {
    Extraction::ORDER
        .iter()
        .find_map(|strategy| strategy.extract(raw_text).map(|object| (*strategy, object)))
        .ok_or(ParseError::NoPayload)
}

/// Parse a model reply into a weather response.
///
/// Fails when no JSON object can be recovered or when none of its data
/// points are usable.
pub fn normalize(raw_text: &str, citations: &[RawCitation]) -> Result<WeatherResponse, ParseError> {
    let (strategy, payload) = extract_payload(raw_text)?;
    debug!(?strategy, "extracted structured payload");

    let data = repair_data(payload.get("data"))?;
    let alerts = payload.get("alerts").and_then(repair_alerts);

    Ok(WeatherResponse {
        location: string_field(&payload, "location").unwrap_or_default(),
        summary: string_field(&payload, "summary").unwrap_or_default(),
        alerts,
        data,
        grounding_sources: grounding_sources(citations),
    })
}

fn repair_data(value: Option<&Value>) -> Result<Vec<WeatherDataPoint>, ParseError> {
    let Some(entries) = value.and_then(Value::as_array) else {
        warn!("payload has no 'data' array");
        return Err(ParseError::NoUsableData { dropped: 0 });
    };

    let mut points = Vec::with_capacity(entries.len());
    let mut dropped = 0;

    for (index, entry) in entries.iter().enumerate() {
        match data_point(entry) {
            Some(point) => {
                if point.temp_high < point.temp_low {
                    debug!(index, label = %point.label, "tempHigh below tempLow, keeping as reported");
                }
                points.push(point);
            }
            None => {
                warn!(index, "dropping data point without label or temperatures");
                dropped += 1;
            }
        }
    }

    if points.is_empty() {
        return Err(ParseError::NoUsableData { dropped });
    }

    Ok(points)
}

fn data_point(entry: &Value) -> Option<WeatherDataPoint> {
    let fields = entry.as_object()?;

    let label = string_field(fields, "label").filter(|label| !label.trim().is_empty())?;
    let temp_high = number_field(fields, "tempHigh")?;
    let temp_low = number_field(fields, "tempLow")?;

    Some(WeatherDataPoint {
        date: string_field(fields, "date").unwrap_or_default(),
        label,
        temp_high,
        temp_low,
        precipitation: number_field(fields, "precipitation"),
        condition: string_field(fields, "condition").unwrap_or_default(),
        humidity: number_field(fields, "humidity"),
        description: string_field(fields, "description"),
    })
}

fn repair_alerts(value: &Value) -> Option<Vec<WeatherAlert>> {
    let entries = match value {
        Value::Null => return None,
        Value::Array(entries) => entries,
        other => {
            warn!(kind = value_kind(other), "ignoring 'alerts' that is not an array");
            return None;
        }
    };

    let alerts = entries
        .iter()
        .enumerate()
        .filter_map(|(index, entry)| {
            let Some(fields) = entry.as_object() else {
                warn!(index, "dropping alert that is not an object");
                return None;
            };

            let level = match fields.get("level") {
                Some(Value::String(level)) => AlertLevel::from(level.as_str()),
                _ => AlertLevel::Unknown,
            };

            Some(WeatherAlert {
                title: string_field(fields, "title").unwrap_or_default(),
                level,
                description: string_field(fields, "description").unwrap_or_default(),
            })
        })
        .collect();

    Some(alerts)
}

/// Keep citations that point at a web page, in the order given.
pub fn grounding_sources(citations: &[RawCitation]) -> Option<Vec<GroundingSource>> {
    let sources: Vec<GroundingSource> = citations
        .iter()
        .filter_map(|citation| {
            let web = citation.web.as_ref()?;
            let uri = web.uri.as_deref().map(str::trim).filter(|uri| !uri.is_empty())?;
            let title = web
                .title
                .as_deref()
                .map(str::trim)
                .filter(|title| !title.is_empty())
                .map(str::to_owned);

            Some(GroundingSource { uri: uri.to_owned(), title })
        })
        .collect();

    if sources.is_empty() { None } else { Some(sources) }
}

fn string_field(fields: &Object, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn number_field(fields: &Object, key: &str) -> Option<f64> {
    match fields.get(key)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
        _ => None,
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
