use crate::{Config, error::TransportError, provider::gemini::GeminiTransport};
use async_trait::async_trait;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::fmt::Debug;

pub mod gemini;

/// What the core hands to the model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationRequest {
    pub prompt: String,
    /// Let the model run a live web search before answering.
    pub search_grounding: bool,
}

/// A citation chunk exactly as the provider reports it.
///
/// Every field is optional: providers emit chunks without a web reference
/// (`{}`), with `"web": null`, or with a reference missing its URI.
/// Fields of the wrong JSON type decode as absent instead of failing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCitation {
    #[serde(default, deserialize_with = "lenient_web")]
    pub web: Option<WebReference>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebReference {
    #[serde(default, deserialize_with = "lenient_string")]
    pub uri: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub title: Option<String>,
}

fn lenient_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => Some(s),
        _ => None,
    })
}

fn lenient_web<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<WebReference>, D::Error> {
    Ok(match Value::deserialize(deserializer)? {
        value @ Value::Object(_) => serde_json::from_value(value).ok(),
        _ => None,
    })
}

impl RawCitation {
    pub fn web(uri: impl Into<String>, title: Option<&str>) -> Self {
        Self {
            web: Some(WebReference { uri: Some(uri.into()), title: title.map(str::to_owned) }),
        }
    }

    /// Decode provider chunks one by one, skipping any that are not objects.
    pub fn from_chunks(chunks: Vec<Value>) -> Vec<RawCitation> {
        chunks.into_iter().filter_map(|chunk| serde_json::from_value(chunk).ok()).collect()
    }
}

/// Raw model output: free text plus any citations.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelReply {
    pub text: String,
    pub citations: Vec<RawCitation>,
}

#[async_trait]
pub trait ModelTransport: Send + Sync + Debug {
    async fn generate(&self, request: &GenerationRequest) -> Result<ModelReply, TransportError>;
}

/// Construct the transport described by the config.
pub fn transport_from_config(config: &Config) -> anyhow::Result<Box<dyn ModelTransport>> {
    let api_key = config.api_key()?;
    let transport = GeminiTransport::new(api_key)
        .with_model(config.model_name())
        .with_base_url(config.base_url());

    Ok(Box::new(transport))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;

    #[test]
    fn raw_citations_tolerate_missing_and_null_web() {
        let chunks: Vec<RawCitation> = serde_json::from_value(serde_json::json!([
            { "web": { "uri": "https://x.com", "title": "X" } },
            { "web": null },
            {},
            { "retrievedContext": { "uri": "gs://bucket/doc" } }
        ]))
        .unwrap();

        assert_eq!(chunks.len(), 4);
        assert_eq!(chunks[0], RawCitation::web("https://x.com", Some("X")));
        assert!(chunks[1].web.is_none());
        assert!(chunks[2].web.is_none());
        assert!(chunks[3].web.is_none());
    }

    #[test]
    fn raw_citations_tolerate_wrong_field_types() {
        let chunks = RawCitation::from_chunks(vec![
            serde_json::json!({ "web": { "uri": "https://a", "title": 5 } }),
            serde_json::json!("junk"),
            serde_json::json!({ "web": "https://b" }),
            serde_json::json!({ "web": { "uri": 7, "title": "No link" } }),
        ]);

        assert_eq!(
            chunks,
            vec![
                RawCitation::web("https://a", None),
                RawCitation { web: None },
                RawCitation {
                    web: Some(WebReference { uri: None, title: Some("No link".into()) })
                },
            ]
        );
    }

    #[test]
    fn transport_from_config_works_when_configured() {
        let mut cfg = Config::default();
        cfg.set_api_key("KEY".to_string());

        let transport = transport_from_config(&cfg);
        assert!(transport.is_ok());
    }
}
