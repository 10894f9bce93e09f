//! Failure types for a single weather fetch.

use thiserror::Error;

/// The request to the upstream model failed or was rejected.
#[derive(Error, Debug)]
pub enum TransportError {
    #[error("Model request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("Model request failed with status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Failed to decode model response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// The model's reply could not be turned into a weather response.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("No recoverable structured payload in model response")]
    NoPayload,

    #[error("Structured payload contained no usable data points ({dropped} dropped)")]
    NoUsableData { dropped: usize },
}

#[derive(Error, Debug)]
pub enum WeatherError {
    #[error(transparent)]
    Transport(#[from] TransportError),

    #[error(transparent)]
    Parse(#[from] ParseError),
}

impl WeatherError {
    /// Message suitable for end users; details stay in the logs.
    pub fn user_message(&self) -> &'static str {
        "Unable to fetch weather data, please try again later."
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse(_))
    }
}

pub(crate) fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...", &body[..end])
    } else {
        body.to_string()
    }
}
