//! Core library for the `skycast` weather client.
//!
//! Weather data comes from a generative language model with live search
//! grounding. This crate defines:
//! - Shared domain models (queries, granularities, responses)
//! - Prompt construction for each granularity
//! - Extraction and repair of the JSON payload embedded in model output
//! - The transport abstraction and its Gemini implementation
//! - Configuration & credentials handling
//!
//! It is used by `skycast-cli`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod location;
pub mod model;
pub mod normalize;
pub mod prompt;
pub mod provider;
pub mod service;

pub use config::{Config, ModelConfig};
pub use error::{ParseError, TransportError, WeatherError};
pub use location::LocationState;
pub use model::{
    AlertLevel, Granularity, GroundingSource, LocationQuery, WeatherAlert, WeatherDataPoint,
    WeatherRequest, WeatherResponse,
};
pub use normalize::normalize;
pub use prompt::{PromptBuilder, build_prompt};
pub use provider::{GenerationRequest, ModelReply, ModelTransport, RawCitation};
pub use service::WeatherService;
