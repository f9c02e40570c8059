//! Unified request and response types for eduflow-ai

use serde::{Deserialize, Serialize};

/// Unified generation request.
/// Immutable once issued.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationRequest
{   /// The prompt text
    pub prompt: String
  , /// Force a specific provider for this call
    #[serde(skip_serializing_if = "Option::is_none")]
    pub force_provider: Option<crate::Provider>
  , /// Temperature override for sampling
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>
  , /// Max tokens override
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>
}

impl GenerationRequest
{   /// Request with default sampling and automatic provider choice
    pub fn new(prompt: impl Into<String>) -> Self
    {   GenerationRequest
        {   prompt: prompt.into()
          , force_provider: None
          , temperature: None
          , max_tokens: None
        }
    }
}

/// Result of one completed generation call
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationResult
{   /// Generated text
    pub text: String
  , /// Provider that produced it
    pub provider: crate::Provider
  , /// Elapsed wall-clock time in milliseconds
    pub response_time_ms: u64
  , /// Tokens generated, when the provider reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tokens: Option<usize>
}

/// Terminal failure of a single call attempt
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GenerationFailure
{   /// Provider that errored
    pub provider: crate::Provider
  , /// Error message
    pub message: String
  , /// Machine-readable error code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>
}

impl GenerationFailure
{   /// Capture an error as a per-provider failure record
    pub fn from_error(
      provider: crate::Provider
    , error: &crate::error::Error
    ) -> Self
    {   GenerationFailure
        {   provider
          , message: error.to_string()
          , code: Some(error.code())
        }
    }

    /// Failure for a provider that was never attempted
    pub fn skipped(
      provider: crate::Provider
    , message: impl Into<String>
    ) -> Self
    {   GenerationFailure
        {   provider
          , message: message.into()
          , code: None
        }
    }
}

/// Reachability snapshot of both providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderAvailability
{   /// Gemini API key is configured
    pub gemini: bool
  , /// Local Ollama server answered the probe
    pub ollama: bool
  , /// Models the Ollama server advertises
    pub ollama_models: Vec<String>
}

/// Diagnostic status of a single provider
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProviderStatus
{   pub available: bool
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub models: Option<Vec<String>>
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub version: Option<String>
}

/// Full health report over both providers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport
{   pub gemini: ProviderStatus
  , pub ollama: ProviderStatus
}
