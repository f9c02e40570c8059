//! Configuration for the EduFlow AI providers
//!
//! The core only reads this; loading and validation of the wider
//! application environment stays outside the crate.

use serde::{Deserialize, Serialize};

const DEFAULT_OLLAMA_ENDPOINT: &str = "http://localhost:11434";
const DEFAULT_OLLAMA_MODEL: &str = "gemma2:27b";
const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash-exp";
const DEFAULT_GEMINI_API_BASE: &str
  = "https://generativelanguage.googleapis.com";

/// Local Ollama server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OllamaConfig
{   /// Server base URL
    pub base_url: String
  , /// Default model name used for generation
    pub model: String
}

impl Default for OllamaConfig
{   fn default() -> Self
    {   OllamaConfig
        {   base_url: DEFAULT_OLLAMA_ENDPOINT.to_string()
          , model: DEFAULT_OLLAMA_MODEL.to_string()
        }
    }
}

/// Gemini API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiConfig
{   /// API key; a missing key leaves the client unconfigured
    pub api_key: Option<String>
  , /// Model identifier
    pub model: String
  , /// API base URL (if custom)
    pub api_base: Option<String>
}

impl GeminiConfig
{   pub fn new(api_key: Option<String>) -> Self
    {   GeminiConfig
        {   api_key
          , model: DEFAULT_GEMINI_MODEL.to_string()
          , api_base: None
        }
    }

    /// Effective base URL for API calls
    pub fn effective_api_base(&self) -> &str
    {   self.api_base
          .as_deref()
          .unwrap_or(DEFAULT_GEMINI_API_BASE)
    }
}

impl Default for GeminiConfig
{   fn default() -> Self
    {   GeminiConfig::new(None)
    }
}

/// Combined configuration for the hybrid AI layer
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AiConfig
{   pub ollama: OllamaConfig
  , pub gemini: GeminiConfig
}

impl AiConfig
{   /// Read configuration from the process environment.
    ///
    /// Recognized variables: `OLLAMA_ENDPOINT`, `OLLAMA_MODEL`,
    /// `GEMINI_API_KEY`. Unset variables keep their defaults; an
    /// empty `GEMINI_API_KEY` counts as unconfigured.
    pub fn from_env() -> Self
    {   let mut config = AiConfig::default();

        if let Ok(endpoint) = std::env::var("OLLAMA_ENDPOINT")
        {   if !endpoint.is_empty()
            {   config.ollama.base_url = endpoint;
            }
        }

        if let Ok(model) = std::env::var("OLLAMA_MODEL")
        {   if !model.is_empty()
            {   config.ollama.model = model;
            }
        }

        if let Ok(key) = std::env::var("GEMINI_API_KEY")
        {   if !key.is_empty()
            {   config.gemini.api_key = Some(key);
            }
        }

        config
    }
}
