use std::fmt;

/// Custom error type for eduflow-ai operations
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error
{   /// Local Ollama server unreachable or probe failed
    ProviderUnavailable(String)
  , /// Remote provider API key is missing
    ProviderUnconfigured(String)
  , /// Non-success HTTP status from either provider
    HttpError(u16)
  , /// Provider-specific generation failure
    GenerationError(String)
  , /// Failed to parse a provider response or quiz JSON
    ParseError(String)
  , /// Neither provider is configured or reachable
    NoProviderAvailable
  , /// Primary and fallback provider both failed
    BothProvidersFailed
    {   primary: crate::request::GenerationFailure
      , fallback: crate::request::GenerationFailure
    }
  , /// Generic error
    Other(String)
}

impl Error
{   /// Short machine-readable code for this error
    pub fn code(&self) -> String
    {   match self
        {   Error::ProviderUnavailable(_) => {
              "unavailable".to_string()
            }
          , Error::ProviderUnconfigured(_) => {
              "unconfigured".to_string()
            }
          , Error::HttpError(status) => {
              format!("http_{}", status)
            }
          , Error::GenerationError(_) => {
              "generation".to_string()
            }
          , Error::ParseError(_) => {
              "parse".to_string()
            }
          , Error::NoProviderAvailable => {
              "no_provider".to_string()
            }
          , Error::BothProvidersFailed { .. } => {
              "both_failed".to_string()
            }
          , Error::Other(_) => {
              "other".to_string()
            }
        }
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::ProviderUnavailable(msg) => {
              write!(f, "Provider not available: {}", msg)
            }
          , Error::ProviderUnconfigured(provider) => {
              write!(f,
                "Provider not configured: {}",
                provider
              )
            }
          , Error::HttpError(status) => {
              write!(f, "HTTP error! status: {}", status)
            }
          , Error::GenerationError(msg) => {
              write!(f, "Generation error: {}", msg)
            }
          , Error::ParseError(msg) => {
              write!(f, "Parse error: {}", msg)
            }
          , Error::NoProviderAvailable => {
              write!(f, "No AI models available")
            }
          , Error::BothProvidersFailed { primary, fallback } => {
              write!(f,
                "Both AI models failed. {}: {}, {}: {}",
                primary.provider,
                primary.message,
                fallback.provider,
                fallback.message
              )
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<String> for Error
{   fn from(s: String) -> Self
    {   Error::Other(s)
    }
}

impl From<&str> for Error
{   fn from(s: &str) -> Self
    {   Error::Other(s.to_string())
    }
}
