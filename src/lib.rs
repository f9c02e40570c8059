pub mod error;
pub mod config;
pub mod providers;
pub mod request;
pub mod quiz;
pub mod hybrid;
use serde::{Deserialize, Serialize};

/*

eduflow-ai is the AI layer of EduFlow: one client for the cloud
Gemini API, one client for a locally hosted Ollama server, and a
hybrid orchestrator that picks between them and falls back to the
other one when a call fails.

eduflow-ai/
├── Cargo.toml          # Main manifest
├── src/
│   ├── lib.rs          # Re-exports and shared types
│   ├── error.rs        # Custom error types and handling
│   ├── config.rs       # Configuration for both providers
│   ├── request.rs      # Unified request/response types
│   ├── quiz.rs         # Quiz types + response coercion
│   ├── hybrid.rs       # Orchestrator: selection, fallback
│   └── providers/      # Provider-specific implementations
│       ├── mod.rs      # Re-exports all providers
│       ├── ollama.rs   # Local Ollama HTTP client
│       └── gemini.rs   # Gemini HTTP client
└── tests/              # Integration and unit tests

*/

/// EDUFLOW-AI SHARED STRUCTURES:

/// Streaming text fragments from a provider.
/// Cancel by dropping the stream.
pub type TextStream
  = std::pin::Pin<Box<
      dyn futures_util::Stream<
        Item = Result<String, crate::error::Error>
      > + Send
    >>;

/// Enum of the two generation providers EduFlow talks to.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Hash,
  Deserialize, Serialize
)]
#[serde(rename_all = "lowercase")]
pub enum Provider
{   /// Google Gemini (cloud API)
    Gemini
  , /// Locally hosted Ollama server
    Ollama
}

impl Provider
{   /// The other provider, used for fallback
    pub fn other(&self) -> Provider
    {   match self
        {   Provider::Gemini => Provider::Ollama
          , Provider::Ollama => Provider::Gemini
        }
    }
}

impl std::fmt::Display for Provider
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
      -> std::fmt::Result
    {   match self
        {   Provider::Gemini => write!(f, "gemini")
          , Provider::Ollama => write!(f, "ollama")
        }
    }
}

/// Which provider the orchestrator should lean towards
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
  Deserialize, Serialize
)]
#[serde(rename_all = "lowercase")]
pub enum ProviderPreference
{   /// Always try Gemini first
    Gemini
  , /// Always try the local Ollama server first
    Ollama
  , /// Pick automatically (local wins when both are usable)
    Auto
}

impl Default for ProviderPreference
{   fn default() -> Self
    {   ProviderPreference::Auto
    }
}

/// Role of a chat message author
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
  Deserialize, Serialize
)]
#[serde(rename_all = "lowercase")]
pub enum Role
{   System
  , User
  , Assistant
}

impl Role
{   /// Capitalized label used in flattened transcripts
    pub fn label(&self) -> &'static str
    {   match self
        {   Role::System => "System"
          , Role::User => "User"
          , Role::Assistant => "Assistant"
        }
    }
}

/// A single message of a conversation history
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct ChatMessage
{   pub role: Role
  , pub content: String
}

impl ChatMessage
{   pub fn new(role: Role, content: impl Into<String>) -> Self
    {   ChatMessage
        {   role
          , content: content.into()
        }
    }
}
