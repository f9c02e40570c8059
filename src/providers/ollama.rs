//! Local Ollama HTTP client
//!
//! Talks to a locally hosted Ollama server: model listing,
//! one-shot and streaming generation, chat-history flattening,
//! and model pulls. Availability is tracked with a plain flag
//! that is refreshed by probing `/api/tags`.

use log::{debug, trace, warn, error};
use serde::{Deserialize, Serialize};
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};

// ===== Wire Types =====

#[derive(Debug, Clone, Serialize)]
pub struct OllamaOptions
{   pub temperature: f32
  , pub top_k: u32
  , pub top_p: f32
  , pub repeat_penalty: f32
  , pub num_ctx: u32
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<usize>
}

impl Default for OllamaOptions
{   fn default() -> Self
    {   OllamaOptions
        {   temperature: 0.7
          , top_k: 40
          , top_p: 0.9
          , repeat_penalty: 1.1
          , num_ctx: 4096
          , num_predict: None
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct OllamaGenerateRequest
{   pub model: String
  , pub prompt: String
  , #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<Vec<i64>>
  , pub stream: bool
  , pub options: OllamaOptions
}

#[derive(Debug, Clone, Deserialize)]
pub struct OllamaGenerateResponse
{   #[serde(default)]
    pub response: String
  , #[serde(default)]
    pub done: bool
  , #[serde(default)]
    pub eval_count: Option<usize>
}

#[derive(Debug, Clone, Deserialize)]
pub struct OllamaStreamChunk
{   #[serde(default)]
    pub response: String
  , #[serde(default)]
    pub done: bool
}

#[derive(Debug, Clone, Deserialize)]
pub struct OllamaTagsResponse
{   #[serde(default)]
    pub models: Vec<OllamaModelTag>
}

#[derive(Debug, Clone, Deserialize)]
pub struct OllamaModelTag
{   pub name: String
}

#[derive(Debug, Clone, Serialize)]
pub struct OllamaPullRequest
{   pub name: String
  , pub stream: bool
}

#[derive(Debug, Clone, Deserialize)]
pub struct OllamaPullChunk
{   #[serde(default)]
    pub status: Option<String>
}

#[derive(Debug, Clone, Deserialize)]
pub struct OllamaVersionResponse
{   pub version: String
}

// ===== Ollama Client =====

/// Client for a locally hosted Ollama server
pub struct OllamaClient
{   base_url: String
  , model: Mutex<String>
  , available: AtomicBool
  , advertised: Mutex<Vec<String>>
  , http_client: reqwest::Client
}

impl OllamaClient
{   pub fn new(config: crate::config::OllamaConfig) -> Self
    {   debug!(
          "Creating OllamaClient for {}",
          config.base_url
        );
        OllamaClient
        {   base_url: config.base_url
          , model: Mutex::new(config.model)
          , available: AtomicBool::new(false)
          , advertised: Mutex::new(vec![])
          , http_client: reqwest::Client::new()
        }
    }

    /// Probe the server's tag listing and update the
    /// availability flag. Never errors.
    pub async fn check_availability(&self) -> bool
    {   debug!("Probing Ollama server at {}", self.base_url);

        let result = self.http_client
          .get(format!("{}/api/tags", self.base_url))
          .send()
          .await;

        let response = match result
        {   Ok(response) if response.status().is_success() => {
              response
            }
          , Ok(response) => {
              debug!(
                "Ollama probe got status: {}",
                response.status()
              );
              self.available.store(false, Ordering::Relaxed);
              return false;
            }
          , Err(e) => {
              debug!("Ollama server not available: {}", e);
              self.available.store(false, Ordering::Relaxed);
              return false;
            }
        };

        match response.json::<OllamaTagsResponse>().await
        {   Ok(tags) => {
              let names: Vec<String> = tags.models
                .iter()
                .map(|m| m.name.clone())
                .collect();

              let model = self.current_model();
              if !names.iter().any(|n| n == &model)
              {   warn!(
                    "Model {} not found. Available models: {:?}",
                    model, names
                  );
              }

              *relock(&self.advertised) = names;
              self.available.store(true, Ordering::Relaxed);
              debug!("Ollama server is available");
              true
            }
          , Err(e) => {
              debug!("Failed to parse tag listing: {}", e);
              self.available.store(false, Ordering::Relaxed);
              false
            }
        }
    }

    /// Fresh model listing; empty on any failure, never errors
    pub async fn models(&self) -> Vec<String>
    {   debug!("Fetching Ollama model list");

        let result = self.http_client
          .get(format!("{}/api/tags", self.base_url))
          .send()
          .await;

        match result
        {   Ok(response) if response.status().is_success() => {
              response
                .json::<OllamaTagsResponse>()
                .await
                .map(|tags| {
                  tags.models
                    .into_iter()
                    .map(|m| m.name)
                    .collect()
                })
                .unwrap_or_else(|e| {
                  error!("Error fetching models: {}", e);
                  vec![]
                })
            }
          , Ok(_) => vec![]
          , Err(e) => {
              error!("Error fetching models: {}", e);
              vec![]
            }
        }
    }

    /// Models advertised by the most recent successful probe
    pub fn advertised_models(&self) -> Vec<String>
    {   relock(&self.advertised).clone()
    }

    /// One-shot generation with default sampling
    pub async fn generate(
      &self
    , prompt: &str
    , context: Option<&[i64]>
    ) -> Result<String, crate::error::Error>
    {   let (text, _tokens) = self
          .generate_with(prompt, context, None, None)
          .await?;
        Ok(text)
    }

    /// One-shot generation with optional sampling overrides.
    /// Returns the text and the reported token count.
    pub async fn generate_with(
      &self
    , prompt: &str
    , context: Option<&[i64]>
    , temperature: Option<f32>
    , max_tokens: Option<usize>
    ) -> Result<(String, Option<usize>), crate::error::Error>
    {   self.ensure_available().await?;

        let response = self
          .send_generate(prompt, context, false,
            temperature, max_tokens)
          .await?;

        let data: OllamaGenerateResponse
          = response.json().await.map_err(|e| {
            error!("Error generating response: {}", e);
            crate::error::Error::ParseError(e.to_string())
          })?;

        Ok((data.response, data.eval_count))
    }

    /// Streaming generation: one item per chunk that carries
    /// non-empty text, in arrival order
    pub async fn generate_stream(
      &self
    , prompt: &str
    , context: Option<&[i64]>
    ) -> Result<crate::TextStream, crate::error::Error>
    {   self.ensure_available().await?;

        let response = self
          .send_generate(prompt, context, true, None, None)
          .await?;

        Ok(super::buffered_line_stream(response, |line| {
          match serde_json::from_str::<OllamaStreamChunk>(line)
          {   Ok(chunk) => {
                if chunk.done
                {   trace!("Ollama stream signalled done");
                }
                if chunk.response.is_empty()
                {   None
                } else
                {   Some(chunk.response)
                }
              }
            , Err(_) => {
                warn!("Failed to parse chunk: {}", line);
                None
              }
          }
        }))
    }

    /// Flatten chat history and generate a one-shot reply
    pub async fn chat(
      &self
    , messages: &[crate::ChatMessage]
    ) -> Result<String, crate::error::Error>
    {   let prompt = format_chat_prompt(messages);
        self.generate(&prompt, None).await
    }

    /// Flatten chat history and stream the reply
    pub async fn chat_stream(
      &self
    , messages: &[crate::ChatMessage]
    ) -> Result<crate::TextStream, crate::error::Error>
    {   let prompt = format_chat_prompt(messages);
        self.generate_stream(&prompt, None).await
    }

    /// Download a model; yields each status string the server
    /// reports during the pull
    pub async fn pull_model(
      &self
    , name: &str
    ) -> Result<crate::TextStream, crate::error::Error>
    {   debug!("Pulling Ollama model: {}", name);

        let request = OllamaPullRequest
        {   name: name.to_string()
          , stream: true
        };

        let response = self.http_client
          .post(format!("{}/api/pull", self.base_url))
          .header("Content-Type", "application/json")
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            error!("Error pulling model: {}", e);
            crate::error::Error::GenerationError(e.to_string())
          })?;

        let status = response.status();
        if !status.is_success()
        {   error!("Pull failed with status: {}", status);
            return Err(crate::error::Error::HttpError(
              status.as_u16()
            ));
        }

        Ok(super::buffered_line_stream(response, |line| {
          match serde_json::from_str::<OllamaPullChunk>(line)
          {   Ok(chunk) => chunk.status
            , Err(_) => {
                warn!("Failed to parse progress chunk: {}", line);
                None
              }
          }
        }))
    }

    /// Server version from `/api/version`; None on failure
    pub async fn server_version(&self) -> Option<String>
    {   let result = self.http_client
          .get(format!("{}/api/version", self.base_url))
          .send()
          .await;

        match result
        {   Ok(response) if response.status().is_success() => {
              response
                .json::<OllamaVersionResponse>()
                .await
                .map(|v| v.version)
                .ok()
            }
          , _ => None
        }
    }

    /// Availability flag from the most recent probe
    pub fn is_available(&self) -> bool
    {   self.available.load(Ordering::Relaxed)
    }

    /// Default model used by subsequent calls
    pub fn current_model(&self) -> String
    {   relock(&self.model).clone()
    }

    /// Change the default model for subsequent calls
    pub fn set_model(&self, name: impl Into<String>)
    {   let name = name.into();
        debug!("Switching Ollama model to: {}", name);
        *relock(&self.model) = name;
    }

    /// Re-probe when the flag is down; error when still down
    async fn ensure_available(
      &self
    ) -> Result<(), crate::error::Error>
    {   if self.is_available()
        {   return Ok(());
        }

        if self.check_availability().await
        {   return Ok(());
        }

        error!("Ollama server is not available");
        Err(crate::error::Error::ProviderUnavailable(
          "Ollama server is not available".to_string()
        ))
    }

    /// Issue a generate call; returns the raw HTTP response
    /// after the status check
    async fn send_generate(
      &self
    , prompt: &str
    , context: Option<&[i64]>
    , stream: bool
    , temperature: Option<f32>
    , max_tokens: Option<usize>
    ) -> Result<reqwest::Response, crate::error::Error>
    {   let mut options = OllamaOptions::default();
        if let Some(t) = temperature
        {   options.temperature = t;
        }
        options.num_predict = max_tokens;

        let request = OllamaGenerateRequest
        {   model: self.current_model()
          , prompt: prompt.to_string()
          , context: context.map(|c| c.to_vec())
          , stream
          , options
        };

        trace!("Ollama request: {:?}", request);

        let response = self.http_client
          .post(format!("{}/api/generate", self.base_url))
          .header("Content-Type", "application/json")
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            error!("Error generating response: {}", e);
            crate::error::Error::GenerationError(e.to_string())
          })?;

        let status = response.status();
        trace!("Ollama response status: {}", status);

        if !status.is_success()
        {   error!("Ollama returned status: {}", status);
            return Err(crate::error::Error::HttpError(
              status.as_u16()
            ));
        }

        Ok(response)
    }
}

/// A poisoned lock still holds usable state; recover the guard
fn relock<T>(m: &Mutex<T>) -> std::sync::MutexGuard<'_, T>
{   m.lock().unwrap_or_else(|e| e.into_inner())
}

/// Flatten an ordered chat history into a single prompt.
///
/// One `"{Label}: {content}\n\n"` block per message, then the
/// `"Assistant: "` primer the model completes from.
pub fn format_chat_prompt(
  messages: &[crate::ChatMessage]
) -> String
{   let mut prompt = String::new();

    for message in messages
    {   prompt.push_str(message.role.label());
        prompt.push_str(": ");
        prompt.push_str(&message.content);
        prompt.push_str("\n\n");
    }

    prompt.push_str("Assistant: ");
    prompt
}

#[cfg(test)]
mod tests
{   use super::*;

    #[test]
    fn test_locks_recover_after_poison()
    {   let client = OllamaClient::new(
          crate::config::OllamaConfig::default()
        );

        let poisoned = std::panic::catch_unwind(
          std::panic::AssertUnwindSafe(|| {
            let _guard = client.model.lock().unwrap();
            panic!("poison the model lock");
          })
        );
        assert!(poisoned.is_err());

        assert_eq!(client.current_model(), "gemma2:27b");
        client.set_model("llama3:8b");
        assert_eq!(client.current_model(), "llama3:8b");

        let poisoned = std::panic::catch_unwind(
          std::panic::AssertUnwindSafe(|| {
            let _guard = client.advertised.lock().unwrap();
            panic!("poison the advertised lock");
          })
        );
        assert!(poisoned.is_err());

        assert!(client.advertised_models().is_empty());
    }
}
