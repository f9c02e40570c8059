//! Gemini HTTP client
//!
//! Talks to the Google Generative Language API. A missing API
//! key leaves the client unconfigured instead of failing at
//! construction; every call then errors with
//! `ProviderUnconfigured`.

use log::{debug, trace, warn, error};
use serde::{Deserialize, Serialize};

// ===== Wire Types =====

#[derive(Debug, Clone, Serialize)]
pub struct GeminiRequest
{   pub contents: Vec<GeminiContent>
  , #[serde(rename = "generationConfig")]
    pub generation_config: GeminiGenerationConfig
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiContent
{   #[serde(default)]
    pub parts: Vec<GeminiPart>
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeminiPart
{   #[serde(default)]
    pub text: Option<String>
}

#[derive(Debug, Clone, Serialize)]
pub struct GeminiGenerationConfig
{   pub temperature: f32
  , #[serde(rename = "topK")]
    pub top_k: u32
  , #[serde(rename = "topP")]
    pub top_p: f32
  , #[serde(rename = "maxOutputTokens")]
    pub max_output_tokens: usize
}

impl Default for GeminiGenerationConfig
{   fn default() -> Self
    {   GeminiGenerationConfig
        {   temperature: 0.7
          , top_k: 40
          , top_p: 0.95
          , max_output_tokens: 8192
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiResponse
{   #[serde(default)]
    pub candidates: Vec<GeminiCandidate>
}

#[derive(Debug, Clone, Deserialize)]
pub struct GeminiCandidate
{   #[serde(default)]
    pub content: Option<GeminiContent>
}

impl GeminiResponse
{   /// Concatenated text of the first candidate's parts
    fn text(&self) -> String
    {   let mut text = String::new();
        if let Some(candidate) = self.candidates.first()
        {   if let Some(content) = &candidate.content
            {   for part in &content.parts
                {   if let Some(t) = &part.text
                    {   text.push_str(t);
                    }
                }
            }
        }
        text
    }
}

// ===== Gemini Client =====

/// Client for the Gemini generation API
pub struct GeminiClient
{   api_key: Option<String>
  , model: String
  , api_base: String
  , http_client: reqwest::Client
}

impl GeminiClient
{   pub fn new(config: crate::config::GeminiConfig) -> Self
    {   if config.api_key.is_none()
        {   warn!("Gemini API key not found");
        }
        let api_base
          = config.effective_api_base().to_string();
        GeminiClient
        {   api_key: config.api_key
              .filter(|k| !k.is_empty())
          , model: config.model
          , api_base
          , http_client: reqwest::Client::new()
        }
    }

    /// Whether an API key is present
    pub fn is_configured(&self) -> bool
    {   self.api_key.is_some()
    }

    /// Model identifier calls are issued against
    pub fn model(&self) -> &str
    {   &self.model
    }

    /// One-shot generation with default sampling
    pub async fn generate(
      &self
    , prompt: &str
    ) -> Result<String, crate::error::Error>
    {   self.generate_with(prompt, None, None).await
    }

    /// One-shot generation with optional sampling overrides
    pub async fn generate_with(
      &self
    , prompt: &str
    , temperature: Option<f32>
    , max_tokens: Option<usize>
    ) -> Result<String, crate::error::Error>
    {   let response = self
          .send_generate(
            prompt,
            "generateContent",
            temperature,
            max_tokens
          )
          .await?;

        let data: GeminiResponse
          = response.json().await.map_err(|e| {
            error!("Failed to parse Gemini response: {}", e);
            crate::error::Error::ParseError(e.to_string())
          })?;

        let text = data.text();
        if text.is_empty()
        {   error!("Gemini returned an empty response");
            return Err(crate::error::Error::GenerationError(
              "Gemini returned an empty response".to_string()
            ));
        }

        Ok(text)
    }

    /// Streaming generation: one item per non-empty text
    /// fragment, in arrival order
    pub async fn generate_stream(
      &self
    , prompt: &str
    ) -> Result<crate::TextStream, crate::error::Error>
    {   let response = self
          .send_generate(
            prompt,
            "streamGenerateContent?alt=sse",
            None,
            None
          )
          .await?;

        Ok(super::buffered_line_stream(response, |line| {
          let data = line.strip_prefix("data:")?.trim();
          match serde_json::from_str::<GeminiResponse>(data)
          {   Ok(event) => {
                let text = event.text();
                if text.is_empty()
                {   None
                } else
                {   Some(text)
                }
              }
            , Err(_) => {
                warn!("Failed to parse stream event: {}", data);
                None
              }
          }
        }))
    }

    /// Issue a generation call; returns the raw HTTP response
    /// after the status check
    async fn send_generate(
      &self
    , prompt: &str
    , method: &str
    , temperature: Option<f32>
    , max_tokens: Option<usize>
    ) -> Result<reqwest::Response, crate::error::Error>
    {   let api_key = self.api_key.as_ref().ok_or_else(|| {
          error!("Gemini API key not configured");
          crate::error::Error::ProviderUnconfigured(
            "gemini".to_string()
          )
        })?;

        let mut generation_config
          = GeminiGenerationConfig::default();
        if let Some(t) = temperature
        {   generation_config.temperature = t;
        }
        if let Some(m) = max_tokens
        {   generation_config.max_output_tokens = m;
        }

        let request = GeminiRequest
        {   contents: vec![
              GeminiContent
              {   parts: vec![
                    GeminiPart
                    {   text: Some(prompt.to_string())
                    }
                  ]
              }
            ]
          , generation_config
        };

        trace!("Gemini request: {:?}", request);

        let url = format!(
          "{}/v1beta/models/{}:{}",
          self.api_base, self.model, method
        );
        debug!("Calling Gemini model: {}", self.model);

        let response = self.http_client
          .post(url)
          .header("x-goog-api-key", api_key)
          .header("Content-Type", "application/json")
          .json(&request)
          .send()
          .await
          .map_err(|e| {
            error!("Gemini request failed: {}", e);
            crate::error::Error::GenerationError(e.to_string())
          })?;

        let status = response.status();
        trace!("Gemini response status: {}", status);

        if !status.is_success()
        {   let error_text = response.text().await
              .unwrap_or_else(|_|
                "Unknown error".to_string()
              );
            error!("Gemini API error: {}", error_text);
            return Err(crate::error::Error::HttpError(
              status.as_u16()
            ));
        }

        Ok(response)
    }
}
