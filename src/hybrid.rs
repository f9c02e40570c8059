//! Hybrid orchestrator: selection, fallback
//!
//! Wraps the Gemini and Ollama clients behind one surface.
//! A call picks a provider per the preference policy, and a
//! failed one-shot call gets exactly one fallback attempt on
//! the other provider. Streaming calls never fall back: once
//! partial output reached the caller, switching providers
//! behind their back would corrupt the transcript.

use log::{debug, info, error};
use std::time::Instant;

use crate::error::Error;
use crate::providers::{GeminiClient, OllamaClient};
use crate::quiz::{Difficulty, QuizSpec};
use crate::request::{
  GenerationFailure, GenerationRequest, GenerationResult,
  HealthReport, ProviderAvailability, ProviderStatus,
};
use crate::{Provider, ProviderPreference, TextStream};

/// What to extract from study material
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalysisType
{   Summary
  , KeyPoints
  , Concepts
}

/// Target length of a summary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SummaryLength
{   Short
  , Medium
  , Long
}

impl SummaryLength
{   fn instruction(&self) -> &'static str
    {   match self
        {   SummaryLength::Short => "in 2-3 sentences"
          , SummaryLength::Medium => "in 1-2 paragraphs"
          , SummaryLength::Long => "in 3-4 paragraphs"
        }
    }
}

/// Audience level for a concept explanation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExplanationLevel
{   Beginner
  , Intermediate
  , Advanced
}

impl ExplanationLevel
{   fn label(&self) -> &'static str
    {   match self
        {   ExplanationLevel::Beginner => "beginner"
          , ExplanationLevel::Intermediate => "intermediate"
          , ExplanationLevel::Advanced => "advanced"
        }
    }
}

/// Orchestrator over both AI providers.
///
/// Owned by the application's composition root and passed by
/// reference to consumers; no global instance exists.
pub struct HybridClient
{   gemini: GeminiClient
  , ollama: OllamaClient
  , preference: ProviderPreference
}

impl HybridClient
{   pub fn new(
      gemini: GeminiClient
    , ollama: OllamaClient
    ) -> Self
    {   debug!("Creating HybridClient");
        HybridClient
        {   gemini
          , ollama
          , preference: ProviderPreference::default()
        }
    }

    /// Build both clients from one configuration
    pub fn from_config(config: crate::config::AiConfig) -> Self
    {   HybridClient::new(
          GeminiClient::new(config.gemini),
          OllamaClient::new(config.ollama)
        )
    }

    pub fn preference(&self) -> ProviderPreference
    {   self.preference
    }

    pub fn set_preference(
      &mut self
    , preference: ProviderPreference
    )
    {   debug!("Setting preference to {:?}", preference);
        self.preference = preference;
    }

    /// The wrapped local client, for model management
    pub fn ollama(&self) -> &OllamaClient
    {   &self.ollama
    }

    /// The wrapped Gemini client
    pub fn gemini(&self) -> &GeminiClient
    {   &self.gemini
    }

    /// Pick the provider for one call.
    ///
    /// A forced provider wins unconditionally. Under `Auto`,
    /// when both providers are usable the local one is chosen;
    /// keeping data on the local network is the product's
    /// default over raw model quality.
    pub async fn select_provider(
      &self
    , force: Option<Provider>
    ) -> Result<Provider, Error>
    {   if let Some(provider) = force
        {   debug!("Provider forced: {}", provider);
            return Ok(provider);
        }

        match self.preference
        {   ProviderPreference::Gemini => {
              if self.gemini.is_configured()
              {   Ok(Provider::Gemini)
              } else
              {   Ok(Provider::Ollama)
              }
            }
          , ProviderPreference::Ollama => {
              if self.ollama.check_availability().await
              {   Ok(Provider::Ollama)
              } else
              {   Ok(Provider::Gemini)
              }
            }
          , ProviderPreference::Auto => {
              let ollama_up
                = self.ollama.check_availability().await;
              let gemini_ok = self.gemini.is_configured();

              if ollama_up && gemini_ok
              {   Ok(Provider::Ollama)
              } else if gemini_ok
              {   Ok(Provider::Gemini)
              } else if ollama_up
              {   Ok(Provider::Ollama)
              } else
              {   error!("No AI models available");
                  Err(Error::NoProviderAvailable)
              }
            }
        }
    }

    /// Generate text from a prompt, with one fallback attempt
    pub async fn generate_text(
      &self
    , prompt: &str
    , force: Option<Provider>
    ) -> Result<GenerationResult, Error>
    {   let mut request = GenerationRequest::new(prompt);
        request.force_provider = force;
        self.generate(&request).await
    }

    /// Generate text for a full request, honoring its sampling
    /// overrides, with one fallback attempt
    pub async fn generate(
      &self
    , request: &GenerationRequest
    ) -> Result<GenerationResult, Error>
    {   let start = Instant::now();
        let selected = self
          .select_provider(request.force_provider)
          .await?;

        debug!("Generating with {}", selected);

        let primary_error = match self
          .dispatch(selected, request)
          .await
        {   Ok((text, tokens)) => {
              return Ok(GenerationResult
              {   text
                , provider: selected
                , response_time_ms: elapsed_ms(start)
                , tokens
              });
            }
          , Err(e) => e
        };

        error!("Error with {}: {}", selected, primary_error);
        let primary = GenerationFailure::from_error(
          selected, &primary_error
        );

        let fallback = selected.other();
        let fallback_usable = match fallback
        {   Provider::Gemini => self.gemini.is_configured()
          , Provider::Ollama => {
              self.ollama.check_availability().await
            }
        };

        if !fallback_usable
        {   let reason = match fallback
            {   Provider::Gemini => "API key not configured"
              , Provider::Ollama => "Server not available"
            };
            error!(
              "Fallback {} unusable: {}",
              fallback, reason
            );
            return Err(Error::BothProvidersFailed
            {   primary
              , fallback: GenerationFailure::skipped(
                  fallback, reason
                )
            });
        }

        match self.dispatch(fallback, request).await
        {   Ok((text, tokens)) => {
              info!("Fallback to {} successful", fallback);
              Ok(GenerationResult
              {   text
                , provider: fallback
                , response_time_ms: elapsed_ms(start)
                , tokens
              })
            }
          , Err(fallback_error) => {
              error!(
                "Fallback {} failed: {}",
                fallback, fallback_error
              );
              Err(Error::BothProvidersFailed
              {   primary
                , fallback: GenerationFailure::from_error(
                    fallback, &fallback_error
                  )
              })
            }
        }
    }

    /// Streaming generation through the selected provider.
    ///
    /// Returns which provider was selected together with the
    /// fragment stream. Failures propagate immediately; there
    /// is no fallback for streams.
    pub async fn generate_text_stream(
      &self
    , prompt: &str
    , force: Option<Provider>
    ) -> Result<(Provider, TextStream), Error>
    {   let selected = self.select_provider(force).await?;
        debug!("Streaming with {}", selected);

        let stream = match selected
        {   Provider::Gemini => {
              self.gemini.generate_stream(prompt).await?
            }
          , Provider::Ollama => {
              self.ollama
                .generate_stream(prompt, None)
                .await?
            }
        };

        Ok((selected, stream))
    }

    // ===== Educational Operations =====

    /// Generate a multiple-choice quiz.
    ///
    /// Total: generation or coercion failure yields the
    /// fallback quiz flagged with `error: true`, never an Err.
    pub async fn generate_quiz(
      &self
    , topic: &str
    , difficulty: Difficulty
    , question_count: usize
    ) -> QuizSpec
    {   let prompt = quiz_prompt(
          topic, difficulty, question_count
        );

        match self.generate_text(&prompt, None).await
        {   Ok(result) => {
              crate::quiz::coerce_quiz(
                &result.text, topic, difficulty
              )
            }
          , Err(e) => {
              error!("Error generating quiz: {}", e);
              crate::quiz::fallback_quiz(
                topic, difficulty, &e.to_string()
              )
            }
        }
    }

    /// Summarize, list key points of, or name the concepts in
    /// a piece of study material
    pub async fn analyze_study_material(
      &self
    , text: &str
    , analysis_type: AnalysisType
    ) -> Result<GenerationResult, Error>
    {   let prompt = match analysis_type
        {   AnalysisType::Summary => format!(
              "Please provide a comprehensive summary of the \
               following study material. Focus on the main \
               ideas, key concepts, and important details:\
               \n\n{}\n\nSummary:",
              text
            )
          , AnalysisType::KeyPoints => format!(
              "Extract the key points from the following \
               study material as a bullet list:\
               \n\n{}\n\nKey Points:",
              text
            )
          , AnalysisType::Concepts => format!(
              "Identify and explain the main concepts from \
               the following study material:\
               \n\n{}\n\nMain Concepts:",
              text
            )
        };

        self.generate_text(&prompt, None).await
    }

    /// Answer a question against provided context
    pub async fn answer_question(
      &self
    , question: &str
    , context: &str
    ) -> Result<GenerationResult, Error>
    {   let prompt = format!(
          "Based on the following context, please answer the \
           question accurately and completely. If the answer \
           is not clearly available in the context, please \
           say so.\n\nContext:\n{}\n\nQuestion: {}\n\nAnswer:",
          context, question
        );

        self.generate_text(&prompt, None).await
    }

    /// Personalized study plan for a student profile
    pub async fn generate_study_recommendations(
      &self
    , subject: &str
    , current_level: &str
    , goals: &str
    , time_available: &str
    ) -> Result<GenerationResult, Error>
    {   let prompt = format!(
          "As an educational AI tutor, please create \
           personalized study recommendations for a student \
           with the following profile:\n\n\
           Subject: {}\n\
           Current Level: {}\n\
           Goals: {}\n\
           Time Available: {}\n\n\
           Please provide:\n\
           1. Specific study plan with timeline\n\
           2. Recommended resources and materials\n\
           3. Key topics to focus on\n\
           4. Study techniques that would be most effective\n\
           5. Milestones and progress checkpoints\n\n\
           Study Recommendations:",
          subject, current_level, goals, time_available
        );

        self.generate_text(&prompt, None).await
    }

    /// Summarize free text at the requested length
    pub async fn summarize_text(
      &self
    , text: &str
    , length: SummaryLength
    ) -> Result<GenerationResult, Error>
    {   let prompt = format!(
          "Please summarize the following text {}. Focus on \
           the key concepts and main ideas:\
           \n\n{}\n\nSummary:",
          length.instruction(), text
        );

        self.generate_text(&prompt, None).await
    }

    /// Explain a concept at the requested audience level
    pub async fn explain_concept(
      &self
    , concept: &str
    , level: ExplanationLevel
    ) -> Result<GenerationResult, Error>
    {   let prompt = format!(
          "Explain the concept of \"{}\" at a {} level. \n\
           Provide a clear, educational explanation with \
           examples if helpful. \n\
           Make it engaging and easy to understand.\
           \n\nExplanation:",
          concept, level.label()
        );

        self.generate_text(&prompt, None).await
    }

    // ===== Diagnostics =====

    /// Reachability snapshot of both providers; never errors
    pub async fn available_models(
      &self
    ) -> ProviderAvailability
    {   let ollama_up
          = self.ollama.check_availability().await;
        let ollama_models = if ollama_up
        {   self.ollama.advertised_models()
        } else
        {   vec![]
        };

        ProviderAvailability
        {   gemini: self.gemini.is_configured()
          , ollama: ollama_up
          , ollama_models
        }
    }

    /// Live diagnostic probe of both providers.
    ///
    /// The Gemini side issues a tiny real generation; the
    /// Ollama side reports availability, models, and server
    /// version. Provider failures land in the report, never
    /// as an Err.
    pub async fn health_check(&self) -> HealthReport
    {   debug!("Running health check");

        let mut gemini = ProviderStatus::default();
        if self.gemini.is_configured()
        {   match self.gemini.generate("Test").await
            {   Ok(_) => {
                  gemini.available = true;
                }
              , Err(e) => {
                  gemini.error = Some(e.to_string());
                }
            }
        } else
        {   gemini.error
              = Some("API key not configured".to_string());
        }

        let mut ollama = ProviderStatus::default();
        if self.ollama.check_availability().await
        {   ollama.available = true;
            ollama.models = Some(self.ollama.models().await);
            ollama.version
              = self.ollama.server_version().await;
        } else
        {   ollama.error
              = Some("Server not available".to_string());
        }

        HealthReport
        {   gemini
          , ollama
        }
    }

    /// Route one attempt to the right provider
    async fn dispatch(
      &self
    , provider: Provider
    , request: &GenerationRequest
    ) -> Result<(String, Option<usize>), Error>
    {   match provider
        {   Provider::Gemini => {
              let text = self.gemini
                .generate_with(
                  &request.prompt,
                  request.temperature,
                  request.max_tokens
                )
                .await?;
              Ok((text, None))
            }
          , Provider::Ollama => {
              self.ollama
                .generate_with(
                  &request.prompt,
                  None,
                  request.temperature,
                  request.max_tokens
                )
                .await
            }
        }
    }
}

fn elapsed_ms(start: Instant) -> u64
{   start.elapsed().as_millis() as u64
}

/// Deterministic quiz-generation instruction
fn quiz_prompt(
  topic: &str
, difficulty: Difficulty
, question_count: usize
) -> String
{   format!(
      "Create an educational quiz about \"{topic}\" with \
       {count} multiple-choice questions at {difficulty} \
       difficulty level.\n\n\
       Format the response as valid JSON:\n\
       {{\n\
         \"title\": \"Quiz about {topic}\",\n\
         \"topic\": \"{topic}\",\n\
         \"difficulty\": \"{difficulty}\",\n\
         \"questions\": [\n\
           {{\n\
             \"question\": \"Question text here\",\n\
             \"options\": [\"A) First option\", \"B) Second \
       option\", \"C) Third option\", \"D) Fourth option\"],\n\
             \"correct\": 0,\n\
             \"explanation\": \"Detailed explanation of why \
       this answer is correct\"\n\
           }}\n\
         ]\n\
       }}\n\n\
       Requirements:\n\
       - Exactly {count} questions\n\
       - Educational and accurate content\n\
       - Clear, unambiguous questions\n\
       - Plausible distractors in wrong answers\n\
       - Helpful explanations",
      topic = topic,
      count = question_count,
      difficulty = difficulty
    )
}
