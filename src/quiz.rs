//! Quiz types and response coercion
//!
//! Models answer quiz prompts with free-form text that should
//! contain a JSON object. Coercion digs the object out, validates
//! it, and degrades to a flagged fallback quiz instead of failing.

use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// Quiz difficulty level
#[derive(
  Debug, Clone, Copy, PartialEq, Eq,
  Deserialize, Serialize
)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty
{   Easy
  , Medium
  , Hard
}

impl Default for Difficulty
{   fn default() -> Self
    {   Difficulty::Medium
    }
}

impl std::fmt::Display for Difficulty
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
      -> std::fmt::Result
    {   match self
        {   Difficulty::Easy => write!(f, "easy")
          , Difficulty::Medium => write!(f, "medium")
          , Difficulty::Hard => write!(f, "hard")
        }
    }
}

/// A single multiple-choice question
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QuizQuestion
{   /// Question text
    pub question: String
  , /// The four answer options
    pub options: Vec<String>
  , /// Zero-based index of the correct option
    pub correct: usize
  , /// Why the correct answer is correct
    pub explanation: String
}

/// A structured quiz produced from model output
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct QuizSpec
{   #[serde(default)]
    pub title: String
  , #[serde(default)]
    pub topic: String
  , #[serde(default)]
    pub difficulty: Difficulty
  , pub questions: Vec<QuizQuestion>
  , /// Set on the fallback quiz substituted after a failure
    #[serde(default)]
    pub error: bool
  , /// Message of the failure that forced the fallback
    #[serde(
      rename = "originalError"
    , skip_serializing_if = "Option::is_none"
    , default
    )]
    pub original_error: Option<String>
}

/// Coerce raw model output into a QuizSpec.
///
/// Total: malformed output yields the single-question fallback
/// quiz with `error: true`, never an error to the caller.
pub fn coerce_quiz(
  raw: &str
, topic: &str
, difficulty: Difficulty
) -> QuizSpec
{   match try_coerce(raw)
    {   Ok(quiz) => {
          debug!(
            "Coerced quiz with {} questions",
            quiz.questions.len()
          );
          quiz
        }
      , Err(e) => {
          warn!("Quiz coercion failed: {}", e);
          fallback_quiz(topic, difficulty, &e.to_string())
        }
    }
}

/// Parse and validate, surfacing the failure
fn try_coerce(raw: &str)
  -> Result<QuizSpec, crate::error::Error>
{   let candidate = extract_json_candidate(raw);

    let candidate = candidate
      .replace("```json", "")
      .replace("```", "");
    let candidate = candidate.trim();

    let quiz: QuizSpec = serde_json::from_str(candidate)
      .map_err(|e| {
        crate::error::Error::ParseError(e.to_string())
      })?;

    if quiz.questions.is_empty()
    {   return Err(crate::error::Error::ParseError(
          "Invalid quiz format".to_string()
        ));
    }

    Ok(quiz)
}

/// Greedy slice from the first `{` to the last `}`.
/// Falls back to the whole text when no braces are present.
fn extract_json_candidate(raw: &str) -> &str
{   match (raw.find('{'), raw.rfind('}'))
    {   (Some(start), Some(end)) if start < end => {
          &raw[start..=end]
        }
      , _ => raw
    }
}

/// The quiz substituted when generation or parsing fails
pub fn fallback_quiz(
  topic: &str
, difficulty: Difficulty
, original_error: &str
) -> QuizSpec
{   QuizSpec
    {   title: format!("Quiz about {}", topic)
      , topic: topic.to_string()
      , difficulty
      , questions: vec![
          QuizQuestion
          {   question: format!(
                "What is an important concept related to {}?",
                topic
              )
            , options: vec![
                "A) This is a generated fallback question"
                  .to_string()
              , "B) Due to AI processing error".to_string()
              , "C) Please try again".to_string()
              , "D) Or contact support".to_string()
              ]
            , correct: 0
            , explanation:
                "This is a fallback question due to an AI \
                 processing error. Please try generating the \
                 quiz again."
                  .to_string()
          }
        ]
      , error: true
      , original_error: Some(original_error.to_string())
    }
}
