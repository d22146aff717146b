//! Structured generation with bounded repair
//!
//! Renders a prompt, asks the chat model for a schema-conforming completion,
//! and on validation failure performs exactly one repair round-trip: the
//! failed completion and the parser's complaint are sent back to the model
//! at default temperature. A second failure propagates as a generation
//! error; there is no third attempt.

use crate::error::AppError;
use crate::generation::schemas::StructuredOutput;
use crate::generation::template::PromptTemplate;
use crate::llm::ChatModel;
use std::marker::PhantomData;

/// Temperature for the first attempt, favoring diverse outputs
const CREATIVE_TEMPERATURE: f32 = 1.0;

/// Generator producing one validated instance of schema `T` per call
pub struct StructuredGenerator<T> {
    template: PromptTemplate,
    lang: String,
    _schema: PhantomData<T>,
}

impl<T: StructuredOutput> StructuredGenerator<T> {
    /// Create a generator for the given template and target language
    pub fn new(template: PromptTemplate, lang: &str) -> Self {
        Self {
            template,
            lang: lang.to_string(),
            _schema: PhantomData,
        }
    }

    /// Produce one populated, validated instance of `T`.
    ///
    /// Two-attempt state machine: attempt 1 at creative temperature; on
    /// schema violation, attempt 2 with the repair prompt at default
    /// temperature; on a second violation the error is terminal.
    pub async fn generate(
        &self,
        chat: &dyn ChatModel,
        params: &[(&str, &str)],
    ) -> Result<T, AppError> {
        let rendered = self.template.render(params)?;
        let prompt = format!(
            "{}\nAnswer in this language: {}, and follow this format:\n{}",
            rendered,
            self.lang,
            T::format_instructions()
        );

        let completion = chat.generate(&prompt, Some(CREATIVE_TEMPERATURE)).await?;
        match T::parse(&completion) {
            Ok(value) => Ok(value),
            Err(parse_err) => {
                tracing::warn!(
                    error = %parse_err,
                    "Structured output failed validation, attempting repair"
                );
                let repair = repair_prompt(&prompt, &completion, &parse_err.to_string());
                let second = chat.generate(&repair, None).await?;
                T::parse(&second).map_err(|e| {
                    AppError::Generation(format!(
                        "structured output failed validation after repair: {}",
                        e
                    ))
                })
            }
        }
    }
}

/// Build the repair prompt from the original prompt, the failed completion,
/// and the parser's error description.
pub fn repair_prompt(prompt: &str, completion: &str, error: &str) -> String {
    format!(
        "Prompt:\n{}\nCompletion:\n{}\n\
         Above, the Completion did not satisfy the constraints given in the Prompt.\n\
         Details: {}\nPlease try again:",
        prompt, completion, error
    )
}
