//! Prompt templates
//!
//! Named-placeholder substitution with required-parameter checking. A
//! template declares which placeholders it needs; rendering with a missing
//! parameter is a hard error rather than a silently unfilled prompt.

use crate::error::AppError;
use anyhow::anyhow;

/// A prompt template with `{name}` placeholders
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    template: String,
    required: Vec<String>,
}

impl PromptTemplate {
    /// Create a template requiring the given placeholder names
    pub fn new(template: impl Into<String>, required: &[&str]) -> Self {
        Self {
            template: template.into(),
            required: required.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Substitute every `{name}` placeholder with its parameter value.
    ///
    /// Fails if any required parameter is absent from `params`.
    pub fn render(&self, params: &[(&str, &str)]) -> Result<String, AppError> {
        for name in &self.required {
            if !params.iter().any(|(key, _)| key == name) {
                return Err(AppError::Internal(anyhow!(
                    "prompt template is missing required parameter: {}",
                    name
                )));
            }
        }

        let mut rendered = self.template.clone();
        for (key, value) in params {
            rendered = rendered.replace(&format!("{{{}}}", key), value);
        }
        Ok(rendered)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_substitutes_all_placeholders() {
        let template = PromptTemplate::new("Research {topic} as a {role}.", &["topic", "role"]);
        let rendered = template
            .render(&[("topic", "coffee"), ("role", "historian")])
            .unwrap();
        assert_eq!(rendered, "Research coffee as a historian.");
    }

    #[test]
    fn test_render_missing_parameter_fails() {
        let template = PromptTemplate::new("Research {topic}.", &["topic"]);
        let result = template.render(&[("role", "historian")]);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("topic"));
    }

    #[test]
    fn test_render_repeated_placeholder() {
        let template = PromptTemplate::new("{topic} and again {topic}", &["topic"]);
        let rendered = template.render(&[("topic", "tea")]).unwrap();
        assert_eq!(rendered, "tea and again tea");
    }

    #[test]
    fn test_render_extra_parameters_are_ignored() {
        let template = PromptTemplate::new("Just {topic}.", &["topic"]);
        let rendered = template
            .render(&[("topic", "tea"), ("unused", "x")])
            .unwrap();
        assert_eq!(rendered, "Just tea.");
    }
}
