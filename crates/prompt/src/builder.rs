//! Prompt builder for rendering the grounded answer prompt.
//!
//! Building is a pure function of the template, the question and the ranked
//! passages: no I/O and no logging happen here.

use crate::types::{BuiltPrompt, ContextPassage, PromptDefinition};
use docqa_core::{AppError, AppResult};
use handlebars::Handlebars;
use serde::Serialize;

/// Identifier of the built-in template.
pub const DEFAULT_PROMPT_ID: &str = "analyst.grounded";

/// Name under which the template is registered.
const TEMPLATE_NAME: &str = "prompt";

/// Built-in grounded instruction template.
pub const DEFAULT_TEMPLATE: &str = r#"ROLE: You are an elite Intelligence Analyst for a private data console.
TASK: Synthesize a precise answer to the user's query using ONLY the provided Context Data.

STRICT RULES:
1. NO HALLUCINATIONS: If the answer is not in the context, state "Insufficient intelligence in current nodes."
2. ACCURACY: Prioritize numbers, dates, and names.
3. FORMATTING:
   - Use **Bold** for key figures and entities.
   - Use clean paragraphs. No markdown code blocks unless requesting code.
   - Be direct. No filler words ("Here is the answer...").

CONTEXT DATA:
{{context}}

USER QUERY:
{{question}}

ANALYSIS:"#;

/// Variables available to templates.
#[derive(Serialize)]
struct PromptVariables<'a> {
    context: &'a str,
    question: &'a str,
}

/// Renders prompts from a validated template.
pub struct PromptBuilder {
    id: String,
    registry: Handlebars<'static>,
}

impl PromptBuilder {
    /// Builder for the built-in template.
    pub fn new() -> AppResult<Self> {
        Self::from_definition(&PromptDefinition::grounded_default())
    }

    /// Builder for a custom definition.
    ///
    /// The template must reference both `{{context}}` and `{{question}}`.
    pub fn from_definition(definition: &PromptDefinition) -> AppResult<Self> {
        for variable in ["context", "question"] {
            if !references_variable(&definition.template, variable) {
                return Err(AppError::Prompt(format!(
                    "Template '{}' must reference {{{{{}}}}}",
                    definition.id, variable
                )));
            }
        }

        let mut registry = Handlebars::new();

        // Plain text: the model must see the raw characters
        registry.register_escape_fn(handlebars::no_escape);

        registry
            .register_template_string(TEMPLATE_NAME, &definition.template)
            .map_err(|e| AppError::Prompt(format!("Failed to register template: {}", e)))?;

        Ok(Self {
            id: definition.id.clone(),
            registry,
        })
    }

    /// Identifier of the template in use.
    pub fn prompt_id(&self) -> &str {
        &self.id
    }

    /// Build the prompt for a question and its ranked passages.
    ///
    /// # Example
    /// ```
    /// use docqa_prompt::{ContextPassage, PromptBuilder};
    ///
    /// let builder = PromptBuilder::new().unwrap();
    /// let passages = [ContextPassage { document_name: "facts.md", text: "Paris is the capital of France." }];
    /// let built = builder.build("capital of France", &passages).unwrap();
    /// assert!(built.text.contains("[Source 1 - facts.md]:"));
    /// ```
    pub fn build(&self, question: &str, passages: &[ContextPassage<'_>]) -> AppResult<BuiltPrompt> {
        let context = format_context(passages);
        let variables = PromptVariables {
            context: &context,
            question,
        };

        let text = self
            .registry
            .render(TEMPLATE_NAME, &variables)
            .map_err(|e| AppError::Prompt(format!("Failed to render template: {}", e)))?;

        Ok(BuiltPrompt {
            text,
            source_prompt_id: self.id.clone(),
            context_blocks: passages.len(),
        })
    }
}

impl PromptDefinition {
    /// The built-in grounded definition.
    pub fn grounded_default() -> Self {
        Self {
            id: DEFAULT_PROMPT_ID.to_string(),
            title: "Grounded intelligence analyst".to_string(),
            template: DEFAULT_TEMPLATE.to_string(),
        }
    }
}

/// Format passages as labeled blocks, numbered from 1 in rank order and
/// separated by a blank line.
pub fn format_context(passages: &[ContextPassage<'_>]) -> String {
    passages
        .iter()
        .enumerate()
        .map(|(i, passage)| {
            format!(
                "[Source {} - {}]:\n{}",
                i + 1,
                passage.document_name,
                passage.text
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Whether a template contains a `{{name}}` expression (inner whitespace allowed).
pub(crate) fn references_variable(template: &str, name: &str) -> bool {
    let mut rest = template;
    while let Some(start) = rest.find("{{") {
        let after = &rest[start + 2..];
        let Some(end) = after.find("}}") else {
            return false;
        };
        if after[..end].trim() == name {
            return true;
        }
        rest = &after[end + 2..];
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    fn passages() -> Vec<ContextPassage<'static>> {
        vec![
            ContextPassage {
                document_name: "europe.md",
                text: "Paris is the capital of France.",
            },
            ContextPassage {
                document_name: "europe.md",
                text: "Berlin is the capital of Germany.",
            },
        ]
    }

    #[test]
    fn test_format_context() {
        let context = format_context(&passages());
        assert_eq!(
            context,
            "[Source 1 - europe.md]:\nParis is the capital of France.\n\n\
             [Source 2 - europe.md]:\nBerlin is the capital of Germany."
        );
    }

    #[test]
    fn test_format_context_empty() {
        assert_eq!(format_context(&[]), "");
    }

    #[test]
    fn test_build_default_prompt() {
        let builder = PromptBuilder::new().unwrap();
        let built = builder.build("capital of France", &passages()).unwrap();

        assert_eq!(built.source_prompt_id, DEFAULT_PROMPT_ID);
        assert_eq!(built.context_blocks, 2);
        assert!(built.text.starts_with("ROLE:"));
        assert!(built.text.contains("Insufficient intelligence in current nodes."));

        let context_at = built.text.find("[Source 1 - europe.md]").unwrap();
        let second_at = built.text.find("[Source 2 - europe.md]").unwrap();
        let question_at = built.text.find("USER QUERY:\ncapital of France").unwrap();
        assert!(context_at < second_at);
        assert!(second_at < question_at);
        assert!(built.text.ends_with("ANALYSIS:"));
    }

    #[test]
    fn test_build_does_not_escape() {
        let builder = PromptBuilder::new().unwrap();
        let text = "Revenue <b>grew</b> & \"margins\" held; see {{footnote}}.";
        let built = builder
            .build(
                "what about <script>?",
                &[ContextPassage {
                    document_name: "q3 & q4.md",
                    text,
                }],
            )
            .unwrap();

        assert!(built.text.contains(text));
        assert!(built.text.contains("[Source 1 - q3 & q4.md]"));
        assert!(built.text.contains("what about <script>?"));
    }

    #[test]
    fn test_custom_definition() {
        let definition = PromptDefinition {
            id: "terse".to_string(),
            title: String::new(),
            template: "{{ context }}\n---\n{{question}}".to_string(),
        };
        let builder = PromptBuilder::from_definition(&definition).unwrap();
        let built = builder.build("Q?", &passages()[..1]).unwrap();

        assert_eq!(
            built.text,
            "[Source 1 - europe.md]:\nParis is the capital of France.\n---\nQ?"
        );
        assert_eq!(builder.prompt_id(), "terse");
    }

    #[test]
    fn test_custom_definition_requires_both_insertion_points() {
        let definition = PromptDefinition {
            id: "no-question".to_string(),
            title: String::new(),
            template: "Context: {{context}}".to_string(),
        };
        assert!(PromptBuilder::from_definition(&definition).is_err());
    }

    #[test]
    fn test_references_variable() {
        assert!(references_variable("a {{context}} b", "context"));
        assert!(references_variable("a {{ question }} b", "question"));
        assert!(!references_variable("a {{contexts}} b", "context"));
        assert!(!references_variable("a {{context b", "context"));
    }
}
