//! Prompt types for DocQA.

use serde::{Deserialize, Serialize};

/// A prompt definition, either built in or loaded from YAML.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptDefinition {
    /// Unique prompt identifier
    pub id: String,

    /// Human-readable title
    #[serde(default)]
    pub title: String,

    /// Handlebars template referencing `{{context}}` and `{{question}}`
    pub template: String,
}

/// One retrieved passage to embed in the prompt, in rank order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ContextPassage<'a> {
    /// Display name of the document the passage came from
    pub document_name: &'a str,

    /// Passage text, embedded verbatim
    pub text: &'a str,
}

/// A fully built prompt ready for LLM execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuiltPrompt {
    /// Rendered prompt text
    pub text: String,

    /// Source prompt ID
    #[serde(rename = "sourcePromptId")]
    pub source_prompt_id: String,

    /// Number of context blocks embedded
    #[serde(rename = "contextBlocks")]
    pub context_blocks: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_definition_deserialization() {
        let yaml = r#"
id: analyst.terse
title: Terse analyst
template: "Context:\n{{context}}\n\nQ: {{question}}"
"#;

        let def: PromptDefinition = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(def.id, "analyst.terse");
        assert_eq!(def.title, "Terse analyst");
        assert!(def.template.contains("{{question}}"));
    }

    #[test]
    fn test_title_is_optional() {
        let def: PromptDefinition =
            serde_yaml::from_str("id: x\ntemplate: \"{{context}} {{question}}\"").unwrap();
        assert!(def.title.is_empty());
    }
}
