//! Prompt composition for code generation requests.

use tracing::warn;

/// Instruction block sent with every request unless overridden
pub const DEFAULT_SYSTEM_PROMPT: &str = "You are an experienced software engineer.
Generate high-quality code that fulfils the request.

Meet the following requirements:
- Emphasize type safety when writing TypeScript
- Prefer functional programming and keep side effects to a minimum
- Include appropriate comments in the code
- Take error handling into account
- Aim for a testable design";

/// Builds the text sent to the backends.
pub struct PromptBuilder;

impl PromptBuilder {
    /// Request template without the system instructions.
    ///
    /// The HTTP providers use this as the user message and send the system
    /// prompt in its own field. The user prompt is embedded verbatim.
    pub fn user_request(user_prompt: &str) -> String {
        if user_prompt.contains("```") {
            warn!("Prompt contains a fence marker; the response may be harder to parse");
        }

        format!(
            "Generate code based on the following request:

{user_prompt}

Return the generated code in the following format:
```typescript
// code goes here
```

Also include a brief explanation of the code."
        )
    }

    /// Full prompt: system instructions followed by the request template.
    pub fn build(user_prompt: &str, system_prompt: Option<&str>) -> String {
        let system_prompt = Self::system_prompt(system_prompt);
        format!("{}\n\n{}", system_prompt, Self::user_request(user_prompt))
    }

    /// The given system prompt, or the default one when absent or blank
    pub fn system_prompt(custom: Option<&str>) -> &str {
        match custom {
            Some(prompt) if !prompt.trim().is_empty() => prompt,
            _ => DEFAULT_SYSTEM_PROMPT,
        }
    }
}
