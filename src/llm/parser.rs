//! Reduction of free-text model output to code plus explanation.
//!
//! Only the first fenced block is extracted. Anything else, including further
//! fenced blocks, stays in the explanation. A response without fences is
//! accepted as-is.

use crate::env::defaults;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::LazyLock;
use tracing::warn;

static CODE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```([\w+#-]+)?\n(.*?)```").expect("code block pattern is valid")
});

/// Code, language tag and leftover prose extracted from a response
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedResponse {
    pub content: String,
    pub language: String,
    pub explanation: Option<String>,
}

/// Extract the first fenced code block and the surrounding explanation.
pub fn parse_response(raw: &str) -> ParsedResponse {
    let Some(captures) = CODE_BLOCK.captures(raw) else {
        warn!("No fenced code block found in response, using the full text as code");
        return ParsedResponse {
            content: raw.trim().to_string(),
            language: defaults::LANGUAGE.to_string(),
            explanation: None,
        };
    };

    let language = captures
        .get(1)
        .map(|m| m.as_str().to_string())
        .unwrap_or_else(|| defaults::LANGUAGE.to_string());
    let content = captures
        .get(2)
        .map(|m| m.as_str().trim().to_string())
        .unwrap_or_default();

    let explanation = CODE_BLOCK
        .replace(raw, "")
        .trim()
        .to_string();

    ParsedResponse {
        content,
        language,
        explanation: (!explanation.is_empty()).then_some(explanation),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_python_block_with_trailing_prose() {
        let parsed = parse_response("```python\nprint(1)\n```\nDone.");
        assert_eq!(
            parsed,
            ParsedResponse {
                content: "print(1)".to_string(),
                language: "python".to_string(),
                explanation: Some("Done.".to_string()),
            }
        );
    }

    #[test]
    fn test_no_fence_falls_back_to_whole_text() {
        let parsed = parse_response("  function hello() {}\n");
        assert_eq!(parsed.content, "function hello() {}");
        assert_eq!(parsed.language, "typescript");
        assert_eq!(parsed.explanation, None);
    }

    #[test]
    fn test_missing_language_defaults_to_typescript() {
        let parsed = parse_response("Here you go:\n```\nconst x = 1;\n```");
        assert_eq!(parsed.language, "typescript");
        assert_eq!(parsed.content, "const x = 1;");
        assert_eq!(parsed.explanation.as_deref(), Some("Here you go:"));
    }

    #[test]
    fn test_only_first_block_is_extracted() {
        let raw = "Intro\n```rust\nfn a() {}\n```\nMiddle\n```rust\nfn b() {}\n```\nEnd";
        let parsed = parse_response(raw);
        assert_eq!(parsed.content, "fn a() {}");
        let explanation = parsed.explanation.unwrap();
        assert!(explanation.starts_with("Intro"));
        assert!(explanation.contains("fn b() {}"));
        assert!(explanation.ends_with("End"));
    }

    #[test]
    fn test_inline_trailing_prose() {
        let parsed =
            parse_response("```typescript\nfunction add(a,b){return a+b}\n``` Adds two numbers.");
        assert_eq!(parsed.content, "function add(a,b){return a+b}");
        assert_eq!(parsed.language, "typescript");
        assert_eq!(parsed.explanation.as_deref(), Some("Adds two numbers."));
    }

    #[test]
    fn test_block_only_has_no_explanation() {
        let parsed = parse_response("\n\n```go\npackage main\n```\n\n");
        assert_eq!(parsed.language, "go");
        assert_eq!(parsed.explanation, None);
    }

    #[test]
    fn test_symbolic_language_tags() {
        assert_eq!(parse_response("```c++\nint x;\n```").language, "c++");
        assert_eq!(parse_response("```c#\nint x;\n```").language, "c#");
    }

    #[test]
    fn test_unterminated_fence_falls_back() {
        let parsed = parse_response("```rust\nfn main() {}");
        assert_eq!(parsed.content, "```rust\nfn main() {}");
        assert_eq!(parsed.language, "typescript");
    }

    #[test]
    fn test_parse_is_deterministic() {
        let raw = "Text\n```js\nlet a = 1;\n```\nMore text";
        assert_eq!(parse_response(raw), parse_response(raw));
    }
}
