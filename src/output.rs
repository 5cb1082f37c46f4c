//! Rendering and writing of generated code files.
//!
//! Every file starts with a comment header naming the generator, the backend
//! mode, the generation time and the model, followed by an optional
//! description taken from the response's explanation.

use crate::llm::{GeneratedCode, LLMError};
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::Path;
use tracing::info;

/// Opening and closing comment delimiters for a header line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CommentStyle {
    pub open: &'static str,
    pub close: &'static str,
}

impl CommentStyle {
    const fn line(open: &'static str) -> Self {
        Self { open, close: "" }
    }

    const fn block(open: &'static str, close: &'static str) -> Self {
        Self { open, close }
    }

    fn wrap(&self, text: &str) -> String {
        if text.is_empty() {
            format!("{}{}\n", self.open, self.close)
        } else {
            format!("{} {}{}\n", self.open, text, self.close)
        }
    }
}

/// Comment syntax for a fence language tag.
///
/// `None` for formats without comments (JSON), which get no header.
pub fn comment_style(language: &str) -> Option<CommentStyle> {
    let style = match language.to_ascii_lowercase().as_str() {
        "json" => return None,
        "python" | "py" | "ruby" | "rb" | "sh" | "bash" | "zsh" | "shell" | "perl" | "r"
        | "yaml" | "yml" | "toml" | "dockerfile" | "makefile" | "powershell" | "ps1"
        | "elixir" | "ex" | "nim" | "julia" => CommentStyle::line("#"),
        "sql" | "lua" | "haskell" | "hs" | "elm" | "ada" => CommentStyle::line("--"),
        "html" | "xml" | "svg" | "vue" | "markdown" | "md" => CommentStyle::block("<!--", " -->"),
        "css" | "scss" | "less" => CommentStyle::block("/*", " */"),
        _ => CommentStyle::line("//"),
    };
    Some(style)
}

/// Header plus code, ready to be written to disk
pub fn render_output(code: &GeneratedCode, mode_label: &str, timestamp: DateTime<Utc>) -> String {
    let mut out = String::new();

    if let Some(style) = comment_style(&code.language) {
        out.push_str(&style.wrap(&format!("Generated by Claude Code SDK ({mode_label})")));
        out.push_str(&style.wrap(&format!(
            "Date: {}",
            timestamp.to_rfc3339_opts(SecondsFormat::Millis, true)
        )));
        out.push_str(&style.wrap(&format!("Model: {}", code.model_name)));

        if let Some(explanation) = &code.explanation {
            let mut lines = explanation.lines();
            if let Some(first) = lines.next() {
                out.push_str(&style.wrap(&format!("Description: {first}")));
            }
            for line in lines {
                out.push_str(&style.wrap(line.trim_end()));
            }
        }

        out.push('\n');
    }

    out.push_str(&code.content);
    if !code.content.ends_with('\n') {
        out.push('\n');
    }
    out
}

/// Write `code` to `path`, creating parent directories as needed.
pub async fn write_generated_code(
    path: &Path,
    code: &GeneratedCode,
    mode_label: &str,
) -> Result<(), LLMError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent).await?;
    }

    let rendered = render_output(code, mode_label, Utc::now());
    tokio::fs::write(path, rendered).await?;

    info!("Code generation complete: {}", path.display());
    info!("Provider: {}", code.provider_name);
    if let Some(explanation) = &code.explanation {
        info!("Description: {}", explanation);
    }

    Ok(())
}
