// SPDX-FileCopyrightText: 2026 Qwenmux Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Evaluation prompt template.

use std::path::Path;

use qwenmux_core::QwenmuxError;

/// Placeholder replaced by the user's question.
pub const QUESTION_PLACEHOLDER: &str = "{question}";

/// Plain-text prompt with a `{question}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    /// Wrap an in-memory template.
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    /// Read a template file. A missing or unreadable file is a startup error.
    pub fn load(path: &Path) -> Result<Self, QwenmuxError> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            QwenmuxError::Config(format!(
                "failed to read prompt template {}: {e}",
                path.display()
            ))
        })?;
        if !text.contains(QUESTION_PLACEHOLDER) {
            tracing::warn!(
                path = %path.display(),
                "prompt template has no {{question}} placeholder"
            );
        }
        Ok(Self::new(text))
    }

    /// Substitute every placeholder occurrence with `question`.
    pub fn render(&self, question: &str) -> String {
        self.text.replace(QUESTION_PLACEHOLDER, question)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn render_replaces_all_placeholders() {
        let t = PromptTemplate::new("Q: {question}\nAgain: {question}");
        assert_eq!(t.render("why?"), "Q: why?\nAgain: why?");
    }

    #[test]
    fn render_without_placeholder_is_identity() {
        let t = PromptTemplate::new("static");
        assert_eq!(t.render("ignored"), "static");
    }

    #[test]
    fn load_reads_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "问题：{{question}}").unwrap();
        let t = PromptTemplate::load(file.path()).unwrap();
        assert_eq!(t.render("1+1"), "问题：1+1");
    }

    #[test]
    fn load_missing_file_is_config_error() {
        let err = PromptTemplate::load(Path::new("/nonexistent/prompt.txt")).unwrap_err();
        assert!(matches!(err, QwenmuxError::Config(_)));
    }
}
