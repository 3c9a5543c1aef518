//! Template rendering
//!
//! Thin wrapper over Tera. Templates are plain strings with `{{ var }}`
//! substitution; undefined variables are rendering errors so a scaffold can
//! never silently ship a placeholder.

use crate::error::{CoreError, Result};
use tera::{Context, Tera};

/// Variable context plus a Tera instance, reused across renders.
pub struct TemplateProcessor {
    tera: Tera,
    context: Context,
}

impl TemplateProcessor {
    pub fn new() -> Self {
        Self {
            tera: Tera::default(),
            context: Context::new(),
        }
    }

    pub fn add_variable(&mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) {
        self.context.insert(key.into(), &value.into());
    }

    /// Render `template` under `name` (used for error reporting only).
    pub fn render(&mut self, name: &str, template: &str) -> Result<String> {
        self.tera
            .render_str(template, &self.context)
            .map_err(|e| CoreError::Template {
                name: name.to_string(),
                message: collect_error_chain(&e),
            })
    }
}

impl Default for TemplateProcessor {
    fn default() -> Self {
        Self::new()
    }
}

/// Tera buries the useful detail (e.g. the undefined variable name) in the
/// error source chain, so flatten the chain into one message.
fn collect_error_chain(e: &tera::Error) -> String {
    use std::error::Error;

    let mut details = vec![e.to_string()];
    let mut source = e.source();
    while let Some(err) = source {
        details.push(err.to_string());
        source = err.source();
    }
    details.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_simple_variable_expansion() {
        let mut processor = TemplateProcessor::new();
        processor.add_variable("name", "world");

        let result = processor.render("greeting", "Hello {{ name }}!").unwrap();
        assert_eq!(result, "Hello world!");
    }

    #[test]
    fn test_numeric_variable() {
        let mut processor = TemplateProcessor::new();
        processor.add_variable("port", 8000);

        let result = processor.render("bind", "0.0.0.0:{{ port }}").unwrap();
        assert_eq!(result, "0.0.0.0:8000");
    }

    #[test]
    fn test_undefined_variable_is_an_error() {
        let mut processor = TemplateProcessor::new();

        let err = processor
            .render("broken", "Hello {{ undefined_var }}!")
            .unwrap_err();
        assert!(
            err.to_string().contains("undefined_var"),
            "error should name the variable: {err}"
        );
    }

    #[test]
    fn test_raw_block_passes_through() {
        let mut processor = TemplateProcessor::new();

        let result = processor
            .render(
                "workflow",
                "{% raw %}${{ secrets.AZURE_WEBAPP_PUBLISH_PROFILE }}{% endraw %}",
            )
            .unwrap();
        assert_eq!(result, "${{ secrets.AZURE_WEBAPP_PUBLISH_PROFILE }}");
    }
}
