//! Syntax highlighting behind a swappable engine trait.

use once_cell::sync::Lazy;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;

static SYNTAXES: Lazy<SyntaxSet> = Lazy::new(SyntaxSet::load_defaults_newlines);

/// Produces HTML markup for a block of code.
///
/// Returning `None` means the engine has no grammar for the language (or
/// highlighting failed); the caller falls back to escaped plain text.
pub trait HighlightEngine: Send + Sync {
    /// Highlight `code` as `language`.
    ///
    /// The returned markup must keep the input's line structure: one markup
    /// line per input line, joined by `\n`, with no spans crossing line
    /// boundaries.
    fn highlight(&self, language: &str, code: &str) -> Option<String>;
}

/// Default engine backed by syntect's bundled syntax definitions.
///
/// Emits class-based `<span>` markup so styling stays in CSS. Each line is
/// highlighted with a fresh parse state, which keeps the per-line markup
/// self-contained at the cost of multi-line constructs losing their state at
/// line boundaries.
#[derive(Debug, Default, Clone, Copy)]
pub struct SyntectEngine;

impl SyntectEngine {
    /// Create the default engine.
    pub fn new() -> Self {
        Self
    }
}

impl HighlightEngine for SyntectEngine {
    fn highlight(&self, language: &str, code: &str) -> Option<String> {
        let syntax = SYNTAXES.find_syntax_by_token(language)?;
        let mut lines = Vec::new();
        for line in code.split('\n') {
            let mut generator =
                ClassedHTMLGenerator::new_with_class_style(syntax, &SYNTAXES, ClassStyle::Spaced);
            let mut input = String::with_capacity(line.len() + 1);
            input.push_str(line);
            input.push('\n');
            if let Err(err) = generator.parse_html_for_line_which_includes_newline(&input) {
                log::warn!("highlighting failed for language `{language}`: {err}");
                return None;
            }
            // The generator echoes the newline we fed it; drop it so joining
            // preserves the original line count.
            lines.push(generator.finalize().replace('\n', ""));
        }
        Some(lines.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_language_has_no_grammar() {
        let engine = SyntectEngine::new();
        assert!(engine.highlight("not-a-language", "x = 1").is_none());
    }

    #[test]
    fn known_language_keeps_line_structure() {
        let engine = SyntectEngine::new();
        let markup = engine.highlight("js", "const a = 1;\nconst b = 2;\nconst c = 3;");
        let markup = markup.expect("bundled grammars include javascript");
        assert_eq!(markup.split('\n').count(), 3);
        assert!(markup.contains("<span"));
    }

    #[test]
    fn empty_input_yields_one_empty_markup_line() {
        let engine = SyntectEngine::new();
        let markup = engine.highlight("js", "").expect("grammar exists");
        assert_eq!(markup.split('\n').count(), 1);
    }
}
