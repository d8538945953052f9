//! Compile orchestration: options, the compiler, and the one-call entry point.

use std::sync::Arc;

use markdown::mdast::Node;

use crate::codeblock::CodeBlockHtml;
use crate::context::CompileContext;
use crate::emoji;
use crate::error::CompileError;
use crate::extension::ExtensionFactory;
use crate::frontmatter::{self, Metadata};
use crate::heading::HeadingAnchorsHtml;
use crate::render::Renderer;
use crate::sanitize::{SanitizePolicy, sanitize};

/// Which markdown constructs the parser recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParseSettings {
    /// GitHub Flavored Markdown: tables, strikethrough, task lists,
    /// autolink literals, footnotes.
    pub gfm: bool,
    /// `$...$` and `$$...$$` math containers (double-dollar inline only).
    pub math: bool,
    /// Four-space indented code blocks.
    pub code_indented: bool,
    /// Raw HTML blocks and inline tags.
    pub raw_html: bool,
}

impl Default for ParseSettings {
    fn default() -> Self {
        Self {
            gfm: true,
            math: true,
            code_indented: true,
            raw_html: true,
        }
    }
}

impl ParseSettings {
    fn to_parse_options(self) -> markdown::ParseOptions {
        let constructs = markdown::Constructs {
            // Frontmatter is split off before parsing.
            frontmatter: false,
            code_indented: self.code_indented,
            html_flow: self.raw_html,
            html_text: self.raw_html,
            gfm_autolink_literal: self.gfm,
            gfm_footnote_definition: self.gfm,
            gfm_label_start_footnote: self.gfm,
            gfm_strikethrough: self.gfm,
            gfm_table: self.gfm,
            gfm_task_list_item: self.gfm,
            math_flow: self.math,
            math_text: self.math,
            ..markdown::Constructs::default()
        };
        markdown::ParseOptions {
            constructs,
            math_text_single_dollar: false,
            ..markdown::ParseOptions::default()
        }
    }
}

/// Compiler configuration.
#[derive(Clone)]
pub struct Options {
    /// Parser construct toggles.
    pub parse: ParseSettings,
    /// HTML extension factories. Empty means the default code block and
    /// heading anchor extensions; factories are tried in order, first
    /// consumer wins.
    pub extensions: Vec<Arc<dyn ExtensionFactory>>,
    /// Run the sanitization pass over the final markup.
    pub sanitize: bool,
    /// Allow-list used when `sanitize` is on.
    pub sanitize_policy: SanitizePolicy,
    /// Replace `:alias:` emoji shortcodes before parsing.
    pub emojify: bool,
    /// Ask the default code block renderer for line-number styling.
    pub show_line_numbers: bool,
    /// Pass raw HTML through to the output (still subject to sanitization).
    pub allow_raw_html: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            parse: ParseSettings::default(),
            extensions: Vec::new(),
            sanitize: true,
            sanitize_policy: SanitizePolicy::default(),
            emojify: true,
            show_line_numbers: true,
            allow_raw_html: true,
        }
    }
}

/// Output of one compile call.
#[derive(Debug, Clone, PartialEq)]
pub struct CompileResult {
    /// Frontmatter attributes, empty when the document has none.
    pub metadata: serde_json::Map<String, serde_json::Value>,
    /// The markdown body with frontmatter removed and emoji aliases applied.
    pub body: String,
    /// The compiled (and, by default, sanitized) HTML.
    pub html: String,
}

/// A configured, reusable markdown compiler.
///
/// Construction fixes the configuration; every [`Compiler::compile`] call
/// builds fresh per-document state, so one compiler can serve concurrent
/// callers through a shared reference.
pub struct Compiler {
    options: Options,
    extensions: Vec<Arc<dyn ExtensionFactory>>,
}

impl Compiler {
    /// Create a compiler from options.
    pub fn new(options: Options) -> Self {
        let extensions = if options.extensions.is_empty() {
            vec![
                Arc::new(CodeBlockHtml::new(options.show_line_numbers))
                    as Arc<dyn ExtensionFactory>,
                Arc::new(HeadingAnchorsHtml::default()) as Arc<dyn ExtensionFactory>,
            ]
        } else {
            options.extensions.clone()
        };
        Self {
            options,
            extensions,
        }
    }

    /// Compile one markdown document to HTML.
    pub fn compile(&self, input: &str) -> Result<CompileResult, CompileError> {
        let source = if self.options.emojify {
            emoji::replace_aliases(input)
        } else {
            std::borrow::Cow::Borrowed(input)
        };

        let Metadata {
            attributes,
            body_start,
        } = frontmatter::extract_metadata(&source)?;
        let body = source[body_start..].to_string();

        let tree: Node = markdown::to_mdast(&body, &self.options.parse.to_parse_options())
            .map_err(|message| CompileError::Parse(message.to_string()))?;

        let mut ctx = CompileContext::new();
        let hooks = self
            .extensions
            .iter()
            .map(|factory| factory.build())
            .collect();
        let mut renderer = Renderer::new(&body, hooks, self.options.allow_raw_html);
        renderer.render(&tree, &mut ctx);
        let mut html = ctx.finish();

        if self.options.sanitize {
            html = sanitize(&html, &self.options.sanitize_policy);
        }

        Ok(CompileResult {
            metadata: attributes,
            body,
            html,
        })
    }
}

/// Compile with the default options.
pub fn compile(input: &str) -> Result<CompileResult, CompileError> {
    Compiler::new(Options::default()).compile(input)
}
