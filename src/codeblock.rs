//! Fenced code block extension: accumulation, snapshot, and rendering.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::context::CompileContext;
use crate::extension::{ExtensionFactory, HtmlExtension};
use crate::fence::parse_fence_info;
use crate::highlight::{HighlightEngine, SyntectEngine};
use crate::token::{Handled, Token, TokenKind};

/// Immutable snapshot of one fenced code block, handed to the renderer when
/// the construct closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CodeBlock {
    /// Language word from the info string, `plaintext` when absent.
    pub language: String,
    /// Free meta text after the info word, verbatim.
    pub meta: String,
    /// One-based line numbers marked for highlighting.
    pub highlighted_lines: BTreeSet<usize>,
    /// The code, one entry per line, without line endings.
    pub code_lines: Vec<String>,
    /// Whether the markup should request line-number styling.
    pub show_line_numbers: bool,
}

/// Renders a [`CodeBlock`] snapshot into HTML markup.
pub trait RenderCodeBlock: Send + Sync {
    /// Produce the full markup for one code block.
    fn render(&self, block: &CodeBlock) -> String;
}

/// Default renderer: `<pre>`/`<code>` wrapper with one `<div>` per line.
///
/// Highlighting is delegated to a [`HighlightEngine`]; when the engine has no
/// grammar for the language the lines are emitted as escaped plain text.
pub struct CodeBlockRenderer {
    engine: Arc<dyn HighlightEngine>,
}

impl Default for CodeBlockRenderer {
    fn default() -> Self {
        Self {
            engine: Arc::new(SyntectEngine::new()),
        }
    }
}

impl CodeBlockRenderer {
    /// Create a renderer backed by a custom highlighting engine.
    pub fn with_engine(engine: Arc<dyn HighlightEngine>) -> Self {
        Self { engine }
    }

    fn markup_lines(&self, block: &CodeBlock) -> Vec<String> {
        if block.code_lines.is_empty() {
            return Vec::new();
        }
        let joined = block.code_lines.join("\n");
        match self.engine.highlight(&block.language, &joined) {
            Some(markup) => markup.split('\n').map(str::to_owned).collect(),
            None => {
                log::debug!(
                    "no highlighting grammar for language `{}`, emitting plain text",
                    block.language
                );
                block
                    .code_lines
                    .iter()
                    .map(|line| html_escape::encode_text(line).into_owned())
                    .collect()
            }
        }
    }
}

impl RenderCodeBlock for CodeBlockRenderer {
    fn render(&self, block: &CodeBlock) -> String {
        let lines = self.markup_lines(block);
        let language = html_escape::encode_double_quoted_attribute(&block.language);

        let mut out = String::with_capacity(128 + 64 * lines.len());
        out.push_str("<pre class=\"code-block\"><code class=\"language-");
        out.push_str(&language);
        if block.show_line_numbers {
            out.push_str(" show-line-numbers");
        }
        out.push_str("\" data-language=\"");
        out.push_str(&language);
        out.push('"');
        if !block.meta.is_empty() {
            out.push_str(" data-meta=\"");
            out.push_str(&html_escape::encode_double_quoted_attribute(&block.meta));
            out.push('"');
        }
        out.push('>');
        for (index, line) in lines.iter().enumerate() {
            let number = index + 1;
            out.push_str("<div class=\"code-line");
            if block.highlighted_lines.contains(&number) {
                out.push_str(" highlighted-line");
            }
            out.push_str("\" data-line=\"");
            out.push_str(&number.to_string());
            out.push_str("\">");
            if line.is_empty() {
                // Empty lines need content or they collapse to zero height.
                out.push('\n');
            } else {
                out.push_str(line);
            }
            out.push_str("</div>");
        }
        out.push_str("</code></pre>");
        out
    }
}

/// Factory for the fenced code block extension.
///
/// Holds the cross-compile configuration; each compile gets fresh hook state.
pub struct CodeBlockHtml {
    renderer: Arc<dyn RenderCodeBlock>,
    show_line_numbers: bool,
}

impl CodeBlockHtml {
    /// Create the extension with the default syntect-backed renderer.
    pub fn new(show_line_numbers: bool) -> Self {
        Self {
            renderer: Arc::new(CodeBlockRenderer::default()),
            show_line_numbers,
        }
    }

    /// Create the extension with a custom renderer.
    pub fn with_renderer(renderer: Arc<dyn RenderCodeBlock>, show_line_numbers: bool) -> Self {
        Self {
            renderer,
            show_line_numbers,
        }
    }
}

impl ExtensionFactory for CodeBlockHtml {
    fn build(&self) -> Box<dyn HtmlExtension> {
        Box::new(CodeBlockHooks {
            renderer: Arc::clone(&self.renderer),
            show_line_numbers: self.show_line_numbers,
            accumulator: Accumulator::default(),
            active: false,
        })
    }
}

#[derive(Debug, Default)]
struct Accumulator {
    language: Option<String>,
    meta: String,
    highlighted_lines: BTreeSet<usize>,
    code_lines: Vec<String>,
    fence_events_seen: u8,
}

struct CodeBlockHooks {
    renderer: Arc<dyn RenderCodeBlock>,
    show_line_numbers: bool,
    accumulator: Accumulator,
    active: bool,
}

impl CodeBlockHooks {
    fn snapshot(&mut self) -> CodeBlock {
        let accumulator = std::mem::take(&mut self.accumulator);
        CodeBlock {
            language: accumulator
                .language
                .unwrap_or_else(|| "plaintext".to_string()),
            meta: accumulator.meta,
            highlighted_lines: accumulator.highlighted_lines,
            code_lines: accumulator.code_lines,
            show_line_numbers: self.show_line_numbers,
        }
    }
}

impl HtmlExtension for CodeBlockHooks {
    fn enter(&mut self, token: &Token<'_>, ctx: &mut CompileContext) -> Handled {
        match token.kind {
            TokenKind::CodeFenced => {
                ctx.line_ending_if_needed();
                self.accumulator = Accumulator::default();
                self.active = true;
                Handled::Consumed
            }
            _ => Handled::Pass,
        }
    }

    fn exit(&mut self, token: &Token<'_>, ctx: &mut CompileContext) -> Handled {
        match token.kind {
            TokenKind::CodeFencedFenceInfo => {
                let info = parse_fence_info(token.text);
                self.accumulator.language = Some(info.language);
                self.accumulator.highlighted_lines = info.highlighted_lines;
                Handled::Consumed
            }
            TokenKind::CodeFencedFenceMeta => {
                self.accumulator.meta = token.text.trim().to_string();
                Handled::Consumed
            }
            TokenKind::CodeFencedFence => {
                if self.accumulator.fence_events_seen == 0 {
                    // The boundary after the opening fence belongs to the
                    // fence, not to the first code line.
                    ctx.set_swallow_one();
                }
                self.accumulator.fence_events_seen += 1;
                Handled::Consumed
            }
            TokenKind::CodeFlowValue => {
                self.accumulator.code_lines.push(token.text.to_string());
                ctx.set_swallow_one();
                Handled::Consumed
            }
            TokenKind::LineEnding => {
                if ctx.swallow_all() {
                    Handled::Consumed
                } else if ctx.take_swallow_one() {
                    Handled::Consumed
                } else if self.active {
                    // A boundary with no code line before it is a blank line
                    // inside the block.
                    self.accumulator.code_lines.push(String::new());
                    Handled::Consumed
                } else {
                    Handled::Pass
                }
            }
            TokenKind::CodeFenced => {
                let still_open = self.accumulator.fence_events_seen < 2;
                let block = self.snapshot();
                let markup = self.renderer.render(&block);
                ctx.raw(&markup);
                if still_open {
                    if ctx.in_list_container() && !ctx.last_was_tag() {
                        ctx.raw("\n");
                    }
                    ctx.line_ending_if_needed();
                }
                ctx.clear_swallow_one();
                self.active = false;
                Handled::Consumed
            }
            _ => Handled::Pass,
        }
    }
}
