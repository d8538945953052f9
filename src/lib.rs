#![deny(missing_docs)]
//! Glowmark: markdown to sanitized HTML, with syntax-highlighted code blocks
//! and deduplicated heading anchors.
//!
//! The two core features are implemented as event-driven HTML extensions: the
//! renderer lowers fenced code blocks and headings into an enter/exit token
//! stream, and the extensions accumulate state per construct before handing a
//! snapshot to a pluggable renderer. Everything else (GFM tables, lists,
//! footnotes, math containers, frontmatter, emoji aliases) is handled by the
//! default pipeline around them.
//!
//! ```
//! let result = glowmark::compile("# Hello\n\n```js {1}\nconsole.log(1);\n```\n").unwrap();
//! assert!(result.html.contains("id=\"hello\""));
//! assert!(result.html.contains("highlighted-line"));
//! ```

/// Fenced code block extension and default renderer.
pub mod codeblock;
/// Compile orchestration and options.
pub mod compile;
/// Per-compile output buffers and shared state.
pub mod context;
/// Emoji alias substitution.
pub mod emoji;
/// Compile error types.
pub mod error;
/// Extension traits.
pub mod extension;
/// Fence info-string and highlight-range parsing.
pub mod fence;
/// YAML frontmatter extraction.
pub mod frontmatter;
/// Heading anchor extension and default renderer.
pub mod heading;
/// Syntax highlighting engines.
pub mod highlight;
mod render;
/// HTML sanitization policy and pass.
pub mod sanitize;
/// Slug transliteration and deduplication.
pub mod slug;
/// Token kinds and dispatch results.
pub mod token;

pub use codeblock::{CodeBlock, CodeBlockHtml, CodeBlockRenderer, RenderCodeBlock};
pub use compile::{CompileResult, Compiler, Options, ParseSettings, compile};
pub use context::CompileContext;
pub use emoji::replace_aliases;
pub use error::CompileError;
pub use extension::{ExtensionFactory, HtmlExtension};
pub use fence::{FenceInfo, parse_fence_info, parse_highlight_ranges};
pub use frontmatter::{FrontmatterError, Metadata, extract_metadata};
pub use heading::{Heading, HeadingAnchorsHtml, HeadingRenderer, RenderHeading};
pub use highlight::{HighlightEngine, SyntectEngine};
pub use sanitize::{SanitizePolicy, sanitize};
pub use slug::{SlugSet, transliterate};
pub use token::{Handled, Token, TokenKind};
