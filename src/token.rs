//! Token kinds and dispatch results for the HTML extension pipeline.
//!
//! The compile driver lowers parsed fence and heading constructs into a flat
//! stream of enter/exit events. Extensions subscribe to the kinds they care
//! about and either consume an event or pass it through to the default
//! handlers.

/// Event kinds offered to HTML extensions during compilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    /// A whole fenced code block construct.
    CodeFenced,
    /// One fence line (opening or closing).
    CodeFencedFence,
    /// The info word of the opening fence (language plus optional descriptor).
    CodeFencedFenceInfo,
    /// Free text after the info word on the opening fence.
    CodeFencedFenceMeta,
    /// One line of code between the fences.
    CodeFlowValue,
    /// A line boundary between block-level constructs or code lines.
    LineEnding,
    /// A whole hash-style heading construct.
    AtxHeading,
    /// A run of `#` markers opening or closing a hash-style heading.
    AtxHeadingSequence,
    /// A whole underline-style heading construct.
    SetextHeading,
    /// A run of plain text.
    Data,
}

/// A single event in the token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Token<'a> {
    /// The kind of construct this event belongs to.
    pub kind: TokenKind,
    /// The source text covered by the event, already decoded.
    pub text: &'a str,
}

impl<'a> Token<'a> {
    /// Create a token for dispatch.
    pub fn new(kind: TokenKind, text: &'a str) -> Self {
        Self { kind, text }
    }
}

/// Result of offering a token to an extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// The extension handled the event; dispatch stops.
    Consumed,
    /// The extension ignored the event; it falls through.
    Pass,
}
