//! Shared mutable state for one HTML compilation.

use crate::slug::SlugSet;

/// Per-compile output buffers, boundary-control flags, and shared handles.
///
/// A fresh context is created for every compile call. Extensions and default
/// handlers write through the same context, so output ordering follows event
/// ordering exactly.
#[derive(Debug, Default)]
pub struct CompileContext {
    out: String,
    stack: Vec<String>,
    last_was_tag: bool,
    swallow_one: bool,
    swallow_all: bool,
    list_tightness: Vec<bool>,
    slugs: SlugSet,
    footnote_order: Vec<String>,
    footnote_definitions: Vec<(String, String)>,
}

impl CompileContext {
    /// Create an empty context.
    pub fn new() -> Self {
        Self {
            out: String::with_capacity(4096),
            ..Self::default()
        }
    }

    fn sink(&mut self) -> &mut String {
        match self.stack.last_mut() {
            Some(buffer) => buffer,
            None => &mut self.out,
        }
    }

    /// Append markup that counts as a tag for boundary decisions.
    pub fn tag(&mut self, html: &str) {
        self.sink().push_str(html);
        self.last_was_tag = true;
    }

    /// Append pre-built markup or raw characters verbatim.
    pub fn raw(&mut self, html: &str) {
        self.sink().push_str(html);
        self.last_was_tag = false;
    }

    /// Append plain text, HTML-escaped.
    pub fn text(&mut self, text: &str) {
        html_escape::encode_text_to_string(text, self.sink());
        self.last_was_tag = false;
    }

    /// Append attribute-value text, escaped for a double-quoted attribute.
    pub fn attr(&mut self, value: &str) {
        html_escape::encode_double_quoted_attribute_to_string(value, self.sink());
    }

    /// Write a line ending unless the current buffer is empty or already ends
    /// with one.
    pub fn line_ending_if_needed(&mut self) {
        let sink = self.sink();
        if !sink.is_empty() && !sink.ends_with('\n') {
            sink.push('\n');
            self.last_was_tag = false;
        }
    }

    /// Whether the most recent write was a tag.
    pub fn last_was_tag(&self) -> bool {
        self.last_was_tag
    }

    /// Push a capture buffer; subsequent writes land in it until
    /// [`CompileContext::resume`].
    pub fn buffer(&mut self) {
        self.stack.push(String::new());
    }

    /// Pop the innermost capture buffer and return its contents.
    pub fn resume(&mut self) -> String {
        self.stack.pop().unwrap_or_default()
    }

    /// Arm the one-shot line-boundary swallow.
    pub fn set_swallow_one(&mut self) {
        self.swallow_one = true;
    }

    /// Disarm the one-shot line-boundary swallow.
    pub fn clear_swallow_one(&mut self) {
        self.swallow_one = false;
    }

    /// Consume the one-shot swallow flag, returning whether it was armed.
    pub fn take_swallow_one(&mut self) -> bool {
        std::mem::take(&mut self.swallow_one)
    }

    /// Arm the persistent line-boundary swallow.
    pub fn set_swallow_all(&mut self) {
        self.swallow_all = true;
    }

    /// Disarm the persistent line-boundary swallow.
    pub fn clear_swallow_all(&mut self) {
        self.swallow_all = false;
    }

    /// Whether the persistent swallow is armed.
    pub fn swallow_all(&self) -> bool {
        self.swallow_all
    }

    /// Record entering a list container and whether it renders tight.
    pub fn push_list(&mut self, tight: bool) {
        self.list_tightness.push(tight);
    }

    /// Record leaving the innermost list container.
    pub fn pop_list(&mut self) {
        self.list_tightness.pop();
    }

    /// Whether any list container is currently open.
    pub fn in_list_container(&self) -> bool {
        !self.list_tightness.is_empty()
    }

    /// Whether the innermost open list renders tight.
    pub fn in_tight_list(&self) -> bool {
        self.list_tightness.last().copied().unwrap_or(false)
    }

    /// Mutable handle to the per-compile slug set.
    pub fn slugs_mut(&mut self) -> &mut SlugSet {
        &mut self.slugs
    }

    /// Read-only handle to the per-compile slug set.
    pub fn slugs(&self) -> &SlugSet {
        &self.slugs
    }

    /// One-based ordinal for a footnote reference, assigned on first sight.
    pub fn footnote_ordinal(&mut self, identifier: &str) -> usize {
        if let Some(index) = self.footnote_order.iter().position(|id| id == identifier) {
            index + 1
        } else {
            self.footnote_order.push(identifier.to_string());
            self.footnote_order.len()
        }
    }

    /// Stash a rendered footnote definition for the trailing section.
    pub fn add_footnote_definition(&mut self, identifier: String, html: String) {
        self.footnote_definitions.push((identifier, html));
    }

    /// Consume the context, appending the footnotes section when any
    /// referenced definition exists, and return the final document markup.
    pub fn finish(mut self) -> String {
        let mut items = String::new();
        for id in &self.footnote_order {
            let Some((_, html)) = self.footnote_definitions.iter().find(|(def, _)| def == id)
            else {
                log::debug!("footnote reference `{id}` has no definition");
                continue;
            };
            let escaped = html_escape::encode_double_quoted_attribute(id);
            items.push_str("<li id=\"fn-");
            items.push_str(&escaped);
            items.push_str("\">");
            items.push_str(html);
            items.push_str("<a href=\"#fnref-");
            items.push_str(&escaped);
            items.push_str("\" data-footnote-backref aria-label=\"Back to reference\">\u{21a9}</a></li>");
        }
        if !items.is_empty() {
            if !self.out.is_empty() && !self.out.ends_with('\n') {
                self.out.push('\n');
            }
            self.out.push_str(
                "<section data-footnotes class=\"footnotes\"><h2 class=\"sr-only\" id=\"footnote-label\">Footnotes</h2><ol>",
            );
            self.out.push_str(&items);
            self.out.push_str("</ol></section>");
        }
        self.out
    }
}
