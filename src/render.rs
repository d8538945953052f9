//! Document renderer: walks the parsed tree, lowering fence and heading
//! constructs into the extension token stream and rendering everything else
//! with default handlers.

use markdown::mdast::{AlignKind, Node};

use crate::context::CompileContext;
use crate::extension::HtmlExtension;
use crate::fence;
use crate::token::{Handled, Token, TokenKind};

/// Extracts plain text from a list of AST nodes (for heading text).
pub(crate) fn extract_text_from_nodes(nodes: &[Node]) -> String {
    let mut text = String::new();
    for node in nodes {
        extract_text_from_node(node, &mut text);
    }
    text.trim().to_string()
}

fn extract_text_from_node(node: &Node, buffer: &mut String) {
    match node {
        Node::Text(t) => buffer.push_str(&t.value),
        Node::InlineCode(code) => buffer.push_str(&code.value),
        Node::Strong(strong) => {
            for child in &strong.children {
                extract_text_from_node(child, buffer);
            }
        }
        Node::Emphasis(emphasis) => {
            for child in &emphasis.children {
                extract_text_from_node(child, buffer);
            }
        }
        Node::Link(link) => {
            for child in &link.children {
                extract_text_from_node(child, buffer);
            }
        }
        Node::Delete(del) => {
            for child in &del.children {
                extract_text_from_node(child, buffer);
            }
        }
        // Ignore other node types in headings
        _ => {}
    }
}

/// One-shot renderer for a parsed document.
pub(crate) struct Renderer<'a> {
    source: &'a str,
    extensions: Vec<Box<dyn HtmlExtension>>,
    allow_raw_html: bool,
}

impl<'a> Renderer<'a> {
    pub(crate) fn new(
        source: &'a str,
        extensions: Vec<Box<dyn HtmlExtension>>,
        allow_raw_html: bool,
    ) -> Self {
        Self {
            source,
            extensions,
            allow_raw_html,
        }
    }

    /// Render the whole document into the context.
    pub(crate) fn render(&mut self, root: &Node, ctx: &mut CompileContext) {
        match root {
            Node::Root(r) => self.render_blocks(&r.children, ctx),
            other => self.render_node(other, ctx),
        }
    }

    /// Offer an enter event to the extensions.
    fn enter(&mut self, kind: TokenKind, text: &str, ctx: &mut CompileContext) {
        let token = Token::new(kind, text);
        for extension in &mut self.extensions {
            if extension.enter(&token, ctx) == Handled::Consumed {
                return;
            }
        }
    }

    /// Offer an exit event to the extensions, falling through to the default
    /// handlers when nobody consumes it.
    fn exit(&mut self, kind: TokenKind, text: &str, ctx: &mut CompileContext) {
        let token = Token::new(kind, text);
        for extension in &mut self.extensions {
            if extension.exit(&token, ctx) == Handled::Consumed {
                return;
            }
        }
        match kind {
            TokenKind::Data => ctx.text(text),
            TokenKind::LineEnding => {
                if !ctx.swallow_all() && !ctx.take_swallow_one() {
                    ctx.raw("\n");
                }
            }
            TokenKind::CodeFenced
            | TokenKind::CodeFencedFence
            | TokenKind::CodeFencedFenceInfo
            | TokenKind::CodeFencedFenceMeta
            | TokenKind::CodeFlowValue
            | TokenKind::AtxHeading
            | TokenKind::AtxHeadingSequence
            | TokenKind::SetextHeading => {}
        }
    }

    fn node_slice(&self, position: Option<&markdown::unist::Position>) -> Option<&'a str> {
        let position = position?;
        self.source.get(position.start.offset..position.end.offset)
    }

    /// Render sibling block constructs with a line boundary between them.
    fn render_blocks(&mut self, children: &[Node], ctx: &mut CompileContext) {
        for (index, child) in children.iter().enumerate() {
            if index > 0 {
                self.exit(TokenKind::LineEnding, "\n", ctx);
            }
            // A persistent swallow only covers boundaries up to the next
            // block construct.
            ctx.clear_swallow_all();
            self.render_node(child, ctx);
        }
    }

    fn render_node(&mut self, node: &Node, ctx: &mut CompileContext) {
        match node {
            Node::Root(root) => self.render_blocks(&root.children, ctx),
            Node::Paragraph(para) => {
                let tight = ctx.in_tight_list();
                if !tight {
                    ctx.tag("<p>");
                }
                for child in &para.children {
                    self.render_node(child, ctx);
                }
                if !tight {
                    ctx.tag("</p>");
                }
            }
            Node::Text(text) => self.exit(TokenKind::Data, &text.value, ctx),
            Node::Heading(heading) => self.render_heading(heading, ctx),
            Node::Code(code) => self.render_code(code, ctx),
            Node::InlineCode(code) => {
                ctx.tag("<code>");
                ctx.text(&code.value);
                ctx.tag("</code>");
            }
            Node::Emphasis(emphasis) => {
                ctx.tag("<em>");
                for child in &emphasis.children {
                    self.render_node(child, ctx);
                }
                ctx.tag("</em>");
            }
            Node::Strong(strong) => {
                ctx.tag("<strong>");
                for child in &strong.children {
                    self.render_node(child, ctx);
                }
                ctx.tag("</strong>");
            }
            Node::Delete(del) => {
                ctx.tag("<del>");
                for child in &del.children {
                    self.render_node(child, ctx);
                }
                ctx.tag("</del>");
            }
            Node::Link(link) => {
                ctx.tag("<a href=\"");
                ctx.attr(&link.url);
                if let Some(title) = &link.title {
                    ctx.tag("\" title=\"");
                    ctx.attr(title);
                }
                ctx.tag("\">");
                for child in &link.children {
                    self.render_node(child, ctx);
                }
                ctx.tag("</a>");
            }
            Node::Image(image) => {
                ctx.tag("<img src=\"");
                ctx.attr(&image.url);
                ctx.tag("\" alt=\"");
                ctx.attr(&image.alt);
                if let Some(title) = &image.title {
                    ctx.tag("\" title=\"");
                    ctx.attr(title);
                }
                ctx.tag("\" />");
            }
            Node::Blockquote(quote) => {
                ctx.tag("<blockquote>");
                self.render_blocks(&quote.children, ctx);
                ctx.tag("</blockquote>");
            }
            Node::List(list) => self.render_list(list, ctx),
            Node::ListItem(item) => self.render_list_item(item, ctx),
            Node::Table(table) => self.render_table(table, ctx),
            Node::Break(_) => ctx.tag("<br />"),
            Node::ThematicBreak(_) => ctx.tag("<hr />"),
            Node::Html(html) => {
                if self.allow_raw_html {
                    ctx.raw(&html.value);
                } else {
                    log::debug!("raw HTML disabled, escaping passthrough block");
                    ctx.text(&html.value);
                }
            }
            Node::Math(math) => {
                ctx.tag("<div class=\"math math-display\">");
                ctx.text(&math.value);
                ctx.tag("</div>");
            }
            Node::InlineMath(math) => {
                ctx.tag("<span class=\"math math-inline\">");
                ctx.text(&math.value);
                ctx.tag("</span>");
            }
            Node::FootnoteReference(reference) => {
                let ordinal = ctx.footnote_ordinal(&reference.identifier);
                ctx.tag("<sup><a href=\"#fn-");
                ctx.attr(&reference.identifier);
                ctx.tag("\" id=\"fnref-");
                ctx.attr(&reference.identifier);
                ctx.tag("\" data-footnote-ref aria-describedby=\"footnote-label\">");
                ctx.raw(&ordinal.to_string());
                ctx.tag("</a></sup>");
            }
            Node::FootnoteDefinition(definition) => {
                ctx.buffer();
                for child in &definition.children {
                    self.render_node(child, ctx);
                }
                let html = ctx.resume();
                ctx.add_footnote_definition(definition.identifier.clone(), html);
            }
            // Frontmatter is split off before parsing; a stray marker node
            // renders nothing.
            Node::Yaml(_) | Node::Toml(_) => {}
            other => {
                log::warn!("unhandled markdown construct: {other:?}");
            }
        }
    }

    fn render_list(&mut self, list: &markdown::mdast::List, ctx: &mut CompileContext) {
        let tag = if list.ordered { "ol" } else { "ul" };
        match list.start {
            Some(start) if list.ordered && start != 1 => {
                ctx.tag(&format!("<{tag} start=\"{start}\">"));
            }
            _ => ctx.tag(&format!("<{tag}>")),
        }
        ctx.push_list(!list.spread);
        for child in &list.children {
            self.render_node(child, ctx);
        }
        ctx.pop_list();
        ctx.tag(&format!("</{tag}>"));
    }

    fn render_list_item(&mut self, item: &markdown::mdast::ListItem, ctx: &mut CompileContext) {
        if let Some(checked) = item.checked {
            ctx.tag("<li class=\"task-list-item\">");
            if checked {
                ctx.tag("<input type=\"checkbox\" disabled checked />");
            } else {
                ctx.tag("<input type=\"checkbox\" disabled />");
            }
            ctx.raw(" ");
        } else {
            ctx.tag("<li>");
        }
        for child in &item.children {
            self.render_node(child, ctx);
        }
        ctx.tag("</li>");
    }

    fn render_table(&mut self, table: &markdown::mdast::Table, ctx: &mut CompileContext) {
        ctx.tag("<table>");
        let mut rows = table.children.iter();
        if let Some(Node::TableRow(header)) = rows.next() {
            ctx.tag("<thead>");
            self.render_table_row(header, ctx, true, &table.align);
            ctx.tag("</thead>");
        }
        let body: Vec<&Node> = rows.collect();
        if !body.is_empty() {
            ctx.tag("<tbody>");
            for row in body {
                if let Node::TableRow(row) = row {
                    self.render_table_row(row, ctx, false, &table.align);
                }
            }
            ctx.tag("</tbody>");
        }
        ctx.tag("</table>");
    }

    fn render_table_row(
        &mut self,
        row: &markdown::mdast::TableRow,
        ctx: &mut CompileContext,
        is_header: bool,
        aligns: &[AlignKind],
    ) {
        ctx.tag("<tr>");
        for (index, cell) in row.children.iter().enumerate() {
            if let Node::TableCell(cell) = cell {
                let tag = if is_header { "th" } else { "td" };
                let align_attr = match aligns.get(index) {
                    Some(AlignKind::Left) => " align=\"left\"",
                    Some(AlignKind::Right) => " align=\"right\"",
                    Some(AlignKind::Center) => " align=\"center\"",
                    Some(AlignKind::None) | None => "",
                };
                ctx.tag(&format!("<{tag}{align_attr}>"));
                for child in &cell.children {
                    self.render_node(child, ctx);
                }
                ctx.tag(&format!("</{tag}>"));
            }
        }
        ctx.tag("</tr>");
    }

    /// Lower a code construct into fence events, or fall back to plain
    /// `<pre><code>` for indented code.
    fn render_code(&mut self, code: &markdown::mdast::Code, ctx: &mut CompileContext) {
        let slice = self.node_slice(code.position.as_ref());
        let opener = slice.and_then(fence::opening_marker);
        let Some((slice, (marker, open_len))) = slice.zip(opener) else {
            ctx.line_ending_if_needed();
            ctx.tag("<pre><code>");
            ctx.text(&code.value);
            ctx.raw("\n");
            ctx.tag("</code></pre>");
            return;
        };

        self.enter(TokenKind::CodeFenced, "", ctx);
        if let Some(language) = &code.lang {
            let meta = code.meta.as_deref().unwrap_or("");
            let (info, rest) = fence::split_info_meta(language, meta);
            self.exit(TokenKind::CodeFencedFenceInfo, &info, ctx);
            if !rest.is_empty() {
                self.exit(TokenKind::CodeFencedFenceMeta, rest, ctx);
            }
        }
        self.exit(TokenKind::CodeFencedFence, "", ctx);

        let closed = fence::has_closing_fence(slice, marker, open_len);
        if code.value.is_empty() {
            // An empty value can still span blank lines between the fences;
            // each source newline is its own boundary event (the first is
            // the opening fence's, the rest become empty code lines).
            for _ in 0..slice.matches('\n').count() {
                self.exit(TokenKind::LineEnding, "\n", ctx);
            }
        } else {
            self.exit(TokenKind::LineEnding, "\n", ctx);
            let lines: Vec<&str> = code.value.split('\n').collect();
            for (index, line) in lines.iter().enumerate() {
                if !line.is_empty() {
                    self.exit(TokenKind::CodeFlowValue, line, ctx);
                }
                if index + 1 < lines.len() {
                    self.exit(TokenKind::LineEnding, "\n", ctx);
                }
            }
            if closed {
                self.exit(TokenKind::LineEnding, "\n", ctx);
            }
        }
        if closed {
            self.exit(TokenKind::CodeFencedFence, "", ctx);
        }
        self.exit(TokenKind::CodeFenced, "", ctx);
    }

    /// Lower a heading into hash-style or underline-style events.
    fn render_heading(&mut self, heading: &markdown::mdast::Heading, ctx: &mut CompileContext) {
        let slice = self.node_slice(heading.position.as_ref());
        let is_atx = slice.is_none_or(|s| s.trim_start().starts_with('#'));
        if is_atx {
            let opening = "#".repeat(heading.depth as usize);
            self.exit(TokenKind::AtxHeadingSequence, &opening, ctx);
            let text = extract_text_from_nodes(&heading.children);
            self.exit(TokenKind::Data, &text, ctx);
            if let Some(trailing) = slice.and_then(trailing_hash_sequence) {
                self.exit(TokenKind::AtxHeadingSequence, trailing, ctx);
            }
            self.exit(TokenKind::AtxHeading, "", ctx);
        } else {
            self.enter(TokenKind::SetextHeading, "", ctx);
            for child in &heading.children {
                self.render_node(child, ctx);
            }
            self.exit(TokenKind::SetextHeading, "", ctx);
        }
    }
}

/// The decorative closing `#` run of a hash-style heading, when present.
fn trailing_hash_sequence(slice: &str) -> Option<&str> {
    let first_line = slice.lines().next().unwrap_or(slice).trim_end();
    let before = first_line.trim_end_matches('#');
    if before.len() < first_line.len() && before.ends_with(char::is_whitespace) {
        Some(&first_line[before.len()..])
    } else {
        None
    }
}
