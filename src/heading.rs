//! Heading anchor extension: rank/text accumulation and slugged anchors.

use std::sync::Arc;

use crate::context::CompileContext;
use crate::extension::{ExtensionFactory, HtmlExtension};
use crate::slug::{SlugSet, transliterate};
use crate::token::{Handled, Token, TokenKind};

/// Snapshot of one heading, handed to the renderer when the construct closes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Heading level. Clamped to 1..=6 by the default renderer.
    pub rank: u8,
    /// Heading content, already HTML-safe (escaped text or rendered inline
    /// markup for underline-style headings).
    pub text: String,
}

/// Renders a [`Heading`] snapshot into HTML markup.
///
/// The renderer owns slug assignment so replacements can change the anchor
/// scheme; the slug set handle keeps deduplication per-document.
pub trait RenderHeading: Send + Sync {
    /// Produce the full markup for one heading.
    fn render(&self, heading: &Heading, slugs: &mut SlugSet) -> String;
}

/// Default renderer: `<hN class="heading">` with an invisible anchor link.
#[derive(Debug, Default, Clone, Copy)]
pub struct HeadingRenderer;

impl RenderHeading for HeadingRenderer {
    fn render(&self, heading: &Heading, slugs: &mut SlugSet) -> String {
        let rank = heading.rank.clamp(1, 6);
        let slug = slugs.assign(&transliterate(&heading.text));
        format!(
            "<h{rank} class=\"heading\"><a aria-hidden=\"true\" tabindex=\"-1\" \
             class=\"heading-anchor\" href=\"#{slug}\" id=\"{slug}\"></a><span>{text}</span></h{rank}>",
            text = heading.text,
        )
    }
}

/// Factory for the heading anchor extension.
pub struct HeadingAnchorsHtml {
    renderer: Arc<dyn RenderHeading>,
}

impl Default for HeadingAnchorsHtml {
    fn default() -> Self {
        Self {
            renderer: Arc::new(HeadingRenderer),
        }
    }
}

impl HeadingAnchorsHtml {
    /// Create the extension with a custom renderer.
    pub fn with_renderer(renderer: Arc<dyn RenderHeading>) -> Self {
        Self { renderer }
    }
}

impl ExtensionFactory for HeadingAnchorsHtml {
    fn build(&self) -> Box<dyn HtmlExtension> {
        Box::new(HeadingHooks {
            renderer: Arc::clone(&self.renderer),
            rank: None,
            text: String::new(),
        })
    }
}

struct HeadingHooks {
    renderer: Arc<dyn RenderHeading>,
    rank: Option<u8>,
    text: String,
}

impl HeadingHooks {
    fn finish(&mut self, text: String, ctx: &mut CompileContext) {
        let heading = Heading {
            rank: self.rank.take().unwrap_or(1),
            text,
        };
        let markup = self.renderer.render(&heading, ctx.slugs_mut());
        ctx.raw(&markup);
        self.text.clear();
    }
}

impl HtmlExtension for HeadingHooks {
    fn enter(&mut self, token: &Token<'_>, ctx: &mut CompileContext) -> Handled {
        match token.kind {
            TokenKind::SetextHeading => {
                // Capture the inline content so it can be wrapped later.
                ctx.buffer();
                Handled::Consumed
            }
            _ => Handled::Pass,
        }
    }

    fn exit(&mut self, token: &Token<'_>, ctx: &mut CompileContext) -> Handled {
        match token.kind {
            TokenKind::AtxHeadingSequence => {
                // Only the opening marker run sets the rank; a closing run is
                // decorative.
                if self.rank.is_none() {
                    self.rank = Some(token.text.len().min(6) as u8);
                    ctx.line_ending_if_needed();
                }
                Handled::Consumed
            }
            TokenKind::Data => {
                if self.rank.is_some() {
                    // Last write wins across split text events.
                    self.text = html_escape::encode_text(token.text).into_owned();
                    Handled::Consumed
                } else {
                    Handled::Pass
                }
            }
            TokenKind::AtxHeading => {
                let text = std::mem::take(&mut self.text);
                self.finish(text, ctx);
                Handled::Consumed
            }
            TokenKind::SetextHeading => {
                let text = ctx.resume();
                ctx.line_ending_if_needed();
                self.finish(text, ctx);
                ctx.set_swallow_all();
                Handled::Consumed
            }
            _ => Handled::Pass,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn renders_anchor_markup() {
        let mut slugs = SlugSet::new();
        let heading = Heading {
            rank: 2,
            text: "Getting Started".to_string(),
        };
        assert_eq!(
            HeadingRenderer.render(&heading, &mut slugs),
            "<h2 class=\"heading\"><a aria-hidden=\"true\" tabindex=\"-1\" \
             class=\"heading-anchor\" href=\"#getting-started\" id=\"getting-started\"></a>\
             <span>Getting Started</span></h2>"
        );
    }

    #[test]
    fn duplicate_headings_get_suffixed_slugs() {
        let mut slugs = SlugSet::new();
        let heading = Heading {
            rank: 1,
            text: "Intro".to_string(),
        };
        let first = HeadingRenderer.render(&heading, &mut slugs);
        let second = HeadingRenderer.render(&heading, &mut slugs);
        assert!(first.contains("id=\"intro\""));
        assert!(second.contains("id=\"intro-1\""));
    }

    #[test]
    fn rank_is_clamped_to_heading_levels() {
        let mut slugs = SlugSet::new();
        let heading = Heading {
            rank: 9,
            text: "Deep".to_string(),
        };
        assert!(HeadingRenderer.render(&heading, &mut slugs).starts_with("<h6"));
        let heading = Heading {
            rank: 0,
            text: "Shallow".to_string(),
        };
        assert!(HeadingRenderer.render(&heading, &mut slugs).starts_with("<h1"));
    }

    #[test]
    fn empty_text_anchors_to_heading_fallback() {
        let mut slugs = SlugSet::new();
        let heading = Heading {
            rank: 1,
            text: String::new(),
        };
        assert!(HeadingRenderer.render(&heading, &mut slugs).contains("href=\"#heading\""));
    }

    #[test]
    fn hash_heading_events_produce_anchored_markup() {
        let factory = HeadingAnchorsHtml::default();
        let mut hooks = factory.build();
        let mut ctx = CompileContext::new();

        hooks.exit(&Token::new(TokenKind::AtxHeadingSequence, "##"), &mut ctx);
        hooks.exit(&Token::new(TokenKind::Data, "Setup & Use"), &mut ctx);
        hooks.exit(&Token::new(TokenKind::AtxHeading, ""), &mut ctx);

        let html = ctx.finish();
        assert!(html.starts_with("<h2 class=\"heading\">"));
        assert!(html.contains("<span>Setup &amp; Use</span>"));
    }

    #[test]
    fn text_outside_headings_falls_through() {
        let factory = HeadingAnchorsHtml::default();
        let mut hooks = factory.build();
        let mut ctx = CompileContext::new();
        assert_eq!(
            hooks.exit(&Token::new(TokenKind::Data, "plain"), &mut ctx),
            Handled::Pass
        );
    }

    #[test]
    fn underline_heading_wraps_buffered_content() {
        let factory = HeadingAnchorsHtml::default();
        let mut hooks = factory.build();
        let mut ctx = CompileContext::new();

        hooks.enter(&Token::new(TokenKind::SetextHeading, ""), &mut ctx);
        ctx.text("Title");
        hooks.exit(&Token::new(TokenKind::SetextHeading, ""), &mut ctx);

        let html = ctx.finish();
        assert!(html.starts_with("<h1 class=\"heading\">"));
        assert!(html.contains("<span>Title</span>"));
        assert!(html.contains("id=\"title\""));
    }
}
