//! Extension traits for hooking into HTML compilation.

use crate::context::CompileContext;
use crate::token::{Handled, Token};

/// Per-compile handler for enter/exit events in the token stream.
///
/// Implementations are stateful: a fresh instance is built for every compile
/// call, so accumulated state (code lines, heading text) never leaks across
/// documents.
pub trait HtmlExtension {
    /// Called when a construct opens. Return [`Handled::Pass`] for events the
    /// extension does not subscribe to.
    fn enter(&mut self, token: &Token<'_>, ctx: &mut CompileContext) -> Handled;

    /// Called when a construct closes.
    fn exit(&mut self, token: &Token<'_>, ctx: &mut CompileContext) -> Handled;
}

/// Builds one [`HtmlExtension`] instance per compile call.
///
/// Factories carry the configuration shared across compiles (renderers,
/// display flags) and must be safe to share between threads.
pub trait ExtensionFactory: Send + Sync {
    /// Create the per-compile handler.
    fn build(&self) -> Box<dyn HtmlExtension>;
}
