//! Nested trace output for the parser's recursive descent.
//!
//! Every handler opens a span on entry and closes it when the returned guard
//! drops, so the log shows a BEGIN/END tree. Enable with `RUST_LOG=monkey=trace`.

use tracing::span::EnteredSpan;

use crate::token::Token;

pub(crate) struct Trace {
    handler: &'static str,
    _span: EnteredSpan,
}

impl Drop for Trace {
    fn drop(&mut self) {
        tracing::trace!("END {}", self.handler);
    }
}

pub(crate) fn trace(handler: &'static str, cur: &Token) -> Trace {
    let span = tracing::trace_span!("parse", handler, token = %cur.literal).entered();
    tracing::trace!("BEGIN {}", handler);
    Trace { handler, _span: span }
}
