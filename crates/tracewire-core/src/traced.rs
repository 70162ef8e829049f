//! Service wrapper assigning trace and span IDs to every call

use crate::b3::extract_b3;
use crate::context::{CallContext, SpanContext};
use crate::generator::{IdGenerator, SharedIdGenerator};
use crate::service::{HelloRequest, HelloResponse, HelloService};
use crate::status::CallOutcome;
use tracing::field;

/// Wraps a [`HelloService`] and gives each call its own span.
///
/// A call carrying valid B3 headers continues the caller's trace as a child
/// span. Anything else (no headers, malformed headers, or no metadata
/// facility) starts a new trace. The assigned [`SpanContext`] is attached to
/// the context the inner service sees and recorded on an `rpc.server`
/// tracing span. Incoming metadata is left untouched, and so is the outcome.
///
/// The generator is shared by all concurrent calls through a
/// [`SharedIdGenerator`].
#[derive(Debug, Clone)]
pub struct Traced<S, G> {
    inner: S,
    ids: SharedIdGenerator<G>,
}

impl<S, G: IdGenerator> Traced<S, G> {
    /// Wrap `inner`, drawing identifiers from `ids`
    pub fn new(inner: S, ids: SharedIdGenerator<G>) -> Self {
        Self { inner, ids }
    }

    /// The shared generator
    pub fn ids(&self) -> &SharedIdGenerator<G> {
        &self.ids
    }

    /// The wrapped service
    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn assign_span(&self, ctx: &CallContext) -> SpanContext {
        let parent = match ctx.incoming().map(extract_b3).transpose() {
            Ok(parent) => parent.flatten(),
            Err(err) => {
                trace_warn!(error = %err, "ignoring malformed B3 headers");
                None
            }
        };

        match parent {
            Some(parent) => parent.child(self.ids.next_span_id(parent.trace_id)),
            None => self.ids.with_lock(|ids| {
                let trace_id = ids.next_trace_id();
                let span_id = ids.next_span_id(trace_id);
                SpanContext::root(trace_id, span_id)
            }),
        }
    }
}

impl<S, G> HelloService for Traced<S, G>
where
    S: HelloService,
    G: IdGenerator + Send + 'static,
{
    fn hello(&self, ctx: &CallContext, request: HelloRequest) -> CallOutcome<HelloResponse> {
        let assigned = self.assign_span(ctx);

        let span = tracing::info_span!(
            "rpc.server",
            trace_id = %assigned.trace_id,
            span_id = %assigned.span_id,
            parent_id = field::Empty,
        );
        if let Some(parent) = assigned.parent_id {
            span.record("parent_id", field::display(parent));
        }
        let _enter = span.enter();

        let mut ctx = ctx.clone();
        ctx.set_span(assigned);

        let outcome = self.inner.hello(&ctx, request);
        if let Err(status) = &outcome {
            trace_info!(code = %status.code, message = %status.message, "rpc.server: failed");
        } else {
            trace_debug!("rpc.server: ok");
        }
        outcome
    }
}
