//! Per-call context handed to handlers

use crate::id::{SpanId, TraceId};
use crate::metadata::MetadataBundle;
use serde::{Deserialize, Serialize};

/// Trace position of one call: which trace it belongs to and which span it is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpanContext {
    /// Trace the span belongs to
    pub trace_id: TraceId,
    /// This span
    pub span_id: SpanId,
    /// Span of the caller, if the call continued an existing trace
    pub parent_id: Option<SpanId>,
    /// Upstream sampling decision, `None` when deferred
    pub sampled: Option<bool>,
    /// Debug flag; implies sampled
    pub debug: bool,
}

impl SpanContext {
    /// Root span of a new trace, sampling deferred
    pub fn root(trace_id: TraceId, span_id: SpanId) -> Self {
        Self {
            trace_id,
            span_id,
            parent_id: None,
            sampled: None,
            debug: false,
        }
    }

    /// Child of this span in the same trace, inheriting sampling state
    pub fn child(&self, span_id: SpanId) -> Self {
        Self {
            trace_id: self.trace_id,
            span_id,
            parent_id: Some(self.span_id),
            sampled: self.sampled,
            debug: self.debug,
        }
    }

    /// Sampled either explicitly or through the debug flag
    pub fn is_sampled(&self) -> bool {
        self.debug || self.sampled == Some(true)
    }
}

/// Everything the transport knows about an inbound call besides its payload.
///
/// `incoming` is `None` when the transport exposed no metadata facility for
/// the call. That is different from a present but empty bundle.
#[derive(Debug, Clone, Default)]
pub struct CallContext {
    incoming: Option<MetadataBundle>,
    span: Option<SpanContext>,
}

impl CallContext {
    /// Context carrying the given incoming metadata
    pub fn with_metadata(metadata: MetadataBundle) -> Self {
        Self {
            incoming: Some(metadata),
            span: None,
        }
    }

    /// Context whose transport exposed no metadata
    pub fn without_metadata() -> Self {
        Self::default()
    }

    /// Incoming metadata, if the transport provided any
    pub fn incoming(&self) -> Option<&MetadataBundle> {
        self.incoming.as_ref()
    }

    /// Span assigned to this call by an instrumentation layer
    pub fn span(&self) -> Option<&SpanContext> {
        self.span.as_ref()
    }

    /// Attach the span assigned to this call
    pub fn set_span(&mut self, span: SpanContext) {
        self.span = Some(span);
    }
}

impl From<Option<MetadataBundle>> for CallContext {
    fn from(incoming: Option<MetadataBundle>) -> Self {
        Self {
            incoming,
            span: None,
        }
    }
}
