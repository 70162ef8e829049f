//! Zipkin B3 trace-context propagation over a [`MetadataBundle`]
//!
//! Both encodings are read:
//!
//! - multi-header: `x-b3-traceid`, `x-b3-spanid`, `x-b3-parentspanid`,
//!   `x-b3-sampled`, `x-b3-flags`
//! - single header: `b3: {traceid}-{spanid}[-{sampling}[-{parentspanid}]]`,
//!   or a lone sampling state `0`, `1` or `d`
//!
//! The single header wins when both are present. Writing always uses the
//! multi-header form.

use crate::context::SpanContext;
use crate::id::{SpanId, TraceId};
use crate::metadata::MetadataBundle;

/// Multi-header trace ID key
pub const TRACE_ID_HEADER: &str = "x-b3-traceid";

/// Multi-header span ID key
pub const SPAN_ID_HEADER: &str = "x-b3-spanid";

/// Multi-header parent span ID key
pub const PARENT_SPAN_ID_HEADER: &str = "x-b3-parentspanid";

/// Multi-header sampling decision key
pub const SAMPLED_HEADER: &str = "x-b3-sampled";

/// Multi-header debug flag key
pub const FLAGS_HEADER: &str = "x-b3-flags";

/// Single-header key
pub const SINGLE_HEADER: &str = "b3";

/// Error returned for malformed B3 headers
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum B3Error {
    #[error("invalid B3 trace id")]
    InvalidTraceId,
    #[error("invalid B3 span id")]
    InvalidSpanId,
    #[error("invalid B3 parent span id")]
    InvalidParentSpanId,
    #[error("invalid B3 sampled value")]
    InvalidSampled,
    #[error("invalid B3 flags value")]
    InvalidFlags,
    #[error("B3 requires either both trace id and span id or neither")]
    InvalidScope,
    #[error("B3 parent span id requires both trace id and span id")]
    InvalidScopeParent,
    #[error("malformed B3 single header")]
    InvalidSingleHeader,
}

/// Read a B3 span context from incoming metadata.
///
/// Returns `Ok(None)` when no identifiers are present, including when only a
/// sampling decision was sent. Only the first value of each key is read.
pub fn extract_b3(metadata: &MetadataBundle) -> Result<Option<SpanContext>, B3Error> {
    if let Some(single) = metadata.get(SINGLE_HEADER) {
        return parse_single(single);
    }

    let trace_id = metadata.get(TRACE_ID_HEADER);
    let span_id = metadata.get(SPAN_ID_HEADER);
    let parent_id = metadata.get(PARENT_SPAN_ID_HEADER);

    let sampled = metadata.get(SAMPLED_HEADER).map(parse_sampled).transpose()?;
    let debug = match metadata.get(FLAGS_HEADER) {
        None | Some("0") => false,
        Some("1") => true,
        Some(_) => return Err(B3Error::InvalidFlags),
    };

    let (trace_id, span_id) = match (trace_id, span_id) {
        (Some(trace_id), Some(span_id)) => (trace_id, span_id),
        (None, None) if parent_id.is_some() => return Err(B3Error::InvalidScopeParent),
        (None, None) => return Ok(None),
        _ => return Err(B3Error::InvalidScope),
    };

    Ok(Some(SpanContext {
        trace_id: parse_trace_id(trace_id)?,
        span_id: parse_span_id(span_id, B3Error::InvalidSpanId)?,
        parent_id: parent_id
            .map(|id| parse_span_id(id, B3Error::InvalidParentSpanId))
            .transpose()?,
        sampled,
        debug,
    }))
}

/// Write a span context as B3 multi-headers, replacing any B3 values
/// already in `metadata`.
pub fn inject_b3(span: &SpanContext, metadata: &mut MetadataBundle) {
    metadata.remove(SINGLE_HEADER);
    metadata.insert(TRACE_ID_HEADER, span.trace_id.to_string());
    metadata.insert(SPAN_ID_HEADER, span.span_id.to_string());

    match span.parent_id {
        Some(parent) => metadata.insert(PARENT_SPAN_ID_HEADER, parent.to_string()),
        None => {
            metadata.remove(PARENT_SPAN_ID_HEADER);
        }
    }

    metadata.remove(SAMPLED_HEADER);
    metadata.remove(FLAGS_HEADER);
    if span.debug {
        metadata.insert(FLAGS_HEADER, "1");
    } else if let Some(sampled) = span.sampled {
        metadata.insert(SAMPLED_HEADER, if sampled { "1" } else { "0" });
    }
}

fn parse_single(value: &str) -> Result<Option<SpanContext>, B3Error> {
    let parts: Vec<&str> = value.split('-').collect();

    match parts.as_slice() {
        ["0" | "1" | "d"] => Ok(None),
        [trace_id, span_id, rest @ ..] if rest.len() <= 2 => {
            let (sampled, debug) = match rest.first() {
                None => (None, false),
                Some(&"0") => (Some(false), false),
                Some(&"1") => (Some(true), false),
                Some(&"d") => (None, true),
                Some(_) => return Err(B3Error::InvalidSampled),
            };
            Ok(Some(SpanContext {
                trace_id: parse_trace_id(trace_id)?,
                span_id: parse_span_id(span_id, B3Error::InvalidSpanId)?,
                parent_id: rest
                    .get(1)
                    .map(|id| parse_span_id(id, B3Error::InvalidParentSpanId))
                    .transpose()?,
                sampled,
                debug,
            }))
        }
        _ => Err(B3Error::InvalidSingleHeader),
    }
}

fn parse_sampled(value: &str) -> Result<bool, B3Error> {
    match value {
        "1" | "true" => Ok(true),
        "0" | "false" => Ok(false),
        _ => Err(B3Error::InvalidSampled),
    }
}

fn parse_trace_id(value: &str) -> Result<TraceId, B3Error> {
    match value.parse::<TraceId>() {
        Ok(id) if !id.is_empty() => Ok(id),
        _ => Err(B3Error::InvalidTraceId),
    }
}

fn parse_span_id(value: &str, err: B3Error) -> Result<SpanId, B3Error> {
    match value.parse::<SpanId>() {
        Ok(id) if id.0 != 0 => Ok(id),
        _ => Err(err),
    }
}
