//! The hello RPC and its metadata-echo handler

use crate::codec::{collapse_multi_value, extract_incoming, inject_outgoing, MetadataCarrier};
use crate::context::CallContext;
use crate::status::{CallOutcome, Status};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Payload that makes [`EchoService`] abort the call
pub const FAIL_PAYLOAD: &str = "fail";

const RESPONSE_PAYLOAD: &str = "World";

const METADATA_UNAVAILABLE: &str = "could not parse incoming metadata";

/// Inbound call body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloRequest {
    pub payload: String,
}

impl HelloRequest {
    /// Create a request with the given payload
    pub fn new(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
        }
    }
}

/// Outbound call body
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HelloResponse {
    pub payload: String,
    #[serde(default)]
    pub metadata: HashMap<String, String>,
}

impl MetadataCarrier for HelloResponse {
    fn metadata_mut(&mut self) -> &mut HashMap<String, String> {
        &mut self.metadata
    }
}

/// Server side of the hello RPC.
///
/// Implementations must be callable from many calls at once; each call gets
/// its own [`CallContext`].
pub trait HelloService: Send + Sync + 'static {
    /// Handle one call
    fn hello(&self, ctx: &CallContext, request: HelloRequest) -> CallOutcome<HelloResponse>;
}

impl<S: HelloService + ?Sized> HelloService for std::sync::Arc<S> {
    fn hello(&self, ctx: &CallContext, request: HelloRequest) -> CallOutcome<HelloResponse> {
        (**self).hello(ctx, request)
    }
}

/// Handler that answers `"World"` and echoes the caller's metadata back.
///
/// - payload `"fail"`: aborted with message `"fail"`, metadata untouched
/// - no metadata facility on the call: unknown error
/// - otherwise: the first value of every incoming key is copied into the
///   response metadata
#[derive(Debug, Clone, Copy, Default)]
pub struct EchoService;

impl EchoService {
    pub fn new() -> Self {
        Self
    }
}

impl HelloService for EchoService {
    fn hello(&self, ctx: &CallContext, request: HelloRequest) -> CallOutcome<HelloResponse> {
        if request.payload == FAIL_PAYLOAD {
            trace_debug!("hello: aborting on request");
            return Err(Status::aborted(FAIL_PAYLOAD));
        }

        let Some(incoming) = extract_incoming(ctx) else {
            trace_warn!("hello: call carries no metadata facility");
            return Err(Status::unknown(METADATA_UNAVAILABLE));
        };

        let mut response = HelloResponse {
            payload: RESPONSE_PAYLOAD.to_string(),
            metadata: HashMap::new(),
        };
        inject_outgoing(&mut response, collapse_multi_value(incoming));

        trace_debug!(keys = response.metadata.len(), "hello: echoing metadata");
        Ok(response)
    }
}
