//! # tracewire core
//!
//! Identifier generation and trace-context propagation for a single RPC hop.
//!
//! This crate is not meant to be used directly. Use `tracewire` instead.

#[macro_use]
mod tracing_macros;

pub mod b3;
mod codec;
mod context;
pub mod generator;
mod id;
mod metadata;
mod service;
mod status;
mod traced;

// Public API
pub use b3::{extract_b3, inject_b3, B3Error};
pub use codec::{collapse_multi_value, extract_incoming, inject_outgoing, MetadataCarrier};
pub use context::{CallContext, SpanContext};
pub use generator::{
    IdGenerator, RandomIdGenerator, RandomStrategy, SequentialIdGenerator, SharedIdGenerator,
};
pub use id::{ParseIdError, SpanId, TraceId};
pub use metadata::{Iter as MetadataIter, MetadataBundle};
pub use service::{EchoService, HelloRequest, HelloResponse, HelloService, FAIL_PAYLOAD};
pub use status::{CallOutcome, Code, Status};
pub use traced::Traced;
