//! # tracewire
//!
//! Trace and span identifier generation, and trace-context propagation
//! across a single RPC hop.
//!
//! ## Quick Start
//!
//! ```rust
//! use tracewire::prelude::*;
//!
//! let mut ids = SequentialIdGenerator::new();
//! assert_eq!(ids.next_trace_id(), TraceId::new(0, 1));
//!
//! let metadata: MetadataBundle = [("x-req-id", "abc"), ("x-req-id", "def")]
//!     .into_iter()
//!     .collect();
//! let ctx = CallContext::with_metadata(metadata);
//! let resp = EchoService.hello(&ctx, HelloRequest::new("hi")).unwrap();
//!
//! assert_eq!(resp.payload, "World");
//! assert_eq!(resp.metadata["x-req-id"], "abc");
//! ```
//!
//! ## Optional Features
//!
//! - `tracing` (default) - debug/warn events on the handler path
//! - `extras` (default) - `.env`/environment configuration and logging setup
//! - `testing` - in-process transport for driving handlers from tests

// Re-export core functionality
pub use tracewire_core::*;

#[cfg(feature = "extras")]
pub use tracewire_extras::{config, logging};
#[cfg(feature = "extras")]
pub use tracewire_extras::{
    init_logging, Config, ConfigError, Environment, IdStrategy, LogFormat, LoggingConfig,
    TracewireConfig,
};

#[cfg(feature = "testing")]
pub use tracewire_testing as testing;

/// Prelude module - import everything you need with `use tracewire::prelude::*`
pub mod prelude {
    pub use tracewire_core::{
        collapse_multi_value, extract_b3, extract_incoming, inject_b3, inject_outgoing,
        CallContext, CallOutcome, Code, EchoService, HelloRequest, HelloResponse, HelloService,
        IdGenerator, MetadataBundle, MetadataCarrier, RandomIdGenerator, RandomStrategy,
        SequentialIdGenerator, SharedIdGenerator, SpanContext, SpanId, Status, TraceId, Traced,
    };

    #[cfg(feature = "extras")]
    pub use tracewire_extras::{init_logging, TracewireConfig};

    pub use tracing::{debug, error, info, instrument, trace, warn};
}
