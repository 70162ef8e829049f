//! Trace and span identifier generation
//!
//! [`IdGenerator`] is the seam an instrumentation layer depends on. Two
//! families of strategy implement it:
//!
//! - [`SequentialIdGenerator`]: deterministic counters, for tests
//! - [`RandomIdGenerator`]: random (optionally time-prefixed) values, for
//!   uniqueness across restarts and processes
//!
//! # Concurrency
//!
//! Generators are not internally synchronized: every method takes
//! `&mut self`. To share one instance between concurrent calls, wrap it in a
//! [`SharedIdGenerator`], which serializes access behind a mutex.
//!
//! # Example
//!
//! ```rust
//! use tracewire_core::{IdGenerator, SequentialIdGenerator, SpanId, TraceId};
//!
//! let mut ids = SequentialIdGenerator::new();
//! let trace = ids.next_trace_id();
//! assert_eq!(trace, TraceId::new(0, 1));
//! assert_eq!(ids.next_span_id(trace), SpanId(1));
//! ```

use crate::id::{SpanId, TraceId};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::{SystemTime, UNIX_EPOCH};

/// Strategy for producing fresh trace and span identifiers.
pub trait IdGenerator {
    /// Return a trace ID not previously returned by this instance.
    fn next_trace_id(&mut self) -> TraceId;

    /// Return a span ID not previously returned by this instance, for any
    /// trace.
    ///
    /// `trace_id` is the trace the span will belong to. Simple strategies
    /// ignore it; trace-aware strategies may derive part of the span ID
    /// from it.
    fn next_span_id(&mut self, trace_id: TraceId) -> SpanId;
}

impl<G: IdGenerator + ?Sized> IdGenerator for &mut G {
    fn next_trace_id(&mut self) -> TraceId {
        (**self).next_trace_id()
    }

    fn next_span_id(&mut self, trace_id: TraceId) -> SpanId {
        (**self).next_span_id(trace_id)
    }
}

impl<G: IdGenerator + ?Sized> IdGenerator for Box<G> {
    fn next_trace_id(&mut self) -> TraceId {
        (**self).next_trace_id()
    }

    fn next_span_id(&mut self, trace_id: TraceId) -> SpanId {
        (**self).next_span_id(trace_id)
    }
}

/// Deterministic generator backed by two independent counters.
///
/// The n-th trace ID is `TraceId { high: 0, low: n }` and the n-th span ID is
/// `SpanId(n)`, both counting from 1. Output is reproducible, so it is only
/// unique within one instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequentialIdGenerator {
    next_trace_id: u64,
    next_span_id: u64,
}

impl SequentialIdGenerator {
    /// Create a generator whose first trace and span IDs are both 1
    pub fn new() -> Self {
        Self {
            next_trace_id: 1,
            next_span_id: 1,
        }
    }
}

impl Default for SequentialIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl IdGenerator for SequentialIdGenerator {
    fn next_trace_id(&mut self) -> TraceId {
        let id = TraceId::from_low(self.next_trace_id);
        self.next_trace_id += 1;
        id
    }

    fn next_span_id(&mut self, _trace_id: TraceId) -> SpanId {
        let id = SpanId(self.next_span_id);
        self.next_span_id += 1;
        id
    }
}

/// Layout of the trace IDs produced by [`RandomIdGenerator`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RandomStrategy {
    /// Random 64-bit trace IDs (`high` is zero)
    #[default]
    Random64,
    /// Random 128-bit trace IDs
    Random128,
    /// 128-bit trace IDs whose first 32 bits are the current unix time in
    /// seconds, compatible with AWS X-Ray style IDs
    Timestamped,
}

/// Generator drawing identifiers from a seeded PRNG.
///
/// Zero is never returned for any word that carries the ID. No history is
/// kept, so uniqueness is probabilistic rather than guaranteed.
pub struct RandomIdGenerator {
    rng: StdRng,
    strategy: RandomStrategy,
}

impl RandomIdGenerator {
    /// Create a generator seeded from OS entropy
    pub fn new(strategy: RandomStrategy) -> Self {
        Self {
            rng: StdRng::from_entropy(),
            strategy,
        }
    }

    /// Create a generator with a fixed seed. Two generators built with the
    /// same seed and strategy produce the same sequence, except for the
    /// time prefix of [`RandomStrategy::Timestamped`].
    pub fn with_seed(strategy: RandomStrategy, seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
            strategy,
        }
    }

    /// The configured strategy
    pub fn strategy(&self) -> RandomStrategy {
        self.strategy
    }

    fn non_zero(&mut self) -> u64 {
        loop {
            let value: u64 = self.rng.gen();
            if value != 0 {
                return value;
            }
        }
    }
}

impl Default for RandomIdGenerator {
    fn default() -> Self {
        Self::new(RandomStrategy::default())
    }
}

impl fmt::Debug for RandomIdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RandomIdGenerator")
            .field("strategy", &self.strategy)
            .finish_non_exhaustive()
    }
}

impl IdGenerator for RandomIdGenerator {
    fn next_trace_id(&mut self) -> TraceId {
        match self.strategy {
            RandomStrategy::Random64 => TraceId::from_low(self.non_zero()),
            RandomStrategy::Random128 => TraceId::new(self.non_zero(), self.non_zero()),
            RandomStrategy::Timestamped => {
                let seconds = SystemTime::now()
                    .duration_since(UNIX_EPOCH)
                    .map(|d| d.as_secs())
                    .unwrap_or_default();
                let high = (seconds << 32) | u64::from(self.rng.gen::<u32>());
                TraceId::new(high, self.non_zero())
            }
        }
    }

    fn next_span_id(&mut self, _trace_id: TraceId) -> SpanId {
        SpanId(self.non_zero())
    }
}

/// Cloneable handle serializing access to one generator.
///
/// Each draw holds the lock for a single call, so concurrent callers never
/// observe the same counter state.
#[derive(Debug, Default)]
pub struct SharedIdGenerator<G> {
    inner: Arc<Mutex<G>>,
}

impl<G> Clone for SharedIdGenerator<G> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<G: IdGenerator> SharedIdGenerator<G> {
    /// Wrap a generator for shared use
    pub fn new(generator: G) -> Self {
        Self {
            inner: Arc::new(Mutex::new(generator)),
        }
    }

    /// Draw a trace ID
    pub fn next_trace_id(&self) -> TraceId {
        self.with_lock(|g| g.next_trace_id())
    }

    /// Draw a span ID for `trace_id`
    pub fn next_span_id(&self, trace_id: TraceId) -> SpanId {
        self.with_lock(|g| g.next_span_id(trace_id))
    }

    /// Run `f` with exclusive access, for draws that must not interleave
    /// with other callers.
    pub fn with_lock<R>(&self, f: impl FnOnce(&mut G) -> R) -> R {
        // A panic inside a draw cannot leave a counter half-updated.
        let mut guard = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut guard)
    }
}

impl<G: IdGenerator> IdGenerator for SharedIdGenerator<G> {
    fn next_trace_id(&mut self) -> TraceId {
        SharedIdGenerator::next_trace_id(self)
    }

    fn next_span_id(&mut self, trace_id: TraceId) -> SpanId {
        SharedIdGenerator::next_span_id(self, trace_id)
    }
}
