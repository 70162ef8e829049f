//! Conditional tracing macros
//!
//! These wrap `tracing` events so the handler path compiles to nothing when
//! the `tracing` feature is disabled.

/// Log at warn level, only when tracing feature is enabled
#[cfg(feature = "tracing")]
macro_rules! trace_warn {
    ($($arg:tt)*) => {
        ::tracing::warn!($($arg)*)
    };
}

/// Log at warn level, no-op when tracing feature is disabled
#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn {
    ($($arg:tt)*) => {};
}

/// Log at info level, only when tracing feature is enabled
#[cfg(feature = "tracing")]
macro_rules! trace_info {
    ($($arg:tt)*) => {
        ::tracing::info!($($arg)*)
    };
}

/// Log at info level, no-op when tracing feature is disabled
#[cfg(not(feature = "tracing"))]
macro_rules! trace_info {
    ($($arg:tt)*) => {};
}

/// Log at debug level, only when tracing feature is enabled
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($($arg:tt)*) => {
        ::tracing::debug!($($arg)*)
    };
}

/// Log at debug level, no-op when tracing feature is disabled
#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($($arg:tt)*) => {};
}
