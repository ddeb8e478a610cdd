//! Conditional tracing macros (zero-cost when feature disabled).
//!
//! Spans wrap whole detections and benchmark passes; events carry per-item
//! measurements and the skip/fallback diagnostics. With the `tracing` feature
//! off every macro compiles away.

/// Create an info-level span for a major operation.
#[cfg(feature = "tracing")]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        tracing::info_span!($name $(, $($field)*)?)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_span {
    ($name:expr $(, $($field:tt)*)?) => {
        $crate::trace::NoopSpan
    };
}

/// Emit an info-level event for key measurements.
#[cfg(feature = "tracing")]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::info!(name: $name, $($key = $value),+)
    };
    ($name:expr) => {
        tracing::info!(name: $name)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_event {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        let _ = ($(&$value,)+);
    };
    ($name:expr) => {};
}

/// Emit a debug-level event for per-template detail.
#[cfg(feature = "tracing")]
macro_rules! trace_debug {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::debug!(name: $name, $($key = $value),+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_debug {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        let _ = ($(&$value,)+);
    };
}

/// Emit a warn-level event for skipped items and degraded searches.
#[cfg(feature = "tracing")]
macro_rules! trace_warn {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        tracing::warn!(name: $name, $($key = $value),+)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_warn {
    ($name:expr, $($key:ident = $value:expr),+ $(,)?) => {
        let _ = ($(&$value,)+);
    };
}

pub(crate) use trace_debug;
pub(crate) use trace_event;
pub(crate) use trace_span;
pub(crate) use trace_warn;

/// A no-op span guard used when tracing is disabled.
///
/// Lets `let _guard = trace_span!(...).entered();` compile unchanged.
#[cfg(not(feature = "tracing"))]
pub struct NoopSpan;

#[cfg(not(feature = "tracing"))]
impl NoopSpan {
    /// Returns self, mimicking `Span::entered()`.
    #[inline]
    pub fn entered(self) -> Self {
        self
    }
}
