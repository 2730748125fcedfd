//! Debounced edge source
//!
//! Filters a noisy digital input into clean, delayed rising/falling edge
//! notifications. The raw notification context only does one atomic
//! compare-exchange and (at most) spawns a one-shot timer - it never
//! blocks and never runs a handler. Handlers run on the timer task after
//! the window elapses, against the level re-sampled at that moment.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, trace};

use crate::hal::{DigitalInput, RawEdgeCallback};

/// Handlers for the two clean edge directions.
pub struct EdgeHandlers {
    pub rising: Arc<dyn Fn() + Send + Sync>,
    pub falling: Arc<dyn Fn() + Send + Sync>,
}

/// One debounced input. Owns the pending flag and last-sampled level for
/// its wrapped line; lives for the process lifetime.
pub struct DebouncedInput {
    inner: Arc<DebounceInner>,
}

struct DebounceInner {
    name: &'static str,
    input: Arc<dyn DigitalInput>,
    window: Duration,
    /// True while a debounce timer is pending; raw edges arriving in that
    /// window are dropped (intended filtering, not an error).
    pending: AtomicBool,
    last_level: AtomicBool,
    handlers: EdgeHandlers,
    runtime: tokio::runtime::Handle,
}

impl DebouncedInput {
    /// Wrap `input`, initializing the last-sampled level from it, and
    /// subscribe to its raw edge notifications.
    ///
    /// Must be called from within a tokio runtime; the captured handle is
    /// what lets the raw callback arm timers from a foreign (interrupt)
    /// thread.
    pub fn attach(
        name: &'static str,
        input: Arc<dyn DigitalInput>,
        window: Duration,
        handlers: EdgeHandlers,
    ) -> Self {
        let inner = Arc::new(DebounceInner {
            name,
            last_level: AtomicBool::new(input.read()),
            input,
            window,
            pending: AtomicBool::new(false),
            handlers,
            runtime: tokio::runtime::Handle::current(),
        });

        let raw: RawEdgeCallback = {
            let inner = Arc::clone(&inner);
            Arc::new(move || {
                if inner
                    .pending
                    .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                    .is_err()
                {
                    trace!(input = inner.name, "debounce window pending, raw edge dropped");
                    return;
                }
                let timer = Arc::clone(&inner);
                inner.runtime.spawn(async move {
                    tokio::time::sleep(timer.window).await;
                    timer.settle();
                });
            })
        };
        inner.input.subscribe(raw);

        Self { inner }
    }

    pub fn name(&self) -> &'static str {
        self.inner.name
    }
}

impl DebounceInner {
    /// Window expired: re-sample and dispatch at most one clean edge.
    fn settle(&self) {
        let level = self.input.read();
        let last = self.last_level.swap(level, Ordering::AcqRel);

        if last && !level {
            debug!(input = self.name, "falling edge");
            (self.handlers.falling)();
        } else if !last && level {
            debug!(input = self.name, "rising edge");
            (self.handlers.rising)();
        }

        // Cleared after the handler ran, so a slow handler still counts
        // toward this input's window.
        self.pending.store(false, Ordering::Release);
    }
}
