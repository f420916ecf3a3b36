//! Engine adapter abstractions
//!
//! An adapter translates one engine's native trace callbacks into
//! [`CanonicalEvent`]s, one event per callback, in callback order. It owns no
//! tree state and never filters; it only hands events to an [`EventSink`].

use crate::error::Result;
use crate::event::CanonicalEvent;

/// Selection payload used when the engine's selection cannot be inspected
pub const UNAVAILABLE: &str = "<unavailable>";

/// Intake operation for canonical events.
pub trait EventSink {
    /// Consume one event
    fn accept(&mut self, event: CanonicalEvent) -> Result<()>;
}

impl<S: EventSink + ?Sized> EventSink for &mut S {
    fn accept(&mut self, event: CanonicalEvent) -> Result<()> {
        (**self).accept(event)
    }
}

/// Collects events verbatim; handy for inspecting what an adapter emits.
impl EventSink for Vec<CanonicalEvent> {
    fn accept(&mut self, event: CanonicalEvent) -> Result<()> {
        self.push(event);
        Ok(())
    }
}

/// Trait implemented by every engine adapter
pub trait EngineAdapter {
    /// Where translated events go
    type Sink: EventSink;

    /// Short engine identifier, e.g. `"xalan"`
    fn engine_name(&self) -> &'static str;

    /// Get a reference to the sink
    fn sink(&self) -> &Self::Sink;

    /// Get a mutable reference to the sink
    fn sink_mut(&mut self) -> &mut Self::Sink;

    /// Give the sink back, typically to finish the builder behind it
    fn into_sink(self) -> Self::Sink
    where
        Self: Sized;

    /// Forward one translated event
    fn emit(&mut self, event: CanonicalEvent) -> Result<()> {
        self.sink_mut().accept(event)
    }
}
