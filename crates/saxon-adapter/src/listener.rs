//! Saxon trace listener to canonical event translation

use tracing::{debug, trace};
use xslt_trace_core::{CanonicalEvent, EngineAdapter, EventSink, Level, Location, Result, Tag};

use crate::native::{ExpressionKind, Item, PropertyValue, Traceable, TraceableKind};

/// Namespace announced on the trace root
pub const XSLT_NAMESPACE: &str = "http://www.w3.org/1999/XSL/Transform";

/// Canonical tag and level of a traceable.
///
/// Components (rules, functions, globals) are level 1, instructions level 2
/// and every other expression level 3.
pub fn classify(kind: &TraceableKind) -> (Tag, Level) {
    match kind {
        TraceableKind::TemplateRule { .. } => (Tag::TemplateMatch, Level::Rule),
        TraceableKind::NamedTemplate { .. } => (Tag::NamedTemplate, Level::Rule),
        TraceableKind::UserFunction { .. } => (Tag::Function, Level::Rule),
        TraceableKind::GlobalParam { .. } => (Tag::Param, Level::Rule),
        TraceableKind::GlobalVariable { .. } => (Tag::Variable, Level::Rule),
        TraceableKind::TraceCall => (Tag::TraceCall, Level::Expression),
        TraceableKind::Expression(expr) => match expr {
            ExpressionKind::FixedElement => (Tag::LiteralElement, Level::Instruction),
            ExpressionKind::FixedAttribute => (Tag::LiteralAttribute, Level::Instruction),
            ExpressionKind::Instruction { .. } => (Tag::Misc, Level::Instruction),
            ExpressionKind::Let => (Tag::Variable, Level::Expression),
            ExpressionKind::TraceCall => (Tag::TraceCall, Level::Expression),
            ExpressionKind::Other { .. } => (Tag::Misc, Level::Expression),
        },
        TraceableKind::Other => (Tag::Misc, Level::Expression),
    }
}

/// Adapter behind a Saxon trace listener registration.
pub struct SaxonAdapter<S: EventSink> {
    sink: S,
    version: String,
    pub(crate) open_elements: Vec<String>,
}

impl<S: EventSink> SaxonAdapter<S> {
    /// `version` is the engine's product version, reported on open
    pub fn new<V: Into<String>>(sink: S, version: V) -> Self {
        Self {
            sink,
            version: version.into(),
            open_elements: Vec::new(),
        }
    }

    pub fn open(&mut self) -> Result<()> {
        debug!(version = %self.version, "saxon transformation started");
        let event = CanonicalEvent::document_enter()
            .with_attribute("saxon-version", self.version.as_str())
            .with_attribute("xmlns:xsl", XSLT_NAMESPACE);
        self.emit(event)
    }

    pub fn close(&mut self) -> Result<()> {
        debug!("saxon transformation finished");
        self.emit(CanonicalEvent::document_leave())
    }

    /// A traceable starts; `properties` keep the engine's order.
    ///
    /// Templates without a system id come from default rules.
    pub fn enter<T>(&mut self, info: &T, properties: &[(String, PropertyValue)]) -> Result<()>
    where
        T: Traceable + ?Sized,
    {
        let kind = info.kind();
        let location = info.location();
        let (tag, level) = classify(&kind);
        trace!(%tag, ?level, "saxon enter");

        let mut event = CanonicalEvent::enter(tag, level, location.clone());
        match &kind {
            TraceableKind::TemplateRule { match_pattern } => {
                event = event
                    .with_match(match_pattern.as_str())
                    .with_built_in(location.system_id.is_none());
            }
            TraceableKind::NamedTemplate { name } => {
                event = event
                    .with_match(name.as_str())
                    .with_built_in(location.system_id.is_none());
            }
            TraceableKind::Expression(ExpressionKind::Instruction { name })
            | TraceableKind::Expression(ExpressionKind::Other { name }) => {
                event = event.with_name(name.as_str());
            }
            _ => {}
        }
        for (key, value) in properties {
            if let Some(text) = value.as_text() {
                event = event.with_attribute(key.as_str(), text);
            }
        }
        if let Some(name) = component_name(&kind) {
            if !properties.iter().any(|(key, _)| key == "name") {
                event = event.with_attribute("name", name);
            }
        }
        self.emit(event)
    }

    pub fn leave<T>(&mut self, info: &T) -> Result<()>
    where
        T: Traceable + ?Sized,
    {
        let (_, level) = classify(&info.kind());
        self.emit(CanonicalEvent::leave(level))
    }

    /// An item becomes the context item
    pub fn start_current_item(&mut self, item: &Item) -> Result<()> {
        let event = match item {
            Item::Node(node) => {
                trace!(path = %node.path, "current item");
                CanonicalEvent::selection(node.kind.display_name(), node.location.clone())
            }
            Item::Atomic(value) => CanonicalEvent::selection(value.as_str(), Location::unknown()),
        };
        self.emit(event)
    }

    pub fn end_current_item(&mut self, _item: &Item) -> Result<()> {
        self.emit(CanonicalEvent::selection_end())
    }
}

fn component_name(kind: &TraceableKind) -> Option<&str> {
    match kind {
        TraceableKind::UserFunction { name }
        | TraceableKind::GlobalParam { name }
        | TraceableKind::GlobalVariable { name } => Some(name.as_str()),
        _ => None,
    }
}

impl<S: EventSink> EngineAdapter for SaxonAdapter<S> {
    type Sink = S;

    fn engine_name(&self) -> &'static str {
        "saxon"
    }

    fn sink(&self) -> &S {
        &self.sink
    }

    fn sink_mut(&mut self) -> &mut S {
        &mut self.sink
    }

    fn into_sink(self) -> S {
        self.sink
    }
}
