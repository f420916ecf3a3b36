//! Xalan listener to canonical event translation

use tracing::{debug, trace, warn};
use xslt_trace_core::{
    CanonicalEvent, EngineAdapter, EventSink, Level, Location, OutputEvent, OutputEventKind,
    Result, Tag, UNAVAILABLE,
};

use crate::native::{
    GenerateEvent, GenerateEventType, Selection, SelectionEvent, SourceNode, StyleNode, XslToken,
};

/// Canonical tag and level of a stylesheet element.
///
/// Templates are classified first; everything else falls through to the
/// element token.
pub fn classify(node: &StyleNode) -> (Tag, Level) {
    match node.token {
        XslToken::Template if node.match_pattern.is_some() => (Tag::TemplateMatch, Level::Rule),
        XslToken::Template if node.name.is_some() => (Tag::NamedTemplate, Level::Rule),
        XslToken::Template => (Tag::TemplateMatch, Level::Rule),
        XslToken::TextLiteralResult => (Tag::Misc, Level::Expression),
        XslToken::LiteralResult => (Tag::LiteralElement, Level::Instruction),
        XslToken::Attribute => (Tag::LiteralAttribute, Level::Instruction),
        XslToken::Variable => (Tag::Variable, Level::Instruction),
        XslToken::Param => (Tag::Param, Level::Instruction),
        _ => (Tag::Misc, Level::Instruction),
    }
}

fn style_location(node: &StyleNode) -> Location {
    Location {
        system_id: node.system_id.clone(),
        line: node.line,
        column: node.column,
    }
}

fn source_location(node: &SourceNode) -> Location {
    Location {
        system_id: node.system_id.clone(),
        line: node.line,
        column: node.column,
    }
}

/// Adapter behind a Xalan trace listener registration.
pub struct XalanAdapter<S: EventSink> {
    sink: S,
}

impl<S: EventSink> XalanAdapter<S> {
    pub fn new(sink: S) -> Self {
        Self { sink }
    }

    /// Transformation start, called by the driver before `transform`
    pub fn open(&mut self) -> Result<()> {
        debug!("xalan transformation started");
        self.emit(CanonicalEvent::document_enter().with_attribute("engine", "xalan"))
    }

    /// Transformation end, called by the driver once `transform` returns
    pub fn close(&mut self) -> Result<()> {
        debug!("xalan transformation finished");
        self.emit(CanonicalEvent::document_leave())
    }

    /// A stylesheet element starts executing
    pub fn trace(&mut self, node: &StyleNode) -> Result<()> {
        let (tag, level) = classify(node);
        trace!(token = %node.token, %tag, "xalan trace");
        let location = style_location(node);
        let mut event = CanonicalEvent::enter(tag, level, location.clone());

        match tag {
            Tag::TemplateMatch => {
                event = event
                    .with_match(node.match_pattern.as_deref().unwrap_or_default())
                    .with_built_in(location.is_unknown());
                if let Some(name) = &node.name {
                    event = event.with_attribute("name", name.as_str());
                }
            }
            Tag::NamedTemplate => {
                event = event
                    .with_match(node.name.as_deref().unwrap_or_default())
                    .with_built_in(location.is_unknown());
            }
            Tag::LiteralElement => {
                event = event.with_attribute("name", node.node_name.as_str());
            }
            Tag::Misc => {
                event = event.with_name(node.node_name.as_str());
                if let Some(chars) = &node.chars {
                    event = event.with_attribute("text", chars.trim());
                }
            }
            _ => {
                if let Some(name) = &node.name {
                    event = event.with_attribute("name", name.as_str());
                }
            }
        }
        self.emit(event)
    }

    /// A stylesheet element finished executing
    pub fn trace_end(&mut self, node: &StyleNode) -> Result<()> {
        let (_, level) = classify(node);
        self.emit(CanonicalEvent::leave(level))
    }

    /// A select expression was evaluated.
    ///
    /// Node sets are inspected through a reset clone so the engine's own
    /// iterator position is untouched.
    pub fn selected(&mut self, event: &SelectionEvent<'_>) -> Result<()> {
        let selected = match &event.selection {
            Selection::NodeSet(iter) => match iter.clone_with_reset() {
                Ok(mut clone) => clone
                    .next_node()
                    .unwrap_or_else(|| event.source_node.name.clone()),
                Err(err) => {
                    warn!(
                        attribute = event.attribute_name,
                        xpath = event.xpath,
                        %err,
                        "cannot inspect selection"
                    );
                    UNAVAILABLE.to_string()
                }
            },
            Selection::Value(_) => event.source_node.name.clone(),
        };
        if event.style_node.line == 0 {
            trace!(xpath = event.xpath, "selection from a default rule");
        }
        self.emit(CanonicalEvent::selection(
            selected,
            source_location(event.source_node),
        ))
    }

    pub fn select_end(&mut self) -> Result<()> {
        self.emit(CanonicalEvent::selection_end())
    }

    /// A result-tree event was produced
    pub fn generated(&mut self, event: &GenerateEvent) -> Result<()> {
        let kind = match event.event_type {
            GenerateEventType::StartDocument => OutputEventKind::StartDocument,
            GenerateEventType::EndDocument => OutputEventKind::EndDocument,
            GenerateEventType::StartElement => OutputEventKind::StartElement,
            GenerateEventType::EndElement => OutputEventKind::EndElement,
            GenerateEventType::Characters => OutputEventKind::Characters,
            GenerateEventType::Cdata => OutputEventKind::Cdata,
            GenerateEventType::Comment => OutputEventKind::Comment,
            GenerateEventType::ProcessingInstruction => OutputEventKind::ProcessingInstruction,
            GenerateEventType::EntityRef => OutputEventKind::EntityRef,
            GenerateEventType::IgnorableWhitespace => OutputEventKind::IgnorableWhitespace,
        };
        let mut output = OutputEvent::new(kind);
        if let Some(name) = &event.name {
            output = output.with_name(name.as_str());
        }
        if let Some(text) = event.characters.as_ref().or(event.data.as_ref()) {
            output = output.with_text(text.as_str());
        }
        self.emit(CanonicalEvent::generated(output))
    }
}

impl<S: EventSink> EngineAdapter for XalanAdapter<S> {
    type Sink = S;

    fn engine_name(&self) -> &'static str {
        "xalan"
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
