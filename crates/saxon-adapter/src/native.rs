//! Saxon-side callback payloads

use xslt_trace_core::Location;

/// Expression subtypes the listener distinguishes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExpressionKind {
    /// Literal result element
    FixedElement,
    /// Literal attribute
    FixedAttribute,
    /// Local variable binding
    Let,
    /// Call on the trace function
    TraceCall,
    /// Any other instruction, by its expression name
    Instruction { name: String },
    /// Any other expression, by its expression name
    Other { name: String },
}

/// What a traceable object is
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TraceableKind {
    TemplateRule { match_pattern: String },
    NamedTemplate { name: String },
    UserFunction { name: String },
    GlobalParam { name: String },
    GlobalVariable { name: String },
    /// The trace function itself
    TraceCall,
    Expression(ExpressionKind),
    Other,
}

/// An object Saxon passes to `enter` and `leave`
pub trait Traceable {
    fn kind(&self) -> TraceableKind;

    fn location(&self) -> Location;
}

/// Plain owned traceable, for drivers that copy what the engine reports
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TraceInfo {
    pub kind: TraceableKind,
    pub location: Location,
}

impl TraceInfo {
    pub fn new(kind: TraceableKind, location: Location) -> Self {
        Self { kind, location }
    }
}

impl Traceable for TraceInfo {
    fn kind(&self) -> TraceableKind {
        self.kind.clone()
    }

    fn location(&self) -> Location {
        self.location.clone()
    }
}

/// A trace property value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyValue {
    QName { display_name: String },
    String(String),
    Other(String),
    /// Property present but null; skipped when rendering
    Absent,
}

impl PropertyValue {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            PropertyValue::QName { display_name } => Some(display_name.as_str()),
            PropertyValue::String(value) | PropertyValue::Other(value) => Some(value.as_str()),
            PropertyValue::Absent => None,
        }
    }
}

/// Kind of a source node
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NodeKind {
    Document,
    Element { name: String },
    Attribute { name: String },
    Text,
    Comment,
    ProcessingInstruction { target: String },
    Namespace { prefix: String },
}

impl NodeKind {
    /// Name used for the node in selection annotations
    pub fn display_name(&self) -> String {
        match self {
            NodeKind::Document => "/".to_string(),
            NodeKind::Element { name } => name.clone(),
            NodeKind::Attribute { name } => format!("@{}", name),
            NodeKind::Text => "text()".to_string(),
            NodeKind::Comment => "comment()".to_string(),
            NodeKind::ProcessingInstruction { target } => {
                format!("processing-instruction({})", target)
            }
            NodeKind::Namespace { prefix } => format!("namespace::{}", prefix),
        }
    }
}

/// A source node that became the context item
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeItem {
    pub kind: NodeKind,
    /// Navigator path, e.g. `/items/item[2]`
    pub path: String,
    pub location: Location,
}

impl NodeItem {
    pub fn new<P: Into<String>>(kind: NodeKind, path: P) -> Self {
        Self {
            kind,
            path: path.into(),
            location: Location::unknown(),
        }
    }

    pub fn at(mut self, location: Location) -> Self {
        self.location = location;
        self
    }
}

/// Context item
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Item {
    Node(NodeItem),
    /// Atomic value, as its string value
    Atomic(String),
}
