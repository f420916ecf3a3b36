//! Xalan-side callback payloads
//!
//! These types mirror what a Xalan trace manager hands its listeners. The
//! embedding driver fills them in from the engine's own objects.

/// XSL element token of a stylesheet node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "kebab-case")]
pub enum XslToken {
    Template,
    TextLiteralResult,
    LiteralResult,
    Attribute,
    Variable,
    Param,
    ApplyTemplates,
    CallTemplate,
    ForEach,
    ValueOf,
    CopyOf,
    If,
    Choose,
    Text,
    Other,
}

/// A stylesheet element being executed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StyleNode {
    pub token: XslToken,
    /// Qualified element name as written, e.g. `xsl:value-of`
    pub node_name: String,
    pub system_id: Option<String>,
    /// 0 when the engine has no line, as for default rules
    pub line: u32,
    pub column: i32,
    /// `match` pattern of a template
    pub match_pattern: Option<String>,
    /// `name` of a template, variable or param
    pub name: Option<String>,
    /// Characters of a text literal
    pub chars: Option<String>,
}

impl StyleNode {
    pub fn new<N: Into<String>>(token: XslToken, node_name: N) -> Self {
        Self {
            token,
            node_name: node_name.into(),
            system_id: None,
            line: 0,
            column: -1,
            match_pattern: None,
            name: None,
            chars: None,
        }
    }

    pub fn at<S: Into<String>>(mut self, system_id: S, line: u32, column: i32) -> Self {
        self.system_id = Some(system_id.into());
        self.line = line;
        self.column = column;
        self
    }

    pub fn with_match<S: Into<String>>(mut self, pattern: S) -> Self {
        self.match_pattern = Some(pattern.into());
        self
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_chars<S: Into<String>>(mut self, chars: S) -> Self {
        self.chars = Some(chars.into());
        self
    }
}

/// The source node a selection was evaluated against
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceNode {
    pub name: String,
    pub system_id: Option<String>,
    pub line: u32,
    pub column: i32,
}

impl SourceNode {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            system_id: None,
            line: 0,
            column: -1,
        }
    }

    pub fn at<S: Into<String>>(mut self, system_id: S, line: u32, column: i32) -> Self {
        self.system_id = Some(system_id.into());
        self.line = line;
        self.column = column;
        self
    }
}

/// The engine refused to duplicate an iterator
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("node iterator cannot be cloned")]
pub struct CloneNotSupported;

/// A node-set iterator shared with the running transformation.
///
/// Listeners must never advance it directly; they inspect a reset clone.
pub trait NodeIterator {
    fn clone_with_reset(&self) -> Result<Box<dyn NodeIterator + '_>, CloneNotSupported>;

    /// Name of the next node, or `None` when exhausted
    fn next_node(&mut self) -> Option<String>;
}

/// Result of a select expression
pub enum Selection<'a> {
    NodeSet(&'a dyn NodeIterator),
    /// Any non-node result, already converted to a string
    Value(String),
}

/// Payload of a `selected` callback
pub struct SelectionEvent<'a> {
    pub style_node: &'a StyleNode,
    pub source_node: &'a SourceNode,
    /// Attribute holding the expression, e.g. `select`
    pub attribute_name: &'a str,
    pub xpath: &'a str,
    pub selection: Selection<'a>,
}

/// Serializer trace event type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GenerateEventType {
    StartDocument,
    EndDocument,
    StartElement,
    EndElement,
    Characters,
    Cdata,
    Comment,
    ProcessingInstruction,
    EntityRef,
    IgnorableWhitespace,
}

/// Payload of a `generated` callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateEvent {
    pub event_type: GenerateEventType,
    pub name: Option<String>,
    /// Character data of characters and CDATA events
    pub characters: Option<String>,
    /// Data of comment and processing-instruction events
    pub data: Option<String>,
}

impl GenerateEvent {
    pub fn new(event_type: GenerateEventType) -> Self {
        Self {
            event_type,
            name: None,
            characters: None,
            data: None,
        }
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_characters<S: Into<String>>(mut self, characters: S) -> Self {
        self.characters = Some(characters.into());
        self
    }

    pub fn with_data<S: Into<String>>(mut self, data: S) -> Self {
        self.data = Some(data.into());
        self
    }
}
