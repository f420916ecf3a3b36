//! Canonical trace events
//!
//! Every engine adapter reduces its native callbacks to [`CanonicalEvent`]s.
//! The builder consumes nothing else, so engine-specific types never leak
//! past the adapter crates.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Canonical classification of a traced stylesheet construct.
///
/// Adapters classify their native objects exactly once; downstream code
/// matches on this closed set instead of re-inspecting engine types.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    strum::AsRefStr,
    strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum Tag {
    /// A template rule selected by pattern matching
    TemplateMatch,
    /// A template invoked by name
    NamedTemplate,
    /// A stylesheet function
    Function,
    /// A global or template parameter
    Param,
    /// A variable binding
    Variable,
    /// A literal result element
    LiteralElement,
    /// A literal or computed attribute
    LiteralAttribute,
    /// A call to the trace function
    TraceCall,
    /// Anything else; the engine-reported name travels alongside
    Misc,
}

impl Tag {
    /// True for the two template kinds that open a report section
    pub fn is_template(self) -> bool {
        matches!(self, Tag::TemplateMatch | Tag::NamedTemplate)
    }

    /// Element name used in rendered trace text.
    ///
    /// `Misc` nodes prefer the engine-reported name when there is one.
    pub fn element_name(self, engine_name: Option<&str>) -> &str {
        match self {
            Tag::TemplateMatch | Tag::NamedTemplate => "xsl:template",
            Tag::Function => "xsl:function",
            Tag::Param => "xsl:param",
            Tag::Variable => "xsl:variable",
            Tag::LiteralElement => "LRE",
            Tag::LiteralAttribute => "ATTR",
            Tag::TraceCall => "fn:trace",
            Tag::Misc => engine_name.unwrap_or("misc"),
        }
    }
}

/// Granularity of an event, assigned by the adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Level {
    /// Named or matched rule boundary
    Rule = 1,
    /// Stylesheet instruction
    Instruction = 2,
    /// Fine-grained expression
    Expression = 3,
}

impl TryFrom<u8> for Level {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            1 => Ok(Level::Rule),
            2 => Ok(Level::Instruction),
            3 => Ok(Level::Expression),
            other => Err(Error::InvalidDetailLevel(other)),
        }
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> u8 {
        level as u8
    }
}

/// Detail threshold of a trace context: events above it are dropped.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(try_from = "u8", into = "u8")]
pub enum DetailLevel {
    None = 0,
    Low = 1,
    Normal = 2,
    #[default]
    High = 3,
}

impl DetailLevel {
    /// Whether an event of `level` passes this threshold
    pub fn admits(self, level: Level) -> bool {
        level as u8 <= self as u8
    }
}

impl TryFrom<u8> for DetailLevel {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        match value {
            0 => Ok(DetailLevel::None),
            1 => Ok(DetailLevel::Low),
            2 => Ok(DetailLevel::Normal),
            3 => Ok(DetailLevel::High),
            other => Err(Error::InvalidDetailLevel(other)),
        }
    }
}

impl From<DetailLevel> for u8 {
    fn from(level: DetailLevel) -> u8 {
        level as u8
    }
}

fn unknown_column() -> i32 {
    -1
}

/// Source position of a stylesheet construct or source node
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Location {
    /// System id (URI or path) of the module, if the engine knows it
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system_id: Option<String>,
    /// 1-based line, 0 when unknown
    #[serde(default)]
    pub line: u32,
    /// 1-based column, -1 when unknown
    #[serde(default = "unknown_column")]
    pub column: i32,
}

impl Location {
    pub fn new<S: Into<String>>(system_id: S, line: u32, column: i32) -> Self {
        Self {
            system_id: Some(system_id.into()),
            line,
            column,
        }
    }

    /// A location with nothing known about it
    pub fn unknown() -> Self {
        Self {
            system_id: None,
            line: 0,
            column: -1,
        }
    }

    /// No system id, or a zero line: engines report this for default rules
    pub fn is_unknown(&self) -> bool {
        self.system_id.is_none() || self.line == 0
    }

    /// Last path segment of the system id
    pub fn module(&self) -> Option<&str> {
        self.system_id.as_deref().map(abbreviate_system_id)
    }
}

impl Default for Location {
    fn default() -> Self {
        Self::unknown()
    }
}

/// Strip a system id down to its file name.
pub fn abbreviate_system_id(system_id: &str) -> &str {
    let trimmed = system_id.trim_end_matches(['/', '\\']);
    match trimmed.rfind(['/', '\\']) {
        Some(idx) => &trimmed[idx + 1..],
        None => trimmed,
    }
}

/// What a canonical event signals
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    DocumentEnter,
    DocumentLeave,
    TemplateEnter,
    InstructionEnter,
    Leave,
    Selection,
    SelectionEnd,
    GeneratedOutput,
}

/// Result-tree generation event type
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::AsRefStr, strum::Display,
)]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum OutputEventKind {
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

/// A result-tree generation event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputEvent {
    pub kind: OutputEventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl OutputEvent {
    pub fn new(kind: OutputEventKind) -> Self {
        Self {
            kind,
            name: None,
            text: None,
        }
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_text<S: Into<String>>(mut self, text: S) -> Self {
        self.text = Some(text.into());
        self
    }
}

/// Engine-agnostic trace signal.
///
/// Constructed by an adapter, consumed immediately by the builder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CanonicalEvent {
    pub kind: EventKind,
    #[serde(default = "default_tag")]
    pub tag: Tag,
    /// Engine-reported name of the construct (e.g. `xsl:value-of`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub level: Level,
    #[serde(default)]
    pub location: Location,
    /// Ordered attribute name/value pairs
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attributes: Vec<(String, String)>,
    /// Match pattern or template name for template events
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_expression: Option<String>,
    /// Source node chosen by a selection
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selected_node: Option<String>,
    #[serde(default)]
    pub built_in: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputEvent>,
}

fn default_tag() -> Tag {
    Tag::Misc
}

impl CanonicalEvent {
    fn bare(kind: EventKind, level: Level) -> Self {
        Self {
            kind,
            tag: Tag::Misc,
            name: None,
            level,
            location: Location::unknown(),
            attributes: Vec::new(),
            match_expression: None,
            selected_node: None,
            built_in: false,
            output: None,
        }
    }

    /// Transformation start
    pub fn document_enter() -> Self {
        Self::bare(EventKind::DocumentEnter, Level::Rule)
    }

    /// Transformation end
    pub fn document_leave() -> Self {
        Self::bare(EventKind::DocumentLeave, Level::Rule)
    }

    /// Entry into a template or instruction; the kind follows from `tag`
    pub fn enter(tag: Tag, level: Level, location: Location) -> Self {
        let kind = if tag.is_template() {
            EventKind::TemplateEnter
        } else {
            EventKind::InstructionEnter
        };
        Self {
            tag,
            location,
            ..Self::bare(kind, level)
        }
    }

    /// Exit from whatever the matching enter opened
    pub fn leave(level: Level) -> Self {
        Self::bare(EventKind::Leave, level)
    }

    /// A source node was selected
    pub fn selection<S: Into<String>>(selected_node: S, location: Location) -> Self {
        Self {
            selected_node: Some(selected_node.into()),
            location,
            ..Self::bare(EventKind::Selection, Level::Instruction)
        }
    }

    /// The selection context ended
    pub fn selection_end() -> Self {
        Self::bare(EventKind::SelectionEnd, Level::Instruction)
    }

    /// Result-tree output was generated
    pub fn generated(output: OutputEvent) -> Self {
        Self {
            output: Some(output),
            ..Self::bare(EventKind::GeneratedOutput, Level::Expression)
        }
    }

    pub fn with_name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_match<S: Into<String>>(mut self, pattern: S) -> Self {
        self.match_expression = Some(pattern.into());
        self
    }

    pub fn with_attribute<K: Into<String>, V: Into<String>>(mut self, key: K, value: V) -> Self {
        self.attributes.push((key.into(), value.into()));
        self
    }

    pub fn with_built_in(mut self, built_in: bool) -> Self {
        self.built_in = built_in;
        self
    }

    /// True for template and instruction entries
    pub fn is_enter(&self) -> bool {
        matches!(
            self.kind,
            EventKind::TemplateEnter | EventKind::InstructionEnter
        )
    }
}
