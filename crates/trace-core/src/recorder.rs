//! Checkpoint recorder protocol
//!
//! The recorder is an external collaborator; this module only fixes the
//! call shape and provides an in-memory implementation.

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Receiver of the start/info/end checkpoint protocol.
///
/// Call order is significant: it is the only thing the recorder can use to
/// rebuild nesting.
pub trait CheckpointRecorder {
    /// Open a section
    fn startpoint(
        &mut self,
        correlation_id: &str,
        name: Option<&str>,
        label: &str,
        content: Option<&str>,
    ) -> Result<()>;

    /// Record a single leaf entry
    fn infopoint(
        &mut self,
        correlation_id: &str,
        name: Option<&str>,
        label: &str,
        content: Option<&str>,
    ) -> Result<()>;

    /// Close the innermost open section
    fn endpoint(
        &mut self,
        correlation_id: &str,
        name: Option<&str>,
        label: &str,
        content: Option<&str>,
    ) -> Result<()>;
}

impl<R: CheckpointRecorder + ?Sized> CheckpointRecorder for &mut R {
    fn startpoint(
        &mut self,
        correlation_id: &str,
        name: Option<&str>,
        label: &str,
        content: Option<&str>,
    ) -> Result<()> {
        (**self).startpoint(correlation_id, name, label, content)
    }

    fn infopoint(
        &mut self,
        correlation_id: &str,
        name: Option<&str>,
        label: &str,
        content: Option<&str>,
    ) -> Result<()> {
        (**self).infopoint(correlation_id, name, label, content)
    }

    fn endpoint(
        &mut self,
        correlation_id: &str,
        name: Option<&str>,
        label: &str,
        content: Option<&str>,
    ) -> Result<()> {
        (**self).endpoint(correlation_id, name, label, content)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, strum::AsRefStr, strum::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum CheckpointKind {
    Start,
    Info,
    End,
}

/// One recorded checkpoint call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Checkpoint {
    pub kind: CheckpointKind,
    pub correlation_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl Checkpoint {
    pub fn new(
        kind: CheckpointKind,
        correlation_id: &str,
        name: Option<&str>,
        label: &str,
        content: Option<&str>,
    ) -> Self {
        Self {
            kind,
            correlation_id: correlation_id.to_string(),
            name: name.map(str::to_string),
            label: label.to_string(),
            content: content.map(str::to_string),
        }
    }
}

/// Keeps every checkpoint in memory, in call order.
#[derive(Debug, Default, Clone)]
pub struct MemoryRecorder {
    checkpoints: Vec<Checkpoint>,
}

impl MemoryRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn checkpoints(&self) -> &[Checkpoint] {
        &self.checkpoints
    }

    pub fn into_checkpoints(self) -> Vec<Checkpoint> {
        self.checkpoints
    }

    pub fn count(&self, kind: CheckpointKind) -> usize {
        self.checkpoints.iter().filter(|c| c.kind == kind).count()
    }

    /// Labels in call order, handy for asserting on structure
    pub fn labels(&self) -> Vec<&str> {
        self.checkpoints.iter().map(|c| c.label.as_str()).collect()
    }

    /// Every end closes a start with the same label, and nothing stays open.
    pub fn is_balanced(&self) -> bool {
        let mut open: Vec<&str> = Vec::new();
        for checkpoint in &self.checkpoints {
            match checkpoint.kind {
                CheckpointKind::Start => open.push(&checkpoint.label),
                CheckpointKind::End => match open.pop() {
                    Some(label) if label == checkpoint.label => {}
                    _ => return false,
                },
                CheckpointKind::Info => {}
            }
        }
        open.is_empty()
    }

    fn push(
        &mut self,
        kind: CheckpointKind,
        correlation_id: &str,
        name: Option<&str>,
        label: &str,
        content: Option<&str>,
    ) -> Result<()> {
        self.checkpoints
            .push(Checkpoint::new(kind, correlation_id, name, label, content));
        Ok(())
    }
}

impl CheckpointRecorder for MemoryRecorder {
    fn startpoint(
        &mut self,
        correlation_id: &str,
        name: Option<&str>,
        label: &str,
        content: Option<&str>,
    ) -> Result<()> {
        self.push(CheckpointKind::Start, correlation_id, name, label, content)
    }

    fn infopoint(
        &mut self,
        correlation_id: &str,
        name: Option<&str>,
        label: &str,
        content: Option<&str>,
    ) -> Result<()> {
        self.push(CheckpointKind::Info, correlation_id, name, label, content)
    }

    fn endpoint(
        &mut self,
        correlation_id: &str,
        name: Option<&str>,
        label: &str,
        content: Option<&str>,
    ) -> Result<()> {
        self.push(CheckpointKind::End, correlation_id, name, label, content)
    }
}
