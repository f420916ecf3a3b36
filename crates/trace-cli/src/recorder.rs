//! Checkpoint recorder writing one JSON object per line

use std::io::Write;

use xslt_trace_core::{Checkpoint, CheckpointKind, CheckpointRecorder, Error, Result};

pub struct JsonLinesRecorder<W: Write> {
    writer: W,
    written: usize,
}

impl<W: Write> JsonLinesRecorder<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, written: 0 }
    }

    /// Number of checkpoints written so far
    pub fn written(&self) -> usize {
        self.written
    }

    pub fn into_inner(self) -> W {
        self.writer
    }

    fn write(
        &mut self,
        kind: CheckpointKind,
        correlation_id: &str,
        name: Option<&str>,
        label: &str,
        content: Option<&str>,
    ) -> Result<()> {
        let checkpoint = Checkpoint::new(kind, correlation_id, name, label, content);
        serde_json::to_writer(&mut self.writer, &checkpoint)
            .map_err(|e| Error::recorder(e.to_string()))?;
        self.writer
            .write_all(b"\n")
            .map_err(|e| Error::recorder(e.to_string()))?;
        self.written += 1;
        Ok(())
    }
}

impl<W: Write> CheckpointRecorder for JsonLinesRecorder<W> {
    fn startpoint(
        &mut self,
        correlation_id: &str,
        name: Option<&str>,
        label: &str,
        content: Option<&str>,
    ) -> Result<()> {
        self.write(CheckpointKind::Start, correlation_id, name, label, content)
    }

    fn infopoint(
        &mut self,
        correlation_id: &str,
        name: Option<&str>,
        label: &str,
        content: Option<&str>,
    ) -> Result<()> {
        self.write(CheckpointKind::Info, correlation_id, name, label, content)
    }

    fn endpoint(
        &mut self,
        correlation_id: &str,
        name: Option<&str>,
        label: &str,
        content: Option<&str>,
    ) -> Result<()> {
        self.write(CheckpointKind::End, correlation_id, name, label, content)
    }
}
