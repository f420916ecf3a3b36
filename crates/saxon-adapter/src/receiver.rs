//! Result-tree receiver
//!
//! Saxon's receiver reports `end_element` without a name, so the adapter
//! keeps the names of open output elements itself.

use tracing::warn;
use xslt_trace_core::{
    CanonicalEvent, EngineAdapter, EventSink, OutputEvent, OutputEventKind, Result,
};

use crate::listener::SaxonAdapter;

impl<S: EventSink> SaxonAdapter<S> {
    pub fn start_document(&mut self) -> Result<()> {
        self.output(OutputEvent::new(OutputEventKind::StartDocument))
    }

    pub fn end_document(&mut self) -> Result<()> {
        self.output(OutputEvent::new(OutputEventKind::EndDocument))
    }

    pub fn start_element(&mut self, name: &str) -> Result<()> {
        self.open_elements.push(name.to_string());
        self.output(OutputEvent::new(OutputEventKind::StartElement).with_name(name))
    }

    /// Closes the innermost open output element
    pub fn end_element(&mut self) -> Result<()> {
        let mut output = OutputEvent::new(OutputEventKind::EndElement);
        match self.open_elements.pop() {
            Some(name) => output = output.with_name(name),
            None => warn!("end_element without an open output element"),
        }
        self.output(output)
    }

    pub fn characters(&mut self, text: &str) -> Result<()> {
        self.output(OutputEvent::new(OutputEventKind::Characters).with_text(text))
    }

    pub fn comment(&mut self, text: &str) -> Result<()> {
        self.output(OutputEvent::new(OutputEventKind::Comment).with_text(text))
    }

    pub fn processing_instruction(&mut self, target: &str, data: &str) -> Result<()> {
        self.output(
            OutputEvent::new(OutputEventKind::ProcessingInstruction)
                .with_name(target)
                .with_text(data),
        )
    }

    /// Output element names still open, outermost first
    pub fn open_output_elements(&self) -> &[String] {
        &self.open_elements
    }

    fn output(&mut self, output: OutputEvent) -> Result<()> {
        self.emit(CanonicalEvent::generated(output))
    }
}
