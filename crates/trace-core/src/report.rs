//! Complete trace report
//!
//! Wraps the correlator walk in the sections a trace report always has:
//! the inputs, the imported stylesheets, the complete rendered trace, the
//! transformation result and finally the trace layout itself.

use tracing::info;

use crate::config::TraceConfig;
use crate::correlate::{CorrelationSummary, ReportCorrelator};
use crate::error::Result;
use crate::node::TraceTree;
use crate::recorder::CheckpointRecorder;
use crate::render::render_tree;
use crate::stylesheet::{StylesheetIndex, StylesheetSource};

const TRACE_TITLE: &str = "XSLT Trace";
const START_XSLT: &str = "Start XSLT";
const END_XSLT: &str = "End of XSLT";
const IMPORTED_XSL: &str = "Imported XSL";
const TRACE_LAYOUT: &str = "Trace layout";

/// The inputs and result of one traced transformation
#[derive(Debug, Clone)]
pub struct TraceReport<'a> {
    /// Source document
    pub xml: StylesheetSource,
    /// Main stylesheet
    pub xsl: StylesheetSource,
    /// Imported stylesheets, already loaded by the caller
    pub imports: Vec<StylesheetSource>,
    /// Serialized transformation result
    pub output: String,
    pub tree: &'a TraceTree,
}

impl<'a> TraceReport<'a> {
    pub fn new(
        tree: &'a TraceTree,
        xml: StylesheetSource,
        xsl: StylesheetSource,
        output: impl Into<String>,
    ) -> Self {
        Self {
            xml,
            xsl,
            imports: Vec::new(),
            output: output.into(),
            tree,
        }
    }

    pub fn with_import(mut self, import: StylesheetSource) -> Self {
        self.imports.push(import);
        self
    }

    /// Index the main stylesheet followed by every import
    pub fn stylesheet_index(&self) -> Result<StylesheetIndex> {
        StylesheetIndex::build(std::iter::once(&self.xsl).chain(&self.imports))
    }

    /// Emit the whole report under `correlation_id`.
    pub fn emit<R>(
        &self,
        correlation_id: &str,
        config: &TraceConfig,
        recorder: &mut R,
    ) -> Result<CorrelationSummary>
    where
        R: CheckpointRecorder + ?Sized,
    {
        let cid = correlation_id;
        let report_name = config.report_name.as_str();
        let xml_name = Some(self.xml.name.as_str());
        let xsl_name = Some(self.xsl.name.as_str());
        let index = self.stylesheet_index()?;

        recorder.startpoint(cid, None, report_name, Some(TRACE_TITLE))?;
        recorder.startpoint(cid, xml_name, START_XSLT, Some(START_XSLT))?;
        recorder.infopoint(cid, None, "XML input file", Some(&self.xml.text))?;
        recorder.infopoint(cid, xml_name, "XSL input file", Some(&self.xsl.text))?;

        if !self.imports.is_empty() {
            recorder.startpoint(cid, xsl_name, IMPORTED_XSL, Some("Imported XSL files"))?;
            for import in &self.imports {
                recorder.infopoint(cid, xsl_name, &import.name, Some(&import.text))?;
            }
            recorder.endpoint(cid, xsl_name, IMPORTED_XSL, Some("Imported XSL files"))?;
        }

        let complete = render_tree(self.tree, config.show_separator);
        recorder.infopoint(cid, xsl_name, "Complete XSLT Trace", Some(&complete))?;
        recorder.infopoint(
            cid,
            xml_name,
            "XML after full transformation",
            Some(&self.output),
        )?;

        recorder.startpoint(cid, None, TRACE_LAYOUT, None)?;
        let summary = ReportCorrelator::new(cid)
            .with_policy(config.built_in_rules)
            .with_stylesheets(&index)
            .correlate(self.tree, recorder)?;
        recorder.endpoint(cid, None, TRACE_LAYOUT, None)?;

        recorder.endpoint(cid, xml_name, START_XSLT, Some(END_XSLT))?;
        recorder.endpoint(cid, None, report_name, Some(TRACE_TITLE))?;

        info!(
            correlation_id = cid,
            nodes = self.tree.node_count(),
            truncated = self.tree.is_truncated(),
            "trace report emitted"
        );
        Ok(summary)
    }
}
