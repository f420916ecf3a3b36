//! Stylesheet index
//!
//! Scans stylesheet text supplied by the caller and remembers where each
//! matching template lives, so report sections can show the template source
//! next to its trace. Nothing here reads files or resolves imports; import
//! hrefs are only listed for the caller to load.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use tracing::debug;

use crate::error::{Error, Result};
use crate::escape::collapse_whitespace;

/// Stylesheet text together with the name it is reported under
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StylesheetSource {
    pub name: String,
    pub text: String,
}

impl StylesheetSource {
    pub fn new<N: Into<String>, T: Into<String>>(name: N, text: T) -> Self {
        Self {
            name: name.into(),
            text: text.into(),
        }
    }
}

/// Source text of one matching template
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateExcerpt {
    /// Match pattern with whitespace collapsed
    pub match_pattern: String,
    /// 1-based line of the opening tag
    pub line: usize,
    /// 1-based column of the opening tag
    pub column: usize,
    /// The element exactly as written
    pub text: String,
}

#[derive(Debug, Clone)]
struct IndexedStylesheet {
    name: String,
    templates: Vec<TemplateExcerpt>,
    imports: Vec<String>,
}

/// Matching templates and import hrefs of a set of stylesheets.
#[derive(Debug, Clone, Default)]
pub struct StylesheetIndex {
    sheets: Vec<IndexedStylesheet>,
}

impl StylesheetIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index every source, in order
    pub fn build<'a, I>(sources: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a StylesheetSource>,
    {
        let mut index = Self::new();
        for source in sources {
            index.add(source)?;
        }
        Ok(index)
    }

    pub fn add(&mut self, source: &StylesheetSource) -> Result<()> {
        let sheet = scan(source)?;
        debug!(
            stylesheet = %sheet.name,
            templates = sheet.templates.len(),
            imports = sheet.imports.len(),
            "indexed stylesheet"
        );
        self.sheets.push(sheet);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Templates whose match pattern equals `pattern`, with the name of the
    /// stylesheet they come from. Whitespace differences are ignored.
    pub fn templates_matching<'a>(
        &'a self,
        pattern: &str,
    ) -> impl Iterator<Item = (&'a str, &'a TemplateExcerpt)> + 'a {
        let wanted = collapse_whitespace(pattern);
        self.sheets.iter().flat_map(move |sheet| {
            let wanted = wanted.clone();
            sheet
                .templates
                .iter()
                .filter(move |t| t.match_pattern == wanted)
                .map(move |t| (sheet.name.as_str(), t))
        })
    }

    /// `href` of every import element, in document order
    pub fn imports(&self) -> impl Iterator<Item = &str> {
        self.sheets
            .iter()
            .flat_map(|sheet| sheet.imports.iter().map(String::as_str))
    }
}

struct Pending {
    match_pattern: String,
    start: usize,
    depth: usize,
}

fn scan(source: &StylesheetSource) -> Result<IndexedStylesheet> {
    let text = source.text.as_str();
    let mut reader = Reader::from_str(text);
    let mut sheet = IndexedStylesheet {
        name: source.name.clone(),
        templates: Vec::new(),
        imports: Vec::new(),
    };
    let mut depth = 0usize;
    let mut pending: Option<Pending> = None;

    loop {
        let start = reader.buffer_position() as usize;
        let event = reader
            .read_event()
            .map_err(|e| Error::stylesheet(format!("{}: {}", source.name, e)))?;
        match event {
            Event::Start(e) => {
                depth += 1;
                if pending.is_none() {
                    if let Some(pattern) = template_match(&e, source)? {
                        pending = Some(Pending {
                            match_pattern: pattern,
                            start,
                            depth,
                        });
                    }
                }
                if let Some(href) = import_href(&e, source)? {
                    sheet.imports.push(href);
                }
            }
            Event::Empty(e) => {
                if pending.is_none() {
                    if let Some(pattern) = template_match(&e, source)? {
                        let end = reader.buffer_position() as usize;
                        sheet.templates.push(excerpt(text, pattern, start, end));
                    }
                }
                if let Some(href) = import_href(&e, source)? {
                    sheet.imports.push(href);
                }
            }
            Event::End(_) => {
                if pending.as_ref().is_some_and(|p| p.depth == depth) {
                    if let Some(p) = pending.take() {
                        let end = reader.buffer_position() as usize;
                        sheet
                            .templates
                            .push(excerpt(text, p.match_pattern, p.start, end));
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(sheet)
}

fn attribute(e: &BytesStart<'_>, key: &[u8], source: &StylesheetSource) -> Result<Option<String>> {
    let attr = e
        .try_get_attribute(key)
        .map_err(|err| Error::stylesheet(format!("{}: {}", source.name, err)))?;
    match attr {
        Some(attr) => {
            let value = attr
                .unescape_value()
                .map_err(|err| Error::stylesheet(format!("{}: {}", source.name, err)))?;
            Ok(Some(value.into_owned()))
        }
        None => Ok(None),
    }
}

fn template_match(e: &BytesStart<'_>, source: &StylesheetSource) -> Result<Option<String>> {
    if e.local_name().as_ref() != b"template" {
        return Ok(None);
    }
    Ok(attribute(e, b"match", source)?.map(|m| collapse_whitespace(&m)))
}

fn import_href(e: &BytesStart<'_>, source: &StylesheetSource) -> Result<Option<String>> {
    if e.local_name().as_ref() != b"import" {
        return Ok(None);
    }
    attribute(e, b"href", source)
}

fn excerpt(text: &str, match_pattern: String, start: usize, end: usize) -> TemplateExcerpt {
    let before = &text[..start];
    let line = before.matches('\n').count() + 1;
    let line_start = before.rfind('\n').map_or(0, |idx| idx + 1);
    let column = before[line_start..].chars().count() + 1;
    TemplateExcerpt {
        match_pattern,
        line,
        column,
        text: text[start..end].to_string(),
    }
}
