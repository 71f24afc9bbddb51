//! Loading input documents as paragraphs.
//!
//! Two formats are understood:
//!
//! - **`.docx`**: every top-level `w:p` element of `word/document.xml` is
//!   one paragraph, including empty ones. Text box content (`w:txbxContent`)
//!   is skipped and the surrounding paragraph keeps its own runs.
//! - **anything else**: UTF-8 text, one paragraph per non-empty line.

use crate::error::PipelineError;
use crate::models::Document;
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use tracing::{debug, instrument};

const DOCUMENT_PART: &str = "word/document.xml";
const TEXT_BOX: &[u8] = b"w:txbxContent";

/// Read `path` into a [`Document`] whose source is the file name.
///
/// # Errors
///
/// Returns [`PipelineError::DocumentRead`] when the file cannot be opened,
/// is not a valid `.docx` archive, or is not UTF-8 text.
#[instrument(level = "info", skip_all, fields(path = %path.display()))]
pub fn read_document(path: &Path) -> Result<Document, PipelineError> {
    let source = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    let is_docx = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("docx"));
    let paragraphs = if is_docx {
        let xml = read_docx_part(path)?;
        paragraphs_from_xml(&xml).map_err(|e| PipelineError::read(path, e))?
    } else {
        let text = std::fs::read_to_string(path).map_err(|e| PipelineError::read(path, e))?;
        text.lines()
            .filter(|line| !line.trim().is_empty())
            .map(str::to_string)
            .collect()
    };

    debug!(%source, paragraphs = paragraphs.len(), "Read document");
    Ok(Document { source, paragraphs })
}

fn read_docx_part(path: &Path) -> Result<String, PipelineError> {
    let file = File::open(path).map_err(|e| PipelineError::read(path, e))?;
    let mut archive =
        zip::ZipArchive::new(BufReader::new(file)).map_err(|e| PipelineError::read(path, e))?;
    let mut part = archive
        .by_name(DOCUMENT_PART)
        .map_err(|e| PipelineError::read(path, e))?;
    let mut xml = String::new();
    part.read_to_string(&mut xml)
        .map_err(|e| PipelineError::read(path, e))?;
    Ok(xml)
}

/// Paragraph texts of a WordprocessingML body.
fn paragraphs_from_xml(xml: &str) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs = Vec::new();
    let mut current: Option<String> = None;
    let mut in_text = false;
    // Depth of enclosing text boxes; everything inside one is ignored.
    let mut text_boxes = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) if e.name().as_ref() == TEXT_BOX => text_boxes += 1,
            Event::End(e) if e.name().as_ref() == TEXT_BOX => {
                text_boxes = text_boxes.saturating_sub(1)
            }
            Event::Eof => break,
            _ if text_boxes > 0 => {}
            Event::Start(e) => match e.name().as_ref() {
                b"w:p" => current = Some(String::new()),
                b"w:t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match (e.name().as_ref(), current.as_mut()) {
                (b"w:p", _) => paragraphs.push(String::new()),
                (b"w:tab", Some(text)) => text.push('\t'),
                (b"w:br" | b"w:cr", Some(text)) => text.push('\n'),
                _ => {}
            },
            Event::Text(t) if in_text => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&t));
                }
            }
            Event::GeneralRef(r) if in_text => {
                if let Some(text) = current.as_mut() {
                    if let Some(ch) = resolve_entity(&r) {
                        text.push(ch);
                    }
                }
            }
            Event::End(e) => match e.name().as_ref() {
                b"w:p" => paragraphs.extend(current.take()),
                b"w:t" => in_text = false,
                _ => {}
            },
            _ => {}
        }
    }
    Ok(paragraphs)
}

fn resolve_entity(name: &[u8]) -> Option<char> {
    match name {
        b"amp" => Some('&'),
        b"lt" => Some('<'),
        b"gt" => Some('>'),
        b"quot" => Some('"'),
        b"apos" => Some('\''),
        [b'#', b'x' | b'X', hex @ ..] => std::str::from_utf8(hex)
            .ok()
            .and_then(|h| u32::from_str_radix(h, 16).ok())
            .and_then(char::from_u32),
        [b'#', dec @ ..] => std::str::from_utf8(dec)
            .ok()
            .and_then(|d| d.parse().ok())
            .and_then(char::from_u32),
        _ => None,
    }
}
