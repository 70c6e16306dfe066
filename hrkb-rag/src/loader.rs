//! Format-specific document loaders.
//!
//! [`load_path`] dispatches on file extension: PDF (page-aware), DOCX, and
//! plain text or markdown. Unsupported extensions and unreadable files fail
//! with [`RagError::Load`]. Loading is blocking I/O; call it from a
//! blocking context (for example `tokio::task::spawn_blocking`).
//!
//! This module is only available when the `loaders` feature is enabled.

use std::io::Read;
use std::path::Path;

use tracing::debug;

use crate::document::{LoadedDocument, Segment};
use crate::error::{RagError, Result};

fn load_err(path: &Path, message: impl Into<String>) -> RagError {
    RagError::Load { path: path.display().to_string(), message: message.into() }
}

/// Load a document from a file path, dispatching on extension.
///
/// Supported formats: `.pdf` (one segment per page with page numbers),
/// `.docx`, `.txt`, and `.md` (a single segment, no page numbers).
pub fn load_path(path: &Path) -> Result<LoadedDocument> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default();

    let document = match extension.as_str() {
        "pdf" => load_pdf(path)?,
        "docx" => load_docx(path)?,
        "txt" | "md" => load_text(path)?,
        other => {
            return Err(load_err(path, format!("unsupported file extension '{other}'")));
        }
    };

    debug!(path = %path.display(), segments = document.segments.len(), "loaded document");
    Ok(document)
}

/// Extract PDF text into one segment per page.
///
/// `pdf-extract` separates pages with form feeds, which gives us one-based
/// page numbers for chunk metadata.
fn load_pdf(path: &Path) -> Result<LoadedDocument> {
    let text = pdf_extract::extract_text(path)
        .map_err(|e| load_err(path, format!("failed to extract PDF text: {e}")))?;

    let segments: Vec<Segment> = text
        .split('\x0c')
        .enumerate()
        .filter_map(|(i, page)| {
            let trimmed = page.trim();
            if trimmed.is_empty() {
                return None;
            }
            Some(Segment { text: trimmed.to_string(), page: Some(i as u32 + 1) })
        })
        .collect();

    if segments.is_empty() {
        return Err(load_err(path, "PDF contains no extractable text"));
    }

    Ok(LoadedDocument { segments })
}

/// Extract DOCX text by walking `<w:t>` elements inside the ZIP archive's
/// `word/document.xml`.
fn load_docx(path: &Path) -> Result<LoadedDocument> {
    let file = std::fs::File::open(path)
        .map_err(|e| load_err(path, format!("failed to open DOCX: {e}")))?;

    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| load_err(path, format!("failed to read DOCX as ZIP: {e}")))?;

    let mut doc_xml = String::new();
    {
        let mut entry = archive
            .by_name("word/document.xml")
            .map_err(|_| load_err(path, "invalid DOCX: missing word/document.xml"))?;
        entry
            .read_to_string(&mut doc_xml)
            .map_err(|e| load_err(path, format!("failed to read document.xml: {e}")))?;
    }

    let mut reader = quick_xml::Reader::from_str(&doc_xml);
    let mut output = String::new();
    let mut paragraph = String::new();
    let mut in_text_element = false;
    let mut buf = Vec::new();

    loop {
        match reader.read_event_into(&mut buf) {
            Ok(quick_xml::events::Event::Start(ref e))
            | Ok(quick_xml::events::Event::Empty(ref e)) => {
                let local_name = e.local_name();
                let name = std::str::from_utf8(local_name.as_ref()).unwrap_or("");
                if name == "p" {
                    paragraph.clear();
                } else if name == "t" {
                    in_text_element = true;
                }
            }
            Ok(quick_xml::events::Event::End(ref e)) => {
                let local_name = e.local_name();
                let name = std::str::from_utf8(local_name.as_ref()).unwrap_or("");
                if name == "p" {
                    if !paragraph.is_empty() {
                        output.push_str(&paragraph);
                        output.push_str("\n\n");
                    }
                } else if name == "t" {
                    in_text_element = false;
                }
            }
            Ok(quick_xml::events::Event::Text(ref e)) => {
                if in_text_element {
                    if let Ok(text) = e.decode() {
                        paragraph.push_str(&text);
                    }
                }
            }
            Ok(quick_xml::events::Event::Eof) => break,
            Err(e) => {
                return Err(load_err(path, format!("failed to parse document.xml: {e}")));
            }
            _ => {}
        }
        buf.clear();
    }

    let trimmed = output.trim();
    if trimmed.is_empty() {
        return Err(load_err(path, "DOCX contains no text"));
    }

    Ok(LoadedDocument::from_text(trimmed))
}

fn load_text(path: &Path) -> Result<LoadedDocument> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| load_err(path, format!("failed to read file: {e}")))?;
    if text.trim().is_empty() {
        return Err(load_err(path, "file is empty"));
    }
    Ok(LoadedDocument::from_text(text))
}
