//! Document text extraction for uploaded resumes.
//!
//! Only PDF and DOCX are recognised. Any other media type yields `Ok(None)`,
//! which callers treat as an input error before building a prompt.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

pub const PDF_MEDIA_TYPE: &str = "application/pdf";
pub const DOCX_MEDIA_TYPE: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("failed to extract PDF text: {0}")]
    Pdf(String),

    #[error("failed to read DOCX archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("invalid DOCX: {0}")]
    Docx(String),

    #[error("DOCX XML parse error: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Recognised upload formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DocumentKind {
    Pdf,
    Docx,
}

impl DocumentKind {
    /// Media type parameters (`; charset=...`) and case are ignored.
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        let essence = media_type.split(';').next().unwrap_or("").trim();
        if essence.eq_ignore_ascii_case(PDF_MEDIA_TYPE) {
            Some(DocumentKind::Pdf)
        } else if essence.eq_ignore_ascii_case(DOCX_MEDIA_TYPE) {
            Some(DocumentKind::Docx)
        } else {
            None
        }
    }
}

/// Plain text of `bytes`, or `None` when `media_type` is not supported.
pub fn extract_text(bytes: &[u8], media_type: &str) -> Result<Option<String>, DocumentError> {
    match DocumentKind::from_media_type(media_type) {
        Some(DocumentKind::Pdf) => extract_pdf(bytes).map(Some),
        Some(DocumentKind::Docx) => extract_docx(bytes).map(Some),
        None => Ok(None),
    }
}

fn extract_pdf(bytes: &[u8]) -> Result<String, DocumentError> {
    let text =
        pdf_extract::extract_text_from_mem(bytes).map_err(|e| DocumentError::Pdf(e.to_string()))?;
    // pdf-extract separates pages with form feeds
    Ok(text.replace('\x0c', "\n").trim().to_string())
}

/// Reads `word/document.xml` and joins the `<w:t>` runs of each paragraph.
fn extract_docx(bytes: &[u8]) -> Result<String, DocumentError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;

    let mut doc_xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|_| DocumentError::Docx("missing word/document.xml".to_string()))?
        .read_to_string(&mut doc_xml)
        .map_err(|e| DocumentError::Docx(e.to_string()))?;

    let mut reader = Reader::from_str(&doc_xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut paragraph = String::new();
    let mut in_text = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"p" => paragraph.clear(),
                b"t" => in_text = true,
                _ => {}
            },
            Event::Empty(e) => match e.local_name().as_ref() {
                b"tab" => paragraph.push('\t'),
                b"br" => paragraph.push('\n'),
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"p" => {
                    let text = paragraph.trim();
                    if !text.is_empty() {
                        paragraphs.push(text.to_string());
                    }
                    paragraph.clear();
                }
                b"t" => in_text = false,
                _ => {}
            },
            Event::Text(e) if in_text => {
                let text = e.unescape().map_err(|e| DocumentError::Docx(e.to_string()))?;
                paragraph.push_str(&text);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs.join("\n"))
}
