//! lopdf-backed text extraction

use lopdf::{Document, Object};
use thiserror::Error;
use tracing::debug;

/// Errors from PDF text extraction
#[derive(Debug, Error)]
pub enum PdfError {
    #[error("PDF is encrypted and cannot be read")]
    Encrypted,

    #[error("Failed to parse PDF: {0}")]
    Malformed(String),

    #[error("PDF contains no pages")]
    Empty,
}

impl From<lopdf::Error> for PdfError {
    fn from(e: lopdf::Error) -> Self {
        PdfError::Malformed(e.to_string())
    }
}

/// Document information from the trailer Info dictionary
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PdfMetadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
}

/// Result of extracting text from a PDF byte stream
#[derive(Debug, Clone)]
pub struct PdfExtraction {
    /// Trimmed page texts joined with blank lines
    pub text_content: String,
    /// Character offset into `text_content` where each page begins
    pub page_breaks: Vec<usize>,
    pub page_count: usize,
    pub metadata: PdfMetadata,
}

/// Extract page-ordered plain text from a PDF byte stream.
///
/// Pages that yield no text (vector art, scanned images) contribute an
/// empty page rather than failing the whole document.
pub fn extract_text(bytes: &[u8]) -> Result<PdfExtraction, PdfError> {
    let doc = Document::load_mem(bytes)?;

    if doc.is_encrypted() {
        return Err(PdfError::Encrypted);
    }

    let pages = doc.get_pages();
    if pages.is_empty() {
        return Err(PdfError::Empty);
    }
    let page_count = pages.len();

    let page_texts: Vec<String> = pages
        .keys()
        .map(|page_number| match doc.extract_text(&[*page_number]) {
            Ok(page_text) => page_text,
            Err(e) => {
                debug!("No text on page {}: {}", page_number, e);
                String::new()
            }
        })
        .collect();

    let (text_content, page_breaks) = join_pages(&page_texts);

    Ok(PdfExtraction {
        text_content,
        page_breaks,
        page_count,
        metadata: read_metadata(&doc),
    })
}

/// Join per-page texts with blank-line separators, recording the character
/// offset where each page begins.
///
/// Pages are trimmed before accumulation so the offsets stay aligned with
/// the final `text_content`; no trimming happens afterwards.
fn join_pages(page_texts: &[String]) -> (String, Vec<usize>) {
    let mut full_text = String::new();
    let mut page_breaks = Vec::with_capacity(page_texts.len());

    for page_text in page_texts {
        let page_text = page_text.trim();
        if !page_text.is_empty() && !full_text.is_empty() {
            full_text.push_str("\n\n");
        }
        page_breaks.push(full_text.chars().count());
        full_text.push_str(page_text);
    }

    (full_text, page_breaks)
}

/// Read Title/Author/Subject from the trailer Info dictionary, if present.
fn read_metadata(doc: &Document) -> PdfMetadata {
    let info = match doc.trailer.get(b"Info") {
        Ok(Object::Reference(id)) => match doc.get_object(*id) {
            Ok(Object::Dictionary(dict)) => dict.clone(),
            _ => return PdfMetadata::default(),
        },
        Ok(Object::Dictionary(dict)) => dict.clone(),
        _ => return PdfMetadata::default(),
    };

    PdfMetadata {
        title: info.get(b"Title").ok().and_then(decode_pdf_string),
        author: info.get(b"Author").ok().and_then(decode_pdf_string),
        subject: info.get(b"Subject").ok().and_then(decode_pdf_string),
    }
}

/// Decode a PDF string object (UTF-16BE with BOM, or byte string).
fn decode_pdf_string(obj: &Object) -> Option<String> {
    let bytes = match obj {
        Object::String(bytes, _) => bytes,
        _ => return None,
    };

    let decoded = if bytes.starts_with(&[0xFE, 0xFF]) {
        let units: Vec<u16> = bytes[2..]
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        String::from_utf16_lossy(&units)
    } else {
        String::from_utf8_lossy(bytes).to_string()
    };

    let trimmed = decoded.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
