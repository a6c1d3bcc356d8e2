//! PDF text extraction
//!
//! Pure-Rust extraction of page-ordered text, page-break offsets and
//! document metadata via `lopdf`. The extractor is an opaque collaborator
//! for the pipeline: bytes in, text out. It does not attempt layout
//! analysis or OCR; image-only documents yield little or no text and are
//! rejected downstream by the minimum-text policy.

mod extractor;

pub use extractor::{extract_text, PdfError, PdfExtraction, PdfMetadata};
