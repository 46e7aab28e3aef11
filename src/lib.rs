//! Longan - an in-memory object model for Word document parts
//!
//! This library exposes the main part of an Office Open XML word-processing
//! package (`word/document.xml`) as live, typed handles over its element
//! tree. Block content can be read and appended while the trailing section
//! properties stay in place, and inline graphics are classified as pictures,
//! linked pictures, charts or SmartArt.
//!
//! # Features
//!
//! - **Element tree**: namespace-aware arena parsed and written with `quick-xml`;
//!   unmodified parts serialize back byte for byte
//! - **Content model**: paragraphs, runs, tables, and `clear_content` that keeps `w:sectPr` last
//! - **Inline shapes**: document-order enumeration with negative indexing
//! - **Shared handles**: every handle over a part sees the same tree behind one `RwLock`
//!
//! # Example - Reading a document part
//!
//! ```no_run
//! use longan::ooxml::docx::{Document, DocumentPart};
//! use longan::ooxml::opc::constants::content_type;
//! use longan::ooxml::PackURI;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Bytes of word/document.xml, taken from the package by the caller
//! let blob = std::fs::read("document.xml")?;
//! let part = DocumentPart::load(
//!     PackURI::new("/word/document.xml")?,
//!     content_type::WML_DOCUMENT_MAIN,
//!     &blob,
//!     (),
//! )?;
//! let doc = Document::new(part);
//!
//! for para in doc.paragraphs()? {
//!     println!("Paragraph: {}", para.text()?);
//! }
//! for shape in &doc.inline_shapes()? {
//!     println!("{} ({:?} x {:?} EMU)", shape.kind(), shape.width(), shape.height());
//! }
//! # Ok(())
//! # }
//! ```

/// OOXML (Office Open XML) word-processing object model
#[cfg(feature = "ooxml")]
pub mod ooxml;

#[cfg(feature = "ooxml")]
pub use ooxml::docx::{Document, DocumentPart, WdInlineShape};
#[cfg(feature = "ooxml")]
pub use ooxml::{OoxmlError, Result};
