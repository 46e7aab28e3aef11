//! Office Open XML (OOXML) word-processing object model.
//!
//! The main document part of a .docx package as a live, typed view over its
//! XML: paragraphs and tables in the body, and the inline pictures, charts
//! and SmartArt embedded in them. The zip container and relationship
//! resolution stay with the caller; this module consumes part bytes and
//! produces part bytes.
//!
//! # Architecture
//!
//! The module is organized into three layers:
//!
//! 1. **OPC layer** (`opc`): partnames, relationships and the `Part` trait
//! 2. **Element tree** (`oxml`): namespace-aware XML arena on `quick-xml`
//! 3. **Document model** (`docx`): `DocumentPart`, `Body`, `InlineShapes` and
//!    the handles they return
//!
//! # Example
//!
//! ```rust
//! use longan::ooxml::docx::{Document, DocumentPart};
//!
//! let mut doc = Document::new(DocumentPart::default_document(())?);
//! doc.add_paragraph("Hello", None)?;
//! let body = doc.body()?;
//! body.clear_content()?.add_paragraph()?;
//! assert_eq!(doc.text()?, "");
//! # Ok::<(), longan::ooxml::OoxmlError>(())
//! ```
pub mod docx;
pub mod error;
pub mod opc;
pub mod oxml;

// Re-export commonly used types from OPC layer
pub use opc::{PackURI, Part};

// Re-export error types
pub use error::{OoxmlError, Result};
