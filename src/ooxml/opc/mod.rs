/// Open Packaging Conventions (OPC) pass-through layer.
///
/// The document object model sits on top of a package it never opens itself.
/// This module supplies the pieces a part needs to participate in one:
///
/// - `PackURI` partnames
/// - `Relationships` from a part to its images, charts and links
/// - the `Part` trait implemented by the document part
/// - content type and relationship type constants
///
/// Reading and writing the zip container belongs to the caller.

pub mod constants;
pub mod error;
pub mod packuri;
pub mod part;
pub mod rel;

// Re-export commonly used types
pub use error::OpcError;
pub use packuri::PackURI;
pub use part::Part;
pub use rel::{Relationship, Relationships};
